use actix_cors::Cors;
use actix_web::http::header;

/// Build CORS middleware from the configured front-end origins.
///
/// The session cookie rides on cross-origin requests, so credentials must
/// be allowed and origins must be listed explicitly; wildcard origins and
/// credentialed requests are mutually exclusive in the CORS spec.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        // Methods actually used by the API
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .supports_credentials()
        .max_age(3600);

    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
