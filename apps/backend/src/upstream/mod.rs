pub mod client;
pub mod models;
pub mod normalize;

pub use client::{HttpSubscriptionApi, SubscriptionApi};
pub use models::{Device, SubscriptionStatus, UpstreamUser};
