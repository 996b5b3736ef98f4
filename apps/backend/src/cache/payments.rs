//! Payment rows mirrored from the bot database.

#[allow(clippy::wildcard_imports)]
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "telegram_id")]
    pub telegram_id: i64,
    pub plan: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    #[sea_orm(column_name = "paid_at")]
    pub paid_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

const RECENT_LIMIT: u64 = 10;

/// Most recent payments for one telegram id, newest first.
pub async fn recent_for(
    conn: &DatabaseConnection,
    telegram_id: i64,
) -> Result<Vec<Model>, AppError> {
    Entity::find()
        .filter(Column::TelegramId.eq(telegram_id))
        .order_by_desc(Column::Id)
        .limit(RECENT_LIMIT)
        .all(conn)
        .await
        .map_err(|e| AppError::db(format!("failed to read payment cache: {e}")))
}
