//! Positions a user actually holds, optionally copied from a signal.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue, QueryOrder};
use tracing::info;

use crate::entity::user_deals;
use crate::error::{Result, SyncError};
use crate::models::CreateUserDealRequest;
use crate::pricing::{DealMetrics, PositionSide};
use crate::repositories::{deal_repository, signal_repository};

pub struct UserDealService {
    db: Arc<DatabaseConnection>,
}

impl UserDealService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Copy an open signal into `user_deals` for `request.user_id`.
    ///
    /// Quantity defaults to the signal's. Market price and target come from
    /// the signal's projected deal when one exists.
    pub async fn create_from_signal(&self, request: CreateUserDealRequest) -> Result<user_deals::Model> {
        let user_id = request.user_id.trim();
        if user_id.is_empty() {
            return Err(SyncError::InvalidInput("user_id is required".to_string()));
        }

        let db = self.db.as_ref();
        let signal = signal_repository::find_by_id(db, request.signal_id)
            .await?
            .ok_or_else(|| SyncError::not_found("signal", request.signal_id))?;

        if !signal.is_open() {
            return Err(SyncError::InvalidInput(format!("signal {} is closed", signal.id)));
        }

        let ep = signal
            .ep
            .ok_or_else(|| SyncError::InvalidInput(format!("signal {} has no entry price", signal.id)))?;
        let qty = request
            .qty
            .or(signal.qty)
            .ok_or_else(|| SyncError::InvalidInput("qty is required".to_string()))?;
        if qty <= Decimal::ZERO {
            return Err(SyncError::InvalidInput("qty must be positive".to_string()));
        }

        let deal = deal_repository::find_by_signal(db, signal.id).await?;
        let cmp = deal.as_ref().map(|d| d.current_price).or(signal.cmp);
        let tp = deal.as_ref().map(|d| d.target_price).or(signal.tp);
        let metrics = DealMetrics::compute(ep, cmp.unwrap_or(ep), qty, PositionSide::from_pos(signal.pos), tp);

        let now = Utc::now();
        let active = user_deals::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            admin_signal_id: ActiveValue::Set(Some(signal.id)),
            symbol: ActiveValue::Set(signal.symbol.clone()),
            pos: ActiveValue::Set(signal.pos),
            qty: ActiveValue::Set(qty),
            ep: ActiveValue::Set(ep),
            cmp: ActiveValue::Set(cmp),
            tp: ActiveValue::Set(Some(metrics.target_price)),
            inv: ActiveValue::Set(metrics.investment),
            pl: ActiveValue::Set(Some(metrics.pnl)),
            status: ActiveValue::Set("ACTIVE".to_string()),
            notes: ActiveValue::Set(request.notes),
            created_at: ActiveValue::Set(Some(now)),
            updated_at: ActiveValue::Set(Some(now)),
            ..Default::default()
        };

        let created = active.insert(db).await?;
        info!(user_id = %created.user_id, deal_id = created.id, signal_id = signal.id, "Created user deal from signal");
        Ok(created)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<user_deals::Model>> {
        let deals = user_deals::Entity::find()
            .filter(user_deals::Column::UserId.eq(user_id))
            .order_by_desc(user_deals::Column::CreatedAt)
            .order_by_desc(user_deals::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(deals)
    }

    pub async fn close(&self, id: i32) -> Result<user_deals::Model> {
        let deal = user_deals::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| SyncError::not_found("user deal", id))?;

        let mut active: user_deals::ActiveModel = deal.into();
        active.status = ActiveValue::Set("CLOSED".to_string());
        active.pos = ActiveValue::Set(0);
        active.updated_at = ActiveValue::Set(Some(Utc::now()));

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = user_deals::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(SyncError::not_found("user deal", id));
        }
        Ok(())
    }
}
