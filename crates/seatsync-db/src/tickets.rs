//! Ticket sales queries.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::queries;
use crate::{DbError, WordPressDb};

/// One FooEvents ticket post with its booking tags.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TicketRow {
    pub ticket_id: u64,
    pub post_title: String,
    pub post_date: NaiveDateTime,
    pub post_status: String,
    /// Stored slot label, typically the configured label plus a time suffix.
    pub booking_slot: Option<String>,
    pub booking_date: Option<String>,
    /// Payment/attendance status, e.g. `"Paid"`, `"Unpaid"`, `"Canceled"`.
    pub status: Option<String>,
}

/// Connection summary for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub connected: bool,
    pub host: String,
    pub database: String,
    pub table_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tickets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WordPressDb {
    /// Tickets sold for one product, slot and date.
    ///
    /// `slot_label` matches any stored label that starts with it; the date is
    /// matched exactly. Canceled, cancelled and unpaid tickets are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection or query fails.
    pub async fn tickets_sold_for_date(
        &self,
        product_id: i64,
        slot_label: &str,
        booking_date: &str,
    ) -> Result<i64, DbError> {
        let sql = queries::tickets_sold_for_date(self.table_prefix());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(product_id.to_string())
            .bind(queries::slot_prefix_pattern(slot_label))
            .bind(booking_date)
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(product_id, slot_label, booking_date, error = %e, "tickets sold query failed"))?;

        tracing::debug!(product_id, slot_label, booking_date, count, "tickets sold for date");
        Ok(count)
    }

    /// Tickets sold for a product regardless of slot/date metadata.
    ///
    /// Covers tickets sold before a booking configuration existed, and
    /// single-event products whose tickets never carry slot tags.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection or query fails.
    pub async fn total_tickets_for_product(&self, product_id: i64) -> Result<i64, DbError> {
        let sql = queries::total_tickets_for_product(self.table_prefix());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(product_id.to_string())
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(product_id, error = %e, "total tickets query failed"))?;

        tracing::debug!(product_id, count, "total tickets for product");
        Ok(count)
    }

    /// Whether any published ticket of the product carries a slot tag.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection or query fails.
    pub async fn has_tickets_with_slot_metadata(&self, product_id: i64) -> Result<bool, DbError> {
        let sql = queries::tickets_with_slot_metadata(self.table_prefix());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(product_id.to_string())
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(product_id, error = %e, "slot metadata query failed"))?;

        tracing::debug!(product_id, count, "tickets with slot metadata");
        Ok(count > 0)
    }

    /// Every ticket post of a product, newest first, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection or query fails.
    pub async fn tickets_for_product(&self, product_id: i64) -> Result<Vec<TicketRow>, DbError> {
        let sql = queries::tickets_for_product(self.table_prefix());
        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(product_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        tracing::info!(product_id, count = rows.len(), "loaded tickets for product");
        Ok(rows)
    }

    /// Connection state, server version and ticket post count.
    ///
    /// Never fails: a broken connection is reported as `connected: false`
    /// with the error text.
    pub async fn database_status(&self) -> DatabaseStatus {
        let mut status = DatabaseStatus {
            connected: false,
            host: self.host().to_string(),
            database: self.database().to_string(),
            table_prefix: self.table_prefix().to_string(),
            mysql_version: None,
            total_tickets: None,
            error: None,
        };

        let version = sqlx::query_scalar::<_, String>("SELECT VERSION()")
            .fetch_one(&self.pool)
            .await;
        let version = match version {
            Ok(v) => v,
            Err(e) => {
                status.error = Some(e.to_string());
                return status;
            }
        };

        let total = sqlx::query_scalar::<_, i64>(&queries::ticket_post_count(self.table_prefix()))
            .fetch_one(&self.pool)
            .await;
        match total {
            Ok(total) => {
                status.connected = true;
                status.mysql_version = Some(version);
                status.total_tickets = Some(total);
            }
            Err(e) => status.error = Some(e.to_string()),
        }

        status
    }
}
