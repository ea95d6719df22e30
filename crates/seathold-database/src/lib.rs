//! # seathold-database
//!
//! PostgreSQL connection management, migrations, and concrete repository
//! implementations for the Seathold entities. All mutation of seat state
//! flows through transactional repository methods so the locking
//! discipline stays centralized.

pub mod connection;
pub mod migration;
pub mod repositories;

use chrono::{DateTime, Utc};

use seathold_core::error::{AppError, ErrorKind};
use seathold_core::result::AppResult;

pub use connection::DatabasePool;

/// A PostgreSQL transaction, threaded through the repositories' mutating
/// methods by the engine.
pub type PgTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// The transaction's clock: Postgres `NOW()`, fixed at transaction start.
///
/// Every transition decision evaluates deadlines against this instant,
/// the same source the sweep's due-entry scan compares against, so no
/// application/database clock skew can make one path consider a hold
/// lapsed while the other still protects it.
pub async fn transaction_now(tx: &mut PgTx<'_>) -> AppResult<DateTime<Utc>> {
    sqlx::query_scalar("SELECT NOW()")
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read transaction clock", e)
        })
}
