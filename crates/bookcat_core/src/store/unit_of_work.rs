//! Scoped connection use for store operations.
//!
//! # Responsibility
//! - Run single-statement calls on a pooled connection.
//! - Run multi-statement writes as one atomic unit of work.
//!
//! # Invariants
//! - One unit of work binds exactly one connection: acquire, begin, steps,
//!   commit or rollback, release.
//! - The connection is released on every exit path.
//! - A rollback failure is logged and never replaces the original error.

use super::error::{StoreError, StoreResult};
use crate::db::ConnectionPool;
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;
use uuid::Uuid;

/// Failure raised by one step inside a unit of work.
#[derive(Debug)]
pub(crate) enum StepError {
    Sqlite(rusqlite::Error),
    /// Domain-level abort (not found, zero rows affected).
    Abort(StoreError),
}

impl From<rusqlite::Error> for StepError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<StoreError> for StepError {
    fn from(value: StoreError) -> Self {
        Self::Abort(value)
    }
}

/// Runs one single-statement call against a pooled connection.
pub(crate) fn with_connection<T, F>(pool: &ConnectionPool, operation: &'static str, call: F) -> StoreResult<T>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let conn = pool
        .acquire()
        .map_err(|err| StoreError::connectivity(operation, err))?;
    call(&*conn).map_err(|err| StoreError::from_sqlite(operation, err))
}

/// Runs `work` inside an immediate transaction and commits only when every
/// step succeeded.
pub(crate) fn run_unit_of_work<T, F>(
    pool: &ConnectionPool,
    operation: &'static str,
    subject: &str,
    work: F,
) -> StoreResult<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StepError>,
{
    let unit_id = Uuid::new_v4();
    let started_at = Instant::now();
    debug!("event={operation} module=store status=start unit={unit_id} subject={subject}");

    let mut conn = pool
        .acquire()
        .map_err(|err| StoreError::connectivity(operation, err))?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| StoreError::from_sqlite(operation, err))?;

    let outcome = match work(&tx) {
        Ok(value) => value,
        Err(step_err) => {
            let failure = match step_err {
                StepError::Sqlite(err) => StoreError::from_sqlite(operation, err),
                StepError::Abort(err) => err,
            };
            match tx.rollback() {
                Ok(()) => warn!(
                    "event={operation} module=store status=rolled_back unit={unit_id} subject={subject} duration_ms={} reason={failure}",
                    started_at.elapsed().as_millis()
                ),
                Err(rollback_err) => error!(
                    "event={operation} module=store status=rollback_failed unit={unit_id} subject={subject} error={rollback_err}"
                ),
            }
            return Err(failure);
        }
    };

    if let Err(err) = tx.commit() {
        error!("event={operation} module=store status=commit_failed unit={unit_id} subject={subject}");
        return Err(StoreError::from_sqlite(operation, err));
    }

    info!(
        "event={operation} module=store status=ok unit={unit_id} subject={subject} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(outcome)
}
