//! Bounded SQLite connection pool.
//!
//! # Responsibility
//! - Own every open connection for one catalog database.
//! - Hand out connections with scoped (drop-based) release.
//! - Provide an explicit shutdown lifecycle.
//!
//! # Invariants
//! - At most `max_connections` connections are open at once.
//! - A connection returned to the idle list is in autocommit mode.
//! - In-memory targets use exactly one connection.

use super::open::{open_connection, DbTarget};
use super::{ConnectivityError, DbError, DbResult};
use crate::config::DatabaseConfig;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct PoolState {
    idle: Vec<Connection>,
    open: usize,
    closed: bool,
}

struct PoolShared {
    target: DbTarget,
    max_connections: usize,
    acquire_timeout: Duration,
    busy_timeout: Duration,
    state: Mutex<PoolState>,
    released: Condvar,
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub open: usize,
    pub idle: usize,
    pub closed: bool,
}

/// Process-wide connection provider.
///
/// Built once with [`ConnectionPool::init`] and handed to every store;
/// clones share the same underlying connections.
#[derive(Clone)]
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
}

impl ConnectionPool {
    /// Opens the first connection, applies migrations and returns the pool.
    ///
    /// # Errors
    /// - `DbError::InvalidPoolSize` when `max_connections` is zero.
    /// - Any bootstrap/migration failure of the first connection.
    pub fn init(config: &DatabaseConfig) -> DbResult<Self> {
        if config.max_connections == 0 {
            return Err(DbError::InvalidPoolSize(0));
        }

        let target = DbTarget::from_config(config);
        let max_connections = match target {
            DbTarget::Memory => 1,
            DbTarget::File(_) => config.max_connections,
        };
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let first = open_connection(&target, busy_timeout)?;

        info!(
            "event=pool_init module=db status=ok mode={} max_connections={max_connections}",
            target.mode()
        );

        Ok(Self {
            shared: Arc::new(PoolShared {
                target,
                max_connections,
                acquire_timeout: Duration::from_millis(config.acquire_timeout_ms),
                busy_timeout,
                state: Mutex::new(PoolState {
                    idle: vec![first],
                    open: 1,
                    closed: false,
                }),
                released: Condvar::new(),
            }),
        })
    }

    /// Checks out one connection, waiting up to the configured timeout.
    ///
    /// The connection goes back to the pool when the guard is dropped, on
    /// every exit path.
    pub fn acquire(&self) -> Result<PooledConnection, ConnectivityError> {
        let started_at = Instant::now();
        let deadline = started_at + self.shared.acquire_timeout;
        let mut state = lock_state(&self.shared.state);

        loop {
            if state.closed {
                warn!("event=pool_acquire module=db status=error error_code=pool_closed");
                return Err(ConnectivityError::Closed);
            }

            if let Some(conn) = state.idle.pop() {
                return Ok(PooledConnection::new(Arc::clone(&self.shared), conn));
            }

            if state.open < self.shared.max_connections {
                state.open += 1;
                drop(state);
                return self.open_additional();
            }

            let now = Instant::now();
            if now >= deadline {
                let waited_ms = started_at.elapsed().as_millis();
                warn!(
                    "event=pool_acquire module=db status=error error_code=pool_timeout waited_ms={waited_ms} open={}",
                    state.open
                );
                return Err(ConnectivityError::Timeout { waited_ms });
            }

            let (guard, _) = self
                .shared
                .released
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state = guard;
        }
    }

    /// Closes the pool. Idle connections are dropped now, checked-out ones
    /// when they are released. Later `acquire` calls fail with `Closed`.
    pub fn shutdown(&self) {
        let idle = {
            let mut state = lock_state(&self.shared.state);
            if state.closed {
                return;
            }
            state.closed = true;
            let idle = std::mem::take(&mut state.idle);
            state.open -= idle.len();
            idle
        };
        let dropped = idle.len();
        drop(idle);
        self.shared.released.notify_all();
        info!("event=pool_shutdown module=db status=ok closed_idle={dropped}");
    }

    pub fn status(&self) -> PoolStatus {
        let state = lock_state(&self.shared.state);
        PoolStatus {
            open: state.open,
            idle: state.idle.len(),
            closed: state.closed,
        }
    }

    pub fn max_connections(&self) -> usize {
        self.shared.max_connections
    }

    fn open_additional(&self) -> Result<PooledConnection, ConnectivityError> {
        match open_connection(&self.shared.target, self.shared.busy_timeout) {
            Ok(conn) => {
                debug!("event=pool_grow module=db status=ok");
                Ok(PooledConnection::new(Arc::clone(&self.shared), conn))
            }
            Err(err) => {
                lock_state(&self.shared.state).open -= 1;
                self.shared.released.notify_one();
                Err(ConnectivityError::Open(err.to_string()))
            }
        }
    }
}

impl PoolShared {
    fn release(&self, conn: Connection) {
        if !conn.is_autocommit() {
            warn!("event=pool_release module=db status=reset reason=open_transaction");
            if let Err(err) = conn.execute_batch("ROLLBACK;") {
                error!(
                    "event=pool_release module=db status=error error_code=reset_failed error={err}"
                );
                self.discard(conn);
                return;
            }
        }

        let mut state = lock_state(&self.state);
        if state.closed {
            state.open -= 1;
            drop(state);
            drop(conn);
        } else {
            state.idle.push(conn);
            drop(state);
        }
        self.released.notify_one();
    }

    /// Drops a connection that could not be reset.
    ///
    /// An in-memory database lives only inside its single connection, so
    /// losing it closes the pool instead of reopening an empty database.
    fn discard(&self, conn: Connection) {
        drop(conn);
        let mut state = lock_state(&self.state);
        state.open -= 1;
        if self.target == DbTarget::Memory && !state.closed {
            state.closed = true;
            let idle = std::mem::take(&mut state.idle);
            state.open -= idle.len();
            drop(state);
            drop(idle);
            error!("event=pool_discard module=db status=error error_code=memory_data_lost reason=reset_failed");
            self.released.notify_all();
            return;
        }
        drop(state);
        self.released.notify_one();
    }
}

/// A checked-out connection. Dropping it is the `release` operation.
pub struct PooledConnection {
    shared: Arc<PoolShared>,
    conn: Option<Connection>,
}

impl PooledConnection {
    fn new(shared: Arc<PoolShared>, conn: Connection) -> Self {
        Self {
            shared,
            conn: Some(conn),
        }
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("pooled connection is present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .expect("pooled connection is present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.shared.release(conn);
        }
    }
}

fn lock_state(state: &Mutex<PoolState>) -> MutexGuard<'_, PoolState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("event=pool_lock module=db status=recovered reason=poisoned");
            poisoned.into_inner()
        }
    }
}
