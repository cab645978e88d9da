//! HTTP surface for textstat.
//!
//! # Responsibility
//! - Expose text CRUD and statistics routes under `/v1`.
//! - Authenticate callers and gate every route on a named permission.
//! - Translate core errors into HTTP status codes.
//!
//! # Invariants
//! - Authentication and permission checks run before input validation and
//!   before any store access.
//! - The store lock is never held across an `.await`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use auth::Authenticator;
use error::ApiError;
use rusqlite::Connection;
use std::future::Future;
use std::sync::{Arc, Mutex};
use textstat_core::{SqliteTextRepository, TextService};

pub use routes::build_router;

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Connection>>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Wraps a migrated connection from `textstat_core::db`.
    pub fn new(conn: Connection, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            store: Arc::new(Mutex::new(conn)),
            authenticator,
        }
    }

    /// Runs `f` against a text service while holding the store lock.
    pub fn with_texts<T>(
        &self,
        f: impl FnOnce(&TextService<SqliteTextRepository<'_>>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self
            .store
            .lock()
            .map_err(|_| ApiError::Internal("text store lock poisoned".to_string()))?;
        let service = TextService::new(SqliteTextRepository::new(&conn));
        f(&service)
    }
}

/// Resolves once `signal` fires.
///
/// When the signal handler cannot be installed the future never resolves,
/// so the server keeps running until it is killed.
pub async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        log::error!("event=shutdown_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
