use std::collections::HashMap;
use std::sync::Mutex;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::helper::rate_limit_helpers::UploadWindow;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Shared application state. The upload limiter is the only in-process
/// mutable state; everything else lives in SQLite.
pub struct AppState {
    pub upload_windows: Mutex<HashMap<String, UploadWindow>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            upload_windows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub mod config;
pub mod error;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
