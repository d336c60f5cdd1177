use std::sync::Arc;

use crate::database::Database;
use crate::storage::CoverStorage;

/// Shared by every handler through `State<AppState>`; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub covers: Arc<CoverStorage>,
}

impl AppState {
    pub fn new(db: Database, covers: CoverStorage) -> Self {
        Self {
            db,
            covers: Arc::new(covers),
        }
    }
}
