use serde::{Deserialize, Serialize};

/// The authenticated caller identity resolved from the bearer token.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
}
