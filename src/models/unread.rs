use serde::{Deserialize, Serialize};

/// Derived badge counts. Recomputed from the logs on every request so the
/// surfaces polling them can never disagree with the ground truth.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCounts {
    pub messages: i64,
    pub notifications: i64,
}
