//! Embeddable sync client: keeps a connected frontend's view of
//! conversations, messages and unread badges eventually consistent with the
//! server through short-interval polling, with optimistic local sends
//! reconciled against the canonical log.

pub mod error;
pub mod poller;
pub mod sync;
pub mod transport;
pub mod view;

pub use error::{ClientError, ClientResult};
pub use sync::{ClientState, SyncClient, SyncConfig};
pub use transport::{ChatTransport, HttpTransport};
pub use view::{ConversationView, LocalMessage, ThreadEntry};
