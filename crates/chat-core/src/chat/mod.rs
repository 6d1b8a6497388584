pub mod gateway;
pub mod session;

pub use gateway::{CompletionGateway, FALLBACK_RESPONSE, GatewayError, HISTORY_WINDOW};
pub use session::{Conversation, SessionStore};
