mod app_state;
mod chat_session;
pub mod events;
mod model_registry;

pub use app_state::*;
pub use chat_session::*;
pub use model_registry::*;
