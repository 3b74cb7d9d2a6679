mod ai_model;
mod backend;
mod error;
mod event;
mod message;
mod session;
mod slash_commands;
mod tuning;

pub use ai_model::*;
pub use backend::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use session::*;
pub use slash_commands::*;
pub use tuning::*;
