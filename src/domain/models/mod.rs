mod action;
mod analysis;
mod event;
mod message;
mod model;
mod prompt;
mod response;
mod slash_commands;
mod textarea;

pub use action::*;
pub use analysis::*;
pub use event::*;
pub use message::*;
pub use model::*;
pub use prompt::*;
pub use response::*;
pub use slash_commands::*;
pub use textarea::*;
