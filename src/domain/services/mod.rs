pub mod actions;
mod aggregator;
mod app_state;
pub mod events;
mod panel;
mod panel_list;
mod scroll;
mod watchers;

pub use aggregator::*;
pub use app_state::*;
pub use panel::*;
pub use panel_list::*;
pub use scroll::*;
pub use watchers::*;
