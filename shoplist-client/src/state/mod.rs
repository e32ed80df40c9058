//! Application state containers.
//!
//! Each container owns its data exclusively and exposes it through
//! accessors. Mutations go through async operations that call an API
//! collaborator, write the result back, and report the change on an
//! optional [`EventSink`].

mod events;
mod groups;
mod session;
mod tabs;

#[cfg(test)]
pub(crate) mod fakes;

pub use events::{EventSink, StateEvent};
pub use groups::GroupDirectory;
pub use session::{SessionState, SessionStatus};
pub use tabs::{GroupTab, TabPreferences};
