use shared::models::GroupId;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::trace;

use super::GroupTab;

/// Notification sent to observers after a container changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// The session resolved or moved between anonymous and authenticated.
    SessionChanged { authenticated: bool },
    /// The group directory contents changed.
    GroupsChanged { count: usize },
    /// The current group selection changed.
    CurrentGroupChanged { group_id: Option<GroupId> },
    /// A group's remembered tab was written.
    GroupTabChanged { group_id: String, tab: GroupTab },
}

/// Optional sending half of an observer channel handed to a container.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<StateEvent>>,
}

impl EventSink {
    /// A sink that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A connected sink and the receiver observers read from.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<StateEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self::from(sender), receiver)
    }

    pub(crate) fn emit(&self, event: StateEvent) {
        if let Some(sender) = &self.sender {
            if let Err(err) = sender.send(event) {
                trace!(event = ?err.0, "state observer has gone away");
            }
        }
    }
}

impl From<UnboundedSender<StateEvent>> for EventSink {
    fn from(sender: UnboundedSender<StateEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }
}
