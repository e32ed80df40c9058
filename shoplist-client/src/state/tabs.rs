use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, instrument, warn};

use super::{EventSink, StateEvent};
use crate::storage::{GROUP_TABS_KEY, SharedStorage, StorageError, StorageResult};

/// The two views of a group page.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GroupTab {
    #[default]
    Shopping,
    Recipes,
}

/// Remembers which tab each group was last viewed on.
///
/// The whole map is written back to storage on every change. Entries are
/// never evicted.
#[derive(Debug)]
pub struct TabPreferences {
    tabs: BTreeMap<String, GroupTab>,
    storage: SharedStorage,
    events: EventSink,
}

impl TabPreferences {
    /// Restore the persisted map from `storage`.
    ///
    /// A missing entry starts empty; an unreadable one is logged and
    /// ignored, and is overwritten by the next [`TabPreferences::set_group_tab`].
    pub fn restore(storage: SharedStorage, events: EventSink) -> Self {
        let tabs = match storage.get(GROUP_TABS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "ignoring malformed group tab preferences");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                warn!(error = %err, "could not read group tab preferences");
                BTreeMap::new()
            }
        };
        debug!(entries = tabs.len(), "group tab preferences restored");
        Self {
            tabs,
            storage,
            events,
        }
    }

    /// The remembered tab for `group_id`, or [`GroupTab::Shopping`].
    #[must_use]
    pub fn get_group_tab(&self, group_id: &str) -> GroupTab {
        self.tabs.get(group_id).copied().unwrap_or_default()
    }

    /// Remember `tab` for `group_id` and persist the whole map.
    ///
    /// The in-memory entry is kept even when persisting fails.
    ///
    /// # Errors
    /// Returns the storage error if the map cannot be written.
    #[instrument(skip(self))]
    pub fn set_group_tab(&mut self, group_id: &str, tab: GroupTab) -> StorageResult<()> {
        self.tabs.insert(group_id.to_string(), tab);
        self.events.emit(StateEvent::GroupTabChanged {
            group_id: group_id.to_string(),
            tab,
        });
        self.persist()
    }

    /// All remembered entries, ordered by group id.
    pub fn entries(&self) -> impl Iterator<Item = (&str, GroupTab)> {
        self.tabs.iter().map(|(id, tab)| (id.as_str(), *tab))
    }

    fn persist(&self) -> StorageResult<()> {
        let encoded = serde_json::to_string(&self.tabs).map_err(|source| StorageError::Encode {
            key: GROUP_TABS_KEY.to_string(),
            source,
        })?;
        self.storage.set(GROUP_TABS_KEY, &encoded)
    }
}
