use std::{collections::HashSet, fmt, sync::Arc};

use shared::models::{CreateGroupRequest, Group, GroupId, UpdateGroupRequest};
use tracing::{debug, instrument};

use super::{EventSink, StateEvent};
use crate::{api::GroupApi, error::ClientResult};

/// Cache of the current user's groups plus the selected group.
///
/// Every operation leaves the cache untouched when its request fails.
pub struct GroupDirectory {
    groups: Vec<Group>,
    current: Option<Group>,
    loading: bool,
    api: Arc<dyn GroupApi>,
    events: EventSink,
}

impl fmt::Debug for GroupDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDirectory")
            .field("groups", &self.groups.len())
            .field("current", &self.current.as_ref().map(|group| group.id))
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl GroupDirectory {
    pub fn new(api: Arc<dyn GroupApi>, events: EventSink) -> Self {
        Self {
            groups: Vec::new(),
            current: None,
            loading: false,
            api,
            events,
        }
    }

    /// Cached groups in server order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    #[must_use]
    pub fn current_group(&self) -> Option<&Group> {
        self.current.as_ref()
    }

    /// Whether a [`GroupDirectory::fetch_groups`] request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the cache with the server's list.
    ///
    /// Duplicate ids keep their first occurrence. A selection that is no
    /// longer listed is cleared.
    ///
    /// # Errors
    /// Propagates the collaborator error; the cache keeps its previous value.
    #[instrument(skip(self))]
    pub async fn fetch_groups(&mut self) -> ClientResult<&[Group]> {
        self.loading = true;
        let result = self.api.list_groups().await;
        self.loading = false;
        let fetched = result?;

        let mut seen = HashSet::with_capacity(fetched.len());
        let groups: Vec<Group> = fetched
            .into_iter()
            .filter(|group| seen.insert(group.id))
            .collect();
        debug!(count = groups.len(), "groups fetched");
        self.groups = groups;

        if let Some(id) = self.current.as_ref().map(|current| current.id) {
            match self.group(id).cloned() {
                Some(fresh) => self.current = Some(fresh),
                None => self.select(None),
            }
        }
        self.changed();
        Ok(&self.groups)
    }

    /// Create a group and add it to the end of the cache.
    ///
    /// If the server returns an id that is already cached, that entry is
    /// replaced instead.
    ///
    /// # Errors
    /// Propagates the collaborator error; the cache is unchanged.
    #[instrument(skip_all, fields(name = %request.name))]
    pub async fn create_group(&mut self, request: &CreateGroupRequest) -> ClientResult<Group> {
        let created = self.api.create_group(request).await?;
        match self.groups.iter_mut().find(|group| group.id == created.id) {
            Some(existing) => *existing = created.clone(),
            None => self.groups.push(created.clone()),
        }
        debug!(group_id = created.id, "group created");
        self.changed();
        Ok(created)
    }

    /// Apply `patch` and replace the cached entry with the server's copy.
    ///
    /// # Errors
    /// Propagates the collaborator error; the cache is unchanged.
    #[instrument(skip(self, patch))]
    pub async fn update_group(
        &mut self,
        id: GroupId,
        patch: &UpdateGroupRequest,
    ) -> ClientResult<Group> {
        let updated = self.api.update_group(id, patch).await?;
        if let Some(existing) = self.groups.iter_mut().find(|group| group.id == id) {
            *existing = updated.clone();
        }
        if self.current.as_ref().is_some_and(|current| current.id == id) {
            self.current = Some(updated.clone());
        }
        self.changed();
        Ok(updated)
    }

    /// Delete a group on the server and drop it from the cache.
    ///
    /// # Errors
    /// Propagates the collaborator error; the cache is unchanged.
    #[instrument(skip(self))]
    pub async fn delete_group(&mut self, id: GroupId) -> ClientResult<()> {
        self.api.delete_group(id).await?;
        self.forget(id);
        Ok(())
    }

    /// Leave a group and drop it from the cache.
    ///
    /// # Errors
    /// Propagates the collaborator error; the cache is unchanged.
    #[instrument(skip(self))]
    pub async fn leave_group(&mut self, id: GroupId) -> ClientResult<()> {
        self.api.leave_group(id).await?;
        self.forget(id);
        Ok(())
    }

    /// Select `group`, or clear the selection with `None`.
    pub fn set_current_group(&mut self, group: Option<Group>) {
        self.select(group);
    }

    fn forget(&mut self, id: GroupId) {
        self.groups.retain(|group| group.id != id);
        if self.current.as_ref().is_some_and(|current| current.id == id) {
            self.select(None);
        }
        debug!(group_id = id, "group removed");
        self.changed();
    }

    fn select(&mut self, group: Option<Group>) {
        let group_id = group.as_ref().map(|group| group.id);
        self.current = group;
        self.events
            .emit(StateEvent::CurrentGroupChanged { group_id });
    }

    fn changed(&self) {
        self.events.emit(StateEvent::GroupsChanged {
            count: self.groups.len(),
        });
    }
}
