use async_trait::async_trait;
use reqwest::Method;
use shared::models::{
    CreateGroupRequest, Group, GroupId, Invitation, RemoveMemberRequest, SendInvitationRequest,
    UpdateGroupRequest, UserId,
};
use tracing::instrument;

use super::ApiClient;
use crate::error::ClientResult;

const GROUPS_PATH: &str = "groups/";
const INVITATIONS_PATH: &str = "invitations/";

fn group_path(id: GroupId) -> String {
    format!("{GROUPS_PATH}{id}/")
}

fn invitation_path(id: i64, action: &str) -> String {
    format!("{INVITATIONS_PATH}{id}/{action}/")
}

/// Group endpoints consumed by [`crate::state::GroupDirectory`].
#[async_trait]
pub trait GroupApi: Send + Sync {
    /// Every group the current user belongs to.
    ///
    /// # Errors
    /// Propagates any API failure.
    async fn list_groups(&self) -> ClientResult<Vec<Group>>;

    /// # Errors
    /// [`crate::ClientError::Validation`] when the server rejects the fields.
    async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<Group>;

    /// Apply a partial update and return the stored group.
    ///
    /// # Errors
    /// Propagates any API failure.
    async fn update_group(&self, id: GroupId, patch: &UpdateGroupRequest) -> ClientResult<Group>;

    /// # Errors
    /// Propagates any API failure.
    async fn delete_group(&self, id: GroupId) -> ClientResult<()>;

    /// Leave a group without deleting it.
    ///
    /// # Errors
    /// Propagates any API failure.
    async fn leave_group(&self, id: GroupId) -> ClientResult<()>;
}

#[async_trait]
impl GroupApi for ApiClient {
    async fn list_groups(&self) -> ClientResult<Vec<Group>> {
        self.get_json(GROUPS_PATH, &[]).await
    }

    #[instrument(skip_all, fields(name = %request.name))]
    async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<Group> {
        self.send_json(Method::POST, GROUPS_PATH, Some(request))
            .await
    }

    #[instrument(skip(self, patch))]
    async fn update_group(&self, id: GroupId, patch: &UpdateGroupRequest) -> ClientResult<Group> {
        self.send_json(Method::PATCH, &group_path(id), Some(patch))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_group(&self, id: GroupId) -> ClientResult<()> {
        self.send_unit::<()>(Method::DELETE, &group_path(id), None)
            .await
    }

    #[instrument(skip(self))]
    async fn leave_group(&self, id: GroupId) -> ClientResult<()> {
        self.send_unit::<()>(Method::POST, &format!("{GROUPS_PATH}{id}/leave/"), None)
            .await
    }
}

impl ApiClient {
    /// Fetch one group with its member details.
    ///
    /// # Errors
    /// Propagates any API failure; a missing group is reported as 404.
    pub async fn get_group(&self, id: GroupId) -> ClientResult<Group> {
        self.get_json(&group_path(id), &[]).await
    }

    /// Remove a member from a group the current user administers.
    ///
    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn remove_member(&self, id: GroupId, user_id: UserId) -> ClientResult<()> {
        self.send_unit(
            Method::POST,
            &format!("{GROUPS_PATH}{id}/remove_member/"),
            Some(&RemoveMemberRequest { user_id }),
        )
        .await
    }

    /// Invite a user to a group by username.
    ///
    /// # Errors
    /// Propagates any API failure; unknown users and existing members are
    /// rejected by the server.
    #[instrument(skip(self))]
    pub async fn send_invitation(&self, id: GroupId, invitee_username: &str) -> ClientResult<()> {
        self.send_unit(
            Method::POST,
            &format!("{GROUPS_PATH}{id}/send-invitation/"),
            Some(&SendInvitationRequest {
                invitee_username: invitee_username.to_string(),
            }),
        )
        .await
    }

    /// Invitations addressed to the current user.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn list_invitations(&self) -> ClientResult<Vec<Invitation>> {
        self.get_json(INVITATIONS_PATH, &[]).await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn accept_invitation(&self, id: i64) -> ClientResult<()> {
        self.send_unit::<()>(Method::POST, &invitation_path(id, "accept"), None)
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn decline_invitation(&self, id: i64) -> ClientResult<()> {
        self.send_unit::<()>(Method::POST, &invitation_path(id, "decline"), None)
            .await
    }
}
