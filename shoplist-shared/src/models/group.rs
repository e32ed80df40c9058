use serde::{Deserialize, Serialize};

use super::{Timestamp, User, UserId};

/// Server-side identifier of a group.
pub type GroupId = i64;

/// A named collection of users sharing shopping lists and recipes.
///
/// Only `id` and `name` are guaranteed; creation responses from some
/// deployments omit the membership details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(default)]
    pub members_detail: Vec<GroupMembership>,
    #[serde(default)]
    pub members_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Group {
    /// Whether `user_id` owns the group or is one of its admins.
    #[must_use]
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id == user_id)
            || self
                .members_detail
                .iter()
                .any(|member| member.user.id == user_id && member.is_admin)
    }

    /// The key under which per-group client preferences are stored.
    #[must_use]
    pub fn preference_key(&self) -> String {
        self.id.to_string()
    }
}

/// One user's membership in a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMembership {
    pub id: i64,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<Timestamp>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of `POST groups/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateGroupRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for `PATCH groups/{id}/`; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateGroupRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateGroupRequest {
    /// True when the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Body of `POST groups/{id}/remove_member/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveMemberRequest {
    pub user_id: UserId,
}

/// Body of `POST groups/{id}/send-invitation/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendInvitationRequest {
    pub invitee_username: String,
}
