use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{GroupId, Timestamp, User};

/// Lifecycle of a group invitation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// An invitation for `invitee` to join a group, as listed by `GET invitations/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invitation {
    pub id: i64,
    pub group: GroupId,
    pub group_name: String,
    pub inviter: User,
    pub invitee: User,
    pub status: InvitationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Invitation {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}
