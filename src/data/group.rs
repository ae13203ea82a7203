use super::{Record, TitleRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchGroup {
	pub id: Uuid,
	pub name: String,
	pub owner_id: Uuid,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for WatchGroup {
	fn table() -> &'static str {
		"watch_groups"
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
	Owner,
	#[default]
	Member,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
	pub group_id: Uuid,
	pub user_id: Uuid,
	#[serde(default)]
	pub role: GroupRole,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub joined_at: Option<OffsetDateTime>,
}

impl Record for GroupMember {
	fn table() -> &'static str {
		"watch_group_members"
	}
}

/// A title proposed for the group to watch. One per group and title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupPick {
	pub id: Uuid,
	pub group_id: Uuid,
	pub added_by: Uuid,
	pub movie_id: TitleRef,
	pub movie_title: String,
	#[serde(default)]
	pub poster_path: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for GroupPick {
	fn table() -> &'static str {
		"watch_group_picks"
	}
}

/// One vote per pick and user, written by upsert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickVote {
	pub pick_id: Uuid,
	pub user_id: Uuid,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for PickVote {
	fn table() -> &'static str {
		"watch_group_votes"
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
	#[default]
	Pending,
	Accepted,
	Declined,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupInvite {
	pub id: Uuid,
	pub group_id: Uuid,
	pub inviter_id: Uuid,
	pub invitee_id: Uuid,
	#[serde(default)]
	pub status: InviteStatus,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for GroupInvite {
	fn table() -> &'static str {
		"watch_group_invites"
	}
}
