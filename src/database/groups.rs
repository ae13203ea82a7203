use super::{Attributed, Database};
use crate::{
	api::{
		filter::{Order, Query},
		ApiError,
	},
	data::{
		GroupInvite, GroupMember, GroupPick, GroupRole, InviteStatus, PickVote, Profile, TitleSnapshot,
		WatchGroup,
	},
};
use multimap::MultiMap;
use serde::Serialize;
use uuid::Uuid;

pub static ALREADY_INVITED: &str = "That friend is already invited";
pub static ALREADY_PICKED: &str = "This title is already in the group picks";

#[derive(Serialize)]
struct NewGroup<'a> {
	name: &'a str,
	owner_id: Uuid,
	description: Option<&'a str>,
}

#[derive(Serialize)]
struct NewMember {
	group_id: Uuid,
	user_id: Uuid,
	role: GroupRole,
}

#[derive(Serialize)]
struct NewInvite {
	group_id: Uuid,
	inviter_id: Uuid,
	invitee_id: Uuid,
	status: InviteStatus,
}

#[derive(Serialize)]
struct NewPick<'a> {
	group_id: Uuid,
	added_by: Uuid,
	#[serde(flatten)]
	title: &'a TitleSnapshot,
}

#[derive(Serialize)]
struct NewVote {
	pick_id: Uuid,
	user_id: Uuid,
}

/// A pending invite with enough context to render it.
#[derive(Clone, Debug, PartialEq)]
pub struct InviteView {
	pub invite: GroupInvite,
	pub group: Option<WatchGroup>,
	pub inviter: Option<Profile>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PickTally {
	pub pick: GroupPick,
	pub voters: Vec<Uuid>,
}

impl PickTally {
	pub fn votes(&self) -> usize {
		self.voters.len()
	}

	pub fn has_vote_from(&self, user: Uuid) -> bool {
		self.voters.contains(&user)
	}
}

/// Votes per pick, most voted first. Ties go to the pick that was added first.
pub fn tally(mut picks: Vec<GroupPick>, votes: &[PickVote]) -> Vec<PickTally> {
	let by_pick = votes.iter().map(|vote| (vote.pick_id, vote.user_id)).collect::<MultiMap<_, _>>();
	// stable sorts, so equal timestamps keep their fetched order
	picks.sort_by_key(|pick| pick.created_at);
	let mut tallies = picks
		.into_iter()
		.map(|pick| {
			let voters = by_pick.get_vec(&pick.id).cloned().unwrap_or_default();
			PickTally { pick, voters }
		})
		.collect::<Vec<_>>();
	tallies.sort_by(|a, b| b.votes().cmp(&a.votes()));
	tallies
}

impl Database {
	/// Create a group owned by `owner`, who also becomes its first member.
	pub async fn create_group(&self, owner: Uuid, name: &str, description: &str) -> Result<WatchGroup, ApiError> {
		let name = name.trim();
		if name.is_empty() {
			return Err(ApiError::invalid("Give the group a name"));
		}
		let description = Some(description.trim()).filter(|text| !text.is_empty());
		let group: WatchGroup = self
			.insert(&NewGroup {
				name,
				owner_id: owner,
				description,
			})
			.await?;
		let membership = NewMember {
			group_id: group.id,
			user_id: owner,
			role: GroupRole::Owner,
		};
		let _: GroupMember = self.insert(&membership).await?;
		Ok(group)
	}

	pub async fn get_group(&self, id: Uuid) -> Result<Option<WatchGroup>, ApiError> {
		self.select_one(Query::new().eq("id", id)).await
	}

	pub async fn my_groups(&self, user: Uuid) -> Result<Vec<WatchGroup>, ApiError> {
		let memberships: Vec<GroupMember> = self.select(&Query::new().eq("user_id", user)).await?;
		if memberships.is_empty() {
			return Ok(Vec::new());
		}
		let ids = memberships.into_iter().map(|member| member.group_id);
		let query = Query::new().is_in("id", ids).order("created_at", Order::Desc);
		self.select(&query).await
	}

	pub async fn group_members(&self, group: Uuid) -> Result<Vec<Attributed<GroupMember>>, ApiError> {
		let query = Query::new().eq("group_id", group).order("joined_at", Order::Asc);
		let members = self.select::<GroupMember>(&query).await?;
		self.attribute(members, |member| member.user_id).await
	}

	pub async fn invite_to_group(&self, group: Uuid, inviter: Uuid, invitee: Uuid) -> Result<GroupInvite, ApiError> {
		if inviter == invitee {
			return Err(ApiError::invalid("You are already in this group"));
		}
		let invite = NewInvite {
			group_id: group,
			inviter_id: inviter,
			invitee_id: invitee,
			status: InviteStatus::Pending,
		};
		self.insert(&invite).await.map_err(|err| err.map_conflict(ALREADY_INVITED))
	}

	pub async fn pending_invites(&self, user: Uuid) -> Result<Vec<InviteView>, ApiError> {
		let query = Query::new()
			.eq("invitee_id", user)
			.eq("status", "pending")
			.order("created_at", Order::Desc);
		let invites = self.select::<GroupInvite>(&query).await?;
		if invites.is_empty() {
			return Ok(Vec::new());
		}
		let groups: Vec<WatchGroup> = self
			.select(&Query::new().is_in("id", invites.iter().map(|invite| invite.group_id)))
			.await?;
		let inviters = self.profiles_by_id(invites.iter().map(|invite| invite.inviter_id)).await?;
		Ok(invites
			.into_iter()
			.map(|invite| InviteView {
				group: groups.iter().find(|group| group.id == invite.group_id).cloned(),
				inviter: inviters.get(&invite.inviter_id).cloned(),
				invite,
			})
			.collect())
	}

	/// Accepting adds the invitee as a member. Being a member already is not an error.
	pub async fn respond_to_invite(&self, invite: &GroupInvite, accept: bool) -> Result<(), ApiError> {
		let status = match accept {
			true => InviteStatus::Accepted,
			false => InviteStatus::Declined,
		};
		let _: Vec<GroupInvite> = self
			.update(&Query::new().eq("id", invite.id), &serde_json::json!({ "status": status }))
			.await?;
		if accept {
			let membership = NewMember {
				group_id: invite.group_id,
				user_id: invite.invitee_id,
				role: GroupRole::Member,
			};
			match self.insert::<GroupMember, _>(&membership).await {
				Err(err) if err.is_conflict() => {}
				result => {
					result?;
				}
			}
		}
		Ok(())
	}

	pub async fn leave_group(&self, group: Uuid, user: Uuid) -> Result<(), ApiError> {
		self.delete::<GroupMember>(&Query::new().eq("group_id", group).eq("user_id", user))
			.await
	}

	pub async fn add_group_pick(&self, group: Uuid, user: Uuid, title: &TitleSnapshot) -> Result<GroupPick, ApiError> {
		let pick = NewPick {
			group_id: group,
			added_by: user,
			title,
		};
		self.insert(&pick).await.map_err(|err| err.map_conflict(ALREADY_PICKED))
	}

	pub async fn remove_group_pick(&self, pick: Uuid) -> Result<(), ApiError> {
		self.delete::<GroupPick>(&Query::new().eq("id", pick)).await
	}

	pub async fn group_picks(&self, group: Uuid) -> Result<Vec<GroupPick>, ApiError> {
		self.select(&Query::new().eq("group_id", group).order("created_at", Order::Asc))
			.await
	}

	/// Voting twice for the same pick keeps a single vote.
	pub async fn vote_for_pick(&self, pick: Uuid, user: Uuid) -> Result<PickVote, ApiError> {
		let vote = NewVote {
			pick_id: pick,
			user_id: user,
		};
		self.upsert(&vote, &["pick_id", "user_id"]).await
	}

	pub async fn remove_vote(&self, pick: Uuid, user: Uuid) -> Result<(), ApiError> {
		self.delete::<PickVote>(&Query::new().eq("pick_id", pick).eq("user_id", user))
			.await
	}

	pub async fn group_tally(&self, group: Uuid) -> Result<Vec<PickTally>, ApiError> {
		let picks = self.group_picks(group).await?;
		if picks.is_empty() {
			return Ok(Vec::new());
		}
		let votes: Vec<PickVote> = self
			.select(&Query::new().is_in("pick_id", picks.iter().map(|pick| pick.id)))
			.await?;
		Ok(tally(picks, &votes))
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::{database, profile};
	use super::*;
	use crate::data::TitleRef;
	use futures::executor::block_on;

	fn title(id: u64, name: &str) -> TitleSnapshot {
		TitleSnapshot {
			movie_id: TitleRef::movie(id),
			movie_title: name.into(),
			poster_path: None,
		}
	}

	#[test]
	fn owner_is_the_first_member() {
		let (db, backend) = database();
		let me = profile(&backend, "me");
		let group = block_on(db.create_group(me.id, " Friday Films ", "")).unwrap();
		assert_eq!(group.name, "Friday Films");
		let members = block_on(db.group_members(group.id)).unwrap();
		assert_eq!(members.len(), 1);
		assert_eq!(members[0].item.role, GroupRole::Owner);
		assert_eq!(members[0].by.as_ref(), Some(&me));
		assert_eq!(block_on(db.my_groups(me.id)).unwrap(), vec![group]);
		assert!(block_on(db.create_group(me.id, "  ", "")).is_err());
	}

	#[test]
	fn duplicate_picks_and_invites_are_reported() {
		let (db, backend) = database();
		let (me, sam) = (profile(&backend, "me"), profile(&backend, "sam"));
		let group = block_on(db.create_group(me.id, "Films", "")).unwrap();
		block_on(db.add_group_pick(group.id, me.id, &title(1, "Dune"))).unwrap();
		let err = block_on(db.add_group_pick(group.id, sam.id, &title(1, "Dune"))).unwrap_err();
		assert_eq!(err.user_message(None), ALREADY_PICKED);

		block_on(db.invite_to_group(group.id, me.id, sam.id)).unwrap();
		let err = block_on(db.invite_to_group(group.id, me.id, sam.id)).unwrap_err();
		assert_eq!(err.user_message(None), ALREADY_INVITED);
	}

	#[test]
	fn accepted_invites_add_members() {
		let (db, backend) = database();
		let (me, sam) = (profile(&backend, "me"), profile(&backend, "sam"));
		let group = block_on(db.create_group(me.id, "Films", "")).unwrap();
		block_on(db.invite_to_group(group.id, me.id, sam.id)).unwrap();
		let invites = block_on(db.pending_invites(sam.id)).unwrap();
		assert_eq!(invites.len(), 1);
		assert_eq!(invites[0].group.as_ref().map(|g| g.name.as_str()), Some("Films"));
		assert_eq!(invites[0].inviter.as_ref(), Some(&me));

		block_on(db.respond_to_invite(&invites[0].invite, true)).unwrap();
		assert!(block_on(db.pending_invites(sam.id)).unwrap().is_empty());
		assert_eq!(block_on(db.group_members(group.id)).unwrap().len(), 2);

		block_on(db.leave_group(group.id, sam.id)).unwrap();
		assert!(block_on(db.my_groups(sam.id)).unwrap().is_empty());
	}

	#[test]
	fn votes_are_one_per_user_and_tallied() {
		let (db, backend) = database();
		let (me, sam, ann) = (profile(&backend, "me"), profile(&backend, "sam"), profile(&backend, "ann"));
		let group = block_on(db.create_group(me.id, "Films", "")).unwrap();
		let dune = block_on(db.add_group_pick(group.id, me.id, &title(1, "Dune"))).unwrap();
		let heat = block_on(db.add_group_pick(group.id, me.id, &title(2, "Heat"))).unwrap();
		let up = block_on(db.add_group_pick(group.id, me.id, &title(3, "Up"))).unwrap();

		block_on(db.vote_for_pick(heat.id, me.id)).unwrap();
		block_on(db.vote_for_pick(heat.id, me.id)).unwrap();
		block_on(db.vote_for_pick(up.id, sam.id)).unwrap();
		block_on(db.vote_for_pick(dune.id, ann.id)).unwrap();
		assert_eq!(backend.rows("watch_group_votes").len(), 3);

		let order = |tallies: Vec<PickTally>| {
			tallies.into_iter().map(|t| (t.pick.movie_title, t.voters.len())).collect::<Vec<_>>()
		};
		let tallies = block_on(db.group_tally(group.id)).unwrap();
		assert!(tallies.iter().find(|t| t.pick.id == heat.id).unwrap().has_vote_from(me.id));
		// one vote each, so the earliest pick leads
		assert_eq!(order(tallies), vec![("Dune".to_owned(), 1), ("Heat".to_owned(), 1), ("Up".to_owned(), 1)]);

		block_on(db.vote_for_pick(up.id, ann.id)).unwrap();
		block_on(db.remove_vote(dune.id, ann.id)).unwrap();
		let tallies = block_on(db.group_tally(group.id)).unwrap();
		assert_eq!(order(tallies), vec![("Up".to_owned(), 2), ("Heat".to_owned(), 1), ("Dune".to_owned(), 0)]);
	}
}
