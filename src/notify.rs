//! Due-reminder polling and toast/notification delivery.
//!
//! A [`ReminderCenter`] belongs to one signed-in user. Every [`POLL_INTERVAL`] the host
//! calls [`poll_once`], which asks a [`DueSource`] for at most [`BATCH_LIMIT`] due items
//! and turns unseen ones into toasts. The host shows those right away and hands them to
//! [`deliver_native`] separately, so a pending permission prompt never holds a toast back.
//! Delivery is best effort: failures are logged and the next tick simply tries again.
use crate::{
	api::ApiError,
	clock::{unix_millis, Clock},
	data::TitleRef,
};
use futures_util::future::LocalBoxFuture;
use std::{
	cell::{Cell, RefCell},
	collections::{HashSet, VecDeque},
	rc::Rc,
	time::Duration,
};
use time::OffsetDateTime;
use uuid::Uuid;

mod sources;
pub use sources::*;
#[cfg(target_family = "wasm")]
pub mod browser;
#[cfg(target_family = "wasm")]
pub mod push;

pub const POLL_INTERVAL: Duration = Duration::from_secs(45);
pub const BATCH_LIMIT: usize = 5;
pub const TOAST_TTL: Duration = Duration::from_secs(45);
pub const MAX_TOASTS: usize = 5;

/// Something due for the user, as reported by the server.
#[derive(Clone, Debug, PartialEq)]
pub struct DueNotice {
	pub server_id: String,
	/// Distinguishes deliveries of the same row, e.g. after it is rescheduled.
	pub occurrence: i64,
	pub title: String,
	pub body: Option<String>,
	pub target: TitleRef,
}

impl DueNotice {
	fn seen_key(&self) -> String {
		format!("{}@{}", self.server_id, self.occurrence)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	/// `{server_id}-{created_at in ms}`, unique per delivery.
	pub id: String,
	pub server_id: String,
	pub title: String,
	pub body: Option<String>,
	pub target: TitleRef,
	pub created_at: OffsetDateTime,
}

impl Toast {
	pub fn expires_at(&self) -> OffsetDateTime {
		self.created_at + TOAST_TTL
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CenterState {
	/// Nobody is signed in, nothing is polled.
	Idle,
	Polling,
	ToastVisible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
	Default,
	Granted,
	Denied,
	Unsupported,
}

/// Native (desktop) notifications.
pub trait NotificationSink {
	fn permission(&self) -> Permission;
	fn request_permission(&self) -> LocalBoxFuture<'_, Result<Permission, String>>;
	fn show(&self, toast: &Toast) -> Result<(), String>;
}

/// Where due items come from.
pub trait DueSource {
	fn poll_due(
		&self,
		user: Uuid,
		now: OffsetDateTime,
		limit: usize,
	) -> LocalBoxFuture<'_, Result<Vec<DueNotice>, ApiError>>;
}

#[derive(Debug, Default)]
pub struct ReminderCenter {
	user: Option<Uuid>,
	seen: HashSet<String>,
	toasts: VecDeque<Toast>,
}

impl ReminderCenter {
	pub fn user(&self) -> Option<Uuid> {
		self.user
	}

	pub fn state(&self) -> CenterState {
		match (self.user, self.toasts.is_empty()) {
			(None, _) => CenterState::Idle,
			(Some(_), true) => CenterState::Polling,
			(Some(_), false) => CenterState::ToastVisible,
		}
	}

	/// Switch the center to another user (or none). Returns true when it changed,
	/// in which case everything seen and shown so far is forgotten.
	pub fn set_user(&mut self, user: Option<Uuid>) -> bool {
		if self.user == user {
			return false;
		}
		self.user = user;
		self.seen.clear();
		self.toasts.clear();
		true
	}

	pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
		self.toasts.iter()
	}

	/// Turn notices into toasts, skipping anything already seen. The visible list is
	/// capped at [`MAX_TOASTS`] by dropping the oldest. Returns the new toasts.
	pub fn receive(&mut self, notices: Vec<DueNotice>, now: OffsetDateTime) -> Vec<Toast> {
		if self.user.is_none() {
			return Vec::new();
		}
		let mut created = Vec::new();
		for notice in notices {
			if !self.seen.insert(notice.seen_key()) {
				continue;
			}
			let toast = Toast {
				id: format!("{}-{}", notice.server_id, unix_millis(now)),
				server_id: notice.server_id,
				title: notice.title,
				body: notice.body,
				target: notice.target,
				created_at: now,
			};
			self.toasts.push_back(toast.clone());
			created.push(toast);
		}
		while self.toasts.len() > MAX_TOASTS {
			self.toasts.pop_front();
		}
		created
	}

	pub fn dismiss(&mut self, id: &str) -> bool {
		let before = self.toasts.len();
		self.toasts.retain(|toast| toast.id != id);
		before != self.toasts.len()
	}

	/// Drop toasts whose time is up. Returns true if any were removed.
	pub fn expire(&mut self, now: OffsetDateTime) -> bool {
		let before = self.toasts.len();
		self.toasts.retain(|toast| toast.expires_at() > now);
		before != self.toasts.len()
	}
}

/// Remembers whether notification permission was already asked for this session.
/// Clones share the flag, so every center in the app asks at most once between them.
#[derive(Clone, Debug, Default)]
pub struct PermissionGate(Rc<Cell<bool>>);

impl PermissionGate {
	/// True the first time it is asked while permission is undecided.
	pub fn should_request(&self, permission: Permission) -> bool {
		if permission != Permission::Default || self.0.get() {
			return false;
		}
		self.0.set(true);
		true
	}
}

/// One tick: poll and create toasts. Errors never escape, the caller just waits for the next tick.
pub async fn poll_once(center: &RefCell<ReminderCenter>, source: &dyn DueSource, clock: &dyn Clock) -> Vec<Toast> {
	let Some(user) = center.borrow().user() else {
		return Vec::new();
	};
	let notices = match source.poll_due(user, clock.now(), BATCH_LIMIT).await {
		Ok(notices) => notices,
		Err(err) => {
			log::debug!(target: "reminders", "poll failed: {err}");
			return Vec::new();
		}
	};
	// the user may have signed out while the request was in flight
	if center.borrow().user() != Some(user) {
		return Vec::new();
	}
	let now = clock.now();
	center.borrow_mut().receive(notices, now)
}

/// Attempt a native notification for each new toast, asking for permission first if
/// nobody has yet this session.
pub async fn deliver_native(sink: &dyn NotificationSink, gate: &PermissionGate, toasts: &[Toast]) {
	if toasts.is_empty() {
		return;
	}
	let mut permission = sink.permission();
	if gate.should_request(permission) {
		permission = match sink.request_permission().await {
			Ok(permission) => permission,
			Err(err) => {
				log::debug!(target: "reminders", "notification permission failed: {err}");
				Permission::Denied
			}
		};
	}
	if permission != Permission::Granted {
		return;
	}
	for toast in toasts {
		if let Err(err) = sink.show(toast) {
			log::debug!(target: "reminders", "notification for {} failed: {err}", toast.id);
		}
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;

	/// Records what would have been shown natively.
	pub struct FakeSink {
		pub permission: Cell<Permission>,
		pub grant_on_request: Option<Permission>,
		/// The prompt is never answered.
		pub prompt_open: bool,
		pub requests: Cell<usize>,
		pub shown: RefCell<Vec<Toast>>,
	}

	impl FakeSink {
		pub fn new(permission: Permission) -> Self {
			Self {
				permission: Cell::new(permission),
				grant_on_request: None,
				prompt_open: false,
				requests: Cell::new(0),
				shown: RefCell::new(Vec::new()),
			}
		}
	}

	impl NotificationSink for FakeSink {
		fn permission(&self) -> Permission {
			self.permission.get()
		}

		fn request_permission(&self) -> LocalBoxFuture<'_, Result<Permission, String>> {
			self.requests.set(self.requests.get() + 1);
			if self.prompt_open {
				return Box::pin(futures::future::pending());
			}
			let answer = self.grant_on_request;
			if let Some(permission) = answer {
				self.permission.set(permission);
			}
			Box::pin(async move { answer.ok_or_else(|| "dismissed".to_owned()) })
		}

		fn show(&self, toast: &Toast) -> Result<(), String> {
			self.shown.borrow_mut().push(toast.clone());
			Ok(())
		}
	}

	/// Returns whatever was queued, once.
	#[derive(Default)]
	pub struct QueuedSource(pub RefCell<VecDeque<Result<Vec<DueNotice>, ApiError>>>);

	impl DueSource for QueuedSource {
		fn poll_due(
			&self,
			_user: Uuid,
			_now: OffsetDateTime,
			limit: usize,
		) -> LocalBoxFuture<'_, Result<Vec<DueNotice>, ApiError>> {
			let next = self.0.borrow_mut().pop_front().unwrap_or(Ok(Vec::new()));
			Box::pin(async move { next.map(|notices| notices.into_iter().take(limit).collect()) })
		}
	}

	pub fn notice(id: u64) -> DueNotice {
		DueNotice {
			server_id: format!("r{id}"),
			occurrence: 0,
			title: format!("Watch reminder: {id}"),
			body: None,
			target: TitleRef::movie(id),
		}
	}
}
