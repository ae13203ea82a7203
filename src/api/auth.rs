//! Email/password authentication against the backend's auth endpoints.
use super::{filter::Query, ApiError, Gateway, Method, TokenSource};
use crate::{
	clock::Clock,
	data::{Profile, Record},
	session::{AuthSession, SessionStore, SessionUser},
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use futures_util::{
	future::{LocalBoxFuture, Shared},
	FutureExt,
};
use serde_json::Value;
use std::{cell::RefCell, rc::Rc};
use uuid::Uuid;

pub static USERNAME_TAKEN: &str = "That username is already taken";

lazy_static! {
	static ref USERNAME: regex::Regex = regex::Regex::new(r"^[a-z0-9_.]+$").expect("valid username pattern");
}

/// Changes to the signed-in session, delivered to whoever holds [`AuthClient::subscribe`].
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
	SignedIn(AuthSession),
	TokenRefreshed(AuthSession),
	SignedOut,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignUp {
	pub email: String,
	pub password: String,
	pub username: String,
	pub name: String,
}

impl SignUp {
	/// Checks run before anything is sent. Returns the normalized request.
	pub fn validate(&self) -> Result<Self, ApiError> {
		let username = self.username.trim().to_lowercase();
		if username.chars().count() < 3 {
			return Err(ApiError::invalid("Username must be at least 3 characters"));
		}
		if username.chars().count() > 24 {
			return Err(ApiError::invalid("Username must be at most 24 characters"));
		}
		if !USERNAME.is_match(&username) {
			return Err(ApiError::invalid(
				"Usernames may only contain letters, numbers, periods and underscores",
			));
		}
		let email = self.email.trim().to_owned();
		if !email.contains('@') {
			return Err(ApiError::invalid("Enter a valid email address"));
		}
		if self.password.chars().count() < 6 {
			return Err(ApiError::invalid("Password must be at least 6 characters"));
		}
		Ok(Self {
			email,
			password: self.password.clone(),
			username,
			name: self.name.trim().to_owned(),
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum SignUpOutcome {
	SignedIn(AuthSession),
	/// The account exists but the address must be confirmed before signing in.
	ConfirmEmail,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	refresh_token: String,
	expires_in: i64,
	user: SessionUser,
}

#[derive(Serialize)]
struct NewProfile<'a> {
	id: Uuid,
	username: &'a str,
	name: &'a str,
	email: &'a str,
}

type Refresh = Shared<LocalBoxFuture<'static, Result<AuthSession, ApiError>>>;

#[derive(Clone)]
pub struct AuthClient {
	gateway: Gateway,
	sessions: SessionStore,
	clock: Rc<dyn Clock>,
	sender: async_channel::Sender<AuthEvent>,
	receiver: async_channel::Receiver<AuthEvent>,
	/// The refresh in flight. Refresh tokens are single use, so concurrent callers join it.
	refreshing: Rc<RefCell<Option<Refresh>>>,
}

impl PartialEq for AuthClient {
	fn eq(&self, other: &Self) -> bool {
		self.gateway == other.gateway
	}
}

impl AuthClient {
	pub fn new(gateway: Gateway, sessions: SessionStore, clock: Rc<dyn Clock>) -> Self {
		let (sender, receiver) = async_channel::unbounded();
		Self {
			gateway,
			sessions,
			clock,
			sender,
			receiver,
			refreshing: Rc::default(),
		}
	}

	pub fn subscribe(&self) -> async_channel::Receiver<AuthEvent> {
		self.receiver.clone()
	}

	fn emit(&self, event: AuthEvent) {
		// unbounded and we hold a receiver, so this only fails if the channel is closed
		if let Err(err) = self.sender.try_send(event) {
			log::warn!(target: "auth", "dropped auth event: {err}");
		}
	}

	fn into_session(&self, response: TokenResponse) -> AuthSession {
		AuthSession {
			access_token: response.access_token,
			refresh_token: response.refresh_token,
			expires_at: self.clock.now() + time::Duration::seconds(response.expires_in),
			user: response.user,
		}
	}

	fn store(&self, session: &AuthSession) -> Result<(), ApiError> {
		self.sessions
			.set(session)
			.map_err(|err| ApiError::invalid(format!("Could not save your session: {err}")))
	}

	pub async fn sign_up(&self, request: SignUp) -> Result<SignUpOutcome, ApiError> {
		let request = request.validate()?;

		let existing: Vec<Value> = self
			.gateway
			.table(Method::Get, Profile::table())
			.with_query(&Query::new().select("id").eq("username", &request.username).limit(1))
			.send()
			.await?;
		if !existing.is_empty() {
			return Err(ApiError::invalid(USERNAME_TAKEN));
		}

		let body = serde_json::json!({
			"email": request.email,
			"password": request.password,
			"data": { "username": request.username, "name": request.name },
		});
		let response: Value = self.gateway.auth(Method::Post, "signup").with_json(&body).send().await?;
		if response.get("access_token").is_none() {
			log::info!(target: "auth", "sign up requires email confirmation");
			return Ok(SignUpOutcome::ConfirmEmail);
		}
		let session = self.into_session(serde_json::from_value(response)?);
		self.store(&session)?;

		let profile = NewProfile {
			id: session.user_id(),
			username: &request.username,
			name: &request.name,
			email: &request.email,
		};
		let inserted = self
			.gateway
			.table::<()>(Method::Post, Profile::table())
			.with_json(&profile)
			.send_empty()
			.await;
		if let Err(err) = inserted {
			self.sessions.clear();
			return Err(err.map_conflict(USERNAME_TAKEN));
		}

		self.emit(AuthEvent::SignedIn(session.clone()));
		Ok(SignUpOutcome::SignedIn(session))
	}

	pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
		let email = email.trim();
		if email.is_empty() || password.is_empty() {
			return Err(ApiError::invalid("Enter your email and password"));
		}
		let response: TokenResponse = self
			.gateway
			.auth(Method::Post, "token")
			.with_param("grant_type", "password")
			.with_json(&serde_json::json!({ "email": email, "password": password }))
			.send()
			.await?;
		let session = self.into_session(response);
		self.store(&session)?;
		self.emit(AuthEvent::SignedIn(session.clone()));
		Ok(session)
	}

	/// Exchange the stored refresh token for a new session.
	/// A rejected token signs the user out, transport failures keep the stored session.
	pub async fn refresh(&self) -> Result<AuthSession, ApiError> {
		let pending = self.refreshing.borrow().clone();
		let refresh = match pending {
			Some(refresh) => refresh,
			None => {
				let client = self.clone();
				let refresh = async move {
					let result = client.exchange_refresh_token().await;
					client.refreshing.borrow_mut().take();
					result
				}
				.boxed_local()
				.shared();
				*self.refreshing.borrow_mut() = Some(refresh.clone());
				refresh
			}
		};
		refresh.await
	}

	async fn exchange_refresh_token(&self) -> Result<AuthSession, ApiError> {
		let Some(current) = self.sessions.get() else {
			return Err(ApiError::SignedOut);
		};
		let response = self
			.gateway
			.auth::<TokenResponse>(Method::Post, "token")
			.with_param("grant_type", "refresh_token")
			.with_json(&serde_json::json!({ "refresh_token": current.refresh_token }))
			.send()
			.await;
		match response {
			Ok(response) => {
				let session = self.into_session(response);
				self.store(&session)?;
				self.emit(AuthEvent::TokenRefreshed(session.clone()));
				Ok(session)
			}
			Err(err @ ApiError::Server { status: 400..=499, .. }) => {
				log::info!(target: "auth", "refresh rejected, signing out: {err}");
				self.sessions.clear();
				self.emit(AuthEvent::SignedOut);
				Err(ApiError::SignedOut)
			}
			Err(err) => Err(err),
		}
	}

	/// The stored session, refreshed first when it has expired.
	pub async fn current_session(&self) -> Result<Option<AuthSession>, ApiError> {
		match self.sessions.get() {
			Some(session) if session.is_expired(self.clock.now()) => match self.refresh().await {
				Ok(session) => Ok(Some(session)),
				Err(ApiError::SignedOut) => Ok(None),
				Err(err) => Err(err),
			},
			session => Ok(session),
		}
	}

	pub async fn sign_out(&self) {
		if self.sessions.get().is_some() {
			// the local session is cleared whether or not the server hears about it
			if let Err(err) = self.gateway.auth::<()>(Method::Post, "logout").send_empty().await {
				log::debug!(target: "auth", "logout request failed: {err}");
			}
		}
		self.sessions.clear();
		self.emit(AuthEvent::SignedOut);
	}
}

impl TokenSource for AuthClient {
	fn access_token(&self) -> Option<String> {
		self.sessions.access_token()
	}

	fn renew(&self) -> LocalBoxFuture<'_, ()> {
		Box::pin(async move {
			let expired = self.sessions.get().is_some_and(|session| session.is_expired(self.clock.now()));
			if !expired {
				return;
			}
			log::debug!(target: "auth", "session expired, refreshing before the request");
			if let Err(err) = self.refresh().await {
				log::warn!(target: "auth", "session refresh failed: {err}");
			}
		})
	}
}
