//! In-memory stand-ins for the backend, used by unit tests across the crate.
use super::{ApiError, ApiRequest, Gateway, Method, RawResponse, TokenSource, Transport};
use crate::config::BackendConfig;
use futures_util::future::LocalBoxFuture;
use serde_json::{json, Map, Value};
use std::{
	cell::RefCell,
	cmp::Ordering,
	collections::{HashMap, HashSet, VecDeque},
	rc::Rc,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
	fn access_token(&self) -> Option<String> {
		self.0.clone()
	}
}

pub fn test_config() -> BackendConfig {
	BackendConfig {
		url: "https://demo.supabase.co".into(),
		anon_key: "anon".into(),
	}
}

/// Records every request and answers from a queue (default `200 []`).
#[derive(Default)]
pub struct RecordingTransport {
	requests: RefCell<Vec<ApiRequest>>,
	responses: RefCell<VecDeque<RawResponse>>,
	stall: bool,
}

impl RecordingTransport {
	pub fn stalled() -> Self {
		Self {
			stall: true,
			..Default::default()
		}
	}

	pub fn respond(&self, status: u16, body: &str) {
		self.responses.borrow_mut().push_back(RawResponse {
			status,
			body: body.to_owned(),
		});
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.requests.borrow().clone()
	}
}

impl Transport for RecordingTransport {
	fn execute(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<RawResponse, ApiError>> {
		self.requests.borrow_mut().push(request);
		if self.stall {
			return Box::pin(futures::future::pending());
		}
		let response = self.responses.borrow_mut().pop_front().unwrap_or(RawResponse {
			status: 200,
			body: "[]".into(),
		});
		Box::pin(async move { Ok(response) })
	}
}

type Row = Map<String, Value>;

#[derive(Default)]
struct State {
	tables: HashMap<String, Vec<Row>>,
	unique: HashMap<String, Vec<Vec<String>>>,
	requests: Vec<ApiRequest>,
	scripted: VecDeque<RawResponse>,
	users: Vec<(String, String, Value)>,
	token_counter: u32,
	inserted: i64,
	tokens: HashMap<String, String>,
	expired: HashSet<String>,
}

/// A small emulation of the backend's REST and auth endpoints over in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryBackend(Rc<RefCell<State>>);

impl MemoryBackend {
	/// The unique constraints of the app's tables.
	pub fn with_schema() -> Self {
		Self::default()
			.with_unique("profiles", &["username"])
			.with_unique("friendships", &["user_id", "friend_id"])
			.with_unique("friend_recommendations", &["sender_id", "recipient_id", "movie_id"])
			.with_unique("watch_reminders", &["user_id", "movie_id"])
			.with_unique("watch_groups", &["id"])
			.with_unique("watch_group_members", &["group_id", "user_id"])
			.with_unique("watch_group_picks", &["group_id", "movie_id"])
			.with_unique("watch_group_votes", &["pick_id", "user_id"])
			.with_unique("watch_group_invites", &["group_id", "invitee_id"])
			.with_unique("push_subscriptions", &["endpoint"])
			.with_unique("watchlist", &["user_id", "movie_id"])
	}

	pub fn with_unique(self, table: &str, columns: &[&str]) -> Self {
		self.0
			.borrow_mut()
			.unique
			.entry(table.to_owned())
			.or_default()
			.push(columns.iter().map(|c| c.to_string()).collect());
		self
	}

	pub fn seed(&self, table: &str, rows: Vec<Value>) {
		let mut state = self.0.borrow_mut();
		let entries = state.tables.entry(table.to_owned()).or_default();
		for row in rows {
			if let Value::Object(row) = row {
				entries.push(row);
			}
		}
	}

	pub fn rows(&self, table: &str) -> Vec<Value> {
		let state = self.0.borrow();
		let rows = state.tables.get(table).cloned().unwrap_or_default();
		rows.into_iter().map(Value::Object).collect()
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.0.borrow().requests.clone()
	}

	/// The next request is answered with this response instead of being emulated.
	pub fn push_response(&self, status: u16, body: Value) {
		self.0.borrow_mut().scripted.push_back(RawResponse {
			status,
			body: body.to_string(),
		});
	}

	/// Table requests signed with `token` are rejected from now on, as the server does once a JWT expires.
	pub fn expire_token(&self, token: &str) {
		self.0.borrow_mut().expired.insert(token.to_owned());
	}

	pub fn gateway(&self, token: Option<&str>) -> Gateway {
		let tokens = Rc::new(StaticToken(token.map(str::to_owned)));
		Gateway::new(&test_config(), tokens, Rc::new(self.clone())).expect("valid test config")
	}

	fn handle(&self, request: &ApiRequest) -> RawResponse {
		let mut state = self.0.borrow_mut();
		state.requests.push(request.clone());
		if let Some(response) = state.scripted.pop_front() {
			return response;
		}
		let path = request.url.path().to_owned();
		if let Some(table) = path.strip_prefix("/rest/v1/") {
			let bearer = request.header("Authorization").unwrap_or_default().trim_start_matches("Bearer ");
			if state.expired.contains(bearer) {
				return reply(401, json!({ "code": "PGRST301", "message": "JWT expired" }));
			}
			return state.rest(table, request);
		}
		if let Some(endpoint) = path.strip_prefix("/auth/v1/") {
			return state.auth(endpoint, request);
		}
		reply(404, json!({ "message": format!("no route for {path}") }))
	}
}

impl Transport for MemoryBackend {
	fn execute(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<RawResponse, ApiError>> {
		let response = self.handle(&request);
		Box::pin(async move { Ok(response) })
	}
}

fn reply(status: u16, body: Value) -> RawResponse {
	RawResponse {
		status,
		body: match body {
			Value::Null => String::new(),
			body => body.to_string(),
		},
	}
}

struct Params {
	filters: Vec<(String, String)>,
	order: Option<String>,
	limit: Option<usize>,
	on_conflict: Option<Vec<String>>,
}

impl Params {
	fn parse(request: &ApiRequest) -> Self {
		let mut params = Self {
			filters: Vec::new(),
			order: None,
			limit: None,
			on_conflict: None,
		};
		for (key, value) in request.url.query_pairs() {
			match key.as_ref() {
				"select" | "grant_type" => {}
				"order" => params.order = Some(value.into_owned()),
				"limit" => params.limit = value.parse().ok(),
				"on_conflict" => params.on_conflict = Some(value.split(',').map(str::to_owned).collect()),
				_ => params.filters.push((key.into_owned(), value.into_owned())),
			}
		}
		params
	}

	fn matches(&self, row: &Row) -> bool {
		self.filters.iter().all(|(column, operand)| match column.as_str() {
			"or" => split_top_level(operand.trim_start_matches('(').trim_end_matches(')'))
				.into_iter()
				.any(|condition| match condition.split_once('.') {
					Some((column, operand)) => matches_operand(row.get(column), operand),
					None => false,
				}),
			column => matches_operand(row.get(column), operand),
		})
	}
}

fn split_top_level(text: &str) -> Vec<String> {
	let mut parts = Vec::new();
	let mut current = String::new();
	let mut depth = 0usize;
	let mut quoted = false;
	for c in text.chars() {
		match c {
			'"' => quoted = !quoted,
			'(' if !quoted => depth += 1,
			')' if !quoted => depth = depth.saturating_sub(1),
			',' if !quoted && depth == 0 => {
				parts.push(std::mem::take(&mut current));
				continue;
			}
			_ => {}
		}
		current.push(c);
	}
	if !current.is_empty() {
		parts.push(current);
	}
	parts
}

fn repr(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Number(n) => Some(n.to_string()),
		other => Some(other.to_string()),
	}
}

fn compare(a: &str, b: &str) -> Ordering {
	if let (Ok(a), Ok(b)) = (OffsetDateTime::parse(a, &Rfc3339), OffsetDateTime::parse(b, &Rfc3339)) {
		return a.cmp(&b);
	}
	if let (Ok(a), Ok(b)) = (a.parse::<f64>(), b.parse::<f64>()) {
		return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
	}
	a.cmp(b)
}

fn matches_operand(value: Option<&Value>, operand: &str) -> bool {
	let Some((op, expected)) = operand.split_once('.') else {
		return false;
	};
	let actual = repr(value);
	match op {
		"is" => match expected {
			"null" => actual.is_none(),
			other => actual.as_deref() == Some(other),
		},
		"eq" => actual.as_deref() == Some(expected),
		"neq" => actual.as_deref() != Some(expected),
		"lt" => actual.map_or(false, |a| compare(&a, expected) == Ordering::Less),
		"lte" => actual.map_or(false, |a| compare(&a, expected) != Ordering::Greater),
		"gt" => actual.map_or(false, |a| compare(&a, expected) == Ordering::Greater),
		"gte" => actual.map_or(false, |a| compare(&a, expected) != Ordering::Less),
		"in" => {
			let list = expected.trim_start_matches('(').trim_end_matches(')');
			let options = split_top_level(list)
				.into_iter()
				.map(|item| item.trim_matches('"').replace("\\\"", "\""))
				.collect::<Vec<_>>();
			actual.map_or(false, |a| options.contains(&a))
		}
		"ilike" => {
			let pattern = expected.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
			let Ok(pattern) = regex::Regex::new(&format!("(?i)^{pattern}$")) else {
				return false;
			};
			actual.map_or(false, |a| pattern.is_match(&a))
		}
		_ => false,
	}
}

fn prefers(request: &ApiRequest, directive: &str) -> bool {
	request.header("Prefer").map_or(false, |prefer| prefer.split(',').any(|d| d.trim() == directive))
}

impl State {
	fn rest(&mut self, table: &str, request: &ApiRequest) -> RawResponse {
		let params = Params::parse(request);
		let representation = prefers(request, "return=representation");
		match request.method {
			Method::Get => {
				let mut rows = self
					.tables
					.get(table)
					.map(|rows| rows.iter().filter(|row| params.matches(row)).cloned().collect::<Vec<_>>())
					.unwrap_or_default();
				if let Some(order) = &params.order {
					for term in order.split(',').rev() {
						let (column, direction) = term.split_once('.').unwrap_or((term, "asc"));
						rows.sort_by(|a, b| {
							let ordering = match (repr(a.get(column)), repr(b.get(column))) {
								(Some(a), Some(b)) => compare(&a, &b),
								(None, Some(_)) => Ordering::Greater,
								(Some(_), None) => Ordering::Less,
								(None, None) => Ordering::Equal,
							};
							match direction {
								"desc" => ordering.reverse(),
								_ => ordering,
							}
						});
					}
				}
				if let Some(limit) = params.limit {
					rows.truncate(limit);
				}
				reply(200, Value::Array(rows.into_iter().map(Value::Object).collect()))
			}
			Method::Post => {
				let incoming = match &request.body {
					Some(Value::Array(rows)) => rows.clone(),
					Some(row @ Value::Object(_)) => vec![row.clone()],
					_ => return reply(400, json!({ "message": "missing body" })),
				};
				let merge = prefers(request, "resolution=merge-duplicates");
				let mut written = Vec::new();
				for row in incoming {
					let Value::Object(mut row) = row else { continue };
					row.entry("id").or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
					// stands in for a `default now()` column, one second apart so ordering is stable
					self.inserted += 1;
					let stamp = OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(1_790_000_000 + self.inserted);
					row.entry("created_at")
						.or_insert_with(|| Value::String(stamp.format(&Rfc3339).unwrap_or_default()));
					match self.insert(table, row, merge, params.on_conflict.as_deref()) {
						Ok(row) => written.push(Value::Object(row)),
						Err(response) => return response,
					}
				}
				match representation {
					true => reply(201, Value::Array(written)),
					false => reply(201, Value::Null),
				}
			}
			Method::Patch => {
				let Some(Value::Object(changes)) = &request.body else {
					return reply(400, json!({ "message": "missing body" }));
				};
				let rows = self.tables.entry(table.to_owned()).or_default();
				let mut written = Vec::new();
				for row in rows.iter_mut().filter(|row| params.matches(row)) {
					for (key, value) in changes {
						row.insert(key.clone(), value.clone());
					}
					written.push(Value::Object(row.clone()));
				}
				match representation {
					true => reply(200, Value::Array(written)),
					false => reply(204, Value::Null),
				}
			}
			Method::Delete => {
				let rows = self.tables.entry(table.to_owned()).or_default();
				let (removed, kept): (Vec<Row>, Vec<Row>) = rows.drain(..).partition(|row| params.matches(row));
				*rows = kept;
				match representation {
					true => reply(200, Value::Array(removed.into_iter().map(Value::Object).collect())),
					false => reply(204, Value::Null),
				}
			}
		}
	}

	fn insert(&mut self, table: &str, row: Row, merge: bool, on_conflict: Option<&[String]>) -> Result<Row, RawResponse> {
		let keys = self.unique.get(table).cloned().unwrap_or_default();
		let rows = self.tables.entry(table.to_owned()).or_default();
		for key in &keys {
			let same_key = |existing: &Row| key.iter().all(|column| repr(existing.get(column)) == repr(row.get(column)));
			let Some(existing) = rows.iter_mut().find(|existing| same_key(existing)) else {
				continue;
			};
			let targets_key = on_conflict.map_or(false, |columns| columns == key.as_slice());
			if merge && targets_key {
				for (column, value) in row {
					// generated columns keep their stored values
					if column != "id" && column != "created_at" {
						existing.insert(column, value);
					}
				}
				return Ok(existing.clone());
			}
			return Err(reply(
				409,
				json!({
					"code": "23505",
					"message": format!("duplicate key value violates unique constraint \"{table}_{}_key\"", key.join("_")),
				}),
			));
		}
		rows.push(row.clone());
		Ok(row)
	}

	fn issue_session(&mut self, user_id: &str, email: &str) -> Value {
		self.token_counter += 1;
		let access = format!("access-{}", self.token_counter);
		self.tokens.insert(access.clone(), user_id.to_owned());
		json!({
			"access_token": access,
			"refresh_token": format!("refresh-{user_id}"),
			"token_type": "bearer",
			"expires_in": 3600,
			"user": { "id": user_id, "email": email },
		})
	}

	fn auth(&mut self, endpoint: &str, request: &ApiRequest) -> RawResponse {
		let body = request.body.clone().unwrap_or(Value::Null);
		let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default().to_owned();
		let grant = request
			.url
			.query_pairs()
			.find(|(key, _)| key == "grant_type")
			.map(|(_, value)| value.into_owned());
		match (endpoint, grant.as_deref()) {
			("signup", _) => {
				let email = field("email");
				if self.users.iter().any(|(known, _, _)| *known == email) {
					return reply(422, json!({ "code": 422, "msg": "User already registered" }));
				}
				let id = uuid::Uuid::new_v4().to_string();
				self.users.push((email.clone(), field("password"), json!({ "id": id })));
				reply(200, self.issue_session(&id, &email))
			}
			("token", Some("password")) => {
				let (email, password) = (field("email"), field("password"));
				let user = self.users.iter().find(|(known, secret, _)| *known == email && *secret == password);
				let Some((_, _, user)) = user.cloned() else {
					return reply(
						400,
						json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
					);
				};
				let id = user["id"].as_str().unwrap_or_default().to_owned();
				reply(200, self.issue_session(&id, &email))
			}
			("token", Some("refresh_token")) => {
				let token = field("refresh_token");
				let Some(id) = token.strip_prefix("refresh-").map(str::to_owned) else {
					return reply(400, json!({ "error": "invalid_grant", "error_description": "Invalid Refresh Token" }));
				};
				let email = self
					.users
					.iter()
					.find(|(_, _, user)| user["id"] == id.as_str())
					.map(|(email, _, _)| email.clone())
					.unwrap_or_default();
				reply(200, self.issue_session(&id, &email))
			}
			("logout", _) => reply(204, Value::Null),
			("user", _) => {
				let bearer = request.header("Authorization").unwrap_or_default().trim_start_matches("Bearer ");
				match self.tokens.get(bearer) {
					Some(id) => reply(200, json!({ "id": id })),
					None => reply(401, json!({ "msg": "invalid JWT" })),
				}
			}
			_ => reply(404, json!({ "msg": format!("no auth route {endpoint}") })),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::filter::{Filter, Query};
	use futures::executor::block_on;

	#[test]
	fn emulator_filters_and_orders() {
		let backend = MemoryBackend::default();
		backend.seed(
			"titles",
			vec![
				json!({ "id": "1", "name": "Dune", "year": 2021 }),
				json!({ "id": "2", "name": "Dune: Part Two", "year": 2024 }),
				json!({ "id": "3", "name": "Arrival", "year": 2016 }),
			],
		);
		let gateway = backend.gateway(None);
		let query = Query::new()
			.filter("name", Filter::contains("dune"))
			.order("year", crate::api::filter::Order::Desc)
			.limit(1);
		let rows: Vec<Value> = block_on(gateway.table(Method::Get, "titles").with_query(&query).send()).unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0]["id"], "2");
	}

	#[test]
	fn unique_keys_conflict_unless_merged() {
		let backend = MemoryBackend::default().with_unique("votes", &["pick_id", "user_id"]);
		let gateway = backend.gateway(None);
		let vote = json!({ "pick_id": "p", "user_id": "u", "weight": 1 });
		block_on(gateway.table::<()>(Method::Post, "votes").with_json(&vote).send_empty()).unwrap();
		let err = block_on(gateway.table::<()>(Method::Post, "votes").with_json(&vote).send_empty()).unwrap_err();
		assert!(err.is_conflict());
		let merged = json!({ "pick_id": "p", "user_id": "u", "weight": 2 });
		block_on(
			gateway
				.table::<()>(Method::Post, "votes")
				.with_query(&Query::new().on_conflict(&["pick_id", "user_id"]))
				.prefer("resolution=merge-duplicates")
				.with_json(&merged)
				.send_empty(),
		)
		.unwrap();
		let rows = backend.rows("votes");
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0]["weight"], 2);
	}
}
