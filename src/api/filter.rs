//! Query-string builder for the backend's REST conventions
//! (`column=op.value`, `or=(...)`, `order`, `limit`, `on_conflict`).
use itertools::Itertools;
use std::fmt::Display;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub static PREFER_REPRESENTATION: &str = "return=representation";
pub static PREFER_MINIMAL: &str = "return=minimal";
pub static PREFER_MERGE: &str = "resolution=merge-duplicates";
pub static PREFER_COUNT: &str = "count=exact";

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
	Eq(String),
	Neq(String),
	Lt(String),
	Lte(String),
	Gt(String),
	Gte(String),
	/// `null`, `true` or `false`
	Is(&'static str),
	In(Vec<String>),
	/// Pattern where `*` matches any run of characters.
	ILike(String),
}

impl Filter {
	pub fn operand(&self) -> String {
		match self {
			Self::Eq(v) => format!("eq.{v}"),
			Self::Neq(v) => format!("neq.{v}"),
			Self::Lt(v) => format!("lt.{v}"),
			Self::Lte(v) => format!("lte.{v}"),
			Self::Gt(v) => format!("gt.{v}"),
			Self::Gte(v) => format!("gte.{v}"),
			Self::Is(v) => format!("is.{v}"),
			Self::In(values) => format!("in.({})", values.iter().map(|v| quote(v)).join(",")),
			Self::ILike(pattern) => format!("ilike.{pattern}"),
		}
	}

	/// `column.op.value`, the form used inside `or=(...)`.
	pub fn condition(&self, column: &str) -> String {
		format!("{column}.{}", self.operand())
	}

	pub fn contains(text: &str) -> Self {
		Self::ILike(format!("*{}*", sanitize_pattern(text)))
	}

	pub fn starts_with(text: &str) -> Self {
		Self::ILike(format!("{}*", sanitize_pattern(text)))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
	Asc,
	Desc,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
	pairs: Vec<(String, String)>,
	orders: Vec<String>,
}

impl Query {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn select(self, columns: &str) -> Self {
		self.pair("select", columns)
	}

	pub fn filter(self, column: &str, filter: Filter) -> Self {
		let operand = filter.operand();
		self.pair(column, operand)
	}

	pub fn eq(self, column: &str, value: impl Display) -> Self {
		self.filter(column, Filter::Eq(value.to_string()))
	}

	pub fn lte_time(self, column: &str, at: OffsetDateTime) -> Self {
		self.filter(column, Filter::Lte(timestamp(at)))
	}

	pub fn gt_time(self, column: &str, at: OffsetDateTime) -> Self {
		self.filter(column, Filter::Gt(timestamp(at)))
	}

	pub fn is_null(self, column: &str) -> Self {
		self.filter(column, Filter::Is("null"))
	}

	pub fn is_in<I, V>(self, column: &str, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Display,
	{
		self.filter(column, Filter::In(values.into_iter().map(|v| v.to_string()).collect()))
	}

	pub fn or(self, conditions: &[(&str, Filter)]) -> Self {
		let joined = conditions.iter().map(|(column, filter)| filter.condition(column)).join(",");
		self.pair("or", format!("({joined})"))
	}

	pub fn order(mut self, column: &str, order: Order) -> Self {
		self.orders.push(match order {
			Order::Asc => format!("{column}.asc"),
			Order::Desc => format!("{column}.desc"),
		});
		self
	}

	pub fn limit(self, limit: usize) -> Self {
		self.pair("limit", limit.to_string())
	}

	pub fn on_conflict(self, columns: &[&str]) -> Self {
		self.pair("on_conflict", columns.join(","))
	}

	fn pair(mut self, key: &str, value: impl Into<String>) -> Self {
		self.pairs.push((key.to_owned(), value.into()));
		self
	}

	pub fn pairs(&self) -> Vec<(String, String)> {
		let mut pairs = self.pairs.clone();
		if !self.orders.is_empty() {
			pairs.push(("order".to_owned(), self.orders.join(",")));
		}
		pairs
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty() && self.orders.is_empty()
	}
}

pub fn timestamp(at: OffsetDateTime) -> String {
	at.format(&Rfc3339).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Characters with meaning in filter syntax are dropped from user text.
fn sanitize_pattern(text: &str) -> String {
	text.trim().chars().filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')' | '"' | '\\')).collect()
}

fn quote(value: &str) -> String {
	match value.contains([',', '(', ')', '"', ' ']) {
		true => format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")),
		false => value.to_owned(),
	}
}
