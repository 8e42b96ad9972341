use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Record;

/// Outcome status reported to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
	#[default]
	Success,
	Failure,
	ValidationError,
}

/// Result of an operation: a status plus zero or more rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub status: ResponseStatus,
	#[serde(default)]
	pub data: Vec<Record>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_rows: Option<u64>,
}

impl Response {
	/// Successful response carrying `rows`.
	pub fn success(rows: Vec<Record>) -> Self {
		let total = rows.len() as u64;
		Self {
			status: ResponseStatus::Success,
			data: rows,
			total_rows: Some(total),
		}
	}

	/// Successful response carrying a single row.
	pub fn single(row: Record) -> Self {
		Self::success(vec![row])
	}

	/// Successful response with no rows.
	pub fn empty() -> Self {
		Self::success(Vec::new())
	}

	pub fn is_success(&self) -> bool {
		self.status == ResponseStatus::Success
	}

	/// Returns `field` from the first row, if any.
	pub fn first_value(&self, field: &str) -> Option<&Value> {
		self.data.first()?.get(field)
	}
}

impl From<Record> for Response {
	fn from(row: Record) -> Self {
		Self::single(row)
	}
}

impl From<Vec<Record>> for Response {
	fn from(rows: Vec<Record>) -> Self {
		Self::success(rows)
	}
}

impl From<()> for Response {
	fn from((): ()) -> Self {
		Self::empty()
	}
}
