use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single row of field values keyed by field name.
pub type Record = serde_json::Map<String, Value>;

/// The kind of operation a request performs against a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
	Fetch,
	Add,
	Update,
	Remove,
	Custom,
}

impl OperationType {
	/// Returns the lowercase wire name of the operation type.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Fetch => "fetch",
			Self::Add => "add",
			Self::Update => "update",
			Self::Remove => "remove",
			Self::Custom => "custom",
		}
	}
}

impl std::fmt::Display for OperationType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for OperationType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"fetch" => Ok(Self::Fetch),
			"add" => Ok(Self::Add),
			"update" => Ok(Self::Update),
			"remove" => Ok(Self::Remove),
			"custom" => Ok(Self::Custom),
			other => Err(format!("unknown operation type '{other}'")),
		}
	}
}

const CRITERIA_CONSTRUCTOR_KEY: &str = "_constructor";

const ADVANCED_CONSTRUCTOR: &str = "AdvancedCriteria";

/// Structured boolean-expression criteria.
///
/// Leaf nodes carry `field` and `value`; `and`/`or`/`not` nodes carry nested
/// `criteria`. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AdvancedCriteriaWire")]
pub struct AdvancedCriteria {
	pub operator: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub field_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub criteria: Vec<AdvancedCriteria>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AdvancedCriteriaWire {
	#[serde(rename = "_constructor", default)]
	constructor: Option<String>,
	operator: String,
	#[serde(default)]
	field_name: Option<String>,
	#[serde(default)]
	value: Option<Value>,
	#[serde(default)]
	criteria: Vec<AdvancedCriteria>,
}

impl TryFrom<AdvancedCriteriaWire> for AdvancedCriteria {
	type Error = String;

	fn try_from(wire: AdvancedCriteriaWire) -> Result<Self, Self::Error> {
		match wire.constructor.as_deref() {
			None | Some(ADVANCED_CONSTRUCTOR) => Ok(Self {
				operator: wire.operator,
				field_name: wire.field_name,
				value: wire.value,
				criteria: wire.criteria,
			}),
			Some(other) => Err(format!("unexpected {CRITERIA_CONSTRUCTOR_KEY} '{other}'")),
		}
	}
}

impl AdvancedCriteria {
	/// Creates a leaf criterion comparing `field` against `value`.
	pub fn leaf(operator: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			operator: operator.into(),
			field_name: Some(field.into()),
			value: Some(value.into()),
			criteria: Vec::new(),
		}
	}

	/// Creates a composite criterion joining `criteria` with `operator`.
	pub fn composite(operator: impl Into<String>, criteria: Vec<AdvancedCriteria>) -> Self {
		Self {
			operator: operator.into(),
			field_name: None,
			value: None,
			criteria,
		}
	}
}

/// Filter payload attached to a request.
///
/// On the wire, advanced criteria are objects whose `_constructor` is
/// `"AdvancedCriteria"`. Every other object is a flat filter, even one with
/// an `operator` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
	/// Boolean expression tree.
	Advanced(AdvancedCriteria),
	/// Flat field/value mapping.
	Simple(Record),
}

impl Serialize for Criteria {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		#[derive(Serialize)]
		struct Marked<'a> {
			#[serde(rename = "_constructor")]
			constructor: &'static str,
			#[serde(flatten)]
			criteria: &'a AdvancedCriteria,
		}

		match self {
			Self::Simple(map) => map.serialize(serializer),
			Self::Advanced(adv) => Marked {
				constructor: ADVANCED_CONSTRUCTOR,
				criteria: adv,
			}
			.serialize(serializer),
		}
	}
}

impl<'de> Deserialize<'de> for Criteria {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let map = Record::deserialize(deserializer)?;
		if map.get(CRITERIA_CONSTRUCTOR_KEY).and_then(Value::as_str) != Some(ADVANCED_CONSTRUCTOR) {
			return Ok(Self::Simple(map));
		}
		AdvancedCriteria::deserialize(Value::Object(map))
			.map(Self::Advanced)
			.map_err(serde::de::Error::custom)
	}
}

impl Criteria {
	/// Converts the criteria into a JSON value for template contexts.
	pub fn to_value(&self) -> Value {
		match self {
			Self::Simple(map) => Value::Object(map.clone()),
			Self::Advanced(adv) => serde_json::to_value(adv).unwrap_or(Value::Null),
		}
	}
}

/// An operation request addressed to a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	pub data_source: String,
	pub operation_type: OperationType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub operation_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub criteria: Option<Criteria>,
	#[serde(default)]
	pub values: Record,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub old_values: Option<Record>,
}

impl Request {
	/// Creates a request with no criteria and no values.
	pub fn new(data_source: impl Into<String>, operation_type: OperationType) -> Self {
		Self {
			data_source: data_source.into(),
			operation_type,
			operation_id: None,
			criteria: None,
			values: Record::new(),
			old_values: None,
		}
	}

	/// Creates a fetch request.
	pub fn fetch(data_source: impl Into<String>) -> Self {
		Self::new(data_source, OperationType::Fetch)
	}

	/// Creates an add request carrying `values`.
	pub fn add(data_source: impl Into<String>, values: Record) -> Self {
		Self {
			values,
			..Self::new(data_source, OperationType::Add)
		}
	}

	pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
		self.operation_id = Some(id.into());
		self
	}

	pub fn with_criteria(mut self, criteria: Criteria) -> Self {
		self.criteria = Some(criteria);
		self
	}

	pub fn with_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(field.into(), value.into());
		self
	}

	/// Returns a field value from the request payload.
	pub fn value(&self, field: &str) -> Option<&Value> {
		self.values.get(field)
	}

	pub fn is_fetch(&self) -> bool {
		self.operation_type == OperationType::Fetch
	}
}
