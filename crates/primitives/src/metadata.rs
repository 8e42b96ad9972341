//! Plain-data description of data sources as produced by a metadata reader.
//!
//! Nothing here validates references; relation consistency is checked when a
//! definition is indexed by the registry.

use serde::{Deserialize, Serialize};

use crate::{OperationType, is_blank};

/// Registry-wide data source identifier.
pub type DataSourceId = String;
/// Field identifier, unique within one data source.
pub type FieldName = String;

/// Aggregation applied to an imported field when the relation is one-to-many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFunction {
	Sum,
	Avg,
	Max,
	Min,
	Count,
	Concat,
	First,
}

/// Marks a field as a read-only projection of a field on a related data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDef {
	/// Foreign-key field on the owning data source that leads to the related one.
	pub via: FieldName,
	/// Field of the related data source that is projected.
	pub display_field: FieldName,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<SummaryFunction>,
}

/// One field of a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
	pub name: FieldName,
	/// `"targetDs.targetField"`, or `"targetDs"` to reference a same-named field.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub foreign_key: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub import: Option<ImportDef>,
}

impl FieldDef {
	/// Plain field with no relations.
	pub fn new(name: impl Into<FieldName>) -> Self {
		Self {
			name: name.into(),
			foreign_key: None,
			import: None,
		}
	}

	pub fn with_foreign_key(mut self, reference: impl Into<String>) -> Self {
		self.foreign_key = Some(reference.into());
		self
	}

	pub fn with_import(mut self, import: ImportDef) -> Self {
		self.import = Some(import);
		self
	}

	/// Returns the foreign-key reference if it is present and non-blank.
	pub fn foreign_key_ref(&self) -> Option<&str> {
		let fk = self.foreign_key.as_deref();
		if is_blank(fk) { None } else { fk.map(str::trim) }
	}
}

/// Per-operation override of the default clause construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBinding {
	pub operation_type: Option<OperationType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub operation_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub select_clause: Option<String>,
	#[serde(default, alias = "from_clause", skip_serializing_if = "Option::is_none")]
	pub table_clause: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub where_clause: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order_clause: Option<String>,
	#[serde(default, alias = "ansi_join_clause", skip_serializing_if = "Option::is_none")]
	pub join_clause: Option<String>,
	/// Complete statement replacing the generated one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_sql: Option<String>,
}

impl OperationBinding {
	/// Binding scoped to `operation_type` with no clause overrides.
	pub fn for_operation(operation_type: OperationType) -> Self {
		Self {
			operation_type: Some(operation_type),
			..Self::default()
		}
	}

	pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
		self.operation_id = Some(id.into());
		self
	}

	pub fn with_table_clause(mut self, clause: impl Into<String>) -> Self {
		self.table_clause = Some(clause.into());
		self
	}

	pub fn with_where_clause(mut self, clause: impl Into<String>) -> Self {
		self.where_clause = Some(clause.into());
		self
	}

	pub fn with_join_clause(mut self, clause: impl Into<String>) -> Self {
		self.join_clause = Some(clause.into());
		self
	}

	pub fn with_custom_sql(mut self, sql: impl Into<String>) -> Self {
		self.custom_sql = Some(sql.into());
		self
	}
}

/// A data source definition: identity, fields and operation bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceDef {
	pub id: DataSourceId,
	#[serde(default, rename = "field")]
	pub fields: Vec<FieldDef>,
	#[serde(default, rename = "operation_binding")]
	pub operation_bindings: Vec<OperationBinding>,
}

impl DataSourceDef {
	pub fn new(id: impl Into<DataSourceId>) -> Self {
		Self {
			id: id.into(),
			fields: Vec::new(),
			operation_bindings: Vec::new(),
		}
	}

	pub fn with_field(mut self, field: FieldDef) -> Self {
		self.fields.push(field);
		self
	}

	pub fn with_binding(mut self, binding: OperationBinding) -> Self {
		self.operation_bindings.push(binding);
		self
	}

	/// Looks up a field by name.
	pub fn field(&self, name: &str) -> Option<&FieldDef> {
		self.fields.iter().find(|f| f.name == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_foreign_key_is_ignored() {
		assert_eq!(FieldDef::new("a").with_foreign_key("  ").foreign_key_ref(), None);
		assert_eq!(FieldDef::new("a").foreign_key_ref(), None);
		assert_eq!(
			FieldDef::new("a").with_foreign_key(" customer.id ").foreign_key_ref(),
			Some("customer.id")
		);
	}

	#[test]
	fn field_lookup_by_name() {
		let ds = DataSourceDef::new("orders")
			.with_field(FieldDef::new("id"))
			.with_field(FieldDef::new("customerId").with_foreign_key("customer.id"));
		assert!(ds.field("customerId").is_some());
		assert!(ds.field("missing").is_none());
	}
}
