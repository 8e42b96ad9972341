use crate::relation::RelationKind;

/// A relation lookup failed.
///
/// Callers usually treat both variants as "no relation known".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
	/// The data source was never indexed.
	#[error("unknown data source '{0}'")]
	UnknownDataSource(String),
	/// The data source is indexed but the field has no relation of this kind.
	#[error("data source '{data_source}' has no {kind} relation on field '{field}'")]
	UnknownRelation {
		data_source: String,
		field: String,
		kind: RelationKind,
	},
}

/// No handler is registered under the requested id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
	#[error("no handler registered under '{0}'")]
	NotFound(String),
}

/// Relation derivation rejected a data source definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("{data_source}.{field}: malformed foreign key reference '{reference}'")]
	MalformedReference {
		data_source: String,
		field: String,
		reference: String,
	},
	#[error("{data_source}.{field}: referenced data source '{target}' is not registered")]
	UnresolvedTarget {
		data_source: String,
		field: String,
		target: String,
	},
	#[error("{data_source}.{field}: data source '{target}' has no field '{target_field}'")]
	MissingTargetField {
		data_source: String,
		field: String,
		target: String,
		target_field: String,
	},
	#[error("{data_source}.{field}: import via '{via}' which is not a foreign key")]
	MissingForeignKey {
		data_source: String,
		field: String,
		via: String,
	},
}
