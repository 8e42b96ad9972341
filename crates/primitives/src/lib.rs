//! Core types shared by the bindery crates: requests, responses, handlers and
//! the declarative data-source metadata that relation derivation consumes.

/// Handler capability and its failure type.
pub mod handler;
/// Declarative data-source metadata (fields, relations, operation bindings).
pub mod metadata;
/// Incoming operation requests and criteria payloads.
pub mod request;
/// Operation responses.
pub mod response;

pub use handler::{DataSourceHandler, Handler, InvocationError, UnsupportedOperation};
pub use metadata::{
	DataSourceDef, DataSourceId, FieldDef, FieldName, ImportDef, OperationBinding, SummaryFunction,
};
pub use request::{AdvancedCriteria, Criteria, OperationType, Record, Request};
pub use response::{Response, ResponseStatus};

/// Returns true if `s` is absent or contains only whitespace.
pub fn is_blank(s: Option<&str>) -> bool {
	s.is_none_or(|s| s.trim().is_empty())
}
