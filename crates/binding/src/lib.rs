//! Operation-binding evaluation.
//!
//! A data source may override the clauses of the statement generated for an
//! operation. This crate picks the binding that applies to a request, decides
//! whether its overrides require templating, and seeds the template context
//! with the default clauses so an override can extend them instead of
//! replacing them outright.
//!
//! Template syntax belongs to the [`TemplateEvaluator`] implementation;
//! [`SubstitutionEvaluator`] covers plain `${key}` placeholders.

mod context;
mod planner;
mod select;
mod template;

pub use context::{
	ADVANCED_CRITERIA, CRITERIA, DEFAULT_ORDER_CLAUSE, DEFAULT_SELECT_CLAUSE, DEFAULT_TABLE_CLAUSE,
	DEFAULT_WHERE_CLAUSE, TemplateContext, build_context,
};
pub use planner::{ClausePlanner, Clauses, DefaultClauses};
pub use select::{effective_binding, is_templating_required};
pub use template::{SubstitutionEvaluator, TemplateError, TemplateEvaluator};

#[cfg(test)]
mod tests;
