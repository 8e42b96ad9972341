use bindery_primitives::{Criteria, Request};
use serde_json::Value;

/// Key/value context handed to a template evaluator.
pub type TemplateContext = serde_json::Map<String, Value>;

pub const DEFAULT_SELECT_CLAUSE: &str = "defaultSelectClause";
pub const DEFAULT_TABLE_CLAUSE: &str = "defaultTableClause";
pub const DEFAULT_WHERE_CLAUSE: &str = "defaultWhereClause";
pub const DEFAULT_ORDER_CLAUSE: &str = "defaultOrderClause";
pub const CRITERIA: &str = "criteria";
pub const ADVANCED_CRITERIA: &str = "advancedCriteria";

/// Builds the template context for `request`.
///
/// The four default clauses are always present. Fetch requests also expose
/// their criteria: a flat mapping under both [`CRITERIA`] and
/// [`ADVANCED_CRITERIA`], a structured criteria only under
/// [`ADVANCED_CRITERIA`].
pub fn build_context(
	request: &Request,
	select_clause: &str,
	table_clause: &str,
	where_clause: &str,
	order_clause: &str,
) -> TemplateContext {
	let mut ctx = TemplateContext::new();
	ctx.insert(DEFAULT_SELECT_CLAUSE.into(), select_clause.into());
	ctx.insert(DEFAULT_TABLE_CLAUSE.into(), table_clause.into());
	ctx.insert(DEFAULT_WHERE_CLAUSE.into(), where_clause.into());
	ctx.insert(DEFAULT_ORDER_CLAUSE.into(), order_clause.into());

	if request.is_fetch() {
		match &request.criteria {
			Some(criteria @ Criteria::Simple(_)) => {
				let value = criteria.to_value();
				ctx.insert(CRITERIA.into(), value.clone());
				ctx.insert(ADVANCED_CRITERIA.into(), value);
			}
			Some(criteria @ Criteria::Advanced(_)) => {
				ctx.insert(ADVANCED_CRITERIA.into(), criteria.to_value());
			}
			None => {}
		}
	}
	ctx
}
