use bindery_primitives::{
	AdvancedCriteria, Criteria, DataSourceDef, OperationBinding, OperationType, Record, Request,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::*;

fn fetch_binding() -> OperationBinding {
	OperationBinding::for_operation(OperationType::Fetch)
}

fn with_binding(binding: OperationBinding) -> DataSourceDef {
	DataSourceDef::new("orders").with_binding(binding)
}

fn defaults() -> DefaultClauses {
	DefaultClauses {
		select: "orders.*".into(),
		table: "orders".into(),
		where_clause: "orders.deleted = 0".into(),
		order: "orders.id".into(),
	}
}

fn open_status() -> Record {
	let mut r = Record::new();
	r.insert("status".into(), json!("open"));
	r
}

#[rstest]
#[case::join(fetch_binding().with_join_clause("JOIN customer c ON c.id = orders.customer_id"))]
#[case::table(fetch_binding().with_table_clause("archived_orders"))]
#[case::where_clause(fetch_binding().with_where_clause("status = 'open'"))]
fn single_override_requires_templating(#[case] binding: OperationBinding) {
	assert!(is_templating_required(&with_binding(binding), &Request::fetch("orders")));
}

#[rstest]
#[case::absent(fetch_binding())]
#[case::whitespace(
	fetch_binding()
		.with_join_clause("  ")
		.with_table_clause("")
		.with_where_clause("\t")
)]
fn blank_overrides_use_defaults(#[case] binding: OperationBinding) {
	let ds = with_binding(binding);
	assert!(effective_binding(&ds, &Request::fetch("orders")).is_some());
	assert!(!is_templating_required(&ds, &Request::fetch("orders")));
}

#[test]
fn no_binding_for_operation_type() {
	let ds = with_binding(fetch_binding().with_where_clause("x = 1"));
	let add = Request::add("orders", Record::new());
	assert!(effective_binding(&ds, &add).is_none());
	assert!(!is_templating_required(&ds, &add));
}

#[test]
fn untyped_binding_never_applies() {
	let ds = with_binding(OperationBinding::default().with_where_clause("x = 1"));
	assert!(effective_binding(&ds, &Request::fetch("orders")).is_none());
}

#[test]
fn operation_id_binding_is_most_specific() {
	let ds = DataSourceDef::new("orders")
		.with_binding(fetch_binding().with_where_clause("generic"))
		.with_binding(fetch_binding().with_operation_id("openOnly").with_where_clause("specific"))
		.with_binding(fetch_binding().with_where_clause("later generic"));

	let plain = Request::fetch("orders");
	let scoped = Request::fetch("orders").with_operation_id("openOnly");
	let other = Request::fetch("orders").with_operation_id("other");

	let clause = |r: &Request| effective_binding(&ds, r).and_then(|b| b.where_clause.clone());
	assert_eq!(clause(&plain).as_deref(), Some("generic"));
	assert_eq!(clause(&scoped).as_deref(), Some("specific"));
	assert_eq!(clause(&other).as_deref(), Some("generic"));
}

#[test]
fn fetch_context_exposes_simple_criteria_twice() {
	let request = Request::fetch("orders").with_criteria(Criteria::Simple(open_status()));
	let ctx = build_context(&request, "s", "t", "w", "o");

	assert_eq!(ctx.get(CRITERIA), Some(&json!({ "status": "open" })));
	assert_eq!(ctx.get(ADVANCED_CRITERIA), Some(&json!({ "status": "open" })));
	assert_eq!(ctx.get(DEFAULT_SELECT_CLAUSE), Some(&json!("s")));
	assert_eq!(ctx.get(DEFAULT_TABLE_CLAUSE), Some(&json!("t")));
	assert_eq!(ctx.get(DEFAULT_WHERE_CLAUSE), Some(&json!("w")));
	assert_eq!(ctx.get(DEFAULT_ORDER_CLAUSE), Some(&json!("o")));
}

#[test]
fn fetch_context_exposes_advanced_criteria_once() {
	let request = Request::fetch("orders")
		.with_criteria(Criteria::Advanced(AdvancedCriteria::leaf("equals", "status", "open")));
	let ctx = build_context(&request, "", "", "", "");

	assert!(!ctx.contains_key(CRITERIA));
	assert_eq!(
		ctx.get(ADVANCED_CRITERIA),
		Some(&json!({ "operator": "equals", "fieldName": "status", "value": "open" }))
	);
}

#[test]
fn fetch_context_keeps_flat_filter_with_operator_field() {
	let request: Request = serde_json::from_value(json!({
		"dataSource": "orders",
		"operationType": "fetch",
		"criteria": { "operator": "alice", "status": "open" }
	}))
	.unwrap();
	let ctx = build_context(&request, "", "", "", "");

	let filter = json!({ "operator": "alice", "status": "open" });
	assert_eq!(ctx.get(CRITERIA), Some(&filter));
	assert_eq!(ctx.get(ADVANCED_CRITERIA), Some(&filter));
}

#[rstest]
fn non_fetch_context_has_only_default_clauses(
	#[values(OperationType::Add, OperationType::Update, OperationType::Remove)] op: OperationType,
	#[values(
		Criteria::Simple(open_status()),
		Criteria::Advanced(AdvancedCriteria::composite(
			"and",
			vec![AdvancedCriteria::leaf("equals", "status", "open")]
		))
	)]
	criteria: Criteria,
) {
	let request = Request::new("orders", op).with_criteria(criteria);
	let ctx = build_context(&request, "s", "t", "w", "o");

	assert!(!ctx.contains_key(CRITERIA));
	assert!(!ctx.contains_key(ADVANCED_CRITERIA));
	assert_eq!(ctx.len(), 4);
}

#[test]
fn planner_returns_defaults_without_templating() {
	let ds = with_binding(fetch_binding());
	let clauses =
		ClausePlanner::plan(&ds, &Request::fetch("orders"), defaults(), &SubstitutionEvaluator)
			.unwrap();
	assert_eq!(clauses, Clauses::from(defaults()));
	assert!(!clauses.templated);
}

#[test]
fn planner_extends_default_where_clause() {
	let ds = with_binding(
		fetch_binding().with_where_clause("${defaultWhereClause} AND status = '${criteria.status}'"),
	);
	let request = Request::fetch("orders").with_criteria(Criteria::Simple(open_status()));

	let clauses = ClausePlanner::plan(&ds, &request, defaults(), &SubstitutionEvaluator).unwrap();

	assert_eq!(clauses.where_clause, "orders.deleted = 0 AND status = 'open'");
	assert_eq!(clauses.table, "orders");
	assert_eq!(clauses.select, "orders.*");
	assert_eq!(clauses.join, None);
	assert!(clauses.templated);
}

#[test]
fn planner_renders_join_and_table() {
	let ds = with_binding(
		fetch_binding()
			.with_table_clause("${defaultTableClause} o")
			.with_join_clause("JOIN customer c ON c.id = o.customer_id"),
	);
	let clauses =
		ClausePlanner::plan(&ds, &Request::fetch("orders"), defaults(), &SubstitutionEvaluator)
			.unwrap();
	assert_eq!(clauses.table, "orders o");
	assert_eq!(clauses.join.as_deref(), Some("JOIN customer c ON c.id = o.customer_id"));
	assert_eq!(clauses.where_clause, "orders.deleted = 0");
}

#[test]
fn planner_renders_custom_sql_alone() {
	let ds = with_binding(
		fetch_binding().with_custom_sql("SELECT ${defaultSelectClause} FROM ${defaultTableClause}"),
	);
	let clauses =
		ClausePlanner::plan(&ds, &Request::fetch("orders"), defaults(), &SubstitutionEvaluator)
			.unwrap();
	assert_eq!(clauses.custom_sql.as_deref(), Some("SELECT orders.* FROM orders"));
	assert_eq!(clauses.where_clause, "orders.deleted = 0");
}

#[test]
fn planner_propagates_evaluator_errors() {
	let ds = with_binding(fetch_binding().with_where_clause("status = ${criteria.status}"));
	let err = ClausePlanner::plan(&ds, &Request::fetch("orders"), defaults(), &SubstitutionEvaluator)
		.unwrap_err();
	assert_eq!(err, TemplateError::UnknownVariable("criteria.status".into()));
}
