use bindery_primitives::{DataSourceDef, Request, is_blank};

use crate::context::build_context;
use crate::select::{effective_binding, overrides_structure};
use crate::template::{TemplateError, TemplateEvaluator};

/// Clauses produced by the default statement builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultClauses {
	pub select: String,
	pub table: String,
	pub where_clause: String,
	pub order: String,
}

/// Clauses to execute for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
	pub select: String,
	pub table: String,
	pub where_clause: String,
	pub order: String,
	pub join: Option<String>,
	/// Full statement from the binding's `custom_sql`, rendered.
	pub custom_sql: Option<String>,
	/// Whether any override went through the evaluator.
	pub templated: bool,
}

impl From<DefaultClauses> for Clauses {
	fn from(d: DefaultClauses) -> Self {
		Self {
			select: d.select,
			table: d.table,
			where_clause: d.where_clause,
			order: d.order,
			..Self::default()
		}
	}
}

/// Combines the default clauses with the effective binding's overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClausePlanner;

impl ClausePlanner {
	/// Returns `defaults` unchanged when no templating is required. Otherwise
	/// every non-blank override is rendered against the request context and
	/// replaces its default; blank overrides keep the default.
	pub fn plan(
		data_source: &DataSourceDef,
		request: &Request,
		defaults: DefaultClauses,
		evaluator: &dyn TemplateEvaluator,
	) -> Result<Clauses, TemplateError> {
		let Some(binding) = effective_binding(data_source, request) else {
			return Ok(defaults.into());
		};
		let templating = overrides_structure(binding);
		let has_custom_sql = !is_blank(binding.custom_sql.as_deref());
		if !templating && !has_custom_sql {
			return Ok(defaults.into());
		}

		let context = build_context(
			request,
			&defaults.select,
			&defaults.table,
			&defaults.where_clause,
			&defaults.order,
		);
		let render = |clause: &Option<String>| -> Result<Option<String>, TemplateError> {
			match clause.as_deref() {
				Some(t) if !t.trim().is_empty() => evaluator.evaluate(t, &context).map(Some),
				_ => Ok(None),
			}
		};

		let custom_sql = render(&binding.custom_sql)?;
		let clauses = if templating {
			Clauses {
				select: render(&binding.select_clause)?.unwrap_or(defaults.select),
				table: render(&binding.table_clause)?.unwrap_or(defaults.table),
				where_clause: render(&binding.where_clause)?.unwrap_or(defaults.where_clause),
				order: render(&binding.order_clause)?.unwrap_or(defaults.order),
				join: render(&binding.join_clause)?,
				custom_sql,
				templated: true,
			}
		} else {
			Clauses {
				custom_sql,
				templated: true,
				..defaults.into()
			}
		};

		tracing::debug!(
			data_source = %data_source.id,
			operation = %request.operation_type,
			custom_sql = clauses.custom_sql.is_some(),
			"rendered operation binding"
		);
		Ok(clauses)
	}
}
