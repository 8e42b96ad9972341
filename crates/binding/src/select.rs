use bindery_primitives::{DataSourceDef, OperationBinding, Request, is_blank};

/// Returns the binding that applies to `request`, if any.
///
/// A binding naming the request's operation id wins over one scoped only to
/// the operation type. Bindings without an operation type never apply. Among
/// equally specific bindings the first declared wins.
pub fn effective_binding<'a>(
	data_source: &'a DataSourceDef,
	request: &Request,
) -> Option<&'a OperationBinding> {
	let request_id = request.operation_id.as_deref().filter(|id| !id.trim().is_empty());
	let mut by_type = None;

	for binding in &data_source.operation_bindings {
		if binding.operation_type != Some(request.operation_type) {
			continue;
		}
		match binding.operation_id.as_deref().filter(|id| !id.trim().is_empty()) {
			Some(id) if Some(id) == request_id => return Some(binding),
			Some(_) => {}
			None => {
				by_type.get_or_insert(binding);
			}
		}
	}
	by_type
}

/// True when the effective binding overrides the join, table or where clause.
///
/// A binding whose overrides are all blank falls back to the defaults.
pub fn is_templating_required(data_source: &DataSourceDef, request: &Request) -> bool {
	effective_binding(data_source, request).is_some_and(overrides_structure)
}

pub(crate) fn overrides_structure(binding: &OperationBinding) -> bool {
	[&binding.join_clause, &binding.table_clause, &binding.where_clause]
		.into_iter()
		.any(|clause| !is_blank(clause.as_deref()))
}
