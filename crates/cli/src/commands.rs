use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use bindery_binding::{effective_binding, is_templating_required};
use bindery_invocation::{Resolver, TypeCatalog};
use bindery_primitives::{OperationType, Request};
use bindery_registry::{Catalog, RuntimeRegistry};

use crate::cli::{Cli, Command};

pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
	let registry = build_registry(&cli.catalogs, cli.skip_dmi)?;

	match &cli.command {
		Command::Check => check(&registry, out),
		Command::Relations { data_source } => relations(&registry, data_source, out),
		Command::Templating {
			data_source,
			operation,
			operation_id,
		} => templating(&registry, data_source, *operation, operation_id.as_deref(), out),
		Command::Invoke { handler, request } => invoke(&registry, handler, request.as_deref(), out),
	}
}

/// Loads and layers `paths` in order, then builds the registry.
pub fn build_registry(paths: &[PathBuf], skip_dmi: bool) -> anyhow::Result<RuntimeRegistry> {
	if paths.is_empty() {
		bail!("no catalog given; pass at least one --catalog");
	}
	let mut catalog = Catalog::default();
	for path in paths {
		let layer = Catalog::load(path).with_context(|| format!("loading {}", path.display()))?;
		catalog.merge(layer);
	}

	if skip_dmi {
		catalog.handlers.clear();
		for ds in &mut catalog.data_sources {
			ds.server_object = None;
		}
	}

	let types = TypeCatalog::from_inventory();
	tracing::debug!(types = types.len(), "collected registered types");
	let resolver = Resolver::new(Arc::new(types));
	let registry = catalog.build_registry(&resolver)?;
	tracing::info!(handlers = registry.len(), "registry built");
	Ok(registry)
}

fn check(registry: &RuntimeRegistry, out: &mut impl Write) -> anyhow::Result<()> {
	let data_sources = registry.data_sources();
	writeln!(
		out,
		"ok: {} handlers, {} data sources",
		registry.len(),
		data_sources.len()
	)?;
	for def in data_sources {
		let fks = registry.foreign_key_relations(&def.id)?.len();
		let imports = registry.import_from_relations(&def.id)?.len();
		writeln!(
			out,
			"  {}: {} fields, {fks} foreign keys, {imports} imports, {} bindings",
			def.id,
			def.fields.len(),
			def.operation_bindings.len()
		)?;
	}
	Ok(())
}

fn relations(registry: &RuntimeRegistry, data_source: &str, out: &mut impl Write) -> anyhow::Result<()> {
	for fk in registry.foreign_key_relations(data_source)? {
		writeln!(
			out,
			"foreign-key  {}.{} -> {}.{}",
			fk.data_source, fk.field, fk.target_data_source, fk.target_field
		)?;
	}
	for import in registry.import_from_relations(data_source)? {
		write!(
			out,
			"import-from  {}.{} <- {}.{} via {}",
			import.data_source,
			import.field,
			import.related_data_source,
			import.display_field,
			import.via_field
		)?;
		match import.summary {
			Some(summary) => writeln!(out, " ({summary:?})")?,
			None => writeln!(out)?,
		}
	}
	Ok(())
}

fn templating(
	registry: &RuntimeRegistry,
	data_source: &str,
	operation: OperationType,
	operation_id: Option<&str>,
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let handler = registry.lookup(data_source)?;
	let Some(def) = handler.data_source() else {
		bail!("'{data_source}' is a handler without a data source definition");
	};

	let mut request = Request::new(data_source, operation);
	if let Some(id) = operation_id {
		request = request.with_operation_id(id);
	}

	match effective_binding(def, &request) {
		Some(binding) => {
			writeln!(
				out,
				"binding: {}{}",
				operation,
				binding
					.operation_id
					.as_deref()
					.map(|id| format!(" ({id})"))
					.unwrap_or_default()
			)?;
			for (name, clause) in [
				("select", &binding.select_clause),
				("table", &binding.table_clause),
				("where", &binding.where_clause),
				("order", &binding.order_clause),
				("join", &binding.join_clause),
				("custom_sql", &binding.custom_sql),
			] {
				if let Some(clause) = clause {
					writeln!(out, "  {name}: {clause}")?;
				}
			}
		}
		None => writeln!(out, "binding: none")?,
	}
	let required = is_templating_required(def, &request);
	writeln!(out, "templating required: {}", if required { "yes" } else { "no" })?;
	Ok(())
}

fn invoke(
	registry: &RuntimeRegistry,
	handler_id: &str,
	request: Option<&str>,
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let handler = registry.lookup(handler_id)?;
	let request = match request {
		Some(json) => serde_json::from_str(json).context("parsing request")?,
		None => Request::fetch(handler_id),
	};
	let response = handler
		.handle(&request)
		.with_context(|| format!("invoking '{handler_id}'"))?;
	writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
	Ok(())
}
