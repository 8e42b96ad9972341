use std::convert::Infallible;
use std::io::Write;
use std::sync::Arc;

use bindery_invocation::{LookupStyle, ResolutionError, Resolver, TypeBuilder, TypeCatalog};
use bindery_primitives::{OperationType, Record, Request, Response, UnsupportedOperation};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

const CATALOG: &str = r#"
[[data_source]]
id = "orders"

[[data_source.field]]
name = "id"

[[data_source.field]]
name = "customerId"
foreign_key = "customer.id"

[[data_source.field]]
name = "customerName"
import = { via = "customerId", display_field = "name" }

[[data_source.operation_binding]]
operation_type = "fetch"
where_clause = "status = 'open'"

[data_source.server_object]
lookup_style = "new"
target = "shop.Orders"
method = "fetch"

[[data_source]]
id = "customer"

[[data_source.field]]
name = "id"

[[data_source.field]]
name = "name"

[[handler]]
id = "ping"
server_object = { class_name = "shop.Health", method_name = "ping" }
"#;

fn rows(req: &Request) -> Result<Response, Infallible> {
	let mut row = Record::new();
	row.insert("ds".into(), json!(req.data_source));
	Ok(Response::single(row))
}

fn pong(_req: &Request) -> Result<(), Infallible> {
	Ok(())
}

fn resolver() -> Resolver {
	let catalog = TypeCatalog::new()
		.with(TypeBuilder::<()>::new("shop.Orders").static_method("fetch", rows).build())
		.with(TypeBuilder::<()>::new("shop.Health").static_method("ping", pong).build());
	Resolver::new(Arc::new(catalog))
}

#[test]
fn parses_data_sources_and_handlers() {
	let catalog = Catalog::from_toml_str(CATALOG).unwrap();

	assert_eq!(catalog.data_sources.len(), 2);
	let orders = &catalog.data_sources[0];
	assert_eq!(orders.fields.len(), 3);
	assert_eq!(orders.fields[1].foreign_key.as_deref(), Some("customer.id"));
	assert_eq!(orders.operation_bindings[0].operation_type, Some(OperationType::Fetch));
	assert_eq!(
		orders.server_object.as_ref().map(|d| d.lookup_style),
		Some(LookupStyle::New)
	);
	assert!(catalog.data_sources[1].server_object.is_none());

	assert_eq!(catalog.handlers[0].server_object.target, "shop.Health");
	assert_eq!(catalog.handlers[0].server_object.lookup_style, LookupStyle::New);
}

#[test]
fn unknown_keys_are_rejected() {
	let err = Catalog::from_toml_str("[[data_source]]\nid = \"x\"\nfields = []\n").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

#[test]
fn builds_registry_with_relations() {
	let registry = Catalog::from_toml_str(CATALOG)
		.unwrap()
		.build_registry(&resolver())
		.unwrap();

	assert_eq!(registry.handler_ids(), vec!["customer", "orders", "ping"]);
	let fk = registry.foreign_key_relation("orders", "customerId").unwrap();
	assert_eq!(fk.target_data_source, "customer");
	let import = registry.import_from_relation("orders", "customerName").unwrap();
	assert_eq!(import.display_field, "name");

	let orders = registry.lookup("orders").unwrap();
	assert_eq!(orders.data_source().map(|d| d.id.as_str()), Some("orders"));
	let response = orders.handle(&Request::fetch("orders")).unwrap();
	assert_eq!(response.first_value("ds"), Some(&json!("orders")));
	assert!(registry.lookup("ping").unwrap().data_source().is_none());
}

#[test]
fn data_source_without_server_object_is_unsupported() {
	let registry = Catalog::from_toml_str(CATALOG)
		.unwrap()
		.build_registry(&resolver())
		.unwrap();
	let err = registry
		.lookup("customer")
		.unwrap()
		.handle(&Request::fetch("customer"))
		.unwrap_err();
	assert!(err.is::<UnsupportedOperation>(), "{err}");
}

#[test]
fn resolution_failure_names_the_handler() {
	let catalog = Catalog::from_toml_str(
		"[[handler]]\nid = \"broken\"\nserver_object = { target = \"shop.Missing\", method = \"run\" }\n",
	)
	.unwrap();
	match catalog.into_handlers(&resolver()) {
		Err(ConfigError::Resolution { id, source }) => {
			assert_eq!(id, "broken");
			assert_eq!(source, ResolutionError::UnknownType("shop.Missing".into()));
		}
		other => panic!("expected resolution error, got {other:?}"),
	}
}

#[test]
fn dangling_reference_surfaces_as_registry_error() {
	let catalog = Catalog::from_toml_str(
		"[[data_source]]\nid = \"orders\"\n[[data_source.field]]\nname = \"c\"\nforeign_key = \"customer.id\"\n",
	)
	.unwrap();
	let err = catalog.build_registry(&resolver()).unwrap_err();
	assert!(
		matches!(err, ConfigError::Registry(RegistryError::UnresolvedTarget { .. })),
		"{err}"
	);
}

#[test]
fn merge_replaces_by_id_and_appends_new_entries() {
	let mut base = Catalog::from_toml_str(CATALOG).unwrap();
	let overlay = Catalog::from_toml_str(
		r#"
[[data_source]]
id = "customer"
[[data_source.field]]
name = "id"
[[data_source.field]]
name = "name"
[[data_source.field]]
name = "region"

[[data_source]]
id = "region"
"#,
	)
	.unwrap();

	base.merge(overlay);

	let ids: Vec<_> = base.data_sources.iter().map(|d| d.id.as_str()).collect();
	assert_eq!(ids, vec!["orders", "customer", "region"]);
	assert_eq!(base.data_sources[1].fields.len(), 3);
	assert_eq!(base.handlers.len(), 1);
}

#[test]
fn load_reads_from_disk() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(CATALOG.as_bytes()).unwrap();

	let catalog = Catalog::load(file.path()).unwrap();
	assert_eq!(catalog, Catalog::from_toml_str(CATALOG).unwrap());
}

#[test]
fn load_reports_missing_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("absent.toml");
	match Catalog::load(&path) {
		Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("expected io error, got {other:?}"),
	}
}
