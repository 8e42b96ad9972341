use std::sync::Arc;

use bindery_primitives::{
	DataSourceDef, DataSourceHandler, FieldDef, Handler, ImportDef, InvocationError, Record,
	Request, Response,
};

/// Handler with no data source that answers with its tag.
pub(crate) struct Tagged {
	pub id: String,
	pub tag: u32,
}

impl Handler for Tagged {
	fn id(&self) -> &str {
		&self.id
	}

	fn handle(&self, _request: &Request) -> Result<Response, InvocationError> {
		let mut row = Record::new();
		row.insert("tag".into(), self.tag.into());
		Ok(Response::single(row))
	}
}

pub(crate) fn tagged(id: &str, tag: u32) -> Arc<dyn Handler> {
	Arc::new(Tagged {
		id: id.to_string(),
		tag,
	})
}

/// Reads back the tag of a [`Tagged`] handler.
pub(crate) fn tag_of(handler: &Arc<dyn Handler>) -> u64 {
	handler
		.handle(&Request::fetch(handler.id()))
		.ok()
		.and_then(|r| r.first_value("tag").and_then(|v| v.as_u64()))
		.unwrap_or(u64::MAX)
}

pub(crate) fn ds(def: DataSourceDef) -> Arc<dyn Handler> {
	Arc::new(DataSourceHandler::new(def))
}

pub(crate) fn customer() -> DataSourceDef {
	DataSourceDef::new("customer")
		.with_field(FieldDef::new("id"))
		.with_field(FieldDef::new("name"))
		.with_field(FieldDef::new("region"))
}

pub(crate) fn orders() -> DataSourceDef {
	DataSourceDef::new("orders")
		.with_field(FieldDef::new("id"))
		.with_field(FieldDef::new("customerId").with_foreign_key("customer.id"))
		.with_field(FieldDef::new("customerName").with_import(ImportDef {
			via: "customerId".into(),
			display_field: "name".into(),
			summary: None,
		}))
		.with_field(FieldDef::new("note"))
}
