//! Types this binary registers for catalogs to reference.

use std::convert::Infallible;

use bindery_invocation::{TypeBuilder, TypeDef, TypeRegistration};
use bindery_primitives::{Request, Response};

pub const ECHO_TYPE: &str = "bindery.Echo";

/// Answers with the request's values as a single row.
fn echo(request: &Request) -> Result<Response, Infallible> {
	Ok(Response::single(request.values.clone()))
}

fn echo_type() -> TypeDef {
	TypeBuilder::<()>::new(ECHO_TYPE)
		.static_method("echo", echo)
		.build()
}

inventory::submit! { TypeRegistration(echo_type) }
