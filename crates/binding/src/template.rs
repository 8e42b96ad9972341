use serde_json::Value;

use crate::context::TemplateContext;

/// Template evaluation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
	#[error("unterminated placeholder at byte {0}")]
	Unterminated(usize),
	#[error("unknown template variable '{0}'")]
	UnknownVariable(String),
	/// Raised by evaluators other than [`SubstitutionEvaluator`].
	#[error("{0}")]
	Evaluation(String),
}

/// Renders one clause template against a context.
pub trait TemplateEvaluator: Send + Sync {
	fn evaluate(&self, template: &str, context: &TemplateContext) -> Result<String, TemplateError>;
}

/// Replaces `${key}` placeholders with context values.
///
/// Keys may use dots to reach into objects (`${criteria.status}`). Strings are
/// inserted verbatim, other values as JSON.
///
/// In a run of `$` directly before `{`, each `$$` renders as one `$`. An odd
/// run ends in a placeholder, an even run leaves the `{` literal: `$${x}`
/// renders `${x}` and `$$${x}` renders `$` followed by the value of `x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionEvaluator;

impl TemplateEvaluator for SubstitutionEvaluator {
	fn evaluate(&self, template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
		let mut out = String::with_capacity(template.len());
		let mut rest = template;

		while let Some(pos) = rest.find("${") {
			let offset = template.len() - rest.len() + pos;
			let run = rest.as_bytes()[..=pos].iter().rev().take_while(|&&b| b == b'$').count();
			out.push_str(&rest[..pos + 1 - run]);
			out.push_str(&"$".repeat(run / 2));
			if run % 2 == 0 {
				out.push('{');
				rest = &rest[pos + 2..];
				continue;
			}

			let after = &rest[pos + 2..];
			let end = after.find('}').ok_or(TemplateError::Unterminated(offset))?;
			let key = after[..end].trim();
			match lookup(context, key) {
				Some(Value::String(s)) => out.push_str(s),
				Some(value) => out.push_str(&value.to_string()),
				None => return Err(TemplateError::UnknownVariable(key.to_string())),
			}
			rest = &after[end + 1..];
		}
		out.push_str(rest);
		Ok(out)
	}
}

fn lookup<'a>(context: &'a TemplateContext, key: &str) -> Option<&'a Value> {
	let mut parts = key.split('.');
	let mut value = context.get(parts.next()?)?;
	for part in parts {
		value = value.as_object()?.get(part)?;
	}
	Some(value)
}
