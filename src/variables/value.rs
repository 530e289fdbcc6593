//! Conversion between HCL values and the flat strings stored remotely.
//!
//! The remote store keeps every value as a string plus an `hcl` flag. Scalars
//! are stored bare (`3000`, `true`, `development`), lists and maps as HCL
//! literal text.

use hcl::eval::{Context, Evaluate};
use hcl::{Expression, Value};
use tracing::{debug, warn};

use crate::error::{DocumentError, Result};

use super::format::{format_key, quote};

/// Codec between [`hcl::Value`] and flat variable strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueCodec;

impl ValueCodec {
    /// Renders a value in its flat string form.
    ///
    /// Scalars are rendered bare. List elements are quoted when they are
    /// scalars; map entries are written `key = value` with string values quoted.
    /// `null` renders as an empty string.
    #[must_use]
    pub fn render(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let elements: Vec<String> = items
                    .iter()
                    .map(|item| {
                        if Self::is_primitive(item) {
                            quote(&Self::render(item))
                        } else {
                            Self::render(item)
                        }
                    })
                    .collect();
                format!("[{}]", elements.join(", "))
            }
            Value::Object(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(key, val)| match val {
                        Value::String(s) => format!("{} = {}", format_key(key), quote(s)),
                        other => format!("{} = {}", format_key(key), Self::render(other)),
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }

    /// Returns true for scalar values (string, number, bool, null).
    #[must_use]
    pub const fn is_primitive(value: &Value) -> bool {
        !matches!(value, Value::Array(_) | Value::Object(_))
    }

    /// Parses raw text as an HCL expression.
    ///
    /// Text that is not a valid expression is retried as the content of a
    /// quoted string literal.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidValue`] if neither attempt evaluates.
    pub fn try_parse(raw: &str) -> Result<Value> {
        match parse_expression(raw) {
            Ok(value) => Ok(value),
            Err(first) => {
                debug!("Value is not an HCL expression, retrying as string: {first}");
                parse_expression(&quote(raw)).map_err(|_| {
                    DocumentError::InvalidValue {
                        value: raw.to_string(),
                        message: first,
                    }
                    .into()
                })
            }
        }
    }

    /// Parses raw text like [`ValueCodec::try_parse`], falling back to an
    /// empty string.
    #[must_use]
    pub fn parse(raw: &str) -> Value {
        Self::try_parse(raw).unwrap_or_else(|e| {
            warn!("Cannot convert value, using empty string: {e}");
            Value::String(String::new())
        })
    }
}

/// Evaluates an expression without any variables or functions in scope.
pub(crate) fn evaluate(expr: &Expression) -> std::result::Result<Value, String> {
    let ctx = Context::new();
    expr.evaluate(&ctx).map_err(|e| e.to_string())
}

/// Parses and evaluates a single expression.
fn parse_expression(raw: &str) -> std::result::Result<Value, String> {
    let body = hcl::parse(&format!("value = {raw}\n")).map_err(|e| e.to_string())?;

    if body.attributes().count() != 1 || body.blocks().next().is_some() {
        return Err(String::from("unexpected content after expression"));
    }

    let attr = body
        .attributes()
        .next()
        .ok_or_else(|| String::from("missing expression"))?;

    evaluate(attr.expr())
}
