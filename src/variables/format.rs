//! HCL text for values written into variable documents.

use hcl::edit::{Ident, expr, parser};
use hcl::format::{Format, Formatter};
use hcl::{Expression, Value};

/// Quotes a string as an HCL string literal.
///
/// Template sequences are escaped so the literal evaluates back to `s`.
#[must_use]
pub fn quote(s: &str) -> String {
    expr::Expression::from(s).to_string()
}

/// Formats an object key, quoting it when it is not an identifier.
#[must_use]
pub fn format_key(key: &str) -> String {
    if Ident::try_new(key).is_ok() {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Builds the document expression for a value.
///
/// Lists stay on one line; non-empty objects put one entry per line with a
/// two-space indent.
///
/// # Errors
///
/// Returns the formatter or parser message if the value cannot be written.
pub fn value_expression(value: &Value) -> Result<expr::Expression, String> {
    let mut fmt = Formatter::builder()
        .compact_arrays(true)
        .prefer_ident_keys(true)
        .build_vec();

    // Strings go through `Expression` so template markers are escaped
    let text = Expression::from(value.clone())
        .format_string(&mut fmt)
        .map_err(|e| e.to_string())?;

    parser::parse_expr(&text).map_err(|e| e.to_string())
}
