//! SQL identifier checks for configured table names.
//!
//! Table names come from configuration and end up spliced into SQL text, so
//! only plain identifiers (optionally schema qualified) are accepted.

use crate::prelude::*;

/// PostgreSQL truncates identifiers longer than this.
const MAX_IDENTIFIER_LEN: usize = 63;

fn is_plain_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    part.len() <= MAX_IDENTIFIER_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check that `name` is `table` or `schema.table` made of plain identifiers.
pub fn validate(name: &str) -> Result<()> {
    let mut parts = name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, None) => is_plain_identifier(table),
        (Some(schema), Some(table), None) => {
            is_plain_identifier(schema) && is_plain_identifier(table)
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

/// Validate `name` and return it double quoted, part by part.
///
/// ```rust
/// use warden_config::ident::quote;
///
/// assert_eq!(quote("acl.roles").unwrap(), r#""acl"."roles""#);
/// assert!(quote("roles; DROP TABLE users").is_err());
/// ```
pub fn quote(name: &str) -> Result<String> {
    validate(name)?;
    Ok(name
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join("."))
}
