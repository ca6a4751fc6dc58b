//! Validation helpers shared by the write-side inputs

use std::collections::BTreeMap;

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Reject strings that are empty or whitespace only.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Flatten validation errors into a field -> message map.
///
/// Nested fields are keyed `parent.child`, list elements `parent[index]`.
/// When a field has several violations the first one is kept. Errors without
/// a message fall back to their code.
pub fn field_violations(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut violations = BTreeMap::new();
    collect(errors, None, &mut violations);
    violations
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(error) = field_errors.first() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.entry(path).or_insert(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}
