//! Default error message catalog.
//!
//! Every field kind carries a small set of default messages keyed by reason
//! code. Per-field overrides (via [`Field::message`](crate::Field::message))
//! are resolved first; the kind catalog second; the generic fallbacks last.

/// Generic fallback message for the `required` reason code.
pub(crate) const REQUIRED: &str = "Required Field";

/// Generic fallback message for any unknown reason code.
pub(crate) const INVALID: &str = "Invalid Field";

/// Returns the default message for a field kind and reason code.
///
/// `kind` is the label reported by `FieldKind::label()`.
pub(crate) fn default_message(kind: &str, code: &str) -> Option<&'static str> {
    let msg = match (kind, code) {
        ("string", "invalid") => "Field is not a valid String",
        ("string", "empty") => "Field cannot be empty",
        ("string", "pattern") => "Field does not match the expected pattern",
        ("integer", "invalid") => "Field is not a valid Integer",
        ("float", "invalid") => "Field is not a valid Float",
        ("boolean", "invalid") => "Field is not a valid Boolean",
        ("dict", "invalid") => "Field is not a valid Mapping",
        ("list", "invalid") => "Field is not a valid List",
        ("list", "invalid_item") => "Field item is invalid",
        ("date", "invalid") => "Field is not a valid Date",
        ("datetime", "invalid") => "Field is not a valid DateTime",
        ("uuid", "invalid") => "Field is not a valid UUID",
        ("nested", "invalid") => "Invalid Schema",
        ("nested", "invalid_mapping") => "Field is not a valid Mapping",
        ("nested", "max_depth") => "Maximum schema depth exceeded",
        ("self", "invalid") => "Invalid Schema",
        ("self", "invalid_mapping") => "Field is not a valid Mapping",
        ("self", "max_depth") => "Maximum schema depth exceeded",
        ("one_of", "invalid") => "Field does not match any allowed type",
        _ => return None,
    };
    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_specific_message() {
        assert_eq!(
            default_message("string", "invalid"),
            Some("Field is not a valid String")
        );
        assert_eq!(
            default_message("list", "invalid_item"),
            Some("Field item is invalid")
        );
    }

    #[test]
    fn test_unknown_code_falls_through() {
        assert_eq!(default_message("string", "nope"), None);
        assert_eq!(default_message("anything", "invalid"), None);
    }
}
