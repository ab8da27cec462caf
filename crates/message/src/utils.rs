//! Utility macros used internally by the message crate.

/// Early return with an error if a condition is not met.
///
/// Works like `assert!`, but returns `Err($error)` instead of panicking.
///
/// ```ignore
/// ensure!(!user.contains(':'), ValidationError::UserContainsColon);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error.into());
        }
    };
}

pub(crate) use ensure;

/// Names the type of a json value in error messages.
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
