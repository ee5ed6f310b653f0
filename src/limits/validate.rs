//! Validators for untyped parameter values.
//!
//! Parameters arrive as `serde_json::Value`s, typically deserialized from
//! YAML node data.  Each validator takes the parameter name and the value,
//! where `None` means the parameter was absent and `Some(Value::Null)`
//! means it was explicitly null.  "Optional" types accept both.

use serde_json::Value;

use super::absolute_path::AbsolutePath;
use super::file_mode::FileMode;
use crate::errors::{ExpectedType, ValidationError};

/// Accept `true` or `false`, and nothing else.  In particular, the string
/// `"false"` is not a boolean.
pub fn validate_boolean(name: &str, value: Option<&Value>) -> Result<bool, ValidationError> {
    match value {
        Some(&Value::Bool(b)) => Ok(b),
        other => Err(ValidationError::new(name, ExpectedType::Boolean, other)),
    }
}

/// Accept null, a missing value, or a sequence of values of any type.
pub fn validate_optional_array(
    name: &str,
    value: Option<&Value>,
) -> Result<Option<Vec<Value>>, ValidationError> {
    match value {
        None | Some(&Value::Null) => Ok(None),
        Some(&Value::Array(ref items)) => Ok(Some(items.clone())),
        other => Err(ValidationError::new(name, ExpectedType::UndefOrArray, other)),
    }
}

/// Accept null, a missing value, or a string.
pub fn validate_optional_string(
    name: &str,
    value: Option<&Value>,
) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(&Value::Null) => Ok(None),
        Some(&Value::String(ref s)) => Ok(Some(s.clone())),
        other => Err(ValidationError::new(name, ExpectedType::UndefOrString, other)),
    }
}

/// Accept a string containing an absolute path.
pub fn validate_absolute_path(
    name: &str,
    value: Option<&Value>,
) -> Result<AbsolutePath, ValidationError> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<AbsolutePath>().ok())
        .ok_or_else(|| ValidationError::new(name, ExpectedType::Absolutepath, value))
}

/// Accept a string containing a four-digit octal file mode.  Integers are
/// rejected even when they look like a mode.
pub fn validate_file_mode(name: &str, value: Option<&Value>) -> Result<FileMode, ValidationError> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<FileMode>().ok())
        .ok_or_else(|| ValidationError::new(name, ExpectedType::Filemode, value))
}

/// Invalid inputs shared by most of the validation tables below.
#[cfg(test)]
fn common_invalid_values() -> Vec<Value> {
    use serde_json::json;
    vec![json!(["array"]), json!({ "ha": "sh" }), json!(3), json!(2.42)]
}

#[test]
fn boolean_accepts_only_booleans() {
    use serde_json::json;
    assert_eq!(validate_boolean("purge_limits_d_dir", Some(&json!(true))), Ok(true));
    assert_eq!(validate_boolean("purge_limits_d_dir", Some(&json!(false))), Ok(false));

    let mut invalid = common_invalid_values();
    invalid.extend(vec![json!("string"), json!("false"), json!("true"), Value::Null]);
    for value in &invalid {
        let err = validate_boolean("purge_limits_d_dir", Some(value)).unwrap_err();
        assert_eq!(err.field, "purge_limits_d_dir");
        assert_eq!(err.expected, ExpectedType::Boolean);
    }
    assert!(validate_boolean("purge_limits_d_dir", None).is_err());
}

#[test]
fn optional_array_accepts_null_and_sequences() {
    use serde_json::json;
    assert_eq!(
        validate_optional_array("config_file_lines", Some(&json!(["array"]))),
        Ok(Some(vec![json!("array")]))
    );
    assert_eq!(validate_optional_array("config_file_lines", Some(&json!([]))), Ok(Some(vec![])));
    assert_eq!(validate_optional_array("config_file_lines", Some(&Value::Null)), Ok(None));
    assert_eq!(validate_optional_array("config_file_lines", None), Ok(None));

    for value in &[json!("string"), json!({ "ha": "sh" }), json!(3), json!(2.42), json!(false)] {
        let err = validate_optional_array("config_file_lines", Some(value)).unwrap_err();
        assert_eq!(err.expected, ExpectedType::UndefOrArray);
        assert!(err.to_string().contains("Undef or Array"));
    }
}

#[test]
fn optional_string_accepts_null_and_strings() {
    use serde_json::json;
    let source = json!("puppet:///pam/unit_tests.erb");
    assert_eq!(
        validate_optional_string("config_file_source", Some(&source)),
        Ok(Some("puppet:///pam/unit_tests.erb".to_owned()))
    );
    assert_eq!(validate_optional_string("config_file_source", Some(&Value::Null)), Ok(None));
    assert_eq!(validate_optional_string("config_file_source", None), Ok(None));

    let mut invalid = common_invalid_values();
    invalid.push(json!(false));
    for value in &invalid {
        let err = validate_optional_string("config_file_source", Some(value)).unwrap_err();
        assert_eq!(err.expected, ExpectedType::UndefOrString);
    }
}

#[test]
fn absolute_path_validation_table() {
    use serde_json::json;
    for name in &["config_file", "limits_d_dir"] {
        for valid in &["/absolute/filepath", "/absolute/directory/"] {
            let path = validate_absolute_path(name, Some(&json!(valid))).unwrap();
            assert_eq!(path.as_str(), *valid);
        }

        let mut invalid = common_invalid_values();
        invalid.extend(vec![json!("../invalid"), json!(false), Value::Null]);
        for value in &invalid {
            let err = validate_absolute_path(name, Some(value)).unwrap_err();
            assert_eq!(err.field, *name);
            assert_eq!(err.expected, ExpectedType::Absolutepath);
        }
        assert!(validate_absolute_path(name, None).is_err());
    }
}

#[test]
fn file_mode_validation_table() {
    use serde_json::json;
    for name in &["config_file_mode", "limits_d_dir_mode"] {
        for valid in &["0644", "0755", "0640", "0740"] {
            let mode = validate_file_mode(name, Some(&json!(valid))).unwrap();
            assert_eq!(mode.as_str(), *valid);
        }

        let mut invalid = common_invalid_values();
        invalid.extend(vec![
            json!(2770),
            json!("0844"),
            json!("755"),
            json!("00644"),
            json!("string"),
            json!(false),
            Value::Null,
        ]);
        for value in &invalid {
            let err = validate_file_mode(name, Some(value)).unwrap_err();
            assert_eq!(err.expected, ExpectedType::Filemode);
            assert_eq!(err.actual, value.to_string());
        }
    }
}
