//! We provide fancy error-handling support thanks to the [`error_chain`
//! crate][error_chain].  Parameter validation failures are reported as a
//! single structured type, `ValidationError`, which is wrapped into our
//! chained `Error` like any other foreign error.
//!
//! [error_chain]: https://github.com/brson/error-chain

// Sadly, this macro does not generate complete documentation.
#![allow(missing_docs)]

use serde_json::Value;
use std::error;
use std::fmt;
use std::path::PathBuf;

error_chain! {
    // These are external, non-`error_chain` error types that we can
    // automatically wrap.
    foreign_links {
        // A parameter had the wrong type or failed its grammar.
        Validation(ValidationError);
        // A resource set could not be written as JSON.
        Json(serde_json::Error);
        // A parameter document or resource set could not be read or
        // written as YAML.
        Yaml(serde_yaml::Error);
    }

    // These are our "native" error types.
    errors {
        /// A parameter was supplied that the renderer does not declare.
        UnknownParameter(name: String) {
            description("unknown parameter")
            display("invalid parameter '{}'", &name)
        }

        /// A parameter document was valid YAML but not a mapping.
        NotAMapping {
            description("parameters must be a mapping")
            display("parameters must be a mapping of names to values")
        }

        /// An error occurred reading a file.
        ReadFile(path: PathBuf) {
            description("error reading file")
            display("error reading file '{}'", path.display())
        }

        /// An error occurred writing a file.
        WriteFile(path: PathBuf) {
            description("error writing to file")
            display("error writing to file '{}'", path.display())
        }
    }
}

/// The type a parameter was expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// `true` or `false`, and nothing else.
    Boolean,
    /// Unset, null, or a sequence of values.
    UndefOrArray,
    /// Unset, null, or a string.
    UndefOrString,
    /// A string containing an absolute path.
    Absolutepath,
    /// A string containing a four-digit octal file mode.
    Filemode,
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ExpectedType::Boolean => write!(f, "Boolean"),
            ExpectedType::UndefOrArray => write!(f, "Undef or Array"),
            ExpectedType::UndefOrString => write!(f, "Undef or String"),
            ExpectedType::Absolutepath => write!(f, "Absolutepath"),
            ExpectedType::Filemode => write!(f, "Filemode"),
        }
    }
}

/// A parameter failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The name of the offending parameter.
    pub field: String,
    /// What we wanted.
    pub expected: ExpectedType,
    /// What we actually got, rendered as JSON, or `undef` if the value was
    /// missing entirely.
    pub actual: String,
}

impl ValidationError {
    /// Create an error for `field`, given the value we actually received.
    pub fn new(field: &str, expected: ExpectedType, actual: Option<&Value>) -> ValidationError {
        ValidationError {
            field: field.to_owned(),
            expected,
            actual: match actual {
                Some(value) => value.to_string(),
                None => "undef".to_owned(),
            },
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter '{}' expects a value of type {}, got <{}>",
            &self.field, self.expected, &self.actual
        )
    }
}

impl error::Error for ValidationError {}

/// An error parsing a string as one of our value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValueError {
    /// A semi-human-readable description of type of data we wanted.
    wanted: String,
    /// The actual input data we received.
    input: String,
}

impl InvalidValueError {
    /// Create an error, specifying the type we wanted, and the value we
    /// actually got.
    pub fn new(wanted: &str, input: &str) -> InvalidValueError {
        InvalidValueError {
            wanted: wanted.to_owned(),
            input: input.to_owned(),
        }
    }
}

impl fmt::Display for InvalidValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: <{}>", &self.wanted, &self.input)
    }
}

impl error::Error for InvalidValueError {}

#[test]
fn validation_error_names_field_and_type() {
    let err = ValidationError::new(
        "purge_limits_d_dir",
        ExpectedType::Boolean,
        Some(&Value::String("false".to_owned())),
    );
    assert_eq!(
        err.to_string(),
        "parameter 'purge_limits_d_dir' expects a value of type Boolean, got <\"false\">"
    );

    let missing = ValidationError::new("config_file", ExpectedType::Absolutepath, None);
    assert_eq!(missing.actual, "undef");
}

#[test]
fn validation_error_converts_into_chained_error() {
    let err: Error = ValidationError::new("config_file_mode", ExpectedType::Filemode, None).into();
    match err.kind() {
        ErrorKind::Validation(inner) => assert_eq!(inner.expected, ExpectedType::Filemode),
        other => panic!("unexpected error kind: {:?}", other),
    }
}
