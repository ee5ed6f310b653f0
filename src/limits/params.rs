//! The typed parameter record for rendering `limits.conf`.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use std::result;
use std::str::FromStr;

use super::absolute_path::AbsolutePath;
use super::file_mode::FileMode;
use super::validate::*;
use crate::errors::*;

/// Every parameter name we accept, in the order we validate them.
pub const PARAMETER_NAMES: &[&str] = &[
    "config_file",
    "config_file_lines",
    "config_file_source",
    "config_file_mode",
    "limits_d_dir",
    "limits_d_dir_mode",
    "purge_limits_d_dir",
];

/// Validated parameters for a single render.  Construct one with
/// `Parameters::default()` and struct update syntax, or from untyped data
/// with `Parameters::from_map` or `Parameters::from_str`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameters {
    /// Where to write the rendered file.
    pub config_file: AbsolutePath,

    /// Explicit lines for the file.  Takes priority over
    /// `config_file_source` whenever it is set, even if it is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file_lines: Option<Vec<String>>,

    /// A reference to external content, such as
    /// `puppet:///modules/pam/limits.conf`.  Passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file_source: Option<String>,

    /// Mode of the rendered file.
    pub config_file_mode: FileMode,

    /// The `limits.d` fragment directory.  Only managed on platforms which
    /// support fragments.
    pub limits_d_dir: AbsolutePath,

    /// Mode of the fragment directory.
    pub limits_d_dir_mode: FileMode,

    /// Remove unmanaged files from the fragment directory?
    pub purge_limits_d_dir: bool,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            config_file: default_value("/etc/security/limits.conf"),
            config_file_lines: None,
            config_file_source: None,
            config_file_mode: default_value("0640"),
            limits_d_dir: default_value("/etc/security/limits.d"),
            limits_d_dir_mode: default_value("0750"),
            purge_limits_d_dir: false,
        }
    }
}

/// Parse one of our built-in default values.
fn default_value<T>(s: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Debug,
{
    match s.parse() {
        Ok(value) => value,
        Err(err) => panic!("built-in default <{}> is invalid: {:?}", s, err),
    }
}

/// Validate the parameter `name` if it is present in `raw`, or fall back
/// to `default` if it is absent.  An explicit null is a value like any
/// other, and must satisfy `validate`.
fn field<T, F>(
    raw: &Map<String, Value>,
    name: &str,
    default: T,
    validate: F,
) -> result::Result<T, ValidationError>
where
    F: FnOnce(&str, Option<&Value>) -> result::Result<T, ValidationError>,
{
    match raw.get(name) {
        Some(value) => validate(name, Some(value)),
        None => Ok(default),
    }
}

/// Turn a single element of `config_file_lines` into a line of text.
fn line_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Parameters {
    /// Validate a map of untyped parameter values.  Absent parameters take
    /// their defaults.  We report the first invalid parameter we find,
    /// and refuse parameter names we don't know.
    pub fn from_map(raw: &Map<String, Value>) -> Result<Parameters> {
        if let Some(name) = raw.keys().find(|k| !PARAMETER_NAMES.contains(&k.as_str())) {
            return Err(ErrorKind::UnknownParameter(name.to_owned()).into());
        }

        let defaults = Parameters::default();
        let config_file = field(raw, "config_file", defaults.config_file, validate_absolute_path)?;
        let config_file_lines =
            field(raw, "config_file_lines", None, validate_optional_array)?
                .map(|lines| lines.into_iter().map(line_text).collect());
        let config_file_source =
            field(raw, "config_file_source", None, validate_optional_string)?;
        let config_file_mode =
            field(raw, "config_file_mode", defaults.config_file_mode, validate_file_mode)?;
        let limits_d_dir =
            field(raw, "limits_d_dir", defaults.limits_d_dir, validate_absolute_path)?;
        let limits_d_dir_mode =
            field(raw, "limits_d_dir_mode", defaults.limits_d_dir_mode, validate_file_mode)?;
        let purge_limits_d_dir = field(
            raw,
            "purge_limits_d_dir",
            defaults.purge_limits_d_dir,
            validate_boolean,
        )?;

        Ok(Parameters {
            config_file,
            config_file_lines,
            config_file_source,
            config_file_mode,
            limits_d_dir,
            limits_d_dir_mode,
            purge_limits_d_dir,
        })
    }

    /// Validate an untyped value, which must be a mapping from parameter
    /// names to values.  `null` is treated as an empty mapping.
    pub fn from_value(value: &Value) -> Result<Parameters> {
        match *value {
            Value::Object(ref raw) => Parameters::from_map(raw),
            Value::Null => Parameters::from_map(&Map::new()),
            _ => Err(ErrorKind::NotAMapping.into()),
        }
    }

    /// Read parameters from an input stream containing YAML (or JSON,
    /// which we parse as YAML).
    pub fn read<R>(r: R) -> Result<Self>
    where
        R: io::Read,
    {
        let value: Value = serde_yaml::from_reader(r)?;
        Parameters::from_value(&value)
    }

    /// Read parameters from the specified path.
    pub fn read_from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mkerr = || ErrorKind::ReadFile(path.to_owned());
        let f = fs::File::open(path).chain_err(&mkerr)?;
        Self::read(io::BufReader::new(f)).chain_err(&mkerr)
    }
}

impl FromStr for Parameters {
    type Err = Error;

    fn from_str(s: &str) -> Result<Parameters> {
        Self::read(io::Cursor::new(s))
    }
}

#[test]
fn parameters_have_defaults() {
    let params = Parameters::default();
    assert_eq!(params.config_file.as_str(), "/etc/security/limits.conf");
    assert_eq!(params.config_file_mode.as_str(), "0640");
    assert_eq!(params.limits_d_dir.as_str(), "/etc/security/limits.d");
    assert_eq!(params.limits_d_dir_mode.as_str(), "0750");
    assert!(!params.purge_limits_d_dir);
    assert_eq!(params.config_file_lines, None);
    assert_eq!(params.config_file_source, None);
    assert_eq!(Parameters::from_map(&Map::new()).unwrap(), params);
}

#[test]
fn parameters_can_be_read_from_yaml() {
    let yaml = r#"---
config_file: "/testing"
config_file_lines:
  - "* soft nofile 2048"
  - "* hard nofile 8192"
config_file_mode: "0242"
purge_limits_d_dir: true
"#;
    let params = Parameters::from_str(yaml).unwrap();
    assert_eq!(params.config_file.as_str(), "/testing");
    assert_eq!(
        params.config_file_lines,
        Some(vec!["* soft nofile 2048".to_owned(), "* hard nofile 8192".to_owned()])
    );
    assert_eq!(params.config_file_mode.as_str(), "0242");
    assert!(params.purge_limits_d_dir);
    assert_eq!(params.limits_d_dir_mode.as_str(), "0750");
}

#[test]
fn parameters_can_be_read_from_json() {
    let json = r#"{"limits_d_dir": "/testing.d", "config_file_source": null}"#;
    let params = Parameters::from_str(json).unwrap();
    assert_eq!(params.limits_d_dir.as_str(), "/testing.d");
    assert_eq!(params.config_file_source, None);
}

#[test]
fn parameters_reject_unquoted_modes() {
    // An unquoted YAML mode is an integer, not a file mode.
    let err = Parameters::from_str("config_file_mode: 2770\n").unwrap_err();
    match err.kind() {
        ErrorKind::Validation(inner) => {
            assert_eq!(inner.field, "config_file_mode");
            assert_eq!(inner.expected, ExpectedType::Filemode);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn parameters_reject_string_booleans_and_null_booleans() {
    for yaml in &["purge_limits_d_dir: \"false\"\n", "purge_limits_d_dir: ~\n"] {
        match Parameters::from_str(yaml).unwrap_err().kind() {
            ErrorKind::Validation(inner) => assert_eq!(inner.expected, ExpectedType::Boolean),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[test]
fn parameters_report_the_first_invalid_field() {
    let yaml = r#"---
config_file: "../invalid"
config_file_mode: "755"
purge_limits_d_dir: "false"
"#;
    match Parameters::from_str(yaml).unwrap_err().kind() {
        ErrorKind::Validation(inner) => assert_eq!(inner.field, "config_file"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn parameters_reject_unknown_names() {
    match Parameters::from_str("config_file_content: \"x\"\n").unwrap_err().kind() {
        ErrorKind::UnknownParameter(name) => assert_eq!(name, "config_file_content"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn missing_parameter_file_reports_the_path() {
    let path = std::env::temp_dir().join(format!("pam_limits-absent-{}.yml", std::process::id()));
    match Parameters::read_from_path(&path).unwrap_err().kind() {
        ErrorKind::ReadFile(p) => assert_eq!(p, &path),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn parameters_must_be_a_mapping() {
    match Parameters::from_str("- config_file\n").unwrap_err().kind() {
        ErrorKind::NotAMapping => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn parameters_render_non_string_lines_as_text() {
    use serde_json::json;
    let mut raw = Map::new();
    raw.insert("config_file_lines".to_owned(), json!(["* soft core 0", 3, true, null]));
    let params = Parameters::from_map(&raw).unwrap();
    assert_eq!(
        params.config_file_lines.unwrap(),
        vec!["* soft core 0", "3", "true", ""]
    );
}
