//! Rendering parameters into a resource set.

use log::{debug, trace};
use serde_json::{Map, Value};

use super::content::ContentSource;
use super::facts::Facts;
use super::params::Parameters;
use super::resource::{build_resources, ResourceSet};
use crate::errors::*;

impl Parameters {
    /// Build the resource set for these parameters.  Directory resources
    /// are only included if `supports_fragments` is true.
    pub fn render(&self, supports_fragments: bool) -> ResourceSet {
        let content = ContentSource::resolve(self);
        debug!(
            "rendering {} from {} content (fragments: {})",
            &self.config_file,
            content.kind(),
            supports_fragments
        );
        build_resources(self, content, supports_fragments)
    }
}

/// Validate untyped parameters and render them.  If any parameter is
/// invalid, we fail without building anything.
pub fn render(raw: &Map<String, Value>, supports_fragments: bool) -> Result<ResourceSet> {
    let params = Parameters::from_map(raw)?;
    trace!("validated parameters: {:?}", &params);
    Ok(params.render(supports_fragments))
}

/// Like `render`, but decide fragment support from host facts.
pub fn render_for_host(raw: &Map<String, Value>, facts: &Facts) -> Result<ResourceSet> {
    render(raw, facts.supports_limits_fragments())
}

#[cfg(test)]
fn raw_params(yaml: &str) -> Map<String, Value> {
    match serde_yaml::from_str::<Value>(yaml).unwrap() {
        Value::Object(map) => map,
        other => panic!("not a mapping: {:?}", other),
    }
}

#[cfg(test)]
fn el7() -> Facts {
    Facts::new("RedHat", "7")
}

#[test]
fn default_values_on_el7() {
    let resources = render_for_host(&Map::new(), &el7()).unwrap();

    assert_eq!(resources.file.path.as_str(), "/etc/security/limits.conf");
    assert_eq!(resources.file.mode.as_str(), "0640");
    assert_eq!(
        resources.file.content.as_ref().unwrap(),
        super::content::DEFAULT_LIMITS_CONF
    );

    let dir = resources.directory().unwrap();
    assert_eq!(dir.path.as_str(), "/etc/security/limits.d");
    assert_eq!(dir.mode.as_str(), "0750");
    assert!(!dir.purge);
    assert_eq!(
        resources.directory_ensure().unwrap().name,
        "mkdir_p-/etc/security/limits.d"
    );
}

#[test]
fn default_values_on_suse10() {
    let resources = render_for_host(&Map::new(), &Facts::new("Suse", "10")).unwrap();
    assert!(resources.directory().is_none());
    assert!(resources.directory_ensure().is_none());
    assert_eq!(resources.file.path.as_str(), "/etc/security/limits.conf");
}

#[test]
fn config_file_set_to_a_valid_path() {
    let resources = render(&raw_params("config_file: /testing\n"), true).unwrap();
    let default = Parameters::default().render(true);
    assert_eq!(resources.file.path.as_str(), "/testing");
    assert_eq!(resources.file.mode, default.file.mode);
    assert_eq!(resources.file.content, default.file.content);
    assert_eq!(resources.fragments, default.fragments);
}

#[test]
fn config_file_lines_set_to_a_valid_array() {
    let yaml = r#"---
config_file_lines:
  - "* soft nofile 2048"
  - "* hard nofile 8192"
"#;
    let resources = render(&raw_params(yaml), true).unwrap();
    let content = resources.file.content.unwrap();
    assert!(content.starts_with("* soft nofile 2048\n* hard nofile 8192\n"));
    assert_eq!(content, "* soft nofile 2048\n* hard nofile 8192\n");
    assert_eq!(resources.file.source, None);
}

#[test]
fn config_file_source_set_to_a_valid_string() {
    let yaml = "config_file_source: \"puppet:///pam/unit_tests.erb\"\n";
    let resources = render(&raw_params(yaml), true).unwrap();
    assert_eq!(
        resources.file.source.as_ref().unwrap(),
        "puppet:///pam/unit_tests.erb"
    );
    assert_eq!(resources.file.content, None);
}

#[test]
fn config_file_lines_and_source_both_set() {
    let yaml = r#"---
config_file_lines:
  - "* soft nofile 2048"
  - "* hard nofile 8192"
config_file_source: "pam/unit_tests.erb"
"#;
    let resources = render(&raw_params(yaml), true).unwrap();
    assert_eq!(resources.file.source, None);
    assert_eq!(
        resources.file.content.unwrap(),
        "* soft nofile 2048\n* hard nofile 8192\n"
    );
}

#[test]
fn empty_config_file_lines_beat_source() {
    let yaml = r#"---
config_file_lines: []
config_file_source: "pam/unit_tests.erb"
"#;
    let resources = render(&raw_params(yaml), true).unwrap();
    assert_eq!(resources.file.source, None);
    assert_eq!(resources.file.content.unwrap(), "\n");
}

#[test]
fn null_config_file_lines_leave_source_in_charge() {
    let yaml = r#"---
config_file_lines: ~
config_file_source: "pam/unit_tests.erb"
"#;
    let resources = render(&raw_params(yaml), true).unwrap();
    assert_eq!(resources.file.content, None);
    assert_eq!(resources.file.source.unwrap(), "pam/unit_tests.erb");
}

#[test]
fn null_content_parameters_fall_back_to_default_template() {
    let yaml = "config_file_lines: ~\nconfig_file_source: ~\n";
    let resources = render(&raw_params(yaml), false).unwrap();
    assert_eq!(resources.file.source, None);
    assert_eq!(
        resources.file.content.unwrap(),
        super::content::DEFAULT_LIMITS_CONF
    );
}

#[test]
fn modes_set_to_valid_strings() {
    let yaml = "config_file_mode: \"0242\"\nlimits_d_dir_mode: \"0242\"\n";
    let resources = render(&raw_params(yaml), true).unwrap();
    assert_eq!(resources.file.mode.as_str(), "0242");
    assert_eq!(resources.directory().unwrap().mode.as_str(), "0242");
}

#[test]
fn limits_d_dir_set_to_a_valid_string() {
    let resources = render(&raw_params("limits_d_dir: /testing.d\n"), true).unwrap();
    let dir = resources.directory().unwrap();
    assert_eq!(dir.path.as_str(), "/testing.d");
    assert_eq!(resources.directory_ensure().unwrap().name, "mkdir_p-/testing.d");
    let require: Vec<String> = dir.require.iter().map(|d| d.to_string()).collect();
    assert_eq!(require, vec!["Package[pam]", "Exec[mkdir_p-/testing.d]"]);
}

#[test]
fn purge_limits_d_dir_set_to_true() {
    let resources = render(&raw_params("purge_limits_d_dir: true\n"), true).unwrap();
    let dir = resources.directory().unwrap();
    assert!(dir.purge);
    assert!(dir.recurse);
}

#[test]
fn invalid_parameters_fail_closed() {
    let cases = vec![
        ("purge_limits_d_dir: \"false\"\n", ExpectedType::Boolean),
        ("config_file_lines: \"string\"\n", ExpectedType::UndefOrArray),
        ("config_file_source: false\n", ExpectedType::UndefOrString),
        ("config_file: ../invalid\n", ExpectedType::Absolutepath),
        ("limits_d_dir: 3\n", ExpectedType::Absolutepath),
        ("config_file_mode: \"0844\"\n", ExpectedType::Filemode),
        ("limits_d_dir_mode: \"00644\"\n", ExpectedType::Filemode),
    ];
    for (yaml, expected) in cases {
        let err = render(&raw_params(yaml), true).unwrap_err();
        match err.kind() {
            ErrorKind::Validation(inner) => assert_eq!(inner.expected, expected, "{}", yaml),
            other => panic!("unexpected error for {}: {:?}", yaml, other),
        }
    }
}
