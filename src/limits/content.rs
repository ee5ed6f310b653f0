//! Choosing where the contents of `limits.conf` come from.

use super::params::Parameters;

/// The stock `limits.conf`, used when no lines or source are given.
pub const DEFAULT_LIMITS_CONF: &str = include_str!("limits.conf");

/// The effective content source for the managed file.  Exactly one source
/// wins, in this order of priority: explicit lines, an external source,
/// and finally our built-in default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Render these lines joined by newlines, plus a final newline.
    Lines(Vec<String>),
    /// Let the applier fetch content from this reference.
    Source(String),
    /// Use `DEFAULT_LIMITS_CONF`.
    Default,
}

impl ContentSource {
    /// Pick the content source for `params`.  Lines win whenever they are
    /// set, even if there are no lines at all, in which case the content is
    /// a single newline.
    pub fn resolve(params: &Parameters) -> ContentSource {
        if let Some(ref lines) = params.config_file_lines {
            ContentSource::Lines(lines.clone())
        } else if let Some(ref source) = params.config_file_source {
            ContentSource::Source(source.clone())
        } else {
            ContentSource::Default
        }
    }

    /// The literal file contents, unless the content comes from an external
    /// source.
    pub fn content(&self) -> Option<String> {
        match *self {
            ContentSource::Lines(ref lines) => Some(lines.join("\n") + "\n"),
            ContentSource::Source(_) => None,
            ContentSource::Default => Some(DEFAULT_LIMITS_CONF.to_owned()),
        }
    }

    /// The external source reference, if that's where content comes from.
    pub fn source(&self) -> Option<&str> {
        match *self {
            ContentSource::Source(ref source) => Some(source.as_str()),
            _ => None,
        }
    }

    /// Split into a `(content, source)` pair.  Exactly one half is set.
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        match self {
            ContentSource::Source(source) => (None, Some(source)),
            other => (other.content(), None),
        }
    }

    /// A short name for log messages.
    pub fn kind(&self) -> &'static str {
        match *self {
            ContentSource::Lines(_) => "lines",
            ContentSource::Source(_) => "source",
            ContentSource::Default => "default",
        }
    }
}

/// Resolve `(content, source)` for `params` in a single step.
pub fn resolve_content(params: &Parameters) -> (Option<String>, Option<String>) {
    ContentSource::resolve(params).into_parts()
}

#[cfg(test)]
fn two_lines() -> Vec<String> {
    vec!["* soft nofile 2048".to_owned(), "* hard nofile 8192".to_owned()]
}

#[test]
fn lines_are_joined_with_trailing_newline() {
    let params = Parameters {
        config_file_lines: Some(two_lines()),
        ..Default::default()
    };
    let (content, source) = resolve_content(&params);
    assert_eq!(content.unwrap(), "* soft nofile 2048\n* hard nofile 8192\n");
    assert_eq!(source, None);
}

#[test]
fn source_is_passed_through_verbatim() {
    let params = Parameters {
        config_file_source: Some("puppet:///pam/unit_tests.erb".to_owned()),
        ..Default::default()
    };
    assert_eq!(
        ContentSource::resolve(&params),
        ContentSource::Source("puppet:///pam/unit_tests.erb".to_owned())
    );
    let (content, source) = resolve_content(&params);
    assert_eq!(content, None);
    assert_eq!(source.unwrap(), "puppet:///pam/unit_tests.erb");
}

#[test]
fn lines_take_priority_over_source() {
    let params = Parameters {
        config_file_lines: Some(two_lines()),
        config_file_source: Some("pam/unit_tests.erb".to_owned()),
        ..Default::default()
    };
    let resolved = ContentSource::resolve(&params);
    assert_eq!(resolved.source(), None);
    assert_eq!(resolved.content().unwrap(), "* soft nofile 2048\n* hard nofile 8192\n");
}

#[test]
fn empty_lines_still_take_priority_over_source() {
    let params = Parameters {
        config_file_lines: Some(vec![]),
        config_file_source: Some("pam/unit_tests.erb".to_owned()),
        ..Default::default()
    };
    assert_eq!(resolve_content(&params), (Some("\n".to_owned()), None));
}

#[test]
fn empty_lines_render_as_a_single_newline() {
    let params = Parameters {
        config_file_lines: Some(vec![]),
        ..Default::default()
    };
    assert_eq!(ContentSource::resolve(&params).content().unwrap(), "\n");
}

#[test]
fn single_line_gets_a_trailing_newline() {
    let params = Parameters {
        config_file_lines: Some(vec!["* soft core 0".to_owned()]),
        ..Default::default()
    };
    assert_eq!(resolve_content(&params).0.unwrap(), "* soft core 0\n");
}

#[test]
fn default_template_is_used_when_nothing_is_set() {
    let (content, source) = resolve_content(&Parameters::default());
    assert_eq!(source, None);
    let content = content.unwrap();
    assert_eq!(content, DEFAULT_LIMITS_CONF);
    assert!(content.starts_with("# This file is being maintained by Puppet.\n# DO NOT EDIT\n"));
    assert!(content.contains("#@student        -       maxlogins       4\n"));
    assert!(content.ends_with("\n# End of file\n"));
}

#[test]
fn exactly_one_of_content_and_source_is_set() {
    let cases = vec![
        Parameters::default(),
        Parameters { config_file_lines: Some(two_lines()), ..Default::default() },
        Parameters { config_file_source: Some("x".to_owned()), ..Default::default() },
        Parameters {
            config_file_lines: Some(vec![]),
            config_file_source: Some("x".to_owned()),
            ..Default::default()
        },
    ];
    for params in &cases {
        let (content, source) = resolve_content(params);
        assert!(content.is_some() != source.is_some(), "{:?}", params);
    }
}
