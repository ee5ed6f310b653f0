//! Descriptions of the resources we want a convergence engine to manage.
//!
//! We never touch the filesystem ourselves.  A `ResourceSet` is plain data
//! which can be inspected, or serialized and handed to whatever applies it.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use super::absolute_path::AbsolutePath;
use super::content::ContentSource;
use super::file_mode::FileMode;
use super::params::Parameters;
use crate::errors::*;

/// The package which owns `limits.conf` and must be installed first.
pub const PAM_PACKAGE: &str = "pam";

/// Title of the managed `limits.conf` file.
pub const LIMITS_CONF_TITLE: &str = "limits_conf";

/// Title of the managed fragment directory.
pub const LIMITS_D_TITLE: &str = "limits_d";

/// Search path for the commands run by `DirectoryEnsure`.
const MKDIR_P_SEARCH_PATH: &str = "/bin:/usr/bin";

/// A reference to another resource which must be applied first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dependency {
    /// An installed package.
    Package(String),
    /// A command which must have been run.
    Exec(String),
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dependency::Package(ref name) => write!(f, "Package[{}]", name),
            Dependency::Exec(ref name) => write!(f, "Exec[{}]", name),
        }
    }
}

impl FromStr for Dependency {
    type Err = InvalidValueError;

    fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
        lazy_static! {
            static ref REFERENCE: Regex = Regex::new(r"^(Package|Exec)\[(.+)\]$").unwrap();
        }
        let caps = REFERENCE
            .captures(s)
            .ok_or_else(|| InvalidValueError::new("resource reference", s))?;
        let name = caps[2].to_owned();
        match &caps[1] {
            "Package" => Ok(Dependency::Package(name)),
            _ => Ok(Dependency::Exec(name)),
        }
    }
}

impl_serialize_to_string!(Dependency);
impl_deserialize_from_str!(Dependency);

/// What kind of filesystem object we want at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

/// A regular file with fixed ownership, mode and contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagedFile {
    /// A unique title for this resource.
    pub title: String,
    /// Always `Ensure::File`.
    pub ensure: Ensure,
    /// Where the file lives.
    pub path: AbsolutePath,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Permission bits.
    pub mode: FileMode,
    /// Literal contents.  Never set at the same time as `source`.
    pub content: Option<String>,
    /// External content reference.  Never set at the same time as
    /// `content`.
    pub source: Option<String>,
    /// Resources to apply first.
    pub require: Vec<Dependency>,
}

/// An idempotent `mkdir -p`, which makes sure a directory and all its
/// parents exist before we manage the directory itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryEnsure {
    /// Unique name, derived from the path: `mkdir_p-/etc/security/limits.d`.
    pub name: String,
    /// The command to run.
    pub command: String,
    /// Skip `command` if this command succeeds.
    pub unless: String,
    /// `PATH` used to find both commands.
    pub search_path: String,
    /// Resources to apply first.
    pub require: Vec<Dependency>,
}

impl DirectoryEnsure {
    /// Create the `mkdir -p` step for `path`.
    pub fn new(path: &AbsolutePath) -> DirectoryEnsure {
        DirectoryEnsure {
            name: DirectoryEnsure::name_for(path),
            command: format!("mkdir -p {}", path),
            unless: format!("test -d {}", path),
            search_path: MKDIR_P_SEARCH_PATH.to_owned(),
            require: vec![Dependency::Package(PAM_PACKAGE.to_owned())],
        }
    }

    /// The name of the `mkdir -p` step for `path`.
    pub fn name_for(path: &AbsolutePath) -> String {
        format!("mkdir_p-{}", path)
    }
}

/// A directory with fixed ownership and mode, optionally purged of any
/// files we don't manage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagedDirectory {
    /// A unique title for this resource.
    pub title: String,
    /// Always `Ensure::Directory`.
    pub ensure: Ensure,
    /// Where the directory lives.
    pub path: AbsolutePath,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Permission bits.
    pub mode: FileMode,
    /// Remove unmanaged files?
    pub purge: bool,
    /// Manage the directory's contents recursively?  Always equal to
    /// `purge`.
    pub recurse: bool,
    /// Resources to apply first.
    pub require: Vec<Dependency>,
}

/// The fragment directory and the step which creates it.  These always
/// come as a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fragments {
    /// Create the directory and its parents.
    pub ensure: DirectoryEnsure,
    /// Manage the directory itself.
    pub directory: ManagedDirectory,
}

/// Everything needed to converge `limits.conf` on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSet {
    /// The rendered `limits.conf`.
    pub file: ManagedFile,
    /// The `limits.d` directory, on platforms which support it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragments: Option<Fragments>,
}

impl ResourceSet {
    /// The managed fragment directory, if any.
    pub fn directory(&self) -> Option<&ManagedDirectory> {
        self.fragments.as_ref().map(|f| &f.directory)
    }

    /// The step which creates the fragment directory, if any.
    pub fn directory_ensure(&self) -> Option<&DirectoryEnsure> {
        self.fragments.as_ref().map(|f| &f.ensure)
    }

    /// Look up a managed file or directory by title.
    pub fn path_of(&self, title: &str) -> Option<&AbsolutePath> {
        if title == self.file.title {
            Some(&self.file.path)
        } else {
            self.directory()
                .filter(|dir| dir.title == title)
                .map(|dir| &dir.path)
        }
    }

    /// Write this resource set to an output stream as YAML.
    pub fn write<W>(&self, w: &mut W) -> Result<()>
    where
        W: io::Write,
    {
        Ok(serde_yaml::to_writer(w, self)?)
    }

    /// Render this resource set as a YAML string.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write this resource set to the specified path as YAML.
    pub fn write_to_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mkerr = || ErrorKind::WriteFile(path.to_owned());
        let f = fs::File::create(path).chain_err(&mkerr)?;
        let mut out = io::BufWriter::new(f);
        self.write(&mut out).chain_err(&mkerr)?;
        out.flush().chain_err(&mkerr)
    }

    /// Render this resource set as pretty-printed JSON, for appliers which
    /// don't speak YAML.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the resource set for `params`, with content from `content`.
/// Directory resources are only included if `supports_fragments` is true.
pub fn build_resources(
    params: &Parameters,
    content: ContentSource,
    supports_fragments: bool,
) -> ResourceSet {
    let pam = Dependency::Package(PAM_PACKAGE.to_owned());
    let (content, source) = content.into_parts();
    let file = ManagedFile {
        title: LIMITS_CONF_TITLE.to_owned(),
        ensure: Ensure::File,
        path: params.config_file.clone(),
        owner: "root".to_owned(),
        group: "root".to_owned(),
        mode: params.config_file_mode.clone(),
        content,
        source,
        require: vec![pam.clone()],
    };

    let fragments = if supports_fragments {
        let ensure = DirectoryEnsure::new(&params.limits_d_dir);
        let directory = ManagedDirectory {
            title: LIMITS_D_TITLE.to_owned(),
            ensure: Ensure::Directory,
            path: params.limits_d_dir.clone(),
            owner: "root".to_owned(),
            group: "root".to_owned(),
            mode: params.limits_d_dir_mode.clone(),
            purge: params.purge_limits_d_dir,
            recurse: params.purge_limits_d_dir,
            require: vec![pam, Dependency::Exec(ensure.name.clone())],
        };
        debug!("managing fragment directory {}", &directory.path);
        Some(Fragments { ensure, directory })
    } else {
        debug!("platform has no limits.d support; skipping {}", &params.limits_d_dir);
        None
    };

    ResourceSet { file, fragments }
}

#[cfg(test)]
fn build_default(supports_fragments: bool) -> ResourceSet {
    let params = Parameters::default();
    let content = ContentSource::resolve(&params);
    build_resources(&params, content, supports_fragments)
}

#[test]
fn dependencies_have_a_string_representation() {
    let pairs = vec![
        (Dependency::Package("pam".to_owned()), "Package[pam]"),
        (
            Dependency::Exec("mkdir_p-/etc/security/limits.d".to_owned()),
            "Exec[mkdir_p-/etc/security/limits.d]",
        ),
    ];
    for (dep, s) in pairs {
        assert_eq!(dep.to_string(), s);
        assert_eq!(dep, Dependency::from_str(s).unwrap());
    }
    assert!(Dependency::from_str("File[limits_conf]").is_err());
    assert!(Dependency::from_str("Package[]").is_err());
}

#[test]
fn default_file_resource() {
    let resources = build_default(true);
    let file = &resources.file;
    assert_eq!(file.title, "limits_conf");
    assert_eq!(file.ensure, Ensure::File);
    assert_eq!(file.path.as_str(), "/etc/security/limits.conf");
    assert_eq!(file.owner, "root");
    assert_eq!(file.group, "root");
    assert_eq!(file.mode.as_str(), "0640");
    assert_eq!(file.source, None);
    assert_eq!(file.content.as_ref().map(|s| &s[..]), Some(super::content::DEFAULT_LIMITS_CONF));
    assert_eq!(file.require, vec![Dependency::Package("pam".to_owned())]);
}

#[test]
fn default_directory_resources_on_fragment_platform() {
    let resources = build_default(true);

    let dir = resources.directory().unwrap();
    assert_eq!(dir.title, "limits_d");
    assert_eq!(dir.ensure, Ensure::Directory);
    assert_eq!(dir.path.as_str(), "/etc/security/limits.d");
    assert_eq!(dir.owner, "root");
    assert_eq!(dir.group, "root");
    assert_eq!(dir.mode.as_str(), "0750");
    assert!(!dir.purge);
    assert!(!dir.recurse);
    let require: Vec<String> = dir.require.iter().map(|d| d.to_string()).collect();
    assert_eq!(require, vec!["Package[pam]", "Exec[mkdir_p-/etc/security/limits.d]"]);

    let mkdir = resources.directory_ensure().unwrap();
    assert_eq!(mkdir.name, "mkdir_p-/etc/security/limits.d");
    assert_eq!(mkdir.command, "mkdir -p /etc/security/limits.d");
    assert_eq!(mkdir.unless, "test -d /etc/security/limits.d");
    assert_eq!(mkdir.require, vec![Dependency::Package("pam".to_owned())]);
}

#[test]
fn no_directory_resources_without_fragment_support() {
    let resources = build_default(false);
    assert!(resources.fragments.is_none());
    assert!(resources.directory().is_none());
    assert!(resources.directory_ensure().is_none());
    assert_eq!(resources.file.path.as_str(), "/etc/security/limits.conf");
    assert_eq!(resources.path_of("limits_d"), None);
}

#[test]
fn purge_enables_recurse() {
    let params = Parameters { purge_limits_d_dir: true, ..Default::default() };
    let resources = build_resources(&params, ContentSource::resolve(&params), true);
    let dir = resources.directory().unwrap();
    assert!(dir.purge);
    assert!(dir.recurse);
}

#[test]
fn custom_paths_and_modes_flow_through() {
    let params = Parameters {
        config_file: "/testing".parse().unwrap(),
        config_file_mode: "0242".parse().unwrap(),
        limits_d_dir: "/testing.d".parse().unwrap(),
        limits_d_dir_mode: "0242".parse().unwrap(),
        ..Default::default()
    };
    let resources = build_resources(&params, ContentSource::resolve(&params), true);
    assert_eq!(resources.path_of("limits_conf").unwrap().as_str(), "/testing");
    assert_eq!(resources.path_of("limits_d").unwrap().as_str(), "/testing.d");
    assert_eq!(resources.file.mode.as_str(), "0242");
    assert_eq!(resources.directory().unwrap().mode.as_str(), "0242");
    assert_eq!(resources.directory_ensure().unwrap().name, "mkdir_p-/testing.d");
    assert_eq!(
        resources.directory().unwrap().require[1],
        Dependency::Exec("mkdir_p-/testing.d".to_owned())
    );
}

#[test]
fn resource_set_can_be_written_as_yaml() {
    let params = Parameters {
        config_file_source: Some("puppet:///pam/unit_tests.erb".to_owned()),
        ..Default::default()
    };
    let resources = build_resources(&params, ContentSource::resolve(&params), true);
    let yaml = resources.to_yaml_string().unwrap();
    assert!(yaml.contains("Package[pam]"));
    assert!(yaml.contains("Exec[mkdir_p-/etc/security/limits.d]"));
    assert!(yaml.contains("ensure: directory"));

    let mut buf = vec![];
    resources.write(&mut buf).unwrap();
    let parsed: ResourceSet = serde_yaml::from_slice(&buf).unwrap();
    assert_eq!(parsed, resources);
}

#[test]
fn resource_set_can_be_written_as_json() {
    let resources = build_default(false);
    let json = resources.to_json_string().unwrap();
    let parsed: ResourceSet = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, resources);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["file"]["mode"], "0640");
    assert_eq!(value["file"]["require"][0], "Package[pam]");
    assert!(value.get("fragments").is_none());
}

#[test]
fn resource_set_can_be_written_to_a_path() {
    let resources = build_default(true);
    let path = std::env::temp_dir().join(format!("pam_limits-{}.yml", std::process::id()));
    resources.write_to_path(&path).unwrap();
    let parsed: ResourceSet = serde_yaml::from_reader(fs::File::open(&path).unwrap()).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(parsed, resources);
}

#[test]
fn writing_to_a_missing_directory_reports_the_path() {
    let path = std::env::temp_dir()
        .join(format!("pam_limits-missing-{}", std::process::id()))
        .join("limits.yml");
    let err = build_default(true).write_to_path(&path).unwrap_err();
    match err.kind() {
        ErrorKind::WriteFile(p) => assert_eq!(p, &path),
        other => panic!("unexpected error: {:?}", other),
    }
}
