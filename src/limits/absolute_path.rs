//! Absolute Unix paths.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::InvalidValueError;

/// An absolute path on the target host, such as `/etc/security/limits.conf`
/// or `/etc/security/limits.d/`.  Trailing slashes are preserved.  This
/// names a path on the host being configured, not on the local machine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbsolutePath {
    path: String,
}

impl AbsolutePath {
    /// The path as a string.
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl AsRef<Path> for AbsolutePath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.path)
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.path)
    }
}

impl FromStr for AbsolutePath {
    type Err = InvalidValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            // A leading slash, then non-empty components which may be
            // followed by any number of slashes.
            static ref UNIX_PATH: Regex = Regex::new(r"^/([^/\x00]+/*)*$").unwrap();
        }
        if UNIX_PATH.is_match(s) {
            Ok(AbsolutePath { path: s.to_owned() })
        } else {
            Err(InvalidValueError::new("absolute path", s))
        }
    }
}

impl_serialize_to_string!(AbsolutePath);
impl_deserialize_from_str!(AbsolutePath);

#[test]
fn absolute_path_accepts_files_and_directories() {
    for s in &["/", "/absolute/filepath", "/absolute/directory/", "/testing.d", "/a//b"] {
        let path = AbsolutePath::from_str(s).unwrap();
        assert_eq!(path.as_str(), *s);
    }
}

#[test]
fn absolute_path_rejects_relative_paths() {
    for s in &["../invalid", "relative", "", "//", "/nul\0byte"] {
        assert!(AbsolutePath::from_str(s).is_err(), "should reject {:?}", s);
    }
}

#[test]
fn absolute_path_is_usable_as_a_path() {
    let path = AbsolutePath::from_str("/etc/security/limits.d").unwrap();
    let as_path: &Path = path.as_ref();
    assert_eq!(as_path.file_name().unwrap(), "limits.d");
}
