//! Octal file modes, as written in `chmod`-style configuration.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::errors::InvalidValueError;

/// A four-digit octal file mode such as `0640`.  We always keep modes as
/// strings, because an integer like `2770` has long since lost any
/// information about whether it was meant to be octal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileMode {
    mode: String,
}

impl FileMode {
    /// The mode as a string, exactly as it was given to us.
    pub fn as_str(&self) -> &str {
        &self.mode
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.mode)
    }
}

impl FromStr for FileMode {
    type Err = InvalidValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            // Special bits first, then owner, group and other.
            static ref MODE: Regex = Regex::new("^[012467][0-7]{3}$").unwrap();
        }
        if MODE.is_match(s) {
            Ok(FileMode { mode: s.to_owned() })
        } else {
            Err(InvalidValueError::new("file mode", s))
        }
    }
}

impl_serialize_to_string!(FileMode);
impl_deserialize_from_str!(FileMode);

#[test]
fn file_mode_accepts_four_octal_digits() {
    for s in &["0644", "0755", "0640", "0740", "0242", "1777", "2770", "4755", "6755", "7777"] {
        let mode = FileMode::from_str(s).unwrap();
        assert_eq!(mode.to_string(), *s);
    }
}

#[test]
fn file_mode_rejects_malformed_strings() {
    for s in &["0844", "755", "00644", "string", "", "3644", "5644", "8644", " 0644", "0644\n"] {
        assert!(FileMode::from_str(s).is_err(), "should reject {:?}", s);
    }
}

#[test]
fn file_mode_serializes_as_a_string() {
    let mode: FileMode = serde_json::from_str(r#""0750""#).unwrap();
    assert_eq!(mode.as_str(), "0750");
    assert_eq!(serde_json::to_string(&mode).unwrap(), r#""0750""#);
    assert!(serde_json::from_str::<FileMode>("750").is_err());
    assert!(serde_json::from_str::<FileMode>(r#""00644""#).is_err());
}
