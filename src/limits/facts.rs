//! Host facts which decide what we can manage.

use serde::{Deserialize, Serialize};

/// The facts we need about a host.  We don't discover these ourselves;
/// they are supplied by whoever asks us to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    /// Operating system family, e.g. `RedHat`, `Suse`, `Debian`, `Solaris`.
    pub os_family: String,
    /// Major release number, e.g. `7` or `10`.
    pub release_major: String,
}

impl Facts {
    /// Create a new set of facts.
    pub fn new<F, R>(os_family: F, release_major: R) -> Facts
    where
        F: Into<String>,
        R: Into<String>,
    {
        Facts {
            os_family: os_family.into(),
            release_major: release_major.into(),
        }
    }

    /// Does PAM on this host read drop-in files from `limits.d`?  Old Suse
    /// releases and Solaris don't.
    pub fn supports_limits_fragments(&self) -> bool {
        match (&self.os_family.to_lowercase()[..], &self.release_major[..]) {
            ("suse", "9") | ("suse", "10") => false,
            ("solaris", _) => false,
            _ => true,
        }
    }
}

#[test]
fn el7_supports_fragments() {
    assert!(Facts::new("RedHat", "7").supports_limits_fragments());
    assert!(Facts::new("RedHat", "5").supports_limits_fragments());
    assert!(Facts::new("Debian", "9").supports_limits_fragments());
}

#[test]
fn old_suse_and_solaris_do_not_support_fragments() {
    assert!(!Facts::new("Suse", "10").supports_limits_fragments());
    assert!(!Facts::new("Suse", "9").supports_limits_fragments());
    assert!(Facts::new("Suse", "11").supports_limits_fragments());
    assert!(!Facts::new("Solaris", "11").supports_limits_fragments());
}

#[test]
fn facts_can_be_read_from_yaml() {
    let yaml = r#"---
os_family: "Suse"
release_major: "10"
"#;
    let facts: Facts = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(facts, Facts::new("Suse", "10"));
    assert!(!facts.supports_limits_fragments());
}
