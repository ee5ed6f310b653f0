//! Support for rendering `/etc/security/limits.conf` and its `limits.d`
//! fragment directory.
//!
//! We take a small set of untyped parameters, validate each of them
//! against a strict type, choose where the file's content comes from, and
//! describe the resources a convergence engine should manage.  We never
//! touch the filesystem of the host being configured.
//!
//! ```
//! use std::str::FromStr;
//! use pam_limits::limits as pl;
//!
//! let yaml = r#"---
//! config_file_lines:
//!   - "* soft nofile 2048"
//!   - "* hard nofile 8192"
//! purge_limits_d_dir: true
//! "#;
//!
//! let params = pl::Parameters::from_str(yaml).unwrap();
//! let resources = params.render(pl::Facts::new("RedHat", "7").supports_limits_fragments());
//!
//! assert_eq!(resources.file.path.as_str(), "/etc/security/limits.conf");
//! assert_eq!(resources.file.content.as_ref().unwrap(),
//!            "* soft nofile 2048\n* hard nofile 8192\n");
//!
//! let dir = resources.directory().unwrap();
//! assert!(dir.purge && dir.recurse);
//! assert_eq!(resources.directory_ensure().unwrap().name,
//!            "mkdir_p-/etc/security/limits.d");
//!
//! // Strings are not booleans.
//! assert!(pl::Parameters::from_str("purge_limits_d_dir: \"false\"").is_err());
//! ```

// Enable as many useful Rust and Clippy warnings as we can stand.
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    clippy::all
)]

#[macro_use]
extern crate error_chain;

pub mod errors;
pub mod limits;
