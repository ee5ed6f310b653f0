//! Validating parameters for, and rendering, `limits.conf`.

pub use self::absolute_path::AbsolutePath;
pub use self::content::{resolve_content, ContentSource, DEFAULT_LIMITS_CONF};
pub use self::facts::Facts;
pub use self::file_mode::FileMode;
pub use self::params::{Parameters, PARAMETER_NAMES};
pub use self::render::{render, render_for_host};
pub use self::resource::{
    build_resources, Dependency, DirectoryEnsure, Ensure, Fragments, ManagedDirectory,
    ManagedFile, ResourceSet, LIMITS_CONF_TITLE, LIMITS_D_TITLE, PAM_PACKAGE,
};
pub use self::validate::{
    validate_absolute_path, validate_boolean, validate_file_mode, validate_optional_array,
    validate_optional_string,
};

// Re-export errors here so that people can use them by including `use
// pam_limits::limits`.
pub use crate::errors::*;

#[macro_use]
mod string_serialize_deserialize;

mod absolute_path;
mod content;
mod facts;
mod file_mode;
mod params;
mod render;
mod resource;
mod validate;
