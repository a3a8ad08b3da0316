//! Controller configuration.
//!
//! Values are layered: built-in defaults, then an optional configuration
//! file, then `ARBOR_*` environment variables.

use crate::{LogFormat, SetupError};
use arbor_auth::GrantSet;
use arbor_core::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the header carrying in-memory listing warnings.
pub const DEFAULT_PERFORMANCE_HEADER: &str = "X-Arbor-Performance";

/// Configuration for a [`crate::Controller`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Prefix under which the tree is mounted, e.g. `/api`.
    pub base_path: String,
    /// Let `PATCH` introduce fields the current representation lacks.
    pub permissive_merge: bool,
    /// Methods granted when no authorizer is registered.
    pub default_methods: Vec<Method>,
    /// Header carrying warnings about listing work done in memory.
    pub performance_header: String,
    /// Upper bound for the `limit` listing parameter.
    pub max_limit: Option<usize>,
    /// Log level.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            permissive_merge: false,
            default_methods: Method::ALL.to_vec(),
            performance_header: DEFAULT_PERFORMANCE_HEADER.to_string(),
            max_limit: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from an optional file, overridden by `ARBOR_*`
    /// environment variables (`ARBOR_BASE_PATH`, `ARBOR_DEFAULT_METHODS=GET,HEAD`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] if a source cannot be read or a value
    /// has the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self, SetupError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("ARBOR")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("default_methods"),
            )
            .build()?;
        let mut loaded: Self = settings.try_deserialize()?;
        loaded.base_path = normalize_base_path(&loaded.base_path);
        Ok(loaded)
    }

    /// Set the mount prefix.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl AsRef<str>) -> Self {
        self.base_path = normalize_base_path(base_path.as_ref());
        self
    }

    /// Allow `PATCH` to introduce new fields.
    #[must_use]
    pub fn with_permissive_merge(mut self, permissive: bool) -> Self {
        self.permissive_merge = permissive;
        self
    }

    /// Methods granted when no authorizer is registered.
    #[must_use]
    pub fn with_default_methods(mut self, methods: &[Method]) -> Self {
        self.default_methods = methods.to_vec();
        self
    }

    /// Cap the listing `limit` parameter.
    #[must_use]
    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = Some(max_limit);
        self
    }

    /// Default methods as a grant set.
    pub fn default_grants(&self) -> GrantSet {
        self.default_methods.iter().copied().collect()
    }

    /// Absolute URI for a tree path.
    pub fn href(&self, tree_path: &str) -> String {
        format!("{}{}", self.base_path, tree_path)
    }

    /// Tree path for a request path, or `None` if the request lies outside
    /// the mount prefix.
    pub fn tree_path<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        if self.base_path.is_empty() {
            return Some(request_path);
        }
        let rest = request_path.strip_prefix(&self.base_path)?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
