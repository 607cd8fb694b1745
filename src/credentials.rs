//! API key resolution.
//!
//! The generation key is looked up through an ordered list of
//! [`CredentialSource`]s. The first source yielding a non-blank value wins;
//! values from different sources are never merged. The default chain is:
//!
//! 1. the secrets file (TOML; top level, then the `[gcp]` table)
//! 2. the process environment
//! 3. a plaintext key file
//!
//! Resolution runs on every request and re-reads every source. Key values
//! are never logged; only the name of the source that produced one is.

use std::path::PathBuf;

use crate::config::CredentialsConfig;

/// A place an API key may come from.
pub trait CredentialSource: Send + Sync {
    /// Short label for logs, e.g. `"env"`.
    fn name(&self) -> &str;
    /// The key, if this source has one.
    fn try_resolve(&self) -> Option<String>;
}

/// Table in the secrets file searched after the top level.
pub const SECRETS_SECTION: &str = "gcp";

/// TOML secrets file.
///
/// The key is looked up at the top level first, then under
/// `[gcp]`. The file is read on every lookup, so edits take effect
/// without a restart. A missing or malformed file resolves to nothing and
/// the chain moves on to the next source.
pub struct SecretsSource {
    key_name: String,
    path: PathBuf,
}

impl SecretsSource {
    pub fn new(key_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key_name: key_name.into(),
            path: path.into(),
        }
    }

    fn read_table(&self) -> Option<toml::Table> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match content.parse::<toml::Table>() {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unparseable secrets file"
                );
                None
            }
        }
    }
}

impl CredentialSource for SecretsSource {
    fn name(&self) -> &str {
        "secrets"
    }
    fn try_resolve(&self) -> Option<String> {
        let table = self.read_table()?;
        let value = table.get(&self.key_name).or_else(|| {
            table
                .get(SECRETS_SECTION)
                .and_then(|section| section.get(&self.key_name))
        })?;
        value.as_str().map(str::to_string)
    }
}

/// Process environment variable.
pub struct EnvSource {
    var: String,
}

impl EnvSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }
    fn try_resolve(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// Plaintext file holding only the key.
pub struct KeyFileSource {
    path: PathBuf,
}

impl KeyFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for KeyFileSource {
    fn name(&self) -> &str {
        "key-file"
    }
    fn try_resolve(&self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
    }
}

/// Fixed value, for tests and embedding callers that already hold a key.
pub struct StaticSource {
    name: String,
    value: Option<String>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

impl CredentialSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }
    fn try_resolve(&self) -> Option<String> {
        self.value.clone()
    }
}

/// Ordered, first-match-wins list of sources.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Secrets file, then environment, then key file.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new()
            .with_source(SecretsSource::new(
                config.key_name.clone(),
                config.secrets_file.clone(),
            ))
            .with_source(EnvSource::new(config.key_name.clone()))
            .with_source(KeyFileSource::new(config.key_file.clone()))
    }

    pub fn resolve(&self) -> Option<String> {
        for source in &self.sources {
            if let Some(value) = source.try_resolve() {
                let value = value.trim();
                if !value.is_empty() {
                    tracing::debug!(source = source.name(), "resolved API key");
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}
