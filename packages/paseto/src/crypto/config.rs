//! Provider selection configuration

use super::capability::CryptoCapability;
use super::provider::EngineId;
use crate::error::{PasetoError, PasetoResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environment variable holding the engine preference, e.g. `ring,rustcrypto`
pub const ENGINES_ENV: &str = "CRYYPT_PASETO_ENGINES";
/// Environment variable holding per-capability overrides, e.g.
/// `v2.public.sign=ring,v2.public.verify=ring`
pub const OVERRIDES_ENV: &str = "CRYYPT_PASETO_OVERRIDES";

/// How the registry picks one provider per capability.
///
/// An override pins a capability to an engine. Otherwise candidates rank by
/// the position of their engine in `engines`; engines not listed rank after
/// every listed one. Two candidates sharing the best rank is an error, never
/// a coin toss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Engine names, most preferred first
    pub engines: Vec<String>,
    /// Capability → engine name
    pub overrides: BTreeMap<CryptoCapability, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            engines: vec![EngineId::RUST_CRYPTO.as_str().to_string()],
            overrides: BTreeMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Default configuration: RustCrypto first
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the engine preference
    #[must_use]
    pub fn with_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engines = engines.into_iter().map(Into::into).collect();
        self
    }

    /// Pin `capability` to `engine`
    #[must_use]
    pub fn with_override(mut self, capability: CryptoCapability, engine: impl Into<String>) -> Self {
        self.overrides.insert(capability, engine.into());
        self
    }

    /// Rank of `engine`; unlisted engines rank last
    #[must_use]
    pub fn rank(&self, engine: EngineId) -> usize {
        self.engines
            .iter()
            .position(|name| name == engine.as_str())
            .unwrap_or(usize::MAX)
    }

    /// Engine pinned for `capability`, if any
    #[must_use]
    pub fn pinned(&self, capability: &CryptoCapability) -> Option<&str> {
        self.overrides.get(capability).map(String::as_str)
    }

    /// Parse from JSON text
    ///
    /// # Errors
    ///
    /// [`PasetoError::Configuration`] for malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> PasetoResult<Self> {
        serde_json::from_str(json).map_err(|e| PasetoError::Configuration(e.to_string()))
    }

    /// Read [`ENGINES_ENV`] and [`OVERRIDES_ENV`]. Unset variables keep the
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`PasetoError::Configuration`] for malformed values.
    pub fn from_env() -> PasetoResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`RegistryConfig::from_env`], reading variables through `lookup`
    ///
    /// # Errors
    ///
    /// [`PasetoError::Configuration`] for malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PasetoResult<Self> {
        let mut config = Self::default();
        if let Some(engines) = lookup(ENGINES_ENV) {
            let engines: Vec<String> = split_list(&engines).map(str::to_string).collect();
            if engines.is_empty() {
                tracing::warn!(var = ENGINES_ENV, "empty engine preference");
                return Err(PasetoError::Configuration(format!("{ENGINES_ENV} is empty")));
            }
            config.engines = engines;
        }
        if let Some(overrides) = lookup(OVERRIDES_ENV) {
            for pair in split_list(&overrides) {
                let Some((capability, engine)) = pair.split_once('=') else {
                    tracing::warn!(var = OVERRIDES_ENV, pair, "malformed override");
                    return Err(PasetoError::Configuration(format!(
                        "{OVERRIDES_ENV}: expected capability=engine, got '{pair}'"
                    )));
                };
                let engine = engine.trim();
                if engine.is_empty() {
                    return Err(PasetoError::Configuration(format!(
                        "{OVERRIDES_ENV}: no engine for '{capability}'"
                    )));
                }
                config.overrides.insert(capability.parse()?, engine.to_string());
            }
        }
        Ok(config)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
