//! Process-wide capability → provider registry
//!
//! Candidates are collected from a static list (plus anything registered
//! explicitly), one provider per capability is selected according to a
//! [`RegistryConfig`], the engines of the selected providers are initialized,
//! and the result is published read-only.

use super::capability::{CryptoCapability, Version};
use super::catalog::builtin_providers;
use super::config::RegistryConfig;
use super::key::{KeyMaterial, KeySupplier};
use super::provider::{CryptoOutput, CryptoProvider, CryptoRequest, EngineId};
use crate::claims::FooterClaims;
use crate::error::{PasetoError, PasetoResult};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zeroize::Zeroizing;

static GLOBAL: OnceCell<ProviderRegistry> = OnceCell::new();
static DISCOVERY_PASSES: AtomicUsize = AtomicUsize::new(0);

/// Read-only mapping from capability to its selected provider
pub struct ProviderRegistry {
    providers: HashMap<CryptoCapability, Arc<dyn CryptoProvider>>,
    engines: Vec<EngineId>,
}

/// Collects candidate providers and selects one per capability
#[derive(Default)]
pub struct RegistryBuilder {
    candidates: Vec<Arc<dyn CryptoProvider>>,
    config: RegistryConfig,
}

impl RegistryBuilder {
    /// Builder with no candidates and the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every provider compiled into the crate
    #[must_use]
    pub fn with_builtin_providers(mut self) -> Self {
        self.candidates.extend(builtin_providers());
        self
    }

    /// Add a candidate provider
    #[must_use]
    pub fn register(mut self, provider: Arc<dyn CryptoProvider>) -> Self {
        self.candidates.push(provider);
        self
    }

    /// Selection configuration
    #[must_use]
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Select providers, initialize their engines and publish the registry
    ///
    /// # Errors
    ///
    /// - [`PasetoError::UnknownEngine`] when an override names an engine no
    ///   candidate runs on
    /// - [`PasetoError::Configuration`] when an override names an engine that
    ///   does not provide the capability
    /// - [`PasetoError::AmbiguousProvider`] when the selection is not unique
    /// - [`PasetoError::EngineInitialization`] when an engine fails setup
    pub fn build(self) -> PasetoResult<ProviderRegistry> {
        let Self { candidates, config } = self;

        let mut by_capability: BTreeMap<CryptoCapability, Vec<Arc<dyn CryptoProvider>>> =
            BTreeMap::new();
        for candidate in candidates {
            let capability = candidate.capability();
            tracing::debug!(%capability, engine = %candidate.engine().id(), "discovered crypto provider");
            by_capability.entry(capability).or_default().push(candidate);
        }

        for (capability, engine) in &config.overrides {
            let known = by_capability
                .values()
                .flatten()
                .any(|p| p.engine().id().as_str() == engine);
            if !known {
                tracing::warn!(
                    %capability,
                    engine = engine.as_str(),
                    "override names an unknown engine"
                );
                return Err(PasetoError::UnknownEngine(engine.clone()));
            }
            let provides = by_capability
                .get(capability)
                .is_some_and(|ps| ps.iter().any(|p| p.engine().id().as_str() == engine));
            if !provides {
                tracing::warn!(
                    %capability,
                    engine = engine.as_str(),
                    "override names an engine without this capability"
                );
                return Err(PasetoError::Configuration(format!(
                    "{capability} is pinned to engine '{engine}', which does not provide it"
                )));
            }
        }

        let mut selected = BTreeMap::new();
        for (capability, candidates) in by_capability {
            let provider = select(&config, capability, candidates)?;
            tracing::debug!(%capability, engine = %provider.engine().id(), "selected crypto provider");
            selected.insert(capability, provider);
        }

        let mut engines: Vec<EngineId> = Vec::new();
        for provider in selected.values() {
            let engine = provider.engine();
            if !engines.contains(&engine.id()) {
                engine.initialize()?;
                engines.push(engine.id());
            }
        }

        Ok(ProviderRegistry {
            providers: selected.into_iter().collect(),
            engines,
        })
    }
}

#[derive(Clone, Copy)]
enum Rank<'a> {
    Pinned(&'a str),
    Preferred(usize),
}

/// Pick the single provider for `capability`
fn select(
    config: &RegistryConfig,
    capability: CryptoCapability,
    candidates: Vec<Arc<dyn CryptoProvider>>,
) -> PasetoResult<Arc<dyn CryptoProvider>> {
    let top = match config.pinned(&capability) {
        Some(engine) => Rank::Pinned(engine),
        None => Rank::Preferred(
            candidates
                .iter()
                .map(|p| config.rank(p.engine().id()))
                .min()
                .unwrap_or(usize::MAX),
        ),
    };
    let (mut best, rejected): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|p| match top {
            Rank::Pinned(engine) => p.engine().id().as_str() == engine,
            Rank::Preferred(rank) => config.rank(p.engine().id()) == rank,
        });
    for provider in &rejected {
        tracing::debug!(%capability, engine = %provider.engine().id(), "rejected crypto provider");
    }
    match best.len() {
        1 => best.pop().ok_or(PasetoError::ProviderNotAvailable(capability)),
        0 => Err(PasetoError::ProviderNotAvailable(capability)),
        _ => {
            let engines = best
                .iter()
                .map(|p| p.engine().id().to_string())
                .collect::<Vec<_>>();
            tracing::warn!(%capability, ?engines, "ambiguous crypto providers");
            Err(PasetoError::AmbiguousProvider {
                capability,
                engines,
            })
        }
    }
}

impl ProviderRegistry {
    /// Empty builder
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry of the built-in providers selected by `config`
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::build`].
    pub fn from_config(config: &RegistryConfig) -> PasetoResult<Self> {
        RegistryBuilder::new()
            .with_builtin_providers()
            .config(config.clone())
            .build()
    }

    /// The process-wide registry, configured from the environment on first
    /// use. Concurrent first callers block until the single discovery pass
    /// completes.
    ///
    /// # Errors
    ///
    /// Configuration or build errors of the discovery pass. A failed pass is
    /// retried by the next caller.
    pub fn global() -> PasetoResult<&'static ProviderRegistry> {
        GLOBAL.get_or_try_init(|| {
            DISCOVERY_PASSES.fetch_add(1, Ordering::AcqRel);
            let config = RegistryConfig::from_env()?;
            tracing::debug!(?config, "initializing global crypto provider registry");
            Self::from_config(&config)
        })
    }

    /// Publish the process-wide registry with an explicit configuration
    ///
    /// # Errors
    ///
    /// [`PasetoError::AlreadyInitialized`] when the global registry exists
    /// already, otherwise see [`RegistryBuilder::build`].
    pub fn install(config: RegistryConfig) -> PasetoResult<&'static ProviderRegistry> {
        let mut installed = false;
        let registry = GLOBAL.get_or_try_init(|| {
            installed = true;
            DISCOVERY_PASSES.fetch_add(1, Ordering::AcqRel);
            Self::from_config(&config)
        })?;
        if installed {
            Ok(registry)
        } else {
            Err(PasetoError::AlreadyInitialized)
        }
    }

    /// Number of discovery passes the global registry went through
    pub fn discovery_passes() -> usize {
        DISCOVERY_PASSES.load(Ordering::Acquire)
    }

    /// Provider selected for `capability`
    ///
    /// # Errors
    ///
    /// [`PasetoError::ProviderNotAvailable`] when nothing serves it.
    pub fn resolve(&self, capability: &CryptoCapability) -> PasetoResult<&Arc<dyn CryptoProvider>> {
        self.providers
            .get(capability)
            .ok_or(PasetoError::ProviderNotAvailable(*capability))
    }

    /// True when `capability` has a provider
    #[must_use]
    pub fn contains(&self, capability: &CryptoCapability) -> bool {
        self.providers.contains_key(capability)
    }

    /// Engine serving `capability`
    ///
    /// # Errors
    ///
    /// [`PasetoError::ProviderNotAvailable`] when nothing serves it.
    pub fn engine_for(&self, capability: &CryptoCapability) -> PasetoResult<EngineId> {
        self.resolve(capability).map(|p| p.engine().id())
    }

    /// Served capabilities, sorted
    #[must_use]
    pub fn capabilities(&self) -> Vec<CryptoCapability> {
        let mut capabilities: Vec<_> = self.providers.keys().copied().collect();
        capabilities.sort();
        capabilities
    }

    /// Engines initialized for this registry
    #[must_use]
    pub fn engines(&self) -> &[EngineId] {
        &self.engines
    }

    /// Number of served capabilities
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// True when nothing is served
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run `request` on the provider for `capability`
    ///
    /// # Errors
    ///
    /// [`PasetoError::ProviderNotAvailable`], or whatever the provider reports.
    pub fn execute(
        &self,
        capability: CryptoCapability,
        key: &KeyMaterial,
        request: CryptoRequest<'_>,
    ) -> PasetoResult<CryptoOutput> {
        self.resolve(&capability)?.execute(key, request)
    }

    /// Like [`ProviderRegistry::execute`], taking the key from `supplier`
    ///
    /// # Errors
    ///
    /// [`PasetoError::ProviderNotAvailable`], supplier errors, or whatever the
    /// provider reports.
    pub fn perform(
        &self,
        capability: CryptoCapability,
        supplier: &dyn KeySupplier,
        footer: &FooterClaims,
        request: CryptoRequest<'_>,
    ) -> PasetoResult<CryptoOutput> {
        let provider = self.resolve(&capability)?;
        let key = supplier.key_for(&capability, footer)?;
        provider.execute(&key, request)
    }

    /// Sign an assembled message
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::execute`].
    pub fn sign(&self, version: Version, key: &KeyMaterial, message: &[u8]) -> PasetoResult<Vec<u8>> {
        let capability = CryptoCapability::public_sign(version);
        match self.execute(capability, key, CryptoRequest::Sign { message })? {
            CryptoOutput::Signature(signature) => Ok(signature),
            _ => Err(PasetoError::UnexpectedOutput(capability)),
        }
    }

    /// Verify a signature over an assembled message
    ///
    /// # Errors
    ///
    /// [`PasetoError::AuthenticationFailed`] for a bad signature, otherwise
    /// see [`ProviderRegistry::execute`].
    pub fn verify(
        &self,
        version: Version,
        key: &KeyMaterial,
        message: &[u8],
        signature: &[u8],
    ) -> PasetoResult<()> {
        let capability = CryptoCapability::public_verify(version);
        match self.execute(capability, key, CryptoRequest::Verify { message, signature })? {
            CryptoOutput::Verified => Ok(()),
            // anything but an explicit success fails closed
            _ => Err(PasetoError::AuthenticationFailed),
        }
    }

    /// Encrypt and authenticate
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::execute`].
    pub fn encrypt(
        &self,
        version: Version,
        key: &KeyMaterial,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> PasetoResult<Vec<u8>> {
        let capability = CryptoCapability::local_encrypt(version);
        let request = CryptoRequest::Encrypt {
            nonce,
            aad,
            plaintext,
        };
        match self.execute(capability, key, request)? {
            CryptoOutput::Ciphertext(ciphertext) => Ok(ciphertext),
            _ => Err(PasetoError::UnexpectedOutput(capability)),
        }
    }

    /// Authenticate and decrypt
    ///
    /// # Errors
    ///
    /// [`PasetoError::AuthenticationFailed`] when authentication fails,
    /// otherwise see [`ProviderRegistry::execute`].
    pub fn decrypt(
        &self,
        version: Version,
        key: &KeyMaterial,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> PasetoResult<Zeroizing<Vec<u8>>> {
        let capability = CryptoCapability::local_decrypt(version);
        let request = CryptoRequest::Decrypt {
            nonce,
            aad,
            ciphertext,
        };
        match self.execute(capability, key, request)? {
            CryptoOutput::Plaintext(plaintext) => Ok(plaintext),
            _ => Err(PasetoError::AuthenticationFailed),
        }
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for capability in self.capabilities() {
            if let Some(provider) = self.providers.get(&capability) {
                map.entry(&capability.to_string(), &provider.engine().id().as_str());
            }
        }
        map.finish()
    }
}
