//! Injected provider detection.
//!
//! # Responsibilities
//! - Inspect the host environment once at startup (no polling)
//! - Prefer the wallet implementation named in configuration
//! - Fall back to any injected provider, surfacing an advisory

use crate::provider::types::ProviderHandle;

/// Wallet capabilities injected by the host environment.
#[derive(Clone, Default)]
pub struct HostEnvironment {
    injected: Vec<ProviderHandle>,
}

impl HostEnvironment {
    /// A host with nothing injected.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A host with a single injected provider.
    pub fn with_provider(provider: ProviderHandle) -> Self {
        Self {
            injected: vec![provider],
        }
    }

    /// Inject another provider (e.g. a second browser extension).
    pub fn inject(&mut self, provider: ProviderHandle) {
        self.injected.push(provider);
    }

    pub fn injected(&self) -> &[ProviderHandle] {
        &self.injected
    }
}

impl std::fmt::Debug for HostEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.injected.iter().map(|p| p.identity().name).collect();
        f.debug_struct("HostEnvironment")
            .field("injected", &names)
            .finish()
    }
}

/// Non-fatal recommendation surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub title: String,
    pub message: String,
}

/// Outcome of provider detection.
#[derive(Clone)]
pub struct Located {
    pub provider: Option<ProviderHandle>,
    pub advisory: Option<Advisory>,
}

impl Located {
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }
}

/// Selects the provider the session will use.
#[derive(Debug, Clone)]
pub struct ProviderLocator {
    preferred: String,
}

impl ProviderLocator {
    pub fn new(preferred: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
        }
    }

    pub fn preferred(&self) -> &str {
        &self.preferred
    }

    pub fn locate(&self, env: &HostEnvironment) -> Located {
        let injected = env.injected();

        if let Some(provider) = injected
            .iter()
            .find(|p| p.identity().identifies_as(&self.preferred))
        {
            tracing::info!(wallet = %self.preferred, "Preferred wallet provider detected");
            return Located {
                provider: Some(provider.clone()),
                advisory: None,
            };
        }

        match injected.first() {
            Some(provider) => {
                let name = provider.identity().name;
                tracing::warn!(
                    wallet = %name,
                    injected = injected.len(),
                    preferred = %self.preferred,
                    "Using non-preferred wallet provider"
                );
                Located {
                    provider: Some(provider.clone()),
                    advisory: Some(Advisory {
                        title: "Multiple Wallets Detected".to_string(),
                        message: format!("Please use {} for the best experience", self.preferred),
                    }),
                }
            }
            None => {
                tracing::warn!("No wallet provider injected; wallet actions are unavailable");
                Located {
                    provider: None,
                    advisory: None,
                }
            }
        }
    }
}
