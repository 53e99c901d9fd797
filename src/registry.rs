//! Load-order-independent handoff of implementor payloads to the page registrar.
//!
//! Data files and the shared registrar can run in any order. Each data file calls
//! [`Registry::publish`]; the registrar calls [`Registry::install`] once it exists.
//! Whichever happens first, every payload reaches the registrar exactly once, and a
//! publish-then-install sequence leaves the registrar in the same state as
//! install-then-publish.

use crate::error::RegistryError;
use crate::types::Payload;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// The page registrar's acceptance operation.
///
/// Implementations merge the payload into their display model keyed by crate name
/// (last write wins) and re-render whatever changed. Accepting the same payload
/// twice must not duplicate entries.
///
/// `accept` runs while the registry lock is held, so it must not call back into the
/// registry it is installed in.
pub trait ImplementorSink: Send + Sync {
    fn accept(&self, payload: Payload);
}

/// What to do with payloads published before a registrar is installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StagingPolicy {
    /// Merge every staged payload per crate; nothing published is lost.
    #[default]
    Queue,
    /// Keep only the most recent staged payload, discarding earlier ones.
    LatestOnly,
}

/// Lifecycle of a registry: `Uninitialized` until a sink is installed, then `Ready`
/// for the rest of the process.
pub enum RegistryState {
    Uninitialized { pending: Option<Payload> },
    Ready { sink: Arc<dyn ImplementorSink> },
}

impl fmt::Debug for RegistryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized { pending } => f
                .debug_struct("Uninitialized")
                .field("pending_crates", &pending.as_ref().map_or(0, Payload::len))
                .finish(),
            Self::Ready { .. } => f.debug_struct("Ready").finish_non_exhaustive(),
        }
    }
}

/// Process-wide handoff point between data publishers and the page registrar.
#[derive(Debug)]
pub struct Registry {
    state: Mutex<RegistryState>,
    policy: StagingPolicy,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Default for Registry {
    fn default() -> Self {
        Self::new(StagingPolicy::default())
    }
}

impl Registry {
    /// Create a standalone registry in the `Uninitialized` state.
    pub fn new(policy: StagingPolicy) -> Self {
        Self {
            state: Mutex::new(RegistryState::Uninitialized { pending: None }),
            policy,
        }
    }

    /// The well-known process-wide registry, created with the default policy on first use.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::default)
    }

    /// Create the process-wide registry with `policy`.
    ///
    /// If the global registry already exists, it is returned unchanged and its
    /// original policy stays in effect.
    pub fn init_global(policy: StagingPolicy) -> &'static Self {
        let registry = GLOBAL.get_or_init(|| Self::new(policy));
        if registry.policy != policy {
            tracing::warn!(
                requested = ?policy,
                active = ?registry.policy,
                "Global registry already initialized; keeping existing staging policy"
            );
        }
        registry
    }

    pub fn policy(&self) -> StagingPolicy {
        self.policy
    }

    /// Deliver `payload` to the registrar, or stage it until one is installed.
    pub fn publish(&self, payload: Payload) {
        let mut state = self.lock();
        match &mut *state {
            RegistryState::Ready { sink } => {
                tracing::debug!(crates = payload.len(), "Delivering payload to registrar");
                sink.accept(payload);
            }
            RegistryState::Uninitialized { pending } => {
                let staged = match (pending.take(), self.policy) {
                    (None, _) => payload,
                    (Some(mut existing), StagingPolicy::Queue) => {
                        existing.merge(payload);
                        existing
                    }
                    (Some(discarded), StagingPolicy::LatestOnly) => {
                        tracing::warn!(
                            discarded_crates = discarded.len(),
                            "Overwriting staged payload that was never delivered"
                        );
                        payload
                    }
                };
                tracing::debug!(crates = staged.len(), "Staged payload until registrar is installed");
                *pending = Some(staged);
            }
        }
    }

    /// Install the registrar and hand it everything staged so far.
    ///
    /// An empty buffer is a no-op for the sink: `accept` is not called.
    pub fn install(&self, sink: Arc<dyn ImplementorSink>) -> Result<(), RegistryError> {
        let mut state = self.lock();
        let pending = match &mut *state {
            RegistryState::Ready { .. } => return Err(RegistryError::AlreadyInstalled),
            RegistryState::Uninitialized { pending } => pending.take(),
        };

        *state = RegistryState::Ready { sink: sink.clone() };

        match pending {
            Some(payload) => {
                tracing::info!(crates = payload.len(), "Registrar installed; draining staged payload");
                sink.accept(payload);
            }
            None => tracing::info!("Registrar installed; nothing staged"),
        }

        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), RegistryState::Ready { .. })
    }

    /// Number of crates currently staged and awaiting a registrar.
    pub fn pending_len(&self) -> usize {
        match &*self.lock() {
            RegistryState::Uninitialized { pending } => pending.as_ref().map_or(0, Payload::len),
            RegistryState::Ready { .. } => 0,
        }
    }

    // Every transition is applied in one assignment, so a poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
