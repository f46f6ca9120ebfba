//! The provider context (spec §3): everything a provider needs at construction time, with a
//! lifetime equal to the lifetime of the top-level client. Providers never reach for a
//! process-wide singleton instead of this context.

use crate::executor::Executor;
use crate::http_client::HttpClient;
use std::sync::Arc;

/// Target passed to `log`'s macros so a consumer can filter credential-provider log lines
/// independently of the rest of their application, without this crate owning a logger instance.
pub const LOG_TARGET: &str = "aws_credential_core";

/// Context passed to every provider at construction time.
///
/// Carries the HTTP client handle, the executor used to schedule refreshes, and the log target
/// providers should log under. Cloning a `ProviderContext` is cheap: the HTTP client is reference
/// counted and the executor is itself a handle.
#[derive(Clone)]
pub struct ProviderContext {
    http_client: Arc<dyn HttpClient>,
    executor: Executor,
    log_target: &'static str,
}

impl ProviderContext {
    /// Build a context from an HTTP client handle and an executor handle.
    pub fn new(http_client: Arc<dyn HttpClient>, executor: Executor) -> Self {
        ProviderContext {
            http_client,
            executor,
            log_target: LOG_TARGET,
        }
    }

    /// Override the log target used by providers built from this context.
    pub fn with_log_target(mut self, target: &'static str) -> Self {
        self.log_target = target;
        self
    }

    /// The HTTP client collaborator.
    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    /// The executor continuations should be scheduled on.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// The log target providers built from this context should log under.
    pub fn log_target(&self) -> &'static str {
        self.log_target
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("log_target", &self.log_target)
            .finish_non_exhaustive()
    }
}
