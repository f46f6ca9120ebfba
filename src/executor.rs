//! The event-loop/executor handle carried in a [`ProviderContext`](crate::context::ProviderContext).
//!
//! Spec §5 requires that every `get_credential` future resolve on the *caller-provided*
//! executor, hopping back to it if internal work happened elsewhere. We model the executor as a
//! `tokio::runtime::Handle` and implement the hop by spawning the continuation onto it.

use std::future::Future;

/// A handle to the runtime a provider's continuations should resolve on.
pub type Executor = tokio::runtime::Handle;

/// Run `fut` to completion on `executor`, regardless of which runtime polls the returned future.
///
/// This is the mechanism behind the spec's "hop to executor" requirement: callers on different
/// runtimes who `.await` the returned future all observe the continuation having run on
/// `executor`'s workers.
pub async fn hop<F>(executor: &Executor, fut: F) -> F::Output
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    executor
        .spawn(fut)
        .await
        .expect("provider task panicked during executor hop")
}
