//! Optimistic updates as a compensating-action pattern.
//!
//! A [`Transition`] is applied to local state before the remote call is
//! issued. If the remote call fails, the inverse transition is replayed so
//! local state matches what was there before.

use std::future::Future;

/// A reversible change to some piece of local state.
pub trait Transition<S> {
  fn apply(&self, state: &mut S);

  /// Undo [`Transition::apply`]. Must restore the pre-apply state.
  fn revert(&self, state: &mut S);
}

/// Apply `transition` to `state`, then run `remote` against the updated
/// state. On `Err` the transition is reverted before the error is returned.
///
/// `remote` receives the post-transition state so it can build the payload
/// to persist; the future it returns must not borrow that state.
pub async fn apply_optimistic<S, T, F, Fut, R, E>(
  state: &mut S,
  transition: &T,
  remote: F,
) -> Result<R, E>
where
  T: Transition<S>,
  F: FnOnce(&S) -> Fut,
  Fut: Future<Output = Result<R, E>>,
{
  transition.apply(state);
  let outcome = remote(state).await;
  if outcome.is_err() {
    transition.revert(state);
  }
  outcome
}
