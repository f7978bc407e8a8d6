//! Credential validation against the backend.
//!
//! DESIGN
//! ======
//! At most one validation per credential is in flight. Concurrent callers for
//! the same credential share one `Shared` future and therefore one backend
//! call. A request for a different credential replaces the slot; the older
//! attempt still resolves for whoever awaits it, and the session discards its
//! result as stale.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures never escape as raw errors: every outcome is either an
//! `Identity` or a `ValidationError` the session knows how to apply.

#[cfg(test)]
#[path = "session_validator_test.rs"]
mod session_validator_test;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use super::auth::{Credential, Identity};

/// Why a credential could not be turned into an identity.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The backend rejected the credential; it must be discarded.
    #[error("credential rejected by backend")]
    Unauthenticated,

    /// The backend could not be reached or gave no verdict; the credential is kept.
    #[error("session validation unavailable: {0}")]
    NetworkFailure(String),
}

impl ValidationError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }
}

/// Backend boundary for session operations.
pub trait AuthBackend {
    /// Exchange a credential for the identity it belongs to.
    fn validate(&self, credential: Credential) -> LocalBoxFuture<'static, Result<Identity, ValidationError>>;

    /// Invalidate a credential server-side.
    fn revoke(&self, credential: Credential) -> LocalBoxFuture<'static, Result<(), ValidationError>>;
}

type SharedOutcome = Shared<LocalBoxFuture<'static, Result<Identity, ValidationError>>>;

struct InFlight {
    attempt: u64,
    credential: Credential,
    outcome: SharedOutcome,
}

/// Coalescing front for an [`AuthBackend`].
#[derive(Clone)]
pub struct SessionValidator {
    backend: Rc<dyn AuthBackend>,
    inflight: Rc<RefCell<Option<InFlight>>>,
    next_attempt: Rc<Cell<u64>>,
}

impl SessionValidator {
    pub fn new(backend: Rc<dyn AuthBackend>) -> Self {
        Self { backend, inflight: Rc::new(RefCell::new(None)), next_attempt: Rc::new(Cell::new(0)) }
    }

    /// Validate `credential`, joining an in-flight attempt for the same credential.
    pub fn validate(&self, credential: Credential) -> impl Future<Output = Result<Identity, ValidationError>> + 'static {
        let (attempt, outcome) = self.join_or_start(&credential);
        let inflight = Rc::clone(&self.inflight);
        async move {
            let result = outcome.await;
            let mut slot = inflight.borrow_mut();
            if slot.as_ref().is_some_and(|current| current.attempt == attempt) {
                *slot = None;
            }
            result
        }
    }

    pub fn revoke(&self, credential: Credential) -> LocalBoxFuture<'static, Result<(), ValidationError>> {
        self.backend.revoke(credential)
    }

    /// Whether a validation is currently outstanding.
    pub fn in_flight(&self) -> bool {
        self.inflight.borrow().is_some()
    }

    fn join_or_start(&self, credential: &Credential) -> (u64, SharedOutcome) {
        let mut slot = self.inflight.borrow_mut();
        if let Some(current) = slot.as_ref().filter(|current| &current.credential == credential) {
            log::debug!("joining in-flight session validation #{}", current.attempt);
            return (current.attempt, current.outcome.clone());
        }
        let attempt = self.next_attempt.get();
        self.next_attempt.set(attempt + 1);
        let outcome = self.backend.validate(credential.clone()).shared();
        *slot = Some(InFlight { attempt, credential: credential.clone(), outcome: outcome.clone() });
        (attempt, outcome)
    }
}
