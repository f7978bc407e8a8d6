//! The application's authentication session.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AuthSession` is built per application instance (see `app::App`) and
//! handed to the route guard and the API client. It is the only writer of the
//! identity; everything else reads `AuthState` snapshots.
//!
//! ORDERING
//! ========
//! Validation results are applied only if the credential that was current
//! when validation started is still current when it resolves. A login or
//! logout in between makes the result stale and it is dropped.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::Rc;

use super::auth::{AuthState, Credential, Identity, LoginInput, Role};
use super::session_validator::{AuthBackend, SessionValidator, ValidationError};
use super::token_store::TokenStore;
use crate::config::RetryPolicy;
use crate::util::timer;

type Listener = Rc<dyn Fn(&AuthState)>;

/// Options for [`AuthSession::logout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogoutOptions {
    /// Ask the backend to invalidate the credential before clearing it locally.
    pub revoke: bool,
}

impl Default for LogoutOptions {
    fn default() -> Self {
        Self { revoke: true }
    }
}

struct Inner {
    store: Rc<dyn TokenStore>,
    validator: SessionValidator,
    retry: RetryPolicy,
    state: RefCell<AuthState>,
    listeners: RefCell<Vec<Listener>>,
}

/// Shared handle to the session; clones refer to the same state.
#[derive(Clone)]
pub struct AuthSession {
    inner: Rc<Inner>,
}

impl AuthSession {
    /// Build a session over `store`. The stored credential, if any, is loaded
    /// but not yet validated; call [`AuthSession::bootstrap`] to settle it.
    pub fn new(store: Rc<dyn TokenStore>, backend: Rc<dyn AuthBackend>, retry: RetryPolicy) -> Self {
        let state = AuthState { credential: store.read(), identity: None, bootstrapped: false };
        Self {
            inner: Rc::new(Inner {
                store,
                validator: SessionValidator::new(backend),
                retry,
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner.state.borrow().credential.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading()
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.inner.state.borrow().has_role(roles)
    }

    pub fn auth_headers(&self) -> Vec<(String, String)> {
        self.inner.state.borrow().auth_headers()
    }

    /// Register a listener called with the new snapshot after every change.
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Determine the initial authentication status.
    ///
    /// With a stored credential this validates it right away; without one the
    /// session settles as logged out and the backend is never contacted.
    pub async fn bootstrap(&self) {
        self.revalidate().await;
    }

    /// Validate the current credential again, e.g. after a network failure.
    pub async fn revalidate(&self) {
        match self.credential() {
            Some(credential) => self.validate_current(credential).await,
            None => self.update(|state| {
                state.identity = None;
                state.bootstrapped = true;
            }),
        }
    }

    pub async fn login(&self, input: LoginInput) {
        match input {
            LoginInput::KnownIdentity(credential, identity) => {
                self.inner.store.write(&credential);
                log::info!("signed in as {} ({})", identity.username, identity.role);
                self.update(|state| {
                    state.credential = Some(credential);
                    state.identity = Some(identity);
                    state.bootstrapped = true;
                });
            }
            LoginInput::UnknownIdentity(credential) => {
                self.inner.store.write(&credential);
                self.update(|state| {
                    state.credential = Some(credential.clone());
                    state.identity = None;
                    state.bootstrapped = false;
                });
                self.validate_current(credential).await;
            }
        }
    }

    /// End the session. Local state is cleared whatever the revoke
    /// call does; with `revoke: false` this completes without suspending.
    ///
    /// A login that lands while the revoke is pending owns the session from
    /// then on, so only the credential being revoked is cleared.
    pub async fn logout(&self, options: LogoutOptions) {
        let Some(credential) = self.credential() else {
            self.clear_local();
            return;
        };
        if options.revoke {
            if let Err(e) = self.inner.validator.revoke(credential.clone()).await {
                log::warn!("logout revoke failed, clearing locally anyway: {e}");
            }
            if !self.is_current(&credential) {
                log::debug!("session replaced during logout; keeping the new credential");
                return;
            }
        }
        self.clear_local();
    }

    fn clear_local(&self) {
        self.inner.store.clear();
        self.update(|state| {
            state.credential = None;
            state.identity = None;
            state.bootstrapped = true;
        });
    }

    fn is_current(&self, credential: &Credential) -> bool {
        self.inner.state.borrow().credential.as_ref() == Some(credential)
    }

    async fn validate_current(&self, credential: Credential) {
        let mut attempt = 0;
        loop {
            let outcome = self.inner.validator.validate(credential.clone()).await;
            if !self.is_current(&credential) {
                log::debug!("discarding stale session validation result");
                return;
            }
            let network_failure = outcome.as_ref().is_err_and(ValidationError::is_network);
            self.apply(outcome);
            if !network_failure {
                return;
            }
            let Some(delay) = self.inner.retry.delay_for(attempt) else {
                return;
            };
            attempt += 1;
            log::info!("retrying session validation in {}ms (attempt {attempt})", delay.as_millis());
            timer::sleep(delay).await;
            if !self.is_current(&credential) {
                return;
            }
        }
    }

    fn apply(&self, outcome: Result<Identity, ValidationError>) {
        match outcome {
            Ok(identity) => {
                log::debug!("session validated for {} ({})", identity.username, identity.role);
                self.update(|state| {
                    state.identity = Some(identity);
                    state.bootstrapped = true;
                });
            }
            Err(ValidationError::Unauthenticated) => {
                log::info!("stored credential rejected; signing out");
                self.inner.store.clear();
                self.update(|state| {
                    state.credential = None;
                    state.identity = None;
                    state.bootstrapped = true;
                });
            }
            Err(ValidationError::NetworkFailure(reason)) => {
                log::warn!("session validation failed, keeping credential: {reason}");
                self.update(|state| {
                    state.identity = None;
                    state.bootstrapped = true;
                });
            }
        }
    }

    fn update(&self, mutate: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            mutate(&mut state);
            debug_assert!(state.identity.is_none() || state.credential.is_some());
            state.clone()
        };
        let listeners = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
