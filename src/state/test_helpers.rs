//! Scriptable backend and fixtures shared by session tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};

use super::auth::{Credential, Identity, Role};
use super::session::AuthSession;
use super::session_validator::{AuthBackend, ValidationError};
use super::token_store::{MemoryTokenStore, TokenStore};
use crate::config::RetryPolicy;

pub(crate) type Verdict = Result<Identity, ValidationError>;

enum Reply {
    Now(Verdict),
    Later(oneshot::Receiver<Verdict>),
}

/// Backend whose validation replies are queued per token.
///
/// Tokens without a queued reply are rejected as `Unauthenticated`.
#[derive(Default)]
pub(crate) struct FakeBackend {
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    validate_calls: RefCell<Vec<String>>,
    revoke_calls: RefCell<Vec<String>>,
    revoke_fails: Cell<bool>,
    pending_revokes: RefCell<VecDeque<oneshot::Receiver<Result<(), ValidationError>>>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn reply(&self, token: &str, verdict: Verdict) {
        self.queue(token, Reply::Now(verdict));
    }

    /// Queue a reply that resolves when the returned sender fires.
    pub(crate) fn reply_later(&self, token: &str) -> oneshot::Sender<Verdict> {
        let (tx, rx) = oneshot::channel();
        self.queue(token, Reply::Later(rx));
        tx
    }

    pub(crate) fn fail_revoke(&self) {
        self.revoke_fails.set(true);
    }

    /// Hold the next revoke open until the returned sender fires.
    pub(crate) fn revoke_later(&self) -> oneshot::Sender<Result<(), ValidationError>> {
        let (tx, rx) = oneshot::channel();
        self.pending_revokes.borrow_mut().push_back(rx);
        tx
    }

    pub(crate) fn validate_calls(&self) -> Vec<String> {
        self.validate_calls.borrow().clone()
    }

    pub(crate) fn revoke_calls(&self) -> Vec<String> {
        self.revoke_calls.borrow().clone()
    }

    fn queue(&self, token: &str, reply: Reply) {
        self.replies.borrow_mut().entry(token.to_owned()).or_default().push_back(reply);
    }
}

impl AuthBackend for FakeBackend {
    fn validate(&self, credential: Credential) -> LocalBoxFuture<'static, Verdict> {
        self.validate_calls.borrow_mut().push(credential.as_str().to_owned());
        let reply = self.replies.borrow_mut().get_mut(credential.as_str()).and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Now(verdict)) => future::ready(verdict).boxed_local(),
            Some(Reply::Later(rx)) => async move {
                rx.await.unwrap_or_else(|_| Err(ValidationError::NetworkFailure("reply dropped".to_owned())))
            }
            .boxed_local(),
            None => future::ready(Err(ValidationError::Unauthenticated)).boxed_local(),
        }
    }

    fn revoke(&self, credential: Credential) -> LocalBoxFuture<'static, Result<(), ValidationError>> {
        self.revoke_calls.borrow_mut().push(credential.as_str().to_owned());
        if let Some(rx) = self.pending_revokes.borrow_mut().pop_front() {
            return async move { rx.await.unwrap_or(Ok(())) }.boxed_local();
        }
        let outcome = if self.revoke_fails.get() {
            Err(ValidationError::NetworkFailure("connection refused".to_owned()))
        } else {
            Ok(())
        };
        future::ready(outcome).boxed_local()
    }
}

pub(crate) fn identity(username: &str, role: Role) -> Identity {
    Identity { username: username.to_owned(), role }
}

pub(crate) fn network_failure() -> Verdict {
    Err(ValidationError::NetworkFailure("offline".to_owned()))
}

pub(crate) fn store_with(token: Option<&str>) -> Rc<MemoryTokenStore> {
    Rc::new(token.map_or_else(MemoryTokenStore::default, |t| MemoryTokenStore::with_credential(Credential::new(t))))
}

pub(crate) fn session_with(store: &Rc<MemoryTokenStore>, backend: &Rc<FakeBackend>, retry: RetryPolicy) -> AuthSession {
    let store: Rc<dyn TokenStore> = store.clone();
    let backend: Rc<dyn AuthBackend> = backend.clone();
    AuthSession::new(store, backend, retry)
}
