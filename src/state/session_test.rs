use std::cell::RefCell;

use futures::FutureExt;

use super::*;
use crate::state::test_helpers::{FakeBackend, identity, network_failure, session_with, store_with};

// =============================================================
// Bootstrap
// =============================================================

#[tokio::test]
async fn expired_stored_token_is_cleared_on_bootstrap() {
    let store = store_with(Some("tok-expired"));
    let backend = FakeBackend::new();
    backend.reply("tok-expired", Err(ValidationError::Unauthenticated));
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    session.bootstrap().await;

    assert!(!session.is_authenticated());
    assert!(!session.loading());
    assert_eq!(store.read(), None);
    assert_eq!(session.credential(), None);
}

#[tokio::test]
async fn valid_stored_token_restores_identity() {
    let store = store_with(Some("tok-valid"));
    let backend = FakeBackend::new();
    backend.reply("tok-valid", Ok(identity("alice", Role::Teller)));
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    session.bootstrap().await;

    assert!(session.is_authenticated());
    assert!(session.has_role(&[Role::Teller]));
    assert!(!session.has_role(&[Role::Admin]));
    assert_eq!(session.identity().map(|i| i.username), Some("alice".to_owned()));
}

#[tokio::test]
async fn missing_token_settles_without_backend_call() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    assert!(session.loading());

    session.bootstrap().await;

    assert!(!session.loading());
    assert!(!session.is_authenticated());
    assert!(backend.validate_calls().is_empty());
}

#[tokio::test]
async fn loading_until_validation_settles() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    let reply = backend.reply_later("tok");
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    let settle = async {
        assert!(session.loading());
        assert_eq!(session.credential(), Some(Credential::new("tok")));
        let _ = reply.send(Ok(identity("carol", Role::Customer)));
    };
    tokio::join!(session.bootstrap(), settle);

    assert!(!session.loading());
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn network_failure_keeps_credential_and_clears_identity() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    backend.reply("tok", network_failure());
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    session.bootstrap().await;

    assert!(!session.loading());
    assert!(!session.is_authenticated());
    assert_eq!(session.identity(), None);
    assert_eq!(session.credential(), Some(Credential::new("tok")));
    assert_eq!(store.read(), Some(Credential::new("tok")));
    assert_eq!(backend.validate_calls().len(), 1);
}

#[tokio::test]
async fn revalidate_recovers_after_network_failure() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    backend.reply("tok", network_failure());
    backend.reply("tok", Ok(identity("dave", Role::Manager)));
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    session.bootstrap().await;
    assert!(!session.is_authenticated());
    session.revalidate().await;

    assert!(session.is_authenticated());
    assert!(session.has_role(&[Role::Manager]));
}

#[tokio::test]
async fn backoff_policy_retries_network_failures() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    backend.reply("tok", network_failure());
    backend.reply("tok", network_failure());
    backend.reply("tok", Ok(identity("erin", Role::Admin)));
    let retry = RetryPolicy::Backoff { max_attempts: 2, initial_delay_ms: 1, max_delay_ms: 2 };
    let session = session_with(&store, &backend, retry);

    session.bootstrap().await;

    assert!(session.is_authenticated());
    assert_eq!(backend.validate_calls().len(), 3);
}

#[tokio::test]
async fn backoff_policy_gives_up_and_keeps_credential() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    for _ in 0..3 {
        backend.reply("tok", network_failure());
    }
    let retry = RetryPolicy::Backoff { max_attempts: 2, initial_delay_ms: 1, max_delay_ms: 2 };
    let session = session_with(&store, &backend, retry);

    session.bootstrap().await;

    assert!(!session.is_authenticated());
    assert_eq!(session.credential(), Some(Credential::new("tok")));
    assert_eq!(backend.validate_calls().len(), 3);
}

#[tokio::test]
async fn backoff_policy_does_not_retry_rejections() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    backend.reply("tok", Err(ValidationError::Unauthenticated));
    let retry = RetryPolicy::Backoff { max_attempts: 5, initial_delay_ms: 1, max_delay_ms: 2 };
    let session = session_with(&store, &backend, retry);

    session.bootstrap().await;

    assert_eq!(backend.validate_calls().len(), 1);
    assert_eq!(store.read(), None);
}

#[tokio::test]
async fn backoff_retry_stops_when_credential_changes() {
    let store = store_with(Some("tok-1"));
    let backend = FakeBackend::new();
    backend.reply("tok-1", network_failure());
    backend.reply("tok-1", Ok(identity("stale", Role::Customer)));
    let retry = RetryPolicy::Backoff { max_attempts: 3, initial_delay_ms: 1, max_delay_ms: 2 };
    let session = session_with(&store, &backend, retry);

    // Sign in as someone else as soon as the first failure is applied,
    // i.e. while the retry is waiting.
    let relogin = session.clone();
    let done = Rc::new(std::cell::Cell::new(false));
    let once = Rc::clone(&done);
    session.subscribe(move |state| {
        if state.bootstrapped && state.identity.is_none() && !once.replace(true) {
            let input = LoginInput::KnownIdentity(Credential::new("tok-2"), identity("bob", Role::Teller));
            assert!(relogin.login(input).now_or_never().is_some());
        }
    });

    session.bootstrap().await;

    assert!(done.get());
    assert_eq!(backend.validate_calls(), vec!["tok-1".to_owned()]);
    assert_eq!(session.credential(), Some(Credential::new("tok-2")));
    assert_eq!(session.identity(), Some(identity("bob", Role::Teller)));
    assert_eq!(store.read(), Some(Credential::new("tok-2")));
}

// =============================================================
// Login
// =============================================================

#[tokio::test]
async fn login_with_known_identity_skips_validation() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    let input = LoginInput::KnownIdentity(Credential::new("tok"), identity("alice", Role::Customer));
    assert!(session.login(input).now_or_never().is_some());

    assert!(session.is_authenticated());
    assert!(!session.loading());
    assert_eq!(store.read(), Some(Credential::new("tok")));
    assert!(backend.validate_calls().is_empty());
}

#[tokio::test]
async fn login_with_unknown_identity_validates_before_settling() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    backend.reply("tok", Ok(identity("bob", Role::Teller)));
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    session.login(LoginInput::UnknownIdentity(Credential::new("tok"))).await;

    assert!(session.is_authenticated());
    assert_eq!(backend.validate_calls(), vec!["tok".to_owned()]);
    assert_eq!(store.read(), Some(Credential::new("tok")));
}

#[tokio::test]
async fn stale_validation_never_overwrites_newer_login() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let old_reply = backend.reply_later("tok-old");
    backend.reply("tok-new", Ok(identity("alice", Role::Teller)));
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    let first = session.login(LoginInput::UnknownIdentity(Credential::new("tok-old")));
    let second = async {
        session.login(LoginInput::UnknownIdentity(Credential::new("tok-new"))).await;
        let _ = old_reply.send(Ok(identity("mallory", Role::Admin)));
    };
    tokio::join!(first, second);

    assert_eq!(session.identity(), Some(identity("alice", Role::Teller)));
    assert_eq!(session.credential(), Some(Credential::new("tok-new")));
    assert_eq!(store.read(), Some(Credential::new("tok-new")));
}

#[tokio::test]
async fn stale_rejection_does_not_clear_newer_credential() {
    let store = store_with(Some("tok-old"));
    let backend = FakeBackend::new();
    let old_reply = backend.reply_later("tok-old");
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    let relogin = async {
        let input = LoginInput::KnownIdentity(Credential::new("tok-new"), identity("alice", Role::Admin));
        session.login(input).await;
        let _ = old_reply.send(Err(ValidationError::Unauthenticated));
    };
    tokio::join!(session.bootstrap(), relogin);

    assert!(session.is_authenticated());
    assert_eq!(store.read(), Some(Credential::new("tok-new")));
}

// =============================================================
// Logout
// =============================================================

#[tokio::test]
async fn logout_without_revoke_clears_immediately_and_offline() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    session.login(LoginInput::KnownIdentity(Credential::new("tok"), identity("alice", Role::Teller))).await;

    assert!(session.logout(LogoutOptions { revoke: false }).now_or_never().is_some());

    assert_eq!(session.credential(), None);
    assert_eq!(session.identity(), None);
    assert_eq!(store.read(), None);
    assert!(backend.revoke_calls().is_empty());
    assert!(backend.validate_calls().is_empty());
}

#[tokio::test]
async fn logout_clears_state_even_when_revoke_fails() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    backend.fail_revoke();
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    session.login(LoginInput::KnownIdentity(Credential::new("tok"), identity("alice", Role::Teller))).await;

    session.logout(LogoutOptions::default()).await;

    assert_eq!(backend.revoke_calls(), vec!["tok".to_owned()]);
    assert!(!session.is_authenticated());
    assert_eq!(session.credential(), None);
    assert_eq!(store.read(), None);
    assert!(!session.loading());
}

#[tokio::test]
async fn login_during_pending_revoke_survives_logout() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let revoke = backend.revoke_later();
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    session.login(LoginInput::KnownIdentity(Credential::new("tok-1"), identity("alice", Role::Teller))).await;

    let sign_in_again = async {
        session.login(LoginInput::KnownIdentity(Credential::new("tok-2"), identity("bob", Role::Admin))).await;
        let _ = revoke.send(Ok(()));
    };
    tokio::join!(session.logout(LogoutOptions::default()), sign_in_again);

    assert_eq!(backend.revoke_calls(), vec!["tok-1".to_owned()]);
    assert!(session.is_authenticated());
    assert_eq!(session.credential(), Some(Credential::new("tok-2")));
    assert_eq!(store.read(), Some(Credential::new("tok-2")));
}

#[tokio::test]
async fn logout_without_credential_skips_revoke() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    session.logout(LogoutOptions::default()).await;

    assert!(backend.revoke_calls().is_empty());
    assert!(!session.loading());
}

#[tokio::test]
async fn logout_discards_in_flight_validation() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    let reply = backend.reply_later("tok");
    let session = session_with(&store, &backend, RetryPolicy::Manual);

    let sign_out = async {
        session.logout(LogoutOptions { revoke: false }).await;
        let _ = reply.send(Ok(identity("alice", Role::Teller)));
    };
    tokio::join!(session.bootstrap(), sign_out);

    assert!(!session.is_authenticated());
    assert_eq!(session.identity(), None);
}

// =============================================================
// Roles, headers, listeners
// =============================================================

#[test]
fn has_role_is_false_before_any_identity() {
    let store = store_with(Some("tok"));
    let backend = FakeBackend::new();
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    assert!(!session.has_role(&[]));
    for role in Role::ALL {
        assert!(!session.has_role(&[role]));
    }
}

#[test]
fn auth_headers_follow_credential() {
    let backend = FakeBackend::new();
    let anonymous = session_with(&store_with(None), &backend, RetryPolicy::Manual);
    assert!(anonymous.auth_headers().is_empty());

    let stored = session_with(&store_with(Some("tok")), &backend, RetryPolicy::Manual);
    assert_eq!(stored.auth_headers(), vec![("Authorization".to_owned(), "Bearer tok".to_owned())]);
}

#[tokio::test]
async fn listeners_observe_every_transition() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    backend.reply("tok", Ok(identity("alice", Role::Teller)));
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.subscribe(move |state| sink.borrow_mut().push((state.loading(), state.is_authenticated())));

    session.bootstrap().await;
    session.login(LoginInput::UnknownIdentity(Credential::new("tok"))).await;
    session.logout(LogoutOptions { revoke: false }).await;

    assert_eq!(*seen.borrow(), vec![(false, false), (true, false), (false, true), (false, false)]);
}

#[tokio::test]
async fn listener_may_read_session_reentrantly() {
    let store = store_with(None);
    let backend = FakeBackend::new();
    let session = session_with(&store, &backend, RetryPolicy::Manual);
    let observer = session.clone();
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    session.subscribe(move |_| *sink.borrow_mut() = Some(observer.state()));

    session.bootstrap().await;

    assert_eq!(seen.borrow().as_ref().map(AuthState::loading), Some(false));
}
