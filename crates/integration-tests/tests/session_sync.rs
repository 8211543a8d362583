//! Behavioral tests for the session synchronizer.
//!
//! Drives the state machine through fake platform boundaries with a
//! manual clock: no timers, no network. Round-trip counters on the fakes
//! pin down which transitions are allowed to touch the platform.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use juniper_integration_tests::fakes::{
    FakeAuth, FakeProfiles, make_record, make_session, make_user,
};
use juniper_storefront::models::{ProfileView, TokenBundle, vault_keys};
use juniper_storefront::services::session::{
    Clock, KeyValueStore, ManualClock, MemoryStore, SessionSynchronizer, SessionVault,
};

/// A fixed "now" for the manual clock (epoch ms).
const NOW_MS: i64 = 1_700_000_000_000;
const NOW_S: i64 = NOW_MS / 1000;

type TestSync = SessionSynchronizer<Arc<FakeAuth>, Arc<FakeProfiles>>;

struct Harness {
    sync: TestSync,
    auth: Arc<FakeAuth>,
    profiles: Arc<FakeProfiles>,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
}

fn harness_with(profiles: FakeProfiles) -> Harness {
    let auth = Arc::new(FakeAuth::default());
    let profiles = Arc::new(profiles);
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));

    let sync = SessionSynchronizer::new(
        Arc::clone(&auth),
        Arc::clone(&profiles),
        SessionVault::new(store.clone()),
        clock.clone(),
    );

    Harness {
        sync,
        auth,
        profiles,
        store,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(FakeProfiles::default())
}

impl Harness {
    fn vault(&self) -> SessionVault {
        SessionVault::new(self.store.clone())
    }

    /// Seed the vault with a bundle expiring at `expires_at_ms`.
    fn seed_token(&self, token: &str, expires_at_ms: i64) {
        self.vault().write_token_bundle(&TokenBundle {
            access_token: token.to_owned(),
            refresh_token: format!("refresh-{token}"),
            expires_at_ms,
        });
    }
}

// =============================================================================
// Session round-trip (CHECKING resolution)
// =============================================================================

#[tokio::test]
async fn test_valid_stored_token_resolves_authenticated() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    h.profiles.put(make_record(&user, Some("Ada Lovelace"), false));
    h.seed_token("tok", NOW_MS + 3_600_000);

    h.sync.initialize().await;

    let snap = h.sync.snapshot();
    assert!(!snap.loading);
    assert!(snap.error.is_none());
    assert_eq!(
        snap.user.as_ref().map(|u| u.email.as_str()),
        Some("ada@example.com")
    );
    // One validation round-trip, profile hydrated from the record.
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 1);
    match snap.profile {
        Some(ProfileView::Hydrated(profile)) => {
            assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
        }
        other => panic!("expected hydrated profile, got {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_stored_token_resolves_anonymous_without_round_trip() {
    let h = harness();
    h.seed_token("tok", NOW_MS - 1);

    h.sync.initialize().await;

    let snap = h.sync.snapshot();
    assert!(!snap.loading);
    assert!(snap.user.is_none());
    assert!(snap.error.is_none());
    // No validation attempt for a locally-expired token.
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 0);
    assert!(h.vault().read_token_bundle().is_none());
}

#[tokio::test]
async fn test_missing_token_resolves_anonymous() {
    let h = harness();
    h.sync.initialize().await;

    let snap = h.sync.snapshot();
    assert!(!snap.loading);
    assert!(snap.user.is_none());
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_token_clears_bundle_and_records_error() {
    let h = harness();
    // Token present and unexpired, but unknown to the platform.
    h.seed_token("revoked", NOW_MS + 3_600_000);

    h.sync.initialize().await;

    let snap = h.sync.snapshot();
    assert!(!snap.loading);
    assert!(snap.user.is_none());
    assert!(snap.error.is_some());
    assert!(h.vault().read_token_bundle().is_none());
}

#[tokio::test]
async fn test_duplicate_initialize_is_noop_until_teardown() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    h.seed_token("tok", NOW_MS + 3_600_000);

    h.sync.initialize().await;
    h.sync.initialize().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 1);

    // A fresh mount cycle re-runs the check.
    h.sync.teardown();
    h.sync.initialize().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Safety timeout
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_safety_timeout_forces_loading_off() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    h.auth.hang_get_user.store(true, Ordering::SeqCst);
    h.seed_token("tok", NOW_MS + 3_600_000);

    let sync = h.sync.clone();
    let init = tokio::spawn(async move { sync.initialize().await });

    // Paused time jumps past the 5 s timeout once everything is blocked.
    tokio::time::sleep(std::time::Duration::from_secs(6)).await;

    let snap = h.sync.snapshot();
    assert!(!snap.loading, "timeout must force loading off");
    // No auth state was asserted: still no user, no error.
    assert!(snap.user.is_none());
    assert!(snap.error.is_none());

    init.abort();
}

// =============================================================================
// Profile hydration
// =============================================================================

#[tokio::test]
async fn test_admin_affordances_wait_for_hydration() {
    let (profiles, gate) = FakeProfiles::gated();
    let h = harness_with(profiles);

    let user = make_user("admin@example.com");
    let session = make_session(&user, "tok", NOW_S + 3600);
    h.auth.add_account("hunter22", &session);
    h.profiles.put(make_record(&user, None, true));

    let mut rx = h.sync.subscribe();
    let sync = h.sync.clone();
    let sign_in =
        tokio::spawn(async move { sync.sign_in_with_email("admin@example.com", "hunter22").await });

    // Optimistic state is published while the profile fetch is held.
    let snap = rx
        .wait_for(|s| s.user.is_some())
        .await
        .expect("watch closed")
        .clone();
    match &snap.profile {
        Some(view @ ProfileView::Optimistic(profile)) => {
            assert!(!profile.admin);
            assert!(!view.is_admin(), "optimistic view must never grant admin");
        }
        other => panic!("expected optimistic profile, got {other:?}"),
    }

    // Release the hydration; the record's admin flag now applies.
    gate.add_permits(1);
    sign_in.await.expect("join").expect("sign-in");

    let snap = h.sync.snapshot();
    match &snap.profile {
        Some(view @ ProfileView::Hydrated(profile)) => {
            assert!(profile.admin);
            assert!(view.is_admin());
        }
        other => panic!("expected hydrated profile, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hydration_failure_keeps_user_signed_in() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    h.profiles.fail_fetch.store(true, Ordering::SeqCst);
    h.seed_token("tok", NOW_MS + 3_600_000);

    h.sync.initialize().await;

    let snap = h.sync.snapshot();
    assert!(snap.user.is_some(), "profile outage must not sign the user out");
    assert!(matches!(snap.profile, Some(ProfileView::Optimistic(_))));
}

#[tokio::test]
async fn test_superseded_hydration_is_dropped() {
    let (profiles, gate) = FakeProfiles::gated();
    let h = harness_with(profiles);

    let first = make_user("first@example.com");
    let second = make_user("second@example.com");
    h.auth
        .add_account("pw-first", &make_session(&first, "tok-first", NOW_S + 3600));
    h.auth
        .add_account("pw-second", &make_session(&second, "tok-second", NOW_S + 3600));
    // The stale hydration would report an admin profile if it won.
    h.profiles.put(make_record(&first, Some("First"), true));
    h.profiles.put(make_record(&second, Some("Second"), false));

    let mut rx = h.sync.subscribe();

    let sync = h.sync.clone();
    let first_sign_in =
        tokio::spawn(async move { sync.sign_in_with_email("first@example.com", "pw-first").await });
    rx.wait_for(|s| s.user.as_ref().is_some_and(|u| u.id == first.id))
        .await
        .expect("watch closed");

    let sync = h.sync.clone();
    let second_sign_in = tokio::spawn(async move {
        sync.sign_in_with_email("second@example.com", "pw-second").await
    });
    rx.wait_for(|s| s.user.as_ref().is_some_and(|u| u.id == second.id))
        .await
        .expect("watch closed");

    // Both hydrations resolve; only the newest may publish.
    gate.add_permits(2);
    first_sign_in.await.expect("join").expect("sign-in");
    second_sign_in.await.expect("join").expect("sign-in");

    let snap = h.sync.snapshot();
    assert_eq!(snap.user.as_ref().map(|u| u.id), Some(second.id));
    match &snap.profile {
        Some(ProfileView::Hydrated(profile)) => {
            assert_eq!(profile.name.as_deref(), Some("Second"));
            assert!(!profile.admin, "stale hydration must not leak through");
        }
        other => panic!("expected hydrated profile for second user, got {other:?}"),
    }
}

// =============================================================================
// Keep-alive refresh
// =============================================================================

#[tokio::test]
async fn test_keep_alive_refreshes_only_under_threshold() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    // 30 minutes of validity left.
    h.seed_token("tok", NOW_MS + 30 * 60 * 1000);

    h.sync.keep_alive_tick().await;
    assert_eq!(h.auth.refresh_calls.load(Ordering::SeqCst), 0);

    // 9 minutes left: under the 10-minute threshold.
    h.clock.advance_ms(21 * 60 * 1000);
    let refreshed = make_session(&user, "tok-2", NOW_S + 2 * 3600);
    *h.auth.refresh_response.lock().expect("lock") = Some(refreshed);

    h.sync.keep_alive_tick().await;
    assert_eq!(h.auth.refresh_calls.load(Ordering::SeqCst), 1);

    let bundle = h.vault().read_token_bundle().expect("bundle");
    assert_eq!(bundle.access_token, "tok-2");
    assert_eq!(bundle.expires_at_ms, (NOW_S + 2 * 3600) * 1000);
}

#[tokio::test]
async fn test_keep_alive_refresh_failure_is_swallowed() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    h.seed_token("tok", NOW_MS + 60 * 1000);
    // No refresh response configured: the fake rejects the refresh.

    h.sync.keep_alive_tick().await;

    assert_eq!(h.auth.refresh_calls.load(Ordering::SeqCst), 1);
    // The old bundle survives; the user is not signed out.
    assert_eq!(
        h.vault().read_token_bundle().expect("bundle").access_token,
        "tok"
    );
}

// =============================================================================
// Activity-triggered revalidation
// =============================================================================

#[tokio::test]
async fn test_activity_revalidates_only_when_stale() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth.accept_token("tok", &user);
    h.profiles.put(make_record(&user, Some("Ada"), false));
    h.seed_token("tok", NOW_MS + 24 * 3_600_000);

    h.sync.initialize().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 1);

    // Two minutes later: fresh, no round-trip.
    h.clock.advance_ms(2 * 60 * 1000);
    h.sync.handle_became_active().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 1);

    // Six minutes after the sync stamp: stale, revalidates and restamps.
    h.clock.advance_ms(4 * 60 * 1000);
    h.sync.handle_became_active().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        h.vault().read_last_sync(user.id),
        Some(h.clock.now_ms()),
        "revalidation must restamp the sync marker"
    );

    // Immediately again: fresh.
    h.sync.handle_became_active().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_activity_is_noop_when_anonymous() {
    let h = harness();
    h.sync.initialize().await;
    h.sync.handle_became_active().await;
    assert_eq!(h.auth.get_user_calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn test_sign_out_clears_memory_and_durable_state() {
    let h = harness();
    let user = make_user("ada@example.com");
    let session = make_session(&user, "tok", NOW_S + 3600);
    h.auth.add_account("hunter22", &session);
    h.profiles.put(make_record(&user, Some("Ada"), false));

    h.sync
        .sign_in_with_email("ada@example.com", "hunter22")
        .await
        .expect("sign-in");
    assert!(h.sync.snapshot().is_authenticated());

    h.sync.sign_out().await;

    let snap = h.sync.snapshot();
    assert!(!snap.loading);
    assert!(snap.user.is_none());
    assert!(snap.profile.is_none());
    assert_eq!(h.auth.sign_out_calls.load(Ordering::SeqCst), 1);

    // No session-owned key survives.
    for key in h.store.keys() {
        assert!(
            !key.starts_with(vault_keys::AUTH_SYNC_PREFIX)
                && !key.starts_with(vault_keys::PROFILE_FETCH_PREFIX)
                && key != vault_keys::ACCESS_TOKEN,
            "leftover session key: {key}"
        );
    }
}

#[tokio::test]
async fn test_sign_out_is_safe_when_anonymous() {
    let h = harness();
    h.sync.sign_out().await;
    let snap = h.sync.snapshot();
    assert!(snap.user.is_none());
    // No token to revoke, so the platform was not called.
    assert_eq!(h.auth.sign_out_calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Auth actions
// =============================================================================

#[tokio::test]
async fn test_sign_in_rejection_surfaces_invalid_credentials() {
    let h = harness();
    let user = make_user("ada@example.com");
    h.auth
        .add_account("correct", &make_session(&user, "tok", NOW_S + 3600));

    let err = h
        .sync
        .sign_in_with_email("ada@example.com", "wrong")
        .await
        .expect_err("wrong password must fail");
    assert!(err.to_string().contains("invalid credentials"));

    // Failed sign-in leaves no session behind.
    assert!(h.vault().read_token_bundle().is_none());
    assert!(!h.sync.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_sign_in_persists_bundle_in_milliseconds() {
    let h = harness();
    let user = make_user("ada@example.com");
    let session = make_session(&user, "tok", NOW_S + 3600);
    h.auth.add_account("hunter22", &session);

    h.sync
        .sign_in_with_email("ada@example.com", "hunter22")
        .await
        .expect("sign-in");

    let bundle = h.vault().read_token_bundle().expect("bundle");
    assert_eq!(bundle.expires_at_ms, (NOW_S + 3600) * 1000);
}

#[tokio::test]
async fn test_malformed_email_fails_before_any_round_trip() {
    let h = harness();
    let err = h
        .sync
        .sign_in_with_email("not-an-email", "pw")
        .await
        .expect_err("malformed email must fail");
    assert!(err.to_string().contains("invalid email"));
}
