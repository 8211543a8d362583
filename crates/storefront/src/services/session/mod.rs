//! Session synchronization service.
//!
//! Owns the authentication lifecycle on top of the platform's auth and
//! profile boundaries: recovers a durable token on startup, validates it
//! against the platform, publishes an optimistic profile immediately and a
//! hydrated one when the profile record arrives, revalidates when the host
//! reports activity after idling, refreshes tokens nearing expiry, and
//! tears everything down on sign-out.
//!
//! State flows one way out of the service through a [`tokio::sync::watch`]
//! channel of [`AuthSnapshot`]s. Consumers never mutate auth state
//! directly.
//!
//! # State machine
//!
//! ```text
//! Uninitialized -> Checking -> Anonymous
//!                           -> Authenticated (profile pending)
//!                                -> Authenticated (profile ready)
//! ```
//!
//! Background failures (hydration, keep-alive refresh) are logged and
//! swallowed; only the explicit auth actions return errors.

mod clock;
mod error;
pub mod runtime;
mod vault;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use vault::{KeyValueStore, MemoryStore, SessionVault};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use juniper_core::Email;

use crate::models::{AuthUser, PlatformSession, Profile, ProfileView, TokenBundle};
use crate::platform::{AuthApi, ProfileApi, ProfileInsert, ProfileRecord, SignUpOutcome};

/// How long the initial session check may keep the UI in a loading state.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Activity-triggered revalidation fires only when the last sync is older
/// than this.
pub const SYNC_STALENESS_MS: i64 = 5 * 60 * 1000;

/// Cadence of the keep-alive timer.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Keep-alive refreshes the session when less than this many seconds of
/// validity remain.
pub const REFRESH_THRESHOLD_SECONDS: i64 = 10 * 60;

/// The auth state published to consumers.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    /// Whether the initial session check is still unresolved.
    pub loading: bool,
    /// The signed-in account, if any.
    pub user: Option<AuthUser>,
    /// The account's profile, tagged with its provenance.
    pub profile: Option<ProfileView>,
    /// Last recorded error. Informational; the machine has still resolved
    /// to a usable state.
    pub error: Option<String>,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            loading: true,
            user: None,
            profile: None,
            error: None,
        }
    }
}

impl AuthSnapshot {
    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the snapshot grants admin access. Requires a hydrated
    /// profile; optimistic profiles never pass.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(ProfileView::is_admin)
    }
}

/// The session synchronizer.
///
/// Generic over the auth and profile boundaries so tests can substitute
/// in-memory fakes; the vault and clock are injected for the same reason.
/// Cheaply cloneable; clones share one state machine.
pub struct SessionSynchronizer<A, P> {
    inner: Arc<SyncInner<A, P>>,
}

impl<A, P> Clone for SessionSynchronizer<A, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SyncInner<A, P> {
    auth: A,
    profiles: P,
    vault: SessionVault,
    clock: Arc<dyn Clock>,
    snapshot_tx: watch::Sender<AuthSnapshot>,
    /// One fresh initialization per mount cycle.
    initialized: AtomicBool,
    /// Set by teardown; in-flight results are dropped once set.
    detached: AtomicBool,
    /// Whether the initial check has resolved (gates the safety timeout).
    check_resolved: AtomicBool,
    /// Monotonic hydration sequence; only the latest issued hydration may
    /// publish its result.
    hydration_seq: AtomicU64,
}

impl<A, P> SessionSynchronizer<A, P>
where
    A: AuthApi + Send + Sync + 'static,
    P: ProfileApi + Send + Sync + 'static,
{
    /// Create a synchronizer over the given boundaries.
    #[must_use]
    pub fn new(auth: A, profiles: P, vault: SessionVault, clock: Arc<dyn Clock>) -> Self {
        let (snapshot_tx, _) = watch::channel(AuthSnapshot::default());
        Self {
            inner: Arc::new(SyncInner {
                auth,
                profiles,
                vault,
                clock,
                snapshot_tx,
                initialized: AtomicBool::new(false),
                detached: AtomicBool::new(false),
                check_resolved: AtomicBool::new(false),
                hydration_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribe to auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The current auth state.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run the initial session check.
    ///
    /// Idempotent within a mount cycle: a second call before
    /// [`Self::teardown`] is a no-op. Spawns a safety timeout that forces
    /// the loading flag off after [`CHECK_TIMEOUT`] if the check has not
    /// resolved, without asserting an auth state.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session already initializing, skipping duplicate init");
            return;
        }
        self.inner.detached.store(false, Ordering::SeqCst);
        self.inner.check_resolved.store(false, Ordering::SeqCst);
        info!("Session synchronizer initializing");

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(CHECK_TIMEOUT).await;
            if !this.inner.check_resolved.load(Ordering::SeqCst) && !this.is_detached() {
                warn!("Session check did not resolve in time, forcing loading off");
                this.publish(|s| s.loading = false);
            }
        });

        self.check_session().await;
    }

    /// Drop in-flight work and allow a fresh initialization.
    ///
    /// In-flight requests are not aborted; their results are ignored once
    /// this has been called.
    pub fn teardown(&self) {
        self.inner.detached.store(true, Ordering::SeqCst);
        self.inner.initialized.store(false, Ordering::SeqCst);
    }

    fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Checking
    // =========================================================================

    /// Recover and validate the durable session, resolving to
    /// authenticated or anonymous.
    async fn check_session(&self) {
        let Some(bundle) = self.inner.vault.read_token_bundle() else {
            debug!("No stored session");
            self.resolve_anonymous(None);
            return;
        };

        // An expired bundle resolves locally; no validation round-trip.
        if bundle.is_expired(self.inner.clock.now_ms()) {
            debug!("Stored session expired");
            self.inner.vault.clear_token_bundle();
            self.resolve_anonymous(None);
            return;
        }

        match self.inner.auth.get_user(&bundle.access_token).await {
            Ok(user) => {
                if self.is_detached() {
                    return;
                }
                info!(email = %user.email, "Recovered session");
                self.inner.check_resolved.store(true, Ordering::SeqCst);
                self.sync_session(user, &bundle.access_token).await;
            }
            Err(err) => {
                if self.is_detached() {
                    return;
                }
                warn!(error = %err, "Stored session rejected by platform");
                self.inner.vault.clear_token_bundle();
                self.resolve_anonymous(Some(err.to_string()));
            }
        }
    }

    /// Publish the optimistic state for a confirmed session, then hydrate
    /// the profile.
    ///
    /// The optimistic profile is derived from token claims alone and is
    /// published immediately so consumers render an authenticated state
    /// without waiting on the profile round-trip. Hydration failure is
    /// non-fatal: the user stays signed in with the optimistic view.
    async fn sync_session(&self, user: AuthUser, access_token: &str) {
        let optimistic = Profile::optimistic(&user);
        let user_id = user.id;

        self.publish(|s| {
            s.loading = false;
            s.user = Some(user.clone());
            s.profile = Some(ProfileView::Optimistic(optimistic.clone()));
            s.error = None;
        });
        self.inner
            .vault
            .stamp_last_sync(user_id, self.inner.clock.now_ms());

        // Hydrate; only the latest issued hydration may publish.
        let seq = self.inner.hydration_seq.fetch_add(1, Ordering::SeqCst) + 1;
        match self.inner.profiles.fetch(access_token, user_id).await {
            Ok(Some(record)) => {
                if self.is_detached() || seq != self.inner.hydration_seq.load(Ordering::SeqCst) {
                    debug!("Dropping superseded profile hydration");
                    return;
                }
                let hydrated = merge_profile(&optimistic, &record);
                self.publish(|s| s.profile = Some(ProfileView::Hydrated(hydrated)));
                self.inner
                    .vault
                    .stamp_profile_fetch(user_id, self.inner.clock.now_ms());
            }
            Ok(None) => {
                debug!(user_id = %user_id, "No profile record yet, keeping optimistic view");
            }
            Err(err) => {
                // Non-fatal: the token is valid even if the profile
                // service is degraded.
                warn!(error = %err, "Profile hydration failed, keeping optimistic view");
            }
        }
    }

    // =========================================================================
    // Revalidation
    // =========================================================================

    /// Revalidate after the host reports activity (tab became visible,
    /// window focused), but only when the last sync is stale.
    pub async fn handle_became_active(&self) {
        if self.is_detached() {
            return;
        }
        let Some(bundle) = self.inner.vault.read_token_bundle() else {
            return;
        };
        let Some(user_id) = self.inner.snapshot_tx.borrow().user.as_ref().map(|u| u.id) else {
            return;
        };

        let now_ms = self.inner.clock.now_ms();
        let stale = self
            .inner
            .vault
            .read_last_sync(user_id)
            .is_none_or(|last| now_ms - last > SYNC_STALENESS_MS);
        if !stale {
            debug!("Session fresh, skipping revalidation");
            return;
        }

        debug!("Session stale, revalidating");
        match self.inner.auth.get_user(&bundle.access_token).await {
            Ok(user) => {
                if self.is_detached() {
                    return;
                }
                self.sync_session(user, &bundle.access_token).await;
            }
            Err(err) => {
                warn!(error = %err, "Revalidation failed");
            }
        }
    }

    /// Proactively refresh the session when its remaining lifetime drops
    /// under [`REFRESH_THRESHOLD_SECONDS`]. Called on a fixed cadence by
    /// the runtime driver.
    pub async fn keep_alive_tick(&self) {
        if self.is_detached() {
            return;
        }
        let Some(bundle) = self.inner.vault.read_token_bundle() else {
            return;
        };

        let remaining = bundle.remaining_seconds(self.inner.clock.now_ms());
        debug!(remaining_seconds = remaining, "Session expiry check");
        if remaining >= REFRESH_THRESHOLD_SECONDS {
            return;
        }

        match self.inner.auth.refresh_session(&bundle.refresh_token).await {
            Ok(session) => {
                if self.is_detached() {
                    return;
                }
                info!("Session refreshed");
                self.inner
                    .vault
                    .write_token_bundle(&TokenBundle::from_session(&session));
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed");
            }
        }
    }

    // =========================================================================
    // Auth actions
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On success the session is persisted and synchronized before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::InvalidCredentials` when the platform rejects the
    /// pair.
    pub async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PlatformSession, AuthError> {
        let email = Email::parse(email)?;

        let session = self
            .inner
            .auth
            .sign_in_with_password(email.as_str(), password)
            .await
            .map_err(AuthError::from_sign_in)?;

        self.inner
            .vault
            .write_token_bundle(&TokenBundle::from_session(&session));
        self.sync_session(session.user.clone(), &session.access_token)
            .await;

        Ok(session)
    }

    /// Register a new account.
    ///
    /// When the platform auto-confirms and returns a session, it is
    /// persisted and synchronized, and a profile row is ensured to exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountExists` or `AuthError::WeakPassword`
    /// when the platform rejects the registration.
    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let email = Email::parse(email)?;

        let outcome = self
            .inner
            .auth
            .sign_up(email.as_str(), password, name)
            .await
            .map_err(AuthError::from_sign_up)?;

        if let Some(session) = &outcome.session {
            self.inner
                .vault
                .write_token_bundle(&TokenBundle::from_session(session));

            // Best-effort: the platform usually creates the row via a
            // trigger, but a missing one should not fail the sign-up.
            let insert = ProfileInsert {
                id: outcome.user.id,
                email: email.into_inner(),
                name: name.map(str::to_owned),
            };
            if let Err(err) = self
                .inner
                .profiles
                .upsert(&session.access_token, &insert)
                .await
            {
                warn!(error = %err, "Profile creation after sign-up failed");
            }

            self.sync_session(session.user.clone(), &session.access_token)
                .await;
        }

        Ok(outcome)
    }

    /// Send a password recovery email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email, or the
    /// platform's rejection.
    pub async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.inner
            .auth
            .reset_password_for_email(email.as_str(), redirect_to)
            .await?;
        Ok(())
    }

    /// Sign out.
    ///
    /// Safe to call from any state: local state and durable keys are
    /// always cleared, even when the platform revocation fails (the token
    /// will lapse on its own).
    pub async fn sign_out(&self) {
        if let Some(bundle) = self.inner.vault.read_token_bundle()
            && let Err(err) = self.inner.auth.sign_out(&bundle.access_token).await
        {
            warn!(error = %err, "Platform sign-out failed, clearing local session anyway");
        }

        self.inner.vault.clear_session_keys();
        self.publish(|s| {
            s.loading = false;
            s.user = None;
            s.profile = None;
            s.error = None;
        });
        info!("Signed out");
    }

    // =========================================================================
    // Publication
    // =========================================================================

    fn publish(&self, update: impl FnOnce(&mut AuthSnapshot)) {
        self.inner.snapshot_tx.send_modify(update);
    }

    fn resolve_anonymous(&self, error: Option<String>) {
        self.inner.check_resolved.store(true, Ordering::SeqCst);
        self.publish(|s| {
            s.loading = false;
            s.user = None;
            s.profile = None;
            s.error = error;
        });
    }
}

/// Merge a platform profile record over the optimistic profile.
///
/// Record name/avatar take precedence with optimistic fallback; the admin
/// flag comes from the record alone; verification and creation metadata
/// stay with the token claims.
pub(crate) fn merge_profile(optimistic: &Profile, record: &ProfileRecord) -> Profile {
    Profile {
        id: optimistic.id,
        email: optimistic.email.clone(),
        name: record.name.clone().or_else(|| optimistic.name.clone()),
        avatar_url: record
            .avatar_url
            .clone()
            .or_else(|| optimistic.avatar_url.clone()),
        admin: record.admin,
        email_verified: optimistic.email_verified,
        created_at: optimistic.created_at,
    }
}
