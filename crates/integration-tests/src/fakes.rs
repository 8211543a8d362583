//! In-memory fakes of the platform boundaries.
//!
//! Implement the same traits as the wire clients, with call counters so
//! tests can assert which round-trips actually happened, and an optional
//! gate on profile fetches so tests can hold a hydration in flight.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use juniper_core::{Email, UserId};
use juniper_storefront::models::{AuthUser, PlatformSession, UserMetadata};
use juniper_storefront::platform::{
    AuthApi, PlatformError, ProfileApi, ProfileInsert, ProfileRecord, SignUpOutcome,
};

/// Build a test account.
#[must_use]
pub fn make_user(email: &str) -> AuthUser {
    AuthUser {
        id: UserId::random(),
        email: Email::parse(email).expect("test email"),
        email_confirmed_at: Some(Utc.timestamp_opt(1_700_000_000, 0).single().expect("ts")),
        created_at: Utc.timestamp_opt(1_690_000_000, 0).single().expect("ts"),
        user_metadata: UserMetadata::default(),
    }
}

/// Build a session for `user` with the given token and expiry (seconds).
#[must_use]
pub fn make_session(user: &AuthUser, access_token: &str, expires_at: i64) -> PlatformSession {
    PlatformSession {
        access_token: access_token.to_owned(),
        refresh_token: format!("refresh-{access_token}"),
        expires_in: 3600,
        expires_at,
        user: user.clone(),
    }
}

/// Build a profile record for `user`.
#[must_use]
pub fn make_record(user: &AuthUser, name: Option<&str>, admin: bool) -> ProfileRecord {
    ProfileRecord {
        id: user.id,
        email: user.email.as_str().to_owned(),
        name: name.map(str::to_owned),
        avatar_url: None,
        admin,
        created_at: user.created_at,
        updated_at: None,
    }
}

fn rejected(status: u16, message: &str) -> PlatformError {
    PlatformError::Api {
        status,
        message: message.to_owned(),
    }
}

/// Fake auth boundary.
#[derive(Default)]
pub struct FakeAuth {
    /// Tokens the platform accepts, and the accounts behind them.
    pub tokens: Mutex<HashMap<String, AuthUser>>,
    /// Password accounts: email -> (password, issued session).
    pub accounts: Mutex<HashMap<String, (String, PlatformSession)>>,
    /// Session returned by `refresh_session`, if any.
    pub refresh_response: Mutex<Option<PlatformSession>>,
    /// Outcome returned by `sign_up`, if any.
    pub sign_up_outcome: Mutex<Option<SignUpOutcome>>,
    /// Emails passed to `reset_password_for_email`.
    pub reset_emails: Mutex<Vec<String>>,
    /// When set, `get_user` never resolves.
    pub hang_get_user: AtomicBool,
    pub get_user_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl FakeAuth {
    /// Accept `token` as belonging to `user`.
    pub fn accept_token(&self, token: &str, user: &AuthUser) {
        self.tokens
            .lock()
            .expect("lock")
            .insert(token.to_owned(), user.clone());
    }

    /// Register a password account whose sign-in yields `session`.
    pub fn add_account(&self, password: &str, session: &PlatformSession) {
        self.accounts.lock().expect("lock").insert(
            session.user.email.as_str().to_owned(),
            (password.to_owned(), session.clone()),
        );
        self.accept_token(&session.access_token, &session.user);
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PlatformSession, PlatformError> {
        let accounts = self.accounts.lock().expect("lock");
        match accounts.get(email) {
            Some((expected, session)) if expected == password => Ok(session.clone()),
            _ => Err(rejected(400, "Invalid login credentials")),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _name: Option<&str>,
    ) -> Result<SignUpOutcome, PlatformError> {
        if self.accounts.lock().expect("lock").contains_key(email) {
            return Err(rejected(422, "User already registered"));
        }
        self.sign_up_outcome
            .lock()
            .expect("lock")
            .clone()
            .ok_or_else(|| rejected(500, "no sign-up outcome configured"))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), PlatformError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, PlatformError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_get_user.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.tokens
            .lock()
            .expect("lock")
            .get(access_token)
            .cloned()
            .ok_or_else(|| rejected(401, "invalid JWT"))
    }

    async fn refresh_session(
        &self,
        _refresh_token: &str,
    ) -> Result<PlatformSession, PlatformError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_response
            .lock()
            .expect("lock")
            .clone()
            .ok_or_else(|| rejected(400, "refresh token revoked"))
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        _redirect_to: &str,
    ) -> Result<(), PlatformError> {
        self.reset_emails
            .lock()
            .expect("lock")
            .push(email.to_owned());
        Ok(())
    }
}

/// Fake profile boundary.
#[derive(Default)]
pub struct FakeProfiles {
    /// Profile rows by account ID.
    pub records: Mutex<HashMap<UserId, ProfileRecord>>,
    /// When set, `fetch` fails with a server error.
    pub fail_fetch: AtomicBool,
    /// When present, each `fetch` waits for one permit before resolving.
    pub fetch_gate: Option<Arc<Semaphore>>,
    pub fetch_calls: AtomicUsize,
}

impl FakeProfiles {
    /// A fake whose fetches block until the returned semaphore receives
    /// permits.
    #[must_use]
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let fake = Self {
            fetch_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (fake, gate)
    }

    /// Store a profile row.
    pub fn put(&self, record: ProfileRecord) {
        self.records.lock().expect("lock").insert(record.id, record);
    }
}

#[async_trait]
impl ProfileApi for FakeProfiles {
    async fn fetch(
        &self,
        _access_token: &str,
        id: UserId,
    ) -> Result<Option<ProfileRecord>, PlatformError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.fetch_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(rejected(500, "profile service degraded"));
        }
        Ok(self.records.lock().expect("lock").get(&id).cloned())
    }

    async fn upsert(
        &self,
        _access_token: &str,
        insert: &ProfileInsert,
    ) -> Result<ProfileRecord, PlatformError> {
        let record = ProfileRecord {
            id: insert.id,
            email: insert.email.clone(),
            name: insert.name.clone(),
            avatar_url: None,
            admin: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.put(record.clone());
        Ok(record)
    }
}
