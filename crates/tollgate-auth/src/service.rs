//! Authentication service: login, session checks, privilege checks, logout.
//!
//! Every failure on the login and validation paths looks the same to the
//! client. Causes are logged for operators and carried in the returned
//! `ErrorKind` for the calling code.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tollgate_core::config::SessionConfig;
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_entity::session::SessionTier;

use crate::cookie::{
    CookieAttributes, CookieJar, MESSAGE_COOKIE, SessionCookie, TOKEN_COOKIE, USERNAME_COOKIE,
};
use crate::password::PasswordHasher;
use crate::session::backend::{SessionBackend, UserDirectory};
use crate::session::store::SessionStore;
use crate::session::with_deadline;
use crate::token::generate_token;

/// Flash message written on every failed login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials.";

/// Produces a fresh token for a username.
pub type TokenMinter = fn(&str) -> AppResult<String>;

/// Outcome of a successful login.
#[derive(Clone)]
pub struct AuthenticatedSession {
    /// Session row identifier.
    pub session_id: Uuid,
    /// Authenticated user name.
    pub username: String,
    /// Token written to the client.
    pub token: String,
    /// Tier the session was created in.
    pub tier: SessionTier,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("session_id", &self.session_id)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("tier", &self.tier)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Orchestrates credential checks, token minting, and session persistence.
///
/// Cheap to clone and safe to share across requests. The cookie jar is
/// request-scoped and passed to each call.
#[derive(Clone)]
pub struct AuthenticationService {
    users: Arc<dyn UserDirectory>,
    sessions: SessionStore,
    hasher: PasswordHasher,
    config: SessionConfig,
    mint: TokenMinter,
}

impl std::fmt::Debug for AuthenticationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationService")
            .field("users", &self.users)
            .field("sessions", &self.sessions)
            .field("config", &self.config)
            .finish()
    }
}

impl AuthenticationService {
    /// Creates a service from its collaborators.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sessions: SessionStore,
        hasher: PasswordHasher,
        config: SessionConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            config,
            mint: generate_token,
        }
    }

    /// Creates a service whose users and sessions live in one backend.
    pub fn from_backend<B>(backend: B, config: SessionConfig) -> Self
    where
        B: SessionBackend + UserDirectory + 'static,
    {
        let backend = Arc::new(backend);
        let users: Arc<dyn UserDirectory> = backend.clone();
        let sessions = SessionStore::new(backend, config.clone());
        Self::new(users, sessions, PasswordHasher::new(), config)
    }

    /// Replaces the token source.
    pub fn with_token_minter(mut self, mint: TokenMinter) -> Self {
        self.mint = mint;
        self
    }

    /// The underlying session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Logs `username` into `tier`.
    ///
    /// The session row is written before any identity cookie, so a store
    /// failure leaves the client exactly as unauthenticated as before. On
    /// every failure the jar receives only the generic flash message.
    pub async fn authenticate<J>(
        &self,
        jar: &mut J,
        username: &str,
        password: &str,
        tier: SessionTier,
    ) -> AppResult<AuthenticatedSession>
    where
        J: CookieJar + ?Sized,
    {
        match self.open_session(username, password, tier).await {
            Ok(session) => {
                let attributes = CookieAttributes::from_config(&self.config);
                jar.set(SessionCookie::new(
                    USERNAME_COOKIE,
                    session.username.as_str(),
                    attributes.clone(),
                ));
                jar.set(SessionCookie::new(
                    TOKEN_COOKIE,
                    session.token.as_str(),
                    attributes,
                ));
                jar.clear(MESSAGE_COOKIE);
                info!(tier = %tier, user = %username, "Login successful");
                Ok(session)
            }
            Err(e) => {
                let attributes = CookieAttributes {
                    max_age: None,
                    ..CookieAttributes::from_config(&self.config)
                };
                jar.set(SessionCookie::new(
                    MESSAGE_COOKIE,
                    LOGIN_FAILED_MESSAGE,
                    attributes,
                ));
                Err(e)
            }
        }
    }

    async fn open_session(
        &self,
        username: &str,
        password: &str,
        tier: SessionTier,
    ) -> AppResult<AuthenticatedSession> {
        if username.is_empty() || password.is_empty() {
            debug!(tier = %tier, "Login rejected: empty username or password");
            return Err(AppError::invalid_credentials());
        }

        let lookup = with_deadline(
            self.config.store_timeout(),
            "password_hash",
            self.users.password_hash(username, tier),
        )
        .await;

        // Every rejection after this point costs exactly one verification.
        let hash = match lookup {
            Ok(Some(hash)) => Some(hash),
            Ok(None) => {
                info!(tier = %tier, user = %username, "Login rejected: no eligible account");
                None
            }
            Err(e) => {
                warn!(tier = %tier, user = %username, error = %e, "Login rejected: password lookup failed");
                None
            }
        };
        let found = hash.is_some();

        if !self.verify(hash, password).await {
            if found {
                info!(tier = %tier, user = %username, "Login rejected: password mismatch");
            }
            return Err(AppError::invalid_credentials());
        }

        let token = (self.mint)(username).inspect_err(|e| {
            error!(tier = %tier, user = %username, error = %e, "Login aborted: token generation failed");
        })?;

        let session = self
            .sessions
            .create_session(tier, username, &token)
            .await
            .inspect_err(|e| {
                error!(tier = %tier, user = %username, error = %e, "Login aborted: session not persisted");
            })?;

        Ok(AuthenticatedSession {
            session_id: session.id,
            username: username.to_string(),
            token,
            tier,
            expires_at: session.expires_at,
        })
    }

    /// Runs the password hash comparison off the async worker threads.
    ///
    /// Without a stored hash the comparison runs against the placeholder
    /// and always fails.
    async fn verify(&self, hash: Option<String>, password: &str) -> bool {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify_password(&password, &hash),
            None => hasher.verify_placeholder(&password),
        })
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Password verification task failed");
            false
        })
    }

    /// Whether the request carries a live session for `tier`.
    pub async fn is_authenticated<J>(&self, jar: &J, tier: SessionTier) -> bool
    where
        J: CookieJar + ?Sized,
    {
        self.current_user(jar, tier).await.is_some()
    }

    /// Name of the user whose live `tier` session the request carries.
    pub async fn current_user<J>(&self, jar: &J, tier: SessionTier) -> Option<String>
    where
        J: CookieJar + ?Sized,
    {
        let username = jar.get(USERNAME_COOKIE).filter(|v| !v.is_empty())?;
        let token = jar.get(TOKEN_COOKIE).filter(|v| !v.is_empty())?;

        self.sessions
            .validate_session(tier, &username, &token)
            .await
            .then_some(username)
    }

    /// Whether the user named in the request's cookie is an administrator.
    ///
    /// Checks the account record only; no session of any tier is consulted.
    pub async fn is_admin<J>(&self, jar: &J) -> bool
    where
        J: CookieJar + ?Sized,
    {
        match jar.get(USERNAME_COOKIE).filter(|v| !v.is_empty()) {
            Some(username) => self.check_admin(&username).await,
            None => false,
        }
    }

    /// Whether `username` is an administrator. Unknown users and lookup
    /// failures are not.
    pub async fn check_admin(&self, username: &str) -> bool {
        if username.is_empty() {
            return false;
        }

        let lookup = with_deadline(
            self.config.store_timeout(),
            "is_admin",
            self.users.is_admin(username),
        )
        .await;

        match lookup {
            Ok(flag) => flag.unwrap_or(false),
            Err(e) => {
                warn!(user = %username, error = %e, "Admin check failed");
                false
            }
        }
    }

    /// Clears the identity cookies and ends every `tier` session of `username`.
    pub async fn logout<J>(&self, jar: &mut J, tier: SessionTier, username: &str) -> AppResult<u64>
    where
        J: CookieJar + ?Sized,
    {
        jar.clear(USERNAME_COOKIE);
        jar.clear(TOKEN_COOKIE);
        self.sessions.invalidate_sessions(tier, username).await
    }

    /// Ends every `tier` session of `username` without a client request.
    pub async fn revoke(&self, tier: SessionTier, username: &str) -> AppResult<u64> {
        let removed = self.sessions.invalidate_sessions(tier, username).await?;
        info!(tier = %tier, user = %username, removed, "Sessions revoked");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::cookie::MemoryCookieJar;
    use tollgate_core::error::ErrorKind;
    use crate::password::hasher::fast_hasher;
    use crate::session::MemoryBackend;
    use tollgate_entity::session::Session;

    /// Memory backend with call counting and switchable failures.
    #[derive(Debug, Default)]
    struct ScriptedBackend {
        inner: MemoryBackend,
        calls: AtomicUsize,
        fail_inserts: bool,
        fail_lookups: bool,
    }

    impl ScriptedBackend {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SessionBackend for ScriptedBackend {
        async fn insert_session(
            &self,
            tier: SessionTier,
            username: &str,
            token: &str,
            ttl: Duration,
        ) -> AppResult<Session> {
            self.touch();
            if self.fail_inserts {
                return Err(AppError::store_unavailable("insert failed"));
            }
            self.inner.insert_session(tier, username, token, ttl).await
        }

        async fn session_exists(
            &self,
            tier: SessionTier,
            username: &str,
            token: &str,
        ) -> AppResult<bool> {
            self.touch();
            if self.fail_lookups {
                return Err(AppError::store_unavailable("select failed"));
            }
            self.inner.session_exists(tier, username, token).await
        }

        async fn delete_sessions(&self, tier: SessionTier, username: &str) -> AppResult<u64> {
            self.touch();
            self.inner.delete_sessions(tier, username).await
        }

        async fn purge_expired(&self, tier: SessionTier) -> AppResult<u64> {
            self.touch();
            self.inner.purge_expired(tier).await
        }

        async fn count_active(&self, tier: SessionTier) -> AppResult<i64> {
            self.touch();
            self.inner.count_active(tier).await
        }
    }

    #[async_trait]
    impl UserDirectory for ScriptedBackend {
        async fn password_hash(
            &self,
            username: &str,
            tier: SessionTier,
        ) -> AppResult<Option<String>> {
            self.touch();
            if self.fail_lookups {
                return Err(AppError::store_unavailable("select failed"));
            }
            self.inner.password_hash(username, tier).await
        }

        async fn is_admin(&self, username: &str) -> AppResult<Option<bool>> {
            self.touch();
            if self.fail_lookups {
                return Err(AppError::store_unavailable("select failed"));
            }
            self.inner.is_admin(username).await
        }
    }

    struct Fixture {
        service: AuthenticationService,
        backend: Arc<ScriptedBackend>,
    }

    async fn fixture_with(scripted: ScriptedBackend) -> Fixture {
        let hasher = fast_hasher();
        scripted
            .inner
            .add_user("alice", &hasher.hash_password("pw1").unwrap(), false)
            .await;
        scripted
            .inner
            .add_user("root", &hasher.hash_password("pw-root").unwrap(), true)
            .await;

        let backend = Arc::new(scripted);
        let config = SessionConfig::default();
        let users: Arc<dyn UserDirectory> = backend.clone();
        let sessions = SessionStore::new(backend.clone(), config.clone());
        let service = AuthenticationService::new(users, sessions, hasher, config);
        Fixture { service, backend }
    }

    async fn fixture() -> Fixture {
        fixture_with(ScriptedBackend::default()).await
    }

    fn broken_entropy(_username: &str) -> AppResult<String> {
        Err(AppError::entropy_unavailable("no randomness"))
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();

        let session = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();

        assert_eq!(jar.get(USERNAME_COOKIE).as_deref(), Some("alice"));
        assert_eq!(jar.get(TOKEN_COOKIE), Some(session.token.clone()));
        assert!(fx.service.is_authenticated(&jar, SessionTier::User).await);
        assert!(!fx.service.is_authenticated(&jar, SessionTier::Admin).await);
        assert!(!fx.service.is_admin(&jar).await);
    }

    #[tokio::test]
    async fn test_cookie_attributes_follow_config() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();
        fx.service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();

        let cookie = jar.cookie(TOKEN_COOKIE).unwrap();
        assert!(cookie.attributes.http_only);
        assert!(cookie.attributes.secure);
        assert_eq!(cookie.attributes.path, "/");
        assert_eq!(cookie.attributes.max_age, Some(Duration::from_secs(3600)));
    }

    #[tokio::test]
    async fn test_empty_credentials_skip_store() {
        let fx = fixture().await;

        for (user, pass) in [("", "pw1"), ("alice", ""), ("", "")] {
            for tier in SessionTier::ALL {
                let mut jar = MemoryCookieJar::new();
                let err = fx
                    .service
                    .authenticate(&mut jar, user, pass, tier)
                    .await
                    .unwrap_err();
                assert_eq!(err.kind, ErrorKind::InvalidCredentials);
                assert_eq!(jar.get(TOKEN_COOKIE), None);
            }
        }

        assert_eq!(fx.backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_creates_nothing() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();

        let err = fx
            .service
            .authenticate(&mut jar, "alice", "nope", SessionTier::User)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
        assert_eq!(jar.get(USERNAME_COOKIE), None);
        assert_eq!(jar.get(TOKEN_COOKIE), None);
        assert_eq!(jar.get(MESSAGE_COOKIE).as_deref(), Some(LOGIN_FAILED_MESSAGE));
        assert_eq!(fx.backend.inner.row_count(SessionTier::User, "alice").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_matches_wrong_password() {
        let fx = fixture().await;
        let mut unknown = MemoryCookieJar::new();
        let mut wrong = MemoryCookieJar::new();

        let a = fx
            .service
            .authenticate(&mut unknown, "mallory", "pw1", SessionTier::User)
            .await
            .unwrap_err();
        let b = fx
            .service
            .authenticate(&mut wrong, "alice", "bad", SessionTier::User)
            .await
            .unwrap_err();

        assert_eq!(a.kind, b.kind);
        assert_eq!(a.message, b.message);
        assert_eq!(unknown.get(MESSAGE_COOKIE), wrong.get(MESSAGE_COOKIE));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_enter_admin_tier() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();

        let err = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::Admin)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
        assert_eq!(fx.backend.inner.row_count(SessionTier::Admin, "alice").await, 0);
        assert!(!fx.service.is_authenticated(&jar, SessionTier::Admin).await);
    }

    #[tokio::test]
    async fn test_admin_login_and_tier_isolation() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();

        fx.service
            .authenticate(&mut jar, "root", "pw-root", SessionTier::Admin)
            .await
            .unwrap();

        assert!(fx.service.is_authenticated(&jar, SessionTier::Admin).await);
        assert!(!fx.service.is_authenticated(&jar, SessionTier::User).await);
        assert!(fx.service.is_admin(&jar).await);
    }

    #[tokio::test]
    async fn test_is_admin_with_user_tier_session() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();

        fx.service
            .authenticate(&mut jar, "root", "pw-root", SessionTier::User)
            .await
            .unwrap();

        assert!(fx.service.is_admin(&jar).await);
        assert!(!fx.service.is_authenticated(&jar, SessionTier::Admin).await);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthenticated() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();
        let session = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();

        let only_token = MemoryCookieJar::from_request([(TOKEN_COOKIE, session.token.as_str())]);
        let only_name = MemoryCookieJar::from_request([(USERNAME_COOKIE, "alice")]);
        assert!(!fx.service.is_authenticated(&only_token, SessionTier::User).await);
        assert!(!fx.service.is_authenticated(&only_name, SessionTier::User).await);
    }

    #[tokio::test]
    async fn test_token_is_bound_to_username() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();
        let session = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();

        let forged = MemoryCookieJar::from_request([
            (USERNAME_COOKIE, "root"),
            (TOKEN_COOKIE, session.token.as_str()),
        ]);
        assert!(!fx.service.is_authenticated(&forged, SessionTier::User).await);
    }

    #[tokio::test]
    async fn test_logout_invalidates_all_tokens_in_tier() {
        let fx = fixture().await;
        let mut laptop = MemoryCookieJar::new();
        let mut phone = MemoryCookieJar::new();

        fx.service
            .authenticate(&mut laptop, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();
        fx.service
            .authenticate(&mut phone, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();
        assert!(fx.service.is_authenticated(&phone, SessionTier::User).await);

        let phone_before_logout = phone.clone();
        let removed = fx
            .service
            .logout(&mut laptop, SessionTier::User, "alice")
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert!(laptop.was_cleared(USERNAME_COOKIE));
        assert!(laptop.was_cleared(TOKEN_COOKIE));
        assert!(!fx.service.is_authenticated(&phone_before_logout, SessionTier::User).await);
    }

    #[tokio::test]
    async fn test_logout_without_sessions_is_ok() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();
        let removed = fx
            .service
            .logout(&mut jar, SessionTier::Admin, "alice")
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_revoke_spares_other_tier() {
        let fx = fixture().await;
        let mut user_jar = MemoryCookieJar::new();
        let mut admin_jar = MemoryCookieJar::new();
        fx.service
            .authenticate(&mut user_jar, "root", "pw-root", SessionTier::User)
            .await
            .unwrap();
        fx.service
            .authenticate(&mut admin_jar, "root", "pw-root", SessionTier::Admin)
            .await
            .unwrap();

        fx.service.revoke(SessionTier::Admin, "root").await.unwrap();

        assert!(fx.service.is_authenticated(&user_jar, SessionTier::User).await);
        assert!(!fx.service.is_authenticated(&admin_jar, SessionTier::Admin).await);
    }

    #[tokio::test]
    async fn test_store_failure_sets_no_identity_cookies() {
        let fx = fixture_with(ScriptedBackend {
            fail_inserts: true,
            ..Default::default()
        })
        .await;
        let mut jar = MemoryCookieJar::new();

        let err = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
        assert!(err.is_authentication_failure());
        assert_eq!(jar.get(USERNAME_COOKIE), None);
        assert_eq!(jar.get(TOKEN_COOKIE), None);
        assert_eq!(jar.get(MESSAGE_COOKIE).as_deref(), Some(LOGIN_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_invalid_credentials() {
        let fx = fixture_with(ScriptedBackend {
            fail_lookups: true,
            ..Default::default()
        })
        .await;
        let mut jar = MemoryCookieJar::new();

        let err = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
        assert!(!fx.service.check_admin("root").await);
    }

    #[tokio::test]
    async fn test_validation_store_error_fails_closed() {
        let fx = fixture_with(ScriptedBackend {
            fail_lookups: true,
            ..Default::default()
        })
        .await;
        let jar = MemoryCookieJar::from_request([(USERNAME_COOKIE, "alice"), (TOKEN_COOKIE, "x")]);

        assert!(!fx.service.is_authenticated(&jar, SessionTier::User).await);
        assert_eq!(fx.service.current_user(&jar, SessionTier::User).await, None);
    }

    #[tokio::test]
    async fn test_entropy_failure_aborts_login() {
        let fx = fixture().await;
        let service = fx.service.clone().with_token_minter(broken_entropy);
        let mut jar = MemoryCookieJar::new();

        let err = service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::EntropyUnavailable);
        assert_eq!(jar.get(TOKEN_COOKIE), None);
        assert_eq!(fx.backend.inner.row_count(SessionTier::User, "alice").await, 0);
    }

    #[tokio::test]
    async fn test_successful_login_clears_stale_message() {
        let fx = fixture().await;
        let mut jar = MemoryCookieJar::new();
        let _ = fx
            .service
            .authenticate(&mut jar, "alice", "bad", SessionTier::User)
            .await;
        assert!(jar.get(MESSAGE_COOKIE).is_some());

        fx.service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await
            .unwrap();
        assert_eq!(jar.get(MESSAGE_COOKIE), None);
    }

    #[tokio::test]
    async fn test_check_admin() {
        let fx = fixture().await;
        assert!(fx.service.check_admin("root").await);
        assert!(!fx.service.check_admin("alice").await);
        assert!(!fx.service.check_admin("nobody").await);
        assert!(!fx.service.check_admin("").await);
    }

    /// Jar that hands back values exactly as stored, empty ones included.
    #[derive(Default)]
    struct RawJar(HashMap<String, String>);

    impl CookieJar for RawJar {
        fn get(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }

        fn set(&mut self, cookie: SessionCookie) {
            self.0.insert(cookie.name, cookie.value);
        }

        fn clear(&mut self, name: &str) {
            self.0.remove(name);
        }
    }

    #[tokio::test]
    async fn test_every_rejection_costs_one_verification() {
        let fx = fixture().await;
        let hasher = fx.service.hasher.clone();
        let mut jar = MemoryCookieJar::new();

        let attempts = [
            ("alice", "wrong", SessionTier::User),
            ("mallory", "pw1", SessionTier::User),
            ("alice", "pw1", SessionTier::Admin),
            ("mallory", "pw1", SessionTier::Admin),
        ];
        for (n, (user, pass, tier)) in attempts.into_iter().enumerate() {
            let err = fx
                .service
                .authenticate(&mut jar, user, pass, tier)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidCredentials);
            assert_eq!(hasher.verification_count(), n + 1, "{user} in {tier}");
        }

        let _ = fx
            .service
            .authenticate(&mut jar, "", "pw1", SessionTier::User)
            .await;
        assert_eq!(hasher.verification_count(), attempts.len());
    }

    #[tokio::test]
    async fn test_lookup_failure_costs_one_verification() {
        let fx = fixture_with(ScriptedBackend {
            fail_lookups: true,
            ..Default::default()
        })
        .await;
        let hasher = fx.service.hasher.clone();
        let mut jar = MemoryCookieJar::new();

        let _ = fx
            .service
            .authenticate(&mut jar, "alice", "pw1", SessionTier::User)
            .await;
        assert_eq!(hasher.verification_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cookie_values_are_absent() {
        let fx = fixture().await;
        fx.backend
            .inner
            .insert_session_expiring_at(
                SessionTier::User,
                "alice",
                "",
                Utc::now() + chrono::Duration::hours(1),
            )
            .await
            .unwrap();

        let mut jar = RawJar::default();
        jar.0.insert(USERNAME_COOKIE.to_string(), "alice".to_string());
        jar.0.insert(TOKEN_COOKIE.to_string(), String::new());
        assert!(!fx.service.is_authenticated(&jar, SessionTier::User).await);
        assert_eq!(fx.service.current_user(&jar, SessionTier::User).await, None);

        let mut nameless = RawJar::default();
        nameless.0.insert(USERNAME_COOKIE.to_string(), String::new());
        assert!(!fx.service.is_admin(&nameless).await);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = AuthenticatedSession {
            session_id: Uuid::new_v4(),
            username: "alice".to_string(),
            token: "secret-token".to_string(),
            tier: SessionTier::User,
            expires_at: Utc::now(),
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("alice"));
    }
}
