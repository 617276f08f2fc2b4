//! Session stub standing in for a real authentication backend.
//!
//! Every remote-looking call sleeps for the configured latency before it
//! touches state. The store is borrowed mutably across that sleep, so a
//! pending call can never be observed as applied. Only the configured demo
//! account can log in; sign-up accepts anyone.

use crate::config::AuthConfig;
use crate::observable::{Observable, SubscriptionId};
use crate::snapshot::{Snapshot, AUTH_NAMESPACE};
use crate::{AuthSession, Error, Origin, Result, User, UserPatch};
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Id assigned to the built-in demo account
pub const DEMO_USER_ID: &str = "1";

#[derive(Debug)]
pub struct AuthStore {
    state: Observable<AuthSession>,
    config: AuthConfig,
    snapshot: Option<Snapshot>,
}

impl AuthStore {
    /// In-memory session, nothing persisted
    pub fn new(config: AuthConfig) -> Self {
        Self {
            state: Observable::default(),
            config,
            snapshot: None,
        }
    }

    /// Session restored from, and saved to, the `auth-storage` snapshot
    pub fn open(data_dir: &Path, config: AuthConfig) -> Result<Self> {
        let snapshot = Snapshot::in_dir(data_dir, AUTH_NAMESPACE);
        let session: AuthSession = snapshot.load_or_default()?;
        if let Some(user) = &session.user {
            tracing::debug!("Restored session for {}", user.email);
        }
        Ok(Self {
            state: Observable::new(session),
            config,
            snapshot: Some(snapshot),
        })
    }

    pub fn session(&self) -> &AuthSession {
        self.state.get()
    }

    pub fn user(&self) -> Option<&User> {
        self.state.get().user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.get().is_authenticated
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthSession, Origin) + Send + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        self.simulate_latency().await;

        if email != self.config.demo_email || password != self.config.demo_password {
            tracing::info!("Rejected login for {}", email);
            return Err(Error::InvalidCredentials);
        }

        let user = User {
            id: DEMO_USER_ID.into(),
            email: email.to_string(),
            name: self.config.demo_name.clone(),
        };
        self.set_user(Some(user.clone()))?;
        tracing::info!("Logged in as {}", user.email);
        Ok(user)
    }

    pub async fn signup(&mut self, email: &str, _password: &str, name: &str) -> Result<User> {
        self.simulate_latency().await;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
        };
        self.set_user(Some(user.clone()))?;
        tracing::info!("Signed up {} ({})", user.email, user.id);
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.set_user(None)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Merge `patch` into the signed-in user. Signed out, this is a no-op.
    pub async fn update_profile(&mut self, patch: UserPatch) -> Result<Option<User>> {
        self.simulate_latency().await;

        let Some(mut user) = self.state.get().user.clone() else {
            tracing::debug!("Ignoring profile update while signed out");
            return Ok(None);
        };
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        self.set_user(Some(user.clone()))?;
        Ok(Some(user))
    }

    /// Pretend to send password reset instructions
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.simulate_latency().await;
        tracing::info!("Password reset requested for {}", email);
        Ok(())
    }

    fn set_user(&mut self, user: Option<User>) -> Result<()> {
        self.state.update(Origin::User, |session| {
            session.is_authenticated = user.is_some();
            session.user = user;
            session.updated_at = Some(Utc::now());
        });
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        match &self.snapshot {
            Some(snapshot) => snapshot.save(self.state.get()),
            None => Ok(()),
        }
    }

    async fn simulate_latency(&self) {
        let delay = self.config.simulated_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
