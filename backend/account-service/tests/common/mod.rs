// Shared fixtures for account-service integration tests
#![allow(dead_code)]

use account_service::clock::{Clock, ManualClock};
use account_service::config::PasswordSettings;
use account_service::db::{InMemoryResetTokenStore, InMemoryUserStore};
use account_service::http::{build_router, AppState};
use account_service::security::{JwtSigner, PasswordHasher};
use account_service::services::{AdminService, CredentialService, ResetDelivery};
use account_service::Result;
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const TEST_ISSUER: &str = "account-service-test";
pub const RESET_WINDOW_MINUTES: i64 = 15;

/// Delivery that keeps every token it was asked to send
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingDelivery {
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ResetDelivery for RecordingDelivery {
    async fn deliver(&self, email: &str, token: &str, _expires_at: DateTime<Utc>) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

/// Services wired to in-memory stores and a manual clock
pub struct Harness {
    pub credentials: CredentialService,
    pub admin: AdminService,
    pub users: Arc<InMemoryUserStore>,
    pub reset_tokens: Arc<InMemoryResetTokenStore>,
    pub clock: Arc<ManualClock>,
    pub signer: Arc<JwtSigner>,
    pub delivery: Arc<RecordingDelivery>,
    pub allow_self_assigned_role: bool,
}

impl Harness {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let reset_tokens = Arc::new(InMemoryResetTokenStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let signer = Arc::new(JwtSigner::from_secret(TEST_SECRET, TEST_ISSUER, 3600).unwrap());
        let hasher = Arc::new(
            PasswordHasher::new(&PasswordSettings {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        );
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let credentials = CredentialService::new(
            users.clone(),
            reset_tokens.clone(),
            hasher.clone(),
            signer.clone(),
            dyn_clock.clone(),
            Duration::minutes(RESET_WINDOW_MINUTES),
        );
        let admin = AdminService::new(users.clone(), reset_tokens.clone(), hasher, dyn_clock);

        Self {
            credentials,
            admin,
            users,
            reset_tokens,
            clock,
            signer,
            delivery: Arc::new(RecordingDelivery::default()),
            allow_self_assigned_role: false,
        }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            credentials: self.credentials.clone(),
            admin: self.admin.clone(),
            signer: self.signer.clone(),
            delivery: self.delivery.clone(),
            allow_self_assigned_role: self.allow_self_assigned_role,
        };
        build_router(state, "http://localhost:4200")
    }

    pub fn bearer(&self, user_id: i64, username: &str, role: &str) -> String {
        format!(
            "Bearer {}",
            self.signer.issue(user_id, username, role).unwrap()
        )
    }
}
