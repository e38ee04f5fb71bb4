//! Shared setup for the API tests

use std::sync::Arc;

use actix_web::web;

use dl_api::{AppState, Backends};
use dl_core::{
    Account, AccountServiceConfig, InMemoryAccountRepository, InMemoryOtpRepository,
    InMemoryRateLimiter, RateLimiterTrait,
};
use dl_infra::email::{EmailTemplates, MockEmailDispatcher};
use dl_shared::config::AppConfig;

pub const MEMBER_EMAIL: &str = "ada@devlink.io";
pub const ORIGINAL_HASH: &str = "$2b$04$original-hash-placeholder";

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub mailer: MockEmailDispatcher,
    pub accounts: Arc<InMemoryAccountRepository>,
}

impl TestContext {
    pub fn new(config: AppConfig) -> Self {
        let rate_limiter = Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));
        Self::with_rate_limiter(config, rate_limiter)
    }

    pub fn with_rate_limiter(config: AppConfig, rate_limiter: Arc<dyn RateLimiterTrait>) -> Self {
        let mailer = MockEmailDispatcher::new(EmailTemplates::new("DevLink", 10));
        let accounts = Arc::new(InMemoryAccountRepository::with_accounts([Account::new(
            MEMBER_EMAIL.to_string(),
            "Ada".to_string(),
            ORIGINAL_HASH.to_string(),
        )]));

        let backends = Backends {
            otp_repository: Arc::new(InMemoryOtpRepository::new()),
            accounts: accounts.clone(),
            dispatcher: Arc::new(mailer.clone()),
            rate_limiter,
        };
        let state = AppState::new(config, backends, AccountServiceConfig { bcrypt_cost: 4 });

        Self {
            state: web::Data::new(state),
            mailer,
            accounts,
        }
    }

    /// Codes mailed to `email`, oldest first
    pub fn codes_for(&self, email: &str) -> Vec<String> {
        self.mailer
            .sent()
            .iter()
            .filter(|mail| mail.to == email)
            .filter_map(|mail| {
                mail.message
                    .text
                    .split_whitespace()
                    .find(|word| word.len() == 6 && word.chars().all(|c| c.is_ascii_digit()))
                    .map(str::to_string)
            })
            .collect()
    }

    /// Code in the most recent mail to `email`
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.codes_for(email).pop()
    }
}
