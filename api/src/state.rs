//! Application state and backend wiring
//!
//! Every store is chosen at startup from `StorageConfig` and held behind
//! its trait object, so handlers are not generic over backends.

use anyhow::{bail, Context};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use dl_core::{
    AccountRepository, AccountService, AccountServiceConfig, EmailDispatcher, ExpiredCodeSweeper,
    InMemoryAccountRepository, InMemoryOtpRepository, InMemoryRateLimiter, OtpRepository,
    OtpService, OtpServiceConfig, RateLimiterTrait, SweepConfig,
};
use dl_infra::cache::{RedisClient, RedisOtpRepository};
use dl_infra::database::{DatabasePool, MySqlAccountRepository, MySqlOtpRepository};
use dl_infra::email::create_dispatcher;
use dl_infra::services::RedisRateLimiter;
use dl_shared::config::{AppConfig, StoreBackend};

pub type DynOtpService = OtpService<dyn OtpRepository, dyn EmailDispatcher>;
pub type DynAccountService =
    AccountService<dyn OtpRepository, dyn EmailDispatcher, dyn AccountRepository>;

/// The stores and sinks the services run on
pub struct Backends {
    pub otp_repository: Arc<dyn OtpRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub dispatcher: Arc<dyn EmailDispatcher>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}

impl Backends {
    /// Process-local stores around the given dispatcher
    pub fn in_memory(config: &AppConfig, dispatcher: Arc<dyn EmailDispatcher>) -> Self {
        Self {
            otp_repository: Arc::new(InMemoryOtpRepository::new()),
            accounts: Arc::new(InMemoryAccountRepository::new()),
            dispatcher,
            rate_limiter: Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())),
        }
    }
}

/// Connections probed by the health endpoint
#[derive(Default, Clone)]
pub struct Connections {
    pub redis: Option<Arc<RedisClient>>,
    pub database: Option<Arc<DatabasePool>>,
}

/// Shared state handed to every handler
pub struct AppState {
    pub config: AppConfig,
    pub otp_service: Arc<DynOtpService>,
    pub account_service: Arc<DynAccountService>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
    pub connections: Connections,
}

impl AppState {
    pub fn new(config: AppConfig, backends: Backends, account_config: AccountServiceConfig) -> Self {
        let otp_service = Arc::new(OtpService::new(
            backends.otp_repository,
            backends.dispatcher,
            OtpServiceConfig::from(&config.otp),
        ));
        let account_service = Arc::new(AccountService::new(
            otp_service.clone(),
            backends.accounts,
            account_config,
        ));

        Self {
            config,
            otp_service,
            account_service,
            rate_limiter: backends.rate_limiter,
            connections: Connections::default(),
        }
    }

    pub fn with_connections(mut self, connections: Connections) -> Self {
        self.connections = connections;
        self
    }
}

/// Running application: state plus the background tasks it owns
pub struct Bootstrapped {
    pub state: AppState,
    pub sweeper: Option<JoinHandle<()>>,
}

/// Connect the configured backends and assemble the state
///
/// The sweeper is started for code stores without native expiry.
pub async fn bootstrap(config: AppConfig) -> anyhow::Result<Bootstrapped> {
    let storage = config.storage.clone();
    let mut connections = Connections::default();

    if storage.needs_redis() {
        let client = RedisClient::new(config.cache.clone())
            .await
            .context("connecting to Redis")?;
        connections.redis = Some(Arc::new(client));
    }

    if storage.needs_mysql() {
        let pool = DatabasePool::new(&config.database)
            .await
            .context("connecting to MySQL")?;
        pool.run_migrations()
            .await
            .context("running database migrations")?;
        connections.database = Some(Arc::new(pool));
    }

    let otp_repository: Arc<dyn OtpRepository> = match storage.otp {
        StoreBackend::Memory => Arc::new(InMemoryOtpRepository::new()),
        StoreBackend::Redis => Arc::new(RedisOtpRepository::new(redis(&connections)?)),
        StoreBackend::Mysql => Arc::new(MySqlOtpRepository::new(
            database(&connections)?.get_pool().clone(),
        )),
    };

    let accounts: Arc<dyn AccountRepository> = match storage.accounts {
        StoreBackend::Memory => Arc::new(InMemoryAccountRepository::new()),
        StoreBackend::Mysql => Arc::new(MySqlAccountRepository::new(
            database(&connections)?.get_pool().clone(),
        )),
        StoreBackend::Redis => bail!("accounts cannot be stored in Redis"),
    };

    let rate_limiter: Arc<dyn RateLimiterTrait> = match storage.rate_limit {
        StoreBackend::Memory => Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())),
        StoreBackend::Redis => Arc::new(RedisRateLimiter::new(
            redis(&connections)?,
            config.rate_limit.clone(),
        )),
        StoreBackend::Mysql => bail!("rate limit windows cannot be stored in MySQL"),
    };

    let dispatcher = create_dispatcher(&config.email, config.otp.code_ttl_minutes)
        .context("configuring email delivery")?;

    let sweeper = if storage.otp == StoreBackend::Redis {
        None
    } else {
        Arc::new(ExpiredCodeSweeper::new(
            otp_repository.clone(),
            SweepConfig::from(&config.otp),
        ))
        .start_background_task()
    };

    info!(
        otp_store = %storage.otp,
        rate_limit_store = %storage.rate_limit,
        account_store = %storage.accounts,
        rate_limit_enforced = config.rate_limit.is_enforced(config.environment),
        "Backends ready"
    );

    let backends = Backends {
        otp_repository,
        accounts,
        dispatcher,
        rate_limiter,
    };
    let state = AppState::new(config, backends, AccountServiceConfig::default())
        .with_connections(connections);

    Ok(Bootstrapped { state, sweeper })
}

fn redis(connections: &Connections) -> anyhow::Result<Arc<RedisClient>> {
    connections
        .redis
        .clone()
        .context("Redis connection was not initialized")
}

fn database(connections: &Connections) -> anyhow::Result<Arc<DatabasePool>> {
    connections
        .database
        .clone()
        .context("MySQL pool was not initialized")
}
