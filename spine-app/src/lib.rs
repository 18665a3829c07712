//! Application bootstrap for the Spine hostname registry.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter
//! injection), the `SeaORM`-backed `SqlStore`, configuration and telemetry.

pub mod adapters;
pub mod config;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use spine_core::error::{CoreError, CoreResult};
use spine_core::services::{
    DEFAULT_CACHE_TTL, DomainService, RegistrationOptions, RegistrationService, ServiceContext,
};
use spine_core::traits::{RecordStore, ReconciliationJournal};
use spine_provider::{CloudflareProvider, CnameProvider};

use adapters::SqlStore;
use config::SpineConfig;

/// Application state.
///
/// Holds all services and the `ServiceContext`. Frontends construct this once
/// at startup via `AppStateBuilder` (or `AppState::from_config`).
pub struct AppState {
    /// Service context (holds the store, provider and journal)
    pub ctx: Arc<ServiceContext>,
    /// Root-domain availability
    pub domain_service: Arc<DomainService>,
    /// Host registration / deletion
    pub registration_service: RegistrationService,
}

impl AppState {
    /// Connect the SQL store and Cloudflare provider described by `config`.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if the database is unreachable, or a
    /// provider error if the HTTP client cannot be built.
    pub async fn from_config(config: &SpineConfig) -> CoreResult<Self> {
        let store = Arc::new(SqlStore::connect(&config.database.url).await?);
        let provider = CloudflareProvider::with_timeout(
            config.cloudflare.api_token.clone(),
            config.request_timeout(),
        )?
        .with_availability_tag(config.cloudflare.availability_tag.clone())
        .with_proxied(config.cloudflare.proxied);

        AppStateBuilder::new()
            .record_store(store.clone())
            .journal(store)
            .provider(Arc::new(provider))
            .options(config.registration_options())
            .cache_ttl(config.cache_ttl())
            .build()
    }

    /// Startup checks: provider credentials and the root-domain cache.
    ///
    /// Failures are logged, not returned; registrations report their own errors.
    pub async fn run_startup(&self) {
        match self.ctx.provider().validate_credentials().await {
            Ok(true) => log::info!("Provider '{}' credentials valid", self.ctx.provider().id()),
            Ok(false) => log::warn!(
                "Provider '{}' rejected the configured credentials",
                self.ctx.provider().id()
            ),
            Err(e) => log::warn!("Failed to validate provider credentials: {e}"),
        }

        match self.domain_service.list_available().await {
            Ok(domains) => log::info!("{} root domain(s) available", domains.len()),
            Err(e) => log::warn!("Failed to load available root domains: {e}"),
        }
    }
}

/// Builder for `AppState`.
///
/// Frontends inject their storage and provider implementations here.
pub struct AppStateBuilder {
    record_store: Option<Arc<dyn RecordStore>>,
    provider: Option<Arc<dyn CnameProvider>>,
    journal: Option<Arc<dyn ReconciliationJournal>>,
    options: RegistrationOptions,
    cache_ttl: Duration,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            record_store: None,
            provider: None,
            journal: None,
            options: RegistrationOptions::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    #[must_use]
    pub fn record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn CnameProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn journal(mut self, journal: Arc<dyn ReconciliationJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    #[must_use]
    pub fn options(mut self, options: RegistrationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let record_store = self
            .record_store
            .ok_or_else(|| CoreError::ValidationError("record_store is required".to_string()))?;
        let provider = self
            .provider
            .ok_or_else(|| CoreError::ValidationError("provider is required".to_string()))?;
        let journal = self
            .journal
            .ok_or_else(|| CoreError::ValidationError("journal is required".to_string()))?;

        let ctx = Arc::new(ServiceContext::new(record_store, provider, journal));
        let domain_service = Arc::new(DomainService::new(Arc::clone(&ctx), self.cache_ttl));
        let registration_service = RegistrationService::new(
            Arc::clone(&ctx),
            Arc::clone(&domain_service),
            self.options,
        );

        Ok(AppState {
            ctx,
            domain_service,
            registration_service,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
