use reqwest::Client;
use sqlx::migrate::Migrator;
use sqlx::mysql::MySqlPoolOptions;
use std::env;
use std::sync::Arc;
use tracing::info;

use crate::repositories::users::{InMemoryUserRepository, MySqlUserRepository, SharedUserRepository};
use crate::services::rate_service::{HttpRateProvider, ProviderKind, RateProvider};
use crate::utils::session::SessionSigner;
use crate::utils::symbols::CurrencySymbols;

// Embed migrations at compile time from ./migrations (next to Cargo.toml)
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<dyn RateProvider>,
    pub users: SharedUserRepository,
    pub symbols: Arc<CurrencySymbols>,
    /// `None` when the login gate is switched off.
    pub session: Option<SessionSigner>,
}

pub struct AppConfig {
    pub port: u16,
    pub external_timeout_ms: u64,
    pub provider: ProviderKind,
    pub rates_api_url: String,
    pub auth_required: bool,
    pub secret_key: Option<String>,
    pub database_url: Option<String>,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let port: u16 = env::var("PORT").unwrap_or_else(|_| "8080".into()).parse()?;
        let external_timeout_ms: u64 = env::var("EXTERNAL_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(12_000);

        let api_key = non_empty("API_KEY");
        let provider = match (non_empty("RATES_PROVIDER").as_deref(), api_key) {
            (Some("open-er-api"), _) | (None, None) => ProviderKind::OpenErApi,
            (Some("exchangerate-api"), Some(api_key)) | (None, Some(api_key)) => {
                ProviderKind::ExchangeRateApi { api_key }
            }
            (Some("exchangerate-api"), None) => {
                anyhow::bail!("API_KEY is required when RATES_PROVIDER=exchangerate-api")
            }
            (Some(other), _) => anyhow::bail!(
                "RATES_PROVIDER must be open-er-api or exchangerate-api, got `{}`",
                other
            ),
        };
        let rates_api_url =
            non_empty("RATES_API_URL").unwrap_or_else(|| provider.default_url().to_string());

        let auth_required = match env::var("AUTH_REQUIRED") {
            Ok(v) => v.parse::<bool>().map_err(|_| {
                anyhow::anyhow!("AUTH_REQUIRED must be true or false, got `{}`", v)
            })?,
            Err(_) => true,
        };
        let secret_key = non_empty("SECRET_KEY");
        if auth_required && secret_key.is_none() {
            anyhow::bail!("SECRET_KEY is required when AUTH_REQUIRED=true");
        }

        Ok(Self {
            port,
            external_timeout_ms,
            provider,
            rates_api_url,
            auth_required,
            secret_key,
            database_url: non_empty("DATABASE_URL"),
        })
    }

    pub async fn build_state(&self) -> Result<AppState, anyhow::Error> {
        // http client
        let http = Client::builder()
            .timeout(std::time::Duration::from_millis(self.external_timeout_ms))
            .build()?;
        let rates = HttpRateProvider::new(http, &self.rates_api_url, self.provider.clone());

        let users: SharedUserRepository = match &self.database_url {
            Some(url) => {
                let pool = MySqlPoolOptions::new().max_connections(10).connect(url).await?;

                // run embedded migrations (creates/uses `_sqlx_migrations` table; idempotent)
                MIGRATOR
                    .run(&pool)
                    .await
                    .map_err(|e| anyhow::anyhow!("migrations failed: {}", e))?;
                info!("✅ User store: MySQL, migrations up to date");
                Arc::new(MySqlUserRepository::new(pool))
            }
            None => {
                info!("User store: in-memory (accounts are lost on restart)");
                Arc::new(InMemoryUserRepository::new())
            }
        };

        let session = match (&self.secret_key, self.auth_required) {
            (Some(key), true) => Some(
                SessionSigner::new(key)
                    .map_err(|e| anyhow::anyhow!("SECRET_KEY unusable: {}", e))?,
            ),
            (None, true) => anyhow::bail!("SECRET_KEY is required when AUTH_REQUIRED=true"),
            (_, false) => None,
        };

        let symbols = CurrencySymbols::builtin();
        info!("Loaded {} currency symbols", symbols.len());

        Ok(AppState {
            rates: Arc::new(rates),
            users,
            symbols: Arc::new(symbols),
            session,
        })
    }
}
