use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::models::conversion::RateTable;
use crate::types::external::{ErRates, ExrLatest};

#[derive(Error, Debug)]
pub enum RateError {
    /// DNS, refused connection, timeout or a non-2xx status.
    #[error("transport: {0}")]
    Transport(String),
    /// The provider answered but reported something other than success.
    #[error("provider reported `{0}`")]
    Provider(String),
    #[error("decode: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Every rate quoted for `base`. One outbound call, never cached.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, RateError>;
}

/// Which response contract the configured provider speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// `GET {url}/{base}` → `{ "rates": {..} }`, no key.
    OpenErApi,
    /// `GET {url}/{key}/latest/{base}` → `{ "result": "success", "conversion_rates": {..} }`.
    ExchangeRateApi { api_key: String },
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenErApi => "open-er-api",
            ProviderKind::ExchangeRateApi { .. } => "exchangerate-api",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenErApi => "https://open.er-api.com/v6/latest",
            ProviderKind::ExchangeRateApi { .. } => "https://v6.exchangerate-api.com/v6",
        }
    }
}

pub struct HttpRateProvider {
    http: Client,
    base_url: String,
    kind: ProviderKind,
}

impl HttpRateProvider {
    pub fn new(http: Client, base_url: &str, kind: ProviderKind) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            kind,
        }
    }

    fn url_for(&self, base: &str) -> String {
        match &self.kind {
            ProviderKind::OpenErApi => format!("{}/{}", self.base_url, base),
            ProviderKind::ExchangeRateApi { api_key } => {
                format!("{}/{}/latest/{}", self.base_url, api_key, base)
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, RateError> {
        self.http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RateError::Transport(e.without_url().to_string()))?
            .json()
            .await
            .map_err(|e| RateError::Decode(e.without_url().to_string()))
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    #[instrument(name = "fetch_rates", skip(self))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, RateError> {
        let url = self.url_for(base);
        let logged = match &self.kind {
            ProviderKind::ExchangeRateApi { api_key } => url.replace(api_key.as_str(), "***"),
            ProviderKind::OpenErApi => url.clone(),
        };
        debug!("Requesting rates from {}", logged);

        let rates = match &self.kind {
            ProviderKind::OpenErApi => self.get_json::<ErRates>(&url).await.map(|b| b.rates),
            ProviderKind::ExchangeRateApi { .. } => {
                self.get_json::<ExrLatest>(&url).await.and_then(|b| {
                    if b.result == "success" {
                        Ok(b.conversion_rates)
                    } else {
                        Err(RateError::Provider(b.error_type.unwrap_or(b.result)))
                    }
                })
            }
        };

        match rates {
            Ok(rates) => {
                let table = RateTable { base: base.to_string(), rates };
                debug!("{} rates quoted against {}", table.rates.len(), table.base);
                Ok(table)
            }
            Err(e) => {
                error!("Error fetching rates for {}: {}", base, e);
                Err(e)
            }
        }
    }
}
