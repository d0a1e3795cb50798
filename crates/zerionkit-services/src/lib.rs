//! High-level client for the Zerion REST API.
//!
//! [`Zerion`] owns one shared transport and hands out domain services for
//! wallets, fungibles, chains, swaps, NFTs and gas prices:
//!
//! ```no_run
//! use zerionkit_services::Zerion;
//!
//! # async fn demo() -> Result<(), zerionkit_core::ApiError> {
//! let client = Zerion::new("zk_dev_abc123")?;
//! let chains = client.chains().chains(true).await?;
//! println!("{} chains supported", chains.len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use zerionkit_core::{ApiEnv, ApiError, ApiTransport, ClientConfig};
use zerionkit_http::HttpTransport;

use crate::models::{Chain, Fungible};

pub mod chains;
pub mod fungibles;
pub mod gas;
pub mod models;
pub mod nfts;
pub mod swap;
pub mod validate;
pub mod wallets;

pub use chains::{ChainStats, ChainsService, CHAINS_CACHE_TTL};
pub use fungibles::{FungiblesQuery, FungiblesService, SORT_MARKET_CAP_DESC};
pub use gas::{CostEstimate, GasPricesFilter, GasService, GAS_CACHE_TTL};
pub use nfts::NftsService;
pub use swap::{OfferSort, SwapDirection, SwapFungiblesQuery, SwapOffersQuery, SwapService, SwapSide};
pub use validate::{is_valid_address, normalize_address, NftReference};
pub use wallets::{
    ActivitySnapshot, ChainScope, ChartPeriod, NftPositionsQuery, PositionFilter, PositionsQuery,
    TransactionsQuery, TrashFilter, WalletSummary, WalletsService,
};

/// Overall verdict of [`Zerion::health_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Every probed endpoint answered.
    Healthy,
    /// Some endpoints answered, some did not.
    Degraded,
    /// No probed endpoint answered.
    Unhealthy,
}

/// Result of probing a couple of cheap endpoints.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub status: Health,
    /// Per-endpoint probe outcome, keyed by service name.
    pub services: HashMap<&'static str, bool>,
    pub response_time: Duration,
}

/// Cross-service snapshot of the market, see [`Zerion::market_overview`].
#[derive(Debug, Clone)]
pub struct MarketOverview {
    /// Top 50 assets by market cap.
    pub top_assets: Vec<Fungible>,
    /// Biggest movers over the last day.
    pub trending: Vec<Fungible>,
    pub popular_chains: Vec<Chain>,
    pub total_chains: usize,
}

/// Entry point tying every service to one shared transport.
pub struct Zerion {
    transport: Arc<dyn ApiTransport>,
    wallets: WalletsService,
    fungibles: FungiblesService,
    chains: ChainsService,
    swap: SwapService,
    nfts: NftsService,
    gas: GasService,
}

impl Zerion {
    /// Builds a client with default settings for the given API key.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::new(api_key)?)
    }

    /// Builds a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(&config)?)))
    }

    /// Builds a client over a caller-supplied transport. Intended for
    /// tests and custom wire stacks.
    pub fn with_transport(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            wallets: WalletsService::new(Arc::clone(&transport)),
            fungibles: FungiblesService::new(Arc::clone(&transport)),
            chains: ChainsService::new(Arc::clone(&transport)),
            swap: SwapService::new(Arc::clone(&transport)),
            nfts: NftsService::new(Arc::clone(&transport)),
            gas: GasService::new(Arc::clone(&transport)),
            transport,
        }
    }

    pub fn wallets(&self) -> &WalletsService {
        &self.wallets
    }

    pub fn fungibles(&self) -> &FungiblesService {
        &self.fungibles
    }

    pub fn chains(&self) -> &ChainsService {
        &self.chains
    }

    pub fn swap(&self) -> &SwapService {
        &self.swap
    }

    pub fn nfts(&self) -> &NftsService {
        &self.nfts
    }

    pub fn gas(&self) -> &GasService {
        &self.gas
    }

    /// Switches between production and testnet data. Takes effect on the
    /// next request; in-flight requests keep the settings they started
    /// with.
    pub fn set_environment(&self, env: ApiEnv) {
        self.transport.set_environment(env);
    }

    /// Adjusts the per-request timeout for subsequent requests.
    pub fn set_timeout(&self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    /// Adjusts the retry budget, and optionally the backoff base delay,
    /// for subsequent requests.
    pub fn set_retries(&self, retries: u32, delay: Option<Duration>) {
        self.transport.set_retries(retries, delay);
    }

    /// Fetches top assets, trending assets and chain data concurrently
    /// into one market snapshot.
    pub async fn market_overview(&self) -> Result<MarketOverview, ApiError> {
        let (top_assets, trending, popular_chains, all_chains) = futures::try_join!(
            self.fungibles.top(50),
            self.fungibles.trending("1d", 20),
            self.chains.popular_chains(),
            self.chains.chains(true),
        )?;
        Ok(MarketOverview {
            top_assets,
            trending,
            popular_chains,
            total_chains: all_chains.len(),
        })
    }

    /// Summarizes several wallets concurrently. Failures are kept
    /// per-address; one broken wallet does not sink the batch.
    pub async fn batch_wallet_summaries(
        &self,
        addresses: &[String],
    ) -> HashMap<String, Result<WalletSummary, ApiError>> {
        let lookups = addresses.iter().map(|address| async move {
            (address.clone(), self.wallets.summary(address).await)
        });
        futures::future::join_all(lookups).await.into_iter().collect()
    }

    /// Probes the chains and gas endpoints concurrently and grades the
    /// API's reachability.
    pub async fn health_status(&self) -> HealthStatus {
        let started = Instant::now();
        let (chains, gas) = futures::join!(self.chains.chains(false), self.gas.gas_prices(None));

        let mut services = HashMap::new();
        services.insert("chains", chains.is_ok());
        services.insert("gas_prices", gas.is_ok());

        let up = services.values().filter(|ok| **ok).count();
        let status = if up == services.len() {
            Health::Healthy
        } else if up > 0 {
            Health::Degraded
        } else {
            Health::Unhealthy
        };

        HealthStatus {
            status,
            services,
            response_time: started.elapsed(),
        }
    }
}
