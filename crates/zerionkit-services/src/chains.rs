//! Chain metadata lookups backed by a short-lived cache.
//!
//! The chain list changes rarely, so every derived query (name search,
//! trading support, L2 membership) reads through a single cached copy of
//! `GET /v1/chains/` rather than hitting the wire each time.

use std::sync::Arc;
use std::time::Duration;

use zerionkit_core::{ApiError, ApiTransport, ApiTransportExt, Document, TtlCache};

use crate::models::Chain;

/// How long a fetched chain list stays fresh.
pub const CHAINS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const CHAINS_PATH: &str = "/v1/chains/";
const ALL_CHAINS_KEY: &str = "all";

/// External ids of the chains surfaced by [`ChainsService::popular_chains`],
/// in display order.
const POPULAR_EXTERNAL_IDS: &[&str] = &[
    "1",     // Ethereum
    "137",   // Polygon
    "56",    // BNB Smart Chain
    "43114", // Avalanche
    "250",   // Fantom
    "42161", // Arbitrum One
    "10",    // Optimism
    "100",   // Gnosis
    "1285",  // Moonriver
    "25",    // Cronos
];

const L2_EXTERNAL_IDS: &[&str] = &[
    "42161",  // Arbitrum One
    "10",     // Optimism
    "137",    // Polygon
    "324",    // zkSync Era
    "1101",   // Polygon zkEVM
    "8453",   // Base
    "59144",  // Linea
    "534352", // Scroll
];

const TESTNET_NAME_PATTERNS: &[&str] = &[
    "testnet", "test", "goerli", "ropsten", "rinkeby", "kovan", "sepolia", "mumbai",
];

/// Aggregate counts over the supported chain set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStats {
    pub total: usize,
    pub mainnet: usize,
    pub testnet: usize,
    pub trading: usize,
    pub l2: usize,
}

pub struct ChainsService {
    transport: Arc<dyn ApiTransport>,
    cache: TtlCache<String, Vec<Chain>>,
}

impl ChainsService {
    pub(crate) fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            cache: TtlCache::new(CHAINS_CACHE_TTL),
        }
    }

    /// Lists every chain the API knows about. With `use_cache` a list
    /// fetched within the last five minutes is returned without a request.
    pub async fn chains(&self, use_cache: bool) -> Result<Vec<Chain>, ApiError> {
        if use_cache {
            if let Some(hit) = self.cache.get(&ALL_CHAINS_KEY.to_string()) {
                tracing::debug!(chains = hit.len(), "chain list served from cache");
                return Ok(hit);
            }
        }

        let doc: Document<Vec<Chain>> = self.transport.get_json(CHAINS_PATH).await?;
        self.cache.set(ALL_CHAINS_KEY.to_string(), doc.data.clone());
        Ok(doc.data)
    }

    /// Fetches a single chain by its Zerion id (e.g. `"ethereum"`).
    pub async fn chain(&self, chain_id: &str) -> Result<Chain, ApiError> {
        if chain_id.is_empty() {
            return Err(ApiError::Validation("chain_id is required".into()));
        }
        let doc: Document<Chain> = self
            .transport
            .get_json(&format!("{CHAINS_PATH}{chain_id}"))
            .await?;
        Ok(doc.data)
    }

    /// Case-insensitive substring search over chain names.
    pub async fn find_chains_by_name(&self, name: &str) -> Result<Vec<Chain>, ApiError> {
        let needle = name.to_lowercase();
        let chains = self.chains(true).await?;
        Ok(chains
            .into_iter()
            .filter(|c| c.attributes.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Looks a chain up by its external (EIP-155) id, e.g. `"1"` for
    /// Ethereum mainnet.
    pub async fn chain_by_external_id(&self, external_id: &str) -> Result<Option<Chain>, ApiError> {
        let chains = self.chains(true).await?;
        Ok(chains
            .into_iter()
            .find(|c| c.attributes.external_id == external_id))
    }

    /// Chains whose flags report trading support.
    pub async fn trading_chains(&self) -> Result<Vec<Chain>, ApiError> {
        let chains = self.chains(true).await?;
        Ok(chains
            .into_iter()
            .filter(|c| c.attributes.flags.supports_trading)
            .collect())
    }

    /// Chains that do not look like testnets, judged by name.
    pub async fn mainnet_chains(&self) -> Result<Vec<Chain>, ApiError> {
        let chains = self.chains(true).await?;
        Ok(chains
            .into_iter()
            .filter(|c| !is_testnet_name(&c.attributes.name))
            .collect())
    }

    /// A fixed set of widely-used chains, ordered by prominence.
    pub async fn popular_chains(&self) -> Result<Vec<Chain>, ApiError> {
        let chains = self.chains(true).await?;
        let mut popular: Vec<Chain> = chains
            .into_iter()
            .filter(|c| POPULAR_EXTERNAL_IDS.contains(&c.attributes.external_id.as_str()))
            .collect();
        popular.sort_by_key(|c| {
            POPULAR_EXTERNAL_IDS
                .iter()
                .position(|id| *id == c.attributes.external_id)
        });
        Ok(popular)
    }

    /// Known layer-2 networks.
    pub async fn l2_chains(&self) -> Result<Vec<Chain>, ApiError> {
        let chains = self.chains(true).await?;
        Ok(chains
            .into_iter()
            .filter(|c| L2_EXTERNAL_IDS.contains(&c.attributes.external_id.as_str()))
            .collect())
    }

    /// Drops the cached list and fetches a fresh one.
    pub async fn refresh_cache(&self) -> Result<(), ApiError> {
        self.cache.clear();
        self.chains(false).await?;
        Ok(())
    }

    /// Counts of mainnet/testnet/trading/L2 chains in one pass.
    pub async fn chain_stats(&self) -> Result<ChainStats, ApiError> {
        let chains = self.chains(true).await?;
        let mut stats = ChainStats {
            total: chains.len(),
            mainnet: 0,
            testnet: 0,
            trading: 0,
            l2: 0,
        };
        for chain in &chains {
            if is_testnet_name(&chain.attributes.name) {
                stats.testnet += 1;
            } else {
                stats.mainnet += 1;
            }
            if chain.attributes.flags.supports_trading {
                stats.trading += 1;
            }
            if L2_EXTERNAL_IDS.contains(&chain.attributes.external_id.as_str()) {
                stats.l2 += 1;
            }
        }
        Ok(stats)
    }

    /// Whether the given Zerion chain id is currently supported.
    pub async fn is_supported(&self, chain_id: &str) -> Result<bool, ApiError> {
        let chains = self.chains(true).await?;
        Ok(chains.iter().any(|c| c.id == chain_id))
    }
}

fn is_testnet_name(name: &str) -> bool {
    let name = name.to_lowercase();
    TESTNET_NAME_PATTERNS.iter().any(|p| name.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testnet_names_are_recognized() {
        assert!(is_testnet_name("Ethereum Sepolia"));
        assert!(is_testnet_name("Polygon Mumbai Testnet"));
        assert!(!is_testnet_name("Ethereum"));
        assert!(!is_testnet_name("Arbitrum One"));
    }

    #[test]
    fn popular_ordering_is_stable() {
        assert_eq!(POPULAR_EXTERNAL_IDS[0], "1");
        assert!(POPULAR_EXTERNAL_IDS.len() >= L2_EXTERNAL_IDS.len());
    }
}
