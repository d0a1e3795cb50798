//! Gas price queries with a 30-second read-through cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use zerionkit_core::{
    ApiError, ApiTransport, ApiTransportExt, CacheStats, Document, QueryParams, TtlCache,
};

use crate::models::{GasPrice, GasType};

/// Gas prices go stale quickly; cache entries live for 30 seconds.
pub const GAS_CACHE_TTL: Duration = Duration::from_secs(30);

const GAS_PRICES_PATH: &str = "/v1/gas-prices/";

/// Filters accepted by the gas price listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct GasPricesFilter {
    pub chain_ids: Vec<String>,
    pub gas_types: Vec<GasType>,
}

impl GasPricesFilter {
    fn query(&self) -> QueryParams {
        let types: Vec<&str> = self.gas_types.iter().map(|t| t.as_str()).collect();
        QueryParams::new()
            .filter_list("chain_ids", &self.chain_ids)
            .filter_list("gas_types", &types)
    }
}

/// Cost of a transaction at the current standard gas price, in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEstimate {
    pub gas_price_wei: u128,
    pub gas_limit: u64,
    pub total_wei: u128,
    /// When the underlying price sample was taken.
    pub updated_at: i64,
}

pub struct GasService {
    transport: Arc<dyn ApiTransport>,
    cache: TtlCache<String, Vec<GasPrice>>,
}

impl GasService {
    pub(crate) fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            cache: TtlCache::new(GAS_CACHE_TTL),
        }
    }

    /// Lists gas prices, optionally filtered by chain or gas type.
    pub async fn gas_prices(
        &self,
        filter: Option<&GasPricesFilter>,
    ) -> Result<Vec<GasPrice>, ApiError> {
        let path = match filter {
            Some(f) => f.query().append_to(GAS_PRICES_PATH),
            None => GAS_PRICES_PATH.to_string(),
        };
        let doc: Document<Vec<GasPrice>> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// Gas prices for one chain. With `use_cache`, a sample fetched within
    /// the last 30 seconds is reused.
    pub async fn chain_gas_prices(
        &self,
        chain_id: &str,
        use_cache: bool,
    ) -> Result<Vec<GasPrice>, ApiError> {
        if chain_id.is_empty() {
            return Err(ApiError::Validation("chain_id is required".into()));
        }
        let cache_key = format!("chain_{chain_id}");
        if use_cache {
            if let Some(hit) = self.cache.get(&cache_key) {
                tracing::debug!(chain_id, "gas prices served from cache");
                return Ok(hit);
            }
        }

        let filter = GasPricesFilter {
            chain_ids: vec![chain_id.to_string()],
            ..Default::default()
        };
        let prices = self.gas_prices(Some(&filter)).await?;
        if use_cache {
            self.cache.set(cache_key, prices.clone());
        }
        Ok(prices)
    }

    /// The price entry of a specific gas type on a chain, if the chain
    /// publishes one.
    pub async fn chain_gas_price(
        &self,
        chain_id: &str,
        gas_type: GasType,
    ) -> Result<Option<GasPrice>, ApiError> {
        let prices = self.chain_gas_prices(chain_id, true).await?;
        Ok(prices
            .into_iter()
            .find(|p| p.attributes.gas_type == gas_type))
    }

    /// All published gas types for a chain, keyed by type.
    pub async fn chain_gas_prices_by_type(
        &self,
        chain_id: &str,
    ) -> Result<HashMap<GasType, GasPrice>, ApiError> {
        let prices = self.chain_gas_prices(chain_id, true).await?;
        Ok(prices
            .into_iter()
            .map(|p| (p.attributes.gas_type, p))
            .collect())
    }

    /// One request covering several chains, grouped by chain id. Chains
    /// with no published prices map to an empty list.
    pub async fn multi_chain_gas_prices(
        &self,
        chain_ids: &[String],
    ) -> Result<HashMap<String, Vec<GasPrice>>, ApiError> {
        if chain_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let filter = GasPricesFilter {
            chain_ids: chain_ids.to_vec(),
            ..Default::default()
        };
        let prices = self.gas_prices(Some(&filter)).await?;

        let mut grouped: HashMap<String, Vec<GasPrice>> = chain_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for price in prices {
            let Some(chain_id) = price.relationships.chain_id().map(str::to_string) else {
                continue;
            };
            if let Some(bucket) = grouped.get_mut(&chain_id) {
                bucket.push(price);
            }
        }
        Ok(grouped)
    }

    /// Estimates the cost of a transaction on a chain at the standard
    /// price of the given gas type. Returns `None` when the chain does not
    /// publish that gas type.
    pub async fn estimate_transaction_cost(
        &self,
        chain_id: &str,
        gas_limit: u64,
        gas_type: GasType,
    ) -> Result<Option<CostEstimate>, ApiError> {
        let Some(price) = self.chain_gas_price(chain_id, gas_type).await? else {
            return Ok(None);
        };
        let standard = &price.attributes.info.standard;
        let gas_price_wei: u128 = standard.parse().map_err(|_| {
            ApiError::unknown(format!("malformed gas price for {chain_id}: {standard:?}"))
        })?;
        Ok(Some(CostEstimate {
            gas_price_wei,
            gas_limit,
            total_wei: gas_price_wei * u128::from(gas_limit),
            updated_at: price.attributes.updated_at,
        }))
    }

    /// Drops all cached samples.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Diagnostics for the gas price cache.
    pub fn cache_stats(&self) -> CacheStats<String> {
        self.cache.stats()
    }

    /// A stream that re-fetches a chain's gas prices every `interval`,
    /// starting immediately. Dropping the stream stops the polling; no
    /// task outlives it.
    pub fn price_stream<'a>(
        &'a self,
        chain_id: &'a str,
        interval: Duration,
    ) -> impl Stream<Item = Result<Vec<GasPrice>, ApiError>> + 'a {
        stream::unfold(true, move |first| async move {
            if !first {
                tokio::time::sleep(interval).await;
            }
            let item = self.chain_gas_prices(chain_id, false).await;
            Some((item, false))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_serializes_chains_and_types() {
        let filter = GasPricesFilter {
            chain_ids: vec!["ethereum".into(), "polygon".into()],
            gas_types: vec![GasType::Classic, GasType::Eip1559],
        };
        let q = filter.query().to_query_string();
        assert!(q.contains("filter%5Bchain_ids%5D=ethereum%2Cpolygon"));
        assert!(q.contains("filter%5Bgas_types%5D=classic%2Ceip1559"));
    }

    #[test]
    fn empty_filter_produces_no_params() {
        assert!(GasPricesFilter::default().query().is_empty());
    }

    #[test]
    fn cost_estimate_multiplies_without_overflow() {
        let price: u128 = 2_000_000_000_000; // 2000 gwei
        let estimate = CostEstimate {
            gas_price_wei: price,
            gas_limit: 21_000,
            total_wei: price * 21_000,
            updated_at: 0,
        };
        assert_eq!(estimate.total_wei, 42_000_000_000_000_000);
    }
}
