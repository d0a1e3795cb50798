//! Fungible asset catalog: listing, search, charts and market-cap views.

use std::sync::Arc;

use zerionkit_core::{
    collect_all, ApiError, ApiTransport, ApiTransportExt, Document, QueryParams, MAX_PAGE_SIZE,
};

use crate::models::{Fungible, WalletChart};
use crate::wallets::ChartPeriod;

const FUNGIBLES_PATH: &str = "/v1/fungibles/";

/// Sort key for market-cap ordered listings, descending by default.
pub const SORT_MARKET_CAP_DESC: &str = "-market_data.market_cap";

/// Filters and paging for the fungibles listing.
#[derive(Debug, Clone, Default)]
pub struct FungiblesQuery {
    pub search_query: Option<String>,
    pub implementation_chain_id: Option<String>,
    pub implementation_address: Option<String>,
    pub fungible_ids: Vec<String>,
    pub sort: Option<String>,
    pub page_size: Option<u32>,
    pub page_after: Option<String>,
}

impl FungiblesQuery {
    /// Filters and sort only; full traversals replace the paging fields
    /// with their own.
    fn filters(&self) -> QueryParams {
        let mut q = QueryParams::new();
        if let Some(search) = &self.search_query {
            q = q.filter("search_query", search.clone());
        }
        if let Some(chain) = &self.implementation_chain_id {
            q = q.filter("implementation_chain_id", chain.clone());
        }
        if let Some(address) = &self.implementation_address {
            q = q.filter("implementation_address", address.clone());
        }
        q = q.filter_list("fungible_ids", &self.fungible_ids);
        if let Some(sort) = &self.sort {
            q = q.sort(sort.clone());
        }
        q
    }

    fn query(&self) -> QueryParams {
        let mut q = self.filters();
        if let Some(size) = self.page_size {
            q = q.page_size(size);
        }
        q.page_after(self.page_after.clone())
    }
}

pub struct FungiblesService {
    transport: Arc<dyn ApiTransport>,
}

impl FungiblesService {
    pub(crate) fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// One page of fungibles.
    pub async fn fungibles(
        &self,
        params: &FungiblesQuery,
    ) -> Result<Document<Vec<Fungible>>, ApiError> {
        let path = params.query().append_to(FUNGIBLES_PATH);
        self.transport.get_json(&path).await
    }

    /// Every fungible matching the filters, following cursors. Use with
    /// narrow filters; the unfiltered catalog is very large.
    pub async fn all_fungibles(&self, params: &FungiblesQuery) -> Result<Vec<Fungible>, ApiError> {
        collect_all(|cursor| {
            let path = params
                .filters()
                .page_size(MAX_PAGE_SIZE)
                .page_after(cursor)
                .append_to(FUNGIBLES_PATH);
            async move { self.transport.get_json(&path).await }
        })
        .await
    }

    /// A single fungible by its Zerion id.
    pub async fn fungible(&self, fungible_id: &str) -> Result<Fungible, ApiError> {
        if fungible_id.is_empty() {
            return Err(ApiError::Validation("fungible_id is required".into()));
        }
        let doc: Document<Fungible> = self
            .transport
            .get_json(&format!("{FUNGIBLES_PATH}{fungible_id}"))
            .await?;
        Ok(doc.data)
    }

    /// Price chart for a fungible over a period.
    pub async fn chart(
        &self,
        fungible_id: &str,
        period: ChartPeriod,
    ) -> Result<WalletChart, ApiError> {
        if fungible_id.is_empty() {
            return Err(ApiError::Validation("fungible_id is required".into()));
        }
        let doc: Document<WalletChart> = self
            .transport
            .get_json(&format!("{FUNGIBLES_PATH}{fungible_id}/charts/{period}"))
            .await?;
        Ok(doc.data)
    }

    /// Free-text search, optionally scoped to one chain.
    pub async fn search(
        &self,
        query: &str,
        chain_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Fungible>, ApiError> {
        if query.is_empty() {
            return Err(ApiError::Validation("query is required".into()));
        }
        let params = FungiblesQuery {
            search_query: Some(query.to_string()),
            implementation_chain_id: chain_id.map(str::to_string),
            page_size: Some(limit),
            ..Default::default()
        };
        Ok(self.fungibles(&params).await?.data)
    }

    /// Top assets on one chain, market-cap descending by default.
    pub async fn by_chain(
        &self,
        chain_id: &str,
        sort: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Fungible>, ApiError> {
        if chain_id.is_empty() {
            return Err(ApiError::Validation("chain_id is required".into()));
        }
        let params = FungiblesQuery {
            implementation_chain_id: Some(chain_id.to_string()),
            sort: Some(sort.unwrap_or(SORT_MARKET_CAP_DESC).to_string()),
            page_size: Some(limit),
            ..Default::default()
        };
        Ok(self.fungibles(&params).await?.data)
    }

    /// Batch lookup by ids. An empty id list short-circuits to an empty
    /// result without a request.
    pub async fn by_ids(&self, fungible_ids: &[String]) -> Result<Vec<Fungible>, ApiError> {
        if fungible_ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = FungiblesQuery {
            fungible_ids: fungible_ids.to_vec(),
            ..Default::default()
        };
        Ok(self.fungibles(&params).await?.data)
    }

    /// Resolves a contract address on a chain to its fungible, if any.
    /// Addresses are matched case-insensitively.
    pub async fn by_implementation(
        &self,
        chain_id: &str,
        contract_address: &str,
    ) -> Result<Option<Fungible>, ApiError> {
        if chain_id.is_empty() || contract_address.is_empty() {
            return Err(ApiError::Validation(
                "chain_id and contract_address are required".into(),
            ));
        }
        let params = FungiblesQuery {
            implementation_chain_id: Some(chain_id.to_string()),
            implementation_address: Some(contract_address.to_lowercase()),
            ..Default::default()
        };
        Ok(self.fungibles(&params).await?.data.into_iter().next())
    }

    /// Biggest movers over a window, sorted by that window's percent
    /// change. Accepted windows are `1d`, `30d`, `90d` and `365d`.
    pub async fn trending(&self, window: &str, limit: u32) -> Result<Vec<Fungible>, ApiError> {
        let sort = match window {
            "1d" => "market_data.price.percent_change_1d",
            "30d" => "market_data.price.percent_change_30d",
            "90d" => "market_data.price.percent_change_90d",
            "365d" => "market_data.percent_change_365d",
            other => {
                return Err(ApiError::Validation(format!(
                    "unsupported trending window: {other}"
                )))
            }
        };
        let params = FungiblesQuery {
            sort: Some(sort.to_string()),
            page_size: Some(limit),
            ..Default::default()
        };
        Ok(self.fungibles(&params).await?.data)
    }

    /// Top fungibles by market cap across all chains.
    pub async fn top(&self, limit: u32) -> Result<Vec<Fungible>, ApiError> {
        let params = FungiblesQuery {
            sort: Some(SORT_MARKET_CAP_DESC.to_string()),
            page_size: Some(limit),
            ..Default::default()
        };
        Ok(self.fungibles(&params).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_encodes_implementation_filters() {
        let params = FungiblesQuery {
            implementation_chain_id: Some("ethereum".into()),
            implementation_address: Some("0xabc".into()),
            sort: Some(SORT_MARKET_CAP_DESC.into()),
            ..Default::default()
        };
        let q = params.query().to_query_string();
        assert!(q.contains("filter%5Bimplementation_chain_id%5D=ethereum"));
        assert!(q.contains("filter%5Bimplementation_address%5D=0xabc"));
        assert!(q.contains("sort=-market_data.market_cap"));
    }

    #[test]
    fn filters_drop_caller_paging() {
        let params = FungiblesQuery {
            search_query: Some("usdc".into()),
            page_size: Some(5),
            page_after: Some("stale-cursor".into()),
            ..Default::default()
        };
        let q = params.filters().to_query_string();
        assert!(!q.contains("page%5Bsize%5D"));
        assert!(!q.contains("page%5Bafter%5D"));
        assert!(q.contains("filter%5Bsearch_query%5D=usdc"));
    }

    #[test]
    fn search_query_is_encoded() {
        let params = FungiblesQuery {
            search_query: Some("usd coin".into()),
            page_size: Some(20),
            ..Default::default()
        };
        let q = params.query().to_query_string();
        assert!(q.contains("filter%5Bsearch_query%5D=usd+coin"));
        assert!(q.contains("page%5Bsize%5D=20"));
    }
}
