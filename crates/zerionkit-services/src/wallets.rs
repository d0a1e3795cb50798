//! Wallet queries: charts, PnL, portfolio, positions, transactions and the
//! wallet-scoped NFT views.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::stream::{self, Stream};
use futures::try_join;
use serde_json::Value;
use zerionkit_core::{
    collect_all, ApiError, ApiTransport, ApiTransportExt, Document, QueryParams, MAX_PAGE_SIZE,
};

use crate::models::{
    NftCollection, NftPosition, Pnl, Portfolio, Position, Transaction, WalletChart,
};
use crate::validate::normalize_address;

/// Time span of a balance or price chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPeriod {
    Hour,
    Day,
    Week,
    Month,
    Year,
    Max,
}

impl ChartPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position complexity filter used by the portfolio and positions views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    OnlySimple,
    OnlyComplex,
    NoFilter,
}

impl PositionFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnlySimple => "only_simple",
            Self::OnlyComplex => "only_complex",
            Self::NoFilter => "no_filter",
        }
    }
}

/// Spam/trash classification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashFilter {
    OnlyTrash,
    OnlyNonTrash,
    NoFilter,
}

impl TrashFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnlyTrash => "only_trash",
            Self::OnlyNonTrash => "only_non_trash",
            Self::NoFilter => "no_filter",
        }
    }
}

/// Chain/fungible scoping shared by the chart and PnL endpoints.
#[derive(Debug, Clone, Default)]
pub struct ChainScope {
    pub chain_ids: Vec<String>,
    pub fungible_ids: Vec<String>,
}

impl ChainScope {
    fn query(&self) -> QueryParams {
        QueryParams::new()
            .filter_list("chain_ids", &self.chain_ids)
            .filter_list("fungible_ids", &self.fungible_ids)
    }
}

/// Filters and paging for the positions listing.
#[derive(Debug, Clone, Default)]
pub struct PositionsQuery {
    pub positions: Option<PositionFilter>,
    pub position_types: Vec<String>,
    pub chain_ids: Vec<String>,
    pub fungible_ids: Vec<String>,
    pub dapp_ids: Vec<String>,
    pub trash: Option<TrashFilter>,
    pub sort: Option<String>,
    pub page_size: Option<u32>,
    pub page_after: Option<String>,
}

impl PositionsQuery {
    /// Filters and sort only; full traversals replace the paging fields
    /// with their own.
    fn filters(&self) -> QueryParams {
        let mut q = QueryParams::new();
        if let Some(filter) = self.positions {
            q = q.filter("positions", filter.as_str());
        }
        q = q
            .filter_list("position_types", &self.position_types)
            .filter_list("chain_ids", &self.chain_ids)
            .filter_list("fungible_ids", &self.fungible_ids)
            .filter_list("dapp_ids", &self.dapp_ids);
        if let Some(trash) = self.trash {
            q = q.filter("trash", trash.as_str());
        }
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

/// Filters and paging for the transaction history.
#[derive(Debug, Clone, Default)]
pub struct TransactionsQuery {
    pub search_query: Option<String>,
    pub operation_types: Vec<String>,
    pub asset_types: Vec<String>,
    pub chain_ids: Vec<String>,
    pub fungible_ids: Vec<String>,
    /// Unix seconds, inclusive lower bound on mined time.
    pub min_mined_at: Option<i64>,
    /// Unix seconds, inclusive upper bound on mined time.
    pub max_mined_at: Option<i64>,
    pub trash: Option<TrashFilter>,
    pub page_size: Option<u32>,
    pub page_after: Option<String>,
}

impl TransactionsQuery {
    fn filters(&self) -> QueryParams {
        let mut q = QueryParams::new();
        if let Some(search) = &self.search_query {
            q = q.filter("search_query", search.clone());
        }
        q = q
            .filter_list("operation_types", &self.operation_types)
            .filter_list("asset_types", &self.asset_types)
            .filter_list("chain_ids", &self.chain_ids)
            .filter_list("fungible_ids", &self.fungible_ids);
        if let Some(min) = self.min_mined_at {
            q = q.filter("min_mined_at", min.to_string());
        }
        if let Some(max) = self.max_mined_at {
            q = q.filter("max_mined_at", max.to_string());
        }
        if let Some(trash) = self.trash {
            q = q.filter("trash", trash.as_str());
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

/// Filters and paging for wallet NFT positions.
#[derive(Debug, Clone, Default)]
pub struct NftPositionsQuery {
    pub chain_ids: Vec<String>,
    pub collection_ids: Vec<String>,
    pub sort: Option<String>,
    pub include: Vec<String>,
    pub page_size: Option<u32>,
    pub page_after: Option<String>,
}

impl NftPositionsQuery {
    fn filters(&self) -> QueryParams {
        let mut q = QueryParams::new()
            .filter_list("chain_ids", &self.chain_ids)
            .filter_list("collections_ids", &self.collection_ids)
            .include(&self.include);
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

/// Everything the summary endpoint group returns, fetched concurrently.
#[derive(Debug, Clone)]
pub struct WalletSummary {
    pub portfolio: Portfolio,
    pub pnl: Pnl,
    pub nft_portfolio: Value,
    pub top_positions: Vec<Position>,
    pub recent_transactions: Vec<Transaction>,
}

/// One tick of [`WalletsService::activity_stream`].
#[derive(Debug, Clone)]
pub struct ActivitySnapshot {
    /// Unix seconds at which the poll ran.
    pub timestamp: i64,
    /// Transactions mined since the previous tick.
    pub new_transactions: Vec<Transaction>,
    pub portfolio: Portfolio,
    pub alerts: Vec<String>,
}

pub struct WalletsService {
    transport: Arc<dyn ApiTransport>,
}

impl WalletsService {
    pub(crate) fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Balance chart over a period.
    pub async fn chart(
        &self,
        address: &str,
        period: ChartPeriod,
        scope: Option<&ChainScope>,
    ) -> Result<WalletChart, ApiError> {
        let address = normalize_address(address)?;
        let path = format!("/v1/wallets/{address}/charts/{period}");
        let path = match scope {
            Some(s) => s.query().append_to(&path),
            None => path,
        };
        let doc: Document<WalletChart> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// Realized and unrealized profit-and-loss figures.
    pub async fn pnl(&self, address: &str, scope: Option<&ChainScope>) -> Result<Pnl, ApiError> {
        let address = normalize_address(address)?;
        let path = format!("/v1/wallets/{address}/pnl/");
        let path = match scope {
            Some(s) => s.query().append_to(&path),
            None => path,
        };
        let doc: Document<Pnl> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// Portfolio overview. The payload shape varies by wallet contents, so
    /// it is surfaced as raw JSON.
    pub async fn portfolio(
        &self,
        address: &str,
        positions: Option<PositionFilter>,
    ) -> Result<Portfolio, ApiError> {
        let address = normalize_address(address)?;
        let path = format!("/v1/wallets/{address}/portfolio");
        let path = match positions {
            Some(filter) => QueryParams::new()
                .filter("positions", filter.as_str())
                .append_to(&path),
            None => path,
        };
        let doc: Document<Portfolio> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// One page of fungible positions.
    pub async fn positions(
        &self,
        address: &str,
        params: &PositionsQuery,
    ) -> Result<Document<Vec<Position>>, ApiError> {
        let address = normalize_address(address)?;
        let path = params
            .query()
            .append_to(&format!("/v1/wallets/{address}/positions/"));
        self.transport.get_json(&path).await
    }

    /// Every fungible position, following `page[after]` cursors until the
    /// server stops returning one.
    pub async fn all_positions(
        &self,
        address: &str,
        params: &PositionsQuery,
    ) -> Result<Vec<Position>, ApiError> {
        let address = normalize_address(address)?;
        collect_all(|cursor| {
            let path = params
                .filters()
                .page_size(MAX_PAGE_SIZE)
                .page_after(cursor)
                .append_to(&format!("/v1/wallets/{address}/positions/"));
            async move { self.transport.get_json(&path).await }
        })
        .await
    }

    /// One page of transaction history.
    pub async fn transactions(
        &self,
        address: &str,
        params: &TransactionsQuery,
    ) -> Result<Document<Vec<Transaction>>, ApiError> {
        let address = normalize_address(address)?;
        let path = params
            .query()
            .append_to(&format!("/v1/wallets/{address}/transactions/"));
        self.transport.get_json(&path).await
    }

    /// Full transaction history via cursor pagination.
    pub async fn all_transactions(
        &self,
        address: &str,
        params: &TransactionsQuery,
    ) -> Result<Vec<Transaction>, ApiError> {
        let address = normalize_address(address)?;
        collect_all(|cursor| {
            let path = params
                .filters()
                .page_size(MAX_PAGE_SIZE)
                .page_after(cursor)
                .append_to(&format!("/v1/wallets/{address}/transactions/"));
            async move { self.transport.get_json(&path).await }
        })
        .await
    }

    /// One page of NFT positions.
    pub async fn nft_positions(
        &self,
        address: &str,
        params: &NftPositionsQuery,
    ) -> Result<Document<Vec<NftPosition>>, ApiError> {
        let address = normalize_address(address)?;
        let path = params
            .query()
            .append_to(&format!("/v1/wallets/{address}/nft-positions/"));
        self.transport.get_json(&path).await
    }

    /// Every NFT position via cursor pagination.
    pub async fn all_nft_positions(
        &self,
        address: &str,
        params: &NftPositionsQuery,
    ) -> Result<Vec<NftPosition>, ApiError> {
        let address = normalize_address(address)?;
        collect_all(|cursor| {
            let path = params
                .filters()
                .page_size(MAX_PAGE_SIZE)
                .page_after(cursor)
                .append_to(&format!("/v1/wallets/{address}/nft-positions/"));
            async move { self.transport.get_json(&path).await }
        })
        .await
    }

    /// NFT collections held by the wallet.
    pub async fn nft_collections(
        &self,
        address: &str,
        chain_ids: &[String],
    ) -> Result<Vec<NftCollection>, ApiError> {
        let address = normalize_address(address)?;
        let path = QueryParams::new()
            .filter_list("chain_ids", chain_ids)
            .append_to(&format!("/v1/wallets/{address}/nft-collections/"));
        let doc: Document<Vec<NftCollection>> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// NFT portfolio overview, as raw JSON.
    pub async fn nft_portfolio(&self, address: &str) -> Result<Value, ApiError> {
        let address = normalize_address(address)?;
        let doc: Document<Value> = self
            .transport
            .get_json(&format!("/v1/wallets/{address}/nft-portfolio"))
            .await?;
        Ok(doc.data)
    }

    /// Portfolio, PnL, NFT portfolio, top positions and recent
    /// transactions in one concurrent sweep. Any individual failure fails
    /// the summary.
    pub async fn summary(&self, address: &str) -> Result<WalletSummary, ApiError> {
        let top = PositionsQuery {
            sort: Some("value".to_string()),
            page_size: Some(10),
            ..Default::default()
        };
        let recent = TransactionsQuery {
            page_size: Some(10),
            ..Default::default()
        };

        let (portfolio, pnl, nft_portfolio, positions, transactions) = try_join!(
            self.portfolio(address, None),
            self.pnl(address, None),
            self.nft_portfolio(address),
            self.positions(address, &top),
            self.transactions(address, &recent),
        )?;

        Ok(WalletSummary {
            portfolio,
            pnl,
            nft_portfolio,
            top_positions: positions.data,
            recent_transactions: transactions.data,
        })
    }

    /// Polls for new activity every `interval`. Each tick reports the
    /// transactions mined since the previous tick plus a fresh portfolio
    /// snapshot. A failed poll yields an `Err` item and polling continues;
    /// dropping the stream stops it.
    pub fn activity_stream<'a>(
        &'a self,
        address: &'a str,
        interval: Duration,
    ) -> impl Stream<Item = Result<ActivitySnapshot, ApiError>> + 'a {
        let start = unix_now();
        stream::unfold((start, true), move |(last_check, first)| async move {
            if !first {
                tokio::time::sleep(interval).await;
            }
            let now = unix_now();
            let item = self.poll_activity(address, last_check).await;
            // Only advance the window when the poll succeeded, so missed
            // transactions are retried on the next tick.
            let next_check = if item.is_ok() { now } else { last_check };
            Some((item, (next_check, false)))
        })
    }

    async fn poll_activity(
        &self,
        address: &str,
        since: i64,
    ) -> Result<ActivitySnapshot, ApiError> {
        let recent = TransactionsQuery {
            min_mined_at: Some(since),
            page_size: Some(50),
            ..Default::default()
        };
        let (transactions, portfolio) = try_join!(
            self.transactions(address, &recent),
            self.portfolio(address, None),
        )?;

        let new_transactions = transactions.data;
        let mut alerts = Vec::new();
        if !new_transactions.is_empty() {
            alerts.push(format!(
                "{} new transactions detected",
                new_transactions.len()
            ));
        }

        Ok(ActivitySnapshot {
            timestamp: unix_now(),
            new_transactions,
            portfolio,
            alerts,
        })
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
