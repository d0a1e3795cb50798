//! Typed API payloads.
//!
//! Resources follow the JSON:API shape: `{type, id, attributes,
//! relationships?}`. Fields the API marks optional stay `Option`; unknown
//! fields are ignored on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Icon {
    pub url: String,
}

/// A `{type, id}` pointer inside `relationships`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub data: ResourceId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fungible: Option<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Relationship>,
}

impl Relationships {
    /// The related chain id, when present.
    pub fn chain_id(&self) -> Option<&str> {
        self.chain.as_ref().map(|r| r.data.id.as_str())
    }
}

/// Token amount in the API's quadruple representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub int: String,
    pub decimals: u32,
    pub float: f64,
    pub numeric: String,
}

// ---------------------------------------------------------------------------
// Chains

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: ChainAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainAttributes {
    pub external_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub flags: ChainFlags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainFlags {
    #[serde(default)]
    pub supports_trading: bool,
}

// ---------------------------------------------------------------------------
// Wallet resources

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletChart {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: WalletChartAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletChartAttributes {
    pub begin_at: String,
    pub end_at: String,
    /// `(unix_timestamp, value)` samples.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pnl {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: PnlAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlAttributes {
    pub net_invested: f64,
    pub realized_gain: f64,
    pub received_external: f64,
    pub received_for_nfts: f64,
    pub sent_external: f64,
    pub sent_for_nfts: f64,
    pub total_fee: f64,
    pub unrealized_gain: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: PositionAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    pub name: String,
    pub position_type: String,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub fungible_info: FungibleInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FungibleInfo {
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: TransactionAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAttributes {
    pub operation_type: String,
    pub hash: String,
    /// Unix seconds.
    pub mined_at: i64,
    pub mined_at_block: u64,
    pub sent_from: String,
    pub sent_to: String,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transfers: Vec<Transfer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub fungible_info: FungibleInfo,
    pub direction: TransferDirection,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    In,
    Out,
}

// ---------------------------------------------------------------------------
// NFT resources

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftPosition {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: NftPositionAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftPositionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub token_id: String,
    pub amount: String,
    pub collection_info: CollectionInfo,
    pub nft_info: NftInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_acquired_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftInfo {
    pub contract_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<NftContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Icon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: NftCollectionAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftCollectionAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<u64>,
    pub positions_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nft {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: NftAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftAttributes {
    pub token_id: String,
    pub contract_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<NftContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_info: Option<CollectionInfo>,
}

// ---------------------------------------------------------------------------
// Fungibles

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fungible {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: FungibleAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FungibleAttributes {
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_data: Option<MarketData>,
    #[serde(default)]
    pub implementations: Vec<Implementation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_diluted_valuation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_change_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_change_7d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_change_30d: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub decimals: u32,
}

// ---------------------------------------------------------------------------
// Swap

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapOffer {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: SwapOfferAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapOfferAttributes {
    pub receive_quantity: Quantity,
    pub send_quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub data: SwapCallData,
    pub meta: SwapMeta,
}

/// Raw transaction data a caller would submit to execute the swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapCallData {
    pub to: String,
    pub data: String,
    pub value: String,
    pub gas_limit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapMeta {
    #[serde(rename = "type")]
    pub kind: SwapKind,
    pub to_amount_min: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_slippage_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_source: Option<LiquiditySource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapKind {
    Trade,
    Bridge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquiditySource {
    pub name: String,
    pub id: String,
}

// ---------------------------------------------------------------------------
// Gas

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasPrice {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: GasPriceAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasPriceAttributes {
    pub gas_type: GasType,
    /// Unix seconds of the last provider refresh.
    pub updated_at: i64,
    pub info: GasInfo,
}

/// Wei amounts as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasInfo {
    pub slow: String,
    pub standard: String,
    pub fast: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasType {
    Classic,
    Eip1559,
    Optimistic,
}

impl GasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Eip1559 => "eip1559",
            Self::Optimistic => "optimistic",
        }
    }
}

impl std::fmt::Display for GasType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Loosely-typed payloads

/// Portfolio overviews vary by wallet composition; callers get the raw
/// document data.
pub type Portfolio = Value;
