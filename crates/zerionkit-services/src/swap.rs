//! Swap and bridge quoting.
//!
//! The offers endpoint takes nested `input[...]`/`output[...]` query
//! parameters describing both legs of the trade.

use std::sync::Arc;

use zerionkit_core::{ApiError, ApiTransport, ApiTransportExt, Document, QueryParams};

use crate::models::{Fungible, SwapOffer};

const SWAP_FUNGIBLES_PATH: &str = "/v1/swap/fungibles/";
const SWAP_OFFERS_PATH: &str = "/v1/swap/offers/";

/// Which side(s) of a trade a fungibles listing should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    Input,
    Output,
    Both,
}

impl SwapDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Both => "both",
        }
    }
}

/// One leg of a trade. A missing `address` means the chain's native token.
#[derive(Debug, Clone, Default)]
pub struct SwapSide {
    pub chain_id: String,
    pub address: Option<String>,
}

impl SwapSide {
    pub fn chain(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            address: None,
        }
    }

    fn append(&self, q: QueryParams, side: &str) -> QueryParams {
        let mut q = q.raw(format!("{side}[chain_id]"), self.chain_id.clone());
        if let Some(address) = &self.address {
            q = q.raw(format!("{side}[address]"), address.clone());
        }
        q
    }
}

/// Filters for the swappable-fungibles listing.
#[derive(Debug, Clone, Default)]
pub struct SwapFungiblesQuery {
    pub input: Option<SwapSide>,
    pub output: Option<SwapSide>,
    pub direction: Option<SwapDirection>,
}

impl SwapFungiblesQuery {
    fn query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        if let Some(input) = &self.input {
            q = input.append(q, "input");
        }
        if let Some(output) = &self.output {
            q = output.append(q, "output");
        }
        if let Some(direction) = self.direction {
            q = q.raw("direction", direction.as_str());
        }
        q
    }
}

/// Ordering of returned offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferSort {
    /// Best output amount first.
    Amount,
    /// Cheapest gas first.
    GasFee,
}

impl OfferSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::GasFee => "gas_fee",
        }
    }
}

/// Parameters for requesting swap offers. `input_amount` is in the input
/// token's base units.
#[derive(Debug, Clone, Default)]
pub struct SwapOffersQuery {
    pub input: SwapSide,
    pub input_amount: String,
    pub output: SwapSide,
    pub gas_price: Option<String>,
    pub liquidity_source_id: Option<String>,
    pub sort: Option<OfferSort>,
    pub slippage_percent: Option<f64>,
}

impl SwapOffersQuery {
    fn validate(&self) -> Result<(), ApiError> {
        if self.input.chain_id.is_empty() || self.output.chain_id.is_empty() {
            return Err(ApiError::Validation(
                "input and output chain_id are required".into(),
            ));
        }
        if self.input_amount.is_empty() {
            return Err(ApiError::Validation("input amount is required".into()));
        }
        Ok(())
    }

    fn query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q = self.input.append(q, "input");
        q = q.raw("input[amount]", self.input_amount.clone());
        q = self.output.append(q, "output");
        if let Some(gas_price) = &self.gas_price {
            q = q.raw("gas_price", gas_price.clone());
        }
        if let Some(source) = &self.liquidity_source_id {
            q = q.raw("liquidity_source_id", source.clone());
        }
        if let Some(sort) = self.sort {
            q = q.sort(sort.as_str());
        }
        if let Some(slippage) = self.slippage_percent {
            q = q.raw("slippage_percent", slippage.to_string());
        }
        q
    }
}

pub struct SwapService {
    transport: Arc<dyn ApiTransport>,
}

impl SwapService {
    pub(crate) fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Fungibles that can take part in a swap or bridge.
    pub async fn swap_fungibles(
        &self,
        params: &SwapFungiblesQuery,
    ) -> Result<Vec<Fungible>, ApiError> {
        let path = params.query().append_to(SWAP_FUNGIBLES_PATH);
        let doc: Document<Vec<Fungible>> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// All offers for a trade, in the requested order.
    pub async fn offers(&self, params: &SwapOffersQuery) -> Result<Vec<SwapOffer>, ApiError> {
        params.validate()?;
        let path = params.query().append_to(SWAP_OFFERS_PATH);
        let doc: Document<Vec<SwapOffer>> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// The offer with the best output amount, if any provider quotes one.
    pub async fn best_offer(&self, params: &SwapOffersQuery) -> Result<Option<SwapOffer>, ApiError> {
        let mut params = params.clone();
        params.sort = Some(OfferSort::Amount);
        Ok(self.offers(&params).await?.into_iter().next())
    }

    /// Offers ordered by gas cost, cheapest first.
    pub async fn gas_optimized_offers(
        &self,
        params: &SwapOffersQuery,
    ) -> Result<Vec<SwapOffer>, ApiError> {
        let mut params = params.clone();
        params.sort = Some(OfferSort::GasFee);
        self.offers(&params).await
    }

    /// Tokens that can be swapped into assets on `output_chain_id`.
    pub async fn input_fungibles(&self, output_chain_id: &str) -> Result<Vec<Fungible>, ApiError> {
        if output_chain_id.is_empty() {
            return Err(ApiError::Validation("output_chain_id is required".into()));
        }
        self.swap_fungibles(&SwapFungiblesQuery {
            output: Some(SwapSide::chain(output_chain_id)),
            direction: Some(SwapDirection::Input),
            ..Default::default()
        })
        .await
    }

    /// Tokens reachable from assets on `input_chain_id`.
    pub async fn output_fungibles(&self, input_chain_id: &str) -> Result<Vec<Fungible>, ApiError> {
        if input_chain_id.is_empty() {
            return Err(ApiError::Validation("input_chain_id is required".into()));
        }
        self.swap_fungibles(&SwapFungiblesQuery {
            input: Some(SwapSide::chain(input_chain_id)),
            direction: Some(SwapDirection::Output),
            ..Default::default()
        })
        .await
    }

    /// Tokens bridgeable between two different chains.
    pub async fn bridge_fungibles(
        &self,
        input_chain_id: &str,
        output_chain_id: &str,
    ) -> Result<Vec<Fungible>, ApiError> {
        if input_chain_id.is_empty() || output_chain_id.is_empty() {
            return Err(ApiError::Validation(
                "input_chain_id and output_chain_id are required".into(),
            ));
        }
        self.swap_fungibles(&SwapFungiblesQuery {
            input: Some(SwapSide::chain(input_chain_id)),
            output: Some(SwapSide::chain(output_chain_id)),
            direction: Some(SwapDirection::Both),
            ..Default::default()
        })
        .await
    }

    /// Whether any route exists between two tokens, same-chain or
    /// cross-chain.
    pub async fn can_swap(&self, input: &SwapSide, output: &SwapSide) -> Result<bool, ApiError> {
        let fungibles = self
            .swap_fungibles(&SwapFungiblesQuery {
                input: Some(input.clone()),
                output: Some(output.clone()),
                direction: Some(SwapDirection::Both),
            })
            .await?;
        Ok(!fungibles.is_empty())
    }
}
