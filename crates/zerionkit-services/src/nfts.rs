//! NFT lookups by id or by `chain:contract:token` reference.

use std::sync::Arc;

use zerionkit_core::{ApiError, ApiTransport, ApiTransportExt, Document, QueryParams};

use crate::models::Nft;
use crate::validate::NftReference;

const NFTS_PATH: &str = "/v1/nfts/";

/// Default chunk size for batched reference lookups.
const BATCH_CHUNK_SIZE: usize = 50;

pub struct NftsService {
    transport: Arc<dyn ApiTransport>,
}

impl NftsService {
    pub(crate) fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// NFTs matching a set of references. At least one reference is
    /// required.
    pub async fn nfts(
        &self,
        references: &[NftReference],
        include: &[String],
    ) -> Result<Vec<Nft>, ApiError> {
        if references.is_empty() {
            return Err(ApiError::Validation(
                "at least one NFT reference is required".into(),
            ));
        }
        let refs: Vec<String> = references.iter().map(ToString::to_string).collect();
        let path = QueryParams::new()
            .filter_list("references", &refs)
            .include(include)
            .append_to(NFTS_PATH);
        let doc: Document<Vec<Nft>> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// A single NFT by its Zerion id.
    pub async fn nft(&self, nft_id: &str, include: &[String]) -> Result<Nft, ApiError> {
        if nft_id.is_empty() {
            return Err(ApiError::Validation("nft_id is required".into()));
        }
        let path = QueryParams::new()
            .include(include)
            .append_to(&format!("{NFTS_PATH}{nft_id}"));
        let doc: Document<Nft> = self.transport.get_json(&path).await?;
        Ok(doc.data)
    }

    /// Looks one NFT up by reference. Returns `None` when the API has no
    /// entry for it.
    pub async fn by_reference(
        &self,
        reference: &NftReference,
        include: &[String],
    ) -> Result<Option<Nft>, ApiError> {
        let nfts = self
            .nfts(std::slice::from_ref(reference), include)
            .await?;
        Ok(nfts.into_iter().next())
    }

    /// Several tokens from one collection.
    pub async fn from_collection(
        &self,
        chain_id: &str,
        contract_address: &str,
        token_ids: &[String],
        include: &[String],
    ) -> Result<Vec<Nft>, ApiError> {
        let references: Vec<NftReference> = token_ids
            .iter()
            .map(|token_id| NftReference::new(chain_id, contract_address, token_id))
            .collect();
        self.nfts(&references, include).await
    }

    /// Fetches a large reference set in chunks of 50. Failed chunks are
    /// logged and skipped so one bad batch does not sink the rest.
    pub async fn batch(
        &self,
        references: &[NftReference],
        include: &[String],
    ) -> Result<Vec<Nft>, ApiError> {
        if references.is_empty() {
            return Ok(Vec::new());
        }
        let mut all = Vec::with_capacity(references.len());
        for chunk in references.chunks(BATCH_CHUNK_SIZE) {
            match self.nfts(chunk, include).await {
                Ok(nfts) => all.extend(nfts),
                Err(e) => {
                    tracing::warn!(chunk_len = chunk.len(), error = %e, "NFT batch chunk failed");
                }
            }
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_join_into_one_filter() {
        let refs = vec![
            NftReference::new("ethereum", "0xabc", "1"),
            NftReference::new("ethereum", "0xabc", "2"),
        ];
        let joined: Vec<String> = refs.iter().map(ToString::to_string).collect();
        let q = QueryParams::new()
            .filter_list("references", &joined)
            .to_query_string();
        assert!(q.contains("filter%5Breferences%5D=ethereum%3A0xabc%3A1%2Cethereum%3A0xabc%3A2"));
    }
}
