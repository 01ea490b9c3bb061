//! Operation dispatcher
//!
//! Entry point for token operations. Each call runs its own state machine:
//!
//! `Received -> Validated -> CapabilityResolved -> Encoded -> Delegated -> Done`
//!
//! and stops at `Failed` on the first error. Read-only operations skip
//! straight from `Validated` to the chain query collaborator. Nothing is
//! shared between calls.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::Protocol;
use crate::transaction::{
    ChainQuery, ContractReader, HttpChainQuery, OperationKind, RpcContractReader, TokenCapability,
    TokenOperationRequest, TransactionEncoder, TransactionReceipt, TransactionSubmitter, UnsignedTransaction,
};
use super::capability::CapabilityProber;
use super::query;

/// Step of one dispatcher call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Validated,
    CapabilityResolved,
    Encoded,
    Delegated,
    Done,
    Failed,
}

/// Result of a dispatched operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// Raw response of a read-only query
    Query(Value),
    /// Transaction handed to the submission collaborator, and its receipt
    Submitted {
        transaction: UnsignedTransaction,
        receipt: TransactionReceipt,
    },
}

/// State of a single call; dropped when the call returns
struct CallContext {
    state: DispatchState,
    capabilities: HashMap<(Protocol, String), TokenCapability>,
}

impl CallContext {
    fn new(request: &TokenOperationRequest) -> Self {
        debug!(kind = ?request.kind, protocol = %request.protocol, "operation received");
        Self { state: DispatchState::Received, capabilities: HashMap::new() }
    }

    fn advance(&mut self, next: DispatchState) {
        debug!(from = ?self.state, to = ?next, "dispatch transition");
        self.state = next;
    }

    fn fail(&mut self, error: Error) -> Error {
        warn!(state = ?self.state, %error, "operation failed");
        self.state = DispatchState::Failed;
        error
    }
}

/// Token operation dispatcher
pub struct OperationDispatcher {
    config: Config,
    encoder: TransactionEncoder,
    prober: CapabilityProber,
    query: Arc<dyn ChainQuery>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl OperationDispatcher {
    pub fn new(
        config: Config,
        query: Arc<dyn ChainQuery>,
        reader: Arc<dyn ContractReader>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        Self {
            config,
            encoder: TransactionEncoder::default(),
            prober: CapabilityProber::new(reader),
            query,
            submitter,
        }
    }

    /// Dispatcher over the HTTP chain API and the configured JSON-RPC endpoints
    pub fn from_config(config: Config, submitter: Arc<dyn TransactionSubmitter>) -> Result<Self> {
        let query = Arc::new(HttpChainQuery::new(&config));
        let reader = Arc::new(RpcContractReader::new(&config)?);
        Ok(Self::new(config, query, reader, submitter))
    }

    /// Replace the encoder registry, e.g. to inject a token id generator
    pub fn with_encoder(mut self, encoder: TransactionEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run an operation to completion
    pub async fn dispatch(&self, request: &TokenOperationRequest) -> Result<OperationOutcome> {
        let mut ctx = CallContext::new(request);

        if request.kind.is_query() {
            let route = query::token_route(request).map_err(|e| ctx.fail(e))?;
            ctx.advance(DispatchState::Validated);

            let response = self
                .query
                .query(request.protocol, &route.path, &route.params)
                .await
                .map_err(|e| ctx.fail(e))?;
            ctx.advance(DispatchState::Done);
            return Ok(OperationOutcome::Query(response));
        }

        let transaction = self.build(request, &mut ctx).await?;

        ctx.advance(DispatchState::Delegated);
        let receipt = self.submitter.submit(&transaction).await.map_err(|e| ctx.fail(e))?;

        ctx.advance(DispatchState::Done);
        info!(protocol = %request.protocol, kind = ?request.kind, hash = %receipt.hash, "operation submitted");
        Ok(OperationOutcome::Submitted { transaction, receipt })
    }

    /// Build the unsigned transaction of a transfer or mint without submitting it
    pub async fn prepare(&self, request: &TokenOperationRequest) -> Result<UnsignedTransaction> {
        let mut ctx = CallContext::new(request);
        let transaction = self.build(request, &mut ctx).await?;
        ctx.advance(DispatchState::Done);
        Ok(transaction)
    }

    /// Wallet balance and details, optionally with balances of some tokens
    pub async fn wallet_info(&self, address: &str, protocol: Protocol, token_addresses: &[String]) -> Result<Value> {
        let route = query::wallet_info_route(address, protocol, token_addresses)?;
        self.query.query(protocol, &route.path, &route.params).await
    }

    async fn build(&self, request: &TokenOperationRequest, ctx: &mut CallContext) -> Result<UnsignedTransaction> {
        self.encoder.validate(request).map_err(|e| ctx.fail(e))?;
        ctx.advance(DispatchState::Validated);

        let capability = if self.encoder.needs_capability(request).map_err(|e| ctx.fail(e))? {
            let capability = self.resolve_capability(request, ctx).await.map_err(|e| ctx.fail(e))?;
            ctx.advance(DispatchState::CapabilityResolved);
            Some(capability)
        } else {
            None
        };

        let transaction = self.encoder.encode(request, capability).map_err(|e| ctx.fail(e))?;
        ctx.advance(DispatchState::Encoded);
        Ok(transaction)
    }

    async fn resolve_capability(&self, request: &TokenOperationRequest, ctx: &mut CallContext) -> Result<TokenCapability> {
        let contract = request
            .token
            .clone()
            .ok_or_else(|| Error::validation("Missing token"))?;
        let key = (request.protocol, contract.to_ascii_lowercase());
        if let Some(capability) = ctx.capabilities.get(&key) {
            return Ok(*capability);
        }

        let capability = tokio::time::timeout(self.config.probe_timeout, self.prober.classify(request.protocol, &contract))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "Capability probe of {} did not finish within {:?}",
                    contract, self.config.probe_timeout
                ))
            })??;

        ctx.capabilities.insert(key, capability);
        Ok(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::transaction::{ContractParam, TransactionStatus};

    struct NoQuery;

    #[async_trait]
    impl ChainQuery for NoQuery {
        async fn query(&self, _: Protocol, path: &str, _: &[(String, String)]) -> Result<Value> {
            Err(Error::Network(format!("unexpected query {}", path)))
        }
    }

    struct Unsupported;

    #[async_trait]
    impl ContractReader for Unsupported {
        async fn call(&self, _: Protocol, _: &str, _: &str, _: &[ContractParam]) -> Result<bool> {
            Ok(false)
        }
    }

    struct Accept;

    #[async_trait]
    impl TransactionSubmitter for Accept {
        async fn submit(&self, _: &UnsignedTransaction) -> Result<TransactionReceipt> {
            Ok(TransactionReceipt { hash: "0xabc".to_string(), status: TransactionStatus::Pending, block_number: None, fee: None })
        }
    }

    fn dispatcher() -> OperationDispatcher {
        OperationDispatcher::new(Config::default(), Arc::new(NoQuery), Arc::new(Unsupported), Arc::new(Accept))
    }

    #[tokio::test]
    async fn test_burn_is_not_implemented() {
        let request = TokenOperationRequest::new(OperationKind::Burn, Protocol::Ethereum);
        assert!(matches!(dispatcher().dispatch(&request).await, Err(Error::NotImplemented(_))));
    }

    #[tokio::test]
    async fn test_validation_fails_before_probe() {
        let request = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Ethereum).token("not-an-address");
        assert!(matches!(dispatcher().prepare(&request).await, Err(Error::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_hathor_transfer_skips_probe() {
        let destination = crate::crypto::encoding::base58check_encode(0x28, &[9u8; 20], bs58::Alphabet::BITCOIN);
        let request = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Hathor)
            .token("00")
            .destination(destination)
            .amount("2");

        match dispatcher().dispatch(&request).await.unwrap() {
            OperationOutcome::Submitted { transaction, receipt } => {
                assert_eq!(transaction.protocol, Protocol::Hathor);
                assert_eq!(receipt.hash, "0xabc");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
