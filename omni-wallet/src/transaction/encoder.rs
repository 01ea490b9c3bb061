//! Transaction encoder
//!
//! One strategy per protocol, registered by protocol. The encoder is pure: a
//! capability classification, when needed, is supplied by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use rand::{rngs::OsRng, Rng};

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use super::ethereum::EvmEncoder;
use super::hathor::HathorEncoder;
use super::solana::SolanaEncoder;
use super::types::{OperationKind, TokenCapability, TokenOperationRequest, UnsignedTransaction};

/// Largest token id the default generator hands out (2^53 - 1)
pub const MAX_GENERATED_TOKEN_ID: u64 = (1 << 53) - 1;

/// Source of token ids for mints that do not name one
pub trait TokenIdGenerator: Send + Sync {
    fn next_token_id(&self) -> u64;
}

/// Uniform draw from `[0, 2^53 - 1]`
///
/// Nothing checks the id against chain state; callers that cannot tolerate a
/// collision should pass their own id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenId;

impl TokenIdGenerator for RandomTokenId {
    fn next_token_id(&self) -> u64 {
        OsRng.gen_range(0..=MAX_GENERATED_TOKEN_ID)
    }
}

/// Validation and encoding rules of one protocol
pub trait ProtocolEncoder: Send + Sync {
    /// Check every field the operation needs, before any network access
    fn validate(&self, request: &TokenOperationRequest) -> Result<()>;

    /// Whether the operation needs a capability classification of the token
    fn needs_capability(&self, _request: &TokenOperationRequest) -> bool {
        false
    }

    /// Build the unsigned transaction of a validated request
    fn encode(&self, request: &TokenOperationRequest, capability: Option<TokenCapability>) -> Result<UnsignedTransaction>;
}

/// Registry of protocol encoders
#[derive(Clone)]
pub struct TransactionEncoder {
    strategies: HashMap<Protocol, Arc<dyn ProtocolEncoder>>,
}

impl Default for TransactionEncoder {
    fn default() -> Self {
        Self::new(Arc::new(RandomTokenId))
    }
}

impl TransactionEncoder {
    /// Encoders for Hathor, Solana and every EVM protocol
    pub fn new(token_ids: Arc<dyn TokenIdGenerator>) -> Self {
        let mut encoder = Self::empty();
        encoder.register(Protocol::Hathor, Arc::new(HathorEncoder));
        encoder.register(Protocol::Solana, Arc::new(SolanaEncoder));
        for protocol in Protocol::EVM {
            encoder.register(protocol, Arc::new(EvmEncoder::new(protocol, token_ids.clone())));
        }
        encoder
    }

    pub fn empty() -> Self {
        Self { strategies: HashMap::new() }
    }

    pub fn register(&mut self, protocol: Protocol, strategy: Arc<dyn ProtocolEncoder>) {
        self.strategies.insert(protocol, strategy);
    }

    /// Strategy for a state-changing operation on `protocol`
    pub fn strategy(&self, kind: OperationKind, protocol: Protocol) -> Result<&dyn ProtocolEncoder> {
        match kind {
            OperationKind::Burn => {
                return Err(Error::NotImplemented(format!("burn is not supported on {}", protocol)));
            }
            kind if kind.is_query() => {
                return Err(Error::validation(format!("{:?} is a query, not a transaction", kind)));
            }
            _ => {}
        }

        self.strategies
            .get(&protocol)
            .map(|s| s.as_ref())
            .ok_or_else(|| Error::UnsupportedProtocol(format!("Token operations are not supported on {}", protocol)))
    }

    pub fn validate(&self, request: &TokenOperationRequest) -> Result<()> {
        self.strategy(request.kind, request.protocol)?.validate(request)
    }

    pub fn needs_capability(&self, request: &TokenOperationRequest) -> Result<bool> {
        Ok(self.strategy(request.kind, request.protocol)?.needs_capability(request))
    }

    /// Validate, then encode
    pub fn encode(&self, request: &TokenOperationRequest, capability: Option<TokenCapability>) -> Result<UnsignedTransaction> {
        let strategy = self.strategy(request.kind, request.protocol)?;
        strategy.validate(request)?;
        strategy.encode(request, capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_ids_stay_in_range() {
        for _ in 0..1000 {
            assert!(RandomTokenId.next_token_id() <= MAX_GENERATED_TOKEN_ID);
        }
    }

    #[test]
    fn test_unsupported_and_unimplemented_operations() {
        let encoder = TransactionEncoder::default();

        let burn = TokenOperationRequest::new(OperationKind::Burn, Protocol::Ethereum);
        assert!(matches!(encoder.validate(&burn), Err(Error::NotImplemented(_))));

        let ripple = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Ripple);
        assert!(matches!(encoder.encode(&ripple, None), Err(Error::UnsupportedProtocol(_))));

        let info = TokenOperationRequest::new(OperationKind::Info, Protocol::Ethereum);
        assert!(matches!(encoder.validate(&info), Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_only_evm_needs_capability() {
        let encoder = TransactionEncoder::default();
        for protocol in Protocol::EVM {
            let request = TokenOperationRequest::new(OperationKind::Transfer, protocol);
            assert!(encoder.needs_capability(&request).unwrap());
        }
        let hathor = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Hathor);
        assert!(!encoder.needs_capability(&hathor).unwrap());
    }
}
