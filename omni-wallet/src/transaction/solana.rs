//! Solana token transfers
//!
//! A transfer is a single SPL token instruction; NFTs move one unit at a time
//! unless the caller says otherwise.

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use super::encoder::ProtocolEncoder;
use super::types::{
    OperationKind, TokenCapability, TokenOperationRequest, TransactionPayload, TransferInstruction, UnsignedTransaction,
};
use super::validation;

/// Amount of an NFT transfer that does not name one
pub const DEFAULT_NFT_AMOUNT: u64 = 1;

/// Encoder for Solana transfers
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaEncoder;

impl SolanaEncoder {
    fn instruction(request: &TokenOperationRequest) -> Result<TransferInstruction> {
        if request.destinations.is_some() {
            return Err(Error::validation("Multiple destinations are not supported on solana"));
        }

        let source = validation::require_address(&request.sender, "sender", Protocol::Solana)?;
        let destination = validation::require_address(&request.destination, "destination", Protocol::Solana)?;
        let token = validation::require_address(&request.token, "token", Protocol::Solana)?;
        let amount = match request.amount.as_deref() {
            Some(amount) => validation::parse_units(amount, "amount")?,
            None => DEFAULT_NFT_AMOUNT,
        };

        Ok(TransferInstruction {
            source: source.to_string(),
            destination: destination.to_string(),
            token: token.to_string(),
            amount,
            is_nft: true,
        })
    }
}

impl ProtocolEncoder for SolanaEncoder {
    fn validate(&self, request: &TokenOperationRequest) -> Result<()> {
        if request.kind != OperationKind::Transfer {
            return Err(Error::UnsupportedProtocol(format!("{:?} is not supported on solana", request.kind)));
        }
        Self::instruction(request).map(|_| ())
    }

    fn encode(&self, request: &TokenOperationRequest, _capability: Option<TokenCapability>) -> Result<UnsignedTransaction> {
        let instruction = Self::instruction(request)?;
        debug!(token = %instruction.token, amount = instruction.amount, "encoded solana transfer");

        Ok(UnsignedTransaction {
            protocol: Protocol::Solana,
            target: instruction.token.clone(),
            payload: TransactionPayload::Instruction(instruction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> String {
        bs58::encode([byte; 32]).into_string()
    }

    #[test]
    fn test_nft_transfer_instruction() {
        let request = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Solana)
            .sender(account(1))
            .destination(account(2))
            .token(account(3));
        let tx = SolanaEncoder.encode(&request, None).unwrap();

        assert_eq!(tx.target, account(3));
        assert_eq!(
            tx.payload,
            TransactionPayload::Instruction(TransferInstruction {
                source: account(1),
                destination: account(2),
                token: account(3),
                amount: DEFAULT_NFT_AMOUNT,
                is_nft: true,
            })
        );
    }

    #[test]
    fn test_requires_source() {
        let request = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Solana)
            .destination(account(2))
            .token(account(3));
        assert_eq!(SolanaEncoder.validate(&request), Err(Error::ValidationFailed("Missing sender".to_string())));
    }
}
