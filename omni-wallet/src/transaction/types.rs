//! Common transaction types

use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::Protocol;

/// Kind of token operation a caller can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Token information (read-only)
    Info,
    /// Token balance of an owner (read-only)
    Balance,
    /// Token metadata (read-only)
    Metadata,
    /// Transfer of a token to another account
    Transfer,
    /// Creation of a new token unit
    Mint,
    /// Destruction of a token unit; declared but not supported
    Burn,
}

impl OperationKind {
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Info | Self::Balance | Self::Metadata)
    }
}

/// Interface standard a token contract implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCapability {
    /// One owner per token id (ERC-721)
    NonFungibleUnique,
    /// An owned quantity per token id (ERC-1155)
    SemiFungible,
    /// Neither interface was reported
    Unknown,
}

impl TokenCapability {
    /// Whether operations on this token carry an amount
    ///
    /// Contracts that do not answer interface introspection are treated as
    /// amount-based.
    pub fn is_amount_based(&self) -> bool {
        !matches!(self, Self::NonFungibleUnique)
    }
}

/// One recipient of a fan-out transfer on a UTXO ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub address: String,
    pub amount: String,
    /// Token to send; defaults to the request's token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Destination {
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { address: address.into(), amount: amount.into(), token: None }
    }
}

/// Protocol specific options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOptions {
    /// Metadata URI of a minted unique token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// ERC-20 token paying the fee (Celo)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_currency: Option<String>,
}

/// Abstract token operation, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOperationRequest {
    pub kind: OperationKind,
    pub protocol: Protocol,
    /// Token uid on Hathor, contract or mint address elsewhere
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    /// Decimal amount in the token's smallest unit
    #[serde(default)]
    pub amount: Option<String>,
    /// Address of the wallet sending or minting
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub destinations: Option<Vec<Destination>>,
    /// Account whose balance is queried
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub options: OperationOptions,
}

impl TokenOperationRequest {
    pub fn new(kind: OperationKind, protocol: Protocol) -> Self {
        Self {
            kind,
            protocol,
            token: None,
            token_id: None,
            amount: None,
            sender: None,
            destination: None,
            destinations: None,
            owner: None,
            options: OperationOptions::default(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn destinations(mut self, destinations: Vec<Destination>) -> Self {
        self.destinations = Some(destinations);
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.options.uri = Some(uri.into());
        self
    }

    pub fn fee_currency(mut self, fee_currency: impl Into<String>) -> Self {
        self.options.fee_currency = Some(fee_currency.into());
        self
    }
}

/// One ABI encoded argument of a contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ContractParam {
    Address(Address),
    Uint(U256),
    Bytes(Bytes),
    FixedBytes(Bytes),
    String(String),
}

impl ContractParam {
    pub fn to_token(&self) -> Token {
        match self {
            Self::Address(address) => Token::Address(*address),
            Self::Uint(value) => Token::Uint(*value),
            Self::Bytes(bytes) => Token::Bytes(bytes.to_vec()),
            Self::FixedBytes(bytes) => Token::FixedBytes(bytes.to_vec()),
            Self::String(value) => Token::String(value.clone()),
        }
    }
}

/// Output of a UTXO token transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoOutput {
    pub address: String,
    pub amount: u64,
    pub token: String,
}

/// Single token transfer instruction of an account-based chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInstruction {
    pub source: String,
    pub destination: String,
    pub token: String,
    pub amount: u64,
    pub is_nft: bool,
}

/// Call of a state-changing contract method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub from: Address,
    pub method: String,
    /// Full method signature, e.g. `safeTransferFrom(address,address,uint256)`
    pub signature: String,
    pub params: Vec<ContractParam>,
    /// Selector followed by the ABI encoded params
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_currency: Option<Address>,
}

/// Protocol specific body of an unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionPayload {
    Utxo { sender: Option<String>, outputs: Vec<UtxoOutput> },
    Instruction(TransferInstruction),
    ContractCall(ContractCall),
}

/// Unsigned transaction, ready for the submission collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub protocol: Protocol,
    /// Contract, token or account the transaction is addressed to
    pub target: String,
    pub payload: TransactionPayload,
}

impl UnsignedTransaction {
    /// Bytes handed to a signer: call data on EVM chains, JSON elsewhere
    pub fn encoded_payload(&self) -> Result<Vec<u8>> {
        match &self.payload {
            TransactionPayload::ContractCall(call) => Ok(call.data.to_vec()),
            payload => Ok(serde_json::to_vec(payload)?),
        }
    }

    pub fn contract_call(&self) -> Option<&ContractCall> {
        match &self.payload {
            TransactionPayload::ContractCall(call) => Some(call),
            _ => None,
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction is pending
    Pending,
    /// Transaction is confirmed
    Confirmed,
    /// Transaction failed
    Failed,
}

/// Transaction receipt returned by the submission collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash
    pub hash: String,
    /// Status
    pub status: TransactionStatus,
    /// Block number
    pub block_number: Option<u64>,
    /// Fee paid
    pub fee: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let json = r#"{
            "kind": "transfer",
            "protocol": "hathor",
            "token": "00",
            "destinations": [{"address": "H1", "amount": "2"}],
            "options": {"feeCurrency": "0x0"}
        }"#;
        let request: TokenOperationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.kind, OperationKind::Transfer);
        assert_eq!(request.protocol, Protocol::Hathor);
        assert_eq!(request.destinations.unwrap()[0], Destination::new("H1", "2"));
        assert_eq!(request.options.fee_currency.as_deref(), Some("0x0"));
        assert!(request.destination.is_none());
    }

    #[test]
    fn test_unknown_capability_is_amount_based() {
        assert!(TokenCapability::Unknown.is_amount_based());
        assert!(TokenCapability::SemiFungible.is_amount_based());
        assert!(!TokenCapability::NonFungibleUnique.is_amount_based());
    }

    #[test]
    fn test_non_evm_payload_encodes_as_json() {
        let tx = UnsignedTransaction {
            protocol: Protocol::Solana,
            target: "mint".to_string(),
            payload: TransactionPayload::Instruction(TransferInstruction {
                source: "a".to_string(),
                destination: "b".to_string(),
                token: "mint".to_string(),
                amount: 1,
                is_nft: true,
            }),
        };

        let value: serde_json::Value = serde_json::from_slice(&tx.encoded_payload().unwrap()).unwrap();
        assert_eq!(value["type"], "instruction");
        assert_eq!(value["isNft"], true);
    }
}
