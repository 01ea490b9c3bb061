//! EVM token transactions
//!
//! Transfer and mint calls for ERC-721 and ERC-1155 contracts. Which method
//! and parameter layout is used depends on the contract's capability.

use std::sync::Arc;

use ethers::abi;
use ethers::types::{Address, Bytes, U256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use super::encoder::{ProtocolEncoder, TokenIdGenerator};
use super::types::{
    ContractCall, ContractParam, OperationKind, TokenCapability, TokenOperationRequest, TransactionPayload,
    UnsignedTransaction,
};
use super::validation;

/// ERC-721 transfer of one unique token
pub const ERC721_SAFE_TRANSFER: &str = "safeTransferFrom(address,address,uint256)";
/// ERC-1155 transfer of an amount of a token id
pub const ERC1155_SAFE_TRANSFER: &str = "safeTransferFrom(address,address,uint256,uint256,bytes)";
/// Mint of a unique token with its metadata URI
pub const ERC721_MINT: &str = "mintWithTokenURI(address,uint256,string)";
/// Mint of an amount of a token id
pub const ERC1155_MINT: &str = "mint(address,uint256,uint256,bytes)";

/// Encoder for one EVM protocol
pub struct EvmEncoder {
    protocol: Protocol,
    token_ids: Arc<dyn TokenIdGenerator>,
}

impl EvmEncoder {
    pub fn new(protocol: Protocol, token_ids: Arc<dyn TokenIdGenerator>) -> Self {
        Self { protocol, token_ids }
    }

    fn fee_currency(&self, request: &TokenOperationRequest) -> Result<Option<Address>> {
        if request.options.fee_currency.is_none() {
            return Ok(None);
        }
        if self.protocol != Protocol::Celo {
            return Err(Error::validation(format!("feeCurrency is not supported on {}", self.protocol)));
        }
        validation::require_evm_address(&request.options.fee_currency, "feeCurrency", self.protocol).map(Some)
    }

    fn transfer(&self, request: &TokenOperationRequest, capability: TokenCapability) -> Result<(&'static str, Vec<ContractParam>)> {
        let from = validation::require_evm_address(&request.sender, "sender", self.protocol)?;
        let to = validation::require_evm_address(&request.destination, "destination", self.protocol)?;
        let token_id = validation::parse_token_id(validation::require(&request.token_id, "token id")?)?;

        let mut params = vec![ContractParam::Address(from), ContractParam::Address(to), ContractParam::Uint(token_id)];
        if !capability.is_amount_based() {
            return Ok((ERC721_SAFE_TRANSFER, params));
        }

        let amount = validation::require_amount(request.amount.as_deref())?;
        params.push(ContractParam::Uint(amount));
        params.push(ContractParam::Bytes(Bytes::default()));
        Ok((ERC1155_SAFE_TRANSFER, params))
    }

    fn mint(&self, request: &TokenOperationRequest, capability: TokenCapability) -> Result<(&'static str, Vec<ContractParam>)> {
        let to = validation::require_evm_address(&request.destination, "destination", self.protocol)?;
        let token_id = match request.token_id.as_deref() {
            Some(id) => validation::parse_token_id(id)?,
            None => {
                let id = self.token_ids.next_token_id();
                debug!(protocol = %self.protocol, token_id = id, "generated token id for mint");
                U256::from(id)
            }
        };

        if !capability.is_amount_based() {
            let uri = request.options.uri.clone().unwrap_or_default();
            return Ok((
                ERC721_MINT,
                vec![ContractParam::Address(to), ContractParam::Uint(token_id), ContractParam::String(uri)],
            ));
        }

        let amount = validation::require_amount(request.amount.as_deref())?;
        Ok((
            ERC1155_MINT,
            vec![
                ContractParam::Address(to),
                ContractParam::Uint(token_id),
                ContractParam::Uint(amount),
                ContractParam::Bytes(Bytes::default()),
            ],
        ))
    }
}

impl ProtocolEncoder for EvmEncoder {
    fn validate(&self, request: &TokenOperationRequest) -> Result<()> {
        if request.protocol != self.protocol {
            return Err(Error::validation(format!("Request for {} sent to the {} encoder", request.protocol, self.protocol)));
        }

        validation::require_evm_address(&request.sender, "sender", self.protocol)?;
        validation::require_evm_address(&request.token, "token", self.protocol)?;
        validation::require_evm_address(&request.destination, "destination", self.protocol)?;
        if request.destinations.is_some() {
            return Err(Error::validation(format!("Multiple destinations are not supported on {}", self.protocol)));
        }

        match request.kind {
            OperationKind::Transfer => {
                validation::parse_token_id(validation::require(&request.token_id, "token id")?)?;
            }
            OperationKind::Mint => {
                if let Some(id) = request.token_id.as_deref() {
                    validation::parse_token_id(id)?;
                }
            }
            kind => return Err(Error::validation(format!("{:?} is not an EVM transaction", kind))),
        }

        validation::check_amount(request.amount.as_deref())?;
        self.fee_currency(request)?;
        Ok(())
    }

    fn needs_capability(&self, request: &TokenOperationRequest) -> bool {
        matches!(request.kind, OperationKind::Transfer | OperationKind::Mint)
    }

    fn encode(&self, request: &TokenOperationRequest, capability: Option<TokenCapability>) -> Result<UnsignedTransaction> {
        let capability = capability
            .ok_or_else(|| Error::validation("Token capability must be resolved before encoding an EVM call"))?;
        let contract = validation::require_evm_address(&request.token, "token", self.protocol)?;
        let from = validation::require_evm_address(&request.sender, "sender", self.protocol)?;

        let (signature, params) = match request.kind {
            OperationKind::Mint => self.mint(request, capability)?,
            _ => self.transfer(request, capability)?,
        };

        let mut data = ethers::utils::id(signature).to_vec();
        let tokens: Vec<_> = params.iter().map(ContractParam::to_token).collect();
        data.extend(abi::encode(&tokens));

        debug!(protocol = %self.protocol, ?capability, signature, "encoded contract call");

        Ok(UnsignedTransaction {
            protocol: self.protocol,
            target: ethers::utils::to_checksum(&contract, None),
            payload: TransactionPayload::ContractCall(ContractCall {
                from,
                method: signature.split('(').next().unwrap_or(signature).to_string(),
                signature: signature.to_string(),
                params,
                data: data.into(),
                fee_currency: self.fee_currency(request)?,
            }),
        })
    }
}
