//! Hathor token transfers
//!
//! Tokens live in outputs, so one transaction can fan a token out to many
//! recipients.

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use super::encoder::ProtocolEncoder;
use super::types::{
    Destination, OperationKind, TokenCapability, TokenOperationRequest, TransactionPayload, UnsignedTransaction,
    UtxoOutput,
};
use super::validation;

/// Hathor token uids are 32-byte hashes; `00` is the native token
fn is_token_uid(uid: &str) -> bool {
    uid == "00" || (uid.len() == 64 && hex::decode(uid).is_ok())
}

/// Encoder for Hathor transfers
#[derive(Debug, Clone, Copy, Default)]
pub struct HathorEncoder;

impl HathorEncoder {
    /// The single destination form, or the fan-out list; never both, never neither
    fn destinations(request: &TokenOperationRequest) -> Result<Vec<Destination>> {
        match (&request.destination, &request.destinations) {
            (Some(_), Some(_)) => Err(Error::validation("Provide either destination or destinations, not both")),
            (None, None) => Err(Error::validation("Missing destination")),
            (Some(address), None) => {
                let amount = validation::require(&request.amount, "amount")?;
                Ok(vec![Destination::new(address.clone(), amount)])
            }
            (None, Some(list)) if list.is_empty() => Err(Error::validation("Destinations must not be empty")),
            (None, Some(list)) => Ok(list.clone()),
        }
    }

    fn outputs(request: &TokenOperationRequest) -> Result<Vec<UtxoOutput>> {
        let token = validation::require(&request.token, "token uid")?;

        Self::destinations(request)?
            .into_iter()
            .map(|destination| {
                validation::check_address(&destination.address, "destination", Protocol::Hathor)?;
                let token = destination.token.as_deref().unwrap_or(token);
                if !is_token_uid(token) {
                    return Err(Error::validation(format!("Invalid token uid: {}", token)));
                }
                Ok(UtxoOutput {
                    amount: validation::parse_units(&destination.amount, "amount")?,
                    token: token.to_string(),
                    address: destination.address,
                })
            })
            .collect()
    }
}

impl ProtocolEncoder for HathorEncoder {
    fn validate(&self, request: &TokenOperationRequest) -> Result<()> {
        if request.kind != OperationKind::Transfer {
            return Err(Error::UnsupportedProtocol(format!("{:?} is not supported on hathor", request.kind)));
        }
        if let Some(sender) = request.sender.as_deref() {
            validation::check_address(sender, "sender", Protocol::Hathor)?;
        }
        Self::outputs(request).map(|_| ())
    }

    fn encode(&self, request: &TokenOperationRequest, _capability: Option<TokenCapability>) -> Result<UnsignedTransaction> {
        let outputs = Self::outputs(request)?;
        let target = validation::require(&request.token, "token uid")?.to_string();

        debug!(outputs = outputs.len(), token = %target, "encoded hathor transfer");

        Ok(UnsignedTransaction {
            protocol: Protocol::Hathor,
            target,
            payload: TransactionPayload::Utxo { sender: request.sender.clone(), outputs },
        })
    }
}
