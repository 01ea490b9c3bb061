//! Query routes for read-only token and wallet operations

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use crate::transaction::validation;
use crate::transaction::{OperationKind, TokenOperationRequest};

/// Path and query string of one chain API request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRoute {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl QueryRoute {
    fn new(path: String, protocol: Protocol) -> Self {
        Self { path, params: vec![("protocol".to_string(), protocol.to_string())] }
    }

    fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }
}

/// Route of an info, balance or metadata request
///
/// Hathor tokens are addressed by uid, everything else by contract or mint
/// address.
pub fn token_route(request: &TokenOperationRequest) -> Result<QueryRoute> {
    let protocol = request.protocol;
    let reference = match protocol {
        Protocol::Hathor => validation::require(&request.token, "token uid")?,
        Protocol::Solana => validation::require_address(&request.token, "token", protocol)?,
        p if p.is_evm() => validation::require_address(&request.token, "token", protocol)?,
        _ => {
            return Err(Error::UnsupportedProtocol(format!("Token queries are not supported on {}", protocol)));
        }
    };
    let token_id = match request.token_id.as_deref() {
        Some(id) => Some(validation::parse_token_id(id).map(|_| id.trim())?),
        None => None,
    };

    match request.kind {
        OperationKind::Info => Ok(QueryRoute::new(format!("/nft/{}/info", reference), protocol)),
        OperationKind::Balance => {
            let owner = validation::require_address(&request.owner, "owner", protocol)?;
            let route = QueryRoute::new(format!("/nft/{}/balance/{}", reference, owner), protocol);
            Ok(match token_id {
                Some(id) if protocol != Protocol::Hathor => route.param("tokenId", id),
                _ => route,
            })
        }
        OperationKind::Metadata => {
            let route = QueryRoute::new(format!("/nft/{}/metadata", reference), protocol);
            match token_id {
                _ if protocol == Protocol::Hathor => Ok(route),
                Some(id) => Ok(route.param("tokenId", id)),
                None if protocol.is_evm() => Err(Error::validation("Missing token id")),
                None => Ok(route),
            }
        }
        kind => Err(Error::validation(format!("{:?} is not a query", kind))),
    }
}

/// Route of a wallet info request, optionally with token balances
pub fn wallet_info_route(address: &str, protocol: Protocol, token_addresses: &[String]) -> Result<QueryRoute> {
    validation::check_address(address, "wallet", protocol)?;

    let mut route = QueryRoute::new(format!("/wallet/{}/info", address), protocol);
    for token in token_addresses {
        route = route.param("tokenAddresses[]", token.clone());
    }
    Ok(route)
}
