//! External collaborators
//!
//! Submission, chain queries and on-chain reads cross the network boundary
//! and live behind these traits. The dispatcher only ever talks to the traits;
//! `HttpChainQuery` and `RpcContractReader` are the stock implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use ethers::abi;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest};
use ethers_providers::{Http, Middleware, Provider, ProviderError, RpcError};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::Protocol;
use super::types::{ContractParam, TransactionReceipt, UnsignedTransaction};

/// Signs and broadcasts unsigned transactions
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, transaction: &UnsignedTransaction) -> Result<TransactionReceipt>;
}

/// Read-only queries against the chain API
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn query(&self, protocol: Protocol, path: &str, params: &[(String, String)]) -> Result<Value>;
}

/// Read-only contract calls returning a boolean
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(&self, protocol: Protocol, contract: &str, method_signature: &str, params: &[ContractParam]) -> Result<bool>;
}

/// Chain query API over HTTP
#[derive(Debug, Clone)]
pub struct HttpChainQuery {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpChainQuery {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = self.api_key {
            if let Ok(value) = HeaderValue::from_str(key) {
                headers.insert("x-api-key", value);
            }
        }
        headers
    }
}

#[async_trait]
impl ChainQuery for HttpChainQuery {
    async fn query(&self, protocol: Protocol, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%protocol, %url, "chain query");

        let response = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| Error::Network(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Serialization(format!("Invalid response from {}: {}", url, e)))
    }
}

/// Contract reader over JSON-RPC `eth_call`
#[derive(Debug, Clone)]
pub struct RpcContractReader {
    providers: HashMap<Protocol, Provider<Http>>,
}

impl RpcContractReader {
    /// One provider per EVM protocol with a configured endpoint
    pub fn new(config: &Config) -> Result<Self> {
        let mut providers = HashMap::new();
        for (protocol, url) in &config.rpc_urls {
            if !protocol.is_evm() {
                return Err(Error::UnsupportedProtocol(format!("{} has no contract reader", protocol)));
            }
            let provider = Provider::<Http>::try_from(url.as_str())
                .map_err(|e| Error::Network(format!("Invalid RPC endpoint for {}: {}", protocol, e)))?;
            providers.insert(*protocol, provider);
        }
        Ok(Self { providers })
    }
}

#[async_trait]
impl ContractReader for RpcContractReader {
    async fn call(&self, protocol: Protocol, contract: &str, method_signature: &str, params: &[ContractParam]) -> Result<bool> {
        let provider = self
            .providers
            .get(&protocol)
            .ok_or_else(|| Error::ProbeUnavailable(format!("No RPC endpoint configured for {}", protocol)))?;
        let to: Address = contract
            .parse()
            .map_err(|_| Error::validation(format!("Invalid contract address: {}", contract)))?;

        let mut data = ethers::utils::id(method_signature).to_vec();
        let tokens: Vec<_> = params.iter().map(ContractParam::to_token).collect();
        data.extend(abi::encode(&tokens));

        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        match provider.call(&tx, None).await {
            // ABI bool: one 32-byte word, 1 for true
            Ok(output) => Ok(output.len() >= 32 && output[31] == 1 && output[..31].iter().all(|b| *b == 0)),
            Err(ProviderError::JsonRpcClientError(e)) if e.as_error_response().is_some() => {
                // The node executed the call and it reverted
                debug!(%protocol, contract, method_signature, "contract call reverted");
                Ok(false)
            }
            Err(e) => Err(Error::ProbeUnavailable(format!("eth_call to {} failed: {}", contract, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header() {
        let config = Config { api_key: Some("secret".to_string()), ..Config::default() };
        let query = HttpChainQuery::new(&config);
        assert_eq!(query.build_headers().get("x-api-key").unwrap(), "secret");

        let anonymous = HttpChainQuery::new(&Config::default());
        assert!(anonymous.build_headers().is_empty());
    }

    #[test]
    fn test_reader_rejects_non_evm_endpoint() {
        let config = Config::default().with_rpc_url(Protocol::Hathor, "http://localhost:8545");
        assert!(matches!(RpcContractReader::new(&config), Err(Error::UnsupportedProtocol(_))));
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_probe_unavailable() {
        let reader = RpcContractReader::new(&Config::default()).unwrap();
        let result = reader
            .call(Protocol::Ethereum, "0x0000000000000000000000000000000000000001", "supportsInterface(bytes4)", &[])
            .await;
        assert!(matches!(result, Err(Error::ProbeUnavailable(_))));
    }
}
