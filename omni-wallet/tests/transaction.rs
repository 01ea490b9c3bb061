//! Transaction encoding per protocol

use std::sync::Arc;

use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, U256};
use omni_wallet::transaction::{
    ContractParam, Destination, OperationKind, TokenCapability, TokenIdGenerator, TokenOperationRequest,
    TransactionEncoder, TransactionPayload, ERC1155_MINT, ERC1155_SAFE_TRANSFER, ERC721_MINT, ERC721_SAFE_TRANSFER,
};
use omni_wallet::{Error, Protocol};

const SENDER: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";
const RECEIVER: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

struct FixedTokenId(u64);

impl TokenIdGenerator for FixedTokenId {
    fn next_token_id(&self) -> u64 {
        self.0
    }
}

fn encoder() -> TransactionEncoder {
    TransactionEncoder::new(Arc::new(FixedTokenId(424242)))
}

fn evm_transfer(protocol: Protocol) -> TokenOperationRequest {
    TokenOperationRequest::new(OperationKind::Transfer, protocol)
        .sender(SENDER)
        .token(CONTRACT)
        .destination(RECEIVER)
        .token_id("77")
}

fn decode_call(data: &[u8], signature: &str, types: &[ParamType]) -> Vec<Token> {
    assert_eq!(&data[..4], &ethers::utils::id(signature)[..]);
    abi::decode(types, &data[4..]).unwrap()
}

#[test]
fn test_unknown_capability_uses_amount_layout() {
    let request = evm_transfer(Protocol::Ethereum).amount("3");
    let tx = encoder().encode(&request, Some(TokenCapability::Unknown)).unwrap();
    let call = tx.contract_call().unwrap();

    assert_eq!(call.signature, ERC1155_SAFE_TRANSFER);
    let tokens = decode_call(
        &call.data,
        ERC1155_SAFE_TRANSFER,
        &[ParamType::Address, ParamType::Address, ParamType::Uint(256), ParamType::Uint(256), ParamType::Bytes],
    );
    assert_eq!(
        tokens,
        vec![
            Token::Address(SENDER.parse::<Address>().unwrap()),
            Token::Address(RECEIVER.parse::<Address>().unwrap()),
            Token::Uint(U256::from(77)),
            Token::Uint(U256::from(3)),
            Token::Bytes(vec![]),
        ]
    );
}

#[test]
fn test_unique_transfer_ignores_amount() {
    let request = evm_transfer(Protocol::Bsc).amount("9");
    let tx = encoder().encode(&request, Some(TokenCapability::NonFungibleUnique)).unwrap();
    let call = tx.contract_call().unwrap();

    let tokens = decode_call(
        &call.data,
        ERC721_SAFE_TRANSFER,
        &[ParamType::Address, ParamType::Address, ParamType::Uint(256)],
    );
    assert_eq!(tokens[2], Token::Uint(U256::from(77)));
    assert_eq!(tx.protocol, Protocol::Bsc);
}

#[test]
fn test_amount_bounds_on_every_evm_protocol() {
    for protocol in Protocol::EVM {
        let negative = evm_transfer(protocol).amount("-5");
        assert!(matches!(encoder().validate(&negative), Err(Error::InvalidAmount(_))), "{}", protocol);

        let missing = evm_transfer(protocol);
        let result = encoder().encode(&missing, Some(TokenCapability::SemiFungible));
        assert!(matches!(result, Err(Error::InvalidAmount(_))), "{}", protocol);

        let result = encoder().encode(&missing, Some(TokenCapability::Unknown));
        assert!(matches!(result, Err(Error::InvalidAmount(_))), "{}", protocol);

        let zero = evm_transfer(protocol).amount("0");
        assert!(encoder().encode(&zero, Some(TokenCapability::SemiFungible)).is_ok(), "{}", protocol);

        for blank in ["", "   "] {
            let request = evm_transfer(protocol).amount(blank);
            assert!(matches!(encoder().validate(&request), Err(Error::InvalidAmount(_))), "{}", protocol);
            let result = encoder().encode(&request, Some(TokenCapability::SemiFungible));
            assert!(matches!(result, Err(Error::InvalidAmount(_))), "{}", protocol);
        }
    }
}

fn evm_mint(protocol: Protocol) -> TokenOperationRequest {
    TokenOperationRequest::new(OperationKind::Mint, protocol)
        .sender(SENDER)
        .token(CONTRACT)
        .destination(RECEIVER)
}

#[test]
fn test_mint_amount_bounds_on_every_evm_protocol() {
    for protocol in Protocol::EVM {
        let negative = evm_mint(protocol).amount("-5");
        assert!(matches!(encoder().validate(&negative), Err(Error::InvalidAmount(_))), "{}", protocol);
        for capability in [TokenCapability::NonFungibleUnique, TokenCapability::SemiFungible] {
            let result = encoder().encode(&negative, Some(capability));
            assert!(matches!(result, Err(Error::InvalidAmount(_))), "{}", protocol);
        }

        let missing = evm_mint(protocol);
        for capability in [TokenCapability::SemiFungible, TokenCapability::Unknown] {
            let result = encoder().encode(&missing, Some(capability));
            assert!(matches!(result, Err(Error::InvalidAmount(_))), "{}", protocol);
        }

        for blank in ["", "   "] {
            let result = encoder().encode(&evm_mint(protocol).amount(blank), Some(TokenCapability::SemiFungible));
            assert!(matches!(result, Err(Error::InvalidAmount(_))), "{}", protocol);
        }

        let zero = evm_mint(protocol).amount("0");
        assert!(encoder().encode(&zero, Some(TokenCapability::SemiFungible)).is_ok(), "{}", protocol);
    }
}

#[test]
fn test_blank_token_id_never_becomes_zero() {
    let mint = evm_mint(Protocol::Polygon).token_id("");
    assert!(matches!(encoder().validate(&mint), Err(Error::ValidationFailed(_))));
    let result = encoder().encode(&mint, Some(TokenCapability::NonFungibleUnique));
    assert!(matches!(result, Err(Error::ValidationFailed(_))));

    let transfer = evm_transfer(Protocol::Ethereum).token_id("  ");
    let result = encoder().encode(&transfer, Some(TokenCapability::NonFungibleUnique));
    assert!(matches!(result, Err(Error::ValidationFailed(_))));
}

#[test]
fn test_mint_layouts() {
    let request = TokenOperationRequest::new(OperationKind::Mint, Protocol::Polygon)
        .sender(SENDER)
        .token(CONTRACT)
        .destination(RECEIVER)
        .uri("ipfs://meta");

    let unique = encoder().encode(&request, Some(TokenCapability::NonFungibleUnique)).unwrap();
    let tokens = decode_call(
        &unique.contract_call().unwrap().data,
        ERC721_MINT,
        &[ParamType::Address, ParamType::Uint(256), ParamType::String],
    );
    assert_eq!(tokens[1], Token::Uint(U256::from(424242)));
    assert_eq!(tokens[2], Token::String("ipfs://meta".to_string()));

    let amount_based = encoder()
        .encode(&request.clone().token_id("5").amount("10"), Some(TokenCapability::SemiFungible))
        .unwrap();
    let call = amount_based.contract_call().unwrap();
    assert_eq!(call.signature, ERC1155_MINT);
    assert_eq!(call.params[1], ContractParam::Uint(U256::from(5)));
    assert_eq!(call.params[2], ContractParam::Uint(U256::from(10)));
}

#[test]
fn test_mint_is_evm_only() {
    for protocol in [Protocol::Hathor, Protocol::Solana] {
        let request = TokenOperationRequest::new(OperationKind::Mint, protocol);
        assert!(matches!(encoder().validate(&request), Err(Error::UnsupportedProtocol(_))), "{}", protocol);
    }
    for protocol in [Protocol::Bitcoin, Protocol::Ripple, Protocol::Stellar] {
        let request = TokenOperationRequest::new(OperationKind::Mint, protocol);
        assert!(matches!(encoder().validate(&request), Err(Error::UnsupportedProtocol(_))), "{}", protocol);
    }
}

fn hathor_address(byte: u8) -> String {
    omni_wallet::crypto::encoding::base58check_encode(0x28, &[byte; 20], bs58::Alphabet::BITCOIN)
}

#[test]
fn test_hathor_exactly_one_destination_form() {
    let base = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Hathor).token("00");

    let both = base
        .clone()
        .destination(hathor_address(1))
        .amount("1")
        .destinations(vec![Destination::new(hathor_address(2), "1")]);
    assert!(matches!(encoder().encode(&both, None), Err(Error::ValidationFailed(_))));

    let neither = base.clone().amount("1");
    assert!(matches!(encoder().encode(&neither, None), Err(Error::ValidationFailed(_))));

    let fan_out = base.destinations(vec![
        Destination::new(hathor_address(1), "1"),
        Destination::new(hathor_address(2), "4"),
    ]);
    let tx = encoder().encode(&fan_out, None).unwrap();
    match tx.payload {
        TransactionPayload::Utxo { outputs, .. } => {
            assert_eq!(outputs.len(), 2);
            assert_eq!(outputs[1].address, hathor_address(2));
            assert_eq!(outputs[1].amount, 4);
            assert!(outputs.iter().all(|o| o.token == "00"));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_solana_single_instruction() {
    let account = |b: u8| bs58::encode([b; 32]).into_string();
    let request = TokenOperationRequest::new(OperationKind::Transfer, Protocol::Solana)
        .sender(account(1))
        .destination(account(2))
        .token(account(3))
        .amount("1");

    let tx = encoder().encode(&request, None).unwrap();
    match tx.payload {
        TransactionPayload::Instruction(instruction) => {
            assert_eq!(instruction.source, account(1));
            assert_eq!(instruction.destination, account(2));
            assert_eq!(instruction.amount, 1);
            assert!(instruction.is_nft);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}
