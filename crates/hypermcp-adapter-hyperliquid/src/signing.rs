//! L1 action signing: msgpack action hash wrapped in an EIP-712 `Agent`
//! message and signed with the account's secp256k1 key.

use crate::wire::SignatureWire;
use hypermcp_core::{ConfigError, Network, VenueError};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::Serialize;
use sha3::{Digest, Keccak256};
use std::fmt;

const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
const AGENT_TYPE: &[u8] = b"Agent(string source,bytes32 connectionId)";
const DOMAIN_CHAIN_ID: u64 = 1337;

pub(crate) struct Wallet {
    key: SigningKey,
    address: [u8; 20],
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Parses a hex private key, with or without a `0x` prefix.
    pub(crate) fn from_hex(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 64 {
            return Err(ConfigError::MalformedCredential(format!(
                "expected 64 hex characters, got {}",
                digits.len()
            )));
        }
        let bytes = hex::decode(digits)
            .map_err(|e| ConfigError::MalformedCredential(format!("not valid hex: {e}")))?;
        let key = SigningKey::from_slice(&bytes).map_err(|_| {
            ConfigError::MalformedCredential("not a valid secp256k1 private key".to_string())
        })?;
        let address = address_of(&key);
        Ok(Self { key, address })
    }

    pub(crate) fn address(&self) -> String {
        format!("0x{}", hex::encode(self.address))
    }

    pub(crate) fn sign_l1_action<T: Serialize>(
        &self,
        action: &T,
        nonce: u64,
        network: Network,
    ) -> Result<SignatureWire, VenueError> {
        let digest = agent_digest(action_hash(action, nonce)?, network);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| VenueError::Internal(format!("signing failed: {e}")))?;
        let bytes = signature.to_bytes();
        Ok(SignatureWire {
            r: format!("0x{}", hex::encode(&bytes[..32])),
            s: format!("0x{}", hex::encode(&bytes[32..])),
            v: 27 + recovery_id.to_byte(),
        })
    }
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn address_of(key: &SigningKey) -> [u8; 20] {
    let point = k256::PublicKey::from(key.verifying_key()).to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

fn u256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Hash of `msgpack(action) || nonce_be || 0x00`; the trailing zero marks
/// the absence of a vault address.
pub(crate) fn action_hash<T: Serialize>(action: &T, nonce: u64) -> Result<[u8; 32], VenueError> {
    let mut bytes = rmp_serde::to_vec_named(action)
        .map_err(|e| VenueError::Internal(format!("failed to encode action: {e}")))?;
    bytes.extend_from_slice(&nonce.to_be_bytes());
    bytes.push(0);
    Ok(keccak256(&bytes))
}

pub(crate) fn agent_digest(connection_id: [u8; 32], network: Network) -> [u8; 32] {
    let mut domain = Vec::with_capacity(32 * 5);
    domain.extend_from_slice(&keccak256(DOMAIN_TYPE));
    domain.extend_from_slice(&keccak256(b"Exchange"));
    domain.extend_from_slice(&keccak256(b"1"));
    domain.extend_from_slice(&u256_word(DOMAIN_CHAIN_ID));
    domain.extend_from_slice(&[0u8; 32]);
    let domain_separator = keccak256(&domain);

    let source: &[u8] = match network {
        Network::Mainnet => b"a",
        Network::Testnet => b"b",
    };
    let mut agent = Vec::with_capacity(32 * 3);
    agent.extend_from_slice(&keccak256(AGENT_TYPE));
    agent.extend_from_slice(&keccak256(source));
    agent.extend_from_slice(&connection_id);
    let struct_hash = keccak256(&agent);

    let mut message = Vec::with_capacity(2 + 32 * 2);
    message.extend_from_slice(&[0x19, 0x01]);
    message.extend_from_slice(&domain_separator);
    message.extend_from_slice(&struct_hash);
    keccak256(&message)
}
