use std::{fmt, path::Path, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine};
use shared_crypto::intent::{Intent, IntentMessage};
use sui_sdk::types::{
    base_types::SuiAddress,
    crypto::{EncodeDecodeBase64, Signature, SignatureScheme, SuiKeyPair},
    transaction::TransactionData,
};

use crate::errors::MmError;

const BECH32_PREFIX: &str = "suiprivkey";

/// A signing identity. The address is derived once from the secret.
#[derive(Clone)]
pub struct Wallet {
    pub address: SuiAddress,
    keypair: Arc<SuiKeyPair>,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Accepts a bech32 `suiprivkey...` string, a base64 `flag || key`
    /// string, or a hex ed25519 seed with or without `0x`.
    pub fn from_secret(secret: &str) -> Result<Self, MmError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(MmError::InvalidKeyMaterial("empty secret".to_string()));
        }

        let keypair = if secret.starts_with(BECH32_PREFIX) {
            SuiKeyPair::decode(secret).map_err(|err| MmError::InvalidKeyMaterial(err.to_string()))?
        } else if let Some(seed) = parse_hex_seed(secret) {
            let mut flagged = Vec::with_capacity(33);
            flagged.push(SignatureScheme::ED25519.flag());
            flagged.extend_from_slice(&seed);
            SuiKeyPair::decode_base64(&STANDARD.encode(flagged))
                .map_err(|err| MmError::InvalidKeyMaterial(err.to_string()))?
        } else {
            SuiKeyPair::decode_base64(secret)
                .map_err(|err| MmError::InvalidKeyMaterial(err.to_string()))?
        };

        Ok(Self {
            address: SuiAddress::from(&keypair.public()),
            keypair: Arc::new(keypair),
        })
    }

    pub fn sign(&self, data: &TransactionData) -> Signature {
        let intent_msg = IntentMessage::new(Intent::sui_transaction(), data.clone());
        Signature::new_secure(&intent_msg, self.keypair.as_ref())
    }
}

fn parse_hex_seed(secret: &str) -> Option<[u8; 32]> {
    let hex_str = secret.strip_prefix("0x").unwrap_or(secret);
    if hex_str.len() != 64 {
        return None;
    }
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}

/// One secret per line. Blank lines and `#` comments are skipped.
pub fn load_wallets(path: impl AsRef<Path>) -> Result<Vec<Wallet>, MmError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|err| MmError::InvalidInput(format!("cannot read {:?}: {}", path, err)))?;
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Wallet::from_secret)
        .collect()
}
