use crate::Signature;
use ed25519_dalek::Signer;
use serde::{Deserialize, Serialize};
use std::convert::TryInto;
use std::fmt::{Debug, Display, Formatter};

const PUBLIC_KEY_BYTE_COUNT: usize = 32;

/// The address of an output owner: an Ed25519 verifying key.
#[derive(Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct PublicKey([u8; PUBLIC_KEY_BYTE_COUNT]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| format!("Invalid hex: {}: {}", s, e))?;
        let len = bytes.len();
        let raw: [u8; PUBLIC_KEY_BYTE_COUNT] = bytes.try_into().map_err(|_| {
            format!(
                "Invalid public key length. Expected: {} but got: {} in: {}",
                PUBLIC_KEY_BYTE_COUNT, len, s
            )
        })?;
        Ok(Self(raw))
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

/// A signing key together with the address it controls.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Derives the key pair from a fixed seed, so tests and demo files are reproducible.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{KeyPair, PublicKey};

    #[test]
    fn seeded_key_pair_is_deterministic() {
        let first = KeyPair::from_seed(&[7; 32]);
        let second = KeyPair::from_seed(&[7; 32]);
        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(first.sign(b"payload"), second.sign(b"payload"));
        assert_ne!(first.public_key(), KeyPair::from_seed(&[8; 32]).public_key());
    }

    #[test]
    fn public_key_hex_test() {
        let public_key = KeyPair::from_seed(&[1; 32]).public_key();
        assert_eq!(PublicKey::from_hex(&public_key.to_hex()), Ok(public_key));
        assert!(PublicKey::from_hex("00ff").is_err());
    }
}
