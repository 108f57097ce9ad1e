use crate::PublicKey;
use serde::{Deserialize, Serialize};
use std::convert::TryInto;
use std::fmt::{Debug, Display, Formatter};

/// Raw signature bytes attached to a transaction input.
///
/// The bytes are kept as given; malformed signatures are only detected when verified.
#[derive(Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| format!("Invalid signature hex: {}: {}", s, e))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// Decides whether `signature` authenticates `message` under `owner`.
///
/// Implementations must be side-effect free.
pub trait SignatureVerifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}

/// Verifies Ed25519 signatures. Malformed keys and signatures never verify.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        use ed25519_dalek::Verifier;
        let verifying_key = match ed25519_dalek::VerifyingKey::from_bytes(owner.as_bytes()) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature_bytes: [u8; 64] = match signature.as_slice().try_into() {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let signature = ed25519_dalek::Signature::from_bytes(&signature_bytes);
        verifying_key.verify(message, &signature).is_ok()
    }
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        (**self).verify(owner, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Ed25519Verifier, KeyPair, Signature, SignatureVerifier};

    #[test]
    fn verifies_matching_signature() {
        let key_pair = KeyPair::from_seed(&[3; 32]);
        let signature = key_pair.sign(b"message");
        assert!(Ed25519Verifier.verify(&key_pair.public_key(), b"message", &signature));
    }

    #[test]
    fn rejects_wrong_message_or_owner() {
        let key_pair = KeyPair::from_seed(&[3; 32]);
        let other = KeyPair::from_seed(&[4; 32]);
        let signature = key_pair.sign(b"message");
        assert!(!Ed25519Verifier.verify(&key_pair.public_key(), b"other message", &signature));
        assert!(!Ed25519Verifier.verify(&other.public_key(), b"message", &signature));
    }

    #[test]
    fn rejects_malformed_signature() {
        let key_pair = KeyPair::from_seed(&[3; 32]);
        assert!(!Ed25519Verifier.verify(&key_pair.public_key(), b"message", &Signature::default()));
        assert!(!Ed25519Verifier.verify(
            &key_pair.public_key(),
            b"message",
            &Signature::new(vec![0; 64])
        ));
    }
}
