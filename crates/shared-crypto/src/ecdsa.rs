//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable signatures over 32-byte prehashed messages, Ethereum style.
//!
//! ## Wire Format
//!
//! A signature is 65 bytes: `r (32) || s (32) || v (1)`. Signing emits
//! `v = 27 + recovery_id`; recovery accepts both `0/1` and `27/28`.

use crate::CryptoError;
use crate::hashing::keccak256;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{Address, Hash};

/// Length of a serialized recoverable signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// 65-byte `r || s || v` signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Parse from a byte slice, checking only the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; SIGNATURE_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(raw))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Copy into an owned vector (witness form).
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Recover the signer address for `hash`.
    pub fn recover(&self, hash: &Hash) -> Result<Address, CryptoError> {
        let v = self.0[64];
        let recovery_byte = match v {
            0 | 1 => v,
            27 | 28 => v - 27,
            other => return Err(CryptoError::InvalidRecoveryId(other)),
        };
        let recovery_id =
            RecoveryId::from_byte(recovery_byte).ok_or(CryptoError::InvalidRecoveryId(v))?;
        let sig = Signature::from_slice(&self.0[..64]).map_err(|_| CryptoError::InvalidSignature)?;

        let recovered_key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;
        Ok(address_from_pubkey(&recovered_key))
    }
}

/// Recover the signer address of a 65-byte witness over `hash`.
pub fn recover_address(hash: &Hash, signature: &[u8]) -> Result<Address, CryptoError> {
    RecoverableSignature::from_slice(signature)?.recover(hash)
}

/// Derive the Ethereum address of a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    // Skip the 0x04 prefix
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// secp256k1 ECDSA keypair. The secret scalar is zeroized on drop by `SigningKey`.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Ethereum address of this key.
    pub fn address(&self) -> Address {
        address_from_pubkey(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte prehash (deterministic RFC 6979, low-S).
    pub fn sign_hash(&self, hash: &Hash) -> Result<RecoverableSignature, CryptoError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&sig.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(RecoverableSignature(bytes))
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &hex::encode(self.address()))
            .finish_non_exhaustive()
    }
}
