//! Privacy Wrapper
//!
//! Hybrid encryption of the user's balance for the off-chain side channel:
//!
//! ```text
//! balance ──AES-256-GCM(key, iv)──▶ encrypted + authTag
//! key     ──RSA-OAEP(SHA-256)─────▶ encryptedKey
//! address ──SHA-256, 16 hex───────▶ addressHash
//! ```
//!
//! All binary fields are standard base64. The payload never goes on-chain.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use openssl::encrypt::{Decrypter, Encrypter};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Public};
use openssl::rsa::Padding;
use openssl::symm::{Cipher, decrypt_aead, encrypt_aead};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AnalystError, Result};
use crate::model::UserRequestContext;

pub const ALGORITHM: &str = "aes-256-gcm";

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const TAG_LEN: usize = 16;
const ADDRESS_HASH_CHARS: usize = 16;

/// Sealed ciphertext plus everything needed to open it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    pub encrypted: String,
    pub iv: String,
    pub encrypted_key: String,
    pub auth_tag: String,
    pub algorithm: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

/// Side-channel attached to a recommendation when wrapping is enabled
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedUserData {
    pub balance: EncryptedPayload,
    pub address_hash: String,
}

/// Seals data under a configured RSA public key
pub struct PrivacyWrapper {
    public_key: PKey<Public>,
}

impl std::fmt::Debug for PrivacyWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivacyWrapper")
            .field("key_bits", &self.public_key.bits())
            .finish()
    }
}

impl PrivacyWrapper {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let public_key = PKey::public_key_from_pem(pem.as_bytes())
            .map_err(|e| AnalystError::Encryption(format!("invalid public key: {e}")))?;
        Ok(Self { public_key })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedPayload> {
        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        openssl::rand::rand_bytes(&mut key)?;
        openssl::rand::rand_bytes(&mut iv)?;

        let mut tag = [0u8; TAG_LEN];
        let ciphertext = encrypt_aead(
            Cipher::aes_256_gcm(),
            &key,
            Some(iv.as_slice()),
            &[],
            plaintext.as_bytes(),
            &mut tag,
        )?;

        let mut encrypter = Encrypter::new(&self.public_key)?;
        encrypter.set_rsa_padding(Padding::PKCS1_OAEP)?;
        encrypter.set_rsa_oaep_md(MessageDigest::sha256())?;
        encrypter.set_rsa_mgf1_md(MessageDigest::sha256())?;
        let mut sealed_key = vec![0u8; encrypter.encrypt_len(&key)?];
        let written = encrypter.encrypt(&key, &mut sealed_key)?;
        sealed_key.truncate(written);

        Ok(EncryptedPayload {
            encrypted: STANDARD.encode(ciphertext),
            iv: STANDARD.encode(iv),
            encrypted_key: STANDARD.encode(sealed_key),
            auth_tag: STANDARD.encode(tag),
            algorithm: ALGORITHM.into(),
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    /// Encrypt the balance and hash the address
    pub fn wrap_user(&self, ctx: &UserRequestContext) -> Result<EncryptedUserData> {
        Ok(EncryptedUserData {
            balance: self.encrypt(&ctx.token_balance.to_string())?,
            address_hash: hash_address(&ctx.user_address),
        })
    }
}

/// Open a payload with the matching PEM private key
pub fn decrypt(payload: &EncryptedPayload, private_pem: &str) -> Result<String> {
    if payload.algorithm != ALGORITHM {
        return Err(AnalystError::Encryption(format!("unsupported algorithm {}", payload.algorithm)));
    }

    let private_key = PKey::private_key_from_pem(private_pem.as_bytes())
        .map_err(|e| AnalystError::Encryption(format!("invalid private key: {e}")))?;

    let sealed_key = decode_field("encryptedKey", &payload.encrypted_key)?;
    let mut decrypter = Decrypter::new(&private_key)?;
    decrypter.set_rsa_padding(Padding::PKCS1_OAEP)?;
    decrypter.set_rsa_oaep_md(MessageDigest::sha256())?;
    decrypter.set_rsa_mgf1_md(MessageDigest::sha256())?;
    let mut key = vec![0u8; decrypter.decrypt_len(&sealed_key)?];
    let written = decrypter.decrypt(&sealed_key, &mut key)?;
    key.truncate(written);

    let iv = decode_field("iv", &payload.iv)?;
    let ciphertext = decode_field("encrypted", &payload.encrypted)?;
    let tag = decode_field("authTag", &payload.auth_tag)?;
    let plaintext = decrypt_aead(
        Cipher::aes_256_gcm(),
        &key,
        Some(iv.as_slice()),
        &[],
        &ciphertext,
        &tag,
    )?;

    String::from_utf8(plaintext)
        .map_err(|e| AnalystError::Encryption(format!("plaintext is not UTF-8: {e}")))
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| AnalystError::Encryption(format!("{name} is not base64: {e}")))
}

/// Short, irreversible correlation id for an address
pub fn hash_address(address: &str) -> String {
    let mut digest = hex::encode(Sha256::digest(address.as_bytes()));
    digest.truncate(ADDRESS_HASH_CHARS);
    digest
}

/// Full hex SHA-256 of `data` followed by `salt`
pub fn hash_data(data: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}
