//! Service Kit
//!
//! Stateless helpers applied after analysis: on-chain encoding, privacy
//! wrapping and risk scoring.

pub mod encoder;
pub mod privacy;
pub mod risk_score;

pub use encoder::{encode, fallback_payload, fallback_recommendation};
pub use privacy::{EncryptedPayload, EncryptedUserData, PrivacyWrapper, decrypt, hash_address, hash_data};
pub use risk_score::{RiskFactors, calculate_risk_score};
