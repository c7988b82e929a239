//! # analyst-core
//!
//! Provider-agnostic LLM abstraction used by the Aegis market analyst.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Market Analyst Job                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Prompt    │  │  Messages   │  │   LlmProvider       │  │
//! │  │  Template   │──│  (system,   │──│   (Strategy)        │  │
//! │  │             │  │   user)     │  │                     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the analyst swap OpenAI for any other
//! chat-completion backend (or a test double) without touching the
//! recommendation pipeline.

pub mod provider;
pub mod message;
pub mod error;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
