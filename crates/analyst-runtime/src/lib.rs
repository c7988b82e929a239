//! # analyst-runtime
//!
//! Runtime providers for the Aegis market analyst.
//!
//! ## Providers
//!
//! - **OpenAI** (default): chat-completions API, or any gateway speaking the
//!   same wire format via `OPENAI_BASE_URL`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use analyst_runtime::{OpenAiConfig, OpenAiProvider};
//!
//! let provider = OpenAiProvider::new(OpenAiConfig::with_api_key(key))?;
//! let analyst = MarketAnalyst::builder(config)
//!     .with_provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use analyst_core::{AgentError, LlmProvider, Message, Result, Role};
