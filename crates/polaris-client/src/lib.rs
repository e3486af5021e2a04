//! # polaris-client: Upstream HTTP Clients
//!
//! Typed async clients for the two services the gateway depends on:
//!
//! | Service | Trait | Implementation |
//! |---------|-------|----------------|
//! | Activity-compatibility scorer | [`CompatibilityService`] | [`HttpCompatibilityClient`] |
//! | Text-to-speech provider | [`SpeechSynthesizer`] | [`ElevenLabsClient`] |
//!
//! Both traits are object-safe and `Send + Sync`, so the API layer holds
//! them as `Arc<dyn …>` and tests swap in doubles. Every failure maps to
//! [`UpstreamError`]; retries are not built in.

pub mod compatibility;
pub mod error;
mod http;
pub mod speech;

pub use compatibility::{CompatibilityConfig, CompatibilityService, HttpCompatibilityClient};
pub use error::{ConfigError, UpstreamError};
pub use speech::{ElevenLabsClient, SpeechAudio, SpeechConfig, SpeechSynthesizer};
