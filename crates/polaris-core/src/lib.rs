//! # polaris-core: Domain Types for the Licensing Gateway
//!
//! Pure, I/O-free logic behind the Polaris business-licensing portal
//! gateway. The HTTP surface lives in `polaris-api`; upstream clients live
//! in `polaris-client`. Everything here is synchronous and deterministic.
//!
//! ## Modules
//!
//! | Module              | Concern                                              |
//! |---------------------|------------------------------------------------------|
//! | [`validation`]      | Field-level JSON payload validation, flattened issues |
//! | [`compatibility`]   | Trade-name / activity compatibility contract          |
//! | [`fallback`]        | Deterministic scoring when the upstream is unavailable |
//! | [`narration`]       | Text-to-speech request validation and resolution      |
//! | [`assistant`]       | Scripted investor chat replies                        |
//!
//! ## Crate Policy
//!
//! - No dependencies on other `polaris-*` crates.
//! - No `.unwrap()` outside tests.
//! - `utoipa::ToSchema` derives are gated behind the `openapi` feature.

pub mod assistant;
pub mod compatibility;
pub mod fallback;
pub mod narration;
pub mod validation;

pub use assistant::{respond, ChatAction, ChatReply, ChatRequest};
pub use compatibility::{
    CompatibilityRequest, CompatibilityResponse, CompatibilityResult, Language,
};
pub use fallback::{FallbackPolicy, PolicyError};
pub use narration::{
    NarrationDefaults, NarrationRequest, OutputFormat, ResolvedNarration, VoiceSettings,
};
pub use validation::{FromJsonPayload, ValidationIssues};
