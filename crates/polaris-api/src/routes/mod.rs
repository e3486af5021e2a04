//! # Route Modules
//!
//! | Prefix | Module |
//! |--------|--------|
//! | `/api/v1/activity-compatibility/*`, `/api/trade-license/*` | [`trade_license`] |
//! | `/api/voice/*` | [`narration`] |
//! | `/api/generate` | [`assistant`] |

pub mod assistant;
pub mod narration;
pub mod trade_license;
