//! QuickFx Common Types
//!
//! This crate contains shared types used across the QuickFx converter,
//! including currency codes, currency pairs, and locale number formatting.

pub mod currency;
pub mod numberformat;

pub use currency::*;
pub use numberformat::*;
