//! Entity type definitions

pub mod asset;
pub mod failure;

pub use asset::Asset;
pub use failure::{FailureRecord, FailureSample, SampleBasis};
