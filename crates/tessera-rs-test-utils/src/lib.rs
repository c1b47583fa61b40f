//! Test helpers shared across Tessera crates.

pub mod fixture;
pub mod recorder;

pub use fixture::ConfigFixture;
pub use recorder::Recorder;
