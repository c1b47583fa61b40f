//! Public SDK surface for Tessera.
//!
//! This crate re-exports the config, formula and calculation crates and
//! provides [`Tessera`], which wires them together, plus a small logging
//! initialization helper.

mod error;
mod tessera;

/// Re-export for convenience.
pub use tessera_rs_calc as calc;
/// Re-export for convenience.
pub use tessera_rs_config as config;
/// Re-export for convenience.
pub use tessera_rs_formula as formula;

pub use error::TesseraError;
pub use tessera::Tessera;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup; `RUST_LOG` controls verbosity.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
