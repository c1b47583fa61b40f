use tessera_rs_config::ConfigError;
use tessera_rs_formula::FormulaError;
use thiserror::Error;

/// Errors surfaced by the [`crate::Tessera`] composition root.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Config loading or mutation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Formula evaluation failed.
    #[error(transparent)]
    Formula(#[from] FormulaError),
}
