//! Domain calculations backed by configurable formulas.
//!
//! Every calculation first tries a named formula from the engine and falls
//! back to a closed-form expression over config values with literal defaults,
//! so results stay finite even on an empty store or while a formula is
//! broken mid-edit.

mod adapter;

pub use adapter::{CalculationAdapter, formula_names};
