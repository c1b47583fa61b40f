//! Composition root owning the store, the formula engine and the adapter.

use crate::TesseraError;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use tessera_rs_calc::CalculationAdapter;
use tessera_rs_config::{ConfigStore, ConfigStoreOptions, ValidationResult};
use tessera_rs_formula::{FormulaEngine, Variables};

/// Shared handle to one configuration context.
///
/// The store never calls into the formula engine; formulas are reloaded here
/// after the store has finished loading, so the only nested locking stays
/// engine first, store second.
#[derive(Debug, Clone)]
pub struct Tessera {
    store: Arc<ConfigStore>,
    formulas: Arc<FormulaEngine>,
    adapter: CalculationAdapter,
}

impl Default for Tessera {
    fn default() -> Self {
        Self::new()
    }
}

impl Tessera {
    pub fn new() -> Self {
        Self::with_options(ConfigStoreOptions::default())
    }

    pub fn with_options(options: ConfigStoreOptions) -> Self {
        let store = Arc::new(ConfigStore::with_options(options));
        let formulas = Arc::new(FormulaEngine::new());
        let adapter = CalculationAdapter::new(store.clone(), formulas.clone());
        Self {
            store,
            formulas,
            adapter,
        }
    }

    /// Load the config directory, pull formulas from it and validate the result.
    ///
    /// Validation findings are logged and returned; they never fail startup.
    pub fn initialize(&self, dir: impl AsRef<Path>) -> Result<ValidationResult, TesseraError> {
        self.store.initialize(dir)?;
        let loaded = self.formulas.load_formulas_from_config(&self.store);
        let validation = self.store.validate_all_configs();
        if !validation.is_valid() {
            warn!(
                "config loaded with validation errors (errors={})",
                validation.errors.len()
            );
        }
        info!("tessera initialized (formulas={loaded})");
        Ok(validation)
    }

    /// Poll for modified config files; on reload, refresh formulas too.
    pub fn poll_updates(&self) -> bool {
        if !self.store.check_for_updates() {
            return false;
        }
        self.formulas.load_formulas_from_config(&self.store);
        true
    }

    /// Reload every config file and the formula table unconditionally.
    pub fn reload(&self) -> bool {
        if !self.store.reload_configs() {
            return false;
        }
        self.formulas.load_formulas_from_config(&self.store);
        true
    }

    /// Shut the store down and drop all formulas.
    pub fn shutdown(&self) {
        self.store.shutdown();
        self.formulas.clear_all_formulas();
        info!("tessera shut down");
    }

    /// Evaluate a named formula, propagating failures.
    pub fn evaluate(&self, name: &str, vars: &Variables) -> Result<f64, TesseraError> {
        Ok(self.formulas.evaluate(name, vars)?)
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn formulas(&self) -> &Arc<FormulaEngine> {
        &self.formulas
    }

    pub fn adapter(&self) -> &CalculationAdapter {
        &self.adapter
    }
}
