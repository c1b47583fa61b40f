//! Named formula registry and evaluation.

use crate::FormulaError;
use crate::ast::{Expr, Function, Variables};
use crate::parser::parse;
use log::{debug, info, warn};
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tessera_rs_config::ConfigStore;

/// Config section holding `name -> expression` entries.
pub const FORMULAS_SECTION: &str = "formulas";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern"));

/// A registered formula: its source and the result of compiling it.
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    compiled: Result<Expr, FormulaError>,
}

impl Formula {
    /// Compile `source`. Parse failures are kept and reported on evaluation.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = parse(&source);
        Self { source, compiled }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the source parsed.
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_ok()
    }

    pub fn evaluate(&self, vars: &Variables) -> Result<f64, FormulaError> {
        match &self.compiled {
            Ok(expr) => expr.evaluate(vars),
            Err(err) => Err(err.clone()),
        }
    }
}

/// Thread-safe registry of named formulas.
#[derive(Debug, Default)]
pub struct FormulaEngine {
    formulas: RwLock<HashMap<String, Arc<Formula>>>,
}

impl FormulaEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a formula. Malformed text is accepted and fails on evaluation.
    pub fn register_formula(&self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        let formula = Formula::new(source);
        debug!(
            "registering formula (name={name}, compiled={})",
            formula.is_compiled()
        );
        self.formulas.write().insert(name, Arc::new(formula));
    }

    /// Remove a formula. Returns whether one was registered.
    pub fn unregister_formula(&self, name: &str) -> bool {
        self.formulas.write().remove(name).is_some()
    }

    pub fn has_formula(&self, name: &str) -> bool {
        self.formulas.read().contains_key(name)
    }

    /// Source text of a registered formula.
    pub fn formula_source(&self, name: &str) -> Option<String> {
        self.formulas
            .read()
            .get(name)
            .map(|formula| formula.source().to_string())
    }

    /// Registered formula names, sorted.
    pub fn available_formulas(&self) -> Vec<String> {
        let mut names: Vec<String> = self.formulas.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear_all_formulas(&self) {
        self.formulas.write().clear();
    }

    /// Evaluate a registered formula.
    pub fn evaluate(&self, name: &str, vars: &Variables) -> Result<f64, FormulaError> {
        let formula = self
            .formulas
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FormulaError::NotFound(name.to_string()))?;
        formula.evaluate(vars)
    }

    /// Evaluate a registered formula, mapping every failure to `None`.
    pub fn try_evaluate(&self, name: &str, vars: &Variables) -> Option<f64> {
        match self.evaluate(name, vars) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("formula evaluation failed (name={name}): {err}");
                None
            }
        }
    }

    /// Parse and evaluate ad-hoc formula text.
    pub fn evaluate_expression(&self, source: &str, vars: &Variables) -> Result<f64, FormulaError> {
        parse(source)?.evaluate(vars)
    }

    /// Whether `source` evaluates when every referenced variable is bound to 1.0.
    pub fn validate_formula(&self, source: &str) -> bool {
        let vars: Variables = required_variables(source)
            .into_iter()
            .map(|name| (name, 1.0))
            .collect();
        self.evaluate_expression(source, &vars).is_ok()
    }

    /// Variable names referenced by `source`.
    pub fn required_variables(&self, source: &str) -> Vec<String> {
        required_variables(source)
    }

    /// Replace the whole table with the string entries of the store's `formulas` section.
    ///
    /// Holds the engine's write lock while reading the store, so the lock
    /// order is always engine first, store second. Returns the number of
    /// formulas loaded.
    pub fn load_formulas_from_config(&self, store: &ConfigStore) -> usize {
        let mut formulas = self.formulas.write();
        let section = store.get_section(FORMULAS_SECTION);

        formulas.clear();
        for (name, value) in section {
            match value.as_str() {
                Some(source) => {
                    let formula = Formula::new(source);
                    if !formula.is_compiled() {
                        warn!("config formula does not parse (name={name})");
                    }
                    formulas.insert(name, Arc::new(formula));
                }
                None => warn!("skipping non-string formula entry (name={name})"),
            }
        }
        info!("loaded formulas from config (count={})", formulas.len());
        formulas.len()
    }
}

/// Identifiers in `source` that are not function names, distinct, in first-seen order.
pub fn required_variables(source: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for found in IDENTIFIER.find_iter(source) {
        let name = found.as_str();
        if Function::from_name(name).is_none() && !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}
