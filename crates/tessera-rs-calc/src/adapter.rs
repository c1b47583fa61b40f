//! Formula-first calculations with closed-form fallbacks.

use log::debug;
use std::sync::Arc;
use tessera_rs_config::ConfigStore;
use tessera_rs_formula::{FormulaEngine, Variables};

/// Formula names looked up by each calculation.
pub mod formula_names {
    pub const TAX_INCOME: &str = "tax_income";
    pub const TRADE_INCOME: &str = "trade_income";
    pub const MAINTENANCE_COST: &str = "maintenance_cost";
    pub const POPULATION_GROWTH: &str = "population_growth";
    pub const MIGRATION_RATE: &str = "migration_rate";
    pub const RECRUITMENT_CAPACITY: &str = "recruitment_capacity";
    pub const SUPPLY_CAPACITY: &str = "supply_capacity";
    pub const BUILDING_COST: &str = "building_cost";
    pub const BUILDING_EFFECT: &str = "building_effect";
    pub const BUILDING_UPGRADE_TIME: &str = "building_upgrade_time";
    pub const RESEARCH_COST: &str = "research_cost";
    pub const RESEARCH_SPEED: &str = "research_speed";
}

use formula_names as names;

/// Calculations over a shared config store and formula engine.
#[derive(Debug, Clone)]
pub struct CalculationAdapter {
    store: Arc<ConfigStore>,
    formulas: Arc<FormulaEngine>,
}

impl CalculationAdapter {
    pub fn new(store: Arc<ConfigStore>, formulas: Arc<FormulaEngine>) -> Self {
        Self { store, formulas }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn formulas(&self) -> &Arc<FormulaEngine> {
        &self.formulas
    }

    pub fn calculate_tax_income(
        &self,
        base_tax: f64,
        admin_efficiency: f64,
        autonomy: f64,
        stability: f64,
    ) -> f64 {
        let vars = bindings([
            ("base_tax", base_tax),
            ("admin_efficiency", admin_efficiency),
            ("autonomy", autonomy),
            ("stability", stability),
        ]);
        self.formula_or(names::TAX_INCOME, &vars, || {
            let bonus = self.store.get_value("economics.tax.admin_efficiency_bonus", 1.6);
            let penalty = self
                .store
                .get_value("economics.tax.autonomy_penalty_multiplier", 0.75);
            base_tax
                * admin_efficiency
                * bonus
                * (1.0 - autonomy * penalty)
                * (0.5 + 0.5 * stability)
        })
    }

    pub fn calculate_trade_income(
        &self,
        base_trade: f64,
        market_level: f64,
        route_efficiency: f64,
        stability: f64,
    ) -> f64 {
        let bonus_per_level = self.store.get_value("economics.trade.market_bonus_per_level", 0.25);
        let market_bonus = 1.0 + market_level * bonus_per_level;
        let vars = bindings([
            ("base_trade", base_trade),
            ("market_bonus", market_bonus),
            ("route_efficiency", route_efficiency),
            ("stability", stability),
        ]);
        self.formula_or(names::TRADE_INCOME, &vars, || {
            let stability_impact = self.store.get_value("economics.trade.stability_impact", 0.6);
            base_trade * market_bonus * route_efficiency * (0.7 + stability * stability_impact)
        })
    }

    pub fn calculate_maintenance_cost(&self, base_cost: f64, efficiency_modifier: f64) -> f64 {
        let vars = bindings([
            ("base_cost", base_cost),
            ("efficiency_modifier", efficiency_modifier),
        ]);
        self.formula_or(names::MAINTENANCE_COST, &vars, || {
            base_cost * (2.0 - efficiency_modifier)
        })
    }

    pub fn calculate_population_growth(
        &self,
        base_growth: f64,
        stability: f64,
        war_exhaustion: f64,
        prosperity: f64,
    ) -> f64 {
        let vars = bindings([
            ("base_growth", base_growth),
            ("stability", stability),
            ("war_exhaustion", war_exhaustion),
            ("prosperity", prosperity),
        ]);
        self.formula_or(names::POPULATION_GROWTH, &vars, || {
            base_growth
                * (0.5 + stability)
                * (1.0 - 0.8 * war_exhaustion)
                * (1.0 + 0.3 * prosperity)
        })
    }

    pub fn calculate_migration_rate(&self, push_factors: f64, pull_factors: f64) -> f64 {
        let vars = bindings([("push_factors", push_factors), ("pull_factors", pull_factors)]);
        self.formula_or(names::MIGRATION_RATE, &vars, || {
            ((pull_factors - push_factors) * 0.1).max(0.0)
        })
    }

    pub fn calculate_recruitment_capacity(
        &self,
        population: f64,
        development: f64,
        military_tech: f64,
    ) -> f64 {
        let vars = bindings([
            ("population", population),
            ("development", development),
            ("military_tech", military_tech),
        ]);
        self.formula_or(names::RECRUITMENT_CAPACITY, &vars, || {
            population * 0.02 * (1.0 + 0.1 * development) * (1.0 + 0.05 * military_tech)
        })
    }

    pub fn calculate_supply_capacity(&self, base_supply: f64, infrastructure: f64) -> f64 {
        let vars = bindings([("base_supply", base_supply), ("infrastructure", infrastructure)]);
        self.formula_or(names::SUPPLY_CAPACITY, &vars, || {
            base_supply * (1.0 + 0.2 * infrastructure)
        })
    }

    /// Cost of building `building_type` at `level`, truncated toward zero.
    pub fn building_cost(&self, building_type: &str, level: i32) -> i64 {
        let base_cost = self
            .store
            .get_value(&format!("buildings.{building_type}.base_cost"), 100.0);
        let cost_multiplier = self
            .store
            .get_value(&format!("buildings.{building_type}.cost_multiplier"), 1.5);
        let vars = bindings([
            ("base_cost", base_cost),
            ("cost_multiplier", cost_multiplier),
            ("level", f64::from(level)),
        ]);
        let cost = self.formula_or(names::BUILDING_COST, &vars, || {
            base_cost * cost_multiplier.powi(level)
        });
        truncate(cost)
    }

    /// Effect magnitude of `effect_type` for a building at `level`.
    ///
    /// Reads `buildings.<type>.effects.<effect>_per_level`.
    pub fn building_effect(&self, building_type: &str, effect_type: &str, level: i32) -> f64 {
        let effect_per_level = self.store.get_value(
            &format!("buildings.{building_type}.effects.{effect_type}_per_level"),
            0.0,
        );
        let vars = bindings([
            ("effect_per_level", effect_per_level),
            ("level", f64::from(level)),
        ]);
        self.formula_or(names::BUILDING_EFFECT, &vars, || {
            effect_per_level * f64::from(level)
        })
    }

    /// Time to upgrade a building to `target_level`, truncated toward zero.
    pub fn building_upgrade_time(&self, building_type: &str, target_level: i32) -> i64 {
        let base_time = self
            .store
            .get_value(&format!("buildings.{building_type}.build_time_base"), 180.0);
        let time_multiplier = self
            .store
            .get_value(&format!("buildings.{building_type}.build_time_multiplier"), 1.2);
        let vars = bindings([
            ("base_time", base_time),
            ("time_multiplier", time_multiplier),
            ("target_level", f64::from(target_level)),
        ]);
        let time = self.formula_or(names::BUILDING_UPGRADE_TIME, &vars, || {
            base_time * time_multiplier.powi(target_level - 1)
        });
        truncate(time)
    }

    pub fn calculate_research_cost(&self, category: &str, level: i32) -> f64 {
        let base_cost = self
            .store
            .get_value(&format!("technology.{category}.base_cost"), 100.0);
        let cost_scaling = self
            .store
            .get_value(&format!("technology.{category}.cost_scaling"), 1.8);
        let vars = bindings([
            ("base_cost", base_cost),
            ("cost_scaling", cost_scaling),
            ("level", f64::from(level)),
        ]);
        self.formula_or(names::RESEARCH_COST, &vars, || {
            base_cost * cost_scaling.powi(level)
        })
    }

    pub fn calculate_research_speed(&self, base_speed: f64, research_efficiency: f64) -> f64 {
        let vars = bindings([
            ("base_speed", base_speed),
            ("research_efficiency", research_efficiency),
        ]);
        self.formula_or(names::RESEARCH_SPEED, &vars, || {
            base_speed * research_efficiency
        })
    }

    fn formula_or(&self, name: &str, vars: &Variables, fallback: impl FnOnce() -> f64) -> f64 {
        match self.formulas.try_evaluate(name, vars) {
            Some(value) => value,
            None => {
                debug!("using fallback calculation (formula={name})");
                fallback()
            }
        }
    }
}

fn bindings<const N: usize>(pairs: [(&str, f64); N]) -> Variables {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
