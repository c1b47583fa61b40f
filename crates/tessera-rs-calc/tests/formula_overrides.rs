use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tessera_rs_calc::{CalculationAdapter, formula_names};
use tessera_rs_config::{ConfigStore, DEFAULTS_FILE, default_document};
use tessera_rs_formula::FormulaEngine;
use tessera_rs_test_utils::ConfigFixture;

fn adapter_for(fixture: &ConfigFixture) -> CalculationAdapter {
    let store = Arc::new(ConfigStore::new());
    store.initialize(fixture.path()).expect("initialize");
    let formulas = Arc::new(FormulaEngine::new());
    formulas.load_formulas_from_config(&store);
    CalculationAdapter::new(store, formulas)
}

#[test]
fn config_formulas_override_fallbacks() {
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, default_document())
        .with_file(
            "formulas.json",
            json!({
                "formulas": {
                    "research_cost": "base_cost * pow(cost_scaling, level) / 2",
                    "building_upgrade_time": "base_time * target_level"
                }
            }),
        )
        .with_file(
            "technology.json",
            json!({"technology": {"military": {"base_cost": 200, "cost_scaling": 2.0}}}),
        );
    let adapter = adapter_for(&fixture);

    assert_eq!(adapter.calculate_research_cost("military", 3), 800.0);
    assert_eq!(adapter.building_upgrade_time("market", 2), 480);
    assert_eq!(adapter.building_cost("fortification", 1), 480);
}

#[test]
fn hot_reloaded_formulas_apply_after_reload() {
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, json!({}))
        .with_file("formulas.json", json!({"formulas": {"research_speed": "base_speed"}}));
    let adapter = adapter_for(&fixture);
    assert_eq!(adapter.calculate_research_speed(2.0, 4.0), 2.0);

    fixture.update(
        "formulas.json",
        &json!({"formulas": {"research_speed": "base_speed * research_efficiency * 10"}}),
    );
    assert!(adapter.store().check_for_updates());
    assert_eq!(adapter.calculate_research_speed(2.0, 4.0), 2.0);

    adapter.formulas().load_formulas_from_config(adapter.store());
    assert_eq!(adapter.calculate_research_speed(2.0, 4.0), 80.0);
    assert!(adapter.formulas().has_formula(formula_names::RESEARCH_SPEED));
}
