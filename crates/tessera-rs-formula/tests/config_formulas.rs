use pretty_assertions::assert_eq;
use serde_json::json;
use tessera_rs_config::{ConfigStore, DEFAULTS_FILE};
use tessera_rs_formula::{FormulaEngine, FormulaError, Variables};
use tessera_rs_test_utils::ConfigFixture;

fn store_with(fixture: &ConfigFixture) -> ConfigStore {
    let store = ConfigStore::new();
    store.initialize(fixture.path()).expect("initialize");
    store
}

#[test]
fn loads_string_entries_from_formulas_section() {
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, json!({}))
        .with_file(
            "formulas.json",
            json!({
                "formulas": {
                    "maintenance_cost": "base_cost * (2 - efficiency_modifier)",
                    "supply_capacity": "base_supply * 3",
                    "disabled": 42
                }
            }),
        );
    let store = store_with(&fixture);
    let engine = FormulaEngine::new();
    engine.register_formula("stale", "1");

    let loaded = engine.load_formulas_from_config(&store);

    assert_eq!(loaded, 2);
    assert_eq!(
        engine.available_formulas(),
        vec!["maintenance_cost".to_string(), "supply_capacity".to_string()]
    );
    let vars: Variables = [
        ("base_cost".to_string(), 100.0),
        ("efficiency_modifier".to_string(), 0.5),
    ]
    .into_iter()
    .collect();
    assert_eq!(engine.evaluate("maintenance_cost", &vars), Ok(150.0));
    assert_eq!(
        engine.evaluate("stale", &vars),
        Err(FormulaError::NotFound("stale".to_string()))
    );
}

#[test]
fn reload_picks_up_formula_overrides() {
    let fixture = ConfigFixture::new().with_file(DEFAULTS_FILE, json!({}));
    let store = store_with(&fixture);
    let engine = FormulaEngine::new();
    assert_eq!(engine.load_formulas_from_config(&store), 0);

    store
        .set_value("formulas.research_speed", "base_speed * research_efficiency * 2")
        .expect("set");
    assert_eq!(engine.load_formulas_from_config(&store), 1);

    let vars: Variables = [
        ("base_speed".to_string(), 3.0),
        ("research_efficiency".to_string(), 1.5),
    ]
    .into_iter()
    .collect();
    assert_eq!(engine.try_evaluate("research_speed", &vars), Some(9.0));
}

#[test]
fn missing_formulas_section_empties_the_table() {
    let store = ConfigStore::new();
    let engine = FormulaEngine::new();
    engine.register_formula("f", "1");
    assert_eq!(engine.load_formulas_from_config(&store), 0);
    assert!(!engine.has_formula("f"));
}

#[test]
fn deeply_nested_config_formula_is_kept_but_never_evaluates() {
    let nested = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, json!({}))
        .with_file("formulas.json", json!({"formulas": {"deep": nested, "flat": "2 * 3"}}));
    let store = store_with(&fixture);
    let engine = FormulaEngine::new();

    assert_eq!(engine.load_formulas_from_config(&store), 2);
    assert!(matches!(
        engine.evaluate("deep", &Variables::new()),
        Err(FormulaError::Parse { .. })
    ));
    assert_eq!(engine.try_evaluate("deep", &Variables::new()), None);
    assert_eq!(engine.try_evaluate("flat", &Variables::new()), Some(6.0));
}

#[test]
fn loading_formulas_races_with_store_writes_and_reloads() {
    let fixture = ConfigFixture::new().with_file(
        "formulas.json",
        json!({"formulas": {"supply_capacity": "base_supply * 2"}}),
    );
    let store = store_with(&fixture);
    let engine = FormulaEngine::new();
    store.register_change_callback("formulas.generated", |_| {});

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..200 {
                engine.load_formulas_from_config(&store);
                assert!(engine.has_formula("supply_capacity"));
            }
        });
        scope.spawn(|| {
            for step in 0..200 {
                store.set_value("formulas.generated", format!("x + {step}")).expect("set");
            }
        });
        scope.spawn(|| {
            for _ in 0..50 {
                assert!(store.reload_configs());
            }
        });
    });

    engine.load_formulas_from_config(&store);
    let vars: Variables = [("x".to_string(), 1.0)].into_iter().collect();
    assert_eq!(engine.try_evaluate("generated", &vars), Some(200.0));
}
