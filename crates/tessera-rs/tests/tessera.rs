use pretty_assertions::assert_eq;
use serde_json::json;
use tessera_rs::config::{ChangeEvent, DEFAULTS_FILE, default_document};
use tessera_rs::formula::{FormulaError, Variables};
use tessera_rs::{Tessera, TesseraError};
use tessera_rs_test_utils::{ConfigFixture, Recorder};

fn vars(pairs: &[(&str, f64)]) -> Variables {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

#[test]
fn initialize_loads_config_and_formulas() -> anyhow::Result<()> {
    tessera_rs::init_logging();
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, default_document())
        .with_file(
            "formulas.json",
            json!({"formulas": {"maintenance_cost": "base_cost * 3"}}),
        );
    let tessera = Tessera::new();

    let validation = tessera.initialize(fixture.path())?;

    assert!(validation.is_valid(), "{:?}", validation.errors);
    assert_eq!(
        tessera.formulas().available_formulas(),
        vec!["maintenance_cost".to_string()]
    );
    assert_eq!(tessera.adapter().calculate_maintenance_cost(10.0, 0.5), 30.0);
    assert_eq!(tessera.evaluate("maintenance_cost", &vars(&[("base_cost", 2.0)]))?, 6.0);
    Ok(())
}

#[test]
fn validation_errors_do_not_block_startup() -> anyhow::Result<()> {
    let fixture = ConfigFixture::new().with_file(
        DEFAULTS_FILE,
        json!({"buildings": {"tax_office": {"base_cost": -5}}}),
    );
    let tessera = Tessera::new();

    let validation = tessera.initialize(fixture.path())?;

    assert!(!validation.is_valid());
    assert!(tessera.store().is_initialized());
    Ok(())
}

#[test]
fn polling_reloads_config_and_formulas() -> anyhow::Result<()> {
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, json!({"economics": {"trade": {"stability_impact": 0.6}}}))
        .with_file("formulas.json", json!({"formulas": {}}));
    let tessera = Tessera::new();
    tessera.initialize(fixture.path())?;
    let changes = Recorder::new();
    let sink = changes.clone();
    tessera
        .store()
        .register_change_callback("economics.trade.stability_impact", move |event: &ChangeEvent| {
            sink.push(event.new_value.as_f64());
        });
    assert!(!tessera.poll_updates());

    fixture.update(
        "formulas.json",
        &json!({"formulas": {"migration_rate": "pull_factors - push_factors"}}),
    );
    fixture.update(DEFAULTS_FILE, &json!({"economics": {"trade": {"stability_impact": 0.2}}}));

    assert!(tessera.poll_updates());
    assert_eq!(tessera.adapter().calculate_migration_rate(1.0, 4.0), 3.0);
    assert_eq!(changes.items(), vec![Some(0.2)]);
    Ok(())
}

#[test]
fn evaluate_propagates_formula_errors() {
    let tessera = Tessera::new();
    let err = tessera.evaluate("tax_income", &Variables::new()).unwrap_err();
    assert!(matches!(
        err,
        TesseraError::Formula(FormulaError::NotFound(name)) if name == "tax_income"
    ));
}

#[test]
fn unusable_config_dir_is_a_config_error() {
    let fixture = ConfigFixture::new();
    fixture.write_raw("not_a_dir", "");
    let tessera = Tessera::new();

    let err = tessera.initialize(fixture.file_path("not_a_dir")).unwrap_err();
    assert!(matches!(err, TesseraError::Config(_)));
    assert!(!tessera.store().is_initialized());
}

#[test]
fn shutdown_drops_formulas_and_config() -> anyhow::Result<()> {
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, json!({"formulas": {"research_speed": "base_speed"}}));
    let tessera = Tessera::new();
    tessera.initialize(fixture.path())?;
    assert!(tessera.formulas().has_formula("research_speed"));

    tessera.shutdown();

    assert!(tessera.formulas().available_formulas().is_empty());
    assert!(!tessera.store().is_initialized());
    assert!(!tessera.reload());
    assert_eq!(tessera.adapter().calculate_research_speed(2.0, 1.5), 3.0);
    Ok(())
}

#[test]
fn calculations_stay_available_during_reloads() -> anyhow::Result<()> {
    let fixture = ConfigFixture::new()
        .with_file(DEFAULTS_FILE, default_document())
        .with_file(
            "formulas.json",
            json!({"formulas": {"maintenance_cost": "base_cost * 3"}}),
        );
    let tessera = Tessera::new();
    tessera.initialize(fixture.path())?;
    tessera.store().set_float("economics.tax.admin_efficiency_bonus", 1.0)?;

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..50 {
                assert!(tessera.reload());
            }
        });
        scope.spawn(|| {
            for step in 0..200 {
                let bonus = 1.0 + f64::from(step % 4) / 10.0;
                tessera
                    .store()
                    .set_float("economics.tax.admin_efficiency_bonus", bonus)
                    .expect("set");
            }
        });
        for _ in 0..2 {
            scope.spawn(|| {
                for _ in 0..200 {
                    assert_eq!(tessera.adapter().calculate_maintenance_cost(10.0, 0.5), 30.0);
                    let income = tessera.adapter().calculate_tax_income(100.0, 1.0, 0.0, 1.0);
                    assert!((100.0..=130.0 + 1e-9).contains(&income), "{income}");
                }
            });
        }
    });

    assert_eq!(tessera.formulas().available_formulas(), vec!["maintenance_cost".to_string()]);
    Ok(())
}
