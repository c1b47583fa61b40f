//! Tests for domain validation rules.

use super::*;
use crate::store::default_document;
use pretty_assertions::assert_eq;
use serde_json::json;

fn errors_mentioning<'a>(result: &'a ValidationResult, needle: &str) -> Vec<&'a String> {
    result
        .errors
        .iter()
        .filter(|message| message.contains(needle))
        .collect()
}

fn system_with_pool(size: i64) -> ConfigValue {
    json!({
        "system": {
            "version": "1.0.0",
            "threading": {"thread_pool_size": size},
            "performance": {"target_fps": 60}
        }
    })
}

#[test]
fn thread_pool_size_bounds_are_inclusive() {
    for size in [0, 33] {
        let result = validate_section(&system_with_pool(size), "system").expect("section");
        assert!(!result.is_valid(), "pool size {size} should be fatal");
        assert_eq!(errors_mentioning(&result, "Thread pool size").len(), 1);
    }
    for size in [1, 32] {
        let result = validate_section(&system_with_pool(size), "system").expect("section");
        assert!(result.is_valid(), "pool size {size} should pass: {result:?}");
    }
}

#[test]
fn invalid_base_cost_skips_remaining_building_checks() {
    let tree = json!({"buildings": {"tax_office": {"base_cost": -5}}});
    let result = validate_all(&tree);

    assert!(!result.is_valid());
    let tax_office_errors = errors_mentioning(&result, "tax_office");
    assert_eq!(tax_office_errors.len(), 1);
    assert!(tax_office_errors[0].contains("invalid base cost: -5"));
    assert!(
        !result
            .warnings
            .iter()
            .any(|message| message.contains("tax_office"))
    );
}

#[test]
fn building_checks_report_multiplier_time_and_effects() {
    let tree = json!({
        "buildings": {
            "market": {
                "base_cost": 200,
                "cost_multiplier": 1.0,
                "build_time_base": 0,
                "effects": {"trade_efficiency_per_level": 0.25, "population_capacity": 500}
            },
            "farm": {"base_cost": 50, "cost_multiplier": 1.2, "build_time_base": 60}
        }
    });
    let result = ValidationSection::Buildings.validate(&tree);

    assert_eq!(errors_mentioning(&result, "'market'").len(), 2);
    let extreme = "Building 'market' effect 'population_capacity' has extreme value: 500";
    assert!(result.warnings.contains(&extreme.to_string()));
    assert!(
        result
            .warnings
            .contains(&"Building 'farm' has no effects defined".to_string())
    );
    assert!(errors_mentioning(&result, "'farm'").is_empty());
}

#[test]
fn economics_rules_match_documented_ranges() {
    let tree = json!({
        "economics": {
            "tax": {"base_rate": 1.5, "autonomy_penalty_multiplier": 0.75},
            "trade": {"base_efficiency_range": [0.9, 0.3], "market_bonus_per_level": 0.0},
            "inflation": {"base_rate": 0.7}
        }
    });
    let result = validate_section(&tree, "economics").expect("section");

    assert_eq!(result.errors.len(), 3);
    assert!(result.errors[0].starts_with("Tax base rate"));
    assert!(result.errors[1].starts_with("Trade efficiency range invalid"));
    assert!(result.errors[2].starts_with("Market bonus per level"));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("Inflation"));
}

#[test]
fn efficiency_range_requires_two_values() {
    let tree = json!({"economics": {"trade": {"base_efficiency_range": [0.3]}}});
    let result = validate_section(&tree, "economics").expect("section");
    let expected = "Trade base efficiency range must have exactly 2 values [min, max]";
    assert!(result.errors.contains(&expected.to_string()));
}

#[test]
fn empty_military_units_short_circuit() {
    let tree = json!({"military": {"technology_requirements": {"knights": 40}}});
    let result = validate_section(&tree, "military").expect("section");
    assert_eq!(
        result.errors,
        vec!["Military units section is missing or empty".to_string()]
    );
    assert!(result.warnings.is_empty());
}

#[test]
fn military_units_need_fields_and_ranges() {
    let tree = json!({
        "military": {
            "units": {
                "levy": {"cost": 0, "upkeep": 1, "combat_strength": 150.0},
                "knights": {
                    "cost": 500,
                    "upkeep": 10,
                    "combat_strength": 40,
                    "recruitment_time": 90
                }
            },
            "technology_requirements": {"knights": 25, "levy": 0}
        }
    });
    let result = validate_section(&tree, "military").expect("section");

    assert_eq!(
        result.errors,
        vec![
            "Military unit 'levy' missing required field: recruitment_time".to_string(),
            "Military unit 'levy' has invalid cost: 0".to_string(),
            "Military unit 'levy' has invalid combat strength: 150.0".to_string(),
        ]
    );
    assert_eq!(
        result.warnings,
        vec!["Military unit 'knights' has unusual tech requirement: 25".to_string()]
    );
}

#[test]
fn ui_findings_are_warnings_only() {
    let tree = json!({
        "ui": {
            "window": {"default_width": 640, "default_height": 480},
            "scaling": {"factor": 4.0},
            "themes": {
                "dark": {"background": "#000", "text": "#fff", "accent": "#0af"},
                "broken": "red"
            }
        }
    });
    let result = validate_section(&tree, "ui").expect("section");

    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 6);
    assert!(
        result
            .warnings
            .contains(&"UI theme 'broken' is not a valid object".to_string())
    );
    assert!(
        result
            .warnings
            .contains(&"UI theme 'dark' missing color: error".to_string())
    );
}

#[test]
fn system_frequencies_and_version() {
    let tree = json!({
        "system": {
            "version": "1.0",
            "threading": {"thread_pool_size": 4, "enable_threading": false},
            "performance": {
                "target_fps": 500,
                "update_frequencies": {"ui": 60.0, "economics": 0.0, "ai": 2000}
            }
        }
    });
    let result = validate_section(&tree, "system").expect("section");

    assert_eq!(
        result.errors,
        vec![
            "System 'ai' has invalid update frequency: 2000".to_string(),
            "System 'economics' has invalid update frequency: 0".to_string(),
        ]
    );
    assert_eq!(result.warnings.len(), 3);
    assert!(
        result
            .warnings
            .contains(&"System version format may be invalid: 1.0".to_string())
    );
}

#[test]
fn unknown_section_is_rejected() {
    let err = validate_section(&json!({}), "diplomacy").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownSection(name) if name == "diplomacy"));
}

#[test]
fn built_in_defaults_have_no_errors() {
    let result = validate_all(&default_document());
    assert!(result.is_valid(), "{:?}", result.errors);
}
