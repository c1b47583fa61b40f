//! Per-domain validation rules.

use super::ValidationResult;
use crate::value::{ConfigValue, FromConfigValue, lookup_or, section_of};
use regex::Regex;
use std::sync::LazyLock;

/// Buildings every balance set must define.
pub(super) const REQUIRED_BUILDINGS: &[&str] = &[
    "tax_office",
    "market",
    "fortification",
    "temple",
    "workshop",
    "farm",
];

/// Fields every military unit must define.
pub(super) const REQUIRED_UNIT_FIELDS: &[&str] =
    &["cost", "upkeep", "combat_strength", "recruitment_time"];

/// Colors every UI theme must define.
pub(super) const REQUIRED_THEME_COLORS: &[&str] =
    &["background", "text", "accent", "warning", "error"];

static VERSION_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version pattern"));

pub(super) fn validate_economics(tree: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::new();

    let tax_rate = lookup_or(tree, "economics.tax.base_rate", -1.0_f64);
    if !(0.0..=1.0).contains(&tax_rate) {
        result.add_error(format!(
            "Tax base rate must be between 0.0 and 1.0, got: {tax_rate}"
        ));
    }

    let autonomy_penalty = lookup_or(tree, "economics.tax.autonomy_penalty_multiplier", -1.0_f64);
    if !(0.0..=1.0).contains(&autonomy_penalty) {
        result.add_error(format!(
            "Autonomy penalty multiplier must be between 0.0 and 1.0, got: {autonomy_penalty}"
        ));
    }

    let efficiency_range: Vec<f64> =
        lookup_or(tree, "economics.trade.base_efficiency_range", Vec::new());
    match efficiency_range.as_slice() {
        [min, max] if min >= max => result.add_error(format!(
            "Trade efficiency range invalid: min ({min}) must be less than max ({max})"
        )),
        [_, _] => {}
        _ => result.add_error("Trade base efficiency range must have exactly 2 values [min, max]"),
    }

    let market_bonus = lookup_or(tree, "economics.trade.market_bonus_per_level", -1.0_f64);
    if market_bonus <= 0.0 {
        result.add_error(format!(
            "Market bonus per level must be positive, got: {market_bonus}"
        ));
    }

    let inflation_rate = lookup_or(tree, "economics.inflation.base_rate", -1.0_f64);
    if !(-0.1..=0.5).contains(&inflation_rate) {
        result.add_warning(format!(
            "Inflation base rate is outside typical range [-0.1, 0.5]: {inflation_rate}"
        ));
    }

    result
}

pub(super) fn validate_buildings(tree: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::new();

    for building in REQUIRED_BUILDINGS {
        let base_path = format!("buildings.{building}");

        let base_cost = lookup_or(tree, &format!("{base_path}.base_cost"), -1_i64);
        if base_cost <= 0 {
            result.add_error(format!(
                "Building '{building}' has invalid base cost: {base_cost}"
            ));
            continue;
        }

        let cost_multiplier = lookup_or(tree, &format!("{base_path}.cost_multiplier"), 0.0_f64);
        if cost_multiplier <= 1.0 {
            result.add_error(format!(
                "Building '{building}' cost multiplier must be > 1.0, got: {cost_multiplier}"
            ));
        }

        let build_time = lookup_or(tree, &format!("{base_path}.build_time_base"), -1_i64);
        if build_time <= 0 {
            result.add_error(format!(
                "Building '{building}' has invalid build time: {build_time}"
            ));
        }

        let effects = section_of(tree, &format!("{base_path}.effects"));
        if effects.is_empty() {
            result.add_warning(format!("Building '{building}' has no effects defined"));
            continue;
        }
        let mut effect_names: Vec<&String> = effects.keys().collect();
        effect_names.sort();
        for effect_name in effect_names {
            let Some(value) = effects[effect_name].as_f64() else {
                continue;
            };
            if !(-10.0..=10.0).contains(&value) {
                result.add_warning(format!(
                    "Building '{building}' effect '{effect_name}' has extreme value: {value}"
                ));
            }
        }
    }

    result
}

pub(super) fn validate_military(tree: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::new();

    let units = section_of(tree, "military.units");
    if units.is_empty() {
        result.add_error("Military units section is missing or empty");
        return result;
    }

    let mut unit_names: Vec<&String> = units.keys().collect();
    unit_names.sort();
    for unit_name in unit_names {
        let Some(unit) = units[unit_name].as_object() else {
            continue;
        };

        for field in REQUIRED_UNIT_FIELDS {
            if !unit.contains_key(*field) {
                result.add_error(format!(
                    "Military unit '{unit_name}' missing required field: {field}"
                ));
            }
        }

        if let Some(cost) = unit.get("cost") {
            let in_range = i64::from_config_value(cost).is_some_and(|c| c > 0 && c <= 10_000);
            if !in_range {
                result.add_error(format!(
                    "Military unit '{unit_name}' has invalid cost: {cost}"
                ));
            }
        }

        if let Some(strength) = unit.get("combat_strength") {
            let in_range =
                f64::from_config_value(strength).is_some_and(|s| s > 0.0 && s <= 100.0);
            if !in_range {
                result.add_error(format!(
                    "Military unit '{unit_name}' has invalid combat strength: {strength}"
                ));
            }
        }
    }

    let requirements = section_of(tree, "military.technology_requirements");
    let mut required_units: Vec<&String> = requirements.keys().collect();
    required_units.sort();
    for unit_name in required_units {
        let Some(level) = requirements[unit_name].as_f64() else {
            continue;
        };
        let level = level.round() as i64;
        if !(0..=20).contains(&level) {
            result.add_warning(format!(
                "Military unit '{unit_name}' has unusual tech requirement: {level}"
            ));
        }
    }

    result
}

pub(super) fn validate_ui(tree: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::new();

    let width = lookup_or(tree, "ui.window.default_width", 0_i64);
    if !(800..=7680).contains(&width) {
        result.add_warning(format!(
            "UI window width outside typical range [800, 7680]: {width}"
        ));
    }

    let height = lookup_or(tree, "ui.window.default_height", 0_i64);
    if !(600..=4320).contains(&height) {
        result.add_warning(format!(
            "UI window height outside typical range [600, 4320]: {height}"
        ));
    }

    let scale = lookup_or(tree, "ui.scaling.factor", 1.0_f64);
    if !(0.5..=3.0).contains(&scale) {
        result.add_warning(format!(
            "UI scaling factor outside typical range [0.5, 3.0]: {scale}"
        ));
    }

    let themes = section_of(tree, "ui.themes");
    let mut theme_names: Vec<&String> = themes.keys().collect();
    theme_names.sort();
    for theme_name in theme_names {
        let Some(theme) = themes[theme_name].as_object() else {
            result.add_warning(format!("UI theme '{theme_name}' is not a valid object"));
            continue;
        };
        for color in REQUIRED_THEME_COLORS {
            if !theme.contains_key(*color) {
                result.add_warning(format!("UI theme '{theme_name}' missing color: {color}"));
            }
        }
    }

    result
}

pub(super) fn validate_system(tree: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !lookup_or(tree, "system.threading.enable_threading", true) {
        result.add_warning("Threading is disabled - this may impact performance");
    }

    let pool_size = lookup_or(tree, "system.threading.thread_pool_size", 0_i64);
    if !(1..=32).contains(&pool_size) {
        result.add_error(format!(
            "Thread pool size must be between 1 and 32, got: {pool_size}"
        ));
    }

    let target_fps = lookup_or(tree, "system.performance.target_fps", 0_i64);
    if !(30..=240).contains(&target_fps) {
        result.add_warning(format!(
            "Target FPS outside typical range [30, 240]: {target_fps}"
        ));
    }

    let frequencies = section_of(tree, "system.performance.update_frequencies");
    let mut systems: Vec<&String> = frequencies.keys().collect();
    systems.sort();
    for system in systems {
        let Some(frequency) = frequencies[system].as_f64() else {
            continue;
        };
        if frequency <= 0.0 || frequency > 1000.0 {
            result.add_error(format!(
                "System '{system}' has invalid update frequency: {frequency}"
            ));
        }
    }

    let version = lookup_or(tree, "system.version", String::new());
    if version.is_empty() {
        result.add_warning("System version not specified");
    } else if !VERSION_FORMAT.is_match(&version) {
        result.add_warning(format!("System version format may be invalid: {version}"));
    }

    result
}
