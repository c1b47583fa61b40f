//! IO helpers for reading and writing config documents.

use crate::{ConfigError, ConfigValue};
use log::debug;
use serde_json::json;
use std::fs;
use std::path::Path;

/// File holding system defaults; generated when missing.
pub const DEFAULTS_FILE: &str = "defaults.json";

/// Domain files in load order (later files override earlier ones).
pub const DOMAIN_FILES: &[&str] = &[
    DEFAULTS_FILE,
    "economics.json",
    "buildings.json",
    "military.json",
    "population.json",
    "technology.json",
    "ui.json",
    "formulas.json",
    "balance.json",
    "user_overrides.json",
];

/// Deepest object or array nesting accepted in a config document.
pub const MAX_DOCUMENT_DEPTH: usize = 128;

/// Read a document and require an object at its root.
pub(crate) fn read_document(path: &Path) -> Result<ConfigValue, ConfigError> {
    debug!("reading config document (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    if let Some(offset) = excessive_nesting(&contents, MAX_DOCUMENT_DEPTH) {
        return Err(ConfigError::ParseFailed(json5::Error::custom_at(
            json5::Position::from_offset(offset, &contents),
            format!("document nested deeper than {MAX_DOCUMENT_DEPTH} levels"),
        )));
    }
    let value: ConfigValue = json5::from_str(&contents)?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(value)
}

/// Byte offset of the first bracket nested deeper than `limit`.
///
/// Brackets inside strings and comments are ignored.
fn excessive_nesting(contents: &str, limit: usize) -> Option<usize> {
    let bytes = contents.as_bytes();
    let mut depth = 0_usize;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Some(index);
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            quote @ (b'"' | b'\'') => {
                index += 1;
                while index < bytes.len() && bytes[index] != quote {
                    if bytes[index] == b'\\' {
                        index += 1;
                    }
                    index += 1;
                }
            }
            b'/' if bytes.get(index + 1) == Some(&b'/') => {
                while index < bytes.len() && bytes[index] != b'\n' {
                    index += 1;
                }
            }
            b'/' if bytes.get(index + 1) == Some(&b'*') => {
                index += 2;
                while index + 1 < bytes.len() && &bytes[index..index + 2] != b"*/" {
                    index += 1;
                }
                index += 1;
            }
            _ => {}
        }
        index += 1;
    }
    None
}

/// Write a document as pretty-printed JSON.
pub(crate) fn write_document(path: &Path, value: &ConfigValue) -> Result<(), ConfigError> {
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    fs::write(path, contents).map_err(|source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Built-in document written to `defaults.json` when the file is missing.
pub fn default_document() -> ConfigValue {
    json!({
        "system": {
            "version": "1.0.0",
            "threading": {
                "enable_threading": true,
                "thread_pool_size": 4,
                "main_thread_systems": ["ui", "rendering", "input"],
                "dedicated_thread_systems": ["population", "military_ai"]
            },
            "performance": {
                "target_fps": 60,
                "update_frequencies": {
                    "ui": 60.0,
                    "economics": 10.0,
                    "population": 2.0,
                    "diplomacy": 1.0
                }
            }
        },
        "economics": {
            "tax": {
                "base_rate": 0.12,
                "autonomy_penalty_multiplier": 0.75,
                "admin_efficiency_bonus": 1.6,
                "stability_multiplier_range": [0.5, 1.2]
            },
            "trade": {
                "base_efficiency_range": [0.3, 0.95],
                "market_bonus_per_level": 0.25,
                "route_efficiency_decay": 0.02,
                "stability_impact": 0.6
            },
            "inflation": {
                "base_rate": 0.02,
                "money_supply_multiplier": 0.8,
                "trade_volume_impact": 0.3
            }
        },
        "buildings": {
            "tax_office": {
                "base_cost": 150,
                "cost_multiplier": 1.5,
                "build_time_base": 180,
                "effects": {
                    "tax_efficiency_per_level": 0.15,
                    "admin_efficiency_per_level": 0.05,
                    "corruption_resistance": 0.1
                }
            },
            "market": {
                "base_cost": 200,
                "cost_multiplier": 1.4,
                "build_time_base": 240,
                "effects": {
                    "trade_efficiency_per_level": 0.25,
                    "development_per_level": 0.1,
                    "population_capacity": 500
                }
            },
            "fortification": {
                "base_cost": 300,
                "cost_multiplier": 1.6,
                "build_time_base": 360,
                "effects": {
                    "defense_bonus_per_level": 0.2,
                    "garrison_capacity": 100,
                    "siege_resistance": 0.15
                }
            },
            "temple": {
                "base_cost": 180,
                "cost_multiplier": 1.5,
                "build_time_base": 200,
                "effects": {
                    "stability_per_level": 0.05,
                    "piety_per_level": 0.1
                }
            },
            "workshop": {
                "base_cost": 160,
                "cost_multiplier": 1.45,
                "build_time_base": 150,
                "effects": {
                    "production_efficiency_per_level": 0.2,
                    "development_per_level": 0.05
                }
            },
            "farm": {
                "base_cost": 100,
                "cost_multiplier": 1.3,
                "build_time_base": 120,
                "effects": {
                    "food_production_per_level": 0.3,
                    "population_growth_per_level": 0.02
                }
            }
        },
        "military": {
            "units": {
                "levy": {
                    "cost": 50,
                    "upkeep": 1,
                    "combat_strength": 5.0,
                    "recruitment_time": 30
                },
                "men_at_arms": {
                    "cost": 200,
                    "upkeep": 4,
                    "combat_strength": 15.0,
                    "recruitment_time": 60
                },
                "knights": {
                    "cost": 800,
                    "upkeep": 12,
                    "combat_strength": 40.0,
                    "recruitment_time": 120
                }
            },
            "technology_requirements": {
                "levy": 0,
                "men_at_arms": 2,
                "knights": 5
            }
        },
        "ui": {
            "window": {
                "default_width": 1920,
                "default_height": 1080
            },
            "scaling": {
                "factor": 1.0
            },
            "themes": {
                "default": {
                    "background": "#1e1e1e",
                    "text": "#e0e0e0",
                    "accent": "#c8a040",
                    "warning": "#e0a020",
                    "error": "#d04040"
                }
            }
        }
    })
}
