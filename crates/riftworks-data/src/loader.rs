//! Resolution pipeline: reads data files, validates them, builds station data.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_station_data`], which resolves a
//! data directory into generator specs, gift rules and placement settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use riftworks_core::fixed::{DEFAULT_TICKS_PER_SECOND, f64_to_fixed64, seconds_to_ticks};
use riftworks_spatial::PlacementSettings;
use riftworks_station::{GeneratorSpec, GiftRule};
use serde::de::DeserializeOwned;

use crate::schema::{GeneratorData, GiftRuleData, PlacementData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// An entry parsed but holds a value the runtime cannot use.
    #[error("invalid '{name}' in {file}: {detail}")]
    Invalid {
        file: PathBuf,
        name: String,
        detail: String,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name.
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// `toml_key` from the top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(path: &Path, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
}

/// Check whether a name already exists in a map, returning a
/// `DuplicateName` error if so.
pub fn check_duplicate<V>(map: &BTreeMap<String, V>, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn invalid(file: &Path, name: &str, detail: impl Into<String>) -> DataLoadError {
    DataLoadError::Invalid {
        file: file.to_path_buf(),
        name: name.to_string(),
        detail: detail.into(),
    }
}

/// Convert a non-negative, finite duration in seconds to ticks.
fn duration_ticks(seconds: f64, tps: u32, file: &Path, name: &str, field: &str) -> Result<u64, DataLoadError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid(file, name, format!("{field} must be a non-negative number of seconds, got {seconds}")));
    }
    Ok(seconds_to_ticks(seconds, tps))
}

// ===========================================================================
// Station data
// ===========================================================================

/// Everything loaded from a station data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StationData {
    /// Generator specs by name.
    pub generators: BTreeMap<String, GeneratorSpec>,
    /// Gift rules by name. Empty when no `gifts` file exists.
    pub gifts: BTreeMap<String, GiftRule>,
    /// Defaults when no `placement` file exists.
    pub placement: PlacementSettings,
}

/// Load station data at the default tick rate.
///
/// Reads `generators.*` (required), `gifts.*` and `placement.*` (optional).
pub fn load_station_data(dir: &Path) -> Result<StationData, DataLoadError> {
    load_station_data_at_rate(dir, DEFAULT_TICKS_PER_SECOND)
}

/// Load station data, converting durations at `ticks_per_second`.
pub fn load_station_data_at_rate(dir: &Path, ticks_per_second: u32) -> Result<StationData, DataLoadError> {
    let generators_path = require_data_file(dir, "generators")?;
    let generators = load_generators(&generators_path, ticks_per_second)?;

    let gifts = match find_data_file(dir, "gifts")? {
        Some(path) => load_gifts(&path, ticks_per_second)?,
        None => BTreeMap::new(),
    };

    let placement = match find_data_file(dir, "placement")? {
        Some(path) => load_placement(&path)?,
        None => PlacementSettings::default(),
    };

    tracing::info!(
        dir = %dir.display(),
        generators = generators.len(),
        gifts = gifts.len(),
        "station data loaded"
    );
    Ok(StationData {
        generators,
        gifts,
        placement,
    })
}

fn load_generators(path: &Path, tps: u32) -> Result<BTreeMap<String, GeneratorSpec>, DataLoadError> {
    let entries: Vec<GeneratorData> = deserialize_list(path, "generators")?;
    let mut generators = BTreeMap::new();

    for data in entries {
        check_duplicate(&generators, &data.name, path)?;
        if data.material_per_production == 0 {
            return Err(invalid(path, &data.name, "material_per_production must be non-zero"));
        }
        if data.required_material.is_empty() {
            return Err(invalid(path, &data.name, "required_material must not be empty"));
        }
        let generation_length = duration_ticks(data.generation_seconds, tps, path, &data.name, "generation_seconds")?;
        let cooldown_length = duration_ticks(data.cooldown_seconds, tps, path, &data.name, "cooldown_seconds")?;
        if cooldown_length < generation_length {
            tracing::warn!(
                generator = %data.name,
                "cooldown is shorter than generation; starts are refused until the run completes"
            );
        }

        let spec = GeneratorSpec {
            required_material: data.required_material,
            material_per_production: data.material_per_production,
            generation_length,
            cooldown_length,
            spawner_prototype: data.spawner_prototype,
            broadcast_channel: data.broadcast_channel,
            announcement: data.announcement,
            generating_sound: data.generating_sound,
            finished_sound: data.finished_sound,
        };
        generators.insert(data.name, spec);
    }

    Ok(generators)
}

fn load_gifts(path: &Path, tps: u32) -> Result<BTreeMap<String, GiftRule>, DataLoadError> {
    let entries: Vec<GiftRuleData> = deserialize_list(path, "gifts")?;
    let mut rules = BTreeMap::new();

    for data in entries {
        check_duplicate(&rules, &data.name, path)?;
        if let Some((product, _)) = data.gifts.iter().find(|&(_, &quantity)| quantity == 0) {
            return Err(invalid(path, &data.name, format!("gift '{product}' has zero quantity")));
        }
        let interval = duration_ticks(data.seconds_between_gifts, tps, path, &data.name, "seconds_between_gifts")?;

        let rule = GiftRule {
            description: data.description,
            sender: data.sender,
            care_of: data.care_of,
            gifts: data.gifts,
            order_space_to_leave: data.order_space_to_leave,
            interval,
        };
        rules.insert(data.name, rule);
    }

    Ok(rules)
}

fn load_placement(path: &Path) -> Result<PlacementSettings, DataLoadError> {
    let data: PlacementData = deserialize_file(path)?;
    let scale = data.grid_bounds_scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(invalid(path, "grid_bounds_scale", format!("must be positive, got {scale}")));
    }
    let Some(bounds_scale) = f64_to_fixed64(scale) else {
        return Err(invalid(path, "grid_bounds_scale", format!("{scale} is out of range")));
    };
    if scale > 1.0 {
        tracing::warn!(scale, "grid_bounds_scale above 1 draws tiles outside the grid");
    }
    if data.max_attempts == 0 {
        tracing::warn!("max_attempts is 0; every placement falls back to the grid origin");
    }
    Ok(PlacementSettings {
        max_attempts: data.max_attempts,
        bounds_scale,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
