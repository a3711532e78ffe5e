//! Start level overrides
//!
//! Overrides come from a Java `.properties` file (bundle symbolic name as
//! key, start level as value, e.g. `org.eclipse.equinox.common=2`) and from
//! explicit `NAME=LEVEL` pairs. Explicit pairs are applied after the file; an
//! explicit level of [`RESET_START_LEVEL`] removes the override so the bundle
//! falls back to the default start level.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::errors::ConfigError;
use crate::model::StartLevels;

/// Explicit override value meaning "use the default start level"
pub const RESET_START_LEVEL: i32 = -1;

/// Parse `.properties` content into key/value pairs, in file order.
///
/// Supports `#` and `!` comments, `=`, `:` or whitespace separators and
/// trailing-backslash line continuation. Keys and values are trimmed.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut logical = String::new();

    for raw in content.lines() {
        let line = raw.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with(['#', '!'])) {
            continue;
        }

        if has_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }

        logical.push_str(line);
        pairs.push(split_property(&logical));
        logical.clear();
    }

    if !logical.is_empty() {
        pairs.push(split_property(&logical));
    }
    pairs
}

// An odd number of trailing backslashes continues the line; `\\` is a
// literal backslash.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_property(line: &str) -> (String, String) {
    let key_end = line
        .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let (key, rest) = line.split_at(key_end);
    let rest = rest.trim_start();
    let value = rest.strip_prefix(['=', ':']).unwrap_or(rest).trim();
    (key.to_string(), value.to_string())
}

/// Convert property pairs into start levels.
///
/// Every value must be an integer; anything else is an error naming the
/// offending bundle and value. Later keys replace earlier ones.
pub fn start_levels_from_properties(
    pairs: impl IntoIterator<Item = (String, String)>,
) -> Result<StartLevels, ConfigError> {
    let mut levels = StartLevels::new();
    for (bundle, value) in pairs {
        let level = value
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidStartLevel {
                bundle: bundle.clone(),
                value: value.clone(),
            })?;
        levels.insert(bundle, level);
    }
    Ok(levels)
}

/// Load start levels from a `.properties` file.
pub fn load_start_levels(path: &Path) -> Result<StartLevels, ConfigError> {
    debug!("Loading start levels from: {:?}", path);
    let content = fs::read_to_string(path).map_err(|source| ConfigError::StartLevelsRead {
        path: path.to_path_buf(),
        source,
    })?;
    start_levels_from_properties(parse_properties(&content))
}

/// Parse a `NAME=LEVEL` command-line override.
pub fn parse_start_level_arg(arg: &str) -> Result<(String, i32), ConfigError> {
    let Some((name, value)) = arg.split_once('=') else {
        return Err(ConfigError::InvalidOverride(arg.to_string()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidOverride(arg.to_string()));
    }
    let value = value.trim();
    let level = value
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidStartLevel {
            bundle: name.to_string(),
            value: value.to_string(),
        })?;
    Ok((name.to_string(), level))
}

/// Apply one explicit override; [`RESET_START_LEVEL`] removes the entry.
pub fn apply_override(levels: &mut StartLevels, name: &str, level: i32) {
    if level == RESET_START_LEVEL {
        levels.remove(name);
    } else {
        levels.insert(name.to_string(), level);
    }
}

/// Layers start level sources in the order they are added
#[derive(Debug, Clone, Default)]
pub struct StartLevelsBuilder {
    levels: StartLevels,
}

impl StartLevelsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a `.properties` file; its values are taken as written.
    pub fn properties_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        self.levels.extend(load_start_levels(path)?);
        Ok(self)
    }

    /// Apply an explicit override.
    pub fn override_level(mut self, name: &str, level: i32) -> Self {
        apply_override(&mut self.levels, name, level);
        self
    }

    /// Apply several explicit overrides in iteration order.
    pub fn override_levels<'a>(mut self, levels: impl IntoIterator<Item = (&'a str, i32)>) -> Self {
        for (name, level) in levels {
            apply_override(&mut self.levels, name, level);
        }
        self
    }

    pub fn build(self) -> StartLevels {
        self.levels
    }
}
