//! Optional TOML configuration: built-in defaults + `~/.henon/config.toml`.
//!
//! Every section is optional; absent keys keep their defaults, and command
//! line flags override whatever the file says.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::classify::DEFAULT_TOLERANCE;
use crate::core::henon::HenonParams;
use crate::core::lyapunov::LyapunovSettings;
use crate::grid::table::TableFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapSection,
    pub lyapunov: LyapunovSection,
    pub classify: ClassifySection,
    pub table: TableFormat,
    pub sweep: SweepSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSection {
    pub a: f64,
    pub b: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for MapSection {
    fn default() -> Self {
        let p = HenonParams::default();
        Self {
            a: p.a,
            b: p.b,
            x0: 0.0,
            y0: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyapunovSection {
    pub iterations: usize,
    pub cut: usize,
    pub threshold: Option<f64>,
}

impl Default for LyapunovSection {
    fn default() -> Self {
        let s = LyapunovSettings::default();
        Self {
            iterations: s.iterations,
            cut: s.cut,
            threshold: s.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifySection {
    pub tolerance: f64,
}

impl Default for ClassifySection {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSection {
    pub parallel: bool,
    /// Seed for randomized samplers; unset draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            parallel: true,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(txt: &str) -> Result<Self> {
        toml::from_str(txt).context("parsing configuration")
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
    }

    /// Loads `path` if it exists; a missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_toml_file(p),
            _ => Ok(Self::default()),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    // ~/.henon/config.toml
    dirs_next::home_dir().map(|h| h.join(".henon").join("config.toml"))
}

pub fn resolve_config_path(cli_path: &Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = cli_path {
        return Some(p.clone());
    }
    default_config_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
[map]
a = 1.2

[table]
precision = 6
"#,
        )
        .unwrap();
        assert_eq!(cfg.map.a, 1.2);
        assert_eq!(cfg.map.b, 0.3);
        assert_eq!(cfg.table.precision, Some(6));
        assert_eq!(cfg.table.delimiter, '|');
        assert_eq!(cfg.lyapunov, LyapunovSection::default());
        assert!(cfg.sweep.parallel);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[map]\na = \"wide\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }

    #[test]
    fn cli_path_wins() {
        let p = PathBuf::from("/tmp/custom.toml");
        assert_eq!(resolve_config_path(&Some(p.clone())), Some(p));
    }
}
