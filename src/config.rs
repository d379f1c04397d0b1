use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::zoom::ScaleLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid profile: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTuning {
    pub history_window_ms: u64,
    pub history_depth: usize,
    pub double_tap_step: f64,
    pub wheel_step: f64,
    pub one_touch_zoom_step: f64,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            history_window_ms: 500,
            history_depth: 8,
            double_tap_step: 0.2,
            wheel_step: 0.002,
            one_touch_zoom_step: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        let limits = ScaleLimits::default();
        Self {
            min_scale: limits.min,
            max_scale: limits.max,
        }
    }
}

impl ZoomLimits {
    pub fn scale_limits(&self) -> ScaleLimits {
        ScaleLimits {
            min: self.min_scale,
            max: self.max_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    #[serde(default)]
    pub gestures: GestureTuning,
    #[serde(default)]
    pub zoom: ZoomLimits,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            meta: Meta {
                name: Some("default".to_string()),
            },
            gestures: GestureTuning::default(),
            zoom: ZoomLimits::default(),
        }
    }
}

pub fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

pub fn user_profile_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "touchview").map(|d| d.config_dir().join("profile.toml"))
}

impl Profile {
    pub fn from_toml_str(txt: &str) -> Result<Self, ConfigError> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let profile = Self::from_toml_str(&txt)?;
        info!(
            "loaded profile '{}' from {}",
            profile.meta.name.as_deref().unwrap_or("unnamed"),
            path.display()
        );
        Ok(profile)
    }

    /// Explicit path, then the user profile if present, then the default.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        match user_profile_path() {
            Some(p) if p.exists() => Self::load(&p),
            _ => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string(self).unwrap_or_else(|e| {
            warn!("failed to serialize profile: {e}");
            String::new()
        })
    }
}

fn positive(name: &str, v: f64) -> Result<(), ConfigError> {
    if !(v.is_finite() && v > 0.0) {
        return Err(ConfigError::Invalid(format!(
            "{name} must be a positive finite number, got {v}"
        )));
    }
    Ok(())
}

fn validate_profile(p: &Profile) -> Result<(), ConfigError> {
    let g = &p.gestures;
    if g.history_window_ms == 0 {
        return Err(ConfigError::Invalid(
            "gestures.history_window_ms must be positive".into(),
        ));
    }
    // the longest pattern matched is four primitives
    if g.history_depth < 4 {
        return Err(ConfigError::Invalid(format!(
            "gestures.history_depth must be at least 4, got {}",
            g.history_depth
        )));
    }
    positive("gestures.double_tap_step", g.double_tap_step)?;
    positive("gestures.wheel_step", g.wheel_step)?;
    positive("gestures.one_touch_zoom_step", g.one_touch_zoom_step)?;

    positive("zoom.min_scale", p.zoom.min_scale)?;
    positive("zoom.max_scale", p.zoom.max_scale)?;
    if p.zoom.min_scale >= p.zoom.max_scale {
        return Err(ConfigError::Invalid(format!(
            "zoom.min_scale ({}) must be below zoom.max_scale ({})",
            p.zoom.min_scale, p.zoom.max_scale
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_profile_matches_default() {
        let bundled = Profile::from_toml_str(default_profile_text()).unwrap();
        assert_eq!(bundled, Profile::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let p = Profile::from_toml_str("[meta]\nname = \"bare\"\n").unwrap();
        assert_eq!(p.gestures, GestureTuning::default());
        assert_eq!(p.zoom, ZoomLimits::default());
        assert_eq!(p.meta.name.as_deref(), Some("bare"));
    }

    #[test]
    fn rejects_inverted_limits() {
        let txt = "[meta]\n[zoom]\nmin_scale = 5.0\nmax_scale = 1.0\n";
        let err = Profile::from_toml_str(txt).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_short_history() {
        let mut p = Profile::default();
        p.gestures.history_depth = 3;
        assert!(validate_profile(&p).is_err());
        p.gestures.history_depth = 4;
        assert!(validate_profile(&p).is_ok());
    }

    #[test]
    fn rejects_non_positive_steps() {
        let mut p = Profile::default();
        p.gestures.wheel_step = 0.0;
        assert!(validate_profile(&p).is_err());
        let mut p = Profile::default();
        p.gestures.double_tap_step = f64::NAN;
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn parse_errors_are_reported() {
        let err = Profile::from_toml_str("[meta\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[meta]\nname = \"slow\"\n[gestures]\nhistory_window_ms = 900\nhistory_depth = 6\ndouble_tap_step = 0.5\nwheel_step = 0.001\none_touch_zoom_step = 0.004").unwrap();
        let p = Profile::load(f.path()).unwrap();
        assert_eq!(p.gestures.history_window_ms, 900);
        assert_eq!(p.gestures.double_tap_step, 0.5);
        assert_eq!(p.zoom, ZoomLimits::default());
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Profile::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn serialized_profile_parses_back() {
        let txt = Profile::default().to_toml_string();
        assert_eq!(Profile::from_toml_str(&txt).unwrap(), Profile::default());
    }
}
