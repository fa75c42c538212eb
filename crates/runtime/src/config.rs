use dwellspace_interaction::{DwellConfig, GazeConfig, IndicatorStyle};
use dwellspace_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything tunable about the runtime. Every field has a default, so a
/// YAML file only needs the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub physics: PhysicsConfig,
    pub gaze: GazeConfig,
    pub dwell: DwellConfig,
    pub indicator: IndicatorStyle,
}

impl RuntimeConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn dwell_interval(&self) -> Duration {
        Duration::from_millis(self.dwell.interval_ms)
    }

    /// Reject values that would stall or divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if !(p.fixed_step.is_finite() && p.fixed_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "physics.fixed_step must be > 0, got {}",
                p.fixed_step
            )));
        }
        if p.max_substeps == 0 {
            return Err(ConfigError::Invalid("physics.max_substeps must be >= 1".into()));
        }
        if !p.gravity.iter().all(|g| g.is_finite()) {
            return Err(ConfigError::Invalid("physics.gravity must be finite".into()));
        }
        let materials = [
            ("ground_friction", p.ground_friction),
            ("ground_restitution", p.ground_restitution),
            ("box_friction", p.box_friction),
            ("box_restitution", p.box_restitution),
        ];
        if let Some((name, value)) = materials
            .into_iter()
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
        {
            return Err(ConfigError::Invalid(format!(
                "physics.{name} must be >= 0, got {value}"
            )));
        }
        let d = &self.dwell;
        if d.interval_ms == 0 {
            return Err(ConfigError::Invalid("dwell.interval_ms must be >= 1".into()));
        }
        if !(d.step.is_finite() && d.step > 0.0) {
            return Err(ConfigError::Invalid(format!("dwell.step must be > 0, got {}", d.step)));
        }
        if !(d.threshold.is_finite() && d.threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "dwell.threshold must be > 0, got {}",
                d.threshold
            )));
        }
        let g = &self.gaze;
        if !(g.min_distance >= 0.0 && g.max_distance > g.min_distance) {
            return Err(ConfigError::Invalid(format!(
                "gaze range [{}, {}] is empty",
                g.min_distance, g.max_distance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = RuntimeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.dwell.step, 0.01);
        assert_eq!(config.dwell.threshold, 1.0);
        assert_eq!(config.physics.gravity, [0.0, -9.82, 0.0]);
        assert_eq!(config.dwell_interval(), Duration::from_millis(20));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = RuntimeConfig::from_yaml_str("dwell:\n  interval_ms: 10\n").unwrap();
        assert_eq!(config.dwell.interval_ms, 10);
        assert_eq!(config.dwell.step, 0.01);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config = RuntimeConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn yaml_round_trip_preserves_values() {
        let mut config = RuntimeConfig::default();
        config.indicator.min_scale = 0.25;
        config.gaze.max_distance = 50.0;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(RuntimeConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn rejects_zero_step_and_interval() {
        assert!(matches!(
            RuntimeConfig::from_yaml_str("dwell:\n  step: 0.0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_yaml_str("dwell:\n  interval_ms: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_yaml_str("physics:\n  fixed_step: -1.0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn contact_materials_are_read_and_checked() {
        let config =
            RuntimeConfig::from_yaml_str("physics:\n  box_friction: 0.3\n").unwrap();
        assert_eq!(config.physics.box_friction, 0.3);
        assert_eq!(config.physics.ground_friction, 0.5);
        assert!(matches!(
            RuntimeConfig::from_yaml_str("physics:\n  ground_restitution: -0.1\n"),
            Err(ConfigError::Invalid(msg)) if msg.contains("ground_restitution")
        ));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        assert!(matches!(
            RuntimeConfig::from_yaml_str("dwell: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gaze:\n  max_distance: 12.5").unwrap();
        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.gaze.max_distance, 12.5);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RuntimeConfig::load(dir.path().join("nope.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
