//! Helpers shared by the commands.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use vibra_config::EffectConfig;

/// How a command picks its effect and parameter values.
#[derive(Args, Debug, Clone)]
pub struct EffectSelection {
    /// Effect id (see `vibra effects`)
    #[arg(short, long)]
    pub effect: Option<String>,

    /// Effect configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parameter override, e.g. "feedback=0.4" or "delay=250ms"
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    pub param: Vec<(String, String)>,
}

impl EffectSelection {
    /// Loads the configuration file (if any), then applies `--effect` and
    /// `--param` on top.
    pub fn to_config(&self) -> Result<EffectConfig> {
        let mut config = match (&self.config, &self.effect) {
            (Some(path), effect) => {
                let mut config = EffectConfig::load(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                if let Some(effect) = effect {
                    if !effect.eq_ignore_ascii_case(&config.effect) {
                        anyhow::bail!(
                            "--effect {} conflicts with '{}' in {}",
                            effect,
                            config.effect,
                            path.display()
                        );
                    }
                }
                config
            }
            (None, Some(effect)) => EffectConfig::new(effect.as_str()),
            (None, None) => anyhow::bail!("No effect specified. Use --effect or --config"),
        };
        for (key, value) in &self.param {
            config.params.insert(key.clone(), value.as_str().into());
        }
        Ok(config)
    }
}

/// Parses `key=value`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid parameter format: '{}' (expected key=value)", s));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibra_config::ParamValue;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("mix=50%"),
            Ok(("mix".to_string(), "50%".to_string()))
        );
        assert!(parse_key_val("mix").is_err());
        assert!(parse_key_val("=1").is_err());
    }

    #[test]
    fn test_selection_requires_effect() {
        let selection = EffectSelection {
            effect: None,
            config: None,
            param: Vec::new(),
        };
        assert!(selection.to_config().is_err());
    }

    #[test]
    fn test_params_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delay.toml");
        EffectConfig::new("delay")
            .with_param("feedback", 0.1)
            .with_param("mix", 0.3)
            .save(&path)
            .unwrap();

        let selection = EffectSelection {
            effect: None,
            config: Some(path),
            param: vec![("feedback".to_string(), "0.6".to_string())],
        };
        let config = selection.to_config().unwrap();
        assert_eq!(config.params["feedback"], ParamValue::Text("0.6".to_string()));
        assert_eq!(config.params["mix"], ParamValue::Number(0.3));
    }

    #[test]
    fn test_conflicting_effect_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delay.toml");
        EffectConfig::new("delay").save(&path).unwrap();
        let selection = EffectSelection {
            effect: Some("chorus".to_string()),
            config: Some(path),
            param: Vec::new(),
        };
        assert!(selection.to_config().is_err());
    }
}
