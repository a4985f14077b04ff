//! Integration tests for vibra-config.
//!
//! These tests exercise file round trips and applying configurations to
//! running kernels.

use tempfile::TempDir;
use vibra_config::{ConfigError, EffectConfig, EffectRegistry, OptionsConfig, PolarityConfig};
use vibra_core::{ModulationPolarity, ProcessSpec};

#[test]
fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tremolo.toml");

    let config = EffectConfig::new("tremolo")
        .with_param("rate", 3.0)
        .with_param("depth", "90%")
        .with_reset_phase(false)
        .with_options(OptionsConfig {
            polarity: PolarityConfig::Unipolar,
            ..OptionsConfig::default()
        });
    config.save(&path).unwrap();

    let loaded = EffectConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.kernel_options().polarity, ModulationPolarity::Unipolar);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = EffectConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_load_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "effect = [").unwrap();
    assert!(matches!(
        EffectConfig::load(&path).unwrap_err(),
        ConfigError::TomlParse(_)
    ));
}

#[test]
fn test_config_drives_kernel() {
    let registry = EffectRegistry::new();
    let config = EffectConfig::from_toml(
        r#"
effect = "tremolo"

[params]
rate = 0
depth = 1.0
gain = 1.0

[options]
polarity = "unipolar"
"#,
    )
    .unwrap();
    config.validate(&registry).unwrap();

    let params = registry.create_params(&config.effect).unwrap();
    config.apply_to(&registry, &params).unwrap();

    let spec = ProcessSpec::new(48000.0, 64, 1);
    let mut kernel = registry
        .create(&config.effect, &spec, &config.kernel_options(), &params)
        .unwrap();

    // A stopped sine LFO holds sin(0) = 0, the midpoint of the unipolar
    // mapping at full depth.
    let mut block = [1.0f32; 64];
    kernel.process(&mut [&mut block], &params);
    assert!(block.iter().all(|&s| (s - 0.5).abs() < 1e-6), "{:?}", &block[..4]);
}
