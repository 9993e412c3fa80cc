use std::path::{Path, PathBuf};

use psdhtml_lib::{Config, ConvertError};

/// CLI values that override the config file when given.
#[derive(Debug, Default)]
pub struct ConvertOverrides {
    pub output_dir: Option<PathBuf>,
    pub click_through_url: Option<String>,
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/psdhtml/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, ConvertError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        ConvertError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| invalid_config(path, e))?;
    Ok(cfg)
}

/// Merge CLI arguments into the loaded config, preferring CLI values, and
/// re-validate the result.
pub fn resolve_convert_config(
    mut cfg: Config,
    overrides: ConvertOverrides,
    config_path: Option<&Path>,
) -> Result<Config, ConvertError> {
    if let Some(dir) = overrides.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(url) = overrides.click_through_url {
        cfg.click_through_url = url;
    }
    cfg.validate().map_err(|e| invalid_config(config_path, e))?;
    Ok(cfg)
}

fn invalid_config(path: Option<&Path>, e: impl std::fmt::Display) -> ConvertError {
    let message = path
        .map(|p| format!("Invalid config ({}): {}", p.display(), e))
        .unwrap_or_else(|| format!("Invalid config: {}", e));
    ConvertError::Config(message)
}

/// Format effective config as a single-line string.
pub fn format_effective_config(cfg: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let sizes = cfg
        .standard_sizes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "Effective config [{source}]: output_dir={}, click_through_url={}, standard_sizes=[{}], hero_jpeg_quality={}, debug_rasters={}",
        cfg.output_dir.display(),
        cfg.click_through_url,
        sizes,
        cfg.hero_jpeg_quality,
        cfg.debug_rasters
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use psdhtml_lib::AdSize;

    #[test]
    fn resolve_convert_config_prefers_config_when_flags_absent() {
        let cfg = Config {
            output_dir: PathBuf::from("from-config"),
            click_through_url: "https://config.example.com".into(),
            ..Config::default()
        };

        let resolved =
            resolve_convert_config(cfg, ConvertOverrides::default(), None).expect("valid config");
        assert_eq!(resolved.output_dir, PathBuf::from("from-config"));
        assert_eq!(resolved.click_through_url, "https://config.example.com");
    }

    #[test]
    fn resolve_convert_config_prefers_cli_when_flags_present() {
        let overrides = ConvertOverrides {
            output_dir: Some(PathBuf::from("from-cli")),
            click_through_url: Some("https://cli.example.com".into()),
        };

        let resolved =
            resolve_convert_config(Config::default(), overrides, None).expect("valid config");
        assert_eq!(resolved.output_dir, PathBuf::from("from-cli"));
        assert_eq!(resolved.click_through_url, "https://cli.example.com");
    }

    #[test]
    fn resolve_convert_config_rejects_invalid_cli_url() {
        let overrides = ConvertOverrides {
            click_through_url: Some("not a url".into()),
            ..ConvertOverrides::default()
        };

        let err = resolve_convert_config(Config::default(), overrides, None)
            .expect_err("invalid url");
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn format_effective_config_includes_all_fields() {
        let cfg = Config {
            standard_sizes: vec![AdSize::new(300, 600), AdSize::new(728, 90)],
            ..Config::default()
        };
        let line = format_effective_config(&cfg, Some(Path::new("psdhtml.toml")));

        assert!(line.starts_with("Effective config [psdhtml.toml]"));
        assert!(line.contains("output_dir=output"));
        assert!(line.contains("click_through_url=https://www.example.com"));
        assert!(line.contains("standard_sizes=[300x600,728x90]"));
        assert!(line.contains("hero_jpeg_quality=98"));
        assert!(line.contains("debug_rasters=false"));
    }
}
