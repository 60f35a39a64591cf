use std::path::Path;

use pps_lib::{AspectRatio, Config, GenAiAuth, GenAiClient, ModelSelection, PpsError};

/// Resolved generation settings after merging CLI args and config file.
#[derive(Debug, Clone)]
pub struct ResolvedGenerationSettings {
    pub aspect_ratio: AspectRatio,
    pub visual_style: String,
    pub typo_style: String,
}

/// Merge CLI arguments with config file, preferring CLI when flags are present.
pub fn resolve_generation_settings(
    cli_style: Option<String>,
    cli_typo: Option<String>,
    cli_aspect_ratio: Option<AspectRatio>,
    config: &Config,
) -> ResolvedGenerationSettings {
    ResolvedGenerationSettings {
        aspect_ratio: cli_aspect_ratio.unwrap_or(config.defaults.aspect_ratio),
        visual_style: cli_style.unwrap_or_else(|| config.defaults.visual_style.clone()),
        typo_style: cli_typo.unwrap_or_else(|| config.defaults.typo_style.clone()),
    }
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/pps/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, PpsError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        PpsError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        PpsError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Build the generation client from the resolved credential and config.
/// A CLI-provided key wins over the PPS_API_KEY environment variable.
pub fn build_client(api_key: Option<String>, config: &Config) -> Result<GenAiClient, PpsError> {
    let auth = match api_key {
        Some(key) if !key.trim().is_empty() => GenAiAuth::ApiKey(key),
        _ => GenAiAuth::from_env().ok_or(PpsError::MissingApiKey)?,
    };
    let client = GenAiClient::with_base_url_and_timeout(
        auth,
        config.api.base_url.clone(),
        config.api.timeout,
    )?
    .with_models(ModelSelection {
        text_model: config.api.text_model.clone(),
        image_model: config.api.image_model.clone(),
    });
    Ok(client)
}

/// Log effective config to stderr (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, config: &Config) {
    let config_source = config_path
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "defaults/built-in".to_string());
    eprintln!(
        "Effective config (source: {}): base_url {}, timeout {}s, text_model {}, image_model {}, defaults: style {}, typo {}, aspect_ratio {}",
        config_source,
        config.api.base_url,
        config.api.timeout.as_secs(),
        config.api.text_model,
        config.api.image_model,
        config.defaults.visual_style,
        config.defaults.typo_style,
        config.defaults.aspect_ratio,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_settings_prefers_config_when_flags_absent() {
        let mut cfg = Config::default();
        cfg.defaults.visual_style = "tech".to_string();
        cfg.defaults.aspect_ratio = AspectRatio::Wide;

        let resolved = resolve_generation_settings(None, None, None, &cfg);
        assert_eq!(resolved.visual_style, "tech");
        assert_eq!(resolved.typo_style, "minimal_line");
        assert_eq!(resolved.aspect_ratio, AspectRatio::Wide);
    }

    #[test]
    fn resolve_settings_prefers_cli_when_flags_present() {
        let cfg = Config::default();
        let resolved = resolve_generation_settings(
            Some("magazine".to_string()),
            Some("serif_magazine".to_string()),
            Some(AspectRatio::Square),
            &cfg,
        );
        assert_eq!(resolved.visual_style, "magazine");
        assert_eq!(resolved.typo_style, "serif_magazine");
        assert_eq!(resolved.aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn load_config_wraps_invalid_file_errors_with_location() {
        let err = load_config(Some(Path::new("/tmp/pps-missing-config.toml"))).unwrap_err();
        assert!(err.to_string().contains("/tmp/pps-missing-config.toml"));
    }
}
