use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pps_lib::output::{PromptsOutput, PPS_OUTPUT_VERSION};
use pps_lib::{
    parse_or_fallback, AnalysisResult, AspectRatio, GenerationOptions, PosterStudio, PpsError,
    PpsOutput,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{build_client, load_config, log_effective_config, resolve_generation_settings};

/// Run the prompts command.
#[allow(clippy::too_many_arguments)]
pub async fn run_prompts(
    config_path: Option<PathBuf>,
    verbose: bool,
    analysis_path: PathBuf,
    style: Option<String>,
    typo: Option<String>,
    model_desc: Option<String>,
    scene_desc: Option<String>,
    data_viz: bool,
    other: Option<String>,
    aspect_ratio: Option<AspectRatio>,
    api_key: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, None),
    };
    if verbose {
        log_effective_config(config_path.as_deref(), &config);
    }
    let settings = resolve_generation_settings(style, typo, aspect_ratio, &config);

    let analysis = match read_analysis(&analysis_path) {
        Ok(analysis) => analysis,
        Err(err) => return render_error(err, format, None),
    };

    let options = GenerationOptions {
        model_needed: model_desc.is_some(),
        model_desc: model_desc.unwrap_or_default(),
        scene_needed: scene_desc.is_some(),
        scene_desc: scene_desc.unwrap_or_default(),
        data_viz_needed: data_viz,
        other_reqs: other.unwrap_or_default(),
        aspect_ratio: settings.aspect_ratio,
    };

    let prompts = match mock_text_from_env(verbose) {
        Ok(Some(raw)) => {
            if pps_lib::find_visual_style(&settings.visual_style).is_none() {
                return render_error(
                    PpsError::Config(format!(
                        "Unknown visual style '{}'",
                        settings.visual_style
                    )),
                    format,
                    None,
                );
            }
            if pps_lib::find_typo_style(&settings.typo_style).is_none() {
                return render_error(
                    PpsError::Config(format!(
                        "Unknown typography style '{}'",
                        settings.typo_style
                    )),
                    format,
                    None,
                );
            }
            parse_or_fallback(&raw)
        }
        Ok(None) => {
            let client = match build_client(api_key, &config) {
                Ok(client) => client,
                Err(err) => return render_error(err, format, None),
            };
            let mut studio = PosterStudio::new(client);
            studio.set_analysis(analysis);
            if let Err(err) = studio.select_visual_style(&settings.visual_style) {
                return render_error(err, format, None);
            }
            if let Err(err) = studio.select_typo_style(&settings.typo_style) {
                return render_error(err, format, None);
            }
            studio.set_options(options);
            if verbose {
                eprintln!(
                    "Generating prompt set (style: {}, typography: {})…",
                    settings.visual_style, settings.typo_style
                );
            }
            match studio.generate_prompt_set().await {
                Ok(prompts) => prompts,
                Err(err) => return render_error(err, format, None),
            }
        }
        Err(err) => return render_error(err, format, None),
    };

    if verbose {
        eprintln!("Parsed {} prompt record(s).", prompts.len());
    }

    let body = PpsOutput::Prompts(PromptsOutput {
        version: PPS_OUTPUT_VERSION.to_string(),
        visual_style: settings.visual_style,
        typo_style: settings.typo_style,
        prompts,
    });
    if let Err(err) = write_output(&body, format, output) {
        return render_error(PpsError::Config(err.to_string()), format, None);
    }
    ExitCode::SUCCESS
}

/// Reads an analysis file: either the `pps analyze` JSON output or a bare
/// analysis object.
fn read_analysis(path: &Path) -> Result<AnalysisResult, PpsError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PpsError::Config(format!("Analysis file not found or unreadable ({}): {e}", path.display()))
    })?;

    if let Ok(PpsOutput::Analyze(out)) = serde_json::from_str::<PpsOutput>(&raw) {
        return Ok(out.analysis);
    }
    serde_json::from_str(&raw).map_err(|e| {
        PpsError::Config(format!(
            "Failed to decode analysis file {}: {e}",
            path.display()
        ))
    })
}

/// `PPS_MOCK_TEXT` (inline) or `PPS_MOCK_TEXT_PATH` (file) carries the
/// generated markdown, skipping the generation service entirely.
fn mock_text_from_env(verbose: bool) -> Result<Option<String>, PpsError> {
    if let Ok(mock) = std::env::var("PPS_MOCK_TEXT") {
        if !mock.trim().is_empty() {
            if verbose {
                eprintln!("Using PPS_MOCK_TEXT; generation service not invoked.");
            }
            return Ok(Some(mock));
        }
    }

    if let Ok(path) = std::env::var("PPS_MOCK_TEXT_PATH") {
        if !path.trim().is_empty() {
            if verbose {
                eprintln!("Using mock text from {path}; generation service not invoked.");
            }
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| PpsError::Config(format!("Failed to read mock text file: {e}")))?;
            return Ok(Some(raw));
        }
    }

    Ok(None)
}
