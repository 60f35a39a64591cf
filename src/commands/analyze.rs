use std::path::PathBuf;
use std::process::ExitCode;

use pps_lib::output::{AnalyzeOutput, PPS_OUTPUT_VERSION};
use pps_lib::{
    clean_json_span, load_reference_image, AnalysisResult, EncodedImage, PosterStudio, PpsError,
    PpsOutput,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{build_client, load_config, log_effective_config};

/// Run the analyze command.
#[allow(clippy::too_many_arguments)]
pub async fn run_analyze(
    config_path: Option<PathBuf>,
    verbose: bool,
    images: Vec<PathBuf>,
    desc: Option<String>,
    brand: Option<String>,
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

    let desc = desc.unwrap_or_default();
    if images.is_empty() && desc.trim().is_empty() {
        return render_error(
            PpsError::Config(
                "Nothing to analyze; provide --desc and/or at least one --image".to_string(),
            ),
            format,
            None,
        );
    }

    let encoded = match load_images(&images) {
        Ok(encoded) => encoded,
        Err(err) => return render_error(err, format, None),
    };
    let image_labels: Vec<String> = images
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let brand = brand.unwrap_or_default();

    let analysis = match mock_analysis_from_env(verbose) {
        Ok(Some(mut analysis)) => {
            if !brand.trim().is_empty() {
                analysis.brand_name = brand.trim().to_string();
            }
            analysis
        }
        Ok(None) => {
            let client = match build_client(api_key, &config) {
                Ok(client) => client,
                Err(err) => return render_error(err, format, None),
            };
            let mut studio = PosterStudio::new(client);
            studio.set_reference_images(encoded);
            if verbose {
                eprintln!(
                    "Analyzing product ({} image(s), {} description chars)…",
                    images.len(),
                    desc.chars().count()
                );
            }
            match studio.analyze(&desc, &brand).await {
                Ok(analysis) => analysis.clone(),
                Err(err) => return render_error(err, format, None),
            }
        }
        Err(err) => return render_error(err, format, None),
    };

    let body = PpsOutput::Analyze(AnalyzeOutput {
        version: PPS_OUTPUT_VERSION.to_string(),
        images: image_labels,
        analysis,
    });
    if let Err(err) = write_output(&body, format, output) {
        return render_error(PpsError::Config(err.to_string()), format, None);
    }
    ExitCode::SUCCESS
}

fn load_images(paths: &[PathBuf]) -> Result<Vec<EncodedImage>, PpsError> {
    paths
        .iter()
        .map(|path| load_reference_image(path).map_err(PpsError::from))
        .collect()
}

/// A non-empty `PPS_MOCK_ANALYSIS` carries the analysis JSON inline, skipping
/// the generation service (and the credential lookup) entirely.
fn mock_analysis_from_env(verbose: bool) -> Result<Option<AnalysisResult>, PpsError> {
    let Ok(mock) = std::env::var("PPS_MOCK_ANALYSIS") else {
        return Ok(None);
    };
    if mock.trim().is_empty() {
        return Ok(None);
    }
    if verbose {
        eprintln!("Using PPS_MOCK_ANALYSIS; generation service not invoked.");
    }
    serde_json::from_str(clean_json_span(&mock))
        .map(Some)
        .map_err(|e| PpsError::Config(format!("Failed to decode PPS_MOCK_ANALYSIS: {e}")))
}
