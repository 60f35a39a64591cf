use std::path::{Path, PathBuf};
use std::process::ExitCode;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use futures::future::join_all;
use pps_lib::output::{RenderOutput, RenderedPoster, PPS_OUTPUT_VERSION};
use pps_lib::{
    load_reference_image, AspectRatio, EncodedImage, GenerationOptions, ParsedPrompt,
    PosterStudio, PpsError, PpsOutput,
};

use crate::cli::OutputFormat;
use crate::formatting::{exit_code_for_render, render_error, write_output};
use crate::settings::{build_client, load_config, log_effective_config};

/// One record selected for rendering.
#[derive(Debug, Clone)]
struct Target {
    id: usize,
    title: String,
    english_empty: bool,
}

/// Run the render command.
#[allow(clippy::too_many_arguments)]
pub async fn run_render(
    config_path: Option<PathBuf>,
    verbose: bool,
    prompts_path: PathBuf,
    ids: Vec<usize>,
    images: Vec<PathBuf>,
    aspect_ratio: Option<AspectRatio>,
    out_dir: PathBuf,
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
    let ratio = aspect_ratio.unwrap_or(config.defaults.aspect_ratio);

    let prompts = match read_prompts(&prompts_path) {
        Ok(prompts) => prompts,
        Err(err) => return render_error(err, format, None),
    };
    let targets = match select_targets(&prompts, &ids) {
        Ok(targets) => targets,
        Err(err) => return render_error(err, format, None),
    };
    if targets.is_empty() {
        return render_error(
            PpsError::precondition(
                "No renderable records; every record is missing an English prompt",
            ),
            format,
            None,
        );
    }

    let encoded = match load_images(&images) {
        Ok(encoded) => encoded,
        Err(err) => return render_error(err, format, None),
    };
    if encoded.is_empty() {
        return render_error(
            PpsError::precondition("No reference image available for rendering"),
            format,
            None,
        );
    }

    if let Err(err) = std::fs::create_dir_all(&out_dir) {
        return render_error(PpsError::Io(err), format, None);
    }

    let posters = match mock_image_from_env(verbose) {
        Ok(Some(mock_payload)) => targets
            .iter()
            .map(|target| {
                if target.english_empty {
                    return unrenderable_poster(target);
                }
                poster_from_payload(&out_dir, target.id, &target.title, &mock_payload)
            })
            .collect(),
        Ok(None) => {
            let client = match build_client(api_key, &config) {
                Ok(client) => client,
                Err(err) => return render_error(err, format, None),
            };
            let mut studio = PosterStudio::new(client);
            studio.set_reference_images(encoded);
            studio.set_options(GenerationOptions {
                aspect_ratio: ratio,
                ..GenerationOptions::default()
            });
            studio.set_prompts(prompts);

            if verbose {
                eprintln!(
                    "Rendering {} poster(s) at {} into {}…",
                    targets.len(),
                    ratio,
                    out_dir.display()
                );
            }
            let outcomes =
                join_all(targets.iter().map(|target| studio.render_poster(target.id))).await;

            targets
                .iter()
                .zip(outcomes)
                .map(|(target, outcome)| match outcome {
                    Ok(record) => {
                        let payload = record.generated_image.unwrap_or_default();
                        poster_from_payload(&out_dir, target.id, &target.title, &payload)
                    }
                    Err(err) => RenderedPoster {
                        id: target.id,
                        title: target.title.clone(),
                        output_path: None,
                        error: Some(err.to_payload()),
                    },
                })
                .collect::<Vec<_>>()
        }
        Err(err) => return render_error(err, format, None),
    };

    let all_succeeded = posters.iter().all(|p| p.output_path.is_some());
    let body = PpsOutput::Render(RenderOutput {
        version: PPS_OUTPUT_VERSION.to_string(),
        aspect_ratio: ratio,
        posters,
    });
    if let Err(err) = write_output(&body, format, output) {
        return render_error(PpsError::Config(err.to_string()), format, None);
    }
    exit_code_for_render(all_succeeded)
}

/// Reads a prompt set file: either the `pps prompts` JSON output or a bare
/// record array.
fn read_prompts(path: &Path) -> Result<Vec<ParsedPrompt>, PpsError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PpsError::Config(format!(
            "Prompt set file not found or unreadable ({}): {e}",
            path.display()
        ))
    })?;

    if let Ok(PpsOutput::Prompts(out)) = serde_json::from_str::<PpsOutput>(&raw) {
        return Ok(out.prompts);
    }
    serde_json::from_str(&raw).map_err(|e| {
        PpsError::Config(format!(
            "Failed to decode prompt set file {}: {e}",
            path.display()
        ))
    })
}

/// Resolves the records to render. Explicitly requested ids must exist;
/// without `--id` flags, every record with an English prompt is rendered.
fn select_targets(prompts: &[ParsedPrompt], requested: &[usize]) -> Result<Vec<Target>, PpsError> {
    let target = |record: &ParsedPrompt| Target {
        id: record.id,
        title: record.title.clone(),
        english_empty: record.english_prompt.trim().is_empty(),
    };

    if requested.is_empty() {
        return Ok(prompts
            .iter()
            .filter(|p| !p.english_prompt.trim().is_empty())
            .map(target)
            .collect());
    }

    requested
        .iter()
        .map(|&id| {
            prompts
                .iter()
                .find(|p| p.id == id)
                .map(target)
                .ok_or_else(|| {
                    PpsError::Config(format!("No prompt record with id {id} in the prompt set"))
                })
        })
        .collect()
}

fn load_images(paths: &[PathBuf]) -> Result<Vec<EncodedImage>, PpsError> {
    paths
        .iter()
        .map(|path| load_reference_image(path).map_err(PpsError::from))
        .collect()
}

fn unrenderable_poster(target: &Target) -> RenderedPoster {
    RenderedPoster {
        id: target.id,
        title: target.title.clone(),
        output_path: None,
        error: Some(
            PpsError::precondition(format!(
                "Poster {} has no extracted English prompt",
                target.id
            ))
            .to_payload(),
        ),
    }
}

/// Decodes a base64 image payload and writes it as `poster-NN.png`.
fn poster_from_payload(out_dir: &Path, id: usize, title: &str, payload: &str) -> RenderedPoster {
    let path = out_dir.join(format!("poster-{id:02}.png"));
    let written = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| PpsError::malformed(format!("image payload was not valid base64: {e}")))
        .and_then(|bytes| std::fs::write(&path, bytes).map_err(PpsError::Io));

    match written {
        Ok(()) => RenderedPoster {
            id,
            title: title.to_string(),
            output_path: Some(path),
            error: None,
        },
        Err(err) => RenderedPoster {
            id,
            title: title.to_string(),
            output_path: None,
            error: Some(err.to_payload()),
        },
    }
}

/// A non-empty `PPS_MOCK_IMAGE` carries a base64 image payload used for every
/// requested poster, skipping the generation service entirely.
fn mock_image_from_env(verbose: bool) -> Result<Option<String>, PpsError> {
    let Ok(mock) = std::env::var("PPS_MOCK_IMAGE") else {
        return Ok(None);
    };
    if mock.trim().is_empty() {
        return Ok(None);
    }
    if verbose {
        eprintln!("Using PPS_MOCK_IMAGE; generation service not invoked.");
    }
    Ok(Some(mock))
}
