use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pps_lib::{ErrorOutput, PpsError, PpsOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &PpsOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: PpsError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let payload = PpsOutput::Error(ErrorOutput::new(err.to_payload()));

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Exit code 2 is reserved for fatal errors; partial render failures use 1.
    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(
    body: &PpsOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &PpsOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &PpsOutput, colorize: bool) -> String {
    match body {
        PpsOutput::Styles(out) => {
            let mut buf = String::new();
            let header = color("[STYLES]", "36", colorize);
            writeln!(buf, "{} Visual styles:", header).ok();
            for style in &out.visual_styles {
                writeln!(buf, "- {:16} {} {}: {}", style.id, style.icon, style.name, style.description).ok();
            }
            writeln!(buf, "Typography styles:").ok();
            for style in &out.typo_styles {
                writeln!(buf, "- {:16} {} {}: {}", style.id, style.icon, style.name, style.description).ok();
            }
            buf
        }
        PpsOutput::Analyze(out) => {
            let mut buf = String::new();
            let header = color("[ANALYZE]", "36", colorize);
            writeln!(buf, "{} Product analysis", header).ok();
            if !out.images.is_empty() {
                writeln!(buf, "Images: {}", out.images.join(", ")).ok();
            }
            let (brand_main, brand_sub) = out.analysis.brand_name_parts();
            match brand_sub {
                Some(sub) => writeln!(buf, "Brand: {} ({})", brand_main, sub).ok(),
                None => writeln!(buf, "Brand: {}", brand_main).ok(),
            };
            writeln!(buf, "Product: {}", out.analysis.product_type).ok();
            if !out.analysis.specs.is_empty() {
                writeln!(buf, "Specs: {}", out.analysis.specs).ok();
            }
            if !out.analysis.selling_points.is_empty() {
                writeln!(buf, "Selling points:").ok();
                for point in &out.analysis.selling_points {
                    writeln!(buf, "- {point}").ok();
                }
            }
            if !out.analysis.colors.is_empty() {
                writeln!(buf, "Colors: {}", out.analysis.colors.join(", ")).ok();
                let palette = out.analysis.primary_hex_colors();
                if !palette.is_empty() {
                    writeln!(buf, "Palette: {}", palette.join(" ")).ok();
                }
            }
            if !out.analysis.design_style.is_empty() {
                writeln!(buf, "Design style: {}", out.analysis.design_style).ok();
            }
            if !out.analysis.target_audience.is_empty() {
                writeln!(buf, "Audience: {}", out.analysis.target_audience).ok();
            }
            buf
        }
        PpsOutput::Prompts(out) => {
            let mut buf = String::new();
            let header = color("[PROMPTS]", "36", colorize);
            writeln!(
                buf,
                "{} {} record(s) (style: {}, typography: {})",
                header,
                out.prompts.len(),
                out.visual_style,
                out.typo_style
            )
            .ok();
            for prompt in &out.prompts {
                let title = color(&prompt.title, "1", colorize);
                writeln!(buf, "\n#{} {}", prompt.id, title).ok();
                if !prompt.chinese_prompt.is_empty() {
                    writeln!(buf, "中文: {}", prompt.chinese_prompt).ok();
                }
                if prompt.english_prompt.is_empty() {
                    let note = color("(no English prompt; not renderable)", "33", colorize);
                    writeln!(buf, "{note}").ok();
                } else {
                    writeln!(buf, "English: {}", prompt.english_prompt).ok();
                }
            }
            buf
        }
        PpsOutput::Render(out) => {
            let mut buf = String::new();
            let header = color("[RENDER]", "34", colorize);
            writeln!(
                buf,
                "{} {} poster(s), aspect ratio {}",
                header,
                out.posters.len(),
                out.aspect_ratio
            )
            .ok();
            for poster in &out.posters {
                match (&poster.output_path, &poster.error) {
                    (Some(path), _) => {
                        let ok = color("OK", "32", colorize);
                        writeln!(buf, "- {} #{} {} -> {}", ok, poster.id, poster.title, path.display()).ok();
                    }
                    (None, Some(error)) => {
                        let failed = color("FAILED", "31", colorize);
                        writeln!(buf, "- {} #{} {}: {}", failed, poster.id, poster.title, error.message).ok();
                    }
                    (None, None) => {
                        writeln!(buf, "- #{} {} (no output)", poster.id, poster.title).ok();
                    }
                }
            }
            buf
        }
        PpsOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            writeln!(buf, "{} {}", header, out.error.message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Determine exit code for the render command: all requested posters must
/// have produced an image.
pub fn exit_code_for_render(all_succeeded: bool) -> ExitCode {
    if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
