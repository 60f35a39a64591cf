use std::path::PathBuf;
use std::process::ExitCode;

use pps_lib::output::{StylesOutput, PPS_OUTPUT_VERSION};
use pps_lib::{typo_styles, visual_styles, PpsError, PpsOutput};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};

/// Run the styles command: list the built-in catalogs.
pub fn run_styles(format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let body = PpsOutput::Styles(StylesOutput {
        version: PPS_OUTPUT_VERSION.to_string(),
        visual_styles: visual_styles().to_vec(),
        typo_styles: typo_styles().to_vec(),
    });

    if let Err(err) = write_output(&body, format, output) {
        return render_error(PpsError::Config(err.to_string()), format, None);
    }
    ExitCode::SUCCESS
}
