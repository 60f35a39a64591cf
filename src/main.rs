mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_analyze, run_prompts, run_render, run_styles};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();

    match args.command {
        Commands::Styles { format, output } => run_styles(format, output),
        Commands::Analyze {
            image,
            desc,
            brand,
            api_key,
            format,
            output,
        } => {
            run_analyze(
                args.config,
                args.verbose,
                image,
                desc,
                brand,
                api_key,
                format,
                output,
            )
            .await
        }
        Commands::Prompts {
            analysis,
            style,
            typo,
            model_desc,
            scene_desc,
            data_viz,
            other,
            aspect_ratio,
            api_key,
            format,
            output,
        } => {
            run_prompts(
                args.config,
                args.verbose,
                analysis,
                style,
                typo,
                model_desc,
                scene_desc,
                data_viz,
                other,
                aspect_ratio,
                api_key,
                format,
                output,
            )
            .await
        }
        Commands::Render {
            prompts,
            id,
            image,
            aspect_ratio,
            out_dir,
            api_key,
            format,
            output,
        } => {
            run_render(
                args.config,
                args.verbose,
                prompts,
                id,
                image,
                aspect_ratio,
                out_dir,
                api_key,
                format,
                output,
            )
            .await
        }
    }
}
