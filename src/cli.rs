use clap::{Parser, Subcommand, ValueEnum};
use pps_lib::AspectRatio;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pps")]
#[command(
    version,
    about = "Poster Prompt Studio - Generate e-commerce KV poster prompts and images",
    long_about = "Poster Prompt Studio (PPS)\n\nModes:\n- styles: list the built-in visual and typography style catalogs.\n- analyze: extract product traits from reference photos and/or a text description.\n- prompts: fill the poster prompt template from an analysis and generate the bilingual prompt set.\n- render: generate poster images from the English prompts in a prompt set.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for the API endpoint/models/timeout and style defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in visual and typography style catalogs
    Styles {
        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Analyze product reference photos and/or a text description
    Analyze {
        #[arg(
            long,
            value_name = "PATH",
            help = "Reference image (png/jpg/jpeg/webp); repeat for multiple images"
        )]
        image: Vec<PathBuf>,

        #[arg(long, value_name = "TEXT", help = "Product description text")]
        desc: Option<String>,

        #[arg(
            long,
            value_name = "NAME",
            help = "Brand name override; always wins over the inferred brand"
        )]
        brand: Option<String>,

        #[arg(long, value_name = "KEY", help = "API key (overrides PPS_API_KEY)")]
        api_key: Option<String>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Generate the bilingual poster prompt set from an analysis
    Prompts {
        #[arg(
            long,
            value_name = "PATH",
            help = "Analysis JSON produced by `pps analyze`"
        )]
        analysis: PathBuf,

        #[arg(long, value_name = "ID", help = "Visual style id (see `pps styles`)")]
        style: Option<String>,

        #[arg(long, value_name = "ID", help = "Typography style id (see `pps styles`)")]
        typo: Option<String>,

        #[arg(
            long,
            value_name = "TEXT",
            help = "Require a model/person in the posters, with this description"
        )]
        model_desc: Option<String>,

        #[arg(
            long,
            value_name = "TEXT",
            help = "Require a usage scene in the posters, with this description"
        )]
        scene_desc: Option<String>,

        #[arg(long, help = "Require an ingredient/data visualization poster")]
        data_viz: bool,

        #[arg(long, value_name = "TEXT", help = "Other freeform requirements")]
        other: Option<String>,

        #[arg(long, value_name = "RATIO", help = "Poster aspect ratio (e.g. 3:4, 16:9)")]
        aspect_ratio: Option<AspectRatio>,

        #[arg(long, value_name = "KEY", help = "API key (overrides PPS_API_KEY)")]
        api_key: Option<String>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Render poster images from a generated prompt set
    Render {
        #[arg(
            long,
            value_name = "PATH",
            help = "Prompt set JSON produced by `pps prompts`"
        )]
        prompts: PathBuf,

        #[arg(
            long,
            value_name = "ID",
            help = "Render only these record ids; repeat for multiple (all renderable records if omitted)"
        )]
        id: Vec<usize>,

        #[arg(
            long,
            value_name = "PATH",
            help = "Reference image to condition the render on; repeat for multiple images"
        )]
        image: Vec<PathBuf>,

        #[arg(long, value_name = "RATIO", help = "Poster aspect ratio (e.g. 3:4, 16:9)")]
        aspect_ratio: Option<AspectRatio>,

        #[arg(
            long,
            value_name = "DIR",
            default_value = "posters",
            help = "Directory for rendered images; created if missing"
        )]
        out_dir: PathBuf,

        #[arg(long, value_name = "KEY", help = "API key (overrides PPS_API_KEY)")]
        api_key: Option<String>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
