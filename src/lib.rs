//! Poster Prompt Studio (PPS) Library
//!
//! A library for turning product photos and descriptions into e-commerce
//! key-visual poster prompts. It analyzes the product through a generative
//! AI backend, fills a fixed bilingual prompt template with the analysis and
//! the chosen visual/typography styles, splits the generated markdown into
//! per-poster prompt records, and renders poster images from the English
//! prompts.
//!
//! # Module Overview
//!
//! - [`catalog`] - Built-in visual and typography style catalogs
//! - [`template`] - Prompt template rendering from analysis + styles
//! - [`parser`] - Splitting generated markdown into prompt records
//! - [`client`] - Generative AI HTTP client (analysis, text, image)
//! - [`studio`] - Orchestration of analysis, prompt sets, and renders
//! - [`reference`] - Reference image loading and base64 encoding
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types and structures
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use pps_lib::{load_reference_image, GenAiAuth, GenAiClient, PosterStudio, PpsError};
//!
//! # async fn example() -> pps_lib::Result<()> {
//! let auth = GenAiAuth::from_env().ok_or(PpsError::MissingApiKey)?;
//! let client = GenAiClient::new(auth)?;
//! let mut studio = PosterStudio::new(client);
//! studio.set_reference_images(vec![load_reference_image("product.jpg")?]);
//!
//! studio.analyze("高山挂耳咖啡，深度烘焙", "").await?;
//! studio.select_visual_style("magazine")?;
//! studio.select_typo_style("serif_magazine")?;
//!
//! let prompts = studio.generate_prompt_set().await?;
//! for prompt in &prompts {
//!     let rendered = studio.render_poster(prompt.id).await?;
//!     // ... persist rendered.generated_image
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod reference;
pub mod studio;
pub mod template;
pub mod types;

pub use catalog::{find_typo_style, find_visual_style, typo_styles, visual_styles};
pub use client::{
    clean_json_span, GenAiAuth, GenAiClient, ModelSelection, DEFAULT_BASE_URL,
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT,
};
pub use config::Config;
pub use error::{ErrorCategory, ErrorPayload, PpsError, Result};
pub use output::{
    AnalyzeOutput, ErrorOutput, PpsOutput, PromptsOutput, RenderOutput, RenderedPoster,
    StylesOutput, PPS_OUTPUT_VERSION,
};
pub use parser::{parse, parse_or_fallback, CHINESE_PROMPT_LABEL, ENGLISH_PROMPT_LABEL};
pub use reference::{load_reference_image, EncodedImage, ReferenceImageError};
pub use studio::{GenerationBackend, PosterStudio};
pub use template::{render_prompt, EMPTY_REQUIREMENT_SENTINEL, POSTER_PROMPT_TEMPLATE};
pub use types::{
    AnalysisResult, AspectRatio, GenerationOptions, ParsedPrompt, TypoStyle, VisualStyle,
};
