use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ErrorPayload;
use crate::types::{AnalysisResult, AspectRatio, ParsedPrompt, TypoStyle, VisualStyle};

/// Schema version for output payloads.
pub const PPS_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PpsOutput {
    Styles(StylesOutput),
    Analyze(AnalyzeOutput),
    Prompts(PromptsOutput),
    Render(RenderOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesOutput {
    pub version: String,
    pub visual_styles: Vec<VisualStyle>,
    pub typo_styles: Vec<TypoStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsOutput {
    pub version: String,
    pub visual_style: String,
    pub typo_style: String,
    pub prompts: Vec<ParsedPrompt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub version: String,
    pub aspect_ratio: AspectRatio,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posters: Vec<RenderedPoster>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPoster {
    pub id: usize,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub error: ErrorPayload,
}

impl ErrorOutput {
    pub fn new(error: ErrorPayload) -> Self {
        Self {
            version: PPS_OUTPUT_VERSION.to_string(),
            error,
        }
    }
}
