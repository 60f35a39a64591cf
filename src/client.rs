//! HTTP client for the generative AI service.
//!
//! Wraps the `generateContent` endpoint family: multimodal analysis,
//! free-text prompt generation, and text-to-image rendering. The credential
//! is an explicit constructor parameter; nothing in this module reads the
//! process environment except [`GenAiAuth::from_env`], which exists for the
//! CLI edge.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{PpsError, Result};
use crate::reference::EncodedImage;
use crate::types::{AnalysisResult, AspectRatio};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Text/multimodal analysis and prompt generation model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
/// Image generation model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const IMAGE_ANALYSIS_PROMPT: &str = "\
请仔细分析上传的产品图片和描述。如果有多张图片，请综合参考所有图片。提取以下信息并以JSON格式返回：
1. brandName: 品牌名称 (中英文)
2. productType: 产品类型
3. specs: 产品规格
4. sellingPoints: 核心卖点列表 (数组，精简至5-8个关键点)
5. colors: 主色调和辅助色 (数组，最多5个)。**重要：必须包含HEX颜色代码** (例如: \"海蓝色 #4A90E2\", \"白色 #FFFFFF\")。如果无法确定精确HEX，请根据图片估算。
6. designStyle: 设计风格 (简短描述)
7. targetAudience: 目标受众 (简短描述)";

const TEXT_ANALYSIS_PROMPT: &str = "\
请仔细分析这段产品描述。提取以下信息并以JSON格式返回：
1. brandName: 品牌名称 (中英文)
2. productType: 产品类型
3. specs: 产品规格
4. sellingPoints: 核心卖点列表 (数组，精简至5-8个)
5. colors: 颜色信息 (数组)。**重要：必须包含HEX颜色代码** (例如: \"Red #FF0000\")。
6. designStyle: 设计风格推断
7. targetAudience: 目标受众推断";

/// Fixed instruction prepended to every image render so the product in the
/// output matches the reference photos.
const IMAGE_FIDELITY_PREAMBLE: &str = "Generate a high quality e-commerce poster image based on this product and the following description. The product in the image must look exactly like the reference image provided. \n\nDescription: ";

#[derive(Debug, Clone)]
pub enum GenAiAuth {
    ApiKey(String),
}

impl GenAiAuth {
    /// Reads `PPS_API_KEY` from the environment. Intended for the CLI edge;
    /// library callers pass the credential explicitly.
    pub fn from_env() -> Option<Self> {
        match std::env::var("PPS_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(Self::ApiKey(key)),
            _ => None,
        }
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            GenAiAuth::ApiKey(key) => builder.header("x-goog-api-key", key),
        }
    }
}

/// Model names used for the three call categories.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub text_model: String,
    pub image_model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenAiClient {
    http: Client,
    auth: GenAiAuth,
    base_url: Url,
    models: ModelSelection,
}

impl GenAiClient {
    pub fn new(auth: GenAiAuth) -> Result<Self> {
        Self::with_base_url_and_timeout(auth, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(auth: GenAiAuth, base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_base_url_and_timeout(auth, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url_and_timeout(
        auth: GenAiAuth,
        base_url: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PpsError::Network)?;

        Ok(Self {
            http,
            auth,
            base_url,
            models: ModelSelection::default(),
        })
    }

    pub fn with_models(mut self, models: ModelSelection) -> Self {
        self.models = models;
        self
    }

    /// Analyzes reference images plus a free-text description into an
    /// [`AnalysisResult`].
    pub async fn analyze_images(
        &self,
        images: &[EncodedImage],
        description: &str,
    ) -> Result<AnalysisResult> {
        let mut parts: Vec<Part> = images.iter().map(Part::inline_image).collect();
        parts.push(Part::text(format!(
            "{IMAGE_ANALYSIS_PROMPT}\n\n用户补充描述: {description}"
        )));

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                image_config: None,
            }),
        };
        let text = self.call_for_text(&self.models.text_model, &request).await?;
        decode_analysis(&text)
    }

    /// Analyzes a text-only product description.
    pub async fn analyze_text(&self, description: &str) -> Result<AnalysisResult> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(format!(
                    "{TEXT_ANALYSIS_PROMPT}\n\n产品描述: {description}"
                ))],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                image_config: None,
            }),
        };
        let text = self.call_for_text(&self.models.text_model, &request).await?;
        decode_analysis(&text)
    }

    /// Sends a rendered prompt template and returns the generated free-form
    /// text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt.to_string())],
            }],
            generation_config: None,
        };
        self.call_for_text(&self.models.text_model, &request).await
    }

    /// Renders one poster image from a text prompt plus reference images.
    /// Returns the base64 payload of the generated image.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference_images: &[EncodedImage],
        ratio: AspectRatio,
    ) -> Result<String> {
        let mut parts: Vec<Part> = reference_images.iter().map(Part::inline_image).collect();
        parts.push(Part::text(format!("{IMAGE_FIDELITY_PREAMBLE}{prompt}")));

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                image_config: Some(ImageConfig {
                    aspect_ratio: ratio.image_ratio().to_string(),
                }),
            }),
        };

        let response = self.call(&self.models.image_model, &request).await?;
        image_payload_from_response(&response)
    }

    async fn call_for_text(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String> {
        let response = self.call(model, request).await?;
        text_from_response(&response)
    }

    async fn call(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self
            .base_url
            .join(&format!("/v1beta/models/{model}:generateContent"))?;
        let builder = self.auth.apply(self.http.post(url)).json(request);

        let response = builder.send().await.map_err(PpsError::Network)?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(PpsError::api(Some(status), error_message(status, &body)));
        }

        if body.trim().is_empty() {
            return Err(PpsError::EmptyResponse);
        }

        serde_json::from_str(&body)
            .map_err(|e| PpsError::malformed(format!("invalid response envelope: {e}")))
    }
}

/// Best-effort cleanup before decoding an analysis payload: prefer the
/// outermost `{…}` span, else strip surrounding code fences.
pub fn clean_json_span(text: &str) -> &str {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            return &text[start..=end];
        }
    }

    let mut clean = text.trim();
    for fence in ["```json", "```JSON", "```"] {
        if let Some(rest) = clean.strip_prefix(fence) {
            clean = rest;
            break;
        }
    }
    clean.strip_suffix("```").unwrap_or(clean).trim()
}

/// Joins the text parts of the first candidate. A response with no
/// candidates, no parts, or only blank text is a [`PpsError::EmptyResponse`].
fn text_from_response(response: &GenerateContentResponse) -> Result<String> {
    let text: String = response
        .parts()
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        return Err(PpsError::EmptyResponse);
    }
    Ok(text)
}

/// Pulls the first inline image payload out of the first candidate; absence
/// of any inline data is a [`PpsError::EmptyResponse`].
fn image_payload_from_response(response: &GenerateContentResponse) -> Result<String> {
    response
        .parts()
        .iter()
        .find_map(|part| part.inline_data.as_ref())
        .map(|inline| inline.data.clone())
        .ok_or(PpsError::EmptyResponse)
}

fn decode_analysis(text: &str) -> Result<AnalysisResult> {
    serde_json::from_str(clean_json_span(text))
        .map_err(|e| PpsError::malformed(format!("analysis JSON did not decode: {e}")))
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|err| err.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("generation API returned status {}", status.as_u16()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlinePayload>,
}

impl Part {
    fn text(value: String) -> Self {
        Self {
            text: Some(value),
            inline_data: None,
        }
    }

    fn inline_image(image: &EncodedImage) -> Self {
        Self {
            text: None,
            inline_data: Some(InlinePayload {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlinePayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}
