//! Core types for the poster prompt pipeline.
//!
//! - [`AnalysisResult`] - structured brand/product attributes from the analysis call
//! - [`VisualStyle`] / [`TypoStyle`] - fixed catalog entries (see [`crate::catalog`])
//! - [`GenerationOptions`] - user-configured toggles for the prompt template
//! - [`AspectRatio`] - the fixed ratio enumeration, with the image-endpoint remap
//! - [`ParsedPrompt`] - one record per detected poster section

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Brand/product attributes produced by the analysis call.
///
/// Every field defaults to empty so a response missing a field still
/// deserializes; the client assumes schema conformance but must not fail on
/// absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub specs: String,
    #[serde(default)]
    pub selling_points: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub design_style: String,
    #[serde(default)]
    pub target_audience: String,
}

impl AnalysisResult {
    /// Splits a "main / sub" brand name on a slash or newline.
    ///
    /// Returns `(main, None)` when there is no separator.
    pub fn brand_name_parts(&self) -> (&str, Option<&str>) {
        let mut parts = self
            .brand_name
            .splitn(2, |c| c == '/' || c == '\n')
            .map(str::trim);
        let main = parts.next().unwrap_or("");
        (main, parts.next().filter(|s| !s.is_empty()))
    }

    /// Extracts `#RRGGBB` / `#RGB` tokens embedded in the color entries,
    /// in order of appearance.
    pub fn primary_hex_colors(&self) -> Vec<String> {
        self.colors
            .iter()
            .filter_map(|entry| extract_hex_token(entry))
            .collect()
    }
}

fn extract_hex_token(entry: &str) -> Option<String> {
    let bytes = entry.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'#' {
            continue;
        }
        let digits: usize = bytes[i + 1..]
            .iter()
            .take(6)
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if digits == 6 || digits == 3 {
            return Some(entry[i..i + 1 + digits].to_uppercase());
        }
    }
    None
}

/// A visual style catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualStyle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
}

/// A typography preset catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypoStyle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
}

/// User-configured generation toggles merged into the prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(default)]
    pub model_needed: bool,
    #[serde(default)]
    pub model_desc: String,
    #[serde(default)]
    pub scene_needed: bool,
    #[serde(default)]
    pub scene_desc: String,
    #[serde(default)]
    pub data_viz_needed: bool,
    #[serde(default)]
    pub other_reqs: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model_needed: false,
            model_desc: String::new(),
            scene_needed: false,
            scene_desc: String::new(),
            data_viz_needed: false,
            other_reqs: String::new(),
            aspect_ratio: AspectRatio::default(),
        }
    }
}

/// Poster aspect ratio selection.
///
/// The image endpoint supports a narrower set; [`AspectRatio::image_ratio`]
/// remaps `2:3` and `3:2` to the closest supported token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "2:3")]
    PortraitPhoto,
    #[serde(rename = "3:2")]
    LandscapePhoto,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 7] = [
        AspectRatio::Square,
        AspectRatio::Wide,
        AspectRatio::Tall,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::PortraitPhoto,
        AspectRatio::LandscapePhoto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::PortraitPhoto => "2:3",
            AspectRatio::LandscapePhoto => "3:2",
        }
    }

    /// The token sent to the image endpoint, which only accepts
    /// `{1:1, 3:4, 4:3, 9:16, 16:9}`.
    pub fn image_ratio(&self) -> &'static str {
        match self {
            AspectRatio::PortraitPhoto => "3:4",
            AspectRatio::LandscapePhoto => "4:3",
            other => other.as_str(),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Portrait
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .iter()
            .find(|r| r.as_str() == s.trim())
            .copied()
            .ok_or_else(|| format!("Invalid aspect ratio '{s}'; expected one of 1:1, 16:9, 9:16, 3:4, 4:3, 2:3, 3:2"))
    }
}

/// One record per detected poster section of the generated text.
///
/// `id` is the section's zero-based position in the original, pre-filter
/// heading split; filtering can leave gaps. Only `generated_image` and
/// `is_generating` are mutated after creation, independently per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPrompt {
    pub id: usize,
    pub title: String,
    pub full_content: String,
    pub chinese_prompt: String,
    pub english_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<String>,
    #[serde(default)]
    pub is_generating: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_result_tolerates_missing_fields() {
        let parsed: AnalysisResult =
            serde_json::from_str(r#"{"brandName":"Acme","productType":"咖啡豆"}"#).unwrap();
        assert_eq!(parsed.brand_name, "Acme");
        assert_eq!(parsed.product_type, "咖啡豆");
        assert!(parsed.specs.is_empty());
        assert!(parsed.selling_points.is_empty());
        assert!(parsed.colors.is_empty());
    }

    #[test]
    fn brand_name_splits_on_slash() {
        let analysis = AnalysisResult {
            brand_name: "山雾 / MistPeak".to_string(),
            ..Default::default()
        };
        let (main, sub) = analysis.brand_name_parts();
        assert_eq!(main, "山雾");
        assert_eq!(sub, Some("MistPeak"));
    }

    #[test]
    fn brand_name_splits_on_newline() {
        let analysis = AnalysisResult {
            brand_name: "山雾\nMistPeak".to_string(),
            ..Default::default()
        };
        let (main, sub) = analysis.brand_name_parts();
        assert_eq!(main, "山雾");
        assert_eq!(sub, Some("MistPeak"));
    }

    #[test]
    fn brand_name_without_separator_has_no_sub() {
        let analysis = AnalysisResult {
            brand_name: "Acme".to_string(),
            ..Default::default()
        };
        assert_eq!(analysis.brand_name_parts(), ("Acme", None));
    }

    #[test]
    fn hex_colors_extracted_from_entries() {
        let analysis = AnalysisResult {
            colors: vec![
                "海蓝色 #4a90e2".to_string(),
                "白色 #FFF".to_string(),
                "无色码".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(analysis.primary_hex_colors(), vec!["#4A90E2", "#FFF"]);
    }

    #[test]
    fn aspect_ratio_round_trips_through_serde() {
        let json = serde_json::to_string(&AspectRatio::Wide).unwrap();
        assert_eq!(json, "\"16:9\"");
        let parsed: AspectRatio = serde_json::from_str("\"2:3\"").unwrap();
        assert_eq!(parsed, AspectRatio::PortraitPhoto);
    }

    #[test]
    fn aspect_ratio_remaps_for_image_endpoint() {
        assert_eq!(AspectRatio::PortraitPhoto.image_ratio(), "3:4");
        assert_eq!(AspectRatio::LandscapePhoto.image_ratio(), "4:3");
        assert_eq!(AspectRatio::Wide.image_ratio(), "16:9");
        assert_eq!(AspectRatio::Square.image_ratio(), "1:1");
    }

    #[test]
    fn aspect_ratio_parses_from_token() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Tall);
        assert!("4:5".parse::<AspectRatio>().is_err());
    }
}
