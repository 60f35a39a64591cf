//! Splits generated poster text into per-poster prompt records.
//!
//! The generated text follows the markdown conventions of the prompt
//! template: one `### ` heading per poster section, with bolded labels for
//! the Chinese and English prompt variants. Parsing is an explicit line
//! scanner; malformed input never raises. When nothing parses, the whole
//! text is preserved as a single fallback record so the raw content is never
//! lost.

use crate::types::ParsedPrompt;

pub const CHINESE_PROMPT_LABEL: &str = "提示词 (中文)";
pub const ENGLISH_PROMPT_LABEL: &str = "Prompt (English)";

/// Title keywords that mark a section as a poster or logo deliverable.
/// Sections for any other purpose are filtered out.
const SECTION_KEYWORDS: [&str; 2] = ["海报", "LOGO"];

/// Fallback title used when the raw text contains no recognizable sections.
const FALLBACK_TITLE: &str = "完整生成内容";

struct RawSection {
    /// Zero-based position in the pre-filter split.
    index: usize,
    title: String,
    content: String,
}

/// Parses generated text into poster prompt records.
///
/// Record ids are the section's position in the original heading split, so
/// filtering non-poster sections can leave gaps in the id sequence; the
/// correspondence to source order stays stable.
pub fn parse(raw: &str) -> Vec<ParsedPrompt> {
    split_sections(raw)
        .into_iter()
        .filter(|section| title_is_poster(&section.title))
        .map(|section| {
            let chinese_prompt = extract_labeled(&section.content, CHINESE_PROMPT_LABEL);
            let english_prompt = extract_labeled(&section.content, ENGLISH_PROMPT_LABEL);
            ParsedPrompt {
                id: section.index,
                title: section.title,
                full_content: section.content,
                chinese_prompt,
                english_prompt,
                generated_image: None,
                is_generating: false,
            }
        })
        .collect()
}

/// Like [`parse`], but guarantees at least one record: when no section
/// survives, the entire raw text is wrapped as a single synthetic record
/// with id 0 and the full text as its Chinese prompt.
pub fn parse_or_fallback(raw: &str) -> Vec<ParsedPrompt> {
    let parsed = parse(raw);
    if !parsed.is_empty() {
        return parsed;
    }
    vec![ParsedPrompt {
        id: 0,
        title: FALLBACK_TITLE.to_string(),
        full_content: raw.to_string(),
        chinese_prompt: raw.to_string(),
        english_prompt: String::new(),
        generated_image: None,
        is_generating: false,
    }]
}

/// Scans lines, opening a new section on each level-3 heading and
/// accumulating everything up to the next one. Text before the first
/// heading is discarded.
fn split_sections(raw: &str) -> Vec<RawSection> {
    let mut sections: Vec<RawSection> = Vec::new();
    let mut current: Option<RawSection> = None;

    for line in raw.lines() {
        if let Some(title) = heading_title(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(RawSection {
                index: sections.len(),
                title: title.trim().to_string(),
                content: format!("{line}\n"),
            });
        } else if let Some(section) = current.as_mut() {
            section.content.push_str(line);
            section.content.push('\n');
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }
    sections
}

/// Returns the heading remainder for a line of the form `### <title>`.
/// Deeper headings (`####`) do not match.
fn heading_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("###")?;
    let first = rest.chars().next()?;
    first.is_whitespace().then_some(rest)
}

fn title_is_poster(title: &str) -> bool {
    let upper = title.to_uppercase();
    SECTION_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Extracts the text following `**<label>**` (plus an optional colon) up to
/// the next bold label-start or the end of the section. Absence of the
/// label yields an empty string.
fn extract_labeled(content: &str, label: &str) -> String {
    let marker = format!("**{label}**");
    let Some(pos) = content.find(&marker) else {
        return String::new();
    };
    let rest = content[pos + marker.len()..].trim_start();
    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix('：'))
        .unwrap_or(rest);
    let end = rest.find("**").unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_SECTIONS: &str = "\
前言部分，应当被丢弃。

### 海报01 | 主KV视觉
**提示词 (中文)**: 黛蓝色背景，山雾缭绕
**Layout**: 居中构图
**Prompt (English)**: Misty mountains on a deep blue background

### 设计说明
这一节不是海报，也不是LOGO。

### 海报02 | 生活场景
**提示词 (中文)**: 清晨窗边的挂耳咖啡
**Prompt (English)**: Drip coffee by a morning window
";

    #[test]
    fn keyword_filter_keeps_two_of_three_sections() {
        let prompts = parse(THREE_SECTIONS);
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].title, "海报01 | 主KV视觉");
        assert_eq!(prompts[1].title, "海报02 | 生活场景");
    }

    #[test]
    fn ids_preserve_prefilter_positions() {
        let prompts = parse(THREE_SECTIONS);
        // The middle section is filtered, leaving a gap at id 1.
        assert_eq!(prompts[0].id, 0);
        assert_eq!(prompts[1].id, 2);
    }

    #[test]
    fn bilingual_prompts_are_extracted_and_trimmed() {
        let raw = "### 海报01 | 测试\n**提示词 (中文)**: 蓝色背景\n**Prompt (English)**: blue background\n";
        let prompts = parse(raw);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].chinese_prompt, "蓝色背景");
        assert_eq!(prompts[0].english_prompt, "blue background");
    }

    #[test]
    fn extraction_stops_at_next_label_start() {
        let prompts = parse(THREE_SECTIONS);
        assert_eq!(prompts[0].chinese_prompt, "黛蓝色背景，山雾缭绕");
        assert_eq!(
            prompts[0].english_prompt,
            "Misty mountains on a deep blue background"
        );
    }

    #[test]
    fn extraction_stops_at_bare_label_without_colon() {
        let raw = "### 海报03 | 特写\n**提示词 (中文)**: 细节描述\n**Negative**\n模糊，过曝\n";
        let prompts = parse(raw);
        assert_eq!(prompts[0].chinese_prompt, "细节描述");
    }

    #[test]
    fn fullwidth_colon_is_accepted_after_label() {
        let raw = "### 海报04 | 规格\n**提示词 (中文)**：规格表排版\n";
        let prompts = parse(raw);
        assert_eq!(prompts[0].chinese_prompt, "规格表排版");
    }

    #[test]
    fn missing_labels_yield_empty_prompts_not_errors() {
        let raw = "### LOGO设计方案\n只有说明文字，没有标签。\n";
        let prompts = parse(raw);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].chinese_prompt.is_empty());
        assert!(prompts[0].english_prompt.is_empty());
        assert!(prompts[0].full_content.contains("只有说明文字"));
    }

    #[test]
    fn logo_keyword_matches_case_insensitively() {
        let raw = "### logo 变体方案\n**提示词 (中文)**: 单色印章\n";
        let prompts = parse(raw);
        assert_eq!(prompts.len(), 1);
    }

    #[test]
    fn deeper_headings_do_not_open_sections() {
        let raw = "### 海报01 | 主视觉\n#### 子说明\n**提示词 (中文)**: 内容\n";
        let prompts = parse(raw);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].full_content.contains("#### 子说明"));
    }

    #[test]
    fn no_headings_falls_back_to_single_record() {
        let raw = "整段自由文本，没有任何标题标记。";
        let prompts = parse_or_fallback(raw);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].id, 0);
        assert_eq!(prompts[0].chinese_prompt, raw);
        assert!(prompts[0].english_prompt.is_empty());
        assert_eq!(prompts[0].full_content, raw);
    }

    #[test]
    fn fallback_reparse_terminates_with_at_least_one_record() {
        let first = parse_or_fallback("无结构文本");
        let again = parse_or_fallback(&first[0].full_content);
        assert!(!again.is_empty());
        assert_eq!(again[0].chinese_prompt, first[0].chinese_prompt);
    }

    #[test]
    fn empty_input_still_yields_one_fallback_record() {
        let prompts = parse_or_fallback("");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].chinese_prompt.is_empty());
    }

    #[test]
    fn unmatched_sections_without_prompts_are_dropped_silently() {
        let raw = "### 配色建议\n**提示词 (中文)**: 不该出现\n### 海报05 | 细节\n**提示词 (中文)**: 应该出现\n";
        let prompts = parse(raw);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].chinese_prompt, "应该出现");
        assert_eq!(prompts[0].id, 1);
    }
}
