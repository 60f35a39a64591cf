//! Template renderer: fills the fixed KV-system prompt template with the
//! analysis report, the selected styles, and the extra requirements.

use crate::types::{AnalysisResult, GenerationOptions, TypoStyle, VisualStyle};

/// The fixed outbound generation template. Placeholders are distinct
/// `{{NAME}}` markers, each occurring exactly once.
pub const POSTER_PROMPT_TEMPLATE: &str = r#"
# 任务说明
我需要为我的产品生成一套完整的电商KV视觉系统提示词（10张海报，{{ASPECT_RATIO}}格式）。

请严格按照以下要求生成：

## 1. 核心输入信息
【识别报告】
{{ANALYSIS_REPORT}}

## 2. 风格选择
视觉风格：{{VISUAL_STYLE}}
文字排版效果：{{TYPO_STYLE}}

## 3. 特殊需求
{{EXTRA_REQUIREMENTS}}

## 4. 生成核心要求（重中之重）
1. **产品图还原要求**：必须在提示词中明确说明："严格还原上传的产品图，包括包装设计、颜色、LOGO位置、文字内容、图案元素等所有细节"。
2. **文案排版要求**：每张海报的所有文字内容都必须采用中英文双语排版。
3. **海报结构**：
   - 海报01: 主KV视觉 (Hero Shot)
   - 海报02: 生活场景 (Lifestyle)
   - 海报03: 工艺/卖点可视化 (Concept)
   - 海报04-07: 细节特写 (Details)
   - 海报08: 品牌故事 (Brand Story)
   - 海报09: 规格表 (Specs)
   - 海报10: 使用指南 (Guide)

## 5. 输出格式
请严格按照以下Markdown结构输出，不要输出任何多余的开场白：

### 海报XX | [标题]
**提示词 (中文)**: [详细描述]
**Product Display**: [严格还原描述]
**Layout**: [排版布局描述]
**Negative**: [负面词]
**Prompt (English)**: [英文翻译]
"#;

/// Sentinel used for the "other requirements" line when the caller left it
/// empty; the rendered block never contains a bare empty value.
pub const EMPTY_REQUIREMENT_SENTINEL: &str = "无";

/// Renders the outbound generation request for one prompt-set call.
pub fn render_prompt(
    analysis: &AnalysisResult,
    style: &VisualStyle,
    typo: &TypoStyle,
    options: &GenerationOptions,
) -> String {
    apply_placeholders(
        POSTER_PROMPT_TEMPLATE,
        &[
            ("{{ANALYSIS_REPORT}}", &format_analysis_report(analysis)),
            ("{{VISUAL_STYLE}}", &format_style(&style.name, &style.description)),
            ("{{TYPO_STYLE}}", &format_style(&typo.name, &typo.description)),
            ("{{EXTRA_REQUIREMENTS}}", &format_extra_requirements(options)),
            ("{{ASPECT_RATIO}}", options.aspect_ratio.as_str()),
        ],
    )
}

/// Substitutes each placeholder at most once. Placeholders present in the
/// template but absent from `values` are left untouched; callers are
/// responsible for supplying every placeholder they expect to be filled.
pub fn apply_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (marker, value) in values {
        rendered = rendered.replacen(marker, value, 1);
    }
    rendered
}

/// One labeled line per analysis field; list fields joined with ", ".
fn format_analysis_report(analysis: &AnalysisResult) -> String {
    format!(
        "品牌名称: {}\n产品类型: {}\n产品规格: {}\n核心卖点: {}\n配色方案: {}\n设计风格: {}\n目标受众: {}",
        analysis.brand_name,
        analysis.product_type,
        analysis.specs,
        analysis.selling_points.join(", "),
        analysis.colors.join(", "),
        analysis.design_style,
        analysis.target_audience,
    )
}

fn format_style(name: &str, description: &str) -> String {
    format!("{name} ({description})")
}

/// Each optional requirement rendered as present/absent with its free text;
/// the "other" line falls back to [`EMPTY_REQUIREMENT_SENTINEL`].
fn format_extra_requirements(options: &GenerationOptions) -> String {
    let model = if options.model_needed {
        format!("是 - {}", options.model_desc)
    } else {
        "否".to_string()
    };
    let scene = if options.scene_needed {
        format!("是 - {}", options.scene_desc)
    } else {
        "否".to_string()
    };
    let data_viz = if options.data_viz_needed { "是" } else { "否" };
    let other = if options.other_reqs.is_empty() {
        EMPTY_REQUIREMENT_SENTINEL
    } else {
        options.other_reqs.as_str()
    };

    format!("模特需求: {model}\n场景需求: {scene}\n数据可视化: {data_viz}\n其他要求: {other}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{find_typo_style, find_visual_style};
    use crate::types::AspectRatio;

    fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            brand_name: "山雾 / MistPeak".to_string(),
            product_type: "挂耳咖啡".to_string(),
            specs: "10g x 12包".to_string(),
            selling_points: vec!["云南高山豆".to_string(), "中度烘焙".to_string()],
            colors: vec!["黛蓝 #2C3E50".to_string(), "米白 #F5F1E8".to_string()],
            design_style: "清冷山野感".to_string(),
            target_audience: "都市白领".to_string(),
        }
    }

    fn populated_options() -> GenerationOptions {
        GenerationOptions {
            model_needed: true,
            model_desc: "年轻女性，自然妆感".to_string(),
            scene_needed: true,
            scene_desc: "清晨窗边".to_string(),
            data_viz_needed: true,
            other_reqs: "保留品牌印章".to_string(),
            aspect_ratio: AspectRatio::Portrait,
        }
    }

    #[test]
    fn fully_populated_render_leaves_no_placeholders() {
        let rendered = render_prompt(
            &sample_analysis(),
            find_visual_style("magazine").unwrap(),
            find_typo_style("serif_magazine").unwrap(),
            &populated_options(),
        );
        assert!(!rendered.contains("{{"), "unreplaced markers in: {rendered}");
        assert!(!rendered.contains("}}"));
    }

    #[test]
    fn render_embeds_analysis_and_styles() {
        let rendered = render_prompt(
            &sample_analysis(),
            find_visual_style("tech").unwrap(),
            find_typo_style("neon").unwrap(),
            &populated_options(),
        );
        assert!(rendered.contains("品牌名称: 山雾 / MistPeak"));
        assert!(rendered.contains("核心卖点: 云南高山豆, 中度烘焙"));
        assert!(rendered.contains("科技未来风格 (冷色调、几何图形、数据可视化、蓝光效果)"));
        assert!(rendered.contains("赛博风 (无衬线粗体 + 霓虹描边 + 发光效果)"));
        assert!(rendered.contains("模特需求: 是 - 年轻女性，自然妆感"));
        assert!(rendered.contains("3:4格式"));
    }

    #[test]
    fn empty_other_reqs_renders_sentinel() {
        let options = GenerationOptions::default();
        let rendered = render_prompt(
            &sample_analysis(),
            find_visual_style("retro").unwrap(),
            find_typo_style("handwritten").unwrap(),
            &options,
        );
        assert!(rendered.contains("其他要求: 无"));
        assert!(!rendered.contains("其他要求: \n"));
    }

    #[test]
    fn disabled_toggles_render_as_absent() {
        let rendered = format_extra_requirements(&GenerationOptions::default());
        assert!(rendered.contains("模特需求: 否"));
        assert!(rendered.contains("场景需求: 否"));
        assert!(rendered.contains("数据可视化: 否"));
    }

    #[test]
    fn unknown_placeholder_is_left_untouched() {
        let out = apply_placeholders("a {{KNOWN}} b {{FUTURE}}", &[("{{KNOWN}}", "x")]);
        assert_eq!(out, "a x b {{FUTURE}}");
    }

    #[test]
    fn placeholder_replaced_exactly_once() {
        let out = apply_placeholders("{{X}} and {{X}}", &[("{{X}}", "v")]);
        assert_eq!(out, "v and {{X}}");
    }
}
