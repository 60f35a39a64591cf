//! Fixed reference catalogs for visual styles and typography presets.
//!
//! Selection is exactly one of N for each axis; entries are never derived at
//! runtime.

use std::sync::LazyLock;

use crate::types::{TypoStyle, VisualStyle};

static VISUAL_STYLES: LazyLock<Vec<VisualStyle>> = LazyLock::new(|| {
    [
        ("magazine", "杂志编辑风格", "高级、专业、大片感、粗衬线标题、极简留白", "📰"),
        ("watercolor", "水彩艺术风格", "温暖、柔和、晕染效果、手绘质感", "🎨"),
        ("tech", "科技未来风格", "冷色调、几何图形、数据可视化、蓝光效果", "🔮"),
        ("retro", "复古胶片风格", "颗粒质感、暖色调、怀旧氛围、宝丽来边框", "🎞️"),
        ("minimalist", "极简北欧风格", "性冷淡、大留白、几何线条、黑白灰", "❄️"),
        ("cyberpunk", "霓虹赛博风格", "荧光色、描边发光、未来都市、暗色背景", "🌃"),
        ("organic", "自然有机风格", "植物元素、大地色系、手工质感、环保理念", "🌿"),
    ]
    .into_iter()
    .map(|(id, name, description, icon)| VisualStyle {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    })
    .collect()
});

static TYPO_STYLES: LazyLock<Vec<TypoStyle>> = LazyLock::new(|| {
    [
        ("serif_magazine", "杂志风", "粗衬线大标题 + 细线装饰 + 网格对齐", "A"),
        ("glassmorphism", "现代风", "玻璃拟态卡片 + 半透明背景 + 柔和圆角", "B"),
        ("3d_luxury", "奢华风", "3D浮雕文字 + 金属质感 + 光影效果", "C"),
        ("handwritten", "艺术风", "手写体标注 + 水彩笔触 + 不规则布局", "D"),
        ("neon", "赛博风", "无衬线粗体 + 霓虹描边 + 发光效果", "E"),
        ("minimal_line", "极简风", "极细线条字 + 大量留白 + 精确对齐", "F"),
    ]
    .into_iter()
    .map(|(id, name, description, icon)| TypoStyle {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    })
    .collect()
});

/// All visual style entries, in display order.
pub fn visual_styles() -> &'static [VisualStyle] {
    &VISUAL_STYLES
}

/// All typography preset entries, in display order.
pub fn typo_styles() -> &'static [TypoStyle] {
    &TYPO_STYLES
}

/// Looks up a visual style by its stable id.
pub fn find_visual_style(id: &str) -> Option<&'static VisualStyle> {
    VISUAL_STYLES.iter().find(|s| s.id == id)
}

/// Looks up a typography preset by its stable id.
pub fn find_typo_style(id: &str) -> Option<&'static TypoStyle> {
    TYPO_STYLES.iter().find(|s| s.id == id)
}
