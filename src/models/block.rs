use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CmsError;
use crate::utils::slugify;

/// 文章正文中的一个内容块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// 块的稳定标识，创建后不再变化
    pub id: String,
    /// 块的类型及其字段
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// 内容块的具体类型，由 `type` 字段区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    Heading(HeadingBlock),
    Paragraph(TextBlock),
    Image(ImageBlock),
    List(ListBlock),
    Code(CodeBlock),
    Quote(TextBlock),
    Divider,
    Table(TableBlock),
    Faq(FaqBlock),
    MediaText(MediaTextBlock),
    /// 无法识别的类型，渲染为空节点
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingBlock {
    pub text: String,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl HeadingBlock {
    /// 标题层级限定在 h2 ~ h6
    pub fn clamped_level(&self) -> u8 {
        self.level.clamp(2, 6)
    }

    /// 标题的锚点：优先使用显式 anchor，否则由文本生成
    pub fn anchor_id(&self) -> Option<String> {
        match self.anchor.as_deref().map(str::trim) {
            Some(anchor) if !anchor.is_empty() => Some(anchor.to_string()),
            _ => {
                let slug = slugify(&self.text);
                if slug.is_empty() {
                    None
                } else {
                    Some(slug)
                }
            }
        }
    }
}

/// 段落和引用共用的纯文本块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLoading {
    Lazy,
    Eager,
}

impl ImageLoading {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageLoading::Lazy => "lazy",
            ImageLoading::Eager => "eager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<ImageLoading>,
    /// 图片来源（署名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    pub style: ListStyle,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqBlock {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl VerticalAlign {
    /// 对应的 flex 对齐方式
    pub fn flex_value(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "flex-start",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "flex-end",
        }
    }
}

fn default_media_width() -> u32 {
    50
}

fn default_border_radius() -> u32 {
    8
}

fn default_padding() -> u32 {
    16
}

/// 图文混排块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTextBlock {
    pub image_url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    #[serde(default)]
    pub media_position: MediaPosition,
    /// 图片所占宽度（百分比）
    #[serde(default = "default_media_width")]
    pub media_width: u32,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default = "default_border_radius")]
    pub border_radius: u32,
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MediaTextBlock {
    /// 图片宽度，限制在 0..=100
    pub fn media_width(&self) -> u32 {
        self.media_width.min(100)
    }

    /// 文字宽度 = 100 - 图片宽度
    pub fn text_width(&self) -> u32 {
        100 - self.media_width()
    }
}

/// 解析一份内容块文档（JSON 数组）
///
/// `null` 视为空文档；单个块格式错误时降级为 `Unknown`，不影响其它块。
pub fn parse_blocks(json: &str) -> Result<Vec<ContentBlock>, CmsError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(lenient_blocks(items)),
        other => Err(CmsError::InvalidDocument {
            message: format!("内容块文档必须是数组，实际为: {}", json_kind(&other)),
        }),
    }
}

/// 供 serde 使用的宽松反序列化
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(items.map(lenient_blocks).unwrap_or_default())
}

fn lenient_blocks(items: Vec<Value>) -> Vec<ContentBlock> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let id = item
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("block-{}", index));
            let block_type = item
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("<missing>")
                .to_string();

            match serde_json::from_value::<ContentBlock>(item) {
                Ok(block) => {
                    if block.kind == BlockKind::Unknown {
                        debug!("未知的内容块类型: {} (id={})", block_type, block.id);
                    }
                    block
                }
                Err(e) => {
                    warn!("内容块 {} ({}) 格式错误，按未知类型处理: {}", id, block_type, e);
                    ContentBlock {
                        id,
                        kind: BlockKind::Unknown,
                    }
                }
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_known_blocks() {
        let json = r#"[
            {"id": "a", "type": "heading", "text": "Giới thiệu", "level": 2},
            {"id": "b", "type": "divider"},
            {"id": "c", "type": "media-text", "imageUrl": "/a.png", "text": "x", "mediaPosition": "right"}
        ]"#;
        let blocks = parse_blocks(json).unwrap();

        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0].kind, BlockKind::Heading(ref h) if h.level == 2));
        assert_eq!(blocks[1].kind, BlockKind::Divider);
        match &blocks[2].kind {
            BlockKind::MediaText(m) => {
                assert_eq!(m.media_position, MediaPosition::Right);
                assert_eq!(m.media_width, 50);
                assert_eq!(m.border_radius, 8);
                assert_eq!(m.padding, 16);
                assert_eq!(m.vertical_align, VerticalAlign::Center);
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_malformed_blocks_keep_their_slot() {
        let json = r#"[
            {"id": "a", "type": "carousel", "slides": []},
            {"id": "b", "type": "heading", "level": 2},
            {"id": "c", "type": "quote", "text": "ok"}
        ]"#;
        let blocks = parse_blocks(json).unwrap();

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Unknown);
        assert_eq!(blocks[1].id, "b");
        assert_eq!(blocks[1].kind, BlockKind::Unknown);
        assert!(matches!(blocks[2].kind, BlockKind::Quote(_)));
    }

    #[test]
    fn test_null_document_is_empty() {
        assert!(parse_blocks("null").unwrap().is_empty());
        assert!(parse_blocks("{}").is_err());
    }

    #[test]
    fn test_heading_anchor_prefers_explicit_value() {
        let heading = HeadingBlock {
            text: "Giá xi măng".to_string(),
            level: 9,
            anchor: None,
        };
        assert_eq!(heading.anchor_id().as_deref(), Some("gia-xi-mang"));
        assert_eq!(heading.clamped_level(), 6);

        let explicit = HeadingBlock {
            anchor: Some("bang-gia".to_string()),
            ..heading
        };
        assert_eq!(explicit.anchor_id().as_deref(), Some("bang-gia"));
    }

    #[test]
    fn test_media_width_is_clamped() {
        let json = r#"{"id": "m", "type": "media-text", "imageUrl": "/a.png", "text": "x", "mediaWidth": 140}"#;
        let block: ContentBlock = serde_json::from_str(json).unwrap();
        if let BlockKind::MediaText(m) = block.kind {
            assert_eq!(m.media_width(), 100);
            assert_eq!(m.text_width(), 0);
        } else {
            panic!("expected media-text");
        }
    }
}
