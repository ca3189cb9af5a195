//! 内容块渲染
//!
//! 把一组内容块按顺序渲染成 HTML 节点树。渲染是纯函数：同样的输入得到同样的输出，
//! 第 i 个节点只由第 i 个块决定，任何块都不会导致渲染失败。

pub mod highlight;
pub mod node;

pub use node::{Element, RenderNode};

use tracing::{debug, warn};

use crate::models::block::{
    BlockKind, CodeBlock, ContentBlock, FaqBlock, HeadingBlock, ImageBlock, ListBlock,
    ListStyle, MediaPosition, MediaTextBlock, TableBlock,
};
use crate::models::RenderConfig;

/// 一组内容块的渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// 没有任何内容块，只有占位提示
    NoContent(RenderNode),
    /// 与输入一一对应的节点
    Blocks(Vec<RenderNode>),
}

impl Rendered {
    /// 与输入块一一对应的节点；占位提示不算在内
    pub fn nodes(&self) -> &[RenderNode] {
        match self {
            Rendered::NoContent(_) => &[],
            Rendered::Blocks(nodes) => nodes,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Rendered::NoContent(_))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match self {
            Rendered::NoContent(placeholder) => placeholder.write_html(&mut out),
            Rendered::Blocks(nodes) => {
                for node in nodes {
                    node.write_html(&mut out);
                }
            }
        }
        out
    }
}

/// 内容块渲染器
#[derive(Debug, Clone, Default)]
pub struct BlockRenderer {
    config: RenderConfig,
}

/// 使用默认配置渲染
pub fn render(blocks: &[ContentBlock]) -> Rendered {
    BlockRenderer::default().render(blocks)
}

impl BlockRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// 渲染一组内容块
    pub fn render(&self, blocks: &[ContentBlock]) -> Rendered {
        if blocks.is_empty() {
            debug!("没有内容块，输出占位提示");
            return Rendered::NoContent(
                Element::new("div")
                    .attr("class", "no-content")
                    .text(self.config.placeholder.as_str())
                    .into(),
            );
        }

        Rendered::Blocks(blocks.iter().map(|block| self.render_block(block)).collect())
    }

    /// 渲染单个内容块
    pub fn render_block(&self, block: &ContentBlock) -> RenderNode {
        let element = match &block.kind {
            BlockKind::Heading(heading) => self.heading(heading),
            BlockKind::Paragraph(paragraph) => Element::new("p").text(paragraph.text.as_str()),
            BlockKind::Image(image) => self.image(image),
            BlockKind::List(list) => self.list(list),
            BlockKind::Code(code) => self.code(code),
            BlockKind::Quote(quote) => Element::new("blockquote").text(quote.text.as_str()),
            BlockKind::Divider => Element::new("hr"),
            BlockKind::Table(table) => self.table(table, &block.id),
            BlockKind::Faq(faq) => self.faq(faq),
            BlockKind::MediaText(media) => self.media_text(media),
            BlockKind::Unknown => {
                debug!("跳过未知类型的内容块: {}", block.id);
                return RenderNode::Empty;
            }
        };

        element.attr("data-block-id", block.id.as_str()).into()
    }

    fn heading(&self, heading: &HeadingBlock) -> Element {
        let tag = match heading.clamped_level() {
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        };
        if heading.level != heading.clamped_level() {
            warn!("标题层级 {} 超出范围，按 {} 处理", heading.level, tag);
        }

        Element::new(tag)
            .attr_opt("id", heading.anchor_id().as_deref())
            .text(heading.text.as_str())
    }

    fn image(&self, image: &ImageBlock) -> Element {
        let img = Element::new("img")
            .attr("src", image.url.as_str())
            .attr("alt", image.alt.as_deref().unwrap_or_default())
            .attr_opt("title", image.title.as_deref())
            .attr_opt("width", image.width.map(|w| w.to_string()).as_deref())
            .attr_opt("height", image.height.map(|h| h.to_string()).as_deref())
            .attr_opt("srcset", image.srcset.as_deref())
            .attr_opt("sizes", image.sizes.as_deref())
            .attr_opt("loading", image.loading.map(|l| l.as_str()));

        let mut figure = Element::new("figure")
            .attr("class", "content-image")
            .child(wrap_link(img, image.link.as_deref()));

        let caption = self.caption(
            image.caption.as_deref(),
            image.source.as_deref(),
            image.source_url.as_deref(),
        );
        if let Some(caption) = caption {
            figure = figure.child(caption);
        }
        figure
    }

    /// 图片说明：说明文字在前，来源署名在后
    fn caption(
        &self,
        caption: Option<&str>,
        source: Option<&str>,
        source_url: Option<&str>,
    ) -> Option<Element> {
        let caption = caption.filter(|c| !c.trim().is_empty());
        let source = source.filter(|s| !s.trim().is_empty());
        if caption.is_none() && source.is_none() {
            return None;
        }

        let mut figcaption = Element::new("figcaption");
        if let Some(caption) = caption {
            figcaption =
                figcaption.child(Element::new("span").attr("class", "caption-text").text(caption));
        }
        if let Some(source) = source {
            let credit = format!("{}: {}", self.config.credit_label, source);
            let fragment = match source_url.filter(|u| !u.trim().is_empty()) {
                Some(url) => external_link(url).attr("class", "image-source").text(credit),
                None => Element::new("span").attr("class", "image-source").text(credit),
            };
            figcaption = figcaption.child(fragment);
        }
        Some(figcaption)
    }

    fn list(&self, list: &ListBlock) -> Element {
        let tag = match list.style {
            ListStyle::Ordered => "ol",
            ListStyle::Unordered => "ul",
        };
        Element::new(tag).children(
            list.items
                .iter()
                .map(|item| Element::new("li").text(item.as_str())),
        )
    }

    fn code(&self, code: &CodeBlock) -> Element {
        let language = code
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.config.default_language.as_str());

        Element::new("pre")
            .attr("class", "code-block")
            .attr("data-language", language)
            .child(
                Element::new("code")
                    .attr("class", format!("language-{}", language))
                    .child(RenderNode::Raw(highlight::highlight(&code.code, language))),
            )
    }

    fn table(&self, table: &TableBlock, block_id: &str) -> Element {
        let expected = table.headers.len();
        for (index, row) in table.rows.iter().enumerate() {
            if row.len() != expected {
                debug!(
                    "表格 {} 第 {} 行有 {} 个单元格，表头有 {} 列",
                    block_id,
                    index + 1,
                    row.len(),
                    expected
                );
            }
        }

        let head = Element::new("thead").child(
            Element::new("tr").children(
                table.headers
                    .iter()
                    .map(|header| Element::new("th").text(header.as_str())),
            ),
        );
        let body = Element::new("tbody").children(table.rows.iter().map(|row| {
            Element::new("tr")
                .children(row.iter().map(|cell| Element::new("td").text(cell.as_str())))
        }));

        Element::new("table")
            .attr("class", "content-table")
            .child(head)
            .child(body)
    }

    fn faq(&self, faq: &FaqBlock) -> Element {
        Element::new("div")
            .attr("class", "faq-item")
            .child(
                Element::new("p")
                    .attr("class", "faq-question")
                    .child(Element::new("strong").text(format!("Q: {}", faq.question))),
            )
            .child(
                Element::new("p")
                    .attr("class", "faq-answer")
                    .text(format!("A: {}", faq.answer)),
            )
    }

    fn media_text(&self, media: &MediaTextBlock) -> Element {
        let media_width = media.media_width();
        let text_width = media.text_width();

        let img = Element::new("img")
            .attr("src", media.image_url.as_str())
            .attr("alt", media.image_alt.as_deref().unwrap_or_default());
        let mut media_panel = Element::new("div")
            .attr("class", "media-text-media")
            .attr("style", format!("width:{}%", media_width))
            .child(wrap_link(img, media.image_link.as_deref()));
        if let Some(caption) = self.caption(media.image_caption.as_deref(), None, None) {
            media_panel = media_panel.child(caption);
        }

        let mut text_panel = Element::new("div")
            .attr("class", "media-text-body")
            .attr("style", format!("width:{}%", text_width));
        if let Some(title) = media.title.as_deref().filter(|t| !t.trim().is_empty()) {
            text_panel =
                text_panel.child(Element::new("h3").attr("class", "media-text-title").text(title));
        }
        text_panel = text_panel.children(
            media.text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Element::new("p").text(line)),
        );

        let mut style = format!("display:flex;align-items:{}", media.vertical_align.flex_value());
        if let Some(color) = media.background_color.as_deref().filter(|c| !c.trim().is_empty()) {
            style.push_str(&format!(";background-color:{}", color));
        }
        style.push_str(&format!(
            ";border-radius:{}px;padding:{}px",
            media.border_radius, media.padding
        ));

        let (position_class, panels) = match media.media_position {
            MediaPosition::Right => ("media-text media-right", [text_panel, media_panel]),
            MediaPosition::Left => ("media-text media-left", [media_panel, text_panel]),
        };

        Element::new("div")
            .attr("class", position_class)
            .attr("style", style)
            .children(panels)
    }
}

/// 在新窗口打开的外部链接，不带 referrer 和 opener
fn external_link(href: &str) -> Element {
    Element::new("a")
        .attr("href", href)
        .attr("target", "_blank")
        .attr("rel", "noopener noreferrer")
}

/// 有链接时用链接包住图片
fn wrap_link(img: Element, link: Option<&str>) -> Element {
    match link.filter(|l| !l.trim().is_empty()) {
        Some(href) => external_link(href).child(img),
        None => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::block::{ImageLoading, TextBlock, VerticalAlign};
    use pretty_assertions::assert_eq;

    fn block(id: &str, kind: BlockKind) -> ContentBlock {
        ContentBlock {
            id: id.to_string(),
            kind,
        }
    }

    fn media(position: MediaPosition, width: u32) -> MediaTextBlock {
        MediaTextBlock {
            image_url: "/img/xi-mang.jpg".to_string(),
            text: "Dòng một\n\nDòng hai\n".to_string(),
            image_alt: Some("Bao xi măng".to_string()),
            image_caption: None,
            image_link: None,
            media_position: position,
            media_width: width,
            vertical_align: VerticalAlign::Top,
            background_color: Some("#f5f5f5".to_string()),
            border_radius: 8,
            padding: 16,
            title: Some("Tiêu đề".to_string()),
        }
    }

    #[test]
    fn test_heading_uses_slug_anchor() {
        let node = render_one(BlockKind::Heading(HeadingBlock {
            text: "Giá xi măng".to_string(),
            level: 2,
            anchor: None,
        }));
        assert_eq!(
            node.to_html(),
            "<h2 id=\"gia-xi-mang\" data-block-id=\"b1\">Giá xi măng</h2>"
        );
    }

    #[test]
    fn test_paragraph_quote_divider() {
        let rendered = render(&[
            block("p", BlockKind::Paragraph(TextBlock { text: "a < b".to_string() })),
            block("q", BlockKind::Quote(TextBlock { text: "Trích dẫn".to_string() })),
            block("d", BlockKind::Divider),
        ]);
        assert_eq!(
            rendered.to_html(),
            "<p data-block-id=\"p\">a &lt; b</p>\
             <blockquote data-block-id=\"q\">Trích dẫn</blockquote>\
             <hr data-block-id=\"d\">"
        );
    }

    #[test]
    fn test_image_with_link_and_source() {
        let node = render_one(BlockKind::Image(ImageBlock {
            url: "/a.jpg".to_string(),
            alt: Some("Ảnh".to_string()),
            caption: Some("Công trình".to_string()),
            link: Some("https://example.com".to_string()),
            width: Some(800),
            loading: Some(ImageLoading::Lazy),
            source: Some("VnExpress".to_string()),
            source_url: Some("https://vnexpress.net".to_string()),
            ..Default::default()
        }));
        assert_eq!(
            node.to_html(),
            "<figure class=\"content-image\" data-block-id=\"b1\">\
             <a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">\
             <img src=\"/a.jpg\" alt=\"Ảnh\" width=\"800\" loading=\"lazy\"></a>\
             <figcaption><span class=\"caption-text\">Công trình</span>\
             <a href=\"https://vnexpress.net\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"image-source\">Nguồn: VnExpress</a>\
             </figcaption></figure>"
        );
    }

    #[test]
    fn test_image_renders_every_declared_attribute() {
        let node = render_one(BlockKind::Image(ImageBlock {
            url: "/cau.jpg".to_string(),
            alt: Some("Cầu Rồng".to_string()),
            title: Some("Cầu Rồng, Đà Nẵng".to_string()),
            width: Some(1200),
            height: Some(675),
            srcset: Some("/cau-600.jpg 600w, /cau-1200.jpg 1200w".to_string()),
            sizes: Some("(max-width: 600px) 100vw, 1200px".to_string()),
            loading: Some(ImageLoading::Eager),
            ..Default::default()
        }));
        assert_eq!(
            node.to_html(),
            "<figure class=\"content-image\" data-block-id=\"b1\">\
             <img src=\"/cau.jpg\" alt=\"Cầu Rồng\" title=\"Cầu Rồng, Đà Nẵng\" \
             width=\"1200\" height=\"675\" srcset=\"/cau-600.jpg 600w, /cau-1200.jpg 1200w\" \
             sizes=\"(max-width: 600px) 100vw, 1200px\" loading=\"eager\"></figure>"
        );
    }

    #[test]
    fn test_image_source_without_url_is_plain_text() {
        let node = render_one(BlockKind::Image(ImageBlock {
            url: "/a.jpg".to_string(),
            source: Some("Báo Xây dựng".to_string()),
            ..Default::default()
        }));
        let html = node.to_html();
        assert!(html.contains("<span class=\"image-source\">Nguồn: Báo Xây dựng</span>"));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_image_without_caption_has_no_figcaption() {
        let node = render_one(BlockKind::Image(ImageBlock {
            url: "/a.jpg".to_string(),
            caption: Some("  ".to_string()),
            ..Default::default()
        }));
        assert!(!node.to_html().contains("figcaption"));
    }

    #[test]
    fn test_list_style_selects_tag() {
        let ordered = render_one(BlockKind::List(ListBlock {
            style: ListStyle::Ordered,
            items: vec!["một".to_string(), "hai".to_string()],
        }));
        assert_eq!(
            ordered.to_html(),
            "<ol data-block-id=\"b1\"><li>một</li><li>hai</li></ol>"
        );

        let unordered = render_one(BlockKind::List(ListBlock {
            style: ListStyle::Unordered,
            items: vec![],
        }));
        assert_eq!(unordered.to_html(), "<ul data-block-id=\"b1\"></ul>");
    }

    #[test]
    fn test_code_defaults_to_text() {
        let node = render_one(BlockKind::Code(CodeBlock {
            code: "<div>".to_string(),
            language: None,
        }));
        let html = node.to_html();
        assert!(html.starts_with("<pre class=\"code-block\" data-language=\"text\""));
        assert!(html.contains("<code class=\"language-text\">"));
        assert!(html.contains("&lt;div&gt;"));
    }

    #[test]
    fn test_code_uses_highlight_class_prefix() {
        let node = render_one(BlockKind::Code(CodeBlock {
            code: "let x = 1;\n".to_string(),
            language: Some("rust".to_string()),
        }));
        let html = node.to_html();
        assert!(html.contains("<code class=\"language-rust\">"));
        assert!(html.contains(&format!("class=\"{}", highlight::CLASS_PREFIX)));
    }

    #[test]
    fn test_ragged_table_rows_render_given_cells() {
        let node = render_one(BlockKind::Table(TableBlock {
            headers: vec!["Loại".to_string(), "Giá".to_string()],
            rows: vec![
                vec!["PCB40".to_string()],
                vec!["PCB50".to_string(), "1.6tr".to_string(), "mới".to_string()],
            ],
        }));
        let table = node.as_element().unwrap();
        let body = table.children[1].as_element().unwrap();
        let cell_counts: Vec<usize> = body
            .children
            .iter()
            .map(|row| row.as_element().unwrap().children.len())
            .collect();
        assert_eq!(cell_counts, vec![1, 3]);
    }

    #[test]
    fn test_faq_block() {
        let node = render_one(BlockKind::Faq(FaqBlock {
            question: "Giá bao nhiêu?".to_string(),
            answer: "Khoảng 90.000đ".to_string(),
        }));
        assert_eq!(node.text_content(), "Q: Giá bao nhiêu?A: Khoảng 90.000đ");
    }

    #[test]
    fn test_media_text_widths_and_order() {
        let left = render_one(BlockKind::MediaText(media(MediaPosition::Left, 40)));
        let right = render_one(BlockKind::MediaText(media(MediaPosition::Right, 40)));

        let left = left.as_element().unwrap();
        let right = right.as_element().unwrap();
        let classes = |e: &Element| {
            e.children
                .iter()
                .map(|c| c.as_element().unwrap().get_attr("class").unwrap().to_string())
                .collect::<Vec<_>>()
        };
        let styles = |e: &Element, class: &str| {
            e.children
                .iter()
                .filter_map(RenderNode::as_element)
                .find(|c| c.get_attr("class") == Some(class))
                .and_then(|c| c.get_attr("style"))
                .map(str::to_string)
        };

        assert_eq!(classes(left), vec!["media-text-media", "media-text-body"]);
        assert_eq!(classes(right), vec!["media-text-body", "media-text-media"]);
        assert_eq!(styles(left, "media-text-media").as_deref(), Some("width:40%"));
        assert_eq!(styles(left, "media-text-body").as_deref(), Some("width:60%"));
        assert_eq!(styles(left, "media-text-media"), styles(right, "media-text-media"));
        assert_eq!(
            left.get_attr("style"),
            Some("display:flex;align-items:flex-start;background-color:#f5f5f5;border-radius:8px;padding:16px")
        );
    }

    #[test]
    fn test_media_text_splits_lines_into_paragraphs() {
        let node = render_one(BlockKind::MediaText(media(MediaPosition::Left, 50)));
        let html = node.to_html();
        assert!(html.contains(
            "<div class=\"media-text-body\" style=\"width:50%\">\
             <h3 class=\"media-text-title\">Tiêu đề</h3><p>Dòng một</p><p>Dòng hai</p></div>"
        ));
    }

    #[test]
    fn test_media_text_image_link_and_caption() {
        let mut block = media(MediaPosition::Right, 30);
        block.image_link = Some("https://example.com/xi-mang".to_string());
        block.image_caption = Some("Ảnh minh họa".to_string());

        let node = render_one(BlockKind::MediaText(block));
        let container = node.as_element().unwrap();
        let panel = container
            .children
            .iter()
            .filter_map(RenderNode::as_element)
            .find(|c| c.get_attr("class") == Some("media-text-media"))
            .unwrap();

        assert_eq!(
            RenderNode::from(panel.clone()).to_html(),
            "<div class=\"media-text-media\" style=\"width:30%\">\
             <a href=\"https://example.com/xi-mang\" target=\"_blank\" rel=\"noopener noreferrer\">\
             <img src=\"/img/xi-mang.jpg\" alt=\"Bao xi măng\"></a>\
             <figcaption><span class=\"caption-text\">Ảnh minh họa</span></figcaption></div>"
        );
    }

    #[test]
    fn test_unknown_block_renders_empty_node_in_place() {
        let rendered = render(&[
            block("a", BlockKind::Paragraph(TextBlock { text: "x".to_string() })),
            block("b", BlockKind::Unknown),
            block("c", BlockKind::Divider),
        ]);
        let nodes = rendered.nodes();
        assert_eq!(nodes.len(), 3);
        assert!(nodes[1].is_empty());
        assert_eq!(nodes[2].as_element().unwrap().get_attr("data-block-id"), Some("c"));
    }

    #[test]
    fn test_empty_document_renders_placeholder() {
        let rendered = render(&[]);
        assert!(rendered.is_placeholder());
        assert!(rendered.nodes().is_empty());
        assert_eq!(rendered.to_html(), "<div class=\"no-content\">Chưa có nội dung.</div>");

        let only_unknown = render(&[block("x", BlockKind::Unknown)]);
        assert!(!only_unknown.is_placeholder());
        assert_eq!(only_unknown.to_html(), "");
    }

    fn render_one(kind: BlockKind) -> RenderNode {
        BlockRenderer::default().render_block(&block("b1", kind))
    }
}
