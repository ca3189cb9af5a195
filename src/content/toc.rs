use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::models::block::{BlockKind, ContentBlock};
use crate::render::{Element, RenderNode};
use crate::utils::slugify;

/// 目录中的一个标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// 嵌套目录节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    #[serde(flatten)]
    pub entry: TocEntry,
    pub children: Vec<TocNode>,
}

static HTML_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h([1-6])\b([^>]*)>(.*?)</h[1-6]\s*>").expect("valid heading regex")
});
static HTML_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid id regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

fn entry(id: String, text: String, level: u8) -> Option<TocEntry> {
    if id.is_empty() || text.is_empty() {
        return None;
    }
    Some(TocEntry { id, text, level })
}

/// 从 Markdown 中提取标题（`#` 到 `######`），锚点由标题文本生成
pub fn from_markdown(markdown: &str, max_level: u8) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                current = Some((level as u8, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = current.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, text)) = current.take() {
                    if level > max_level {
                        continue;
                    }
                    let text = text.trim().to_string();
                    entries.extend(entry(slugify(&text), text, level));
                }
            }
            _ => {}
        }
    }

    debug!("从 Markdown 中提取了 {} 个标题", entries.len());
    entries
}

/// 从已渲染的 HTML 中提取带 id 的标题，直接使用已有的 id
pub fn from_html(html: &str, max_level: u8) -> Vec<TocEntry> {
    let entries: Vec<TocEntry> = HTML_HEADING
        .captures_iter(html)
        .filter_map(|caps| {
            let level: u8 = caps[1].parse().ok()?;
            if level > max_level {
                return None;
            }
            let id_caps = HTML_ID.captures(&caps[2])?;
            let id = id_caps.get(1).or_else(|| id_caps.get(2))?.as_str();
            let text = HTML_TAG.replace_all(&caps[3], "");
            entry(
                html_escape::decode_html_entities(id).trim().to_string(),
                html_escape::decode_html_entities(&text).trim().to_string(),
                level,
            )
        })
        .collect();

    debug!("从 HTML 中提取了 {} 个标题", entries.len());
    entries
}

/// 直接从标题块提取，id 与渲染结果一致
pub fn from_blocks(blocks: &[ContentBlock], max_level: u8) -> Vec<TocEntry> {
    blocks
        .iter()
        .filter_map(|block| match &block.kind {
            BlockKind::Heading(heading) if heading.clamped_level() <= max_level => entry(
                heading.anchor_id()?,
                heading.text.trim().to_string(),
                heading.clamped_level(),
            ),
            _ => None,
        })
        .collect()
}

/// 把平铺的标题列表按层级折叠成树
///
/// 一个标题的子节点是其后层级更深的标题，直到遇到层级相同或更浅的标题为止。
pub fn build_tree(entries: Vec<TocEntry>) -> Vec<TocNode> {
    let mut iter = entries.into_iter().peekable();
    collect_children(&mut iter, None)
}

fn collect_children<I>(iter: &mut std::iter::Peekable<I>, parent_level: Option<u8>) -> Vec<TocNode>
where
    I: Iterator<Item = TocEntry>,
{
    let mut nodes = Vec::new();
    while let Some(entry) = iter.next_if(|e| parent_level.map_or(true, |level| e.level > level)) {
        let children = collect_children(iter, Some(entry.level));
        nodes.push(TocNode { entry, children });
    }
    nodes
}

/// 渲染目录导航，没有标题时返回 `None`
pub fn render(tree: &[TocNode]) -> Option<RenderNode> {
    if tree.is_empty() {
        return None;
    }
    Some(Element::new("nav").attr("class", "toc").child(render_list(tree)).into())
}

fn render_list(nodes: &[TocNode]) -> Element {
    Element::new("ul").children(nodes.iter().map(|node| {
        let link = Element::new("a")
            .attr("href", format!("#{}", node.entry.id))
            .text(node.entry.text.as_str());
        let mut item = Element::new("li").child(link);
        if !node.children.is_empty() {
            item = item.child(render_list(&node.children));
        }
        item
    }))
}
