use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

/// 渲染结果中的一个节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// HTML 元素
    Element(Element),
    /// 文本，输出时转义
    Text(String),
    /// 已经转义好的标记（代码高亮结果）
    Raw(String),
    /// 空节点，不输出任何内容
    Empty,
}

/// HTML 元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    /// 属性按插入顺序输出
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<RenderNode>,
}

/// 没有结束标签的元素
const VOID_TAGS: &[&str] = &["img", "hr", "meta", "br"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// 值为 `None` 或空字符串时不添加属性
    pub fn attr_opt(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.attr(name, v),
            _ => self,
        }
    }

    pub fn child(mut self, node: impl Into<RenderNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I>(mut self, nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RenderNode>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(RenderNode::Text(text.into()))
    }

    /// 查找属性值
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            // 写入 String 不会失败
            let _ = write!(out, " {}=\"{}\"", name, encode_double_quoted_attribute(value));
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

impl From<Element> for RenderNode {
    fn from(element: Element) -> Self {
        RenderNode::Element(element)
    }
}

impl RenderNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            RenderNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderNode::Empty)
    }

    /// 节点内所有文本（不含标签）
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            RenderNode::Text(text) => out.push_str(text),
            RenderNode::Raw(_) | RenderNode::Empty => {}
        }
    }

    /// 输出为 HTML 字符串
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            RenderNode::Element(element) => element.write_html(out),
            RenderNode::Text(text) => out.push_str(&encode_text(text)),
            RenderNode::Raw(markup) => out.push_str(markup),
            RenderNode::Empty => {}
        }
    }
}
