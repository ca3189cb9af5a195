//! FAQ 的 Markdown 编解码和 schema.org 结构化数据
//!
//! Markdown 格式：每一项为 `**Q: 问题**`，空一行后是答案，项之间用 `---` 分隔。
//! 问题或答案中含有 `**Q:` 或单独一行的 `---`、问题跨行、首尾带空白时无法无损往返。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::block::{BlockKind, ContentBlock};
use crate::render::{Element, RenderNode};

const DELIMITER: &str = "\n\n---\n\n";

/// `**Q: 问题**` 之后至少一个空行，问题只占一行
static QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*Q:[ \t]*(.*?)\*\*[ \t]*\r?\n(?:[ \t]*\r?\n)+").expect("valid faq regex")
});

/// 答案末尾单独占一行的分隔线
static TRAILING_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\n)[ \t]*-{3,}[ \t]*$").expect("valid delimiter regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// 编码为 Markdown
pub fn serialize(faqs: &[FaqItem]) -> String {
    faqs.iter()
        .map(|faq| format!("**Q: {}**\n\n{}", faq.question, faq.answer))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// 从 Markdown 解码，格式不对的部分直接忽略
pub fn deserialize(markdown: &str) -> Vec<FaqItem> {
    let headers: Vec<_> = QUESTION.captures_iter(markdown).collect();

    headers
        .iter()
        .enumerate()
        .filter_map(|(index, caps)| {
            let whole = caps.get(0)?;
            let body_end = headers
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(markdown.len(), |m| m.start());
            let body = &markdown[whole.end()..body_end];
            let answer = TRAILING_DELIMITER.replace(body.trim_end(), "");

            Some(FaqItem::new(caps[1].trim(), answer.trim()))
        })
        .collect()
}

/// 收集文档中的所有 FAQ 块
pub fn collect(blocks: &[ContentBlock]) -> Vec<FaqItem> {
    blocks
        .iter()
        .filter_map(|block| match &block.kind {
            BlockKind::Faq(faq) => Some(FaqItem::new(faq.question.as_str(), faq.answer.as_str())),
            _ => None,
        })
        .collect()
}

/// 不可见的 FAQPage 微数据，内容与页面上的问答一致
pub fn schema_microdata(faqs: &[FaqItem]) -> Option<RenderNode> {
    if faqs.is_empty() {
        return None;
    }

    let questions = faqs.iter().map(|faq| {
        Element::new("div")
            .attr("itemscope", "")
            .attr("itemprop", "mainEntity")
            .attr("itemtype", "https://schema.org/Question")
            .child(
                Element::new("meta")
                    .attr("itemprop", "name")
                    .attr("content", faq.question.as_str()),
            )
            .child(
                Element::new("div")
                    .attr("itemscope", "")
                    .attr("itemprop", "acceptedAnswer")
                    .attr("itemtype", "https://schema.org/Answer")
                    .child(
                        Element::new("meta")
                            .attr("itemprop", "text")
                            .attr("content", faq.answer.as_str()),
                    ),
            )
    });

    Some(
        Element::new("div")
            .attr("itemscope", "")
            .attr("itemtype", "https://schema.org/FAQPage")
            .attr("hidden", "")
            .children(questions)
            .into(),
    )
}

/// FAQPage 的 JSON-LD
pub fn json_ld(faqs: &[FaqItem]) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": faqs.iter().map(|faq| json!({
            "@type": "Question",
            "name": faq.question,
            "acceptedAnswer": {
                "@type": "Answer",
                "text": faq.answer,
            },
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::block::FaqBlock;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<FaqItem> {
        vec![FaqItem::new("Q1?", "A1"), FaqItem::new("Q2?", "A2")]
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serialize(&sample()), "**Q: Q1?**\n\nA1\n\n---\n\n**Q: Q2?**\n\nA2");
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn test_round_trip() {
        let faqs = vec![
            FaqItem::new("Xi măng PCB40 giá bao nhiêu?", "Khoảng 90.000đ/bao.\n\nGiá thay đổi theo vùng."),
            FaqItem::new("Có giao hàng không?", "- Có\n- Miễn phí nội thành"),
            FaqItem::new("Câu hỏi *in nghiêng*?", ""),
            FaqItem::new("Cuối cùng?", "Hết."),
        ];
        assert_eq!(deserialize(&serialize(&faqs)), faqs);
        assert_eq!(deserialize(&serialize(&sample())), sample());
    }

    #[test]
    fn test_inline_dashes_stay_in_answer() {
        let faqs = vec![
            FaqItem::new("Ký hiệu?", "Dùng dấu ---"),
            FaqItem::new("Khoảng giá?", "Từ 80.000---95.000đ"),
        ];
        assert_eq!(deserialize(&serialize(&faqs)), faqs);
    }

    #[test]
    fn test_deserialize_tolerates_extra_blank_lines() {
        let markdown = "Giới thiệu\n\n**Q: Một?**\n\n\n\nMột.\n\n---\n\n\n**Q: Hai?**\n\nHai.\n\n---\n";
        assert_eq!(
            deserialize(markdown),
            vec![FaqItem::new("Một?", "Một."), FaqItem::new("Hai?", "Hai.")]
        );
    }

    #[test]
    fn test_malformed_markdown_yields_fewer_items() {
        assert!(deserialize("").is_empty());
        assert!(deserialize("**Q: không có dòng trống**ngay sau").is_empty());
        assert!(deserialize("**Q: chưa đóng\n\ntrả lời").is_empty());
    }

    #[test]
    fn test_collect_and_schema_match_visible_text() {
        let blocks = vec![
            ContentBlock { id: "1".into(), kind: BlockKind::Divider },
            ContentBlock {
                id: "2".into(),
                kind: BlockKind::Faq(FaqBlock {
                    question: "Giá \"PCB40\"?".into(),
                    answer: "90.000đ".into(),
                }),
            },
        ];
        let faqs = collect(&blocks);
        assert_eq!(faqs, vec![FaqItem::new("Giá \"PCB40\"?", "90.000đ")]);

        let html = schema_microdata(&faqs).unwrap().to_html();
        assert!(html.starts_with(
            "<div itemscope=\"\" itemtype=\"https://schema.org/FAQPage\" hidden=\"\">"
        ));
        assert!(html.contains("<meta itemprop=\"name\" content=\"Giá &quot;PCB40&quot;?\">"));
        assert!(html.contains("<meta itemprop=\"text\" content=\"90.000đ\">"));
        assert!(schema_microdata(&[]).is_none());
    }

    #[test]
    fn test_json_ld() {
        let value = json_ld(&sample());
        assert_eq!(value["@type"], "FAQPage");
        assert_eq!(value["mainEntity"][1]["name"], "Q2?");
        assert_eq!(value["mainEntity"][1]["acceptedAnswer"]["text"], "A2");
    }
}
