use once_cell::sync::Lazy;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};
use tracing::{debug, warn};

/// 语法定义只加载一次，之后只读
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// 高亮结果中 span 的类名前缀
pub const CLASS_PREFIX: &str = "hl-";

fn find_syntax(language: &str) -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_token(language)
        .unwrap_or_else(|| {
            debug!("未找到语言 {} 的语法定义，按纯文本处理", language);
            SYNTAX_SET.find_syntax_plain_text()
        })
}

/// 将代码高亮为带类名的 HTML 片段
///
/// 代码内容本身不做其它变换，只有 HTML 转义。
pub fn highlight(code: &str, language: &str) -> String {
    let syntax = find_syntax(language);
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAX_SET,
        ClassStyle::SpacedPrefixed { prefix: CLASS_PREFIX },
    );

    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            warn!("代码高亮失败 ({}): {}，输出纯文本", language, e);
            return html_escape::encode_text(code).into_owned();
        }
    }

    generator.finalize()
}
