use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use chrono::DateTime;
use serde::Serialize;
use tera::{Context as TeraContext, Tera};
use tracing::{debug, info};

use crate::content::{faq, toc};
use crate::error::CmsError;
use crate::models::{Config, Post, PostSummary};
use crate::render::BlockRenderer;
use crate::theme::animation::{class_for, inline_style, resolve_all, TemplateId};
use crate::utils::ensure_trailing_slash;

/// 内置布局，主题目录中的同名文件会覆盖它们
const BUILTIN_LAYOUTS: &[(&str, &str)] = &[
    ("post.html", include_str!("layout/post.html")),
    ("index.html", include_str!("layout/index.html")),
];

/// 某个区块解析后的动画，供模板使用
#[derive(Debug, Clone, Serialize)]
struct SlotView {
    classes: String,
    style: String,
}

/// 页面组装：把渲染好的内容块、目录、FAQ 结构化数据和动画放进布局
pub struct ThemeRenderer {
    /// 模板引擎
    tera: Tera,
    /// 站点配置
    config: Config,
    /// 内容块渲染器
    blocks: BlockRenderer,
}

impl ThemeRenderer {
    /// 创建新的主题渲染器
    pub fn new(base_dir: &Path, config: Config) -> Result<Self> {
        let theme = config.theme.clone().unwrap_or_else(|| "default".to_string());
        let layout_dir = base_dir.join("themes").join(&theme).join("layout");

        let mut tera = if layout_dir.exists() {
            info!("加载主题布局: {}", layout_dir.display());
            Tera::new(&format!("{}/**/*.html", layout_dir.display()))?
        } else {
            debug!("主题目录不存在，使用内置布局: {}", layout_dir.display());
            Tera::default()
        };

        let existing: Vec<String> = tera.get_template_names().map(String::from).collect();
        for (name, source) in BUILTIN_LAYOUTS {
            if !existing.iter().any(|n| n == name) {
                tera.add_raw_template(name, source)?;
            }
        }

        Self::register_filters(&mut tera);

        Ok(Self {
            tera,
            blocks: BlockRenderer::new(config.render.clone()),
            config,
        })
    }

    /// 只使用内置布局
    pub fn builtin(config: Config) -> Result<Self> {
        let mut tera = Tera::default();
        for (name, source) in BUILTIN_LAYOUTS {
            tera.add_raw_template(name, source)?;
        }
        Self::register_filters(&mut tera);

        Ok(Self {
            tera,
            blocks: BlockRenderer::new(config.render.clone()),
            config,
        })
    }

    /// 注册模板过滤器
    fn register_filters(tera: &mut Tera) {
        tera.register_filter("date_format", date_format_filter);
    }

    /// 检查布局是否存在
    pub fn has_layout(&self, layout: &str) -> bool {
        self.tera.get_template_names().any(|name| name == layout)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 只渲染文章的内容块
    pub fn render_fragment(&self, post: &Post) -> String {
        self.blocks.render(&post.blocks).to_html()
    }

    /// 渲染完整的文章页面
    pub fn render_post(&self, post: &Post) -> Result<String> {
        let template = post.template_id(self.config.default_template());
        debug!("渲染文章 {}，模板 {}", post.title, template);

        let content = self.blocks.render(&post.blocks).to_html();

        let toc_html = if self.config.toc.enable {
            let tree = toc::build_tree(toc::from_blocks(&post.blocks, self.config.toc.max_level));
            toc::render(&tree).map(|node| node.to_html())
        } else {
            None
        };

        let faqs = faq::collect(&post.blocks);
        let faq_schema = if self.config.faq.microdata {
            faq::schema_microdata(&faqs).map(|node| node.to_html())
        } else {
            None
        };
        let faq_json_ld = if self.config.faq.json_ld && !faqs.is_empty() {
            Some(serde_json::to_string(&faq::json_ld(&faqs))?)
        } else {
            None
        };

        let mut context = self.site_context();
        context.insert("post", post);
        context.insert("template", &template_view(template));
        context.insert("animations", &animation_views(template, post));
        context.insert("content", &content);
        context.insert("toc", &toc_html);
        context.insert("faq_schema", &faq_schema);
        context.insert("faq_json_ld", &faq_json_ld);

        self.render_layout("post.html", &context)
    }

    /// 渲染首页文章列表
    pub fn render_index(&self, posts: &[PostSummary]) -> Result<String> {
        let mut context = self.site_context();
        context.insert("posts", posts);
        self.render_layout("index.html", &context)
    }

    fn site_context(&self) -> TeraContext {
        let mut context = TeraContext::new();
        context.insert("site", &serde_json::json!({
            "title": self.config.title,
            "description": self.config.description,
            "language": self.config.language.as_deref().unwrap_or("vi"),
        }));
        context.insert("root", &ensure_trailing_slash(self.config.root.as_deref().unwrap_or("/")));
        context.insert("date_format", self.config.date_format());
        context
    }

    fn render_layout(&self, layout: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(layout, context).map_err(|e| {
            let mut message = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                message.push_str(&format!(": {}", cause));
                source = std::error::Error::source(cause);
            }
            CmsError::PageRenderError {
                template: layout.to_string(),
                message,
            }
            .into()
        })
    }
}

fn template_view(template: TemplateId) -> serde_json::Value {
    serde_json::json!({
        "id": template.as_str(),
        "layout": template.layout(),
    })
}

fn animation_views(template: TemplateId, post: &Post) -> HashMap<&'static str, SlotView> {
    resolve_all(template, post.animations.as_ref())
        .into_iter()
        .map(|(slot, config)| {
            (
                slot.as_str(),
                SlotView {
                    classes: class_for(&config).join(" "),
                    style: inline_style(&config),
                },
            )
        })
        .collect()
}

fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    if let Some(date) = value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
        let format = args.get("format")
            .and_then(|f| f.as_str())
            .unwrap_or("%Y-%m-%d");
        Ok(tera::Value::String(date.format(format).to_string()))
    } else {
        Ok(value.clone())
    }
}
