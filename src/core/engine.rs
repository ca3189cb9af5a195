use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{Config, Post, PostSummary};
use crate::theme::renderer::ThemeRenderer;

/// 站点引擎：读取文章文件，渲染后写入输出目录
pub struct Engine {
    /// 基础目录
    pub base_dir: PathBuf,
    /// 文章目录
    pub source_dir: PathBuf,
    /// 公共目录（输出）
    pub public_dir: PathBuf,
    /// 站点配置
    pub config: Config,
}

/// 一次生成的结果
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// 成功渲染的文章
    pub rendered: Vec<PathBuf>,
    /// 渲染失败的文章及原因
    pub failed: Vec<(PathBuf, String)>,
}

impl Engine {
    /// 创建一个新的引擎实例
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        info!("工作目录: {}", base_dir.display());

        let config_path = base_dir.join("_config.yml");
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            debug!("未找到配置文件，使用默认配置");
            Config::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: Config) -> Self {
        let source_dir = base_dir.join(config.source_dir.as_deref().unwrap_or("source/posts"));
        let public_dir = base_dir.join(config.public_dir.as_deref().unwrap_or("public"));

        Self {
            base_dir,
            source_dir,
            public_dir,
            config,
        }
    }

    /// 列出文章目录下所有 JSON 文件
    pub fn post_files(&self) -> Vec<PathBuf> {
        if !self.source_dir.exists() {
            warn!("文章目录不存在: {}", self.source_dir.display());
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.source_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        files.sort();
        files
    }

    /// 生成静态页面
    ///
    /// 文章之间互不依赖，并行渲染；单篇文章失败不影响其它文章。
    pub fn generate(&self) -> Result<GenerateReport> {
        info!("开始生成静态页面");
        let renderer = ThemeRenderer::new(&self.base_dir, self.config.clone())?;
        let files = self.post_files();
        info!("找到 {} 篇文章", files.len());

        let results: Vec<(PathBuf, Result<(Post, String)>)> = files
            .par_iter()
            .map(|path| {
                let result = Post::load(path)
                    .and_then(|post| renderer.render_post(&post).map(|html| (post, html)));
                (path.clone(), result)
            })
            .collect();

        let posts_dir = self.public_dir.join("posts");
        fs::create_dir_all(&posts_dir)
            .with_context(|| format!("创建目录失败: {}", posts_dir.display()))?;

        let mut report = GenerateReport::default();
        let mut summaries: Vec<PostSummary> = Vec::new();
        let mut by_slug: HashMap<String, usize> = HashMap::new();

        for (path, result) in results {
            match result {
                Ok((post, html)) => {
                    let slug = output_slug(&post, &path);
                    let target = posts_dir.join(format!("{}.html", slug));
                    write_file(&target, &html)?;
                    debug!("生成: {}", target.display());

                    let summary = PostSummary {
                        title: post.title.clone(),
                        path: format!("posts/{}.html", slug),
                        published_at: post.published_at,
                        tags: post.tags.clone(),
                    };
                    match by_slug.get(&slug) {
                        Some(&index) => {
                            warn!("文章别名重复，后者覆盖前者: {} ({})", slug, path.display());
                            summaries[index] = summary;
                        }
                        None => {
                            by_slug.insert(slug, summaries.len());
                            summaries.push(summary);
                        }
                    }
                    report.rendered.push(path);
                }
                Err(e) => {
                    warn!("渲染文章失败: {} - {:#}", path.display(), e);
                    report.failed.push((path, format!("{:#}", e)));
                }
            }
        }

        // 按发布时间倒序
        summaries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        let index = renderer.render_index(&summaries)?;
        write_file(&self.public_dir.join("index.html"), &index)?;

        let summary = format!(
            "生成完成: {} 篇成功, {} 篇失败",
            report.rendered.len(),
            report.failed.len()
        );
        info!("{}", summary.green());
        Ok(report)
    }

    /// 清理输出目录
    pub fn clean(&self) -> Result<()> {
        if self.public_dir.exists() {
            fs::remove_dir_all(&self.public_dir)
                .with_context(|| format!("删除目录失败: {}", self.public_dir.display()))?;
            info!("已清理: {}", self.public_dir.display());
        }
        Ok(())
    }
}

/// 输出文件名：文章别名，其次是源文件名
fn output_slug(post: &Post, path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match post.slug_or(stem) {
        slug if slug.is_empty() => "untitled".to_string(),
        slug => slug,
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("写入文件失败: {}", path.display()))
}
