use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::{deserialize_lenient, ContentBlock};
use crate::error::CmsError;
use crate::theme::animation::{SlotAnimations, TemplateId};
use crate::utils::slugify;

/// 一篇文章：页面组装所需的元数据和正文内容块
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// 文章标题
    pub title: String,
    /// URL 别名，缺省时由标题生成
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// 使用的模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// 发布时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// 文章标签
    #[serde(default)]
    pub tags: Vec<String>,
    /// 文章自定义的动画，覆盖模板默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<SlotAnimations>,
    /// 正文内容块
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub blocks: Vec<ContentBlock>,
}

impl Post {
    /// 从 JSON 字符串解析文章
    pub fn from_json(json: &str) -> Result<Self, CmsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从文件加载文章
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取文章失败: {}", path.display()))?;
        let post = Self::from_json(&content)
            .with_context(|| format!("解析文章失败: {}", path.display()))?;
        Ok(post)
    }

    /// 文章的 URL 别名，只含小写字母、数字和连字符；标题里没有可用字符时为空
    pub fn slug(&self) -> String {
        let explicit = self.slug.as_deref().map(slug::slugify).unwrap_or_default();
        if explicit.is_empty() {
            slugify(&self.title)
        } else {
            explicit
        }
    }

    /// 别名为空时改用 `fallback`（通常是文件名）
    pub fn slug_or(&self, fallback: &str) -> String {
        match self.slug() {
            slug if slug.is_empty() => slug::slugify(fallback),
            slug => slug,
        }
    }

    /// 文章使用的模板，未指定时使用站点默认模板
    pub fn template_id(&self, fallback: TemplateId) -> TemplateId {
        self.template
            .as_deref()
            .map(TemplateId::from_name)
            .unwrap_or(fallback)
    }
}

/// 首页列表中的文章摘要
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub path: String,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}
