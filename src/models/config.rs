use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

use crate::error::CmsError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub root: Option<String>,
    pub source_dir: Option<String>,
    pub public_dir: Option<String>,
    pub theme: Option<String>,
    pub default_template: Option<String>,
    pub date_format: Option<String>,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub toc: TocConfig,
    #[serde(default)]
    pub faq: FaqConfig,
}

/// 内容块渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// 文章没有内容块时显示的占位文本
    pub placeholder: String,
    /// 图片来源前缀
    pub credit_label: String,
    /// 代码块未指定语言时使用的语言
    pub default_language: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder: "Chưa có nội dung.".to_string(),
            credit_label: "Nguồn".to_string(),
            default_language: "text".to_string(),
        }
    }
}

/// 目录配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// 是否生成目录
    pub enable: bool,
    /// 最大标题层级
    pub max_level: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            enable: true,
            max_level: 3,
        }
    }
}

/// FAQ 结构化数据配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqConfig {
    /// 输出 schema.org 微数据
    pub microdata: bool,
    /// 输出 JSON-LD
    pub json_ld: bool,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            microdata: true,
            json_ld: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: None,
            language: Some("vi".to_string()),
            root: Some("/".to_string()),
            source_dir: None,
            public_dir: None,
            theme: Some("default".to_string()),
            default_template: None,
            date_format: None,
            render: RenderConfig::default(),
            toc: TocConfig::default(),
            faq: FaqConfig::default(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| CmsError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置的别名
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_file(path)
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// 检查配置取值范围
    pub fn validate(&self) -> Result<(), CmsError> {
        if !(1..=6).contains(&self.toc.max_level) {
            return Err(CmsError::ConfigError {
                message: format!("toc.max_level 必须在 1 到 6 之间，实际为 {}", self.toc.max_level),
            });
        }
        if let Some(name) = &self.default_template {
            name.parse::<crate::theme::animation::TemplateId>()?;
        }
        Ok(())
    }

    /// 站点默认模板
    pub fn default_template(&self) -> crate::theme::animation::TemplateId {
        self.default_template
            .as_deref()
            .map(crate::theme::animation::TemplateId::from_name)
            .unwrap_or_default()
    }

    /// 日期格式
    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or("%d/%m/%Y")
    }
}
