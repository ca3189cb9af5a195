use thiserror::Error;

/// 内容渲染相关的错误类型
///
/// 渲染核心本身不会失败，这些错误只出现在外围：读取文档、解析配置、组装页面。
#[derive(Error, Debug)]
pub enum CmsError {
    #[error("文档格式错误: {message}")]
    InvalidDocument {
        message: String,
    },

    #[error("未知模板: {0}")]
    UnknownTemplate(String),

    #[error("配置错误: {message}")]
    ConfigError {
        message: String,
    },

    #[error("页面渲染失败: {template} - {message}")]
    PageRenderError {
        template: String,
        message: String,
    },

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
}
