pub mod content;
pub mod core;
pub mod error;
pub mod models;
pub mod render;
pub mod theme;
pub mod utils;

// Re-export commonly used types and traits
pub use crate::error::CmsError;
pub use crate::models::{ContentBlock, BlockKind, Post, Config};
pub use crate::render::{render, BlockRenderer, RenderNode, Rendered};
pub use crate::theme::animation::{resolve, class_for, AnimationConfig, AnimationSlot, TemplateId};
pub use crate::theme::renderer::ThemeRenderer;
