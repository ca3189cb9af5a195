pub mod block;
pub mod config;
pub mod types;

pub use block::{parse_blocks, BlockKind, ContentBlock};
pub use config::{Config, FaqConfig, RenderConfig, TocConfig};
pub use types::{Post, PostSummary};
