pub mod faq;
pub mod toc;

pub use faq::FaqItem;
pub use toc::{TocEntry, TocNode};
