pub mod animation;
pub mod renderer;

pub use animation::{AnimationConfig, AnimationSlot, SlotAnimations, TemplateId};
pub use renderer::ThemeRenderer;
