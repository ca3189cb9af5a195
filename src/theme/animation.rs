//! 模板与动画配置
//!
//! 每个模板有一张静态的默认动画表，文章可以按区块覆盖。解析顺序：
//! 文章覆盖 -> 模板默认 -> 无动画。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CmsError;

use AnimationDelay as D;
use AnimationSpeed as S;
use AnimationType as T;

/// 模板标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    #[default]
    Blog,
    LandingHero,
    LandingSplit,
    Gallery,
    Minimal,
    Magazine,
    Centered,
    Dark,
}

impl TemplateId {
    pub const ALL: [TemplateId; 8] = [
        TemplateId::Blog,
        TemplateId::LandingHero,
        TemplateId::LandingSplit,
        TemplateId::Gallery,
        TemplateId::Minimal,
        TemplateId::Magazine,
        TemplateId::Centered,
        TemplateId::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Blog => "blog",
            TemplateId::LandingHero => "landing-hero",
            TemplateId::LandingSplit => "landing-split",
            TemplateId::Gallery => "gallery",
            TemplateId::Minimal => "minimal",
            TemplateId::Magazine => "magazine",
            TemplateId::Centered => "centered",
            TemplateId::Dark => "dark",
        }
    }

    /// 按名称查找模板，未知名称回退到默认模板
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!("未知模板 {}，使用默认模板 {}", name, TemplateId::default());
            TemplateId::default()
        })
    }

    /// 模板的默认动画表
    pub fn animations(&self) -> &'static SlotAnimations {
        match self {
            TemplateId::Blog => &BLOG,
            TemplateId::LandingHero => &LANDING_HERO,
            TemplateId::LandingSplit => &LANDING_SPLIT,
            TemplateId::Gallery => &GALLERY,
            TemplateId::Minimal => &MINIMAL,
            TemplateId::Magazine => &MAGAZINE,
            TemplateId::Centered => &CENTERED,
            TemplateId::Dark => &DARK,
        }
    }

    /// 模板的版式
    pub fn layout(&self) -> &'static TemplateLayout {
        match self {
            TemplateId::Blog => &TemplateLayout {
                name: "Blog",
                hero: HeroStyle::Banner,
                content_width: "narrow",
                sidebar: true,
                dark: false,
            },
            TemplateId::LandingHero => &TemplateLayout {
                name: "Landing Hero",
                hero: HeroStyle::FullScreen,
                content_width: "wide",
                sidebar: false,
                dark: false,
            },
            TemplateId::LandingSplit => &TemplateLayout {
                name: "Landing Split",
                hero: HeroStyle::Split,
                content_width: "wide",
                sidebar: false,
                dark: false,
            },
            TemplateId::Gallery => &TemplateLayout {
                name: "Gallery",
                hero: HeroStyle::Banner,
                content_width: "full",
                sidebar: false,
                dark: false,
            },
            TemplateId::Minimal => &TemplateLayout {
                name: "Minimal",
                hero: HeroStyle::None,
                content_width: "narrow",
                sidebar: false,
                dark: false,
            },
            TemplateId::Magazine => &TemplateLayout {
                name: "Magazine",
                hero: HeroStyle::Banner,
                content_width: "wide",
                sidebar: true,
                dark: false,
            },
            TemplateId::Centered => &TemplateLayout {
                name: "Centered",
                hero: HeroStyle::Centered,
                content_width: "narrow",
                sidebar: false,
                dark: false,
            },
            TemplateId::Dark => &TemplateLayout {
                name: "Dark",
                hero: HeroStyle::Banner,
                content_width: "narrow",
                sidebar: true,
                dark: true,
            },
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| CmsError::UnknownTemplate(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeroStyle {
    None,
    Banner,
    FullScreen,
    Split,
    Centered,
}

/// 模板版式描述，供页面组装使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateLayout {
    pub name: &'static str,
    pub hero: HeroStyle,
    /// 正文宽度：narrow / wide / full
    pub content_width: &'static str,
    pub sidebar: bool,
    pub dark: bool,
}

/// 动画区块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSlot {
    Hero,
    Content,
    Images,
    Sidebar,
    Tags,
}

impl AnimationSlot {
    pub const ALL: [AnimationSlot; 5] = [
        AnimationSlot::Hero,
        AnimationSlot::Content,
        AnimationSlot::Images,
        AnimationSlot::Sidebar,
        AnimationSlot::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationSlot::Hero => "hero",
            AnimationSlot::Content => "content",
            AnimationSlot::Images => "images",
            AnimationSlot::Sidebar => "sidebar",
            AnimationSlot::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationType {
    #[default]
    None,
    FadeIn,
    FadeInUp,
    FadeInDown,
    FadeInLeft,
    FadeInRight,
    ZoomIn,
    SlideUp,
    Bounce,
}

impl AnimationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationType::None => "none",
            AnimationType::FadeIn => "fadeIn",
            AnimationType::FadeInUp => "fadeInUp",
            AnimationType::FadeInDown => "fadeInDown",
            AnimationType::FadeInLeft => "fadeInLeft",
            AnimationType::FadeInRight => "fadeInRight",
            AnimationType::ZoomIn => "zoomIn",
            AnimationType::SlideUp => "slideUp",
            AnimationType::Bounce => "bounce",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl AnimationSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationSpeed::Slow => "slow",
            AnimationSpeed::Normal => "normal",
            AnimationSpeed::Fast => "fast",
        }
    }

    /// 持续时间（秒）
    pub fn duration_secs(&self) -> f32 {
        match self {
            AnimationSpeed::Slow => 0.8,
            AnimationSpeed::Normal => 0.5,
            AnimationSpeed::Fast => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationDelay {
    #[default]
    None,
    Short,
    Medium,
    Long,
}

impl AnimationDelay {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationDelay::None => "none",
            AnimationDelay::Short => "short",
            AnimationDelay::Medium => "medium",
            AnimationDelay::Long => "long",
        }
    }

    /// 延迟时间（秒）
    pub fn secs(&self) -> f32 {
        match self {
            AnimationDelay::None => 0.0,
            AnimationDelay::Short => 0.1,
            AnimationDelay::Medium => 0.2,
            AnimationDelay::Long => 0.4,
        }
    }
}

/// 单个区块的动画配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(rename = "type")]
    pub kind: AnimationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<AnimationSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<AnimationDelay>,
}

impl AnimationConfig {
    /// 无动画
    pub const NONE: AnimationConfig = AnimationConfig {
        kind: AnimationType::None,
        speed: None,
        delay: None,
    };

    pub const fn new(
        kind: AnimationType,
        speed: Option<AnimationSpeed>,
        delay: Option<AnimationDelay>,
    ) -> Self {
        Self { kind, speed, delay }
    }

    pub fn is_none(&self) -> bool {
        self.kind == AnimationType::None
    }

    /// 计算实际的持续时间和延迟（秒）
    pub fn timing(&self) -> (f32, f32) {
        if self.is_none() {
            return (0.0, 0.0);
        }
        (
            self.speed.unwrap_or_default().duration_secs(),
            self.delay.unwrap_or_default().secs(),
        )
    }
}

/// 五个区块的动画配置，缺少的区块没有动画
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotAnimations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<AnimationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<AnimationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<AnimationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<AnimationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<AnimationConfig>,
}

impl SlotAnimations {
    pub fn get(&self, slot: AnimationSlot) -> Option<AnimationConfig> {
        match slot {
            AnimationSlot::Hero => self.hero,
            AnimationSlot::Content => self.content,
            AnimationSlot::Images => self.images,
            AnimationSlot::Sidebar => self.sidebar,
            AnimationSlot::Tags => self.tags,
        }
    }
}

const fn anim(
    kind: AnimationType,
    speed: Option<AnimationSpeed>,
    delay: Option<AnimationDelay>,
) -> Option<AnimationConfig> {
    Some(AnimationConfig::new(kind, speed, delay))
}

static BLOG: SlotAnimations = SlotAnimations {
    hero: anim(T::FadeInUp, Some(S::Normal), None),
    content: anim(T::FadeIn, Some(S::Normal), Some(D::Short)),
    images: anim(T::ZoomIn, Some(S::Slow), None),
    sidebar: anim(T::FadeInRight, Some(S::Normal), Some(D::Medium)),
    tags: anim(T::FadeInUp, Some(S::Fast), Some(D::Long)),
};

static LANDING_HERO: SlotAnimations = SlotAnimations {
    hero: anim(T::ZoomIn, Some(S::Slow), None),
    content: anim(T::FadeInUp, Some(S::Normal), Some(D::Short)),
    images: anim(T::FadeIn, Some(S::Slow), Some(D::Medium)),
    sidebar: None,
    tags: anim(T::FadeIn, Some(S::Fast), Some(D::Long)),
};

static LANDING_SPLIT: SlotAnimations = SlotAnimations {
    hero: anim(T::FadeInLeft, Some(S::Normal), None),
    content: anim(T::FadeInRight, Some(S::Normal), Some(D::Short)),
    images: anim(T::SlideUp, Some(S::Normal), Some(D::Medium)),
    sidebar: None,
    tags: None,
};

static GALLERY: SlotAnimations = SlotAnimations {
    hero: anim(T::FadeIn, Some(S::Slow), None),
    content: anim(T::FadeIn, Some(S::Normal), None),
    images: anim(T::ZoomIn, Some(S::Normal), Some(D::Short)),
    sidebar: None,
    tags: anim(T::FadeInUp, Some(S::Fast), None),
};

static MINIMAL: SlotAnimations = SlotAnimations {
    hero: None,
    content: anim(T::FadeIn, Some(S::Fast), None),
    images: None,
    sidebar: None,
    tags: None,
};

static MAGAZINE: SlotAnimations = SlotAnimations {
    hero: anim(T::FadeInDown, Some(S::Normal), None),
    content: anim(T::FadeInUp, Some(S::Normal), Some(D::Short)),
    images: anim(T::FadeIn, Some(S::Normal), Some(D::Short)),
    sidebar: anim(T::FadeInLeft, Some(S::Normal), Some(D::Medium)),
    tags: anim(T::FadeIn, Some(S::Fast), Some(D::Long)),
};

static CENTERED: SlotAnimations = SlotAnimations {
    hero: anim(T::ZoomIn, Some(S::Normal), None),
    content: anim(T::FadeInUp, Some(S::Slow), Some(D::Short)),
    images: None,
    sidebar: None,
    tags: anim(T::Bounce, Some(S::Fast), Some(D::Medium)),
};

static DARK: SlotAnimations = SlotAnimations {
    hero: anim(T::FadeIn, Some(S::Slow), None),
    content: anim(T::FadeInUp, Some(S::Normal), Some(D::Medium)),
    images: anim(T::FadeIn, Some(S::Slow), Some(D::Short)),
    sidebar: anim(T::FadeInRight, Some(S::Slow), Some(D::Long)),
    tags: None,
};

/// 解析某个模板某个区块的动画
///
/// 优先使用文章覆盖的配置，其次是模板默认值，都没有时返回 [`AnimationConfig::NONE`]。
/// 未知模板使用默认模板的表。
pub fn resolve(
    template: &str,
    slot: AnimationSlot,
    overrides: Option<&SlotAnimations>,
) -> AnimationConfig {
    resolve_for(TemplateId::from_name(template), slot, overrides)
}

/// 同 [`resolve`]，模板已经解析好
pub fn resolve_for(
    template: TemplateId,
    slot: AnimationSlot,
    overrides: Option<&SlotAnimations>,
) -> AnimationConfig {
    overrides
        .and_then(|o| o.get(slot))
        .or_else(|| template.animations().get(slot))
        .unwrap_or(AnimationConfig::NONE)
}

/// 按区块顺序解析模板的全部动画
pub fn resolve_all(
    template: TemplateId,
    overrides: Option<&SlotAnimations>,
) -> Vec<(AnimationSlot, AnimationConfig)> {
    AnimationSlot::ALL
        .iter()
        .map(|slot| (*slot, resolve_for(template, *slot, overrides)))
        .collect()
}

/// 动画对应的样式类
pub fn class_for(config: &AnimationConfig) -> Vec<String> {
    if config.is_none() {
        return Vec::new();
    }

    let mut classes = vec![format!("animate-{}", config.kind.as_str())];
    if let Some(speed) = config.speed {
        classes.push(format!("animate-speed-{}", speed.as_str()));
    }
    if let Some(delay) = config.delay.filter(|d| *d != AnimationDelay::None) {
        classes.push(format!("animate-delay-{}", delay.as_str()));
    }
    classes
}

/// 不依赖样式表时使用的内联样式
pub fn inline_style(config: &AnimationConfig) -> String {
    if config.is_none() {
        return String::new();
    }
    let (duration, delay) = config.timing();
    format!(
        "animation-name:{};animation-duration:{}s;animation-delay:{}s;animation-fill-mode:both",
        config.kind.as_str(),
        duration,
        delay
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blog_hero_default() {
        let config = resolve("blog", AnimationSlot::Hero, None);
        assert_eq!(config, AnimationConfig::new(T::FadeInUp, Some(S::Normal), None));
        assert_eq!(class_for(&config), vec!["animate-fadeInUp", "animate-speed-normal"]);
    }

    #[test]
    fn test_unknown_template_uses_default_table() {
        for slot in AnimationSlot::ALL {
            assert_eq!(resolve("unknown-template", slot, None), resolve("blog", slot, None));
        }
    }

    #[test]
    fn test_missing_slot_resolves_to_none() {
        let config = resolve("minimal", AnimationSlot::Hero, None);
        assert_eq!(config, AnimationConfig::NONE);
        assert!(class_for(&config).is_empty());
        assert_eq!(config.timing(), (0.0, 0.0));
        assert_eq!(inline_style(&config), "");
    }

    #[test]
    fn test_override_takes_precedence() {
        let overrides = SlotAnimations {
            hero: Some(AnimationConfig::new(T::Bounce, None, Some(D::Long))),
            ..Default::default()
        };
        let hero = resolve("minimal", AnimationSlot::Hero, Some(&overrides));
        assert_eq!(class_for(&hero), vec!["animate-bounce", "animate-delay-long"]);
        assert_eq!(hero.timing(), (0.5, 0.4));

        // 没有覆盖的区块仍使用模板默认值
        let content = resolve("minimal", AnimationSlot::Content, Some(&overrides));
        assert_eq!(content, MINIMAL.content.unwrap());
    }

    #[test]
    fn test_override_can_disable_animation() {
        let overrides: SlotAnimations =
            serde_json::from_str(r#"{"hero": {"type": "none"}}"#).unwrap();
        assert_eq!(resolve("blog", AnimationSlot::Hero, Some(&overrides)), AnimationConfig::NONE);
    }

    #[test]
    fn test_class_for_skips_none_delay() {
        let config = AnimationConfig::new(AnimationType::FadeIn, None, Some(AnimationDelay::None));
        assert_eq!(class_for(&config), vec!["animate-fadeIn"]);
    }

    #[test]
    fn test_inline_style() {
        let config = resolve("blog", AnimationSlot::Content, None);
        assert_eq!(
            inline_style(&config),
            "animation-name:fadeIn;animation-duration:0.5s;animation-delay:0.1s;animation-fill-mode:both"
        );
    }

    #[test]
    fn test_template_names_round_trip() {
        for id in TemplateId::ALL {
            assert_eq!(id.as_str().parse::<TemplateId>().unwrap(), id);
            assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", id));
        }
        assert!("neon".parse::<TemplateId>().is_err());
    }

    #[test]
    fn test_resolve_all_follows_slot_order() {
        let slots: Vec<AnimationSlot> = resolve_all(TemplateId::Dark, None)
            .into_iter()
            .map(|(slot, _)| slot)
            .collect();
        assert_eq!(slots, AnimationSlot::ALL.to_vec());
    }
}
