// src/style/owned_css.rs (the "owned" side of a stylesheet: rules the editor can mutate)
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// CSS property name => value. An empty value is a cleared declaration,
/// a missing key is an unset one.
pub type Style = BTreeMap<String, String>;

/// A set of declarations to merge into a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePatch {
    pub declarations: Style,
    /// The `__p` flag: marks a partial (programmatic) update. Carried through untouched.
    pub partial: bool,
}

impl StylePatch {
    pub fn new(declarations: Style) -> Self {
        StylePatch {
            declarations,
            partial: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// The rule side of the model: a mapping of declarations that can be read and patched.
pub trait StyleRule {
    fn style(&self) -> &Style;

    /// Replaces every declaration.
    fn set_style(&mut self, style: Style);

    /// Merges `patch` into the current declarations.
    fn add_style(&mut self, patch: &StylePatch);
}

/// Which side of a width breakpoint a media rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum MediaCondition {
    /// Desktop-first: narrower devices override wider ones.
    #[default]
    #[serde(rename = "max-width")]
    MaxWidth,
    /// Mobile-first: wider devices override narrower ones.
    #[serde(rename = "min-width")]
    MinWidth,
}

impl MediaCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCondition::MaxWidth => "max-width",
            MediaCondition::MinWidth => "min-width",
        }
    }
}

/// A width breakpoint, e.g. `(max-width: 992px)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaQuery {
    pub condition: MediaCondition,
    pub width_px: u32,
}

impl MediaQuery {
    pub fn new(condition: MediaCondition, width_px: u32) -> Self {
        MediaQuery {
            condition,
            width_px,
        }
    }

    /// True if `other` applies to a wider range of viewports than `self`
    /// under the same condition.
    pub fn is_narrower_than(&self, other: &MediaQuery) -> bool {
        if self.condition != other.condition {
            return false;
        }
        match self.condition {
            MediaCondition::MaxWidth => self.width_px < other.width_px,
            MediaCondition::MinWidth => self.width_px > other.width_px,
        }
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}: {}px)", self.condition.as_str(), self.width_px)
    }
}

/// Parse a width media query in either legacy (`(max-width: 992px)`) or
/// range (`(width <= 992px)`) syntax. Anything else yields `None`.
pub fn parse_media_query(text: &str) -> Option<MediaQuery> {
    let start = text.find('(')?;
    let end = text[start..].find(')')? + start;
    let feature = text[start + 1..end].trim();

    if let Some((name, value)) = feature.split_once(':') {
        let condition = match name.trim() {
            "max-width" => MediaCondition::MaxWidth,
            "min-width" => MediaCondition::MinWidth,
            _ => return None,
        };
        return Some(MediaQuery::new(condition, parse_px(value)?));
    }

    let tokens: Vec<&str> = feature.split_whitespace().collect();
    let [left, operator, right] = tokens.as_slice() else {
        return None;
    };
    let (operator, value) = match (*left, *right) {
        ("width", value) => (*operator, value),
        (value, "width") => (flip_operator(operator)?, value),
        _ => return None,
    };
    let condition = match operator {
        "<=" | "<" => MediaCondition::MaxWidth,
        ">=" | ">" => MediaCondition::MinWidth,
        _ => return None,
    };
    Some(MediaQuery::new(condition, parse_px(value)?))
}

fn flip_operator(operator: &str) -> Option<&'static str> {
    match operator {
        "<=" => Some(">="),
        "<" => Some(">"),
        ">=" => Some("<="),
        ">" => Some("<"),
        _ => None,
    }
}

fn parse_px(value: &str) -> Option<u32> {
    let number = value.trim().strip_suffix("px")?;
    let px: f32 = number.trim().parse().ok()?;
    (px >= 0.0).then(|| px.round() as u32)
}

/// A single style rule: one selector, an optional breakpoint and its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// e.g. ".cls", "#header", "div.red"
    pub selector: String,
    pub media: Option<MediaQuery>,
    style: Style,
    partial: Option<bool>,
}

impl CssRule {
    pub fn new(selector: impl Into<String>) -> Self {
        CssRule {
            selector: selector.into(),
            media: None,
            style: Style::new(),
            partial: None,
        }
    }

    pub fn with_media(mut self, media: MediaQuery) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// The `partial` flag of the last merged patch, if any patch was merged.
    pub fn partial(&self) -> Option<bool> {
        self.partial
    }
}

impl StyleRule for CssRule {
    fn style(&self) -> &Style {
        &self.style
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
        self.partial = None;
    }

    fn add_style(&mut self, patch: &StylePatch) {
        for (property, value) in &patch.declarations {
            self.style.insert(property.clone(), value.clone());
        }
        self.partial = Some(patch.partial);
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = if self.media.is_some() { "  " } else { "" };
        if let Some(media) = &self.media {
            writeln!(f, "@media {} {{", media)?;
        }
        writeln!(f, "{}{} {{", indent, self.selector)?;
        for (property, value) in self.style.iter().filter(|(_, v)| !v.is_empty()) {
            writeln!(f, "{}  {}: {};", indent, property, value)?;
        }
        writeln!(f, "{}}}", indent)?;
        if self.media.is_some() {
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

/// Build a [`Style`] from `(property, value)` pairs.
pub fn style_from<K, V, I>(pairs: I) -> Style
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_legacy_media() {
        assert_eq!(
            parse_media_query("(max-width: 992px)"),
            Some(MediaQuery::new(MediaCondition::MaxWidth, 992))
        );
        assert_eq!(
            parse_media_query("screen and (min-width: 480px)"),
            Some(MediaQuery::new(MediaCondition::MinWidth, 480))
        );
    }

    #[test]
    fn test_parse_range_media() {
        assert_eq!(
            parse_media_query("(width <= 992px)"),
            Some(MediaQuery::new(MediaCondition::MaxWidth, 992))
        );
        assert_eq!(
            parse_media_query("(768px <= width)"),
            Some(MediaQuery::new(MediaCondition::MinWidth, 768))
        );
        assert_eq!(parse_media_query("(orientation: landscape)"), None);
        assert_eq!(parse_media_query("print"), None);
    }

    #[test]
    fn test_breakpoint_breadth() {
        let tablet = MediaQuery::new(MediaCondition::MaxWidth, 992);
        let mobile = MediaQuery::new(MediaCondition::MaxWidth, 480);
        assert!(mobile.is_narrower_than(&tablet));
        assert!(!tablet.is_narrower_than(&mobile));

        let min_small = MediaQuery::new(MediaCondition::MinWidth, 480);
        let min_large = MediaQuery::new(MediaCondition::MinWidth, 992);
        assert!(min_large.is_narrower_than(&min_small));
        assert!(!tablet.is_narrower_than(&min_small));
    }

    #[test]
    fn test_add_style_keeps_cleared_declarations() {
        let mut rule = CssRule::new(".cls").with_style(style_from([("color", "red")]));
        assert_eq!(rule.partial(), None);

        rule.add_style(&StylePatch::new(style_from([("padding", ""), ("margin", "1px")])));
        assert_eq!(
            rule.style(),
            &style_from([("color", "red"), ("margin", "1px"), ("padding", "")])
        );
        assert_eq!(rule.partial(), Some(false));
    }

    #[test]
    fn test_partial_flag_passes_through() {
        let mut rule = CssRule::new(".cls");
        let patch = StylePatch {
            declarations: style_from([("color", "blue")]),
            partial: true,
        };
        rule.add_style(&patch);
        assert_eq!(rule.partial(), Some(true));
        assert_eq!(rule.style()["color"], "blue");

        rule.add_style(&StylePatch::new(style_from([("color", "red")])));
        assert_eq!(rule.partial(), Some(false));
        rule.set_style(Style::new());
        assert_eq!(rule.partial(), None);
    }

    #[test]
    fn test_display_omits_cleared() {
        let rule = CssRule::new(".cls")
            .with_media(MediaQuery::new(MediaCondition::MaxWidth, 992))
            .with_style(style_from([("color", "red"), ("padding", "")]));
        assert_eq!(
            rule.to_string(),
            "@media (max-width: 992px) {\n  .cls {\n    color: red;\n  }\n}\n"
        );
    }
}
