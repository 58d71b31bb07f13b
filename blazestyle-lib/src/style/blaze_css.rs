use crate::error::{Error, Result};
use crate::style::owned_css::{parse_media_query, CssRule, MediaQuery, Style, StyleRule};
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule as LcssStyleRule, CssRule as LcssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;
use log::warn;

/// Position of a rule inside a [`RuleSet`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    /// Source order of the rule.
    pub fn index(self) -> usize {
        self.0
    }
}

/// In-memory rule store, in source order.
#[derive(Debug, Default, Clone)]
pub struct RuleSet {
    rules: Vec<CssRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { rules: Vec::new() }
    }

    /// Parse `css` and append every style rule it contains. Rules nested in
    /// a width `@media` keep that breakpoint; other at-rules are skipped.
    pub fn add_rules(&mut self, css: &str) -> Result<Vec<RuleId>> {
        let parsed = parse_owned_rules(css)?;
        Ok(parsed.into_iter().map(|rule| self.add_rule(rule)).collect())
    }

    pub fn add_rule(&mut self, rule: CssRule) -> RuleId {
        self.rules.push(rule);
        RuleId(self.rules.len() - 1)
    }

    pub fn get(&self, id: RuleId) -> Option<&CssRule> {
        self.rules.get(id.0)
    }

    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut CssRule> {
        self.rules.get_mut(id.0)
    }

    /// Declarations of a rule, or `None` for a stale id.
    pub fn style(&self, id: RuleId) -> Option<&Style> {
        self.get(id).map(|rule| rule.style())
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &CssRule)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serialize every rule back to CSS text. Cleared declarations are dropped.
    pub fn to_css(&self) -> String {
        self.rules.iter().map(|rule| rule.to_string()).collect()
    }
}

/// Parse a raw CSS string (LightningCSS) and convert it to owned rules.
fn parse_owned_rules(css_text: &str) -> Result<Vec<CssRule>> {
    let sheet = LightningStyleSheet::parse(css_text, ParserOptions::default())
        .map_err(|e| Error::CssParse(e.to_string()))?;

    let mut owned_rules = Vec::new();
    for rule in &sheet.rules.0 {
        match rule {
            LcssRule::Style(style_rule) => {
                owned_rules.extend(convert_style_rule(style_rule, None)?);
            }
            LcssRule::Media(media_rule) => {
                let query = media_rule
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(|e| Error::CssParse(e.to_string()))?;
                let Some(media) = parse_media_query(&query) else {
                    warn!("skipping @media {}: not a width breakpoint", query);
                    continue;
                };
                for inner_rule in &media_rule.rules.0 {
                    if let LcssRule::Style(sr) = inner_rule {
                        owned_rules.extend(convert_style_rule(sr, Some(media))?);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(owned_rules)
}

/// One owned rule per selector of the LightningCSS rule, all sharing its declarations.
fn convert_style_rule(
    style_rule: &LcssStyleRule<'_>,
    media: Option<MediaQuery>,
) -> Result<Vec<CssRule>> {
    let block = &style_rule.declarations;
    let mut style = Style::new();

    // !important declarations come last so they win over normal ones
    for property in block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
    {
        let value = property
            .value_to_css_string(PrinterOptions::default())
            .map_err(|e| Error::CssParse(e.to_string()))?;
        style.insert(property.property_id().name().to_string(), value);
    }

    let mut rules = Vec::new();
    for selector in &style_rule.selectors.0 {
        let selector = selector
            .to_css_string(PrinterOptions::default())
            .map_err(|e| Error::CssParse(e.to_string()))?;
        let mut rule = CssRule::new(selector).with_style(style.clone());
        rule.media = media;
        rules.push(rule);
    }
    Ok(rules)
}
