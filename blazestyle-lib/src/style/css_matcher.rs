use crate::dom::Component;
use crate::style::blaze_css::{RuleId, RuleSet};
use crate::style::owned_css::{MediaCondition, MediaQuery};
use std::collections::HashSet;
use std::iter::Peekable;
use std::str::Chars;

/// ------------------------------
/// 1. Selector Parsing
/// ------------------------------

/// Supported attribute selector operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr="value"]
    Exact,
    /// [attr~="value"]
    Includes,
    /// [attr^="value"]
    Prefix,
    /// [attr$="value"]
    Suffix,
    /// [attr*="value"]
    Substring,
}

/// Represents one attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>, // None means only existence check
    pub value: Option<String>,
}

/// A compound selector: optional tag, id, classes, attribute conditions and pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: HashSet<String>,
    pub attributes: Vec<AttributeSelector>,
    /// `hover` for `:hover`; state rules never match a bare component.
    pub pseudo: Vec<String>,
}

/// Supported combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector composed of a key compound selector and a list of ancestor parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub key: CompoundSelector,
    /// Ancestors with their combinators, in right-to-left order.
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

fn is_compound_delimiter(ch: char) -> bool {
    matches!(ch, '#' | '.' | '[' | ':')
}

fn take_name(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut buffer = String::new();
    while let Some(&ch) = chars.peek() {
        if is_compound_delimiter(ch) {
            break;
        }
        buffer.push(ch);
        chars.next();
    }
    buffer
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
        chars.next();
    }
}

/// Parse the inside of `[...]`; the opening bracket is already consumed.
fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Option<AttributeSelector> {
    skip_whitespace(chars);
    let mut name = String::new();
    while let Some(&ch) = chars.peek() {
        if matches!(ch, '=' | ']' | '~' | '^' | '$' | '*') || ch.is_whitespace() {
            break;
        }
        name.push(ch);
        chars.next();
    }
    skip_whitespace(chars);

    let mut operator = None;
    let mut value = None;
    if let Some(&ch) = chars.peek() {
        if ch != ']' {
            chars.next();
            if ch != '=' && chars.peek() == Some(&'=') {
                chars.next();
            }
            operator = match ch {
                '=' => Some(AttributeOperator::Exact),
                '~' => Some(AttributeOperator::Includes),
                '^' => Some(AttributeOperator::Prefix),
                '$' => Some(AttributeOperator::Suffix),
                '*' => Some(AttributeOperator::Substring),
                _ => None,
            };
            skip_whitespace(chars);
            let mut buffer = String::new();
            match chars.peek().copied() {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    for ch in chars.by_ref() {
                        if ch == quote {
                            break;
                        }
                        buffer.push(ch);
                    }
                }
                _ => {
                    while let Some(&ch) = chars.peek() {
                        if ch.is_whitespace() || ch == ']' {
                            break;
                        }
                        buffer.push(ch);
                        chars.next();
                    }
                }
            }
            value = Some(buffer);
        }
    }
    // Skip until ']'
    for ch in chars.by_ref() {
        if ch == ']' {
            break;
        }
    }

    (!name.is_empty()).then_some(AttributeSelector {
        name,
        operator,
        value,
    })
}

/// Parse a compound selector string, e.g. "div.red#header[disabled][data-type~=\"main\"]"
pub fn parse_compound_selector(selector: &str) -> CompoundSelector {
    let mut compound = CompoundSelector::default();
    let mut chars = selector.chars().peekable();

    if chars
        .peek()
        .is_some_and(|ch| ch.is_alphabetic() || *ch == '*')
    {
        let tag = take_name(&mut chars);
        if tag != "*" {
            compound.tag = Some(tag);
        }
    }

    while let Some(ch) = chars.next() {
        match ch {
            '#' => {
                let id = take_name(&mut chars);
                if !id.is_empty() {
                    compound.id = Some(id);
                }
            }
            '.' => {
                let class = take_name(&mut chars);
                if !class.is_empty() {
                    compound.classes.insert(class);
                }
            }
            '[' => compound.attributes.extend(parse_attribute(&mut chars)),
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                }
                let pseudo = take_name(&mut chars);
                if !pseudo.is_empty() {
                    compound.pseudo.push(pseudo);
                }
            }
            _ => {}
        }
    }

    compound
}

/// Parse a complex selector string (e.g. "div.red > p#header + span.foo").
/// Assumes tokens are separated by whitespace.
pub fn parse_complex_selector(selector: &str) -> Option<ComplexSelector> {
    let mut tokens = selector.split_whitespace();
    let mut key = parse_compound_selector(tokens.next()?);
    let mut ancestors = Vec::new();
    let mut combinator = Combinator::Descendant;

    for token in tokens {
        match token {
            ">" => combinator = Combinator::Child,
            "+" => combinator = Combinator::AdjacentSibling,
            "~" => combinator = Combinator::GeneralSibling,
            _ => {
                let previous = std::mem::replace(&mut key, parse_compound_selector(token));
                ancestors.push((std::mem::replace(&mut combinator, Combinator::Descendant), previous));
            }
        }
    }
    ancestors.reverse();
    Some(ComplexSelector { key, ancestors })
}

/// ------------------------------
/// 2. Specificity & Matching
/// ------------------------------

/// Compute specificity for a compound selector as (id_count, class+attribute_count, tag_count)
pub fn compute_specificity(compound: &CompoundSelector) -> (u32, u32, u32) {
    let id_count = u32::from(compound.id.is_some());
    let class_count = (compound.classes.len() + compound.attributes.len() + compound.pseudo.len()) as u32;
    let tag_count = u32::from(compound.tag.is_some());
    (id_count, class_count, tag_count)
}

/// Compute specificity for a complex selector by summing key and ancestors.
pub fn compute_complex_specificity(selector: &ComplexSelector) -> (u32, u32, u32) {
    selector
        .ancestors
        .iter()
        .map(|(_, compound)| compute_specificity(compound))
        .fold(compute_specificity(&selector.key), |acc, spec| {
            (acc.0 + spec.0, acc.1 + spec.1, acc.2 + spec.2)
        })
}

/// Returns true if the component matches the compound selector.
/// Checks tag, id, classes, and attribute conditions.
pub fn matches_compound(component: &Component, compound: &CompoundSelector) -> bool {
    if !compound.pseudo.is_empty() {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if !component.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if component.id() != Some(id.as_str()) {
            return false;
        }
    }
    let classes: HashSet<&str> = component.classes().collect();
    if !compound.classes.iter().all(|c| classes.contains(c.as_str())) {
        return false;
    }
    compound.attributes.iter().all(|attr| {
        let Some(actual) = component.attribute(&attr.name) else {
            return false;
        };
        let Some(expected) = &attr.value else {
            return true;
        };
        match attr.operator {
            Some(AttributeOperator::Exact) => actual == expected,
            Some(AttributeOperator::Includes) => actual.split_whitespace().any(|w| w == expected),
            Some(AttributeOperator::Prefix) => actual.starts_with(expected.as_str()),
            Some(AttributeOperator::Suffix) => actual.ends_with(expected.as_str()),
            Some(AttributeOperator::Substring) => actual.contains(expected.as_str()),
            None => true,
        }
    })
}

/// A detached component has no tree around it, so only selectors without
/// ancestor parts can match it.
pub fn matches_selector(component: &Component, selector: &ComplexSelector) -> bool {
    selector.ancestors.is_empty() && matches_compound(component, &selector.key)
}

/// ------------------------------
/// 3. Rule Resolution
/// ------------------------------

/// Finds the rule being edited and the rules it inherits from.
pub trait RuleResolver {
    /// The single best rule for `component` at the breakpoint `media`.
    fn resolve(
        &self,
        rules: &RuleSet,
        component: &Component,
        media: Option<MediaQuery>,
    ) -> Option<RuleId>;

    /// Rules for the same selector at broader breakpoints, nearest first.
    fn ancestors(&self, rules: &RuleSet, rule: RuleId) -> Vec<RuleId>;
}

/// Resolves rules by selector matching and specificity, breakpoints by width.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssRuleResolver;

impl RuleResolver for CssRuleResolver {
    fn resolve(
        &self,
        rules: &RuleSet,
        component: &Component,
        media: Option<MediaQuery>,
    ) -> Option<RuleId> {
        rules
            .iter()
            .filter(|(_, rule)| rule.media == media)
            .filter_map(|(id, rule)| {
                let selector = parse_complex_selector(&rule.selector)?;
                matches_selector(component, &selector)
                    .then(|| (compute_complex_specificity(&selector), id))
            })
            // Equal specificity: the later rule wins
            .max()
            .map(|(_, id)| id)
    }

    fn ancestors(&self, rules: &RuleSet, rule: RuleId) -> Vec<RuleId> {
        let Some(target) = rules.get(rule) else {
            return Vec::new();
        };
        let Some(media) = target.media else {
            return Vec::new();
        };
        let selector = target.selector.trim();

        let mut candidates: Vec<((bool, u32), RuleId)> = rules
            .iter()
            .filter(|(id, other)| *id != rule && other.selector.trim() == selector)
            .filter_map(|(id, other)| match other.media {
                None => Some(((true, 0), id)),
                Some(other_media) if media.is_narrower_than(&other_media) => {
                    let distance = match media.condition {
                        MediaCondition::MaxWidth => other_media.width_px - media.width_px,
                        MediaCondition::MinWidth => media.width_px - other_media.width_px,
                    };
                    Some(((false, distance), id))
                }
                Some(_) => None,
            })
            .collect();

        // Nearest breakpoint first; for duplicates keep the latest rule only
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        candidates.dedup_by_key(|(breadth, _)| *breadth);
        candidates.into_iter().map(|(_, id)| id).collect()
    }
}
