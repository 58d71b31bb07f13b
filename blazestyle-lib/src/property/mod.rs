//! Typed style properties bound to CSS declarations.
//!
//! A [`Property`] is a projection of the declarations of the selected rule
//! (and, for missing declarations, of its broader-breakpoint parents).
//! Reading goes through [`Property::refresh`]; every edit returns the
//! [`StylePatch`] to merge into the selected rule.

pub mod builtin;
pub mod composite;
pub mod config;
pub mod separator;
pub mod stack;

use crate::error::{Error, Result};
use crate::style::owned_css::{Style, StylePatch};
use separator::Separator;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub use composite::CompositeProperty;
pub use config::{sectors_from_json, FromStyle, PropertyConfig, PropertyType, SectorConfig};
pub use stack::{Layer, StackProperty};

/// Sub-property name => value.
pub type PropValues = BTreeMap<String, String>;

/// Where the current value of a property was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrigin {
    #[default]
    Unset,
    /// Declared on the selected rule.
    Own,
    /// Declared on the n-th parent rule (0 is the nearest).
    Parent(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HasValueOptions {
    /// Ignore values inherited from parent rules.
    pub no_parent: bool,
}

impl HasValueOptions {
    pub fn no_parent() -> Self {
        HasValueOptions { no_parent: true }
    }
}

/// The declarations of the selected rule and of its parents, nearest parent first.
#[derive(Debug, Clone)]
pub struct TargetStyles<'a> {
    pub target: &'a Style,
    pub parents: Vec<&'a Style>,
}

impl<'a> TargetStyles<'a> {
    pub fn new(target: &'a Style, parents: Vec<&'a Style>) -> Self {
        TargetStyles { target, parents }
    }

    pub fn sources(&self) -> impl Iterator<Item = (ValueOrigin, &'a Style)> + '_ {
        std::iter::once((ValueOrigin::Own, self.target)).chain(
            self.parents
                .iter()
                .enumerate()
                .map(|(i, style)| (ValueOrigin::Parent(i), *style)),
        )
    }

    /// First source for which `read` finds a value. The nearest source wins,
    /// values are never merged across sources.
    pub fn resolve<T>(
        &self,
        mut read: impl FnMut(&'a Style) -> Result<Option<T>>,
    ) -> Result<Option<(T, ValueOrigin)>> {
        for (origin, style) in self.sources() {
            if let Some(value) = read(style)? {
                return Ok(Some((value, origin)));
            }
        }
        Ok(None)
    }
}

/// A declaration counts only when it holds something; `""` is a cleared one.
pub(crate) fn declared<'s>(style: &'s Style, name: &str) -> Option<&'s str> {
    style
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Passed to custom `fromStyle` hooks.
#[derive(Debug, Clone, Copy)]
pub struct StyleContext<'a> {
    pub property: &'a str,
    /// Separator between the parts of one value (or of one layer).
    pub separator: &'a Separator,
    /// Separator between layers.
    pub separator_layers: &'a Separator,
}

type PropsFromStyleFn = dyn Fn(&Style, &StyleContext<'_>) -> anyhow::Result<Option<PropValues>>;
type LayersFromStyleFn =
    dyn Fn(&Style, &StyleContext<'_>) -> anyhow::Result<Option<Vec<PropValues>>>;
type ToStyleFn = dyn Fn(&PropValues) -> anyhow::Result<Style>;

/// Custom parser of a composite value.
#[derive(Clone)]
pub struct PropsFromStyle(Rc<PropsFromStyleFn>);

impl PropsFromStyle {
    pub fn new(
        f: impl Fn(&Style, &StyleContext<'_>) -> anyhow::Result<Option<PropValues>> + 'static,
    ) -> Self {
        PropsFromStyle(Rc::new(f))
    }

    pub fn call(&self, style: &Style, ctx: &StyleContext<'_>) -> anyhow::Result<Option<PropValues>> {
        (self.0)(style, ctx)
    }
}

/// Custom parser of a stack value into layers.
#[derive(Clone)]
pub struct LayersFromStyle(Rc<LayersFromStyleFn>);

impl LayersFromStyle {
    pub fn new(
        f: impl Fn(&Style, &StyleContext<'_>) -> anyhow::Result<Option<Vec<PropValues>>> + 'static,
    ) -> Self {
        LayersFromStyle(Rc::new(f))
    }

    pub fn call(
        &self,
        style: &Style,
        ctx: &StyleContext<'_>,
    ) -> anyhow::Result<Option<Vec<PropValues>>> {
        (self.0)(style, ctx)
    }
}

/// Custom formatter of sub-values (a composite, or one stack layer) into declarations.
#[derive(Clone)]
pub struct ToStyle(Rc<ToStyleFn>);

impl ToStyle {
    pub fn new(f: impl Fn(&PropValues) -> anyhow::Result<Style> + 'static) -> Self {
        ToStyle(Rc::new(f))
    }

    pub fn call(&self, values: &PropValues) -> anyhow::Result<Style> {
        (self.0)(values)
    }
}

impl fmt::Debug for PropsFromStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PropsFromStyle(..)")
    }
}

impl fmt::Debug for LayersFromStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LayersFromStyle(..)")
    }
}

impl fmt::Debug for ToStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ToStyle(..)")
    }
}

/// A leaf property: one name, one string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleProperty {
    name: String,
    default_value: String,
    value: String,
    origin: ValueOrigin,
}

impl SimpleProperty {
    pub fn new(name: impl Into<String>) -> Self {
        SimpleProperty {
            name: name.into(),
            default_value: String::new(),
            value: String::new(),
            origin: ValueOrigin::Unset,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value as read or edited; `""` when there is none.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn origin(&self) -> ValueOrigin {
        self.origin
    }

    /// The value, or the default when there is none.
    pub fn full_value(&self) -> &str {
        if self.value.is_empty() {
            &self.default_value
        } else {
            &self.value
        }
    }

    pub fn has_value(&self, opts: HasValueOptions) -> bool {
        !self.value.is_empty()
            && match self.origin {
                ValueOrigin::Own => true,
                ValueOrigin::Parent(_) => !opts.no_parent,
                ValueOrigin::Unset => false,
            }
    }

    pub(crate) fn set_resolved(&mut self, value: String, origin: ValueOrigin) {
        self.origin = if value.is_empty() {
            ValueOrigin::Unset
        } else {
            origin
        };
        self.value = value;
    }

    /// Re-read the declaration from the target rule, or from the nearest parent defining it.
    pub fn refresh(&mut self, styles: &TargetStyles<'_>) {
        let found = styles
            .sources()
            .find_map(|(origin, style)| declared(style, &self.name).map(|v| (v.to_string(), origin)));
        match found {
            Some((value, origin)) => self.set_resolved(value, origin),
            None => self.reset(),
        }
    }

    pub fn reset(&mut self) {
        self.set_resolved(String::new(), ValueOrigin::Unset);
    }

    pub fn style(&self) -> Style {
        Style::from([(self.name.clone(), self.value.clone())])
    }

    pub fn up_value(&mut self, value: impl Into<String>) -> StylePatch {
        self.set_resolved(value.into(), ValueOrigin::Own);
        StylePatch::new(self.style())
    }

    pub fn clear(&mut self) -> StylePatch {
        self.reset();
        StylePatch::new(self.style())
    }
}

/// One change requested on a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyEdit {
    /// Replace the whole CSS value.
    Value(String),
    /// Change one sub-property; on a stack, only in the selected layer.
    SubValue { property: String, value: String },
    AddLayer {
        values: PropValues,
        at: Option<usize>,
    },
    RemoveLayer(usize),
    Clear,
}

impl PropertyEdit {
    pub fn value(value: impl Into<String>) -> Self {
        PropertyEdit::Value(value.into())
    }

    pub fn sub_value(property: impl Into<String>, value: impl Into<String>) -> Self {
        PropertyEdit::SubValue {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// The closed set of property kinds.
#[derive(Debug, Clone)]
pub enum Property {
    Simple(SimpleProperty),
    Composite(CompositeProperty),
    Stack(StackProperty),
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Property::Simple(p) => p.name(),
            Property::Composite(p) => p.name(),
            Property::Stack(p) => p.name(),
        }
    }

    pub fn kind(&self) -> PropertyType {
        match self {
            Property::Simple(_) => PropertyType::Simple,
            Property::Composite(_) => PropertyType::Composite,
            Property::Stack(_) => PropertyType::Stack,
        }
    }

    pub fn has_value(&self, opts: HasValueOptions) -> bool {
        match self {
            Property::Simple(p) => p.has_value(opts),
            Property::Composite(p) => p.has_value(opts),
            Property::Stack(p) => p.has_value(opts),
        }
    }

    /// The effective CSS value: the simple value (or its default), the
    /// shorthand of a composite, the layer list of a stack.
    pub fn full_value(&self) -> Result<String> {
        match self {
            Property::Simple(p) => Ok(p.full_value().to_string()),
            Property::Composite(p) => p.full_value(),
            Property::Stack(p) => p.full_value(),
        }
    }

    /// Sub-properties of a composite or stack; empty for a simple property.
    pub fn properties(&self) -> &[SimpleProperty] {
        match self {
            Property::Simple(_) => &[],
            Property::Composite(p) => p.properties(),
            Property::Stack(p) => p.properties(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&SimpleProperty> {
        self.properties().iter().find(|p| p.name() == name)
    }

    /// The declarations this property currently stands for.
    pub fn style(&self) -> Result<Style> {
        match self {
            Property::Simple(p) => Ok(p.style()),
            Property::Composite(p) => p.style_from_props(),
            Property::Stack(p) => p.style_from_layers(),
        }
    }

    pub fn refresh(&mut self, styles: &TargetStyles<'_>) -> Result<()> {
        match self {
            Property::Simple(p) => {
                p.refresh(styles);
                Ok(())
            }
            Property::Composite(p) => p.refresh(styles),
            Property::Stack(p) => p.refresh(styles),
        }
    }

    /// Drop the projected values (no rule is selected).
    pub fn reset(&mut self) {
        match self {
            Property::Simple(p) => p.reset(),
            Property::Composite(p) => p.reset(),
            Property::Stack(p) => p.reset(),
        }
    }

    pub fn up_value(&mut self, value: &str) -> Result<StylePatch> {
        match self {
            Property::Simple(p) => Ok(p.up_value(value)),
            Property::Composite(p) => p.up_value(value),
            Property::Stack(p) => p.up_value(value),
        }
    }

    pub fn clear(&mut self) -> StylePatch {
        match self {
            Property::Simple(p) => p.clear(),
            Property::Composite(p) => p.clear(),
            Property::Stack(p) => p.clear(),
        }
    }

    /// Apply `edit` and return the patch for the selected rule, if the edit produced one.
    pub fn apply_edit(&mut self, edit: PropertyEdit) -> Result<Option<StylePatch>> {
        match edit {
            PropertyEdit::Value(value) => self.up_value(&value).map(Some),
            PropertyEdit::Clear => Ok(Some(self.clear())),
            PropertyEdit::SubValue { property, value } => match self {
                Property::Simple(_) => Err(Error::UnknownProperty(property)),
                Property::Composite(p) => p.up_sub_value(&property, &value).map(Some),
                Property::Stack(p) => p.up_sub_value(&property, &value),
            },
            PropertyEdit::AddLayer { values, at } => {
                self.as_stack_mut()?.add_layer(values, at).map(Some)
            }
            PropertyEdit::RemoveLayer(index) => self.as_stack_mut()?.remove_layer_at(index).map(Some),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleProperty> {
        match self {
            Property::Simple(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeProperty> {
        match self {
            Property::Composite(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeProperty> {
        match self {
            Property::Composite(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_stack(&self) -> Option<&StackProperty> {
        match self {
            Property::Stack(p) => Some(p),
            _ => None,
        }
    }

    fn as_stack_mut(&mut self) -> Result<&mut StackProperty> {
        match self {
            Property::Stack(p) => Ok(p),
            other => Err(Error::NotAStack(other.name().to_string())),
        }
    }

    /// The stack variant, for layer selection and hook changes.
    pub fn stack_mut(&mut self) -> Option<&mut StackProperty> {
        self.as_stack_mut().ok()
    }
}
