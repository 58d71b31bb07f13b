use super::separator::Separator;
use super::{
    declared, HasValueOptions, PropValues, PropsFromStyle, SimpleProperty, StyleContext,
    TargetStyles, ToStyle, ValueOrigin,
};
use crate::error::{Error, Result};
use crate::style::owned_css::{Style, StylePatch};

/// One CSS value split into named parts, e.g. `padding` into its four sides.
///
/// In combined mode the parts serialize into the shorthand declaration and
/// every longhand is emptied; detached, each part is its own declaration
/// and the shorthand is emptied.
#[derive(Debug, Clone)]
pub struct CompositeProperty {
    name: String,
    properties: Vec<SimpleProperty>,
    detached: bool,
    separator: Separator,
    separator_layers: Separator,
    from_style: Option<PropsFromStyle>,
    to_style: Option<ToStyle>,
}

impl CompositeProperty {
    pub fn new(name: impl Into<String>, properties: Vec<SimpleProperty>) -> Self {
        CompositeProperty {
            name: name.into(),
            properties,
            detached: false,
            separator: Separator::whitespace(),
            separator_layers: Separator::comma(),
            from_style: None,
            to_style: None,
        }
    }

    pub fn with_detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_separator_layers(mut self, separator_layers: Separator) -> Self {
        self.separator_layers = separator_layers;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[SimpleProperty] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&SimpleProperty> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn detached(&self) -> bool {
        self.detached
    }

    /// Switches the serialization mode; values are untouched.
    pub fn set_detached(&mut self, detached: bool) {
        self.detached = detached;
    }

    pub fn separator(&self) -> &Separator {
        &self.separator
    }

    pub fn set_from_style(&mut self, from_style: Option<PropsFromStyle>) {
        self.from_style = from_style;
    }

    pub fn set_to_style(&mut self, to_style: Option<ToStyle>) {
        self.to_style = to_style;
    }

    /// Where the values came from: the origin of the first part holding one.
    pub fn origin(&self) -> ValueOrigin {
        self.properties
            .iter()
            .map(|p| p.origin())
            .find(|o| *o != ValueOrigin::Unset)
            .unwrap_or_default()
    }

    pub fn has_value(&self, opts: HasValueOptions) -> bool {
        self.properties.iter().any(|p| p.has_value(opts))
    }

    /// Current value of every part, keyed by sub-property name.
    pub fn values(&self) -> PropValues {
        self.properties
            .iter()
            .map(|p| (p.name().to_string(), p.value().to_string()))
            .collect()
    }

    fn context(&self) -> StyleContext<'_> {
        StyleContext {
            property: &self.name,
            separator: &self.separator,
            separator_layers: &self.separator_layers,
        }
    }

    /// Parse a style map into part values.
    ///
    /// `None` means the style holds neither the shorthand nor any longhand.
    /// Longhands override the parts derived from the shorthand.
    pub fn props_from_style(&self, style: &Style) -> Result<Option<PropValues>> {
        if let Some(from_style) = &self.from_style {
            return from_style
                .call(style, &self.context())
                .map_err(|source| Error::FromStyle {
                    property: self.name.clone(),
                    source,
                });
        }

        let shorthand = declared(style, &self.name);
        let longhands: Vec<Option<&str>> = self
            .properties
            .iter()
            .map(|p| declared(style, p.name()))
            .collect();
        if shorthand.is_none() && longhands.iter().all(Option::is_none) {
            return Ok(None);
        }

        let mut values = match shorthand {
            Some(value) => self.expand_shorthand(value),
            None => vec![String::new(); self.properties.len()],
        };
        for (value, longhand) in values.iter_mut().zip(&longhands) {
            if let Some(longhand) = longhand {
                *value = longhand.to_string();
            }
        }

        Ok(Some(
            self.properties
                .iter()
                .map(|p| p.name().to_string())
                .zip(values)
                .collect(),
        ))
    }

    /// Split a shorthand into exactly one value per part. Four parts follow
    /// the box rule (1 value: all sides, 2: vertical/horizontal, 3: top,
    /// horizontal, bottom); other arities are positional. Surplus tokens
    /// stay together in the last part.
    fn expand_shorthand(&self, value: &str) -> Vec<String> {
        let count = self.properties.len();
        let mut tokens = self.separator.split(value);
        if count > 0 && tokens.len() > count {
            let rest = tokens.split_off(count - 1);
            tokens.push(self.separator.join(&rest));
        }

        if count == 4 && (1..4).contains(&tokens.len()) {
            let picks: [usize; 4] = match tokens.len() {
                1 => [0, 0, 0, 0],
                2 => [0, 1, 0, 1],
                _ => [0, 1, 2, 1],
            };
            return picks.iter().map(|&i| tokens[i].clone()).collect();
        }

        tokens.resize(count, String::new());
        tokens
    }

    /// Shorthand text of the current parts; `""` when every part is empty.
    fn combined_value(&self) -> String {
        if self.properties.iter().all(|p| p.value().is_empty()) {
            return String::new();
        }
        let mut values: Vec<&str> = self.properties.iter().map(|p| p.full_value()).collect();
        if values.len() == 4 {
            let (top, right, bottom, left) = (values[0], values[1], values[2], values[3]);
            let keep = if right != left {
                4
            } else if top != bottom {
                3
            } else if top != right {
                2
            } else {
                1
            };
            values.truncate(keep);
        }
        values.retain(|v| !v.is_empty());
        self.separator.join(values)
    }

    /// The full patch for the shorthand and every longhand.
    pub fn style_from_props(&self) -> Result<Style> {
        let mut style = Style::new();
        style.insert(self.name.clone(), String::new());

        if self.detached {
            for prop in &self.properties {
                style.insert(prop.name().to_string(), prop.value().to_string());
            }
            return Ok(style);
        }

        for prop in &self.properties {
            style.insert(prop.name().to_string(), String::new());
        }
        match &self.to_style {
            Some(to_style) => {
                let custom = to_style
                    .call(&self.values())
                    .map_err(|source| Error::ToStyle {
                        property: self.name.clone(),
                        source,
                    })?;
                style.extend(custom);
            }
            None => {
                style.insert(self.name.clone(), self.combined_value());
            }
        }
        Ok(style)
    }

    /// The shorthand value as combined mode would write it, whatever the mode.
    pub fn full_value(&self) -> Result<String> {
        if !self.detached {
            return Ok(self.style_from_props()?.remove(&self.name).unwrap_or_default());
        }
        Ok(self.combined_value())
    }

    fn apply_values(&mut self, values: &PropValues, origin: ValueOrigin) -> Result<()> {
        if self.from_style.is_some() {
            if let Some(key) = values.keys().find(|k| self.property(k).is_none()) {
                return Err(Error::UnexpectedShape {
                    property: self.name.clone(),
                    key: key.clone(),
                });
            }
        }
        for prop in &mut self.properties {
            let value = values.get(prop.name()).cloned().unwrap_or_default();
            prop.set_resolved(value, origin);
        }
        Ok(())
    }

    /// Re-read the parts from the target rule, or from the nearest parent holding any.
    pub fn refresh(&mut self, styles: &TargetStyles<'_>) -> Result<()> {
        let resolved = styles.resolve(|style| {
            Ok(self
                .props_from_style(style)?
                .filter(|values| values.values().any(|v| !v.is_empty())))
        })?;
        match resolved {
            Some((values, origin)) => self.apply_values(&values, origin),
            None => {
                self.reset();
                Ok(())
            }
        }
    }

    pub fn reset(&mut self) {
        for prop in &mut self.properties {
            prop.reset();
        }
    }

    /// Edit one part and re-serialize the whole composite.
    pub fn up_sub_value(&mut self, name: &str, value: &str) -> Result<StylePatch> {
        let prop = self
            .properties
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;
        prop.set_resolved(value.to_string(), ValueOrigin::Own);
        Ok(StylePatch::new(self.style_from_props()?))
    }

    /// Replace the whole value with a shorthand text.
    pub fn up_value(&mut self, value: &str) -> Result<StylePatch> {
        let parsed = self
            .props_from_style(&Style::from([(self.name.clone(), value.to_string())]))?
            .unwrap_or_default();
        self.apply_values(&parsed, ValueOrigin::Own)?;
        Ok(StylePatch::new(self.style_from_props()?))
    }

    /// Empty the shorthand and every longhand, whatever the mode.
    pub fn clear(&mut self) -> StylePatch {
        self.reset();
        let mut style = Style::from([(self.name.clone(), String::new())]);
        for prop in &self.properties {
            style.insert(prop.name().to_string(), String::new());
        }
        StylePatch::new(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::style_from;
    use pretty_assertions::assert_eq;

    fn padding() -> CompositeProperty {
        let sides = ["top", "right", "bottom", "left"]
            .iter()
            .map(|side| SimpleProperty::new(format!("padding-{}", side)).with_default("0"))
            .collect();
        CompositeProperty::new("padding", sides)
    }

    fn refreshed(mut prop: CompositeProperty, style: &Style) -> CompositeProperty {
        prop.refresh(&TargetStyles::new(style, vec![])).unwrap();
        prop
    }

    #[test]
    fn test_shorthand_expansion() {
        let prop = padding();
        let parse = |value: &str| {
            prop.props_from_style(&style_from([("padding", value)]))
                .unwrap()
                .unwrap()
        };
        assert_eq!(
            parse("1px 2px 3px 4px"),
            style_from([
                ("padding-top", "1px"),
                ("padding-right", "2px"),
                ("padding-bottom", "3px"),
                ("padding-left", "4px"),
            ])
        );
        assert_eq!(
            parse("111px").values().collect::<Vec<_>>(),
            vec!["111px"; 4]
        );
        assert_eq!(
            parse("1px 2px 3px"),
            style_from([
                ("padding-top", "1px"),
                ("padding-right", "2px"),
                ("padding-bottom", "3px"),
                ("padding-left", "2px"),
            ])
        );
    }

    #[test]
    fn test_longhands_without_shorthand() {
        let prop = padding();
        assert_eq!(
            prop.props_from_style(&style_from([
                ("padding-right", "22%"),
                ("padding-bottom", "33px"),
            ]))
            .unwrap(),
            Some(style_from([
                ("padding-top", ""),
                ("padding-right", "22%"),
                ("padding-bottom", "33px"),
                ("padding-left", ""),
            ]))
        );
        assert_eq!(prop.props_from_style(&style_from([("color", "red")])).unwrap(), None);
        assert_eq!(
            prop.props_from_style(&style_from([("padding", ""), ("padding-top", "")]))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_round_trip_canonical_shorthands() {
        for value in ["1px", "1px 2px", "1px 2px 3px", "1px 2px 3px 4px", "0 auto"] {
            let prop = refreshed(padding(), &style_from([("padding", value)]));
            let style = prop.style_from_props().unwrap();
            assert_eq!(style["padding"], value);
            assert!(style
                .iter()
                .filter(|(k, _)| k.as_str() != "padding")
                .all(|(_, v)| v.is_empty()));
        }
    }

    #[test]
    fn test_positional_arity() {
        let border = CompositeProperty::new(
            "border",
            vec![
                SimpleProperty::new("border-width"),
                SimpleProperty::new("border-style"),
                SimpleProperty::new("border-color"),
            ],
        );
        assert_eq!(
            border
                .props_from_style(&style_from([("border", "1px solid rgba(0, 0, 0, .5) x")]))
                .unwrap(),
            Some(style_from([
                ("border-width", "1px"),
                ("border-style", "solid"),
                ("border-color", "rgba(0, 0, 0, .5) x"),
            ]))
        );
        assert_eq!(
            border
                .props_from_style(&style_from([("border", "2px")]))
                .unwrap(),
            Some(style_from([
                ("border-width", "2px"),
                ("border-style", ""),
                ("border-color", ""),
            ]))
        );
    }

    #[test]
    fn test_detached_toggle() {
        let mut prop = refreshed(
            padding().with_detached(true),
            &style_from([
                ("padding-top", "1px"),
                ("padding-right", "2px"),
                ("padding-bottom", "3px"),
                ("padding-left", "4px"),
            ]),
        );
        prop.set_detached(false);
        assert_eq!(
            prop.style_from_props().unwrap(),
            style_from([
                ("padding", "1px 2px 3px 4px"),
                ("padding-top", ""),
                ("padding-right", ""),
                ("padding-bottom", ""),
                ("padding-left", ""),
            ])
        );
        prop.set_detached(true);
        assert_eq!(
            prop.style_from_props().unwrap(),
            style_from([
                ("padding", ""),
                ("padding-top", "1px"),
                ("padding-right", "2px"),
                ("padding-bottom", "3px"),
                ("padding-left", "4px"),
            ])
        );
    }

    #[test]
    fn test_combined_fills_gaps_with_defaults() {
        let mut prop = padding();
        let patch = prop.up_sub_value("padding-top", "55%").unwrap();
        assert_eq!(patch.declarations["padding"], "55% 0 0");
        assert!(prop.has_value(HasValueOptions::no_parent()));
        assert!(!prop.property("padding-left").unwrap().has_value(HasValueOptions::default()));
    }

    #[test]
    fn test_up_value_parses_shorthand() {
        let mut prop = padding();
        let patch = prop.up_value("5px 10px").unwrap();
        assert_eq!(prop.property("padding-left").unwrap().value(), "10px");
        assert_eq!(patch.declarations["padding"], "5px 10px");
        assert!(!patch.partial);
    }

    #[test]
    fn test_hook_failures_propagate() {
        let mut prop = padding();
        prop.set_from_style(Some(PropsFromStyle::new(|_, _| {
            Err(anyhow::anyhow!("bad value"))
        })));
        assert!(matches!(
            prop.props_from_style(&Style::new()),
            Err(Error::FromStyle { .. })
        ));

        let mut prop = padding();
        prop.set_to_style(Some(ToStyle::new(|_| Err(anyhow::anyhow!("nope")))));
        assert!(matches!(
            prop.style_from_props(),
            Err(Error::ToStyle { .. })
        ));
    }

    #[test]
    fn test_unknown_key_from_hook() {
        let mut prop = padding();
        prop.set_from_style(Some(PropsFromStyle::new(|_, _| {
            Ok(Some(style_from([("padding-middle", "1px")])))
        })));
        let style = style_from([("padding", "1px")]);
        assert!(matches!(
            prop.refresh(&TargetStyles::new(&style, vec![])),
            Err(Error::UnexpectedShape { .. })
        ));
    }
}
