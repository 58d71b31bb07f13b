use super::separator::Separator;
use super::{
    declared, HasValueOptions, LayersFromStyle, PropValues, SimpleProperty, StyleContext,
    TargetStyles, ToStyle, ValueOrigin,
};
use crate::error::{Error, Result};
use crate::style::owned_css::{Style, StylePatch};
use log::trace;

/// One repetition of a stack value, e.g. one shadow of a `box-shadow` list.
/// Layers have no identity: they are addressed by their current position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    values: PropValues,
}

impl Layer {
    pub fn new(values: PropValues) -> Self {
        Layer { values }
    }

    pub fn values(&self) -> &PropValues {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// A comma-separated list of layers, each layer a group of sub-values.
#[derive(Debug, Clone)]
pub struct StackProperty {
    name: String,
    properties: Vec<SimpleProperty>,
    layers: Vec<Layer>,
    selected: Option<usize>,
    origin: ValueOrigin,
    detached: bool,
    separator: Separator,
    separator_layers: Separator,
    from_style: Option<LayersFromStyle>,
    to_style: Option<ToStyle>,
}

impl StackProperty {
    pub fn new(name: impl Into<String>, properties: Vec<SimpleProperty>) -> Self {
        StackProperty {
            name: name.into(),
            properties,
            layers: Vec::new(),
            selected: None,
            origin: ValueOrigin::Unset,
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

    pub fn set_detached(&mut self, detached: bool) {
        self.detached = detached;
    }

    pub fn set_from_style(&mut self, from_style: Option<LayersFromStyle>) {
        self.from_style = from_style;
    }

    pub fn set_to_style(&mut self, to_style: Option<ToStyle>) {
        self.to_style = to_style;
    }

    pub fn origin(&self) -> ValueOrigin {
        self.origin
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn has_value(&self, opts: HasValueOptions) -> bool {
        !self.layers.is_empty()
            && match self.origin {
                ValueOrigin::Own => true,
                ValueOrigin::Parent(_) => !opts.no_parent,
                ValueOrigin::Unset => false,
            }
    }

    pub fn selected_layer_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|i| self.layers.get(i))
    }

    /// Route sub-property edits to the layer at `index`.
    pub fn select_layer_at(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.selected = Some(index);
        self.sync_properties();
        Ok(())
    }

    pub fn deselect_layer(&mut self) {
        self.selected = None;
        self.sync_properties();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.layers.len() {
            return Err(Error::LayerOutOfRange {
                property: self.name.clone(),
                index,
                len: self.layers.len(),
            });
        }
        Ok(())
    }

    /// Sub-properties mirror the selected layer.
    fn sync_properties(&mut self) {
        let layer = self.selected.and_then(|i| self.layers.get(i));
        let origin = self.origin;
        for prop in &mut self.properties {
            let value = layer
                .and_then(|l| l.get(prop.name()))
                .unwrap_or_default()
                .to_string();
            prop.set_resolved(value, origin);
        }
    }

    fn context(&self) -> StyleContext<'_> {
        StyleContext {
            property: &self.name,
            separator: &self.separator,
            separator_layers: &self.separator_layers,
        }
    }

    /// Parse a style map into layer values.
    ///
    /// The main declaration gives the baseline layers; each sub-property
    /// declaration then overrides its value layer by layer and may append
    /// layers holding only that value. `None` when nothing is declared, or
    /// when a combined stack has an empty main declaration.
    pub fn layers_from_style(&self, style: &Style) -> Result<Option<Vec<PropValues>>> {
        if let Some(from_style) = &self.from_style {
            return from_style
                .call(style, &self.context())
                .map_err(|source| Error::FromStyle {
                    property: self.name.clone(),
                    source,
                });
        }

        let main = style.get(&self.name).map(|v| v.trim());
        if !self.detached && main == Some("") {
            return Ok(None);
        }
        let main = main.filter(|v| !v.is_empty());
        let overrides: Vec<(&str, &str)> = self
            .properties
            .iter()
            .filter_map(|p| declared(style, p.name()).map(|v| (p.name(), v)))
            .collect();
        if main.is_none() && overrides.is_empty() {
            return Ok(None);
        }

        let mut layers: Vec<PropValues> = main
            .map(|value| {
                self.separator_layers
                    .split(value)
                    .iter()
                    .map(|group| self.split_layer(group))
                    .collect()
            })
            .unwrap_or_default();

        for (name, value) in overrides {
            for (i, group) in self.separator_layers.split(value).into_iter().enumerate() {
                match layers.get_mut(i) {
                    Some(layer) => {
                        layer.insert(name.to_string(), group);
                    }
                    None => layers.push(PropValues::from([(name.to_string(), group)])),
                }
            }
        }

        Ok(Some(layers))
    }

    /// Positional split of one layer; missing parts are empty, surplus
    /// tokens stay together in the last part.
    fn split_layer(&self, group: &str) -> PropValues {
        let count = self.properties.len();
        let mut tokens = self.separator.split(group);
        if count > 0 && tokens.len() > count {
            let rest = tokens.split_off(count - 1);
            tokens.push(self.separator.join(&rest));
        }
        tokens.resize(count, String::new());
        self.properties
            .iter()
            .map(|p| p.name().to_string())
            .zip(tokens)
            .collect()
    }

    fn layer_value(&self, layer: &Layer) -> Result<String> {
        if let Some(to_style) = &self.to_style {
            let mut custom = to_style
                .call(layer.values())
                .map_err(|source| Error::ToStyle {
                    property: self.name.clone(),
                    source,
                })?;
            return Ok(custom.remove(&self.name).unwrap_or_default());
        }
        let parts = self
            .properties
            .iter()
            .map(|p| {
                layer
                    .get(p.name())
                    .filter(|v| !v.is_empty())
                    .unwrap_or(p.default_value())
            })
            .filter(|v| !v.is_empty());
        Ok(self.separator.join(parts))
    }

    /// The full patch for the main declaration and every sub-property.
    pub fn style_from_layers(&self) -> Result<Style> {
        let mut style = Style::from([(self.name.clone(), String::new())]);
        for prop in &self.properties {
            style.insert(prop.name().to_string(), String::new());
        }

        if self.detached {
            for prop in &self.properties {
                let values: Vec<&str> = self
                    .layers
                    .iter()
                    .map(|l| l.get(prop.name()).unwrap_or_default())
                    .collect();
                if values.iter().any(|v| !v.is_empty()) {
                    style.insert(prop.name().to_string(), self.separator_layers.join(values));
                }
            }
            return Ok(style);
        }

        let layers = self
            .layers
            .iter()
            .map(|layer| self.layer_value(layer))
            .collect::<Result<Vec<_>>>()?;
        style.insert(self.name.clone(), self.separator_layers.join(layers));
        Ok(style)
    }

    /// The layer list as combined mode would write it.
    pub fn full_value(&self) -> Result<String> {
        let layers = self
            .layers
            .iter()
            .map(|layer| self.layer_value(layer))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.separator_layers.join(layers))
    }

    fn set_layers(&mut self, layers: Vec<PropValues>, origin: ValueOrigin) -> Result<()> {
        if self.from_style.is_some() {
            let unknown = layers
                .iter()
                .flat_map(|values| values.keys())
                .find(|k| self.property(k).is_none());
            if let Some(key) = unknown {
                return Err(Error::UnexpectedShape {
                    property: self.name.clone(),
                    key: key.clone(),
                });
            }
        }
        self.layers = layers.into_iter().map(Layer::new).collect();
        self.origin = if self.layers.is_empty() {
            ValueOrigin::Unset
        } else {
            origin
        };
        self.selected = self.selected.filter(|i| *i < self.layers.len());
        self.sync_properties();
        Ok(())
    }

    /// Rebuild the layers from the target rule, or from the nearest parent holding any.
    pub fn refresh(&mut self, styles: &TargetStyles<'_>) -> Result<()> {
        let resolved = styles.resolve(|style| {
            Ok(self
                .layers_from_style(style)?
                .filter(|layers| !layers.is_empty()))
        })?;
        match resolved {
            Some((layers, origin)) => self.set_layers(layers, origin),
            None => {
                self.reset();
                Ok(())
            }
        }
    }

    pub fn reset(&mut self) {
        self.layers.clear();
        self.selected = None;
        self.origin = ValueOrigin::Unset;
        self.sync_properties();
    }

    fn patch(&self) -> Result<StylePatch> {
        let patch = StylePatch::new(self.style_from_layers()?);
        trace!("{} -> {:?}", self.name, patch.declarations);
        Ok(patch)
    }

    /// Insert a layer at `at` (default: last). Missing sub-values are empty.
    pub fn add_layer(&mut self, values: PropValues, at: Option<usize>) -> Result<StylePatch> {
        let index = at.unwrap_or(self.layers.len()).min(self.layers.len());
        let layer: PropValues = self
            .properties
            .iter()
            .map(|p| {
                let value = values.get(p.name()).cloned().unwrap_or_default();
                (p.name().to_string(), value)
            })
            .collect();
        self.layers.insert(index, Layer::new(layer));
        if let Some(selected) = self.selected.as_mut() {
            if *selected >= index {
                *selected += 1;
            }
        }
        self.origin = ValueOrigin::Own;
        self.patch()
    }

    pub fn remove_layer_at(&mut self, index: usize) -> Result<StylePatch> {
        self.check_index(index)?;
        self.layers.remove(index);
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        self.origin = if self.layers.is_empty() {
            ValueOrigin::Unset
        } else {
            ValueOrigin::Own
        };
        self.sync_properties();
        self.patch()
    }

    /// Edit a sub-value of the selected layer and re-serialize every layer.
    /// Without a selected layer there is nothing to write.
    pub fn up_sub_value(&mut self, name: &str, value: &str) -> Result<Option<StylePatch>> {
        if self.property(name).is_none() {
            return Err(Error::UnknownProperty(name.to_string()));
        }
        let Some(index) = self.selected.filter(|i| *i < self.layers.len()) else {
            return Ok(None);
        };
        self.layers[index]
            .values
            .insert(name.to_string(), value.to_string());
        self.origin = ValueOrigin::Own;
        self.sync_properties();
        self.patch().map(Some)
    }

    /// Replace every layer with the parsed layer list `value`.
    pub fn up_value(&mut self, value: &str) -> Result<StylePatch> {
        let layers = self
            .layers_from_style(&Style::from([(self.name.clone(), value.to_string())]))?
            .unwrap_or_default();
        self.set_layers(layers, ValueOrigin::Own)?;
        self.patch()
    }

    /// Drop every layer and empty every declaration.
    pub fn clear(&mut self) -> StylePatch {
        self.reset();
        let mut style = Style::from([(self.name.clone(), String::new())]);
        for prop in &self.properties {
            style.insert(prop.name().to_string(), String::new());
        }
        StylePatch::new(style)
    }
}
