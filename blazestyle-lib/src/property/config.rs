use super::builtin::builtin;
use super::separator::Separator;
use super::{
    CompositeProperty, LayersFromStyle, Property, PropsFromStyle, SimpleProperty, StackProperty,
    ToStyle,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Simple,
    Composite,
    Stack,
}

/// A custom parser; its flavour must match the property type.
#[derive(Debug, Clone)]
pub enum FromStyle {
    Props(PropsFromStyle),
    Layers(LayersFromStyle),
}

/// Setup-time description of one property.
///
/// Unset fields fall back to the `extend`ed built-in, then to the defaults
/// of the typed property. A bare name (`"padding"`) in a JSON property list
/// is the same as `{ "property": "padding" }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfig {
    pub property: String,
    pub extend: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PropertyType>,
    #[serde(default, deserialize_with = "names_or_configs")]
    pub properties: Vec<PropertyConfig>,
    pub detached: Option<bool>,
    pub separator: Option<String>,
    pub separator_layers: Option<String>,
    #[serde(rename = "default")]
    pub default_value: Option<String>,
    #[serde(skip)]
    pub from_style: Option<FromStyle>,
    #[serde(skip)]
    pub to_style: Option<ToStyle>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PropertyEntry {
    Name(String),
    Config(PropertyConfig),
}

fn names_or_configs<'de, D>(deserializer: D) -> std::result::Result<Vec<PropertyConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<PropertyEntry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            PropertyEntry::Name(name) => PropertyConfig::simple(name),
            PropertyEntry::Config(config) => config,
        })
        .collect())
}

impl PropertyConfig {
    fn of_kind(property: impl Into<String>, kind: Option<PropertyType>) -> Self {
        PropertyConfig {
            property: property.into(),
            kind,
            ..Default::default()
        }
    }

    /// A name only: a built-in definition if one exists, a simple property otherwise.
    pub fn simple(property: impl Into<String>) -> Self {
        PropertyConfig::of_kind(property, None)
    }

    pub fn composite(
        property: impl Into<String>,
        properties: impl IntoIterator<Item = PropertyConfig>,
    ) -> Self {
        PropertyConfig {
            properties: properties.into_iter().collect(),
            ..PropertyConfig::of_kind(property, Some(PropertyType::Composite))
        }
    }

    pub fn stack(
        property: impl Into<String>,
        properties: impl IntoIterator<Item = PropertyConfig>,
    ) -> Self {
        PropertyConfig {
            properties: properties.into_iter().collect(),
            ..PropertyConfig::of_kind(property, Some(PropertyType::Stack))
        }
    }

    /// Reuse the built-in `base`, overriding what this config sets.
    pub fn extend(property: impl Into<String>, base: impl Into<String>) -> Self {
        PropertyConfig {
            extend: Some(base.into()),
            ..PropertyConfig::of_kind(property, None)
        }
    }

    pub fn with_type(mut self, kind: PropertyType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_detached(mut self, detached: bool) -> Self {
        self.detached = Some(detached);
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_separator_layers(mut self, separator_layers: impl Into<String>) -> Self {
        self.separator_layers = Some(separator_layers.into());
        self
    }

    pub fn with_from_style(mut self, from_style: FromStyle) -> Self {
        self.from_style = Some(from_style);
        self
    }

    pub fn with_to_style(mut self, to_style: ToStyle) -> Self {
        self.to_style = Some(to_style);
        self
    }

    /// Merge with the `extend`ed built-in. A config without a type that
    /// names a built-in extends it implicitly.
    pub fn resolved(self) -> Result<PropertyConfig> {
        let base = match &self.extend {
            Some(name) => Some(
                builtin(name)
                    .ok_or_else(|| Error::Config(format!("`{}` extends unknown `{}`", self.property, name)))?,
            ),
            None if self.kind.is_none() => builtin(&self.property),
            None => None,
        };
        let Some(base) = base else {
            return Ok(self);
        };

        Ok(PropertyConfig {
            property: if self.property.is_empty() {
                base.property
            } else {
                self.property
            },
            extend: None,
            kind: self.kind.or(base.kind),
            properties: if self.properties.is_empty() {
                base.properties
            } else {
                self.properties
            },
            detached: self.detached.or(base.detached),
            separator: self.separator.or(base.separator),
            separator_layers: self.separator_layers.or(base.separator_layers),
            default_value: self.default_value.or(base.default_value),
            from_style: self.from_style.or(base.from_style),
            to_style: self.to_style.or(base.to_style),
        })
    }

    fn leaves(&self) -> Result<Vec<SimpleProperty>> {
        if self.properties.is_empty() {
            return Err(Error::Config(format!(
                "`{}` has no sub-properties",
                self.property
            )));
        }
        self.properties
            .iter()
            .map(|sub| match sub.kind {
                None | Some(PropertyType::Simple) => Ok(SimpleProperty::new(sub.property.clone())
                    .with_default(sub.default_value.clone().unwrap_or_default())),
                Some(_) => Err(Error::Config(format!(
                    "sub-property `{}` of `{}` must be simple",
                    sub.property, self.property
                ))),
            })
            .collect()
    }
}

impl Property {
    /// Build a typed property from its configuration.
    pub fn from_config(config: PropertyConfig) -> Result<Property> {
        let config = config.resolved()?;
        if config.property.trim().is_empty() {
            return Err(Error::Config("property name is empty".to_string()));
        }
        let detached = config.detached.unwrap_or(false);

        match config.kind.unwrap_or_default() {
            PropertyType::Simple => {
                if config.from_style.is_some() || config.to_style.is_some() {
                    return Err(Error::Config(format!(
                        "simple property `{}` takes no style hooks",
                        config.property
                    )));
                }
                Ok(Property::Simple(
                    SimpleProperty::new(config.property)
                        .with_default(config.default_value.unwrap_or_default()),
                ))
            }
            PropertyType::Composite => {
                let mut prop = CompositeProperty::new(config.property.clone(), config.leaves()?)
                    .with_detached(detached);
                if let Some(separator) = &config.separator {
                    prop = prop.with_separator(Separator::new(separator));
                }
                if let Some(separator_layers) = &config.separator_layers {
                    prop = prop.with_separator_layers(Separator::new(separator_layers));
                }
                match config.from_style {
                    Some(FromStyle::Props(from_style)) => prop.set_from_style(Some(from_style)),
                    Some(FromStyle::Layers(_)) => {
                        return Err(Error::Config(format!(
                            "composite `{}` was given a layer parser",
                            config.property
                        )))
                    }
                    None => {}
                }
                prop.set_to_style(config.to_style);
                Ok(Property::Composite(prop))
            }
            PropertyType::Stack => {
                let mut prop = StackProperty::new(config.property.clone(), config.leaves()?)
                    .with_detached(detached);
                if let Some(separator) = &config.separator {
                    prop = prop.with_separator(Separator::new(separator));
                }
                if let Some(separator_layers) = &config.separator_layers {
                    prop = prop.with_separator_layers(Separator::new(separator_layers));
                }
                match config.from_style {
                    Some(FromStyle::Layers(from_style)) => prop.set_from_style(Some(from_style)),
                    Some(FromStyle::Props(_)) => {
                        return Err(Error::Config(format!(
                            "stack `{}` was given a composite parser",
                            config.property
                        )))
                    }
                    None => {}
                }
                prop.set_to_style(config.to_style);
                Ok(Property::Stack(prop))
            }
        }
    }
}

/// A named group of properties, as shown in one panel of the style manager.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectorConfig {
    pub id: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "names_or_configs")]
    pub properties: Vec<PropertyConfig>,
}

impl SectorConfig {
    pub fn new(id: impl Into<String>, properties: impl IntoIterator<Item = PropertyConfig>) -> Self {
        SectorConfig {
            id: id.into(),
            name: None,
            properties: properties.into_iter().collect(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Decode a JSON array of sectors.
pub fn sectors_from_json(json: &str) -> Result<Vec<SectorConfig>> {
    Ok(serde_json::from_str(json)?)
}
