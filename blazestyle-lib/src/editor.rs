//! An editing session: stylesheet, devices, selection and style manager.
//!
//! Every change that can move the style target (selection, device, external
//! rule mutation) re-synchronizes the style manager before returning.

use crate::device::DeviceManager;
use crate::dom::Component;
use crate::error::{Error, Result};
use crate::manager::{Sector, StyleManager};
use crate::property::{Property, PropertyEdit, SectorConfig};
use crate::style::blaze_css::{RuleId, RuleSet};
use crate::style::owned_css::{CssRule, MediaCondition, Style, StyleRule};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// `max-width` (desktop first) or `min-width` (mobile first) breakpoints.
    #[serde(default)]
    pub media_condition: MediaCondition,
}

#[derive(Debug, Default)]
pub struct Editor {
    css: RuleSet,
    devices: DeviceManager,
    selected: Option<Component>,
    style_manager: StyleManager,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Editor {
            css: RuleSet::new(),
            devices: DeviceManager::new(config.media_condition),
            selected: None,
            style_manager: StyleManager::new(),
        }
    }

    pub fn css(&self) -> &RuleSet {
        &self.css
    }

    pub fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    pub fn selected(&self) -> Option<&Component> {
        self.selected.as_ref()
    }

    pub fn style_manager(&self) -> &StyleManager {
        &self.style_manager
    }

    /// Re-bind the style manager to the current selection and device.
    pub fn sync(&mut self) -> Result<()> {
        self.style_manager
            .update_from_selection(&self.css, &self.devices, self.selected.as_ref())
    }

    pub fn add_rules(&mut self, css: &str) -> Result<Vec<RuleId>> {
        let ids = self.css.add_rules(css)?;
        self.sync()?;
        Ok(ids)
    }

    pub fn add_rule(&mut self, rule: CssRule) -> Result<RuleId> {
        let id = self.css.add_rule(rule);
        self.sync()?;
        Ok(id)
    }

    /// Replace every declaration of a rule, as an external change would.
    pub fn set_rule_style(&mut self, id: RuleId, style: Style) -> Result<()> {
        self.css
            .get_mut(id)
            .ok_or(Error::NoTarget)?
            .set_style(style);
        self.sync()
    }

    pub fn set_selected(&mut self, component: Option<Component>) -> Result<()> {
        self.selected = component;
        self.sync()
    }

    pub fn select_device(&mut self, id: &str) -> Result<()> {
        self.devices.select(id)?;
        self.sync()
    }

    /// Add (or merge) a sector; its properties are read from the current target.
    pub fn add_sector(&mut self, config: SectorConfig) -> Result<&Sector> {
        let id = config.id.clone();
        self.style_manager.add_sector(config)?;
        self.style_manager.refresh(&self.css)?;
        self.style_manager
            .sector(&id)
            .ok_or(Error::UnknownSector(id))
    }

    pub fn property(&self, sector: &str, name: &str) -> Option<&Property> {
        self.style_manager.property(sector, name)
    }

    /// Direct access for hook and mode changes; call [`Editor::sync`] afterwards
    /// to re-read values that depend on them.
    pub fn property_mut(&mut self, sector: &str, name: &str) -> Option<&mut Property> {
        self.style_manager.property_mut(sector, name)
    }

    pub fn edit(&mut self, sector: &str, property: &str, edit: PropertyEdit) -> Result<()> {
        self.style_manager
            .edit(&mut self.css, sector, property, edit)
    }

    pub fn select_layer(&mut self, sector: &str, property: &str, index: usize) -> Result<()> {
        self.style_manager.select_layer(sector, property, index)
    }

    pub fn to_css(&self) -> String {
        self.css.to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyConfig;
    use crate::style::owned_css::style_from;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_resyncs() {
        let mut editor = Editor::default();
        let rule = editor.add_rules(".cls { width: 10px; }").unwrap()[0];
        editor
            .add_sector(SectorConfig::new("dim", [PropertyConfig::simple("width")]))
            .unwrap();
        assert!(editor.style_manager().target().is_none());

        editor
            .set_selected(Some(Component::from_selector("div.cls")))
            .unwrap();
        let width = editor.property("dim", "width").unwrap();
        assert_eq!(width.full_value().unwrap(), "10px");

        editor
            .set_rule_style(rule, style_from([("width", "20px")]))
            .unwrap();
        let width = editor.property("dim", "width").unwrap();
        assert_eq!(width.full_value().unwrap(), "20px");

        editor.edit("dim", "width", PropertyEdit::value("30px")).unwrap();
        assert!(editor.to_css().contains("width: 30px"));
    }

    #[test]
    fn test_unknown_device() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.select_device("watch"),
            Err(Error::UnknownDevice(_))
        ));
    }
}
