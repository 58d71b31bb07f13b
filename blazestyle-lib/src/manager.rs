//! The style manager: sectors of properties bound to the selected rule.
//!
//! The manager is either idle (nothing selected, every property reset) or
//! bound to a [`StyleTarget`]. Binding is recomputed from scratch by
//! [`StyleManager::update_from_selection`]; every edit merges its patch into
//! the target rule and then re-reads all properties from the rule store.

use crate::device::DeviceManager;
use crate::dom::Component;
use crate::error::{Error, Result};
use crate::property::{Property, PropertyEdit, SectorConfig, TargetStyles};
use crate::style::blaze_css::{RuleId, RuleSet};
use crate::style::css_matcher::{CssRuleResolver, RuleResolver};
use crate::style::owned_css::StyleRule;
use log::{debug, trace};

/// A named group of properties.
#[derive(Debug, Clone)]
pub struct Sector {
    id: String,
    name: Option<String>,
    properties: Vec<Property>,
}

impl Sector {
    pub fn from_config(config: SectorConfig) -> Result<Self> {
        let properties = config
            .properties
            .into_iter()
            .map(Property::from_config)
            .collect::<Result<_>>()?;
        Ok(Sector {
            id: config.id,
            name: config.name,
            properties,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, the id when none was configured.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name() == name)
    }

    /// Later properties replace earlier ones with the same name.
    fn merge(&mut self, other: Sector) {
        if other.name.is_some() {
            self.name = other.name;
        }
        for prop in other.properties {
            match self.property_mut(prop.name()) {
                Some(existing) => *existing = prop,
                None => self.properties.push(prop),
            }
        }
    }
}

/// The rule being edited and the rules it inherits from, nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTarget {
    pub rule: RuleId,
    pub parents: Vec<RuleId>,
}

#[derive(Debug)]
pub struct StyleManager<R = CssRuleResolver> {
    sectors: Vec<Sector>,
    resolver: R,
    target: Option<StyleTarget>,
}

impl Default for StyleManager {
    fn default() -> Self {
        StyleManager::new()
    }
}

impl StyleManager {
    pub fn new() -> Self {
        StyleManager::with_resolver(CssRuleResolver)
    }
}

impl<R: RuleResolver> StyleManager<R> {
    pub fn with_resolver(resolver: R) -> Self {
        StyleManager {
            sectors: Vec::new(),
            resolver,
            target: None,
        }
    }

    /// Add a sector, or merge its properties into the sector with the same id.
    /// New properties start unbound; call [`StyleManager::refresh`] to read them.
    pub fn add_sector(&mut self, config: SectorConfig) -> Result<&Sector> {
        let sector = Sector::from_config(config)?;
        let index = match self.sectors.iter().position(|s| s.id == sector.id) {
            Some(index) => {
                self.sectors[index].merge(sector);
                index
            }
            None => {
                self.sectors.push(sector);
                self.sectors.len() - 1
            }
        };
        Ok(&self.sectors[index])
    }

    pub fn sector(&self, id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn remove_sector(&mut self, id: &str) -> Option<Sector> {
        let index = self.sectors.iter().position(|s| s.id == id)?;
        Some(self.sectors.remove(index))
    }

    pub fn property(&self, sector: &str, name: &str) -> Option<&Property> {
        self.sector(sector)?.property(name)
    }

    pub fn property_mut(&mut self, sector: &str, name: &str) -> Option<&mut Property> {
        self.sectors
            .iter_mut()
            .find(|s| s.id == sector)?
            .property_mut(name)
    }

    fn lookup_mut(&mut self, sector: &str, name: &str) -> Result<&mut Property> {
        self.sectors
            .iter_mut()
            .find(|s| s.id == sector)
            .ok_or_else(|| Error::UnknownSector(sector.to_string()))?
            .property_mut(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    pub fn target(&self) -> Option<&StyleTarget> {
        self.target.as_ref()
    }

    /// The rule currently edited.
    pub fn last_selected(&self) -> Option<RuleId> {
        self.target.as_ref().map(|t| t.rule)
    }

    pub fn selected_parents(&self) -> &[RuleId] {
        self.target
            .as_ref()
            .map(|t| t.parents.as_slice())
            .unwrap_or_default()
    }

    /// Rebind to the rule of `component` at the active device and re-read every property.
    pub fn update_from_selection(
        &mut self,
        rules: &RuleSet,
        devices: &DeviceManager,
        component: Option<&Component>,
    ) -> Result<()> {
        let media = devices.selected_media();
        self.target = component
            .and_then(|component| self.resolver.resolve(rules, component, media))
            .map(|rule| StyleTarget {
                rule,
                parents: self.resolver.ancestors(rules, rule),
            });

        match &self.target {
            Some(target) => debug!(
                "style target: rule #{} ({} parents) on device `{}`",
                target.rule.index(),
                target.parents.len(),
                devices.selected().id
            ),
            None => debug!("style target cleared"),
        }
        self.refresh(rules)
    }

    /// Re-read every property from the bound rule and its parents.
    pub fn refresh(&mut self, rules: &RuleSet) -> Result<()> {
        let Some(target) = self.target.clone() else {
            self.reset_all();
            return Ok(());
        };
        let Some(style) = rules.style(target.rule) else {
            self.target = None;
            self.reset_all();
            return Ok(());
        };
        let parents = target
            .parents
            .iter()
            .filter_map(|id| rules.style(*id))
            .collect();
        let styles = TargetStyles::new(style, parents);

        for prop in self.sectors.iter_mut().flat_map(|s| s.properties.iter_mut()) {
            prop.refresh(&styles)?;
        }
        Ok(())
    }

    fn reset_all(&mut self) {
        for prop in self.sectors.iter_mut().flat_map(|s| s.properties.iter_mut()) {
            prop.reset();
        }
    }

    /// Apply `edit` to a property and write the result into the target rule.
    ///
    /// An edit either lands completely or not at all: if the edit or the
    /// re-read that follows the merge fails, every property and the rule are
    /// restored.
    pub fn edit(
        &mut self,
        rules: &mut RuleSet,
        sector: &str,
        property: &str,
        edit: PropertyEdit,
    ) -> Result<()> {
        let rule_id = self.last_selected().ok_or(Error::NoTarget)?;
        let original = rules.get(rule_id).cloned().ok_or(Error::NoTarget)?;

        // The re-read after the merge touches every sector
        let sectors = self.sectors.clone();
        let patch = match self.lookup_mut(sector, property)?.apply_edit(edit) {
            Ok(patch) => patch,
            Err(err) => {
                self.sectors = sectors;
                return Err(err);
            }
        };
        let Some(patch) = patch.filter(|patch| !patch.is_empty()) else {
            return Ok(());
        };

        trace!(
            "rule #{} <- {} {:?}",
            rule_id.index(),
            property,
            patch.declarations
        );
        if let Some(rule) = rules.get_mut(rule_id) {
            rule.add_style(&patch);
        }
        if let Err(err) = self.refresh(rules) {
            if let Some(rule) = rules.get_mut(rule_id) {
                *rule = original;
            }
            self.sectors = sectors;
            return Err(err);
        }
        Ok(())
    }

    /// Route the next sub-property edits of a stack to the layer at `index`.
    pub fn select_layer(&mut self, sector: &str, property: &str, index: usize) -> Result<()> {
        let prop = self.lookup_mut(sector, property)?;
        let name = prop.name().to_string();
        prop.stack_mut()
            .ok_or(Error::NotAStack(name))?
            .select_layer_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{FromStyle, HasValueOptions, PropertyConfig, PropsFromStyle, ValueOrigin};
    use crate::style::owned_css::{style_from, CssRule, MediaCondition, MediaQuery};
    use pretty_assertions::assert_eq;

    fn setup() -> (RuleSet, DeviceManager, StyleManager, Component) {
        let mut rules = RuleSet::new();
        rules.add_rule(CssRule::new(".cls").with_style(style_from([("color", "red")])));
        let mut manager = StyleManager::new();
        manager
            .add_sector(SectorConfig::new(
                "general",
                [PropertyConfig::simple("color"), PropertyConfig::simple("width")],
            ))
            .unwrap();
        let component = Component::new("div").with_class("cls");
        (rules, DeviceManager::default(), manager, component)
    }

    #[test]
    fn test_bind_and_idle() {
        let (rules, devices, mut manager, component) = setup();
        manager
            .update_from_selection(&rules, &devices, Some(&component))
            .unwrap();
        assert_eq!(manager.last_selected().map(RuleId::index), Some(0));
        let color = manager.property("general", "color").unwrap();
        assert_eq!(color.full_value().unwrap(), "red");

        manager.update_from_selection(&rules, &devices, None).unwrap();
        assert_eq!(manager.target(), None);
        assert!(!manager
            .property("general", "color")
            .unwrap()
            .has_value(HasValueOptions::default()));
    }

    #[test]
    fn test_edit_requires_target() {
        let (mut rules, _, mut manager, _) = setup();
        assert!(matches!(
            manager.edit(&mut rules, "general", "color", PropertyEdit::value("blue")),
            Err(Error::NoTarget)
        ));
    }

    #[test]
    fn test_inherits_from_broader_breakpoint() {
        let (mut rules, mut devices, mut manager, component) = setup();
        let tablet = rules.add_rule(
            CssRule::new(".cls")
                .with_media(MediaQuery::new(MediaCondition::MaxWidth, 992))
                .with_style(style_from([("width", "10px")])),
        );
        devices.select("tablet").unwrap();
        manager
            .update_from_selection(&rules, &devices, Some(&component))
            .unwrap();
        assert_eq!(manager.last_selected(), Some(tablet));
        assert_eq!(manager.selected_parents().len(), 1);
        let base = manager.selected_parents()[0];

        let color = manager.property("general", "color").unwrap().as_simple().unwrap();
        assert_eq!(color.origin(), ValueOrigin::Parent(0));

        manager
            .edit(&mut rules, "general", "color", PropertyEdit::value("blue"))
            .unwrap();
        assert_eq!(rules.style(tablet).unwrap()["color"], "blue");
        assert_eq!(rules.get(tablet).unwrap().partial(), Some(false));
        assert_eq!(rules.style(base).unwrap()["color"], "red");
        let color = manager.property("general", "color").unwrap().as_simple().unwrap();
        assert_eq!(color.origin(), ValueOrigin::Own);
    }

    #[test]
    fn test_failed_edit_leaves_state() {
        let (mut rules, devices, mut manager, component) = setup();
        manager
            .add_sector(SectorConfig::new("extra", [PropertyConfig::simple("padding")]))
            .unwrap();
        manager
            .update_from_selection(&rules, &devices, Some(&component))
            .unwrap();
        let rule = manager.last_selected().unwrap();
        let before = rules.style(rule).unwrap().clone();
        assert!(matches!(
            manager.edit(&mut rules, "extra", "padding", PropertyEdit::sub_value("padding-middle", "1px")),
            Err(Error::UnknownProperty(_))
        ));
        assert!(matches!(
            manager.edit(&mut rules, "extra", "padding", PropertyEdit::RemoveLayer(0)),
            Err(Error::NotAStack(_))
        ));
        assert!(matches!(
            manager.select_layer("extra", "padding", 0),
            Err(Error::NotAStack(_))
        ));
        assert_eq!(rules.style(rule).unwrap(), &before);
    }

    #[test]
    fn test_edit_rolls_back_when_refresh_fails() {
        let (mut rules, devices, mut manager, component) = setup();
        let no_percent = PropsFromStyle::new(|style, _| {
            if style.values().any(|v| v.contains('%')) {
                anyhow::bail!("no percent");
            }
            Ok(None)
        });
        manager
            .add_sector(SectorConfig::new(
                "extra",
                [PropertyConfig::simple("padding").with_from_style(FromStyle::Props(no_percent))],
            ))
            .unwrap();
        manager
            .update_from_selection(&rules, &devices, Some(&component))
            .unwrap();
        let rule = manager.last_selected().unwrap();
        let before = rules.get(rule).unwrap().clone();

        assert!(matches!(
            manager.edit(&mut rules, "extra", "padding", PropertyEdit::sub_value("padding-top", "5%")),
            Err(Error::FromStyle { .. })
        ));
        assert_eq!(rules.get(rule).unwrap(), &before);
        let padding = manager.property("extra", "padding").unwrap();
        assert_eq!(padding.properties()[0].value(), "");
        assert!(!padding.has_value(HasValueOptions::default()));
        let color = manager.property("general", "color").unwrap();
        assert_eq!(color.full_value().unwrap(), "red");

        manager
            .edit(&mut rules, "extra", "padding", PropertyEdit::sub_value("padding-top", "5px"))
            .unwrap();
        assert_eq!(rules.style(rule).unwrap()["padding"], "5px 0 0");
    }

    #[test]
    fn test_sectors_merge_by_id() {
        let (_, _, mut manager, _) = setup();
        manager
            .add_sector(
                SectorConfig::new("general", [PropertyConfig::simple("margin")]).with_name("General"),
            )
            .unwrap();
        assert_eq!(manager.sectors().len(), 1);
        let sector = manager.sector("general").unwrap();
        assert_eq!(sector.name(), "General");
        assert_eq!(sector.properties().len(), 3);
        assert!(manager.remove_sector("general").is_some());
        assert!(manager.property("general", "color").is_none());
    }
}
