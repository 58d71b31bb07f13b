use crate::style::css_matcher::parse_compound_selector;

/// The element currently selected in the editor. Only what selector
/// matching needs is kept: the tag and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Component {
    pub fn new(tag: impl Into<String>) -> Self {
        Component {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// Build a component out of a compound selector, e.g. `div.cls#main[data-x="1"]`.
    /// A selector without a tag yields a `div`.
    pub fn from_selector(selector: &str) -> Self {
        let compound = parse_compound_selector(selector.trim());
        let mut component = Component::new(compound.tag.unwrap_or_else(|| "div".to_string()));
        if let Some(id) = compound.id {
            component = component.with_id(id);
        }
        let mut classes: Vec<_> = compound.classes.into_iter().collect();
        classes.sort();
        for class in classes {
            component = component.with_class(class);
        }
        for attr in compound.attributes {
            component = component.with_attribute(attr.name, attr.value.unwrap_or_default());
        }
        component
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if self.classes().any(|c| c == class) {
            return self;
        }
        let joined = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing, class),
            _ => class,
        };
        self = self.with_attribute("class", joined);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_selector() {
        let cmp = Component::from_selector("span.b.a#main[data-kind=\"card\"]");
        assert_eq!(cmp.tag, "span");
        assert_eq!(cmp.id(), Some("main"));
        assert_eq!(cmp.classes().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(cmp.attribute("data-kind"), Some("card"));
    }

    #[test]
    fn test_with_class_is_idempotent() {
        let cmp = Component::new("div").with_class("cls").with_class("cls");
        assert_eq!(cmp.attribute("class"), Some("cls"));
        assert_eq!(Component::from_selector(".cls").tag, "div");
    }
}
