//! Ready-made definitions reachable through `extend`, or by naming a
//! property without giving its type.

use super::config::PropertyConfig;

fn sub(name: &str, default_value: &str) -> PropertyConfig {
    PropertyConfig::simple(name).with_default(default_value)
}

fn sides(property: &str) -> PropertyConfig {
    let subs = ["top", "right", "bottom", "left"]
        .iter()
        .map(|side| sub(&format!("{}-{}", property, side), "0"));
    PropertyConfig::composite(property, subs)
}

pub fn builtin(name: &str) -> Option<PropertyConfig> {
    let config = match name {
        "padding" | "margin" => sides(name),
        "border-radius" => PropertyConfig::composite(
            name,
            ["top-left", "top-right", "bottom-right", "bottom-left"]
                .iter()
                .map(|corner| sub(&format!("border-{}-radius", corner), "0")),
        ),
        "border" => PropertyConfig::composite(
            name,
            [
                sub("border-width", "0"),
                sub("border-style", "solid"),
                sub("border-color", "black"),
            ],
        ),
        "box-shadow" => PropertyConfig::stack(
            name,
            [
                sub("box-shadow-h", "0"),
                sub("box-shadow-v", "0"),
                sub("box-shadow-blur", "0"),
                sub("box-shadow-spread", "0"),
                sub("box-shadow-color", "black"),
                sub("box-shadow-type", ""),
            ],
        ),
        "text-shadow" => PropertyConfig::stack(
            name,
            [
                sub("text-shadow-h", "0"),
                sub("text-shadow-v", "0"),
                sub("text-shadow-blur", "0"),
                sub("text-shadow-color", "black"),
            ],
        ),
        "transition" => PropertyConfig::stack(
            name,
            [
                sub("transition-property", "width"),
                sub("transition-duration", "2s"),
                sub("transition-timing-function", "ease"),
            ],
        ),
        "background" => PropertyConfig::stack(
            name,
            [
                sub("background-image", "none"),
                sub("background-repeat", "repeat"),
                sub("background-position", "left top"),
                sub("background-attachment", "scroll"),
                sub("background-size", "auto"),
            ],
        )
        .with_detached(true),
        _ => return None,
    };
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyType;

    #[test]
    fn test_every_name_resolves() {
        let names = [
            "padding",
            "margin",
            "border-radius",
            "border",
            "box-shadow",
            "text-shadow",
            "transition",
            "background",
        ];
        for name in names {
            let config = builtin(name).unwrap();
            assert_eq!(config.property, name);
            assert!(!config.properties.is_empty());
        }
        assert!(builtin("color").is_none());
    }

    #[test]
    fn test_background_is_detached_stack() {
        let config = builtin("background").unwrap();
        assert_eq!(config.kind, Some(PropertyType::Stack));
        assert_eq!(config.detached, Some(true));
        assert_eq!(config.properties[2].default_value.as_deref(), Some("left top"));
    }
}
