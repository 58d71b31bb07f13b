use blazestyle_lib::property::sectors_from_json;
use blazestyle_lib::{
    Component, Editor, HasValueOptions, Property, PropertyConfig, PropertyEdit, SectorConfig,
};
use clap::Parser;
use log::info;
use std::error::Error;
use std::fs;

const BLAZESTYLE_INTRO: &str = r#"
        ____  __                 _____ __        __
       / __ )/ /___ _____  ___  / ___// /___  __/ /__
      / __  / / __ `/_  / / _ \ \__ \/ __/ / / / / _ \
     / /_/ / / /_/ / / /_/  __/___/ / /_/ /_/ / /  __/
    /_____/_/\__,_/ /___/\___//____/\__/\__, /_/\___/
                                       /____/
    BlazeStyle - structured CSS properties for style editors
"#;

#[derive(Parser)]
#[command(name = "BlazeStyle")]
#[command(about = "Inspect and edit the style of a selector as structured properties")]
struct Args {
    /// Stylesheet to load.
    #[arg(long)]
    css: String,

    /// Compound selector of the element to edit, e.g. `div.cls#main`.
    #[arg(long)]
    select: String,

    /// Active device: desktop, tablet, mobileLandscape, mobilePortrait.
    #[arg(long, default_value = "desktop")]
    device: String,

    /// JSON file with the sector configuration.
    #[arg(long)]
    sectors: Option<String>,

    /// Edit to apply: `property=value`, `property.sub=value`,
    /// or `property[layer].sub=value` for stacks. Repeatable.
    #[arg(long = "set")]
    edits: Vec<String>,
}

/// One `--set` argument.
#[derive(Debug, PartialEq)]
struct SetArg {
    property: String,
    layer: Option<usize>,
    sub: Option<String>,
    value: String,
}

fn parse_set(arg: &str) -> Result<SetArg, String> {
    let (target, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("`{}`: expected property=value", arg))?;
    let (head, sub) = match target.split_once('.') {
        Some((head, sub)) => (head, Some(sub.trim().to_string())),
        None => (target, None),
    };
    let (property, layer) = match head.split_once('[') {
        Some((property, rest)) => {
            let index = rest
                .strip_suffix(']')
                .and_then(|i| i.trim().parse().ok())
                .ok_or_else(|| format!("`{}`: bad layer index", arg))?;
            (property, Some(index))
        }
        None => (head, None),
    };
    Ok(SetArg {
        property: property.trim().to_string(),
        layer,
        sub,
        value: value.trim().to_string(),
    })
}

fn sector(id: &str, name: &str, props: &[&str]) -> SectorConfig {
    SectorConfig::new(id, props.iter().map(|p| PropertyConfig::simple(*p))).with_name(name)
}

fn default_sectors() -> Vec<SectorConfig> {
    vec![
        sector("general", "General", &["display", "position", "top", "right", "left", "bottom"]),
        sector("dimension", "Dimension", &["width", "height", "margin", "padding"]),
        sector("typography", "Typography", &["font-family", "font-size", "color", "text-shadow"]),
        sector(
            "decorations",
            "Decorations",
            &["background-color", "border-radius", "border", "box-shadow", "background"],
        ),
        sector("extra", "Extra", &["opacity", "transition"]),
    ]
}

fn print_property(prop: &Property) -> Result<(), blazestyle_lib::Error> {
    let origin = match prop.as_simple() {
        Some(simple) => format!("{:?}", simple.origin()),
        None if prop.has_value(HasValueOptions::no_parent()) => "Own".to_string(),
        None if prop.has_value(HasValueOptions::default()) => "Parent".to_string(),
        None => "Unset".to_string(),
    };
    println!("  {} [{:?}, {}]: {}", prop.name(), prop.kind(), origin, prop.full_value()?);

    if let Some(stack) = prop.as_stack() {
        for (i, layer) in stack.layers().iter().enumerate() {
            let values: Vec<String> = layer
                .values()
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            println!("    layer {}: {}", i, values.join(" "));
        }
    } else {
        for sub in prop.properties() {
            println!("    {}: {}", sub.name(), sub.full_value());
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let css = fs::read_to_string(&args.css)?;
    let sectors = match &args.sectors {
        Some(path) => sectors_from_json(&fs::read_to_string(path)?)?,
        None => default_sectors(),
    };

    let mut editor = Editor::default();
    let ids = editor.add_rules(&css)?;
    info!("loaded {} rules from {}", ids.len(), args.css);
    for sector in sectors {
        editor.add_sector(sector)?;
    }
    editor.select_device(&args.device)?;
    editor.set_selected(Some(Component::from_selector(&args.select)))?;

    if editor.style_manager().target().is_none() {
        return Err(format!("no rule matches `{}` on `{}`", args.select, args.device).into());
    }

    for sector in editor.style_manager().sectors() {
        println!("{}", sector.name());
        for prop in sector.properties() {
            print_property(prop)?;
        }
    }

    for edit in &args.edits {
        let set = parse_set(edit)?;
        let sector = editor
            .style_manager()
            .sectors()
            .iter()
            .find(|s| s.property(&set.property).is_some())
            .map(|s| s.id().to_string())
            .ok_or_else(|| format!("unknown property `{}`", set.property))?;

        if let Some(layer) = set.layer {
            editor.select_layer(&sector, &set.property, layer)?;
        }
        let change = match set.sub {
            Some(sub) => PropertyEdit::sub_value(sub, set.value),
            None => PropertyEdit::value(set.value),
        };
        editor.edit(&sector, &set.property, change)?;
    }

    if !args.edits.is_empty() {
        println!();
        print!("{}", editor.to_css());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    println!("{}", BLAZESTYLE_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        assert_eq!(
            parse_set("box-shadow[1].box-shadow-blur = 5px").unwrap(),
            SetArg {
                property: "box-shadow".to_string(),
                layer: Some(1),
                sub: Some("box-shadow-blur".to_string()),
                value: "5px".to_string(),
            }
        );
        assert_eq!(parse_set("color=red").unwrap().sub, None);
        assert!(parse_set("color").is_err());
        assert!(parse_set("box-shadow[x].h=1").is_err());
    }
}
