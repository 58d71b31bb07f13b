//! A typed model of CSS declarations for style editors.
//!
//! Properties project the declarations of one selected rule into editable
//! structured values:
//!
//! - simple properties hold one value,
//! - composite properties split a shorthand such as `padding` into its parts,
//! - stack properties split a comma-separated list such as `box-shadow` into layers.
//!
//! Edits go the other way and come back as style patches for the rule.
//! Missing declarations are read from the same selector at broader
//! breakpoints. [`Editor`] wires the model to an in-memory stylesheet.

pub mod device;
pub mod dom;
pub mod editor;
pub mod error;
pub mod manager;
pub mod property;
pub mod style;

pub use device::{Device, DeviceManager};
pub use dom::Component;
pub use editor::{Editor, EditorConfig};
pub use error::{Error, Result};
pub use manager::{Sector, StyleManager, StyleTarget};
pub use property::{
    HasValueOptions, Layer, Property, PropertyConfig, PropertyEdit, PropertyType, SectorConfig,
    ValueOrigin,
};
pub use style::blaze_css::{RuleId, RuleSet};
pub use style::owned_css::{CssRule, MediaCondition, MediaQuery, Style, StylePatch, StyleRule};
