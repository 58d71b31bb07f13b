pub mod blaze_css;
pub mod css_matcher;
pub mod owned_css;
