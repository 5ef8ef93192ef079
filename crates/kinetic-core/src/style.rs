//! Style records produced by animation style functions

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single style property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Px { px: f64 },
    Text(String),
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Px { px } => write!(f, "{}px", px),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

/// Pixel length helper
pub fn px(value: f64) -> StyleValue {
    StyleValue::Px { px: value }
}

/// Ordered set of style properties for one surface at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(BTreeMap<String, StyleValue>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<StyleValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.0.get(name)
    }

    /// Numeric value of a property, whether unitless or in pixels
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            StyleValue::Number(n) | StyleValue::Px { px: n } => Some(*n),
            StyleValue::Text(_) => None,
        }
    }

    /// Pixel length of a property; unitless numbers don't count
    pub fn px(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            StyleValue::Px { px } => Some(*px),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

/// `translate(xpx, ypx)` transform fragment
pub fn translate(x: f64, y: f64) -> String {
    format!("translate({}px, {}px)", x, y)
}

/// `scale(s)` transform fragment
pub fn scale(s: f64) -> String {
    format!("scale({})", s)
}
