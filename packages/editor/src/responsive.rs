//! # Responsive Values
//!
//! A responsive value holds a mandatory desktop value plus optional tablet
//! and mobile overrides. A missing override inherits from the next larger
//! viewport that has one:
//!
//! ```text
//! mobile → tablet → desktop
//! ```
//!
//! Resolution is pure and never fails. Objects that look responsive but lack
//! a `desktop` key are treated as plain values.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Preview viewport class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    /// Desktop: 1920x1080 (HD)
    #[default]
    Desktop,

    /// Tablet: 768x1024 (iPad)
    Tablet,

    /// Mobile: 375x667 (iPhone SE)
    Mobile,
}

impl Viewport {
    pub const ALL: [Viewport; 3] = [Viewport::Desktop, Viewport::Tablet, Viewport::Mobile];

    /// Preview frame dimensions (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Viewport::Desktop => (1920, 1080),
            Viewport::Tablet => (768, 1024),
            Viewport::Mobile => (375, 667),
        }
    }

    /// Viewports consulted when resolving, most specific first
    pub fn fallback_chain(&self) -> &'static [Viewport] {
        match self {
            Viewport::Desktop => &[Viewport::Desktop],
            Viewport::Tablet => &[Viewport::Tablet, Viewport::Desktop],
            Viewport::Mobile => &[Viewport::Mobile, Viewport::Tablet, Viewport::Desktop],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Viewport::Desktop => "desktop",
            Viewport::Tablet => "tablet",
            Viewport::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid viewport: {0}. Use: desktop, tablet, or mobile")]
pub struct ParseViewportError(pub String);

impl FromStr for Viewport {
    type Err = ParseViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Viewport::Desktop),
            "tablet" => Ok(Viewport::Tablet),
            "mobile" => Ok(Viewport::Mobile),
            other => Err(ParseViewportError(other.to_string())),
        }
    }
}

/// Per-viewport value with desktop always present
///
/// Only a JSON object with a `desktop` key (and at most `tablet`/`mobile`
/// besides) deserializes into one; arrays never do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsiveValue<T> {
    pub desktop: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tablet: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<T>,
}

impl<T> ResponsiveValue<T> {
    pub fn new(desktop: T) -> Self {
        Self {
            desktop,
            tablet: None,
            mobile: None,
        }
    }

    pub fn with_tablet(mut self, value: T) -> Self {
        self.tablet = Some(value);
        self
    }

    pub fn with_mobile(mut self, value: T) -> Self {
        self.mobile = Some(value);
        self
    }

    /// Value set exactly for `viewport`, without fallback
    pub fn get(&self, viewport: Viewport) -> Option<&T> {
        match viewport {
            Viewport::Desktop => Some(&self.desktop),
            Viewport::Tablet => self.tablet.as_ref(),
            Viewport::Mobile => self.mobile.as_ref(),
        }
    }

    /// Value in effect for `viewport`
    pub fn resolve(&self, viewport: Viewport) -> &T {
        viewport
            .fallback_chain()
            .iter()
            .find_map(|vp| self.get(*vp))
            .unwrap_or(&self.desktop)
    }

    /// Set the value for one viewport
    pub fn set(&mut self, viewport: Viewport, value: T) {
        match viewport {
            Viewport::Desktop => self.desktop = value,
            Viewport::Tablet => self.tablet = Some(value),
            Viewport::Mobile => self.mobile = Some(value),
        }
    }

    /// Drop an override so the viewport inherits again
    ///
    /// Desktop cannot be cleared; returns false in that case.
    pub fn clear(&mut self, viewport: Viewport) -> bool {
        match viewport {
            Viewport::Desktop => false,
            Viewport::Tablet => self.tablet.take().is_some(),
            Viewport::Mobile => self.mobile.take().is_some(),
        }
    }
}

const FIELDS: &[&str] = &["desktop", "tablet", "mobile"];

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ResponsiveValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ResponsiveVisitor(PhantomData))
    }
}

struct ResponsiveVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ResponsiveVisitor<T> {
    type Value = ResponsiveValue<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a `desktop` key")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut desktop = None;
        let mut tablet = None;
        let mut mobile = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "desktop" => {
                    if desktop.is_some() {
                        return Err(de::Error::duplicate_field("desktop"));
                    }
                    desktop = Some(map.next_value()?);
                }
                // null overrides count as absent
                "tablet" => tablet = map.next_value::<Option<T>>()?,
                "mobile" => mobile = map.next_value::<Option<T>>()?,
                other => return Err(de::Error::unknown_field(other, FIELDS)),
            }
        }

        Ok(ResponsiveValue {
            desktop: desktop.ok_or_else(|| <A::Error as de::Error>::missing_field("desktop"))?,
            tablet,
            mobile,
        })
    }
}

/// Resolve a raw JSON prop value for `viewport`
///
/// Any object with a `desktop` key is treated as responsive; `null` overrides
/// count as absent. Everything else is returned unchanged.
pub fn resolve_json(value: &Value, viewport: Viewport) -> &Value {
    let Some(object) = value.as_object() else {
        return value;
    };
    let Some(desktop) = object.get("desktop") else {
        return value;
    };

    viewport
        .fallback_chain()
        .iter()
        .filter_map(|vp| object.get(vp.as_str()))
        .find(|v| !v.is_null())
        .unwrap_or(desktop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mobile_falls_back_to_tablet() {
        let value = ResponsiveValue::new("3").with_tablet("2");
        assert_eq!(*value.resolve(Viewport::Mobile), "2");
        assert_eq!(*value.resolve(Viewport::Tablet), "2");
        assert_eq!(*value.resolve(Viewport::Desktop), "3");
    }

    #[test]
    fn test_mobile_falls_back_to_desktop() {
        let value = ResponsiveValue::new("3");
        assert_eq!(*value.resolve(Viewport::Mobile), "3");
        assert_eq!(*value.resolve(Viewport::Tablet), "3");
    }

    #[test]
    fn test_mobile_override_wins() {
        let value = ResponsiveValue::new(3).with_tablet(2).with_mobile(1);
        assert_eq!(*value.resolve(Viewport::Mobile), 1);
    }

    #[test]
    fn test_set_and_clear() {
        let mut value = ResponsiveValue::new("24px");
        value.set(Viewport::Mobile, "8px");
        assert_eq!(*value.resolve(Viewport::Mobile), "8px");

        assert!(value.clear(Viewport::Mobile));
        assert!(!value.clear(Viewport::Desktop));
        assert_eq!(*value.resolve(Viewport::Mobile), "24px");
    }

    #[test]
    fn test_resolve_json_plain_values_unchanged() {
        let scalar = json!("hello");
        assert_eq!(resolve_json(&scalar, Viewport::Mobile), &scalar);

        let object = json!({ "tablet": "2", "mobile": "1" });
        assert_eq!(resolve_json(&object, Viewport::Mobile), &object);
    }

    #[test]
    fn test_resolve_json_null_override_is_absent() {
        let value = json!({ "desktop": "3", "tablet": null, "mobile": null });
        assert_eq!(resolve_json(&value, Viewport::Mobile), &json!("3"));
    }

    #[test]
    fn test_null_override_deserializes_as_absent() {
        let value: ResponsiveValue<Value> =
            serde_json::from_value(json!({ "desktop": "3", "tablet": null })).unwrap();
        assert_eq!(value.tablet, None);
        assert_eq!(value.resolve(Viewport::Tablet), &json!("3"));
    }

    #[test]
    fn test_arrays_are_not_responsive() {
        assert!(serde_json::from_value::<ResponsiveValue<Value>>(json!(["a", "b"])).is_err());
        assert!(serde_json::from_value::<ResponsiveValue<Value>>(json!([{ "name": "Basic" }])).is_err());
        assert!(serde_json::from_value::<ResponsiveValue<Value>>(json!({ "tablet": "2" })).is_err());
        assert!(
            serde_json::from_value::<ResponsiveValue<Value>>(json!({ "desktop": "1", "wide": "2" }))
                .is_err()
        );
    }

    #[test]
    fn test_parse_viewport() {
        assert_eq!("mobile".parse::<Viewport>(), Ok(Viewport::Mobile));
        assert!("watch".parse::<Viewport>().is_err());
        assert_eq!(Viewport::Tablet.to_string(), "tablet");
    }
}
