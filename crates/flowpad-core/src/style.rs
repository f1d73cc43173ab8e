//! Free-form style attributes carried by nodes and edges.
//!
//! Styles are kept as an ordered map of CSS-like property names to JSON
//! values so documents survive an import/save cycle untouched. Only the few
//! properties the exporter understands are ever read back.

use indexmap::IndexMap;
use serde_json::Value;

use crate::color::Color;

/// Ordered style property map (`backgroundColor`, `stroke`, `strokeWidth`, ...)
pub type Style = IndexMap<String, Value>;

/// Reads a style property as a color.
///
/// Returns `None` when the property is absent, not a string, or not a valid
/// CSS color.
pub fn color_property(style: Option<&Style>, key: &str) -> Option<Color> {
    style?
        .get(key)
        .and_then(Value::as_str)
        .and_then(|value| Color::new(value).ok())
}

/// Reads a style property as a number. Numeric strings (`"2"`) are accepted.
pub fn number_property(style: Option<&Style>, key: &str) -> Option<f32> {
    match style?.get(key)? {
        Value::Number(number) => number.as_f64().map(|n| n as f32),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn style() -> Style {
        let mut style = Style::new();
        style.insert("stroke".to_string(), json!("#FF0072"));
        style.insert("strokeWidth".to_string(), json!(2));
        style.insert("opacity".to_string(), json!("0.5"));
        style.insert("color".to_string(), json!(12));
        style
    }

    #[test]
    fn test_color_property() {
        let style = style();
        assert!(color_property(Some(&style), "stroke").is_some());
        assert!(color_property(Some(&style), "color").is_none());
        assert!(color_property(Some(&style), "missing").is_none());
        assert!(color_property(None, "stroke").is_none());
    }

    #[test]
    fn test_number_property() {
        let style = style();
        assert_eq!(number_property(Some(&style), "strokeWidth"), Some(2.0));
        assert_eq!(number_property(Some(&style), "opacity"), Some(0.5));
        assert_eq!(number_property(Some(&style), "stroke"), None);
    }
}
