//! # Loosely-Typed Property Values
//!
//! Instructions arrive as JSON written by something that is *usually* right.
//! A frame count may show up as `4`, `4.0` or `"4"`; a position is always the
//! nested shape `{ "x": .., "y": .. }`. This module does structural lookups
//! over [`serde_json::Value`] without a static schema.
//!
//! [`Props`] wraps a property map and turns each lookup into one of three
//! answers:
//!
//! - key absent → the caller's default,
//! - key present with a usable shape → the converted value,
//! - key present with the wrong shape → [`AssemblyError::MalformedProperty`].
//!
//! Absent and malformed are deliberately different: an assistant that forgot
//! `frames_count` gets one frame, an assistant that wrote `"frames_count": {}`
//! gets an error report.

use crate::error::AssemblyError;
use crate::math::Vec2;

/// A dynamically-typed property value.
pub type Value = serde_json::Value;

/// An ordered string-keyed map of property values.
pub type Properties = serde_json::Map<String, Value>;

// ── Scalar conversions ──────────────────────────────────────────────────

/// A number, or a string that parses as one.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_f32(value: &Value) -> Option<f32> {
    as_f64(value).map(|v| v as f32)
}

/// An integer. Fractional numbers are truncated toward zero.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// A boolean, a number (non-zero is `true`), or `"true"`/`"false"`.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A 2-component vector: `{ "x": n, "y": n }`, or the array form `[n, n]`.
pub fn as_vec2(value: &Value) -> Option<Vec2> {
    match value {
        Value::Object(map) => {
            let x = as_f32(map.get("x")?)?;
            let y = as_f32(map.get("y")?)?;
            Some(Vec2::new(x, y))
        }
        Value::Array(items) if items.len() == 2 => {
            Some(Vec2::new(as_f32(&items[0])?, as_f32(&items[1])?))
        }
        _ => None,
    }
}

// ── Props ───────────────────────────────────────────────────────────────

/// Keyed, typed lookups over a [`Properties`] map.
#[derive(Debug, Clone, Copy)]
pub struct Props<'a> {
    map: &'a Properties,
}

impl<'a> Props<'a> {
    pub fn new(map: &'a Properties) -> Self {
        Self { map }
    }

    /// Interpret a value as a nested property map.
    pub fn from_value(key: &str, value: &'a Value) -> Result<Self, AssemblyError> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            _ => Err(AssemblyError::malformed(key, "expected an object")),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a String, &'a Value)> + use<'a> {
        self.map.iter()
    }

    pub fn f32_or(&self, key: &str, default: f32) -> Result<f32, AssemblyError> {
        self.lookup(key, as_f32, "expected a number")
            .map(|v| v.unwrap_or(default))
    }

    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64, AssemblyError> {
        self.lookup(key, as_i64, "expected an integer")
            .map(|v| v.unwrap_or(default))
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, AssemblyError> {
        self.lookup(key, as_bool, "expected a boolean")
            .map(|v| v.unwrap_or(default))
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>, AssemblyError> {
        self.lookup(key, Value::as_str, "expected a string")
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str, AssemblyError> {
        self.optional_str(key)?
            .ok_or_else(|| AssemblyError::malformed(key, "required key is missing"))
    }

    pub fn optional_vec2(&self, key: &str) -> Result<Option<Vec2>, AssemblyError> {
        self.lookup(key, as_vec2, "expected {x, y}")
    }

    fn lookup<T>(
        &self,
        key: &str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>, AssemblyError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => convert(value)
                .map(Some)
                .ok_or_else(|| AssemblyError::malformed(key, format!("{expected}, got {value}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn numbers_accept_ints_floats_and_strings() {
        assert_eq!(as_i64(&json!(8)), Some(8));
        assert_eq!(as_i64(&json!(8.9)), Some(8));
        assert_eq!(as_i64(&json!(" 8 ")), Some(8));
        assert_eq!(as_f32(&json!("0.25")), Some(0.25));
        assert_eq!(as_f32(&json!(true)), None);
    }

    #[test]
    fn vec2_requires_both_components() {
        assert_eq!(as_vec2(&json!({"x": 1, "y": 2.5})), Some(Vec2::new(1.0, 2.5)));
        assert_eq!(as_vec2(&json!([3, 4])), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(as_vec2(&json!({"x": 1})), None);
        assert_eq!(as_vec2(&json!(5)), None);
    }

    #[test]
    fn absent_key_uses_default_but_wrong_shape_is_an_error() {
        let map = props(json!({"radius": "big", "count": 3}));
        let p = Props::new(&map);

        assert_eq!(p.i64_or("count", 1).unwrap(), 3);
        assert_eq!(p.f32_or("missing", 1.0).unwrap(), 1.0);
        assert!(matches!(
            p.f32_or("radius", 1.0),
            Err(AssemblyError::MalformedProperty { ref key, .. }) if key == "radius"
        ));
        assert!(p.required_str("texture").is_err());
    }

    #[test]
    fn bools_accept_common_spellings() {
        assert_eq!(as_bool(&json!(true)), Some(true));
        assert_eq!(as_bool(&json!(0)), Some(false));
        assert_eq!(as_bool(&json!("TRUE")), Some(true));
        assert_eq!(as_bool(&json!("yes")), None);
    }
}
