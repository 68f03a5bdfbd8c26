//! Primitive elements: a scalar plus optional `id` and extensions.
//!
//! On the wire the scalar lives under `name` and its metadata under
//! `_name`. Either half may be missing, which is how FHIR distinguishes an
//! annotated-but-empty value from an absent one.

use crate::element::Extension;
use crate::temporal::{Date, DateTime, Instant, Time};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::fmt;

/// A scalar kind that can sit inside a [`Primitive`].
pub trait PrimitiveValue: Sized + Clone + PartialEq + fmt::Debug + 'static {
    /// FHIR name of the scalar kind, used in error messages.
    const KIND: &'static str;

    fn from_json(value: &Value) -> Result<Self, String>;

    fn to_json(&self) -> Value;

    /// Coded text, when the scalar is a string that can be checked against a
    /// value set.
    fn as_code(&self) -> Option<&str> {
        None
    }
}

/// A FHIR primitive element.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<T> {
    pub value: Option<T>,
    pub id: Option<String>,
    pub extension: Vec<Extension>,
}

impl<T> Default for Primitive<T> {
    fn default() -> Self {
        Self {
            value: None,
            id: None,
            extension: Vec::new(),
        }
    }
}

impl<T> Primitive<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(value),
            id: None,
            extension: Vec::new(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// True when the element carries id or extensions.
    pub fn has_metadata(&self) -> bool {
        self.id.is_some() || !self.extension.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_value() && !self.has_metadata()
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension.push(extension);
        self
    }
}

impl Primitive<String> {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl From<&str> for Primitive<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Primitive<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<bool> for Primitive<bool> {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Primitive<i32> {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<u32> for Primitive<u32> {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Decimal> for Primitive<Decimal> {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

pub type FhirString = Primitive<String>;
pub type Code = Primitive<String>;
pub type Id = Primitive<String>;
pub type Uri = Primitive<String>;
pub type Url = Primitive<String>;
pub type Canonical = Primitive<String>;
pub type Oid = Primitive<String>;
pub type Uuid = Primitive<String>;
pub type Markdown = Primitive<String>;
pub type Base64Binary = Primitive<String>;
pub type Boolean = Primitive<bool>;
pub type Integer = Primitive<i32>;
pub type UnsignedInt = Primitive<u32>;
pub type PositiveInt = Primitive<u32>;
pub type FhirDecimal = Primitive<Decimal>;
pub type FhirDate = Primitive<Date>;
pub type FhirDateTime = Primitive<DateTime>;
pub type FhirInstant = Primitive<Instant>;
pub type FhirTime = Primitive<Time>;

impl PrimitiveValue for String {
    const KIND: &'static str = "string";

    fn from_json(value: &Value) -> Result<Self, String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("expected a string, found {}", json_kind(value)))
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }

    fn as_code(&self) -> Option<&str> {
        Some(self)
    }
}

impl PrimitiveValue for bool {
    const KIND: &'static str = "boolean";

    fn from_json(value: &Value) -> Result<Self, String> {
        value
            .as_bool()
            .ok_or_else(|| format!("expected a boolean, found {}", json_kind(value)))
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl PrimitiveValue for i32 {
    const KIND: &'static str = "integer";

    fn from_json(value: &Value) -> Result<Self, String> {
        let n = value
            .as_i64()
            .ok_or_else(|| format!("expected an integer, found {}", json_kind(value)))?;
        i32::try_from(n).map_err(|_| format!("{n} is outside the 32-bit integer range"))
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl PrimitiveValue for u32 {
    const KIND: &'static str = "unsignedInt";

    fn from_json(value: &Value) -> Result<Self, String> {
        let n = value
            .as_u64()
            .ok_or_else(|| format!("expected a non-negative integer, found {}", json_kind(value)))?;
        u32::try_from(n).map_err(|_| format!("{n} is outside the unsignedInt range"))
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl PrimitiveValue for Decimal {
    const KIND: &'static str = "decimal";

    fn from_json(value: &Value) -> Result<Self, String> {
        let Value::Number(n) = value else {
            return Err(format!("expected a number, found {}", json_kind(value)));
        };
        let text = n.to_string();
        if text.contains(['e', 'E']) {
            Decimal::from_scientific(&text).map_err(|e| e.to_string())
        } else {
            Decimal::from_str_exact(&text).map_err(|e| e.to_string())
        }
    }

    fn to_json(&self) -> Value {
        let text = self.to_string();
        match serde_json::from_str::<Number>(&text) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(text),
        }
    }
}

macro_rules! temporal_primitive {
    ($ty:ty, $kind:literal) => {
        impl PrimitiveValue for $ty {
            const KIND: &'static str = $kind;

            fn from_json(value: &Value) -> Result<Self, String> {
                let text = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, found {}", json_kind(value)))?;
                <$ty>::parse(text).ok_or_else(|| format!("'{text}' is not a valid {}", $kind))
            }

            fn to_json(&self) -> Value {
                Value::String(self.as_str().to_string())
            }
        }
    };
}

temporal_primitive!(Date, "date");
temporal_primitive!(DateTime, "dateTime");
temporal_primitive!(Instant, "instant");
temporal_primitive!(Time, "time");

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_keeps_trailing_zeros() {
        let value: Value = serde_json::from_str("1.50").unwrap();
        let decimal = Decimal::from_json(&value).unwrap();
        assert_eq!(decimal.to_string(), "1.50");
        assert_eq!(decimal.to_json().to_string(), "1.50");
    }

    #[test]
    fn integer_rejects_fractions_and_strings() {
        assert_eq!(i32::from_json(&json!(42)), Ok(42));
        assert!(i32::from_json(&json!(1.5)).is_err());
        assert!(i32::from_json(&json!("42")).is_err());
        assert!(u32::from_json(&json!(-1)).is_err());
    }

    #[test]
    fn temporal_values_are_validated() {
        assert!(Date::from_json(&json!("2020-01-01")).is_ok());
        let err = Date::from_json(&json!("2020-1-1")).unwrap_err();
        assert!(err.contains("not a valid date"));
    }

    #[test]
    fn empty_primitive_has_no_content() {
        let p: Primitive<String> = Primitive::default();
        assert!(p.is_empty());
        let annotated = Primitive::<String> {
            id: Some("a".into()),
            ..Default::default()
        };
        assert!(!annotated.is_empty());
        assert!(!annotated.has_value());
    }
}
