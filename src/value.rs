//! Scalar values stored in working memory.
//!
//! A WME's value is either an identifier (handled by [`crate::wm`]) or one of
//! three constant types. [`WmValue`] is the constant side; its [`ValueKind`]
//! is decided once when a WME is created and never changes afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// The type tag of a constant WME value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Float,
    String,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::String => write!(f, "string"),
        }
    }
}

/// A constant value: integer, floating point, or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WmValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl WmValue {
    /// The type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            WmValue::Int(_) => ValueKind::Int,
            WmValue::Float(_) => ValueKind::Float,
            WmValue::Str(_) => ValueKind::String,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            WmValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            WmValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WmValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Infer a typed value from printed text: integers first, then floats,
    /// otherwise the text itself.
    pub fn parse_typed(text: &str) -> Self {
        if let Ok(i) = text.parse::<i64>() {
            return WmValue::Int(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            // "inf"/"nan" parse as floats but are symbols in printouts.
            if f.is_finite() {
                return WmValue::Float(f);
            }
        }
        WmValue::Str(text.to_string())
    }

    /// Explicitly convert this value to another kind.
    ///
    /// Int widens to float. A float only narrows to int when it is whole and
    /// inside the `i64` range. Strings parse and anything renders to a string.
    pub fn coerce_to(&self, target: ValueKind) -> Result<WmValue, ValueError> {
        // 2^63; `i64::MAX as f64` rounds up to this.
        const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
        let fail = || ValueError::Coerce {
            value: self.to_string(),
            target,
        };
        match (self, target) {
            (v, k) if v.kind() == k => Ok(v.clone()),
            (v, ValueKind::String) => Ok(WmValue::Str(v.to_string())),
            (WmValue::Int(i), ValueKind::Float) => Ok(WmValue::Float(*i as f64)),
            (WmValue::Float(f), ValueKind::Int) => {
                if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(f) {
                    Ok(WmValue::Int(*f as i64))
                } else {
                    Err(fail())
                }
            }
            (WmValue::Str(s), ValueKind::Int) => {
                s.trim().parse::<i64>().map(WmValue::Int).map_err(|_| fail())
            }
            (WmValue::Str(s), ValueKind::Float) => s
                .trim()
                .parse::<f64>()
                .map(WmValue::Float)
                .map_err(|_| fail()),
            _ => Err(fail()),
        }
    }
}

impl std::fmt::Display for WmValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WmValue::Int(v) => write!(f, "{v}"),
            // Floats always print with a fractional part, as the runtime does.
            WmValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            WmValue::Float(v) => write!(f, "{v}"),
            WmValue::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for WmValue {
    fn from(v: i64) -> Self {
        WmValue::Int(v)
    }
}

impl From<i32> for WmValue {
    fn from(v: i32) -> Self {
        WmValue::Int(v.into())
    }
}

impl From<u32> for WmValue {
    fn from(v: u32) -> Self {
        WmValue::Int(v.into())
    }
}

impl From<f64> for WmValue {
    fn from(v: f64) -> Self {
        WmValue::Float(v)
    }
}

impl From<f32> for WmValue {
    fn from(v: f32) -> Self {
        WmValue::Float(v.into())
    }
}

impl From<&str> for WmValue {
    fn from(v: &str) -> Self {
        WmValue::Str(v.to_string())
    }
}

impl From<String> for WmValue {
    fn from(v: String) -> Self {
        WmValue::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(WmValue::from(3).kind(), ValueKind::Int);
        assert_eq!(WmValue::from(3.5).kind(), ValueKind::Float);
        assert_eq!(WmValue::from("red").kind(), ValueKind::String);
    }

    #[test]
    fn float_display_keeps_fraction() {
        assert_eq!(WmValue::Float(1.0).to_string(), "1.0");
        assert_eq!(WmValue::Float(23.3).to_string(), "23.3");
        assert_eq!(WmValue::Int(-4).to_string(), "-4");
    }

    #[test]
    fn parse_typed_prefers_int() {
        assert_eq!(WmValue::parse_typed("5"), WmValue::Int(5));
        assert_eq!(WmValue::parse_typed("2.5"), WmValue::Float(2.5));
        assert_eq!(WmValue::parse_typed("cube"), WmValue::Str("cube".into()));
        assert_eq!(WmValue::parse_typed("inf"), WmValue::Str("inf".into()));
    }

    #[test]
    fn coerce_int_to_float_and_back() {
        let f = WmValue::Int(7).coerce_to(ValueKind::Float).unwrap();
        assert_eq!(f, WmValue::Float(7.0));
        assert_eq!(f.coerce_to(ValueKind::Int).unwrap(), WmValue::Int(7));
        assert!(WmValue::Float(7.5).coerce_to(ValueKind::Int).is_err());
    }

    #[test]
    fn float_outside_int_range_does_not_saturate() {
        for f in [1e300, -1e300, 9.3e18, f64::INFINITY, f64::NAN] {
            assert!(
                matches!(
                    WmValue::Float(f).coerce_to(ValueKind::Int),
                    Err(ValueError::Coerce { .. })
                ),
                "{f} coerced"
            );
        }
        assert_eq!(
            WmValue::Float(-9_223_372_036_854_775_808.0)
                .coerce_to(ValueKind::Int)
                .unwrap(),
            WmValue::Int(i64::MIN)
        );
    }

    #[test]
    fn coerce_strings() {
        assert_eq!(
            WmValue::from(" 12 ").coerce_to(ValueKind::Int).unwrap(),
            WmValue::Int(12)
        );
        assert!(WmValue::from("twelve").coerce_to(ValueKind::Int).is_err());
        assert_eq!(
            WmValue::Float(0.5).coerce_to(ValueKind::String).unwrap(),
            WmValue::Str("0.5".into())
        );
    }

    #[test]
    fn untagged_json() {
        let json = serde_json::to_string(&vec![
            WmValue::Int(1),
            WmValue::Float(1.5),
            WmValue::Str("a".into()),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,1.5,"a"]"#);
    }
}
