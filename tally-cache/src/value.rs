//! Storable values and their canonical byte encoding

use crate::error::{CacheError, Result};

/// A value the cache can store
///
/// Every variant has one canonical byte encoding, which is what a backing
/// store holds and what an untyped fetch hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Canonical byte encoding of this value
    ///
    /// Integers are base-10 ASCII. Floats use [`format_float`], so their
    /// bytes never read back as an integer.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Bytes(b) => b.clone(),
            Self::Int(i) => i.to_string().into_bytes(),
            Self::Float(f) => format_float(*f).into_bytes(),
        }
    }

    /// Name of the variant, for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }
}

/// Canonical text form of a float
///
/// Shortest digits that parse back to the same `f64`. Magnitudes in
/// `1e-4..1e16` are written positionally and always carry a `.`; anything
/// else uses a signed exponent of at least two digits (`1e+300`, `2.5e-08`).
/// Non-finite values are `nan`, `inf` and `-inf`.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", f);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..16).contains(&exp) {
        let plain = f.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(b: [u8; N]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Self::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = CacheError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if n.is_u64() {
                    Err(CacheError::UnsupportedValue(format!(
                        "integer {} does not fit in i64",
                        n
                    )))
                } else {
                    n.as_f64().map(Self::Float).ok_or_else(|| {
                        CacheError::UnsupportedValue(format!("number {} is not representable", n))
                    })
                }
            }
            serde_json::Value::Null => {
                Err(CacheError::UnsupportedValue("null".to_string()))
            }
            serde_json::Value::Bool(b) => {
                Err(CacheError::UnsupportedValue(format!("boolean {}", b)))
            }
            serde_json::Value::Array(_) => {
                Err(CacheError::UnsupportedValue("array".to_string()))
            }
            serde_json::Value::Object(_) => {
                Err(CacheError::UnsupportedValue("object".to_string()))
            }
        }
    }
}
