//! Ready-made cell converters.
//!
//! Parsers and serializers a schema can opt into per field. Nothing here is
//! applied implicitly: a cell only goes through a converter when the field
//! declaration names one.

use serde_json::{Number, Value};

use crate::error::BoxError;

/// Parse a cell as a signed integer.
pub fn int(raw: &str) -> Result<Value, BoxError> {
    let n = raw.trim().parse::<i64>()?;
    Ok(Value::from(n))
}

/// Parse a cell as a finite float.
pub fn float(raw: &str) -> Result<Value, BoxError> {
    let x = raw.trim().parse::<f64>()?;
    let n = Number::from_f64(x)
        .ok_or_else(|| BoxError::from(format!("'{}' is not a finite number", raw.trim())))?;
    Ok(Value::Number(n))
}

/// Parse a cell as a boolean. Accepts `true`/`false`, `1`/`0`, `yes`/`no`,
/// `y`/`n`, case-insensitively.
pub fn boolean(raw: &str) -> Result<Value, BoxError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(Value::Bool(true)),
        "false" | "0" | "no" | "n" => Ok(Value::Bool(false)),
        other => Err(format!("'{other}' is not a recognized boolean").into()),
    }
}

/// Serializer writing a number with a fixed count of decimal digits.
pub fn fixed(digits: usize) -> impl Fn(&Value) -> Result<String, BoxError> + Send + Sync + 'static {
    move |value| {
        let x = value
            .as_f64()
            .ok_or_else(|| BoxError::from(format!("{value} is not a number")))?;
        Ok(format!("{x:.digits$}"))
    }
}
