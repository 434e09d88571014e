use serde_json::Value;
use snafu::{OptionExt, ResultExt, Snafu};

/// A decoded OctoPrint response body with typed, path-based field accessors.
///
/// Paths are dotted (`progress.completion`) and walk nested objects.
/// Every accessor separates a field that is absent from one that is
/// explicitly `null`, so callers can pick their own fallback for each.
#[derive(Debug, Clone)]
pub struct ResponseBody {
    root: Value,
}

/// Presence of a single field in a response body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Missing,
    Null,
    Present(&'a Value),
}

impl ResponseBody {
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let root = serde_json::from_str(text).context(MalformedSnafu)?;
        Ok(Self { root })
    }

    pub fn field(&self, path: &str) -> Field<'_> {
        let pointer = format!("/{}", path.replace('.', "/"));
        match self.root.pointer(&pointer) {
            None => Field::Missing,
            Some(Value::Null) => Field::Null,
            Some(value) => Field::Present(value),
        }
    }

    fn present(&self, path: &str) -> Result<&Value, DecodeError> {
        match self.field(path) {
            Field::Missing => FieldMissingSnafu { field: path }.fail(),
            Field::Null => FieldNullSnafu { field: path }.fail(),
            Field::Present(value) => Ok(value),
        }
    }

    pub fn string(&self, path: &str) -> Result<String, DecodeError> {
        self.present(path)?
            .as_str()
            .map(|s| s.trim().to_string())
            .context(WrongTypeSnafu { field: path, expected: "string" })
    }

    pub fn float(&self, path: &str) -> Result<f64, DecodeError> {
        self.present(path)?
            .as_f64()
            .context(WrongTypeSnafu { field: path, expected: "number" })
    }

    /// Numeric field truncated toward zero, as used for percentages and times.
    pub fn truncated(&self, path: &str) -> Result<i64, DecodeError> {
        Ok(self.float(path)?.trunc() as i64)
    }

    /// Numeric field rounded to the nearest integer, as used for temperatures.
    pub fn rounded(&self, path: &str) -> Result<i64, DecodeError> {
        Ok(self.float(path)?.round() as i64)
    }
}

/// Fallback for fields the controller is allowed to leave out.
pub trait OrMissing<T> {
    /// Replaces a `FieldMissing` error with `default`. A `null` value stays an error.
    fn or_missing(self, default: T) -> Result<T, DecodeError>;
}

impl<T> OrMissing<T> for Result<T, DecodeError> {
    fn or_missing(self, default: T) -> Result<T, DecodeError> {
        match self {
            Err(DecodeError::FieldMissing { .. }) => Ok(default),
            other => other,
        }
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("Response body is not valid JSON"))]
    Malformed { source: serde_json::Error },

    #[snafu(display("Field '{field}' is missing from the response"))]
    FieldMissing { field: String },

    #[snafu(display("Field '{field}' is null"))]
    FieldNull { field: String },

    #[snafu(display("Field '{field}' is not a {expected}"))]
    WrongType { field: String, expected: &'static str },
}
