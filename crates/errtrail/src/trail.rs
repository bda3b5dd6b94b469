use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One annotation: a heterogeneous list of JSON values.
pub type Reason = Vec<Value>;

/// Reason recorded by every freshly constructed record.
pub const NEW_MARKER: &str = "new";

/// Wire form of a record: `{"code":..,"reason":[[..]..],"where":[..]}`.
///
/// Field order on output is fixed to `code`, `reason`, `where`. On input
/// unknown fields are ignored and every missing (or `null`) field decodes
/// as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: Vec<Reason>,
    #[serde(rename = "where", default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
}

/// Why a text could not be decoded as [`TrailData`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,
    #[error("not a JSON object")]
    NotAnObject,
    #[error("malformed trail: {0}")]
    Json(#[from] serde_json::Error),
    #[error("trail length mismatch: {reasons} reasons, {locations} locations")]
    LengthMismatch { reasons: usize, locations: usize },
}

/// In-memory trail of a record: one reason and one location per event.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Trail {
    pub reason: Vec<Reason>,
    pub locations: Vec<String>,
}

impl Trail {
    /// A trail holding only the construction marker.
    pub(crate) fn fresh(location: String) -> Self {
        Self {
            reason: vec![vec![Value::from(NEW_MARKER)]],
            locations: vec![location],
        }
    }

    pub(crate) fn push(&mut self, reason: Reason, location: String) {
        self.reason.push(reason);
        self.locations.push(location);
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.reason.len()
    }

    pub(crate) fn view<'a>(&'a self, code: &'a str) -> TrailView<'a> {
        TrailView { code, reason: &self.reason, locations: &self.locations }
    }
}

impl TrailData {
    pub(crate) fn from_parts(code: String, trail: Trail) -> Self {
        Self { code, reason: trail.reason, locations: trail.locations }
    }

    pub(crate) fn into_parts(self) -> (String, Trail) {
        (self.code, Trail { reason: self.reason, locations: self.locations })
    }

    /// Every reason must have a matching location.
    pub fn check(&self) -> Result<(), DecodeError> {
        if self.reason.len() != self.locations.len() {
            return Err(DecodeError::LengthMismatch {
                reasons: self.reason.len(),
                locations: self.locations.len(),
            });
        }
        Ok(())
    }

    /// Strict decode of the wire form.
    pub fn decode(src: &str) -> Result<Self, DecodeError> {
        if src.is_empty() {
            return Err(DecodeError::Empty);
        }
        if !src.starts_with('{') {
            return Err(DecodeError::NotAnObject);
        }
        let data: TrailData = serde_json::from_str(src)?;
        data.check()?;
        Ok(data)
    }
}

/// Borrowed wire form, used to encode without cloning the trail.
#[derive(Debug, Serialize)]
pub(crate) struct TrailView<'a> {
    code: &'a str,
    reason: &'a [Reason],
    #[serde(rename = "where")]
    locations: &'a [String],
}

impl TrailView<'_> {
    /// Compact JSON. Falls back to the `Debug` dump if encoding fails.
    pub(crate) fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| self.fallback(e))
    }

    pub(crate) fn encode_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| self.fallback(e))
    }

    #[cold]
    fn fallback(&self, err: serde_json::Error) -> String {
        log::warn!("errtrail: encoding {:?} failed: {}", self.code, err);
        format!("{:?}", self)
    }
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}
