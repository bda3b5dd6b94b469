//! Free functions over any error value.
//!
//! These accept `Option<&dyn Error>` so "no error" can be passed straight
//! through: `None` in gives `None` (or `true`/`false` for [`equals`]) out.

use std::borrow::Cow;
use std::error::Error;

use once_cell::sync::Lazy;

use crate::record::ErrorRecord;
use crate::site::CallSite;
use crate::trail::{DecodeError, Reason, TrailData};

pub const NO_DATA_CODE: &str = "data not found";

/// Shared "data not found" record. Sealed: annotating it returns a copy.
pub static ERR_NO_DATA: Lazy<ErrorRecord> = Lazy::new(|| ErrorRecord::sentinel(NO_DATA_CODE));

/// Parse error text back into a record.
///
/// - `""` gives `None`.
/// - Text not starting with `{` becomes the code of a new record.
/// - A `{"code","reason","where"}` object is restored verbatim.
/// - Anything else that fails to decode becomes the code of a new record.
#[track_caller]
pub fn parse(src: &str) -> Option<ErrorRecord> {
    parse_at(src, CallSite::caller())
}

pub(crate) fn parse_at(src: &str, site: CallSite) -> Option<ErrorRecord> {
    match try_parse(src) {
        Ok(rec) => Some(rec),
        Err(DecodeError::Empty) => None,
        Err(DecodeError::NotAnObject) => Some(ErrorRecord::new_at(src, site)),
        Err(e) => {
            log::debug!("errtrail: treating undecodable trail as code: {}", e);
            Some(ErrorRecord::new_at(src, site))
        }
    }
}

/// Strict parse: only the JSON wire form is accepted.
pub fn try_parse(src: &str) -> Result<ErrorRecord, DecodeError> {
    TrailData::decode(src).and_then(ErrorRecord::from_data)
}

/// Convert any error into a record.
///
/// An `ErrorRecord` comes back as an alias of itself. Any other error is
/// re-read from its `Display` text through [`parse`], producing a new
/// record.
#[track_caller]
pub fn normalize(err: Option<&(dyn Error + 'static)>) -> Option<ErrorRecord> {
    normalize_at(err?, CallSite::caller())
}

pub(crate) fn normalize_at(err: &(dyn Error + 'static), site: CallSite) -> Option<ErrorRecord> {
    if let Some(rec) = err.downcast_ref::<ErrorRecord>() {
        return Some(rec.clone());
    }
    parse_at(&err.to_string(), site)
}

/// Normalize `err` and append `reason` at the caller's location.
///
/// A record is annotated in place. Any other error yields a new record
/// and is left untouched.
#[track_caller]
pub fn annotate(err: Option<&(dyn Error + 'static)>, reason: Reason) -> Option<ErrorRecord> {
    let site = CallSite::caller();
    err.map(|e| annotate_err_at(e, reason, site))
}

/// Non-optional core of [`annotate`]. An error with empty text becomes a
/// record with an empty code rather than being dropped.
pub(crate) fn annotate_err_at(
    err: &(dyn Error + 'static),
    reason: Reason,
    site: CallSite,
) -> ErrorRecord {
    normalize_at(err, site)
        .unwrap_or_else(|| ErrorRecord::new_at("", site))
        .annotate_at(reason, site)
}

/// Compare two errors by code.
///
/// Identical objects (and two `None`s) are equal, a `None` never equals
/// an error, otherwise both sides are normalized and their codes compared.
pub fn equals(a: Option<&(dyn Error + 'static)>, b: Option<&(dyn Error + 'static)>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same_object(a, b) || code_of(a) == code_of(b),
        _ => false,
    }
}

/// Same address and same vtable. Zero-sized errors of different types can
/// share an address, so the address alone is not identity.
#[inline]
fn same_object(a: &(dyn Error + 'static), b: &(dyn Error + 'static)) -> bool {
    std::ptr::eq(a, b)
}

/// The code `normalize` would produce, without building a record.
fn code_of<'a>(err: &'a (dyn Error + 'static)) -> Cow<'a, str> {
    if let Some(rec) = err.downcast_ref::<ErrorRecord>() {
        return Cow::Borrowed(rec.code());
    }
    let text = err.to_string();
    match TrailData::decode(&text) {
        Ok(data) => Cow::Owned(data.code),
        Err(_) => Cow::Owned(text),
    }
}
