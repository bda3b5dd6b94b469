use std::io;

use serde_json::Value;

use crate::ops::{annotate_err_at, normalize_at};
use crate::site::CallSite;
use crate::trail::Reason;
use crate::{ErrorRecord, TrailResult};

// ── From<io::Error> ───────────────────────────────────────────────

impl From<io::Error> for ErrorRecord {
    /// Convert an `io::Error` into a record at the `?` / call site.
    ///
    /// An `io::Error` that wraps a record (see `From<ErrorRecord> for
    /// io::Error`) unwraps back to that same record. Otherwise the code is
    /// the io message and an `["io", "<kind>"]` reason is appended.
    #[track_caller]
    fn from(err: io::Error) -> Self {
        let site = CallSite::caller();

        if let Some(rec) = err.get_ref().and_then(|e| e.downcast_ref::<ErrorRecord>()) {
            return rec.clone();
        }

        let kind = format!("{:?}", err.kind());
        normalize_at(&err, site)
            .unwrap_or_else(|| ErrorRecord::new_at(kind.clone(), site))
            .annotate_at(vec![Value::from("io"), Value::from(kind)], site)
    }
}

// ── Into<io::Error> ───────────────────────────────────────────────

impl From<ErrorRecord> for io::Error {
    /// Wraps the record as a custom `io::Error` of kind `Other`.
    fn from(err: ErrorRecord) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

// ── ResultExt: trail annotation on Results ───────────────────────

/// Extension trait for annotating the error side of any `Result`.
///
/// A `Result<_, ErrorRecord>` is annotated in place. Any other error is
/// normalized into a new record first.
///
/// ```
/// use errtrail::{reason, ResultExt, TrailResult};
///
/// fn read_config(path: &str) -> TrailResult<String> {
///     std::fs::read_to_string(path).annotate_err(reason!["reading config", path])
/// }
///
/// let err = read_config("/definitely/not/here.toml").unwrap_err();
/// assert_eq!(err.depth(), 2);
/// ```
pub trait ResultExt<T> {
    /// Append `reason` at the caller's location.
    fn annotate_err(self, reason: Reason) -> TrailResult<T>;

    /// Like `annotate_err`, building the reason only on the error path.
    fn annotate_with<F>(self, f: F) -> TrailResult<T>
    where
        F: FnOnce() -> Reason;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + 'static,
{
    #[track_caller]
    fn annotate_err(self, reason: Reason) -> TrailResult<T> {
        let site = CallSite::caller();
        self.map_err(|e| annotate_err_at(&e, reason, site))
    }

    #[track_caller]
    fn annotate_with<F>(self, f: F) -> TrailResult<T>
    where
        F: FnOnce() -> Reason,
    {
        let site = CallSite::caller();
        self.map_err(|e| annotate_err_at(&e, f(), site))
    }
}
