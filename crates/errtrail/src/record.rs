use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::env::Config;
use crate::site::CallSite;
use crate::trail::{DecodeError, Reason, Trail, TrailData};

/// Structured error record: a stable code plus an append-only trail of
/// reasons and the call sites that added them.
///
/// `ErrorRecord` is a handle. Cloning it aliases the same record, and
/// [`annotate`](Self::annotate) appends to the shared trail in place and
/// hands back another alias, so annotations made anywhere up a call
/// stack are visible through every handle.
///
/// ```
/// use errtrail::{ErrorRecord, reason};
///
/// let err = ErrorRecord::new("quota exceeded");
/// let same = err.annotate(reason![42, "ctx"]);
/// assert!(ErrorRecord::ptr_eq(&err, &same));
/// assert_eq!(err.depth(), 2);
/// ```
///
/// # Equality
///
/// `==`, [`Hash`] and [`equal`](Self::equal) look at the code only. Use
/// [`ptr_eq`](Self::ptr_eq) for identity.
///
/// # Sentinels
///
/// A record built by [`sentinel`](Self::sentinel) is sealed: annotating
/// it detaches a private copy first, so a shared constant such as
/// [`ERR_NO_DATA`](crate::ERR_NO_DATA) never changes.
#[derive(Clone)]
pub struct ErrorRecord {
    inner: Arc<Inner>,
}

struct Inner {
    code: String,
    sealed: bool,
    trail: RwLock<Trail>,
}

// ── Constructors ──────────────────────────────────────────────────

impl ErrorRecord {
    /// New record whose trail holds the `["new"]` marker and the caller's location.
    #[track_caller]
    pub fn new(code: impl Into<String>) -> Self {
        Self::new_at(code, CallSite::caller())
    }

    /// Like [`new`](Self::new) with an explicit call site.
    pub fn new_at(code: impl Into<String>, site: CallSite) -> Self {
        Self::from_parts(code.into(), Trail::fresh(site.render()), false)
    }

    /// A sealed record for process-wide constants.
    #[track_caller]
    pub fn sentinel(code: impl Into<String>) -> Self {
        Self::from_parts(code.into(), Trail::fresh(CallSite::caller().render()), true)
    }

    /// Rebuild a record from decoded wire data, trail kept verbatim.
    pub fn from_data(data: TrailData) -> Result<Self, DecodeError> {
        data.check()?;
        let (code, trail) = data.into_parts();
        Ok(Self::from_parts(code, trail, false))
    }

    fn from_parts(code: String, trail: Trail, sealed: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                code,
                sealed,
                trail: RwLock::new(trail),
            }),
        }
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl ErrorRecord {
    #[inline]
    pub fn code(&self) -> &str {
        &self.inner.code
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.inner.sealed
    }

    /// Number of trail entries, construction included.
    pub fn depth(&self) -> usize {
        self.inner.trail.read().depth()
    }

    /// Snapshot of the reasons.
    pub fn reasons(&self) -> Vec<Reason> {
        self.inner.trail.read().reason.clone()
    }

    /// Snapshot of the locations.
    pub fn locations(&self) -> Vec<String> {
        self.inner.trail.read().locations.clone()
    }

    /// Snapshot of the whole record in wire form.
    pub fn to_data(&self) -> TrailData {
        TrailData::from_parts(self.inner.code.clone(), self.inner.trail.read().clone())
    }

    /// True if both handles refer to the same record.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

// ── Annotation ────────────────────────────────────────────────────

impl ErrorRecord {
    /// Append `reason` and the caller's location, returning an alias of
    /// this record. Sealed records detach first.
    #[track_caller]
    pub fn annotate(&self, reason: Reason) -> Self {
        self.annotate_at(reason, CallSite::caller())
    }

    pub fn annotate_at(&self, reason: Reason, site: CallSite) -> Self {
        let target = if self.inner.sealed { self.detach() } else { self.clone() };
        let location = site.render();
        let reason = Config::get().clamp_reason(reason);

        let mut trail = target.inner.trail.write();
        trail.push(reason, location);
        log::trace!(
            "errtrail: {:?} annotated at {} (depth {})",
            target.inner.code,
            trail.locations.last().map_or("", String::as_str),
            trail.depth()
        );
        drop(trail);

        target
    }

    /// Deep copy into a new, unsealed record with the same code and trail.
    pub fn detach(&self) -> Self {
        let trail = self.inner.trail.read().clone();
        Self::from_parts(self.inner.code.clone(), trail, false)
    }

    /// Code equality against any error, see [`equals`](crate::equals).
    pub fn equal(&self, other: Option<&(dyn Error + 'static)>) -> bool {
        crate::ops::equals(Some(self), other)
    }
}

// ── Serialization ─────────────────────────────────────────────────

impl ErrorRecord {
    /// Compact JSON wire form. Never fails.
    pub fn to_json(&self) -> String {
        self.inner.trail.read().view(&self.inner.code).encode()
    }

    pub fn to_json_pretty(&self) -> String {
        self.inner.trail.read().view(&self.inner.code).encode_pretty()
    }
}

impl Serialize for ErrorRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.trail.read().view(&self.inner.code).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ErrorRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = TrailData::deserialize(deserializer)?;
        Self::from_data(data).map_err(D::Error::custom)
    }
}

impl TryFrom<TrailData> for ErrorRecord {
    type Error = DecodeError;

    fn try_from(data: TrailData) -> Result<Self, DecodeError> {
        Self::from_data(data)
    }
}

// ── Traits ────────────────────────────────────────────────────────

impl Error for ErrorRecord {}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl fmt::Debug for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trail = self.inner.trail.read();
        let mut d = f.debug_struct("ErrorRecord");
        d.field("code", &self.inner.code);
        if self.inner.sealed {
            d.field("sealed", &true);
        }
        d.field("reason", &trail.reason)
            .field("where", &trail.locations)
            .finish()
    }
}

impl PartialEq for ErrorRecord {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.code == other.inner.code
    }
}

impl Eq for ErrorRecord {}

impl Hash for ErrorRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.code.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_records_marker_and_site() {
        let err = ErrorRecord::new("X");
        assert_eq!(err.code(), "X");
        assert_eq!(err.reasons(), vec![vec![json!("new")]]);
        let locs = err.locations();
        assert_eq!(locs.len(), 1);
        assert!(locs[0].starts_with("new_records_marker_and_site(record.rs:"), "got {}", locs[0]);
        assert!(!err.is_sealed());
    }

    #[test]
    fn new_at_uses_given_site() {
        let err = ErrorRecord::new_at("X", CallSite::new("app::load", "src/app.rs", 9));
        assert_eq!(err.locations(), vec!["load(app.rs:9)".to_string()]);
    }

    #[test]
    fn annotate_aliases() {
        let err = ErrorRecord::new("X");
        let out = err.annotate(vec![json!(42), json!("ctx")]);
        assert!(ErrorRecord::ptr_eq(&err, &out));
        assert_eq!(err.depth(), 2);
        assert_eq!(err.locations().len(), 2);
        assert_eq!(err.reasons()[1], vec![json!(42), json!("ctx")]);

        out.annotate(vec![]);
        assert_eq!(err.depth(), 3);
        assert_eq!(err.reasons()[2], Vec::<serde_json::Value>::new());
    }

    #[test]
    fn clone_is_alias() {
        let a = ErrorRecord::new("X");
        let b = a.clone();
        b.annotate(vec![json!("via b")]);
        assert_eq!(a.depth(), 2);
    }

    #[test]
    fn sentinel_is_never_mutated() {
        let s = ErrorRecord::sentinel("S");
        let out = s.annotate(vec![json!(1)]);
        assert!(s.is_sealed());
        assert_eq!(s.depth(), 1);
        assert!(!ErrorRecord::ptr_eq(&s, &out));
        assert!(!out.is_sealed());
        assert_eq!(out.depth(), 2);
        assert_eq!(out, s);
    }

    #[test]
    fn detach_copies() {
        let a = ErrorRecord::new("X");
        let b = a.detach();
        b.annotate(vec![json!("only b")]);
        assert_eq!(a.depth(), 1);
        assert_eq!(b.depth(), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn json_shape() {
        let err = ErrorRecord::new_at("X", CallSite::new("f", "a.rs", 1));
        assert_eq!(err.to_json(), r#"{"code":"X","reason":[["new"]],"where":["f(a.rs:1)"]}"#);
        assert_eq!(err.to_string(), err.to_json());
        err.annotate_at(vec![json!(42), json!("ctx")], CallSite::new("g", "b.rs", 2));
        assert_eq!(
            err.to_json(),
            r#"{"code":"X","reason":[["new"],[42,"ctx"]],"where":["f(a.rs:1)","g(b.rs:2)"]}"#
        );
    }

    #[test]
    fn serde_embedding() {
        #[derive(Serialize, Deserialize)]
        struct Envelope {
            id: u32,
            error: ErrorRecord,
        }
        let env = Envelope { id: 7, error: ErrorRecord::new("X") };
        let text = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back.id, 7);
        assert_eq!(back.error, env.error);
        assert_eq!(back.error.locations(), env.error.locations());
    }

    #[test]
    fn deserialize_rejects_mismatch() {
        let r: Result<ErrorRecord, _> =
            serde_json::from_str(r#"{"code":"X","reason":[["a"],["b"]],"where":["w"]}"#);
        assert!(r.is_err());
    }

    #[test]
    fn eq_and_hash_by_code() {
        use std::collections::HashSet;
        let a = ErrorRecord::new("X");
        let b = ErrorRecord::new("X");
        b.annotate(vec![json!("extra")]);
        assert_eq!(a, b);
        assert_ne!(a, ErrorRecord::new("Y"));
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn debug_output() {
        let s = format!("{:?}", ErrorRecord::sentinel("S"));
        assert!(s.contains("ErrorRecord"));
        assert!(s.contains("sealed"));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ErrorRecord>();
    }
}
