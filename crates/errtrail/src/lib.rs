//! # errtrail: error records with a trail
//!
//! A structured error value carrying a stable **code**, an append-only
//! trail of **reasons** added as the error travels up the stack, and the
//! **location** (`function(file:line)`) of every addition. Records travel
//! between processes as JSON text and are rebuilt on the other side.
//!
//! ## Design
//!
//! `ErrorRecord` is a shared handle. Annotating mutates the one record and
//! returns an alias of it, so the whole call chain sees the same trail:
//!
//! ```text
//! {"code":"data not found",
//!  "reason":[["new"],[42],["retry",3]],
//!  "where":["ERR_NO_DATA(ops.rs:18)","load(store.rs:17)","serve(api.rs:88)"]}
//! ```
//!
//! Equality is by code only. Foreign errors are compared and converted by
//! re-reading their `Display` text, which may itself be a serialized record.
//!
//! ## Quick Start
//!
//! ```rust
//! use errtrail::{annotate, trail, equals, parse, ErrorRecord, TrailResult, ERR_NO_DATA};
//!
//! fn load(id: u32) -> TrailResult<String> {
//!     if id == 0 {
//!         return Err(annotate!(ERR_NO_DATA, id));
//!     }
//!     Err(trail!("not implemented", id))
//! }
//!
//! fn serve(id: u32) -> TrailResult<String> {
//!     load(id).map_err(|e| annotate!(e, "serve"))
//! }
//!
//! let err = serve(0).unwrap_err();
//! assert!(ERR_NO_DATA.equal(Some(&err)));
//!
//! // Across a process boundary:
//! let wire = err.to_string();
//! let back = parse(&wire).unwrap();
//! assert!(equals(Some(&back), Some(&err)));
//! assert_eq!(back.depth(), 3);
//! ```
//!
//! ## Environment
//!
//! | Variable                    | Effect |
//! |-----------------------------|--------|
//! | `ERRTRAIL_FULL_PATHS`       | Keep full file/function paths in locations |
//! | `ERRTRAIL_MAX_REASON_ITEMS` | Cap the items kept per annotation |
//! | `ERRTRAIL_RESOLVE_SYMBOLS`  | `0` skips the debug-info lookup of caller names |
//!
//! ## Logging
//!
//! Uses the `log` facade: `debug` when text falls back to an opaque code,
//! `warn` if encoding ever fails, `trace` per annotation.

#[macro_use]
mod macros;
mod trail;
mod site;
mod symbol;
mod record;
mod ops;
mod convert;
pub mod env;

// ── Public API ────────────────────────────────────────────────────

pub use trail::{DecodeError, Reason, TrailData, NEW_MARKER};
pub use site::{CallSite, CALLER_UNKNOWN, FILE_UNNAMED, FUNC_UNNAMED};
pub use record::ErrorRecord;
pub use ops::{annotate, equals, normalize, parse, try_parse, ERR_NO_DATA, NO_DATA_CODE};
pub use convert::ResultExt;
pub use env::Config;

/// Convenience Result alias.
pub type TrailResult<T> = Result<T, ErrorRecord>;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::{to_value, Value};
}
