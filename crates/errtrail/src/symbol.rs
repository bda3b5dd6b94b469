//! Function names for `#[track_caller]` sites.
//!
//! `Location` carries file and line only. The enclosing function is found
//! by walking the stack and resolving the frame whose debug info points at
//! that same file and line. Each site is resolved once and interned, hits
//! and misses alike, so the walk cost is paid per site rather than per call.
//!
//! Without debug info every lookup misses and the caller renders as
//! `unnamed`.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

type Key = (&'static str, u32);

static NAMES: Lazy<RwLock<HashMap<Key, Option<&'static str>>>> = Lazy::new(Default::default);

/// Path of the function containing `file:line`, if the stack shows it.
pub(crate) fn lookup(file: &'static str, line: u32) -> Option<&'static str> {
    if let Some(hit) = NAMES.read().get(&(file, line)) {
        return *hit;
    }
    let name = resolve(file, line).map(|s| -> &'static str { Box::leak(s.into_boxed_str()) });
    *NAMES.write().entry((file, line)).or_insert(name)
}

fn resolve(file: &str, line: u32) -> Option<String> {
    let want = Path::new(file);
    let mut found = None;
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |sym| {
            if found.is_some() || sym.lineno() != Some(line) {
                return;
            }
            if sym.filename().map_or(false, |p| same_file(p, want)) {
                found = sym.name().map(|n| format!("{:#}", n));
            }
        });
        found.is_none()
    });
    if found.is_none() {
        log::trace!("errtrail: no symbol for {}:{}", file, line);
    }
    found
}

/// Debug info may hold an absolute path where `file!()` is relative.
fn same_file(path: &Path, want: &Path) -> bool {
    path.ends_with(want) || (want.file_name().is_some() && path.file_name() == want.file_name())
}
