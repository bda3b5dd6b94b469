//! Call-site capture for trail locations.
//!
//! Every trail entry carries a location string formatted as
//!
//! ```text
//! function(file:line)        e.g.  load_user(store.rs:42)
//! ```
//!
//! # Sources
//!
//! | Constructor           | file/line | function            |
//! |-----------------------|-----------|---------------------|
//! | `CallSite::caller()`  | yes       | from debug info     |
//! | `site!()`             | yes       | enclosing fn path   |
//! | `CallSite::UNKNOWN`   | no        | no                  |
//!
//! Rendering never fails. Missing pieces degrade to fixed sentinels.

use core::fmt;
use std::panic::Location;

use crate::env::Config;
use crate::symbol;

/// Rendered when neither file nor line is known.
pub const CALLER_UNKNOWN: &str = "domain of caller is unknown";
/// Rendered when the file name is empty.
pub const FILE_UNNAMED: &str = "domain of file is unnamed";
/// Function slot used when no function name was captured.
pub const FUNC_UNNAMED: &str = "unnamed";

/// A captured call site.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub function: Option<&'static str>,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// No site information.
    pub const UNKNOWN: CallSite = CallSite { function: None, file: "", line: 0 };

    pub const fn new(function: &'static str, file: &'static str, line: u32) -> Self {
        Self { function: Some(function), file, line }
    }

    /// Whoever called the `#[track_caller]` chain leading here.
    ///
    /// The function is looked up from debug info and left `None` when that
    /// fails or [`Config::resolve_symbols`] is off.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Self::caller_with(loc, Config::get())
    }

    fn caller_with(loc: &'static Location<'static>, cfg: &Config) -> Self {
        let function = if cfg.resolve_symbols {
            symbol::lookup(loc.file(), loc.line())
        } else {
            None
        };
        Self { function, file: loc.file(), line: loc.line() }
    }

    /// Render using the process-wide [`Config`].
    pub fn render(&self) -> String {
        self.render_with(Config::get())
    }

    pub fn render_with(&self, cfg: &Config) -> String {
        if self.file.is_empty() && self.line == 0 {
            return CALLER_UNKNOWN.to_string();
        }
        let file = if cfg.full_paths { self.file } else { short_file(self.file) };
        if file.is_empty() {
            return FILE_UNNAMED.to_string();
        }
        let func = self
            .function
            .map(strip_closures)
            .map(|f| if cfg.full_paths { f } else { short_func(f) })
            .filter(|f| !f.is_empty())
            .unwrap_or(FUNC_UNNAMED);
        format!("{}({}:{})", func, file, self.line)
    }
}

/// Last segment of a file path, either separator style.
fn short_file(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Last `::` segment of a function path.
fn short_func(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Closures report `outer::{{closure}}`; keep the enclosing fn.
fn strip_closures(mut path: &str) -> &str {
    while let Some(rest) = path.strip_suffix("::{{closure}}") {
        path = rest;
    }
    path
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("function", &self.function)
            .field("location", &format_args!("{}:{}", self.file, self.line))
            .finish()
    }
}
