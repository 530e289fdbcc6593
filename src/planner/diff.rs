//! Line diff between two rendered variable documents.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use tracing::debug;

/// Engine for computing line diffs between document texts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

/// Kind of a rendered diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Present in both texts.
    Equal,
    /// Only in the first text.
    Removed,
    /// Only in the second text.
    Added,
}

impl LineKind {
    /// Returns the two-character line prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Equal => "  ",
            Self::Removed => "- ",
            Self::Added => "+ ",
        }
    }

    /// Classifies a rendered diff line by its prefix.
    #[must_use]
    pub fn of(line: &str) -> Self {
        if line.starts_with("- ") {
            Self::Removed
        } else if line.starts_with("+ ") {
            Self::Added
        } else {
            Self::Equal
        }
    }
}

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Diffs `a` against `b` line by line.
    ///
    /// Every line of the rendered text starts with `"  "`, `"- "` (only in
    /// `a`) or `"+ "` (only in `b`) and ends with a newline. When nothing
    /// differs the result is `(false, "")`.
    #[must_use]
    pub fn line_diff(&self, a: &str, b: &str) -> (bool, String) {
        let diff = TextDiff::from_lines(a, b);
        let mut changed = false;
        let mut rendered = String::new();

        for change in diff.iter_all_changes() {
            let kind = match change.tag() {
                ChangeTag::Equal => LineKind::Equal,
                ChangeTag::Delete => LineKind::Removed,
                ChangeTag::Insert => LineKind::Added,
            };
            changed |= kind != LineKind::Equal;

            rendered.push_str(kind.prefix());
            let line = change.value();
            rendered.push_str(line.strip_suffix('\n').unwrap_or(line));
            rendered.push('\n');
        }

        if !changed {
            return (false, String::new());
        }

        debug!("Computed diff of {} lines", rendered.lines().count());
        (true, rendered)
    }

    /// Colors removed lines red and added lines green.
    #[must_use]
    pub fn colorize(&self, rendered: &str) -> String {
        let mut out = String::with_capacity(rendered.len());
        for line in rendered.lines() {
            let line = match LineKind::of(line) {
                LineKind::Equal => line.normal(),
                LineKind::Removed => line.red(),
                LineKind::Added => line.green(),
            };
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}
