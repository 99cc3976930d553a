//! Frame selection and de-duplication
//!
//! Keeps every project frame plus the first dependency frame (the boundary
//! where execution left project code), drops runtime-internal and anonymous
//! noise, and suppresses locations already emitted earlier in the process
//! through a shared [`FrameDeduper`].

use crate::models::{FrameOrigin, RawFrame, StackEntry, NO_DATA};
use crate::parser;
use crate::resolver::PathResolver;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

/// Process-lifetime record of emitted `relative_path:line` keys
///
/// Deliberately cross-call state: a location that appeared in any earlier
/// error never reappears in a later stack. Construct a fresh instance per
/// test instead of sharing [`FrameDeduper::shared`].
#[derive(Debug, Default)]
pub struct FrameDeduper {
    seen: Mutex<HashSet<String>>,
}

impl FrameDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance used by production normalization
    pub fn shared() -> &'static FrameDeduper {
        static SHARED: OnceLock<FrameDeduper> = OnceLock::new();
        SHARED.get_or_init(FrameDeduper::new)
    }

    /// Record a key; returns false when it was already present
    ///
    /// First writer wins under concurrent calls; the loser's frame is
    /// dropped, which only shortens a trace.
    pub fn insert(&self, key: &str) -> bool {
        self.seen
            .lock()
            .map(|mut seen| seen.insert(key.to_string()))
            .unwrap_or(false)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen
            .lock()
            .map(|seen| seen.contains(key))
            .unwrap_or(false)
    }

    /// Forget everything; test hook
    pub fn reset(&self) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.clear();
        }
    }
}

/// Apply selection and de-duplication, yielding resolved entries in source
/// order with `code` still unset
pub fn reduce_frames(
    frames: &[RawFrame],
    resolver: &PathResolver,
    deduper: &FrameDeduper,
) -> Vec<StackEntry> {
    let mut entries = Vec::new();
    let mut dependency_included = false;

    for frame in frames {
        let keep = match frame.origin {
            FrameOrigin::Project => true,
            FrameOrigin::Dependency if !dependency_included => {
                // One boundary frame only, even if its extraction fails below
                dependency_included = true;
                true
            }
            _ => false,
        };
        if !keep {
            continue;
        }

        let Some(classified) = parser::extract_location(&frame.text) else {
            continue;
        };

        let file = resolver.relative_path(&classified.absolute_path);
        let key = format!("{file}:{}", classified.line);
        if !deduper.insert(&key) {
            continue;
        }

        entries.push(StackEntry {
            file,
            line: classified.line,
            at: classified.label.unwrap_or_else(|| NO_DATA.to_string()),
            code: None,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::plain("/repo")
    }

    fn parse(stack: &str) -> Vec<RawFrame> {
        parser::parse_stack(stack, &resolver())
    }

    #[test]
    fn test_dependency_boundary_keeps_first_only() {
        let stack = "Error: boom\n\
                     at inner (/repo/node_modules/lib/deep.js:5:1)\n\
                     at outer (/repo/node_modules/lib/index.js:9:3)\n\
                     at handler (/repo/src/routes.ts:21:4)\n\
                     at main (/repo/src/index.ts:3:1)";
        let frames = parse(stack);
        let entries = reduce_frames(&frames, &resolver(), &FrameDeduper::new());

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].file, "../node_modules/lib/deep.js");
        assert_eq!(entries[1].file, "routes.ts");
        assert_eq!(entries[2].file, "index.ts");
    }

    #[test]
    fn test_internal_and_unknown_dropped() {
        let stack = "Error: boom\n\
                     at process (node:internal/task_queues:95:5)\n\
                     at native\n\
                     at fn (<anonymous>)\n\
                     at run (/repo/src/a.ts:3:7)\n\
                     at stranger (/elsewhere/b.ts:1:1)";
        let frames = parse(stack);
        let entries = reduce_frames(&frames, &resolver(), &FrameDeduper::new());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "a.ts");
        assert_eq!(entries[0].at, "run");
    }

    #[test]
    fn test_duplicate_location_within_call_dropped() {
        let stack = "Error: boom\n\
                     at first (/repo/src/a.ts:3:7)\n\
                     at second (/repo/src/a.ts:3:11)\n\
                     at third (/repo/src/a.ts:4:1)";
        let frames = parse(stack);
        let entries = reduce_frames(&frames, &resolver(), &FrameDeduper::new());

        // Same (file, line) pair regardless of column
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, 3);
        assert_eq!(entries[1].line, 4);
    }

    #[test]
    fn test_dedup_persists_across_calls() {
        let deduper = FrameDeduper::new();
        let stack = "Error: boom\n    at run (/repo/src/a.ts:3:7)";

        let first = reduce_frames(&parse(stack), &resolver(), &deduper);
        assert_eq!(first.len(), 1);
        assert!(deduper.contains("a.ts:3"));

        let second = reduce_frames(&parse(stack), &resolver(), &deduper);
        assert!(second.is_empty());

        deduper.reset();
        let third = reduce_frames(&parse(stack), &resolver(), &deduper);
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn test_order_preserved() {
        let stack = "Error: boom\n\
                     at c (/repo/src/c.ts:1:1)\n\
                     at b (/repo/src/b.ts:2:2)\n\
                     at a (/repo/src/a.ts:3:3)";
        let frames = parse(stack);
        let entries = reduce_frames(&frames, &resolver(), &FrameDeduper::new());
        let files: Vec<&str> = entries.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, ["c.ts", "b.ts", "a.ts"]);
    }

    #[test]
    fn test_unextractable_label_gets_sentinel() {
        let stack = "Error: boom\n    at /repo/src/a.ts:3:7";
        let entries = reduce_frames(&parse(stack), &resolver(), &FrameDeduper::new());
        assert_eq!(entries[0].at, NO_DATA);
    }
}
