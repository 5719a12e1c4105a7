//! Unused imports detector
//!
//! Detects imported names that are never referenced elsewhere in the file.
//! Names listed in `__all__` count as referenced; `from __future__` and
//! wildcard imports are never reported.

use crate::detectors::base::{DetectionContext, Detector};
use crate::models::{Dimension, Gap, GapKind, Location};
use crate::parsers::python::{ImportStatement, PythonModule};
use std::collections::HashMap;

/// Detects unused imports
pub struct UnusedImportsDetector;

impl UnusedImportsDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnusedImportsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UnusedImportsDetector {
    fn name(&self) -> &'static str {
        "unused-import"
    }

    fn description(&self) -> &'static str {
        "Detects imports that are never used in the code"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Love
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let Some(module) = ctx.module else {
            return Vec::new();
        };

        // Statements each block loses if every removable import goes
        let mut removed: HashMap<usize, usize> = HashMap::new();
        for import in module.imports.iter().filter(|i| removable(i, module)) {
            if let Some(block) = import.block {
                *removed.entry(block).or_default() += 1;
            }
        }

        let mut gaps = Vec::new();
        for import in &module.imports {
            let unused: Vec<_> = import
                .bindings
                .iter()
                .filter(|b| !module.references.contains(&b.bound))
                .collect();
            if unused.is_empty() {
                continue;
            }

            // A block must keep one live statement
            let fixable = removable(import, module)
                && import.block.map_or(true, |block| {
                    import.block_statements > removed.get(&block).copied().unwrap_or(0)
                });

            for binding in unused {
                gaps.push(
                    ctx.gap(
                        GapKind::UnusedImport,
                        Location::spanning(import.line, import.column, import.end_line),
                        format!("Import '{}' appears unused", binding.display),
                    )
                    .fixable(fixable),
                );
            }
        }
        gaps
    }
}

/// Whole statement unused, on lines it owns
fn removable(import: &ImportStatement, module: &PythonModule) -> bool {
    !import.shares_line
        && import
            .bindings
            .iter()
            .all(|b| !module.references.contains(&b.bound))
}

#[cfg(test)]
mod tests {
    use crate::config::DetectionConfig;
    use crate::detectors::analyze;
    use crate::models::{Gap, GapKind};

    fn unused(src: &str) -> Vec<Gap> {
        analyze(src, None, &DetectionConfig::default())
            .gaps
            .into_iter()
            .filter(|g| g.kind == GapKind::UnusedImport)
            .collect()
    }

    #[test]
    fn test_unused_and_used_imports() {
        let gaps = unused("import os\nimport sys\n\nprint(sys.argv)\n");
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].location.line, 1);
        assert!(gaps[0].fixable);
    }

    #[test]
    fn test_partially_used_statement_not_fixable() {
        let gaps = unused("from os import path, sep\n\nprint(sep)\n");
        assert_eq!(gaps.len(), 1);
        assert!(gaps[0].description.contains("path"));
        assert!(!gaps[0].fixable);
    }

    #[test]
    fn test_multiline_import_spans_lines() {
        let gaps = unused("from typing import (\n    List,\n    Dict,\n)\nx = 1\n");
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].location.line, 1);
        assert_eq!(gaps[0].location.end_line, Some(4));
        assert!(gaps.iter().all(|g| g.fixable));
    }

    #[test]
    fn test_exempt_imports() {
        let src = "from __future__ import annotations\nfrom m import *\nfrom n import helper\n__all__ = ['helper']\n";
        assert!(unused(src).is_empty());
    }

    #[test]
    fn test_sole_statement_and_shared_line_not_fixable() {
        let gaps = unused("try:\n    import json\nexcept ImportError:\n    json = None\nimport a; x = 1\n");
        // `json` is referenced by the assignment, only `a` is unused
        assert_eq!(gaps.len(), 1);
        assert!(!gaps[0].fixable);

        let gaps = unused("try:\n    import ujson\nexcept ImportError:\n    pass\n");
        assert_eq!(gaps.len(), 1);
        assert!(!gaps[0].fixable);
    }

    #[test]
    fn test_block_of_unused_imports_keeps_a_statement() {
        let gaps = unused("try:\n    import a\n    import b\nexcept ImportError:\n    pass\n");
        assert_eq!(gaps.len(), 2);
        assert!(gaps.iter().all(|g| !g.fixable));

        let gaps = unused("if True:\n    import a\n    import b\n    x = 1\n");
        assert_eq!(gaps.len(), 2);
        assert!(gaps.iter().all(|g| g.fixable));
    }

    #[test]
    fn test_alias_binding() {
        let gaps = unused("import numpy as np\nimport pandas as pd\npd.DataFrame()\n");
        assert_eq!(gaps.len(), 1);
        assert!(gaps[0].description.contains("numpy as np"));
    }
}
