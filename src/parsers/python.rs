//! Python parser using tree-sitter
//!
//! Builds a flat summary of a module: function and class definitions with
//! their header/body layout, import statements and the names they bind,
//! exception handlers, and every name referenced outside an import.

use std::collections::HashSet;
use tree_sitter::{Node, Parser, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Function,
    Class,
}

/// A `def` or `class` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    /// 1-based line of the `def`/`class` keyword
    pub line: usize,
    pub column: usize,
    /// 1-based line holding the header's `:`
    pub header_end_line: usize,
    /// 1-based line of the first statement of the body
    pub body_line: usize,
    /// Leading whitespace of the first body statement's line
    pub body_indent: String,
    pub has_docstring: bool,
    /// Cyclomatic complexity estimate, functions only
    pub complexity: usize,
}

/// A name bound by an import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Name introduced into the module namespace
    pub bound: String,
    /// Text shown to users (`os.path`, `numpy as np`)
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub line: usize,
    pub end_line: usize,
    pub column: usize,
    pub bindings: Vec<ImportBinding>,
    /// Another statement shares one of the import's lines
    pub shares_line: bool,
    /// Start byte of the enclosing indented block, `None` at module level
    pub block: Option<usize>,
    /// Statements in that block, this import included
    pub block_statements: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptClause {
    pub line: usize,
    pub column: usize,
    /// No exception type given
    pub bare: bool,
    /// The handler contains a `raise`
    pub reraises: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PythonModule {
    pub has_error: bool,
    pub error_count: usize,
    /// 1-based line and character column of the first error node
    pub first_error: Option<(usize, usize)>,
    pub definitions: Vec<Definition>,
    pub imports: Vec<ImportStatement>,
    pub except_clauses: Vec<ExceptClause>,
    /// Identifiers used outside import statements, plus `__all__` entries
    pub references: HashSet<String>,
}

/// Parse Python source into a syntax tree.
///
/// Returns `None` only if the grammar cannot be loaded or parsing was
/// cancelled; syntax errors are represented inside the tree.
pub fn parse_tree(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    parser.parse(source, None)
}

/// Parse and summarize a module
pub fn parse_module(source: &str) -> Option<PythonModule> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();
    let bytes = source.as_bytes();

    let mut module = PythonModule::default();
    structural_errors(source, root, &mut module);
    visit(source, bytes, root, &mut module);
    Some(module)
}

/// Count structural errors without building a summary
pub fn error_count(source: &str) -> Option<usize> {
    let tree = parse_tree(source)?;
    let mut module = PythonModule::default();
    structural_errors(source, tree.root_node(), &mut module);
    if !module.has_error {
        return Some(0);
    }
    Some(module.error_count.max(1))
}

fn structural_errors(source: &str, root: Node, module: &mut PythonModule) {
    if root.has_error() {
        collect_errors(source, root, module);
    }
    collect_empty_blocks(source, root, module);
    module.has_error = root.has_error() || module.error_count > 0;
}

/// Blocks holding nothing but comments. tree-sitter accepts them, CPython
/// raises `IndentationError`.
fn collect_empty_blocks(source: &str, node: Node, module: &mut PythonModule) {
    for child in node.named_children(&mut node.walk()) {
        if child.kind() == "block" && live_statements(child) == 0 {
            module.error_count += 1;
            // reported at the compound statement that owns the block
            let (line, column) = (
                node.start_position().row + 1,
                char_column(source, node.start_byte()),
            );
            if module.first_error.map_or(true, |first| (line, column) < first) {
                module.first_error = Some((line, column));
            }
        }
        collect_empty_blocks(source, child, module);
    }
}

fn live_statements(block: Node) -> usize {
    block
        .named_children(&mut block.walk())
        .filter(|c| c.kind() != "comment")
        .count()
}

fn collect_errors(source: &str, node: Node, module: &mut PythonModule) {
    if node.is_error() || node.is_missing() {
        module.error_count += 1;
        if module.first_error.is_none() {
            module.first_error = Some((
                node.start_position().row + 1,
                char_column(source, node.start_byte()),
            ));
        }
        if node.is_missing() {
            return;
        }
    }
    for child in node.children(&mut node.walk()) {
        if child.has_error() || child.is_missing() {
            collect_errors(source, child, module);
        }
    }
}

/// Character column of a byte offset within its line
pub(crate) fn char_column(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    let line_start = source[..byte].rfind('\n').map_or(0, |i| i + 1);
    source
        .get(line_start..byte)
        .map(|s| s.chars().count())
        .unwrap_or(0)
}

fn line_text(source: &str, row: usize) -> &str {
    source
        .split('\n')
        .nth(row)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or("")
}

fn visit(source: &str, bytes: &[u8], node: Node, module: &mut PythonModule) {
    match node.kind() {
        "function_definition" | "class_definition" => {
            if let Some(def) = definition(source, bytes, node) {
                module.definitions.push(def);
            }
        }
        "import_statement" | "import_from_statement" => {
            if let Some(import) = import_statement(source, bytes, node) {
                module.imports.push(import);
            }
            return;
        }
        "future_import_statement" => return,
        "except_clause" | "except_group_clause" => {
            module.except_clauses.push(except_clause(source, node));
        }
        "identifier" => {
            if let Ok(text) = node.utf8_text(bytes) {
                module.references.insert(text.to_string());
            }
        }
        "assignment" | "augmented_assignment" => {
            collect_dunder_all(bytes, node, &mut module.references);
        }
        _ => {}
    }

    for child in node.children(&mut node.walk()) {
        visit(source, bytes, child, module);
    }
}

fn definition(source: &str, bytes: &[u8], node: Node) -> Option<Definition> {
    let kind = if node.kind() == "class_definition" {
        DefinitionKind::Class
    } else {
        DefinitionKind::Function
    };
    let name_node = node.child_by_field_name("name")?;
    let name = name_node.utf8_text(bytes).ok()?.to_string();
    let body = node.child_by_field_name("body")?;

    let header_end_row = node
        .children(&mut node.walk())
        .find(|c| c.kind() == ":")
        .map(|c| c.start_position().row)
        .unwrap_or_else(|| body.start_position().row);

    let first_stmt = body
        .named_children(&mut body.walk())
        .find(|c| c.kind() != "comment");
    let body_row = first_stmt
        .map(|s| s.start_position().row)
        .unwrap_or_else(|| body.start_position().row);
    let has_docstring = first_stmt.is_some_and(is_docstring);
    let body_indent = super::indentation(line_text(source, body_row)).to_string();

    let complexity = match kind {
        DefinitionKind::Function => {
            let mut count = 1;
            count_branches(body, &mut count);
            count
        }
        DefinitionKind::Class => 0,
    };

    Some(Definition {
        kind,
        name,
        line: node.start_position().row + 1,
        column: char_column(source, node.start_byte()),
        header_end_line: header_end_row + 1,
        body_line: body_row + 1,
        body_indent,
        has_docstring,
        complexity,
    })
}

fn is_docstring(stmt: Node) -> bool {
    if stmt.kind() != "expression_statement" {
        return false;
    }
    stmt.named_child(0)
        .is_some_and(|e| matches!(e.kind(), "string" | "concatenated_string"))
}

/// Cyclomatic complexity: one per branch point, boolean operator and
/// comprehension
fn count_branches(node: Node, complexity: &mut usize) {
    match node.kind() {
        "if_statement" | "elif_clause" | "while_statement" | "for_statement" | "except_clause"
        | "except_group_clause" | "boolean_operator" | "case_clause" => *complexity += 1,
        "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
        | "generator_expression" => *complexity += 1,
        _ => {}
    }
    for child in node.children(&mut node.walk()) {
        count_branches(child, complexity);
    }
}

fn import_statement(source: &str, bytes: &[u8], node: Node) -> Option<ImportStatement> {
    let mut bindings = Vec::new();
    let is_from = node.kind() == "import_from_statement";
    let module_name = node.child_by_field_name("module_name");

    for child in node.named_children(&mut node.walk()) {
        if Some(child) == module_name {
            continue;
        }
        match child.kind() {
            "dotted_name" => {
                let text = child.utf8_text(bytes).ok()?;
                // `import a.b` binds `a`; `from m import a` binds `a`
                let bound = text.split('.').next().unwrap_or(text).trim().to_string();
                bindings.push(ImportBinding {
                    bound,
                    display: text.to_string(),
                });
            }
            "aliased_import" => {
                let alias = child.child_by_field_name("alias")?.utf8_text(bytes).ok()?;
                bindings.push(ImportBinding {
                    bound: alias.to_string(),
                    display: child.utf8_text(bytes).ok()?.to_string(),
                });
            }
            // `from m import *` binds nothing we can track
            "wildcard_import" => return None,
            _ => {}
        }
    }
    if bindings.is_empty() || (is_from && module_name.is_none()) {
        return None;
    }

    let start = node.start_position();
    let end = node.end_position();
    let before = source
        .get(node.start_byte() - start.column..node.start_byte())
        .unwrap_or("");
    let after_line = line_text(source, end.row);
    let after = after_line.get(end.column..).unwrap_or("").trim();
    let after = after.strip_prefix(';').unwrap_or(after).trim();
    let shares_line = !before.trim().is_empty() || !(after.is_empty() || after.starts_with('#'));

    let (block, block_statements) = match node.parent() {
        Some(p) if p.kind() == "block" => (Some(p.start_byte()), live_statements(p)),
        _ => (None, 0),
    };

    Some(ImportStatement {
        line: start.row + 1,
        end_line: end.row + 1,
        column: char_column(source, node.start_byte()),
        bindings,
        shares_line,
        block,
        block_statements,
    })
}

fn except_clause(source: &str, node: Node) -> ExceptClause {
    let bare = node
        .named_children(&mut node.walk())
        .all(|c| matches!(c.kind(), "block" | "comment"));
    ExceptClause {
        line: node.start_position().row + 1,
        column: char_column(source, node.start_byte()),
        bare,
        reraises: contains_raise(node),
    }
}

fn contains_raise(node: Node) -> bool {
    node.children(&mut node.walk()).any(|child| match child.kind() {
        "raise_statement" => true,
        "function_definition" | "class_definition" | "lambda" => false,
        _ => contains_raise(child),
    })
}

/// `__all__ = ["name", ...]` keeps `name` alive
fn collect_dunder_all(bytes: &[u8], node: Node, references: &mut HashSet<String>) {
    let is_dunder_all = node
        .child_by_field_name("left")
        .and_then(|l| l.utf8_text(bytes).ok())
        .is_some_and(|l| l == "__all__");
    if !is_dunder_all {
        return;
    }
    if let Some(right) = node.child_by_field_name("right") {
        collect_strings(bytes, right, references);
    }
}

fn collect_strings(bytes: &[u8], node: Node, references: &mut HashSet<String>) {
    if node.kind() == "string" {
        if let Ok(text) = node.utf8_text(bytes) {
            let name = text
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .trim_matches(|c| c == '"' || c == '\'');
            references.insert(name.to_string());
        }
        return;
    }
    for child in node.named_children(&mut node.walk()) {
        collect_strings(bytes, child, references);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(src: &str) -> PythonModule {
        parse_module(src).expect("python grammar loads")
    }

    #[test]
    fn test_parse_simple_function() {
        let m = module("def hello(name):\n    \"\"\"Greet someone.\"\"\"\n    return name\n");
        assert!(!m.has_error);
        assert_eq!(m.definitions.len(), 1);
        let def = &m.definitions[0];
        assert_eq!(def.name, "hello");
        assert_eq!(def.kind, DefinitionKind::Function);
        assert!(def.has_docstring);
        assert_eq!(def.line, 1);
        assert_eq!(def.header_end_line, 1);
        assert_eq!(def.body_line, 2);
        assert_eq!(def.body_indent, "    ");
    }

    #[test]
    fn test_multiline_header_and_inline_body() {
        let m = module("def f(\n    a,\n    b,\n):\n    return a\n\nclass K: pass\n");
        let f = &m.definitions[0];
        assert_eq!(f.header_end_line, 4);
        assert_eq!(f.body_line, 5);
        assert!(!f.has_docstring);

        let k = &m.definitions[1];
        assert_eq!(k.kind, DefinitionKind::Class);
        assert_eq!(k.header_end_line, 7);
        assert_eq!(k.body_line, 7);
    }

    #[test]
    fn test_comment_before_docstring_is_skipped() {
        let m = module("class A:\n    # note\n    'doc'\n");
        assert!(m.definitions[0].has_docstring);
    }

    #[test]
    fn test_async_and_nested_definitions() {
        let m = module(
            "class Outer:\n    async def run(self):\n        def inner():\n            pass\n",
        );
        let names: Vec<_> = m.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "run", "inner"]);
        assert_eq!(m.definitions[1].column, 4);
    }

    #[test]
    fn test_complexity_calculation() {
        let src = "def f(x):\n    if x and x > 1:\n        return 1\n    elif x:\n        return 2\n    for i in range(x):\n        pass\n    return [i for i in x]\n";
        let m = module(src);
        // 1 + if + and + elif + for + comprehension
        assert_eq!(m.definitions[0].complexity, 6);
    }

    #[test]
    fn test_parse_imports() {
        let m = module(
            "import os, os.path\nimport numpy as np\nfrom typing import (\n    List,\n    Dict as D,\n)\nfrom x import *\nfrom __future__ import annotations\n",
        );
        assert_eq!(m.imports.len(), 3);
        let bound: Vec<_> = m.imports[0].bindings.iter().map(|b| b.bound.as_str()).collect();
        assert_eq!(bound, vec!["os", "os"]);
        assert_eq!(m.imports[0].bindings[1].display, "os.path");
        assert_eq!(m.imports[1].bindings[0].bound, "np");
        assert_eq!(m.imports[2].line, 3);
        assert_eq!(m.imports[2].end_line, 6);
        let bound: Vec<_> = m.imports[2].bindings.iter().map(|b| b.bound.as_str()).collect();
        assert_eq!(bound, vec!["List", "D"]);
        assert!(!m.references.contains("os"));
    }

    #[test]
    fn test_import_layout_flags() {
        let m = module("import a; import b\ntry:\n    import c\nexcept ImportError:\n    c = None\n");
        assert!(m.imports[0].shares_line);
        assert!(m.imports[1].shares_line);
        assert!(!m.imports[2].shares_line);
        assert_eq!(m.imports[0].block, None);
        assert!(m.imports[2].block.is_some());
        assert_eq!(m.imports[2].block_statements, 1);
    }

    #[test]
    fn test_references_include_dunder_all() {
        let m = module("from m import helper\n__all__ = ['helper']\nx = os.path.join('a')\n");
        assert!(m.references.contains("helper"));
        assert!(m.references.contains("os"));
    }

    #[test]
    fn test_except_clauses() {
        let m = module(
            "try:\n    pass\nexcept:\n    raise\ntry:\n    pass\nexcept:\n    pass\ntry:\n    pass\nexcept ValueError:\n    pass\n",
        );
        assert_eq!(m.except_clauses.len(), 3);
        assert!(m.except_clauses[0].bare && m.except_clauses[0].reraises);
        assert!(m.except_clauses[1].bare && !m.except_clauses[1].reraises);
        assert_eq!(m.except_clauses[1].line, 7);
        assert!(!m.except_clauses[2].bare);
    }

    #[test]
    fn test_errors_are_counted() {
        let m = module("def f(:\n    pass\n");
        assert!(m.has_error);
        assert!(m.error_count >= 1);
        assert!(m.first_error.is_some());
        assert_eq!(error_count("x = 1\n"), Some(0));
        assert!(error_count("x = (1\n").unwrap_or(0) >= 1);
    }

    #[test]
    fn test_comment_only_block_is_an_error() {
        let src = "x = 1\ntry:\n    # import a\n    # import b\nexcept ImportError:\n    pass\n";
        let m = module(src);
        assert!(m.has_error);
        assert_eq!(m.first_error, Some((2, 0)));
        assert_eq!(error_count(src), Some(1));
        assert_eq!(error_count("if x:\n    # note\n    pass\n"), Some(0));
    }

    #[test]
    fn test_char_column_counts_characters() {
        let src = "s = 'é'; import os";
        let byte = src.find("import").unwrap();
        assert_eq!(char_column(src, byte), 9);
    }
}
