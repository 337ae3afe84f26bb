//! Docstring collection pass over the implementation tree.

use crate::address::{Address, AddressTracker};
use crate::py::ast;
use crate::py::parser::ParsedSource;
use std::collections::HashMap;
use tree_sitter::Node;

/// Address → docstring mapping built from the source tree.
///
/// A key that maps to `None` means the declaration exists but carries no
/// docstring; that is different from the key being absent, which means the
/// declaration does not exist in the source at all. The rewrite engine
/// treats the former as "remove the stub's docstring" and the latter as
/// "skip with a diagnostic".
pub type DocstringMap = HashMap<Address, Option<String>>;

/// Walks the source tree once and records every declaration's docstring
/// (or its absence) under the declaration's address.
pub struct DocstringCollector<'a> {
    source: &'a str,
    tracker: AddressTracker,
    map: DocstringMap,
}

impl<'a> DocstringCollector<'a> {
    /// Collect docstrings from a parsed module.
    pub fn collect(parsed: &ParsedSource<'a>) -> DocstringMap {
        let mut collector = Self {
            source: parsed.source,
            tracker: AddressTracker::new(),
            map: DocstringMap::new(),
        };

        let root = parsed.root_node();
        collector.record(root);
        collector.walk_children(root);
        collector.map
    }

    fn walk_children(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk(child);
        }
    }

    fn walk(&mut self, node: Node<'_>) {
        match node.kind() {
            ast::CLASS_DEF => {
                let Some(name) = ast::declaration_name(node, self.source) else {
                    return;
                };
                let Some(body) = ast::body_block(node) else {
                    return;
                };
                self.tracker.push(name);
                self.record(body);
                self.walk_children(body);
                self.tracker.pop();
            }
            ast::FUNCTION_DEF => {
                let Some(name) = ast::declaration_name(node, self.source) else {
                    return;
                };
                let Some(body) = ast::body_block(node) else {
                    return;
                };
                self.tracker.push(name);
                self.record(body);
                // Stub files don't support inner functions; don't descend.
                self.tracker.pop();
            }
            // Decorated definitions, conditionals, try blocks: descend until
            // a declaration is reached.
            _ => self.walk_children(node),
        }
    }

    /// Record the docstring value of `body` under the current address.
    /// Undocumented declarations get an explicit `None` entry.
    fn record(&mut self, body: Node<'_>) {
        let doc = ast::docstring(body, self.source).map(String::from);
        self.map.insert(self.tracker.current(), doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::py::parser::PythonParser;

    fn collect(source: &str) -> DocstringMap {
        let mut parser = PythonParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        DocstringCollector::collect(&parsed)
    }

    #[test]
    fn module_docstring_recorded_under_root() {
        let map = collect("\"\"\"Module doc.\"\"\"\n\nx = 1\n");
        assert_eq!(
            map.get(&Address::root()),
            Some(&Some("\"\"\"Module doc.\"\"\"".to_string()))
        );
    }

    #[test]
    fn undocumented_module_recorded_as_absent() {
        let map = collect("x = 1\n");
        assert_eq!(map.get(&Address::root()), Some(&None));
    }

    #[test]
    fn class_and_method_addresses() {
        let source = r#"
class Finder:
    """Finder doc."""

    def find_item(self):
        """Find doc."""
        return None
"#;
        let map = collect(source);

        assert_eq!(
            map.get(&Address::from_segments(["Finder"])),
            Some(&Some("\"\"\"Finder doc.\"\"\"".to_string()))
        );
        assert_eq!(
            map.get(&Address::from_segments(["Finder", "find_item"])),
            Some(&Some("\"\"\"Find doc.\"\"\"".to_string()))
        );
    }

    #[test]
    fn undocumented_declaration_gets_explicit_absent_entry() {
        let map = collect("def bare():\n    return 1\n");
        assert_eq!(map.get(&Address::from_segments(["bare"])), Some(&None));
    }

    #[test]
    fn inner_functions_are_not_collected() {
        let source = r#"
def outer():
    """Outer doc."""
    def inner():
        """Inner doc."""
        return 1
    return inner
"#;
        let map = collect(source);

        assert!(map.contains_key(&Address::from_segments(["outer"])));
        assert!(!map.contains_key(&Address::from_segments(["outer", "inner"])));
        assert!(!map.contains_key(&Address::from_segments(["inner"])));
    }

    #[test]
    fn decorated_declarations_are_transparent() {
        let source = r#"
@decorator
def wrapped():
    """Wrapped doc."""
    return 1
"#;
        let map = collect(source);
        assert_eq!(
            map.get(&Address::from_segments(["wrapped"])),
            Some(&Some("\"\"\"Wrapped doc.\"\"\"".to_string()))
        );
    }

    #[test]
    fn conditionally_defined_declarations_are_addressed() {
        let source = r#"
import sys

if sys.version_info >= (3, 12):
    def newer():
        """New-world doc."""
"#;
        let map = collect(source);
        assert_eq!(
            map.get(&Address::from_segments(["newer"])),
            Some(&Some("\"\"\"New-world doc.\"\"\"".to_string()))
        );
    }

    #[test]
    fn nested_classes_recurse() {
        let source = r#"
class Outer:
    class Inner:
        """Inner doc."""
"#;
        let map = collect(source);

        assert_eq!(map.get(&Address::from_segments(["Outer"])), Some(&None));
        assert_eq!(
            map.get(&Address::from_segments(["Outer", "Inner"])),
            Some(&Some("\"\"\"Inner doc.\"\"\"".to_string()))
        );
    }

    #[test]
    fn attribute_docstrings_are_not_declaration_docstrings() {
        let source = r#"
class Finder:
    search_obj: int
    """The object to search for."""
"#;
        let map = collect(source);
        assert_eq!(map.get(&Address::from_segments(["Finder"])), Some(&None));
    }
}
