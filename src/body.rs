//! Body classification and the docstring rewrite decision table.
//!
//! A declaration body is classified by its first real statement into a
//! closed set of shapes, and `(shape, requested value)` is resolved through
//! one exhaustive match into a [`BodyPlan`]. Every combination is either a
//! concrete plan or an explicit error; there is no fallthrough. The
//! classifier inspects only the first statement; trailing content is never
//! scanned for a docstring.

use crate::py::ast;
use tree_sitter::Node;

/// One level of Python indentation, used when an inline body is expanded
/// into an indented block.
const BLOCK_INDENT: &str = "    ";

/// The shape of a declaration body, determined by its first statement.
#[derive(Debug, Clone)]
pub enum BodyShape<'t> {
    /// Block whose first statement is a standalone string literal.
    DocstringFirst {
        statement: Node<'t>,
        literal: Node<'t>,
    },
    /// Block whose first statement is the `...` placeholder; the body is
    /// assumed to carry no payload worth preserving.
    PlaceholderFirst { body_start: usize, body_end: usize },
    /// Non-empty block that opens with an ordinary statement.
    StatementFirst { insert_at: usize },
    /// `def f(): ...`, where the placeholder sits on the header line with
    /// no indented block around it.
    InlinePlaceholder {
        body_start: usize,
        body_end: usize,
        header_indent: String,
    },
}

impl BodyShape<'_> {
    /// Short human-readable label, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            BodyShape::DocstringFirst { .. } => "docstring-led body",
            BodyShape::PlaceholderFirst { .. } => "placeholder body",
            BodyShape::StatementFirst { .. } => "undocumented body",
            BodyShape::InlinePlaceholder { .. } => "inline placeholder body",
        }
    }
}

/// A planned body update, expressed as byte-span work against the target
/// source. Produced only by [`plan_rewrite`]; materialized by the rewrite
/// engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPlan {
    /// The target already carries the requested literal; leave every byte
    /// alone.
    Keep,
    /// Swap the existing docstring literal for the source's literal.
    ReplaceDocstring {
        byte_start: usize,
        byte_end: usize,
        literal: String,
    },
    /// Delete the docstring statement's lines entirely.
    RemoveDocstring { byte_start: usize, byte_end: usize },
    /// Throw away the whole body and put a lone docstring statement in its
    /// place. Any edits planned inside this span are subsumed.
    ReplaceBody {
        byte_start: usize,
        byte_end: usize,
        new_text: String,
    },
    /// Insert a docstring statement in front of the body's first statement.
    InsertDocstring { at: usize, new_text: String },
}

/// Why a body could not be classified or rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The body holds no statements at all.
    EmptyBody,
    /// The first statement (or inline body) is a form with no defined rule,
    /// e.g. an inline docstring or an inline real statement.
    Unsupported { kind: String },
    /// Removal was requested but the body has no docstring to remove.
    NothingToRemove { shape: &'static str },
}

/// Classify a class or function declaration's body.
pub fn classify_declaration<'t>(
    decl: Node<'t>,
    body: Node<'t>,
    source: &str,
) -> Result<BodyShape<'t>, ShapeError> {
    let stmts = ast::statements(body);
    let Some(first) = stmts.first().copied() else {
        return Err(ShapeError::EmptyBody);
    };

    if ast::is_inline_body(decl, body) {
        if ast::is_placeholder_statement(first) {
            return Ok(BodyShape::InlinePlaceholder {
                body_start: body.start_byte(),
                body_end: body.end_byte(),
                header_indent: format!(
                    "{}{}",
                    ast::indent_before(source, decl.start_byte()),
                    BLOCK_INDENT
                ),
            });
        }
        return Err(ShapeError::Unsupported {
            kind: format!("inline {}", first.kind()),
        });
    }

    classify_block(first, body.start_byte(), body.end_byte())
}

/// Classify the module root. A module is never inline; its "body" is the
/// top-level statement list.
pub fn classify_module(module: Node<'_>) -> Result<BodyShape<'_>, ShapeError> {
    let stmts = ast::statements(module);
    let Some(first) = stmts.first().copied() else {
        return Err(ShapeError::EmptyBody);
    };
    let last = *stmts.last().expect("non-empty statement list has a last");

    classify_block(first, first.start_byte(), last.end_byte())
}

fn classify_block(
    first: Node<'_>,
    body_start: usize,
    body_end: usize,
) -> Result<BodyShape<'_>, ShapeError> {
    if let Some(literal) = ast::string_literal(first) {
        return Ok(BodyShape::DocstringFirst {
            statement: first,
            literal,
        });
    }
    if ast::is_placeholder_statement(first) {
        return Ok(BodyShape::PlaceholderFirst {
            body_start,
            body_end,
        });
    }
    Ok(BodyShape::StatementFirst {
        insert_at: first.start_byte(),
    })
}

/// The decision table: resolve a body shape and a requested docstring value
/// into a plan, or fail on the combinations that have no defined rule.
///
/// `new_value` is the source's literal (full text, quotes included) or
/// `None` to request removal.
pub fn plan_rewrite(
    shape: &BodyShape<'_>,
    new_value: Option<&str>,
    source: &str,
) -> Result<BodyPlan, ShapeError> {
    match (shape, new_value) {
        // Replace a stale docstring with the source's version. Equal
        // literals plan no edit, so an in-sync stub round-trips untouched.
        (BodyShape::DocstringFirst { literal, .. }, Some(text)) => {
            let existing = &source[literal.byte_range()];
            if existing == text {
                Ok(BodyPlan::Keep)
            } else {
                Ok(BodyPlan::ReplaceDocstring {
                    byte_start: literal.start_byte(),
                    byte_end: literal.end_byte(),
                    literal: text.to_string(),
                })
            }
        }

        // Remove the stub's docstring to match the source's removal. The
        // span covers the statement's indentation through its final
        // newline.
        (BodyShape::DocstringFirst { statement, .. }, None) => {
            let start =
                statement.start_byte() - ast::indent_before(source, statement.start_byte()).len();
            let end = ast::line_end(source, statement.end_byte().saturating_sub(1));
            Ok(BodyPlan::RemoveDocstring {
                byte_start: start,
                byte_end: end,
            })
        }

        // A placeholder-led body carries nothing worth keeping: the whole
        // block becomes a single docstring statement.
        (
            BodyShape::PlaceholderFirst {
                body_start,
                body_end,
            },
            Some(text),
        ) => Ok(BodyPlan::ReplaceBody {
            byte_start: *body_start,
            byte_end: *body_end,
            new_text: text.to_string(),
        }),

        // An ordinary body gains a docstring in front of its first
        // statement; nothing else moves.
        (BodyShape::StatementFirst { insert_at }, Some(text)) => {
            let indent = ast::indent_before(source, *insert_at);
            Ok(BodyPlan::InsertDocstring {
                at: *insert_at,
                new_text: format!("{text}\n{indent}"),
            })
        }

        // The header-line placeholder is dropped and an indented block
        // holding only the docstring takes its place.
        (
            BodyShape::InlinePlaceholder {
                body_start,
                body_end,
                header_indent,
            },
            Some(text),
        ) => Ok(BodyPlan::ReplaceBody {
            byte_start: *body_start,
            byte_end: *body_end,
            new_text: format!("\n{header_indent}{text}"),
        }),

        // Removal requested where no docstring exists: no rule is defined,
        // and guessing here risks corrupting the stub silently.
        (
            shape @ (BodyShape::PlaceholderFirst { .. }
            | BodyShape::StatementFirst { .. }
            | BodyShape::InlinePlaceholder { .. }),
            None,
        ) => Err(ShapeError::NothingToRemove {
            shape: shape.describe(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::py::parser::{ParsedSource, PythonParser};

    fn with_decl_shape<R>(
        source: &str,
        f: impl FnOnce(Result<BodyShape<'_>, ShapeError>, &str) -> R,
    ) -> R {
        let mut parser = PythonParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let decl = ast::statements(parsed.root_node())
            .into_iter()
            .find(|n| ast::is_declaration(*n))
            .expect("fixture has a declaration");
        let body = ast::body_block(decl).unwrap();
        f(classify_declaration(decl, body, source), source)
    }

    #[test]
    fn classify_docstring_first() {
        with_decl_shape("def f():\n    \"\"\"doc\"\"\"\n    return 1\n", |shape, _| {
            assert!(matches!(shape, Ok(BodyShape::DocstringFirst { .. })));
        });
    }

    #[test]
    fn classify_placeholder_first() {
        with_decl_shape("def f():\n    ...\n", |shape, _| {
            assert!(matches!(shape, Ok(BodyShape::PlaceholderFirst { .. })));
        });
    }

    #[test]
    fn classify_statement_first() {
        with_decl_shape("def f():\n    return 1\n", |shape, _| {
            assert!(matches!(shape, Ok(BodyShape::StatementFirst { .. })));
        });
    }

    #[test]
    fn classify_pass_as_statement_first() {
        // `pass` is an ordinary statement, not a discardable placeholder.
        with_decl_shape("def f():\n    pass\n", |shape, _| {
            assert!(matches!(shape, Ok(BodyShape::StatementFirst { .. })));
        });
    }

    #[test]
    fn classify_inline_placeholder() {
        with_decl_shape("def f(): ...\n", |shape, _| {
            assert!(matches!(shape, Ok(BodyShape::InlinePlaceholder { .. })));
        });
    }

    #[test]
    fn inline_real_statement_is_unsupported() {
        with_decl_shape("def f(): return 1\n", |shape, _| {
            assert!(matches!(shape, Err(ShapeError::Unsupported { .. })));
        });
    }

    #[test]
    fn inline_docstring_is_unsupported() {
        with_decl_shape("def f(): \"doc\"\n", |shape, _| {
            assert!(matches!(shape, Err(ShapeError::Unsupported { .. })));
        });
    }

    #[test]
    fn replace_stale_docstring() {
        with_decl_shape(
            "def f():\n    \"\"\"stale\"\"\"\n    return 1\n",
            |shape, source| {
                let plan = plan_rewrite(&shape.unwrap(), Some("\"\"\"fresh\"\"\""), source).unwrap();
                match plan {
                    BodyPlan::ReplaceDocstring {
                        byte_start,
                        byte_end,
                        literal,
                    } => {
                        assert_eq!(&source[byte_start..byte_end], "\"\"\"stale\"\"\"");
                        assert_eq!(literal, "\"\"\"fresh\"\"\"");
                    }
                    other => panic!("unexpected plan: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn equal_literal_plans_no_edit() {
        with_decl_shape("def f():\n    '''same'''\n    return 1\n", |shape, source| {
            let plan = plan_rewrite(&shape.unwrap(), Some("'''same'''"), source).unwrap();
            assert_eq!(plan, BodyPlan::Keep);
        });
    }

    #[test]
    fn remove_docstring_takes_whole_lines() {
        with_decl_shape(
            "def f():\n    \"\"\"doc\"\"\"\n    return 1\n",
            |shape, source| {
                let plan = plan_rewrite(&shape.unwrap(), None, source).unwrap();
                match plan {
                    BodyPlan::RemoveDocstring {
                        byte_start,
                        byte_end,
                    } => {
                        assert_eq!(&source[byte_start..byte_end], "    \"\"\"doc\"\"\"\n");
                    }
                    other => panic!("unexpected plan: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn remove_multiline_docstring() {
        with_decl_shape(
            "def f():\n    \"\"\"one\n    two\n    \"\"\"\n    return 1\n",
            |shape, source| {
                let plan = plan_rewrite(&shape.unwrap(), None, source).unwrap();
                match plan {
                    BodyPlan::RemoveDocstring {
                        byte_start,
                        byte_end,
                    } => {
                        assert_eq!(
                            &source[byte_start..byte_end],
                            "    \"\"\"one\n    two\n    \"\"\"\n"
                        );
                    }
                    other => panic!("unexpected plan: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn placeholder_body_is_discarded_for_a_docstring() {
        with_decl_shape("def f():\n    ...\n", |shape, source| {
            let plan = plan_rewrite(&shape.unwrap(), Some("\"\"\"doc\"\"\""), source).unwrap();
            match plan {
                BodyPlan::ReplaceBody {
                    byte_start,
                    byte_end,
                    new_text,
                } => {
                    assert_eq!(&source[byte_start..byte_end], "...");
                    assert_eq!(new_text, "\"\"\"doc\"\"\"");
                }
                other => panic!("unexpected plan: {other:?}"),
            }
        });
    }

    #[test]
    fn statement_first_gets_prepended_docstring() {
        with_decl_shape("class C:\n    x: int = 1\n", |shape, source| {
            let plan = plan_rewrite(&shape.unwrap(), Some("\"\"\"doc\"\"\""), source).unwrap();
            match plan {
                BodyPlan::InsertDocstring { at, new_text } => {
                    assert_eq!(at, source.find("x: int").unwrap());
                    assert_eq!(new_text, "\"\"\"doc\"\"\"\n    ");
                }
                other => panic!("unexpected plan: {other:?}"),
            }
        });
    }

    #[test]
    fn inline_placeholder_becomes_indented_block() {
        with_decl_shape("class C: ...\n", |shape, source| {
            let plan = plan_rewrite(&shape.unwrap(), Some("\"\"\"doc\"\"\""), source).unwrap();
            match plan {
                BodyPlan::ReplaceBody {
                    byte_start,
                    byte_end,
                    new_text,
                } => {
                    assert_eq!(&source[byte_start..byte_end], "...");
                    assert_eq!(new_text, "\n    \"\"\"doc\"\"\"");
                }
                other => panic!("unexpected plan: {other:?}"),
            }
        });
    }

    #[test]
    fn nested_inline_placeholder_indents_from_its_header() {
        let mut parser = PythonParser::new().unwrap();
        let source = "class C:\n    def m(self): ...\n";
        let parsed: ParsedSource<'_> = parser.parse_with_source(source).unwrap();
        let class = ast::statements(parsed.root_node())[0];
        let class_body = ast::body_block(class).unwrap();
        let method = ast::statements(class_body)[0];
        let method_body = ast::body_block(method).unwrap();

        let shape = classify_declaration(method, method_body, source).unwrap();
        let plan = plan_rewrite(&shape, Some("\"\"\"doc\"\"\""), source).unwrap();
        match plan {
            BodyPlan::ReplaceBody { new_text, .. } => {
                assert_eq!(new_text, "\n        \"\"\"doc\"\"\"");
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn removal_without_docstring_is_fatal() {
        for source in [
            "def f():\n    ...\n",
            "def f():\n    return 1\n",
            "def f(): ...\n",
        ] {
            with_decl_shape(source, |shape, source| {
                let result = plan_rewrite(&shape.unwrap(), None, source);
                assert!(
                    matches!(result, Err(ShapeError::NothingToRemove { .. })),
                    "expected fatal removal for {source:?}"
                );
            });
        }
    }

    #[test]
    fn empty_module_is_undefined() {
        let mut parser = PythonParser::new().unwrap();
        let parsed = parser.parse_with_source("").unwrap();
        assert!(matches!(
            classify_module(parsed.root_node()),
            Err(ShapeError::EmptyBody)
        ));
    }

    #[test]
    fn module_classification() {
        let mut parser = PythonParser::new().unwrap();
        let source = "\"\"\"mod doc\"\"\"\n\nimport os\n";
        let parsed = parser.parse_with_source(source).unwrap();
        assert!(matches!(
            classify_module(parsed.root_node()),
            Ok(BodyShape::DocstringFirst { .. })
        ));

        let source = "import os\n";
        let parsed = parser.parse_with_source(source).unwrap();
        assert!(matches!(
            classify_module(parsed.root_node()),
            Ok(BodyShape::StatementFirst { .. })
        ));
    }
}
