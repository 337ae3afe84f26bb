//! Docstring rewrite pass over the stub tree.
//!
//! Walks the target tree with the same push/pop address discipline as the
//! collector, consults the docstring mapping at each declaration, and plans
//! verified byte-span edits through the body decision table. Unknown
//! addresses are recoverable (skip + diagnostic); undefined body shapes
//! abort the whole rewrite with no output.

use crate::address::{Address, AddressTracker};
use crate::body::{self, BodyPlan, ShapeError};
use crate::collect::DocstringMap;
use crate::edit::SpanEdit;
use crate::py::ast;
use crate::py::parser::ParsedSource;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tree_sitter::Node;

/// One skipped declaration: present in the stub, absent from the source
/// mapping. Carried as a value next to the rewritten text rather than
/// written to ambient logging state, so callers decide how to surface it.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub address: Address,
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("no docstring to remove at {address}: {shape} carries none")]
    NoDocstringToRemove {
        address: Address,
        shape: &'static str,
    },

    #[error("cannot rewrite docstring at {address}: no rule for {kind}")]
    UnsupportedBody { address: Address, kind: String },

    #[error("empty body at {address}")]
    EmptyBody { address: Address },
}

impl RewriteError {
    fn from_shape(error: ShapeError, address: Address) -> Self {
        match error {
            ShapeError::EmptyBody => RewriteError::EmptyBody { address },
            ShapeError::Unsupported { kind } => RewriteError::UnsupportedBody { address, kind },
            ShapeError::NothingToRemove { shape } => {
                RewriteError::NoDocstringToRemove { address, shape }
            }
        }
    }
}

/// The planned output of one rewrite pass: edits still to be applied, plus
/// the diagnostics gathered along the way.
#[derive(Debug, Default)]
pub struct RewritePlan {
    pub edits: Vec<SpanEdit>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Walks the stub tree and turns the docstring mapping into span edits.
pub struct DocstringRewriter<'a, 'm> {
    source: &'a str,
    map: &'m DocstringMap,
    tracker: AddressTracker,
    plan: RewritePlan,
}

impl<'a, 'm> DocstringRewriter<'a, 'm> {
    /// Plan the rewrite of a parsed stub against a docstring mapping.
    ///
    /// Declarations are handled post-order (children before their class),
    /// the module root last; a whole-body replacement subsumes any edits
    /// planned inside the span it discards.
    pub fn rewrite(
        parsed: &ParsedSource<'a>,
        map: &'m DocstringMap,
    ) -> Result<RewritePlan, RewriteError> {
        let mut rewriter = Self {
            source: parsed.source,
            map,
            tracker: AddressTracker::new(),
            plan: RewritePlan::default(),
        };

        let root = parsed.root_node();
        rewriter.walk_children(root)?;
        rewriter.rewrite_module(root)?;
        Ok(rewriter.plan)
    }

    fn walk_children(&mut self, node: Node<'_>) -> Result<(), RewriteError> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk(child)?;
        }
        Ok(())
    }

    fn walk(&mut self, node: Node<'_>) -> Result<(), RewriteError> {
        match node.kind() {
            ast::CLASS_DEF => self.rewrite_declaration(node, "class definition", true),
            // Stub files don't support inner functions; don't descend.
            ast::FUNCTION_DEF => self.rewrite_declaration(node, "function definition", false),
            _ => self.walk_children(node),
        }
    }

    fn rewrite_declaration(
        &mut self,
        node: Node<'_>,
        kind: &str,
        descend: bool,
    ) -> Result<(), RewriteError> {
        let Some(name) = ast::declaration_name(node, self.source) else {
            return Ok(());
        };
        let Some(body) = ast::body_block(node) else {
            return Ok(());
        };

        self.tracker.push(name);
        if descend {
            self.walk_children(body)?;
        }
        let address = self.tracker.current();
        self.tracker.pop();

        let Some(value) = self.map.get(&address) else {
            // The stub declares something the source doesn't; legitimate
            // for hand-maintained stubs, so skip rather than fail.
            self.plan.diagnostics.push(Diagnostic {
                address,
                reason: format!("no source entry for this {kind}, skipping"),
            });
            return Ok(());
        };

        let shape = body::classify_declaration(node, body, self.source)
            .map_err(|e| RewriteError::from_shape(e, address.clone()))?;
        let plan = body::plan_rewrite(&shape, value.as_deref(), self.source)
            .map_err(|e| RewriteError::from_shape(e, address))?;
        self.push_plan(plan);
        Ok(())
    }

    /// The module root is handled once, after the declaration walk.
    fn rewrite_module(&mut self, root: Node<'_>) -> Result<(), RewriteError> {
        let address = Address::root();

        let Some(value) = self.map.get(&address) else {
            self.plan.diagnostics.push(Diagnostic {
                address,
                reason: "no source entry for the module root, skipping".to_string(),
            });
            return Ok(());
        };

        let shape = body::classify_module(root)
            .map_err(|e| RewriteError::from_shape(e, address.clone()))?;
        let plan = body::plan_rewrite(&shape, value.as_deref(), self.source)
            .map_err(|e| RewriteError::from_shape(e, address))?;
        self.push_plan(plan);
        Ok(())
    }

    fn push_plan(&mut self, plan: BodyPlan) {
        match plan {
            BodyPlan::Keep => {}
            BodyPlan::ReplaceDocstring {
                byte_start,
                byte_end,
                literal,
            } => self.push_edit(byte_start, byte_end, literal),
            BodyPlan::RemoveDocstring {
                byte_start,
                byte_end,
            } => self.push_edit(byte_start, byte_end, String::new()),
            BodyPlan::ReplaceBody {
                byte_start,
                byte_end,
                new_text,
            } => {
                // The body's previous content is discarded wholesale, and
                // with it any edits planned for declarations inside it.
                self.plan
                    .edits
                    .retain(|e| !(e.byte_start >= byte_start && e.byte_end <= byte_end));
                self.push_edit(byte_start, byte_end, new_text);
            }
            BodyPlan::InsertDocstring { at, new_text } => {
                self.plan.edits.push(SpanEdit::new(at, at, new_text, ""));
            }
        }
    }

    fn push_edit(&mut self, byte_start: usize, byte_end: usize, new_text: String) {
        let expected = &self.source[byte_start..byte_end];
        self.plan
            .edits
            .push(SpanEdit::new(byte_start, byte_end, new_text, expected));
    }
}
