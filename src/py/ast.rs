//! Shape accessors over Python tree-sitter nodes.
//!
//! Everything the collector and the rewrite engine need to know about a
//! node lives here: declaration names, body blocks, inline-body detection,
//! and the docstring accessor. All functions are read-only over the tree.

use tree_sitter::Node;

pub const CLASS_DEF: &str = "class_definition";
pub const FUNCTION_DEF: &str = "function_definition";

const EXPRESSION_STMT: &str = "expression_statement";
const STRING: &str = "string";
const ELLIPSIS: &str = "ellipsis";

/// Node kinds that never count as statements of a body.
fn is_extra(node: Node<'_>) -> bool {
    matches!(node.kind(), "comment" | "line_continuation")
}

/// Whether this node is a class or function declaration.
pub fn is_declaration(node: Node<'_>) -> bool {
    matches!(node.kind(), CLASS_DEF | FUNCTION_DEF)
}

/// The declared name of a class or function.
pub fn declaration_name<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    let name = node.child_by_field_name("name")?;
    Some(&source[name.byte_range()])
}

/// The `body` block of a class or function declaration.
pub fn body_block(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("body")
}

/// Whether a declaration's body sits on the header line (`def f(): ...`)
/// rather than in an indented block.
///
/// Detected by comparing the row of the header's `:` with the row of the
/// body's first token; a multi-line signature still ends with the colon on
/// the body row when the body is inline.
pub fn is_inline_body(decl: Node<'_>, body: Node<'_>) -> bool {
    let mut cursor = decl.walk();
    let colon = decl.children(&mut cursor).find(|c| c.kind() == ":");
    match colon {
        Some(colon) => colon.end_position().row == body.start_position().row,
        None => false,
    }
}

/// The statements of a block or module node, in order, comments skipped.
pub fn statements(body: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|c| !is_extra(*c))
        .collect()
}

/// Whether a statement is a standalone string-literal expression.
pub fn is_string_statement(stmt: Node<'_>) -> bool {
    string_literal(stmt).is_some()
}

/// The string literal node of a standalone string-expression statement.
///
/// F-strings with interpolations are formatted expressions, not literals,
/// and never count as docstrings.
pub fn string_literal(stmt: Node<'_>) -> Option<Node<'_>> {
    if stmt.kind() != EXPRESSION_STMT || stmt.named_child_count() != 1 {
        return None;
    }
    let child = stmt.named_child(0)?;
    if child.kind() != STRING {
        return None;
    }
    let mut cursor = child.walk();
    if child
        .named_children(&mut cursor)
        .any(|c| c.kind() == "interpolation")
    {
        return None;
    }
    Some(child)
}

/// Whether a statement is the `...` placeholder expression.
pub fn is_placeholder_statement(stmt: Node<'_>) -> bool {
    stmt.kind() == EXPRESSION_STMT
        && stmt.named_child_count() == 1
        && stmt
            .named_child(0)
            .is_some_and(|c| c.kind() == ELLIPSIS)
}

/// Docstring accessor: the full string literal opening the given body's
/// statement list, exactly as written in the source (prefix, quotes, and
/// internal whitespace untouched), or `None` when the body does not start
/// with one.
pub fn docstring<'a>(body: Node<'_>, source: &'a str) -> Option<&'a str> {
    let stmts = statements(body);
    let first = stmts.first()?;
    let literal = string_literal(*first)?;
    Some(&source[literal.byte_range()])
}

/// The whitespace run immediately preceding `byte` on its line.
pub fn indent_before<'a>(source: &'a str, byte: usize) -> &'a str {
    let bytes = source.as_bytes();
    let mut start = byte;
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    &source[start..byte]
}

/// The byte offset just past the newline ending the line containing `byte`,
/// or the end of the source.
pub fn line_end(source: &str, byte: usize) -> usize {
    match source[byte..].find('\n') {
        Some(off) => byte + off + 1,
        None => source.len(),
    }
}
