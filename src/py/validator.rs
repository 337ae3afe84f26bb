use crate::py::errors::ParseError;
use crate::py::parser::{ErrorNode, PythonParser};

/// Validate that Python source code has no syntax errors.
pub fn validate_syntax(source: &str) -> Result<(), ParseError> {
    let mut parser = PythonParser::new()?;
    parser.parse_with_source(source)?.check_syntax()
}

/// Validate that a rewrite did not introduce syntax errors.
///
/// Re-parses the rewritten text and fails if it contains ERROR nodes that
/// were not present in the original. A rewrite that breaks the file must be
/// reported, never written.
pub fn validate_rewrite(original: &str, rewritten: &str) -> Result<(), ParseError> {
    let mut parser = PythonParser::new()?;

    let original_errors = parser.parse_with_source(original)?.error_nodes();
    let new_errors = parser.parse_with_source(rewritten)?.error_nodes();

    let introduced: Vec<&ErrorNode> = new_errors
        .iter()
        .filter(|e| {
            !original_errors
                .iter()
                .any(|o| o.byte_start == e.byte_start && o.byte_end == e.byte_end)
        })
        .collect();

    match introduced.len() {
        0 => Ok(()),
        1 => Err(ParseError::Syntax {
            byte_start: introduced[0].byte_start,
            byte_end: introduced[0].byte_end,
            line: introduced[0].start_point.row + 1,
        }),
        n => Err(ParseError::MultipleSyntax { count: n }),
    }
}
