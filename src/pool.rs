//! Thread-local parser pooling.
//!
//! Eliminates redundant parser creation by maintaining a thread-local
//! reusable parser. Creates a new parser on first use per thread, reuses it
//! for subsequent operations; collect and rewrite each parse one tree, so a
//! sync run touches the pool twice.

use crate::py::{ParseError, PythonParser};
use std::cell::RefCell;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<PythonParser>> = const { RefCell::new(None) };
}

/// Execute a function with the pooled parser instance.
///
/// On first call per thread, creates a new parser. Subsequent calls reuse
/// the same instance, avoiding allocation and initialization overhead.
pub fn with_parser<F, R>(f: F) -> Result<R, ParseError>
where
    F: FnOnce(&mut PythonParser) -> R,
{
    PYTHON_PARSER.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(PythonParser::new()?);
        }
        Ok(f(opt.as_mut().expect("parser was just initialized above")))
    })
}
