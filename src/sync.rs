//! Public entry points: collect, rewrite, and the composed sync, at both
//! the text level and the file level.

use crate::collect::{DocstringCollector, DocstringMap};
use crate::edit::{apply_edits, EditError};
use crate::pool::with_parser;
use crate::py::{self, ParseError};
use crate::rewrite::{Diagnostic, DocstringRewriter, RewriteError, RewritePlan};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Edit(#[from] EditError),

    /// The applied edits no longer parse. Nothing is written when this
    /// fires; a half-broken stub is worse than an explicit failure.
    #[error("rewrite produced invalid syntax: {0}")]
    RewriteInvalid(ParseError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The result of one rewrite pass: the updated text and the skipped
/// addresses encountered along the way.
#[derive(Debug)]
pub struct RewriteOutcome {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse source code and return a mapping of addresses to docstrings.
pub fn collect_docstrings(source: &str) -> Result<DocstringMap, SyncError> {
    let map = with_parser(|parser| -> Result<DocstringMap, SyncError> {
        let parsed = parser.parse_with_source(source)?;
        parsed.check_syntax()?;
        Ok(DocstringCollector::collect(&parsed))
    })??;
    Ok(map)
}

/// Parse target code and rewrite its docstrings according to the mapping.
///
/// The returned text is byte-identical to the input outside the touched
/// docstring regions; the whole rewrite is all-or-nothing.
pub fn rewrite_docstrings(
    target: &str,
    map: &DocstringMap,
) -> Result<RewriteOutcome, SyncError> {
    let plan = with_parser(|parser| -> Result<RewritePlan, SyncError> {
        let parsed = parser.parse_with_source(target)?;
        parsed.check_syntax()?;
        Ok(DocstringRewriter::rewrite(&parsed, map)?)
    })??;

    let code = apply_edits(target, &plan.edits)?;
    if code != target {
        py::validate_rewrite(target, &code).map_err(SyncError::RewriteInvalid)?;
    }

    Ok(RewriteOutcome {
        code,
        diagnostics: plan.diagnostics,
    })
}

/// Rewrite target code to carry the docstrings of the source code.
pub fn sync_docstrings(source: &str, target: &str) -> Result<RewriteOutcome, SyncError> {
    let map = collect_docstrings(source)?;
    rewrite_docstrings(target, &map)
}

/// The file-level result of [`sync_files`].
#[derive(Debug)]
pub struct FileSync {
    pub target: PathBuf,
    pub original: String,
    pub updated: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileSync {
    pub fn changed(&self) -> bool {
        self.original != self.updated
    }
}

/// Sync one source file into one stub file.
///
/// With `apply` set, a changed stub is rewritten in place atomically
/// (tempfile + fsync + rename); otherwise the updated text is only
/// returned, for dry runs and checks.
pub fn sync_files(source: &Path, target: &Path, apply: bool) -> Result<FileSync, SyncError> {
    let source_code = read_file(source)?;
    let target_code = read_file(target)?;

    let outcome = sync_docstrings(&source_code, &target_code)?;
    let sync = FileSync {
        target: target.to_path_buf(),
        original: target_code,
        updated: outcome.code,
        diagnostics: outcome.diagnostics,
    };

    if apply && sync.changed() {
        atomic_write(target, sync.updated.as_bytes())?;
    }

    Ok(sync)
}

fn read_file(path: &Path) -> Result<String, SyncError> {
    std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the stub on disk stays untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    let io_err = |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Create tempfile in same directory to ensure same filesystem
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = tempfile::NamedTempFile::new_in(parent.unwrap_or(Path::new(".")))
        .map_err(io_err)?;

    temp.write_all(content).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}
