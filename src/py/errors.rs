use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to set Python language for parser")]
    LanguageSet,

    #[error("failed to parse Python source")]
    ParseFailed,

    #[error("syntax error at byte {byte_start}..{byte_end} (line {line})")]
    Syntax {
        byte_start: usize,
        byte_end: usize,
        line: usize,
    },

    #[error("multiple syntax errors detected: {count} ERROR nodes")]
    MultipleSyntax { count: usize },
}
