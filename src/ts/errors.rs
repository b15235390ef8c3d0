use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("C++ grammar could not be loaded into the parser")]
    LanguageSet,

    #[error("tree-sitter returned no tree")]
    ParseFailed,

    #[error("rewrite introduced a syntax error at bytes {byte_start}..{byte_end}")]
    SyntaxError { byte_start: usize, byte_end: usize },

    #[error("rewrite introduced {count} syntax errors")]
    MultipleSyntaxErrors { count: usize },
}
