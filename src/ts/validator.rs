use crate::ts::errors::TreeSitterError;
use crate::ts::parser::{CppParser, ErrorNode};

/// Validate that C++ source code has no syntax errors.
pub fn validate_syntax(source: &str) -> Result<(), TreeSitterError> {
    let mut parser = CppParser::new()?;
    let parsed = parser.parse(source)?;
    report(&parsed.error_nodes())
}

/// Validate that a rewrite didn't introduce syntax errors.
///
/// Byte positions shift when identifiers change length, so errors are
/// compared by count, and the reported span is the first rewritten error
/// whose text has no counterpart in the original.
pub fn validate_rewrite(original: &str, rewritten: &str) -> Result<(), TreeSitterError> {
    let mut parser = CppParser::new()?;

    let original_errors = parser.parse(original)?.error_nodes();
    let rewritten_errors = parser.parse(rewritten)?.error_nodes();

    if rewritten_errors.len() <= original_errors.len() {
        return Ok(());
    }

    let extra = rewritten_errors.len() - original_errors.len();
    let introduced: Vec<ErrorNode> = rewritten_errors
        .iter()
        .filter(|e| !original_errors.iter().any(|o| o.text == e.text))
        .cloned()
        .collect();

    if introduced.is_empty() {
        report(&rewritten_errors[..extra])
    } else {
        report(&introduced)
    }
}

fn report(errors: &[ErrorNode]) -> Result<(), TreeSitterError> {
    match errors {
        [] => Ok(()),
        [only] => Err(TreeSitterError::SyntaxError {
            byte_start: only.byte_start,
            byte_end: only.byte_end,
        }),
        many => Err(TreeSitterError::MultipleSyntaxErrors { count: many.len() }),
    }
}
