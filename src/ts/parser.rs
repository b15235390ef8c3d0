use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter parser loaded with the C++ grammar.
///
/// Used only to sanity check rewritten text; edit locations always come
/// from the front end's tree.
pub struct CppParser {
    inner: Parser,
}

impl CppParser {
    pub fn new() -> Result<Self, TreeSitterError> {
        let grammar = SupportLang::Cpp.get_ts_language();
        let mut inner = Parser::new();
        inner
            .set_language(&grammar)
            .map_err(|_| TreeSitterError::LanguageSet)?;
        Ok(Self { inner })
    }

    pub fn parse<'a>(&mut self, text: &'a str) -> Result<CppSource<'a>, TreeSitterError> {
        let tree = self
            .inner
            .parse(text, None)
            .ok_or(TreeSitterError::ParseFailed)?;
        Ok(CppSource { text, tree })
    }
}

/// One parsed file.
pub struct CppSource<'a> {
    pub text: &'a str,
    pub tree: Tree,
}

impl CppSource<'_> {
    pub fn is_clean(&self) -> bool {
        !self.tree.root_node().has_error()
    }

    /// ERROR and MISSING nodes in document order.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut found = Vec::new();
        collect(self.tree.root_node(), self.text, &mut found);
        found
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    /// 1-based.
    pub line: usize,
    pub column: usize,
    /// Covered text, used to match errors across a rewrite.
    pub text: String,
}

fn collect(node: Node<'_>, text: &str, found: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        let range = node.byte_range();
        let start = node.start_position();
        found.push(ErrorNode {
            text: text.get(range.clone()).unwrap_or_default().to_string(),
            byte_start: range.start,
            byte_end: range.end,
            line: start.row + 1,
            column: start.column + 1,
        });
    }

    // clean subtrees hold no error nodes
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, text, found);
    }
}
