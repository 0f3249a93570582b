//! C-family front end: lexer, restricted parser and the statement tree.

pub mod ast;
pub mod lexeme;
pub(crate) mod lexer;
pub(crate) mod parser;
pub mod span;
pub mod tree;

pub use ast::{ClassDef, ClassKeyword, FieldDecl, MethodDef, Param, SourceFile};
pub use span::{Span, Spanned};
pub use tree::{ParseNode, SyntaxKind, SyntaxNode};

use crate::diagnostic::Diagnostic;

/// Lex and parse a whole source file.
pub fn parse_source(source: &str) -> Result<SourceFile, Vec<Diagnostic>> {
    let (tokens, lex_errors) = lexer::Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    parser::Parser::new(tokens, source).parse_file()
}

/// Lex and parse a single brace-enclosed statement block.
pub fn parse_block(source: &str) -> Result<SyntaxNode, Vec<Diagnostic>> {
    let (tokens, lex_errors) = lexer::Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    parser::Parser::new(tokens, source).parse_block()
}
