//! The statement-level parse tree handed to the classifier.
//!
//! Any front end can feed the converter by implementing [`ParseNode`]; the
//! bundled parser produces [`SyntaxNode`]s.

use crate::syntax::lexeme::Lexeme;
use crate::syntax::span::{Span, Spanned};

/// Statement discriminant as reported by the front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Compound,
    If,
    BinaryOperator,
    DeclStmt,
    Call,
    Return,
    Other,
}

impl SyntaxKind {
    pub fn name(self) -> &'static str {
        match self {
            SyntaxKind::Compound => "compound statement",
            SyntaxKind::If => "if statement",
            SyntaxKind::BinaryOperator => "binary operator",
            SyntaxKind::DeclStmt => "declaration",
            SyntaxKind::Call => "call",
            SyntaxKind::Return => "return statement",
            SyntaxKind::Other => "statement",
        }
    }
}

/// What the classifier needs from one parsed statement or expression.
pub trait ParseNode {
    fn kind(&self) -> SyntaxKind;

    /// Entity spelling, e.g. the callee name of a call.
    fn spelling(&self) -> &str;

    fn children(&self) -> &[Self]
    where
        Self: Sized;

    /// Exact spellings of the tokens covering this node's source range.
    fn token_spellings(&self) -> Vec<&str>;

    fn span(&self) -> Span;
}

/// A parse-tree node produced by the bundled front end.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub spelling: String,
    pub tokens: Vec<Spanned<Lexeme>>,
    pub children: Vec<SyntaxNode>,
    pub span: Span,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, tokens: Vec<Spanned<Lexeme>>) -> Self {
        let span = span_of(&tokens);
        Self {
            kind,
            spelling: String::new(),
            tokens,
            children: Vec::new(),
            span,
        }
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_spelling(mut self, spelling: String) -> Self {
        self.spelling = spelling;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Token spellings joined without separators, e.g. `vertex.data().ans`.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.node.spelling()).collect()
    }
}

impl ParseNode for SyntaxNode {
    fn kind(&self) -> SyntaxKind {
        self.kind
    }

    fn spelling(&self) -> &str {
        &self.spelling
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn token_spellings(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.node.spelling()).collect()
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// Span from the first to the last token, or a dummy span when empty.
pub(crate) fn span_of(tokens: &[Spanned<Lexeme>]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => Span::dummy(),
    }
}
