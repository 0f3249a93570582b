mod items;
mod stmt;

#[cfg(test)]
mod tests;

pub(crate) use items::locate_patch;

use crate::diagnostic::Diagnostic;
use crate::syntax::ast::SourceFile;
use crate::syntax::lexeme::Lexeme;
use crate::syntax::span::{Span, Spanned};
use crate::syntax::tree::SyntaxNode;

const MAX_NESTING_DEPTH: u32 = 256;

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Spanned<Lexeme>>, source: &'src str) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Parse a whole translation unit into its patch lines and classes.
    pub(crate) fn parse_file(mut self) -> Result<SourceFile, Vec<Diagnostic>> {
        let patch = locate_patch(self.source);
        let classes = self.parse_items();
        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        Ok(SourceFile { patch, classes })
    }

    /// Parse a lone `{ ... }` block, e.g. one phase body given on its own.
    pub(crate) fn parse_block(mut self) -> Result<SyntaxNode, Vec<Diagnostic>> {
        if !self.at(&Lexeme::LBrace) {
            self.error_with_help(
                &format!("expected '{{', found {}", self.peek().description()),
                "a phase body is a brace-enclosed statement list",
            );
            return Err(self.diagnostics);
        }
        let body = self.parse_compound();
        if !self.at(&Lexeme::Eof) {
            self.error_at_current(&format!(
                "unexpected {} after the closing '}}'",
                self.peek().description()
            ));
        }
        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        Ok(body)
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "nesting depth exceeded (maximum 256 levels)",
                "flatten the conditional structure of this phase body",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    // --- Token-group helpers ---

    /// Consume a bracketed group starting at the current `(`, `[` or `{`,
    /// returning every token including both delimiters.
    fn take_balanced(&mut self) -> Vec<Spanned<Lexeme>> {
        let open_span = self.current_span();
        let mut group = Vec::new();
        let mut depth = 0u32;
        loop {
            if self.at(&Lexeme::Eof) {
                self.diagnostics.push(
                    Diagnostic::error("unclosed delimiter".to_string(), open_span)
                        .with_help("every '(', '[' and '{' needs a matching close".to_string()),
                );
                return group;
            }
            let tok = self.advance();
            match tok.node {
                Lexeme::LParen | Lexeme::LBracket | Lexeme::LBrace => depth += 1,
                Lexeme::RParen | Lexeme::RBracket | Lexeme::RBrace => depth -= 1,
                _ => {}
            }
            group.push(tok);
            if depth == 0 {
                return group;
            }
        }
    }

    /// Collect tokens up to (not including) the next `;` at bracket depth 0.
    /// Stops early at an unmatched `}` or end of file.
    fn take_until_semicolon(&mut self) -> Vec<Spanned<Lexeme>> {
        let mut tokens = Vec::new();
        loop {
            match self.peek() {
                Lexeme::Semicolon | Lexeme::RBrace | Lexeme::Eof => return tokens,
                Lexeme::LParen | Lexeme::LBracket | Lexeme::LBrace => {
                    tokens.extend(self.take_balanced());
                }
                Lexeme::RParen | Lexeme::RBracket => {
                    self.error_at_current(&format!("unexpected {}", self.peek().description()));
                    self.advance();
                }
                _ => tokens.push(self.advance()),
            }
        }
    }

    // --- Utility methods ---

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn peek_at(&self, offset: usize) -> &Lexeme {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) -> Spanned<Lexeme> {
        let tok = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> Span {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            span
        } else {
            self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            ));
            self.current_span()
        }
    }

    fn expect_ident(&mut self) -> Option<Spanned<String>> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Some(Spanned::new(name, span))
        } else {
            self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            ));
            None
        }
    }

    fn error_at_current(&mut self, msg: &str) {
        self.diagnostics
            .push(Diagnostic::error(msg.to_string(), self.current_span()));
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        self.diagnostics.push(
            Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string()),
        );
    }
}

// --- Free helpers over token slices ---

/// Token spellings joined without separators.
pub(crate) fn join_tight(tokens: &[Spanned<Lexeme>]) -> String {
    tokens.iter().map(|t| t.node.spelling()).collect()
}

/// Render a type or declarator the way it is usually written:
/// `const graphlab::empty &`, `std::vector<int>`, `pair<a, b>`.
pub(crate) fn join_type(tokens: &[Spanned<Lexeme>]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Lexeme> = None;
    for tok in tokens {
        let cur = &tok.node;
        if let Some(p) = prev {
            let tight = matches!(p, Lexeme::ColonColon | Lexeme::Lt)
                || matches!(
                    cur,
                    Lexeme::ColonColon | Lexeme::Lt | Lexeme::Gt | Lexeme::Shr | Lexeme::Comma
                );
            if !tight {
                out.push(' ');
            }
        }
        out.push_str(cur.spelling());
        prev = Some(cur);
    }
    out
}

/// Indices of tokens satisfying `pred` that sit outside every bracket pair.
pub(crate) fn top_level_positions(
    tokens: &[Spanned<Lexeme>],
    pred: impl Fn(&Lexeme) -> bool,
) -> Vec<usize> {
    let mut depth = 0i32;
    let mut found = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        match tok.node {
            Lexeme::LParen | Lexeme::LBracket | Lexeme::LBrace => depth += 1,
            Lexeme::RParen | Lexeme::RBracket | Lexeme::RBrace => depth -= 1,
            ref other if depth == 0 && pred(other) => found.push(i),
            _ => {}
        }
    }
    found
}

/// Split at top-level commas.
pub(crate) fn split_top_level_commas(tokens: &[Spanned<Lexeme>]) -> Vec<&[Spanned<Lexeme>]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut last = 0;
    for idx in top_level_positions(tokens, |t| *t == Lexeme::Comma) {
        parts.push(&tokens[last..idx]);
        last = idx + 1;
    }
    parts.push(&tokens[last..]);
    parts
}
