use super::{join_tight, split_top_level_commas, top_level_positions, Parser};
use crate::syntax::lexeme::Lexeme;
use crate::syntax::span::Spanned;
use crate::syntax::tree::{span_of, SyntaxKind, SyntaxNode};

impl<'src> Parser<'src> {
    // --- Statement parsing ---

    /// `{ stmt* }`, with the current token on the opening brace.
    pub(super) fn parse_compound(&mut self) -> SyntaxNode {
        let start = self.expect(&Lexeme::LBrace);
        if !self.enter_nesting() {
            // Skip the rest of the input rather than recurse further.
            while !self.at(&Lexeme::Eof) {
                self.advance();
            }
            self.exit_nesting();
            return SyntaxNode::new(SyntaxKind::Compound, Vec::new()).with_span(start);
        }
        let mut children = Vec::new();
        while !self.at(&Lexeme::RBrace) && !self.at(&Lexeme::Eof) {
            if let Some(stmt) = self.parse_statement() {
                children.push(stmt);
            }
        }
        let end = self.expect(&Lexeme::RBrace);
        self.exit_nesting();
        SyntaxNode::new(SyntaxKind::Compound, Vec::new())
            .with_children(children)
            .with_span(start.merge(end))
    }

    fn parse_statement(&mut self) -> Option<SyntaxNode> {
        match self.peek() {
            Lexeme::LBrace => Some(self.parse_compound()),
            Lexeme::Semicolon => {
                self.advance();
                None
            }
            Lexeme::If => Some(self.parse_if()),
            Lexeme::Return => Some(self.parse_return()),
            Lexeme::For | Lexeme::While | Lexeme::Switch => Some(self.parse_loop()),
            Lexeme::Do => Some(self.parse_do_while()),
            Lexeme::Else => {
                self.error_with_help(
                    "'else' without a matching 'if'",
                    "an 'else' branch must directly follow the body of an 'if'",
                );
                self.advance();
                None
            }
            _ => Some(self.parse_simple_statement()),
        }
    }

    /// `if (cond) then [else otherwise]`. Children are the condition
    /// expression followed by one compound per branch; a branch that is a
    /// single statement (including `else if`) is wrapped in a compound.
    fn parse_if(&mut self) -> SyntaxNode {
        let start = self.expect(&Lexeme::If);
        let mut children = Vec::new();
        if let Some(cond) = self.parse_condition() {
            children.push(cond);
        }
        children.push(self.parse_branch());
        if self.eat(&Lexeme::Else) {
            children.push(self.parse_branch());
        }
        SyntaxNode::new(SyntaxKind::If, Vec::new())
            .with_children(children)
            .with_span(start.merge(self.prev_span()))
    }

    fn parse_condition(&mut self) -> Option<SyntaxNode> {
        if !self.at(&Lexeme::LParen) {
            self.error_with_help(
                &format!(
                    "expected '(' after 'if', found {}",
                    self.peek().description()
                ),
                "wrap the condition in parentheses: if (x > 0) { ... }",
            );
            return None;
        }
        let group = self.take_balanced();
        if group.len() < 2 {
            return None;
        }
        let inner = &group[1..group.len() - 1];
        if inner.is_empty() {
            self.diagnostics.push(crate::diagnostic::Diagnostic::error(
                "empty condition".to_string(),
                span_of(&group),
            ));
            return None;
        }
        Some(expr_node(inner.to_vec()))
    }

    fn parse_branch(&mut self) -> SyntaxNode {
        if self.at(&Lexeme::LBrace) {
            return self.parse_compound();
        }
        let start = self.current_span();
        let stmt = self.parse_statement();
        let span = start.merge(self.prev_span());
        SyntaxNode::new(SyntaxKind::Compound, Vec::new())
            .with_children(stmt.into_iter().collect())
            .with_span(span)
    }

    fn parse_return(&mut self) -> SyntaxNode {
        let keyword = self.advance();
        let expr = self.take_until_semicolon();
        let semi = self.expect(&Lexeme::Semicolon);
        let mut tokens = vec![keyword.clone()];
        tokens.extend(expr.iter().cloned());
        let children = if expr.is_empty() {
            Vec::new()
        } else {
            vec![expr_node(expr)]
        };
        SyntaxNode::new(SyntaxKind::Return, tokens)
            .with_children(children)
            .with_span(keyword.span.merge(semi))
    }

    /// `for`, `while` and `switch` are consumed whole and reported as
    /// [`SyntaxKind::Other`].
    fn parse_loop(&mut self) -> SyntaxNode {
        let keyword = self.advance();
        let mut tokens = vec![keyword.clone()];
        if self.at(&Lexeme::LParen) {
            tokens.extend(self.take_balanced());
        }
        self.parse_statement();
        SyntaxNode::new(SyntaxKind::Other, tokens)
            .with_spelling(keyword.node.spelling().to_string())
            .with_span(keyword.span.merge(self.prev_span()))
    }

    fn parse_do_while(&mut self) -> SyntaxNode {
        let keyword = self.advance();
        self.parse_statement();
        if self.eat(&Lexeme::While) && self.at(&Lexeme::LParen) {
            self.take_balanced();
        }
        self.expect(&Lexeme::Semicolon);
        SyntaxNode::new(SyntaxKind::Other, vec![keyword.clone()])
            .with_spelling("do".to_string())
            .with_span(keyword.span.merge(self.prev_span()))
    }

    /// Declarations, assignments, calls and other expression statements.
    fn parse_simple_statement(&mut self) -> SyntaxNode {
        let mut tokens = self.take_until_semicolon();
        let semi_span = self.current_span();
        let has_semi = self.at(&Lexeme::Semicolon);
        self.expect(&Lexeme::Semicolon);

        if is_declaration(&tokens) {
            if has_semi {
                tokens.push(Spanned::new(Lexeme::Semicolon, semi_span));
            }
            return SyntaxNode::new(SyntaxKind::DeclStmt, tokens);
        }
        if !top_level_positions(&tokens, |t| *t == Lexeme::Eq).is_empty() {
            return SyntaxNode::new(SyntaxKind::BinaryOperator, tokens);
        }
        if let Some(call) = call_node(&tokens) {
            return call;
        }
        expr_node(tokens)
    }
}

// --- Statement shape helpers ---

/// A binary-operator node if the tokens hold a top-level binary operator,
/// otherwise a generic expression node.
fn expr_node(tokens: Vec<Spanned<Lexeme>>) -> SyntaxNode {
    let binary = top_level_positions(&tokens, is_binary_operator)
        .iter()
        .any(|&i| i > 0);
    let kind = if binary {
        SyntaxKind::BinaryOperator
    } else {
        SyntaxKind::Other
    };
    SyntaxNode::new(kind, tokens)
}

fn is_binary_operator(tok: &Lexeme) -> bool {
    matches!(
        tok,
        Lexeme::Eq
            | Lexeme::EqEq
            | Lexeme::BangEq
            | Lexeme::Lt
            | Lexeme::LtEq
            | Lexeme::Gt
            | Lexeme::GtEq
            | Lexeme::Shl
            | Lexeme::Shr
            | Lexeme::Plus
            | Lexeme::PlusEq
            | Lexeme::Minus
            | Lexeme::MinusEq
            | Lexeme::Star
            | Lexeme::StarEq
            | Lexeme::Slash
            | Lexeme::SlashEq
            | Lexeme::Percent
            | Lexeme::Amp
            | Lexeme::AmpAmp
            | Lexeme::AmpEq
            | Lexeme::Pipe
            | Lexeme::PipePipe
            | Lexeme::PipeEq
            | Lexeme::Caret
    )
}

/// Whether a statement declares a local: somewhere before the first
/// top-level `=`, `(` or `{`, a type-ending token is directly followed by
/// a name (`int x`, `msg_type msg`, `bitvec<bool> m`, `T * p`).
fn is_declaration(tokens: &[Spanned<Lexeme>]) -> bool {
    let end = tokens
        .iter()
        .position(|t| matches!(t.node, Lexeme::Eq | Lexeme::LParen | Lexeme::LBrace))
        .unwrap_or(tokens.len());
    let head = &tokens[..end];
    let mut seen_lt = false;
    for (i, pair) in head.windows(2).enumerate() {
        let (first, second) = (&pair[0].node, &pair[1].node);
        if *first == Lexeme::Lt {
            seen_lt = true;
        }
        if !second.is_name_like() {
            continue;
        }
        let after_member = i > 0
            && matches!(
                head[i - 1].node,
                Lexeme::Dot | Lexeme::Arrow | Lexeme::ColonColon
            );
        let type_end = match first {
            Lexeme::Ident(_) => !after_member,
            Lexeme::Gt | Lexeme::Shr => seen_lt,
            Lexeme::Star | Lexeme::Amp => {
                i > 0 && matches!(head[i - 1].node, Lexeme::Ident(_) | Lexeme::Gt)
            }
            _ => false,
        };
        if type_end {
            return true;
        }
    }
    false
}

/// `callee(args)` where the callee is a plain or qualified name. A
/// `context.signal(v, m)` call is spelled `context_signal_v_m`, the same
/// spelling a hand-written marker call would carry.
fn call_node(tokens: &[Spanned<Lexeme>]) -> Option<SyntaxNode> {
    let open = tokens.iter().position(|t| t.node == Lexeme::LParen)?;
    if open == 0 || tokens.last()?.node != Lexeme::RParen {
        return None;
    }
    let callee = &tokens[..open];
    let simple = callee.iter().all(|t| {
        matches!(
            t.node,
            Lexeme::Ident(_) | Lexeme::Dot | Lexeme::Arrow | Lexeme::ColonColon
        )
    });
    if !simple {
        return None;
    }
    // The argument group must close on the final token.
    let mut depth = 0i32;
    for (i, tok) in tokens[open..].iter().enumerate() {
        match tok.node {
            Lexeme::LParen | Lexeme::LBracket | Lexeme::LBrace => depth += 1,
            Lexeme::RParen | Lexeme::RBracket | Lexeme::RBrace => depth -= 1,
            _ => {}
        }
        if depth == 0 && open + i != tokens.len() - 1 {
            return None;
        }
    }

    let inner = &tokens[open + 1..tokens.len() - 1];
    let args: Vec<SyntaxNode> = split_top_level_commas(inner)
        .into_iter()
        .map(|arg| expr_node(arg.to_vec()))
        .collect();
    let name = join_tight(callee);
    let spelling = if name == "context.signal" && args.len() == 2 {
        format!("context_signal_{}_{}", args[0].text(), args[1].text())
    } else {
        name
    };
    Some(
        SyntaxNode::new(SyntaxKind::Call, tokens.to_vec())
            .with_spelling(spelling)
            .with_children(args),
    )
}
