//! Statement classifier and mask propagator.
//!
//! Walks one phase body and builds the annotated tree: every statement gets
//! a kind and the predicate label it runs under. Each conditional mints a
//! fresh `mask_<n>` for its then-branch and another for its else-branch.
//! The counter lives in the [`Annotator`], so one annotator per phase body
//! gives every phase its own numbering starting at `mask_1`.

mod expr;
mod node;


pub(crate) use expr::render_expr;
pub use node::{
    Assignment, Compound, Condition, Conditional, ElseBranch, LocalDecl, MaskLabel, MessageSend,
    Return, Stmt, StmtKind, VecExpr,
};

use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::ops::VecOp;
use crate::syntax::tree::{ParseNode, SyntaxKind};

use expr::classify_tokens;

/// Marker prefix of a message-send call spelling.
pub const SIGNAL_MARKER: &str = "context_signal_";

/// The annotated form of one phase body.
#[derive(Clone, Debug)]
pub struct AnnotatedBody {
    pub root: Compound,
    /// Number of `mask_<n>` labels minted.
    pub masks: u32,
    /// Non-fatal findings, e.g. dropped statements.
    pub warnings: Vec<Diagnostic>,
}

/// Classify a phase body with a fresh label counter.
pub fn annotate_body<N: ParseNode>(body: &N) -> Result<AnnotatedBody, Diagnostic> {
    Annotator::new().annotate(body)
}

/// Per-body classification state: the label counter and collected warnings.
#[derive(Debug)]
pub struct Annotator {
    next_mask: u32,
    warnings: Vec<Diagnostic>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator {
    pub fn new() -> Self {
        Self {
            next_mask: 1,
            warnings: Vec::new(),
        }
    }

    /// Consume the annotator and classify `body`, which must be a compound
    /// statement, under [`MaskLabel::Root`].
    pub fn annotate<N: ParseNode>(mut self, body: &N) -> Result<AnnotatedBody, Diagnostic> {
        if body.kind() != SyntaxKind::Compound {
            return Err(Diagnostic::error(
                format!("expected a block as phase body, found a {}", body.kind().name()),
                body.span(),
            ));
        }
        let root = self.compound(body, MaskLabel::Root)?;
        Ok(AnnotatedBody {
            root,
            masks: self.next_mask - 1,
            warnings: self.warnings,
        })
    }

    fn fresh_mask(&mut self) -> MaskLabel {
        let label = MaskLabel::Mask(self.next_mask);
        self.next_mask += 1;
        label
    }

    fn compound<N: ParseNode>(&mut self, node: &N, label: MaskLabel) -> Result<Compound, Diagnostic> {
        let mut stmts = Vec::with_capacity(node.children().len());
        for child in node.children() {
            if let Some(stmt) = self.statement(child, label)? {
                stmts.push(stmt);
            }
        }
        Ok(Compound { label, stmts })
    }

    /// `Ok(None)` means the statement was dropped with a warning.
    fn statement<N: ParseNode>(
        &mut self,
        node: &N,
        label: MaskLabel,
    ) -> Result<Option<Stmt>, Diagnostic> {
        let stmt = match node.kind() {
            SyntaxKind::Compound => Stmt::Compound(self.compound(node, label)?),
            SyntaxKind::If => Stmt::Conditional(Box::new(self.conditional(node, label)?)),
            SyntaxKind::BinaryOperator => match self.assignment(node, label) {
                Some(assign) => Stmt::Assignment(assign),
                None => return Ok(None),
            },
            SyntaxKind::DeclStmt => Stmt::LocalDecl(LocalDecl {
                label,
                tokens: node
                    .token_spellings()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }),
            SyntaxKind::Call => match self.message_send(node, label)? {
                Some(send) => Stmt::MessageSend(send),
                None => return Ok(None),
            },
            SyntaxKind::Return => Stmt::Return(Return {
                label,
                expr: node
                    .children()
                    .first()
                    .map(|e| render_expr(&e.token_spellings())),
            }),
            SyntaxKind::Other => {
                self.drop_statement(node, "unsupported statement");
                return Ok(None);
            }
        };
        Ok(Some(stmt))
    }

    fn drop_statement<N: ParseNode>(&mut self, node: &N, what: &str) {
        let text = node.token_spellings().join(" ");
        debug!(statement = %text, "dropping {}", what);
        self.warnings.push(
            Diagnostic::warning(format!("{} dropped from the converted body", what), node.span())
                .with_note(
                    "only blocks, if/else, assignments, declarations, sends and returns are converted"
                        .to_string(),
                ),
        );
    }

    // --- Conditionals ---

    fn conditional<N: ParseNode>(
        &mut self,
        node: &N,
        label: MaskLabel,
    ) -> Result<Conditional, Diagnostic> {
        let children = node.children();
        let (test, then_node, else_node) = match children {
            [test, then_node] => (test, then_node, None),
            [test, then_node, else_node] => (test, then_node, Some(else_node)),
            _ => return Err(malformed(node, "expected a test and one or two branches")),
        };
        if test.kind() == SyntaxKind::Compound {
            return Err(malformed(node, "the test expression is missing"));
        }
        if then_node.kind() != SyntaxKind::Compound
            || else_node.is_some_and(|e| e.kind() != SyntaxKind::Compound)
        {
            return Err(malformed(node, "branches must be blocks"));
        }

        let then_label = self.fresh_mask();
        let classified = classify_tokens(&test.token_spellings());
        self.check_slots(test, classified.slots);
        let condition = Condition {
            label: then_label,
            guard: label,
            test: classified.expr,
            span: test.span(),
        };
        let then_branch = self.compound(then_node, then_label)?;

        let else_branch = match else_node {
            Some(else_node) => {
                let else_label = self.fresh_mask();
                let condition = Condition {
                    label: else_label,
                    guard: label,
                    test: VecExpr::Complement { of: then_label },
                    span: else_node.span(),
                };
                let body = self.compound(else_node, else_label)?;
                Some(ElseBranch { condition, body })
            }
            None => None,
        };

        Ok(Conditional {
            label,
            condition,
            then_branch,
            else_branch,
            span: node.span(),
        })
    }

    // --- Assignments ---

    /// `lhs = rhs` or `lhs op= rhs`. Anything else is dropped.
    fn assignment<N: ParseNode>(&mut self, node: &N, label: MaskLabel) -> Option<Assignment> {
        let tokens = node.token_spellings();
        let Some(eq) = top_level_index(&tokens, |t| t == "=" || compound_op(t).is_some()) else {
            self.drop_statement(node, "expression statement");
            return None;
        };
        let (lhs, rhs) = (&tokens[..eq], &tokens[eq + 1..]);
        if lhs.is_empty() || rhs.is_empty() {
            self.drop_statement(node, "incomplete assignment");
            return None;
        }
        let target = render_expr(lhs);

        let value = match compound_op(tokens[eq]) {
            None => {
                let classified = classify_tokens(rhs);
                self.check_slots(node, classified.slots);
                classified.expr
            }
            // `x op= e` is `x = x op e`, which only fits one primitive when
            // `e` itself has no operator.
            Some(op) => match classify_tokens(rhs).expr {
                VecExpr::NoOp { text } => VecExpr::Binary {
                    op,
                    lhs: target.clone(),
                    rhs: text,
                },
                _ => {
                    self.drop_statement(node, "compound assignment of a compound expression");
                    return None;
                }
            },
        };

        Some(Assignment {
            label,
            target,
            value,
            span: node.span(),
        })
    }

    fn check_slots<N: ParseNode>(&mut self, node: &N, slots: usize) {
        if slots > 2 {
            self.warnings.push(
                Diagnostic::warning(
                    format!("operator splits this expression into {} operands", slots),
                    node.span(),
                )
                .with_note("only the first operand is kept".to_string())
                .with_help("split the expression into one operator per statement".to_string()),
            );
        }
    }

    // --- Message sends ---

    /// `context_signal_<vertex>_<message>`; names containing `_` fall back
    /// to the call's two argument children.
    fn message_send<N: ParseNode>(
        &mut self,
        node: &N,
        label: MaskLabel,
    ) -> Result<Option<MessageSend>, Diagnostic> {
        let spelling = node.spelling();
        if !spelling.starts_with(SIGNAL_MARKER) {
            self.drop_statement(node, &format!("call to '{}'", spelling));
            return Ok(None);
        }
        let parts: Vec<&str> = spelling.split('_').collect();
        let (vertex, message) = match (parts.as_slice(), node.children()) {
            ([_, _, vertex, message], _) if !vertex.is_empty() && !message.is_empty() => {
                (vertex.to_string(), message.to_string())
            }
            (_, [vertex, message]) => (
                render_expr(&vertex.token_spellings()),
                render_expr(&message.token_spellings()),
            ),
            _ => {
                return Err(malformed(
                    node,
                    "cannot recover the destination vertex and message of this send",
                ))
            }
        };
        Ok(Some(MessageSend {
            label,
            vertex,
            message,
            span: node.span(),
        }))
    }
}

fn malformed<N: ParseNode>(node: &N, what: &str) -> Diagnostic {
    Diagnostic::error(format!("malformed {}: {}", node.kind().name(), what), node.span())
        .with_help("the phase body is not converted".to_string())
}

/// Operator of a compound assignment token such as `+=`.
pub(crate) fn compound_op(token: &str) -> Option<VecOp> {
    match token {
        "+=" => Some(VecOp::Add),
        "-=" => Some(VecOp::Sub),
        "*=" => Some(VecOp::Mul),
        "/=" => Some(VecOp::Div),
        "&=" => Some(VecOp::And),
        "|=" => Some(VecOp::Or),
        _ => None,
    }
}

pub(crate) fn top_level_index(tokens: &[&str], pred: impl Fn(&str) -> bool) -> Option<usize> {
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate() {
        match *tok {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            t if depth == 0 && pred(t) => return Some(i),
            _ => {}
        }
    }
    None
}
