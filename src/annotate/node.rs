use std::fmt;

use serde::{Serialize, Serializer};

use crate::ops::VecOp;
use crate::syntax::span::Span;

/// Predicate active while a statement executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaskLabel {
    /// Phase entry: every lane is live, no mask of our own.
    Root,
    /// A minted label, printed `mask_<n>`.
    Mask(u32),
}

impl MaskLabel {
    pub fn is_root(self) -> bool {
        self == MaskLabel::Root
    }
}

impl fmt::Display for MaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskLabel::Root => f.write_str("ROOT"),
            MaskLabel::Mask(n) => write!(f, "mask_{}", n),
        }
    }
}

impl Serialize for MaskLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Node kinds of the annotated tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Compound,
    Conditional,
    Condition,
    Assignment,
    LocalDecl,
    MessageSend,
    Return,
    Expression,
}

impl StmtKind {
    pub fn name(self) -> &'static str {
        match self {
            StmtKind::Compound => "compound",
            StmtKind::Conditional => "conditional",
            StmtKind::Condition => "condition",
            StmtKind::Assignment => "assignment",
            StmtKind::LocalDecl => "local_decl",
            StmtKind::MessageSend => "message_send",
            StmtKind::Return => "return",
            StmtKind::Expression => "expression",
        }
    }
}

/// A right-hand side or branch test, classified against the vector table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum VecExpr {
    /// No table operator: a name or literal passed through as is.
    NoOp { text: String },
    Unary { op: VecOp, operand: String },
    Binary { op: VecOp, lhs: String, rhs: String },
    /// Lane-wise negation of an earlier mask; only built for else-branches.
    Complement { of: MaskLabel },
}

impl VecExpr {
    pub fn kind(&self) -> StmtKind {
        StmtKind::Expression
    }

    /// The operator, if any. A complement is a negation.
    pub fn op(&self) -> Option<VecOp> {
        match self {
            VecExpr::NoOp { .. } => None,
            VecExpr::Unary { op, .. } | VecExpr::Binary { op, .. } => Some(*op),
            VecExpr::Complement { .. } => Some(VecOp::Neg),
        }
    }
}

/// The test of one branch: writes `test` into the vector named `label`,
/// updating only the lanes live under `guard`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Condition {
    pub label: MaskLabel,
    pub guard: MaskLabel,
    pub test: VecExpr,
    #[serde(skip)]
    pub span: Span,
}

impl Condition {
    pub fn kind(&self) -> StmtKind {
        StmtKind::Condition
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Compound {
    pub label: MaskLabel,
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElseBranch {
    pub condition: Condition,
    pub body: Compound,
}

/// An if-converted branch. `label` is the enclosing predicate; each branch
/// body carries the label of its own condition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Conditional {
    pub label: MaskLabel,
    pub condition: Condition,
    pub then_branch: Compound,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub else_branch: Option<ElseBranch>,
    #[serde(skip)]
    pub span: Span,
}

impl Conditional {
    /// 2 children (condition, then) or 4 (plus else condition, else body).
    pub fn arity(&self) -> usize {
        if self.else_branch.is_some() {
            4
        } else {
            2
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Assignment {
    pub label: MaskLabel,
    pub target: String,
    pub value: VecExpr,
    #[serde(skip)]
    pub span: Span,
}

/// Declarations are kept token for token and never predicated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocalDecl {
    pub label: MaskLabel,
    pub tokens: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageSend {
    pub label: MaskLabel,
    pub vertex: String,
    pub message: String,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Return {
    pub label: MaskLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

/// One annotated statement.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Compound(Compound),
    Conditional(Box<Conditional>),
    Assignment(Assignment),
    LocalDecl(LocalDecl),
    MessageSend(MessageSend),
    Return(Return),
}

impl Stmt {
    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Compound(_) => StmtKind::Compound,
            Stmt::Conditional(_) => StmtKind::Conditional,
            Stmt::Assignment(_) => StmtKind::Assignment,
            Stmt::LocalDecl(_) => StmtKind::LocalDecl,
            Stmt::MessageSend(_) => StmtKind::MessageSend,
            Stmt::Return(_) => StmtKind::Return,
        }
    }

    pub fn label(&self) -> MaskLabel {
        match self {
            Stmt::Compound(c) => c.label,
            Stmt::Conditional(c) => c.label,
            Stmt::Assignment(a) => a.label,
            Stmt::LocalDecl(d) => d.label,
            Stmt::MessageSend(m) => m.label,
            Stmt::Return(r) => r.label,
        }
    }
}
