//! Code generator: lowers an annotated phase body to mask-aware vector code.
//!
//! Every statement becomes zero or more lines in the vector library's
//! calling convention. Predicated calls take the resolved mask as their
//! first argument; with tracking off, statements at [`MaskLabel::Root`]
//! use the un-masked primitive instead.

#[cfg(test)]
mod tests;

use crate::annotate::{
    Assignment, Compound, Condition, Conditional, LocalDecl, MaskLabel, MessageSend, Return, Stmt,
    VecExpr,
};
use crate::ops::{strip_mask_suffix, VecOp, SET_PRIMITIVE};

/// One level of indentation in emitted code.
pub const INDENT: &str = "  ";

/// Field of a message that records the lanes it was produced for.
pub const TRACK_FIELD: &str = "track";

/// Default element container for vectorized fields and masks.
pub const DEFAULT_VECTOR_TYPE: &str = "graphlab::automi_bitvec";

/// Lowering policy for one phase body.
#[derive(Clone, Debug)]
pub struct Lowering {
    /// Whether `ROOT` resolves to the ambient mask.
    pub tracking: bool,
    /// Mask expression standing in for `ROOT` when tracking, e.g. `vp_track`.
    pub ambient_mask: String,
    /// Vector template used for mask declarations.
    pub vector_type: String,
}

impl Lowering {
    pub fn new(tracking: bool, ambient_mask: &str) -> Self {
        Self {
            tracking,
            ambient_mask: ambient_mask.to_string(),
            vector_type: DEFAULT_VECTOR_TYPE.to_string(),
        }
    }

    pub fn with_vector_type(mut self, vector_type: &str) -> Self {
        self.vector_type = vector_type.to_string();
        self
    }

    /// Mask argument for statements under `label`; `None` means un-masked.
    pub fn mask_name(&self, label: MaskLabel) -> Option<String> {
        match label {
            MaskLabel::Root if self.tracking => Some(self.ambient_mask.clone()),
            MaskLabel::Root => None,
            MaskLabel::Mask(_) => Some(label.to_string()),
        }
    }

    /// Lower a whole phase body. Its statements are indented one level.
    pub fn lower_body(&self, body: &Compound) -> Vec<String> {
        self.compound(body)
    }

    pub fn lower_stmt(&self, stmt: &Stmt) -> Vec<String> {
        match stmt {
            Stmt::Compound(c) => self.compound(c),
            Stmt::Conditional(c) => self.conditional(c),
            Stmt::Assignment(a) => vec![self.assignment(a)],
            Stmt::LocalDecl(d) => vec![local_decl(d)],
            Stmt::MessageSend(m) => self.message_send(m),
            Stmt::Return(r) => vec![return_stmt(r)],
        }
    }

    fn compound(&self, compound: &Compound) -> Vec<String> {
        compound
            .stmts
            .iter()
            .flat_map(|stmt| self.lower_stmt(stmt))
            .map(|line| format!("{}{}", INDENT, line))
            .collect()
    }

    fn conditional(&self, cond: &Conditional) -> Vec<String> {
        let mut lines = self.condition(&cond.condition);
        lines.extend(self.compound(&cond.then_branch));
        if let Some(otherwise) = &cond.else_branch {
            lines.extend(self.condition(&otherwise.condition));
            lines.extend(self.compound(&otherwise.body));
        }
        lines
    }

    /// Declare the branch mask and fill it under the guard.
    fn condition(&self, condition: &Condition) -> Vec<String> {
        let name = condition.label.to_string();
        vec![
            format!("{}<bool> {};", self.vector_type, name),
            update_call(&name, &condition.test, self.mask_name(condition.guard).as_deref()),
        ]
    }

    fn assignment(&self, assign: &Assignment) -> String {
        update_call(
            &assign.target,
            &assign.value,
            self.mask_name(assign.label).as_deref(),
        )
    }

    fn message_send(&self, send: &MessageSend) -> Vec<String> {
        let signal = format!("context.signal({}, {});", send.vertex, send.message);
        let Some(mask) = self.mask_name(send.label) else {
            return vec![signal];
        };
        let mut lines = vec![format!("if (!{}.vec_all_zeros()) {{", mask)];
        if self.tracking {
            lines.push(format!("{}{}.{} = {};", INDENT, send.message, TRACK_FIELD, mask));
        }
        lines.push(format!("{}{}", INDENT, signal));
        lines.push("}".to_string());
        lines
    }
}

/// `target.<primitive>([mask, ]operands...);`
fn update_call(target: &str, expr: &VecExpr, mask: Option<&str>) -> String {
    let (primitive, operands) = match expr {
        VecExpr::NoOp { text } => (SET_PRIMITIVE, vec![text.clone()]),
        VecExpr::Unary { op, operand } => (op.primitive(), vec![operand.clone()]),
        VecExpr::Binary { op, lhs, rhs } => (op.primitive(), vec![lhs.clone(), rhs.clone()]),
        VecExpr::Complement { of } => (VecOp::Neg.primitive(), vec![of.to_string()]),
    };
    let (primitive, args) = match mask {
        Some(mask) => {
            let mut args = vec![mask.to_string()];
            args.extend(operands);
            (primitive, args)
        }
        None => (strip_mask_suffix(primitive), operands),
    };
    format!("{}.{}({});", target, primitive, args.join(", "))
}

fn local_decl(decl: &LocalDecl) -> String {
    decl.tokens.join(" ")
}

fn return_stmt(ret: &Return) -> String {
    match &ret.expr {
        Some(expr) => format!("return {};", expr),
        None => "return;".to_string(),
    }
}

/// Join lowered lines into a block of text.
pub fn render(lines: &[String]) -> String {
    lines.join("\n")
}
