//! Operator tables: surface operator spellings to vector primitives.
//!
//! Both tables are ordered. Lookup returns the first entry that occurs in
//! the input, so multi-character spellings (`<=`, `&~`) are listed ahead of
//! the shorter spellings they contain (`<`, `&`).

use std::fmt;

use serde::Serialize;

/// Primitive that copies its operand into the target lanes.
pub const SET_PRIMITIVE: &str = "vec_op_set_mask";

const MASK_SUFFIX: &str = "_mask";

/// Drop the trailing `_mask` of a masked primitive name.
pub fn strip_mask_suffix(primitive: &str) -> &str {
    primitive.strip_suffix(MASK_SUFFIX).unwrap_or(primitive)
}

// --- Vector-update table ---

/// An element-wise vector update, in table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VecOp {
    Add,
    Sub,
    Mul,
    Div,
    CmpEq,
    CmpNeq,
    CmpLe,
    CmpGe,
    CmpLt,
    CmpGt,
    AndNot,
    Or,
    And,
    Neg,
}

impl VecOp {
    /// Every operator in lookup order.
    pub const ALL: [VecOp; 14] = [
        VecOp::Add,
        VecOp::Sub,
        VecOp::Mul,
        VecOp::Div,
        VecOp::CmpEq,
        VecOp::CmpNeq,
        VecOp::CmpLe,
        VecOp::CmpGe,
        VecOp::CmpLt,
        VecOp::CmpGt,
        VecOp::AndNot,
        VecOp::Or,
        VecOp::And,
        VecOp::Neg,
    ];

    pub fn spelling(self) -> &'static str {
        match self {
            VecOp::Add => "+",
            VecOp::Sub => "-",
            VecOp::Mul => "*",
            VecOp::Div => "/",
            VecOp::CmpEq => "==",
            VecOp::CmpNeq => "!=",
            VecOp::CmpLe => "<=",
            VecOp::CmpGe => ">=",
            VecOp::CmpLt => "<",
            VecOp::CmpGt => ">",
            VecOp::AndNot => "&~",
            VecOp::Or => "|",
            VecOp::And => "&",
            VecOp::Neg => "~",
        }
    }

    /// The spelling as a token sequence.
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            VecOp::AndNot => &["&", "~"],
            VecOp::Add => &["+"],
            VecOp::Sub => &["-"],
            VecOp::Mul => &["*"],
            VecOp::Div => &["/"],
            VecOp::CmpEq => &["=="],
            VecOp::CmpNeq => &["!="],
            VecOp::CmpLe => &["<="],
            VecOp::CmpGe => &[">="],
            VecOp::CmpLt => &["<"],
            VecOp::CmpGt => &[">"],
            VecOp::Or => &["|"],
            VecOp::And => &["&"],
            VecOp::Neg => &["~"],
        }
    }

    /// Masked primitive: the first argument selects the lanes to update.
    pub fn primitive(self) -> &'static str {
        match self {
            VecOp::Add => "vec_op_add_update_mask",
            VecOp::Sub => "vec_op_sub_update_mask",
            VecOp::Mul => "vec_op_mul_update_mask",
            VecOp::Div => "vec_op_div_update_mask",
            VecOp::CmpEq => "vec_op_cmpeq_update_mask",
            VecOp::CmpNeq => "vec_op_cmpneq_update_mask",
            VecOp::CmpLe => "vec_op_cmple_update_mask",
            VecOp::CmpGe => "vec_op_cmpge_update_mask",
            VecOp::CmpLt => "vec_op_cmplt_update_mask",
            VecOp::CmpGt => "vec_op_cmpgt_update_mask",
            VecOp::AndNot => "vec_op_andnot_update_mask",
            VecOp::Or => "vec_op_or_update_mask",
            VecOp::And => "vec_op_and_update_mask",
            VecOp::Neg => "vec_op_neg_update_mask",
        }
    }

    pub fn unmasked_primitive(self) -> &'static str {
        strip_mask_suffix(self.primitive())
    }
}

impl fmt::Display for VecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// First vector-update entry whose spelling occurs in `text`.
pub fn classify_vector_op(text: &str) -> Option<(&'static str, &'static str)> {
    VecOp::ALL
        .iter()
        .find(|op| text.contains(op.spelling()))
        .map(|op| (op.spelling(), op.primitive()))
}

// --- Pairwise-reduction table ---

/// An element-wise reduction of two vectors, used by `operator+=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PairOp {
    Min,
    Max,
    Or,
    And,
    Add,
    Mul,
}

impl PairOp {
    pub const ALL: [PairOp; 6] = [
        PairOp::Min,
        PairOp::Max,
        PairOp::Or,
        PairOp::And,
        PairOp::Add,
        PairOp::Mul,
    ];

    pub fn spelling(self) -> &'static str {
        match self {
            PairOp::Min => "std::min",
            PairOp::Max => "std::max",
            PairOp::Or => "|",
            PairOp::And => "&",
            PairOp::Add => "+",
            PairOp::Mul => "*",
        }
    }

    pub fn primitive(self) -> &'static str {
        match self {
            PairOp::Min => "pair_op_min",
            PairOp::Max => "pair_op_max",
            PairOp::Or => "pair_op_or",
            PairOp::And => "pair_op_and",
            PairOp::Add => "pair_op_add",
            PairOp::Mul => "pair_op_mul",
        }
    }
}

/// First pairwise-reduction entry whose spelling occurs in `text`.
pub fn pairwise_op(text: &str) -> Option<PairOp> {
    PairOp::ALL
        .into_iter()
        .find(|op| text.contains(op.spelling()))
}

pub fn classify_pairwise_op(text: &str) -> Option<(&'static str, &'static str)> {
    pairwise_op(text).map(|op| (op.spelling(), op.primitive()))
}
