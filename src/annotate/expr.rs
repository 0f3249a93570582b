use crate::ops::VecOp;

use super::node::VecExpr;

/// A classified expression and how many operand slots the operator split
/// produced. More than two slots means operands were discarded.
pub(crate) struct Classified {
    pub expr: VecExpr,
    pub slots: usize,
}

/// Classify a token sequence against the vector-update table.
///
/// The first table entry that occurs at bracket depth 0 wins. The tokens
/// are split at every occurrence of it: exactly two non-empty slots give a
/// binary expression, anything else a unary one over the first non-empty
/// slot. No occurrence at all is a pass-through. Only `~` counts in
/// prefix position; a leading sign or dereference belongs to its operand.
pub(crate) fn classify_tokens(tokens: &[&str]) -> Classified {
    for op in VecOp::ALL {
        let mut hits = occurrences(tokens, op.tokens());
        if op != VecOp::Neg {
            hits.retain(|&hit| !is_prefix_position(tokens, hit));
        }
        if hits.is_empty() {
            continue;
        }
        let width = op.tokens().len();
        let mut slots: Vec<&[&str]> = Vec::with_capacity(hits.len() + 1);
        let mut last = 0;
        for &hit in &hits {
            slots.push(&tokens[last..hit]);
            last = hit + width;
        }
        slots.push(&tokens[last..]);

        let filled: Vec<&[&str]> = slots.iter().copied().filter(|s| !s.is_empty()).collect();
        let expr = match filled.as_slice() {
            [lhs, rhs] if slots.len() == 2 => VecExpr::Binary {
                op,
                lhs: render_expr(lhs),
                rhs: render_expr(rhs),
            },
            [first, ..] => VecExpr::Unary {
                op,
                operand: render_expr(first),
            },
            [] => VecExpr::NoOp {
                text: render_expr(tokens),
            },
        };
        return Classified {
            expr,
            slots: slots.len(),
        };
    }
    Classified {
        expr: VecExpr::NoOp {
            text: render_expr(tokens),
        },
        slots: 1,
    }
}

/// Start indices of `pattern` in `tokens`, outside every bracket pair.
/// Matches do not overlap.
fn occurrences(tokens: &[&str], pattern: &[&str]) -> Vec<usize> {
    let mut hits = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            _ if depth == 0 && tokens[i..].starts_with(pattern) => {
                hits.push(i);
                i += pattern.len();
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    hits
}

/// True when the token at `index` starts an operand rather than joining two.
fn is_prefix_position(tokens: &[&str], index: usize) -> bool {
    match index.checked_sub(1).map(|prev| tokens[prev]) {
        None => true,
        Some(prev) => {
            SPACED_OPERATORS.contains(&prev) || matches!(prev, "(" | "[" | "," | "!" | "~" | "return")
        }
    }
}

const SPACED_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "&", "|", "^", "<<",
    ">>", "=", "+=", "-=", "*=", "/=", "&=", "|=", "?", ":",
];

/// Render tokens as expression text: binary operators get a space on each
/// side, commas a space after, everything else is written tight.
/// A leading operator is treated as unary and stays attached.
pub(crate) fn render_expr(tokens: &[&str]) -> String {
    let mut out = String::new();
    for (i, tok) in tokens.iter().enumerate() {
        let prev = if i > 0 { Some(tokens[i - 1]) } else { None };
        let binary = SPACED_OPERATORS.contains(tok)
            && prev.is_some_and(|p| !SPACED_OPERATORS.contains(&p) && !matches!(p, "(" | "[" | ","));
        let after_binary = prev.is_some_and(|p| {
            SPACED_OPERATORS.contains(&p)
                && i >= 2
                && !SPACED_OPERATORS.contains(&tokens[i - 2])
                && !matches!(tokens[i - 2], "(" | "[" | ",")
        });
        if binary || after_binary || prev == Some(",") {
            out.push(' ');
        }
        out.push_str(tok);
    }
    out
}
