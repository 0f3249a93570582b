use super::*;
use crate::annotate::annotate_body;
use crate::syntax::parse_block;

fn lower(source: &str, lowering: &Lowering) -> Vec<String> {
    let body = parse_block(source).expect("body parses");
    let annotated = annotate_body(&body).expect("body annotates");
    lowering.lower_body(&annotated.root)
}

const BRANCHY: &str = "{ if (x > 0) { y = x + 1; } else { y = 0; } }";

#[test]
fn test_if_else_with_tracking() {
    let lines = lower(BRANCHY, &Lowering::new(true, "msg_acc.track"));
    assert_eq!(
        lines,
        vec![
            "  graphlab::automi_bitvec<bool> mask_1;",
            "  mask_1.vec_op_cmpgt_update_mask(msg_acc.track, x, 0);",
            "    y.vec_op_add_update_mask(mask_1, x, 1);",
            "  graphlab::automi_bitvec<bool> mask_2;",
            "  mask_2.vec_op_neg_update_mask(msg_acc.track, mask_1);",
            "    y.vec_op_set_mask(mask_2, 0);",
        ]
    );
}

#[test]
fn test_if_else_without_tracking() {
    let lines = lower(BRANCHY, &Lowering::new(false, "msg_acc.track"));
    assert_eq!(
        lines,
        vec![
            "  graphlab::automi_bitvec<bool> mask_1;",
            "  mask_1.vec_op_cmpgt_update(x, 0);",
            "    y.vec_op_add_update_mask(mask_1, x, 1);",
            "  graphlab::automi_bitvec<bool> mask_2;",
            "  mask_2.vec_op_neg_update(mask_1);",
            "    y.vec_op_set_mask(mask_2, 0);",
        ]
    );
}

#[test]
fn test_root_send_without_tracking_is_unguarded() {
    let lines = lower("{ context_signal_A_M(); }", &Lowering::new(false, "track"));
    assert_eq!(lines, vec!["  context.signal(A, M);"]);
}

#[test]
fn test_nested_send_without_tracking_is_guarded() {
    let lines = lower(
        "{ if (x) { context_signal_A_M(); } }",
        &Lowering::new(false, "track"),
    );
    assert_eq!(
        lines,
        vec![
            "  graphlab::automi_bitvec<bool> mask_1;",
            "  mask_1.vec_op_set(x);",
            "    if (!mask_1.vec_all_zeros()) {",
            "      context.signal(A, M);",
            "    }",
        ]
    );
}

#[test]
fn test_send_with_tracking_writes_track_field() {
    let lines = lower("{ context.signal(other, msg); }", &Lowering::new(true, "vp_track"));
    assert_eq!(
        lines,
        vec![
            "  if (!vp_track.vec_all_zeros()) {",
            "    msg.track = vp_track;",
            "    context.signal(other, msg);",
            "  }",
        ]
    );
}

#[test]
fn test_tracking_off_root_statements_carry_no_mask() {
    let lines = lower(
        "{ a = b; c = d * e; f = ~g; context_signal_v_m(); }",
        &Lowering::new(false, "track"),
    );
    for line in &lines {
        assert!(!line.contains("_mask("), "{}", line);
        assert!(!line.contains("vec_all_zeros"), "{}", line);
    }
    assert_eq!(lines[0], "  a.vec_op_set(b);");
    assert_eq!(lines[1], "  c.vec_op_mul_update(d, e);");
    assert_eq!(lines[2], "  f.vec_op_neg_update(g);");
}

#[test]
fn test_tracking_on_every_send_is_guarded() {
    let lines = lower(
        "{ context_signal_v_m(); if (x) { context_signal_w_n(); } }",
        &Lowering::new(true, "vp_track"),
    );
    let guards = lines.iter().filter(|l| l.contains("vec_all_zeros")).count();
    let writes = lines.iter().filter(|l| l.contains(".track = ")).count();
    assert_eq!(guards, 2);
    assert_eq!(writes, 2);
    assert!(lines.contains(&"      n.track = mask_1;".to_string()));
}

#[test]
fn test_decl_and_return_are_never_masked() {
    let source = "{ if (x) { msg_type msg; return msg; } }";
    for tracking in [true, false] {
        let lines = lower(source, &Lowering::new(tracking, "vp_track"));
        assert_eq!(lines[2], "    msg_type msg ;");
        assert_eq!(lines[3], "    return msg;");
    }
}

#[test]
fn test_bare_return() {
    let lines = lower("{ return; }", &Lowering::new(true, "t"));
    assert_eq!(lines, vec!["  return;"]);
}

#[test]
fn test_vector_type_override() {
    let lowering = Lowering::new(true, "t").with_vector_type("dimitra_bitvec");
    let lines = lower("{ if (x) { y = 1; } }", &lowering);
    assert_eq!(lines[0], "  dimitra_bitvec<bool> mask_1;");
}

#[test]
fn test_nested_block_indents_again() {
    let lines = lower("{ { y = 1; } }", &Lowering::new(true, "t"));
    assert_eq!(lines, vec!["    y.vec_op_set_mask(t, 1);"]);
}

#[test]
fn test_lowering_is_idempotent() {
    let lowering = Lowering::new(true, "vp_track");
    let source = "{ if (a <= b) { if (c) { x = 1; } } else { context_signal_v_m(); } }";
    assert_eq!(lower(source, &lowering), lower(source, &lowering));
}

#[test]
fn test_else_mask_is_complement_of_then_mask() {
    let lines = lower(
        "{ if (a != b) { x = 1; } else { x = 2; } }",
        &Lowering::new(true, "t"),
    );
    assert_eq!(lines[1], "  mask_1.vec_op_cmpneq_update_mask(t, a, b);");
    assert_eq!(lines[4], "  mask_2.vec_op_neg_update_mask(t, mask_1);");
}

#[test]
fn test_mask_name() {
    let on = Lowering::new(true, "vp_track");
    let off = Lowering::new(false, "vp_track");
    assert_eq!(on.mask_name(MaskLabel::Root).as_deref(), Some("vp_track"));
    assert_eq!(off.mask_name(MaskLabel::Root), None);
    assert_eq!(off.mask_name(MaskLabel::Mask(3)).as_deref(), Some("mask_3"));
}

#[test]
fn test_render_joins_lines() {
    let lines = vec!["a".to_string(), "b".to_string()];
    assert_eq!(render(&lines), "a\nb");
}
