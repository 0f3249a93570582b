use crate::syntax::tree::{SyntaxKind, SyntaxNode};
use crate::syntax::{parse_block, parse_source};

fn block(source: &str) -> SyntaxNode {
    match parse_block(source) {
        Ok(node) => node,
        Err(diags) => panic!("parse errors: {:?}", diags),
    }
}

fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.children.iter().map(|c| c.kind).collect()
}

// --- Statements ---

#[test]
fn test_statement_kinds() {
    let body = block(
        "{
            msg_type msg;
            msg.ans = 3;
            context.signal(other, msg);
            return msg;
            for (int i = 0; i < n; i++) { x = i; }
        }",
    );
    assert_eq!(
        kinds(&body),
        vec![
            SyntaxKind::DeclStmt,
            SyntaxKind::BinaryOperator,
            SyntaxKind::Call,
            SyntaxKind::Return,
            SyntaxKind::Other,
        ]
    );
}

#[test]
fn test_declaration_keeps_semicolon() {
    let body = block("{ graphlab::automi_bitvec<bool> m; }");
    let decl = &body.children[0];
    assert_eq!(decl.kind, SyntaxKind::DeclStmt);
    assert_eq!(
        decl.tokens.iter().map(|t| t.node.spelling()).collect::<Vec<_>>(),
        vec!["graphlab", "::", "automi_bitvec", "<", "bool", ">", "m", ";"]
    );
}

#[test]
fn test_declaration_with_initializer() {
    let body = block("{ const vertex_type other = get_other_vertex(edge, vertex); }");
    assert_eq!(body.children[0].kind, SyntaxKind::DeclStmt);
}

#[test]
fn test_assignment_excludes_semicolon() {
    let body = block("{ vertex.data().ans = x + 1; }");
    let assign = &body.children[0];
    assert_eq!(assign.kind, SyntaxKind::BinaryOperator);
    assert_eq!(assign.text(), "vertex.data().ans=x+1");
}

#[test]
fn test_member_access_is_not_a_declaration() {
    let body = block("{ a.b < c; }");
    assert_eq!(body.children[0].kind, SyntaxKind::BinaryOperator);
}

#[test]
fn test_signal_call_spelling() {
    let body = block("{ context.signal(other, msg); }");
    let call = &body.children[0];
    assert_eq!(call.kind, SyntaxKind::Call);
    assert_eq!(call.spelling, "context_signal_other_msg");
    assert_eq!(call.children.len(), 2);
    assert_eq!(call.children[0].text(), "other");
}

#[test]
fn test_marker_call_spelling() {
    let body = block("{ context_signal_v_m(); }");
    assert_eq!(body.children[0].spelling, "context_signal_v_m");
    assert!(body.children[0].children.is_empty());
}

#[test]
fn test_if_else_shape() {
    let body = block("{ if (x > 0) { y = x + 1; } else { y = 0; } }");
    let cond = &body.children[0];
    assert_eq!(cond.kind, SyntaxKind::If);
    assert_eq!(
        kinds(cond),
        vec![
            SyntaxKind::BinaryOperator,
            SyntaxKind::Compound,
            SyntaxKind::Compound
        ]
    );
    assert_eq!(cond.children[0].text(), "x>0");
}

#[test]
fn test_single_statement_branches_are_wrapped() {
    let body = block("{ if (a) y = 1; else if (b) y = 2; }");
    let cond = &body.children[0];
    assert_eq!(cond.children.len(), 3);
    assert_eq!(cond.children[0].kind, SyntaxKind::Other);
    assert_eq!(cond.children[1].kind, SyntaxKind::Compound);
    let otherwise = &cond.children[2];
    assert_eq!(otherwise.kind, SyntaxKind::Compound);
    assert_eq!(otherwise.children[0].kind, SyntaxKind::If);
}

#[test]
fn test_return_children() {
    let body = block("{ return a + b; }");
    let ret = &body.children[0];
    assert_eq!(ret.children.len(), 1);
    assert_eq!(ret.children[0].text(), "a+b");

    let body = block("{ return; }");
    assert!(body.children[0].children.is_empty());
}

#[test]
fn test_empty_statements_skipped() {
    let body = block("{ ; ; x = 1; }");
    assert_eq!(body.children.len(), 1);
}

#[test]
fn test_missing_semicolon_is_an_error() {
    let errs = parse_block("{ x = 1 }").unwrap_err();
    assert!(errs[0].message.contains("expected ';'"));
}

#[test]
fn test_stray_else_is_an_error() {
    let errs = parse_block("{ else { x = 1; } }").unwrap_err();
    assert!(errs[0].message.contains("'else' without a matching 'if'"));
}

#[test]
fn test_block_must_start_with_brace() {
    let errs = parse_block("x = 1;").unwrap_err();
    assert!(errs[0].message.contains("expected '{'"));
}

#[test]
fn test_deep_nesting_is_rejected() {
    let mut src = String::new();
    for _ in 0..300 {
        src.push('{');
    }
    for _ in 0..300 {
        src.push('}');
    }
    let errs = parse_block(&src).unwrap_err();
    assert!(errs.iter().any(|d| d.message.contains("nesting depth")));
}

// --- Items ---

const PROGRAM: &str = r#"#include <graphlab.hpp>

#pragma AUTOMI
void context_signal_other_msg();

typedef int ans_type;

struct vertex_data : graphlab::IS_POD_TYPE {
  ans_type ans = 100;
  vertex_data(ans_type ans = 100) : ans(ans) { }
};

class sssp : public graphlab::ivertex_program<graph_type, graphlab::empty, msg_type> {
  ans_type min_dist;
  bool changed;
public:
  edge_dir_type gather_edges(icontext_type& context, const vertex_type& vertex) const {
    return graphlab::NO_EDGES;
  }
  void apply(icontext_type& context, vertex_type& vertex, const graphlab::empty& empty) {
    changed = false;
  }
  msg_type& operator+=(const msg_type& other) { return *this; }
  void save(graphlab::oarchive& oarc) const { oarc << min_dist; }
};
"#;

#[test]
fn test_patch_lines() {
    let file = parse_source(PROGRAM).unwrap();
    assert_eq!(file.patch, vec!["void context_signal_other_msg();"]);
}

#[test]
fn test_struct_fields_and_bases() {
    let file = parse_source(PROGRAM).unwrap();
    let data = file.class("vertex_data").unwrap();
    assert!(data.is_pod());
    assert_eq!(data.fields.len(), 1);
    assert_eq!(data.fields[0].name, "ans");
    assert_eq!(data.fields[0].ty, "ans_type");
    assert_eq!(data.fields[0].default.as_deref(), Some("100"));

    let ctor: Vec<_> = data.constructors().collect();
    assert_eq!(ctor.len(), 1);
    assert_eq!(ctor[0].params[0].name, "ans");
    assert_eq!(ctor[0].params[0].default.as_deref(), Some("100"));
}

#[test]
fn test_class_methods() {
    let file = parse_source(PROGRAM).unwrap();
    let prog = file.class("sssp").unwrap();
    assert!(prog.derives("ivertex_program"));
    assert_eq!(prog.fields.len(), 2);

    let gather = prog.method("gather_edges").unwrap();
    assert_eq!(gather.ret, "edge_dir_type");
    assert!(gather.is_const());
    assert_eq!(gather.params[1].ty, "const vertex_type &");
    assert_eq!(gather.params[1].name, "vertex");

    let apply = prog.method("apply").unwrap();
    assert_eq!(apply.params.len(), 3);
    assert_eq!(apply.body.as_ref().unwrap().children.len(), 1);

    let plus = prog.method("operator+=").unwrap();
    assert_eq!(plus.ret, "msg_type &");
}

#[test]
fn test_method_signature() {
    let file = parse_source(PROGRAM).unwrap();
    let save = file.class("sssp").unwrap().method("save").unwrap();
    assert_eq!(
        save.signature(),
        "void save(graphlab::oarchive & oarc) const"
    );
}

#[test]
fn test_method_span_slices_source() {
    let file = parse_source(PROGRAM).unwrap();
    let gather = file.class("sssp").unwrap().method("gather_edges").unwrap();
    let text = gather.span.slice(PROGRAM);
    assert!(text.starts_with("edge_dir_type gather_edges("));
    assert!(text.ends_with('}'));
}

#[test]
fn test_no_patch_without_pragma() {
    let file = parse_source("struct a { int x; };").unwrap();
    assert!(file.patch.is_empty());
    assert_eq!(file.classes.len(), 1);
}

#[test]
fn test_free_functions_are_skipped() {
    let file = parse_source(
        "int helper(int a) { return a; }\nstruct s { int x; };\nint main() { return 0; }",
    )
    .unwrap();
    assert_eq!(file.classes.len(), 1);
    assert_eq!(file.classes[0].name.node, "s");
}

#[test]
fn test_unclosed_struct_is_an_error() {
    assert!(parse_source("struct s { int x;").is_err());
}
