use super::*;

fn lex(source: &str) -> Vec<Lexeme> {
    let (tokens, diags) = Lexer::new(source).tokenize();
    assert!(diags.is_empty(), "unexpected lex errors: {:?}", diags);
    tokens.into_iter().map(|t| t.node).collect()
}

fn spellings(source: &str) -> Vec<String> {
    lex(source)
        .iter()
        .filter(|t| **t != Lexeme::Eof)
        .map(|t| t.spelling().to_string())
        .collect()
}

#[test]
fn test_assignment_tokens() {
    assert_eq!(
        spellings("msg.ans = other.data().ans + edge.data().dist;"),
        vec![
            "msg", ".", "ans", "=", "other", ".", "data", "(", ")", ".", "ans", "+", "edge", ".",
            "data", "(", ")", ".", "dist", ";"
        ]
    );
}

#[test]
fn test_maximal_munch_comparisons() {
    assert_eq!(
        spellings("a <= b >= c == d != e < f > g"),
        vec!["a", "<=", "b", ">=", "c", "==", "d", "!=", "e", "<", "f", ">", "g"]
    );
}

#[test]
fn test_andnot_is_two_tokens() {
    assert_eq!(spellings("a &~ b"), vec!["a", "&", "~", "b"]);
    assert_eq!(spellings("a && b || c"), vec!["a", "&&", "b", "||", "c"]);
}

#[test]
fn test_arrow_and_scope() {
    assert_eq!(
        spellings("p->x = std::min(a, b);"),
        vec!["p", "->", "x", "=", "std", "::", "min", "(", "a", ",", "b", ")", ";"]
    );
}

#[test]
fn test_compound_assignment_and_increment() {
    assert_eq!(
        spellings("i += 1; j--; k++;"),
        vec!["i", "+=", "1", ";", "j", "--", ";", "k", "++", ";"]
    );
}

#[test]
fn test_keywords() {
    let toks = lex("if else return struct class operator");
    assert_eq!(
        toks,
        vec![
            Lexeme::If,
            Lexeme::Else,
            Lexeme::Return,
            Lexeme::Struct,
            Lexeme::Class,
            Lexeme::Operator,
            Lexeme::Eof
        ]
    );
}

#[test]
fn test_numbers_with_suffixes() {
    assert_eq!(
        spellings("1 0x1F 1.5e-3f 10ul .5"),
        vec!["1", "0x1F", "1.5e-3f", "10ul", ".5"]
    );
}

#[test]
fn test_string_and_char_literals() {
    let toks = lex(r#"s = "a+b"; c = '\n';"#);
    assert!(toks.contains(&Lexeme::Str("\"a+b\"".to_string())));
    assert!(toks.contains(&Lexeme::Char("'\\n'".to_string())));
}

#[test]
fn test_comments_skipped() {
    assert_eq!(
        spellings("a // trailing\n/* block\n comment */ b"),
        vec!["a", "b"]
    );
}

#[test]
fn test_directive_is_one_token() {
    let toks = lex("#include <graphlab.hpp>\nint x;");
    assert_eq!(
        toks[0],
        Lexeme::Directive("#include <graphlab.hpp>".to_string())
    );
    assert_eq!(toks[1], Lexeme::Ident("int".to_string()));
}

#[test]
fn test_hash_mid_line_is_an_error() {
    let (_, diags) = Lexer::new("int # x;").tokenize();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("unexpected character"));
}

#[test]
fn test_unterminated_string() {
    let (_, diags) = Lexer::new("s = \"abc\n;").tokenize();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("unterminated string literal"));
}

#[test]
fn test_unterminated_block_comment() {
    let (_, diags) = Lexer::new("a /* never closed").tokenize();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("block comment"));
}

#[test]
fn test_spans_point_at_source() {
    let src = "x = y;";
    let (tokens, _) = Lexer::new(src).tokenize();
    assert_eq!(tokens[2].span.slice(src), "y");
    assert_eq!(tokens[3].span, Span::new(5, 6));
}
