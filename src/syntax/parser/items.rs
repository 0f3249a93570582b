use super::{join_tight, join_type, split_top_level_commas, top_level_positions, Parser};
use crate::syntax::ast::{ClassDef, ClassKeyword, FieldDecl, MethodDef, Param};
use crate::syntax::lexeme::Lexeme;
use crate::syntax::span::{Span, Spanned};

/// Declaration specifiers that never belong in a recovered return type.
const SPECIFIERS: &[&str] = &["explicit", "virtual", "inline", "static", "constexpr"];

/// Marker pragma introducing the patch segment.
pub(crate) const PATCH_PRAGMA: &str = "#pragma AUTOMI";

impl<'src> Parser<'src> {
    // --- Top-level items ---

    pub(super) fn parse_items(&mut self) -> Vec<ClassDef> {
        let mut classes = Vec::new();
        while !self.at(&Lexeme::Eof) {
            match self.peek() {
                Lexeme::Directive(_) | Lexeme::Semicolon => {
                    self.advance();
                }
                Lexeme::Struct | Lexeme::Class => {
                    if let Some(class) = self.parse_class() {
                        classes.push(class);
                    }
                }
                _ => self.skip_item(),
            }
        }
        classes
    }

    /// `struct Name [: bases] { members } [declarators];`
    fn parse_class(&mut self) -> Option<ClassDef> {
        let start = self.current_span();
        let keyword = match self.advance().node {
            Lexeme::Class => ClassKeyword::Class,
            _ => ClassKeyword::Struct,
        };
        let Some(name) = self.expect_ident() else {
            self.skip_item();
            return None;
        };
        if self.eat(&Lexeme::Semicolon) {
            // forward declaration
            return None;
        }

        let mut bases = Vec::new();
        if self.eat(&Lexeme::Colon) {
            while !self.at(&Lexeme::LBrace) && !self.at(&Lexeme::Eof) {
                if let Lexeme::Ident(base) = self.advance().node {
                    bases.push(base);
                }
            }
        }

        if !self.at(&Lexeme::LBrace) {
            self.error_with_help(
                &format!(
                    "expected '{{' after '{}', found {}",
                    name.node,
                    self.peek().description()
                ),
                "only complete struct and class definitions are supported",
            );
            self.skip_item();
            return None;
        }
        self.advance();

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.at(&Lexeme::RBrace) && !self.at(&Lexeme::Eof) {
            match self.peek() {
                Lexeme::Public | Lexeme::Private | Lexeme::Protected => {
                    self.advance();
                    self.expect(&Lexeme::Colon);
                }
                Lexeme::Semicolon | Lexeme::Directive(_) => {
                    self.advance();
                }
                Lexeme::Struct | Lexeme::Class => {
                    // nested type, not part of the program model
                    self.parse_class();
                }
                Lexeme::Typedef | Lexeme::Using => {
                    self.take_until_semicolon();
                    self.expect(&Lexeme::Semicolon);
                }
                _ => self.parse_member(&name.node, &mut fields, &mut methods),
            }
        }
        self.expect(&Lexeme::RBrace);
        // trailing declarators: `} instance;`
        self.take_until_semicolon();
        self.expect(&Lexeme::Semicolon);

        Some(ClassDef {
            keyword,
            name,
            bases,
            fields,
            methods,
            span: start.merge(self.prev_span()),
        })
    }

    /// One data member or member function.
    fn parse_member(
        &mut self,
        class_name: &str,
        fields: &mut Vec<FieldDecl>,
        methods: &mut Vec<MethodDef>,
    ) {
        let start = self.current_span();
        let mut head: Vec<Spanned<Lexeme>> = Vec::new();
        loop {
            match self.peek() {
                Lexeme::Operator => {
                    head.push(self.advance());
                    // `operator()` carries its own parentheses
                    if self.at(&Lexeme::LParen) && *self.peek_at(1) == Lexeme::RParen {
                        head.push(self.advance());
                        head.push(self.advance());
                    }
                    while !self.at(&Lexeme::LParen) && !self.at(&Lexeme::Eof) {
                        head.push(self.advance());
                    }
                }
                Lexeme::LParen
                | Lexeme::Semicolon
                | Lexeme::Eq
                | Lexeme::LBrace
                | Lexeme::RBrace
                | Lexeme::Eof => break,
                _ => head.push(self.advance()),
            }
        }

        if head.is_empty() {
            self.error_at_current(&format!(
                "expected member declaration, found {}",
                self.peek().description()
            ));
            self.skip_item();
            return;
        }

        if self.at(&Lexeme::LParen) {
            let method = self.parse_method_rest(class_name, head, start);
            methods.push(method);
        } else {
            self.parse_field_rest(head, start, fields);
        }
    }

    fn parse_method_rest(
        &mut self,
        class_name: &str,
        head: Vec<Spanned<Lexeme>>,
        start: Span,
    ) -> MethodDef {
        let group = self.take_balanced();
        let inner = if group.len() >= 2 {
            &group[1..group.len() - 1]
        } else {
            &group[..0]
        };
        let params = split_top_level_commas(inner)
            .into_iter()
            .filter_map(parse_param)
            .collect();

        let mut qualifiers = Vec::new();
        while !matches!(
            self.peek(),
            Lexeme::LBrace | Lexeme::Semicolon | Lexeme::Colon | Lexeme::Eq | Lexeme::Eof
        ) {
            qualifiers.push(self.advance().node.spelling().to_string());
        }

        let mut body = None;
        if self.eat(&Lexeme::Eq) {
            // `= default;`, `= delete;`, `= 0;`
            self.take_until_semicolon();
            self.expect(&Lexeme::Semicolon);
        } else {
            if self.eat(&Lexeme::Colon) {
                self.skip_initializer_list();
            }
            if self.at(&Lexeme::LBrace) {
                body = Some(self.parse_compound());
            } else {
                self.expect(&Lexeme::Semicolon);
            }
        }

        let (name, ret) = split_method_head(&head, class_name);
        MethodDef {
            name,
            ret,
            params,
            qualifiers,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// `: a(x), b{y}` up to the constructor body.
    fn skip_initializer_list(&mut self) {
        let mut after_name = false;
        loop {
            match self.peek() {
                Lexeme::Eof => return,
                Lexeme::LParen => {
                    self.take_balanced();
                    after_name = false;
                }
                Lexeme::LBrace if after_name => {
                    self.take_balanced();
                    after_name = false;
                }
                Lexeme::LBrace => return,
                Lexeme::Ident(_) => {
                    self.advance();
                    after_name = true;
                }
                _ => {
                    self.advance();
                    after_name = false;
                }
            }
        }
    }

    fn parse_field_rest(
        &mut self,
        head: Vec<Spanned<Lexeme>>,
        start: Span,
        fields: &mut Vec<FieldDecl>,
    ) {
        let mut default = None;
        if self.eat(&Lexeme::Eq) {
            let value = self.take_until_semicolon();
            let first = split_top_level_commas(&value)
                .first()
                .map(|v| join_tight(v))
                .unwrap_or_default();
            default = Some(first);
        } else if self.at(&Lexeme::LBrace) {
            let group = self.take_balanced();
            if group.len() > 2 {
                default = Some(join_tight(&group[1..group.len() - 1]));
            }
            self.take_until_semicolon();
        } else {
            self.take_until_semicolon();
        }
        self.expect(&Lexeme::Semicolon);

        let Some(name_idx) = head.iter().rposition(|t| t.node.is_name_like()) else {
            self.diagnostics.push(crate::diagnostic::Diagnostic::error(
                "member declaration has no name".to_string(),
                start.merge(self.prev_span()),
            ));
            return;
        };
        let ty = join_type(&head[..name_idx]);
        fields.push(FieldDecl {
            name: head[name_idx].node.spelling().to_string(),
            ty,
            default,
            span: start.merge(self.prev_span()),
        });
    }

    /// Skip one top-level item we do not model (functions, globals, ...).
    fn skip_item(&mut self) {
        loop {
            match self.peek() {
                Lexeme::Eof => return,
                Lexeme::Semicolon => {
                    self.advance();
                    return;
                }
                Lexeme::LBrace => {
                    self.take_balanced();
                    self.eat(&Lexeme::Semicolon);
                    return;
                }
                Lexeme::LParen | Lexeme::LBracket => {
                    self.take_balanced();
                }
                Lexeme::RBrace | Lexeme::RParen | Lexeme::RBracket => {
                    self.error_at_current(&format!("unexpected {}", self.peek().description()));
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Split `ret name` (or `operator+=`) into the member name and its return
/// type with declaration specifiers removed. Constructors get an empty
/// return type.
fn split_method_head(head: &[Spanned<Lexeme>], class_name: &str) -> (String, String) {
    let name_start = match head.iter().position(|t| t.node == Lexeme::Operator) {
        Some(idx) => idx,
        None => {
            let last = head.len() - 1;
            if last > 0 && head[last - 1].node == Lexeme::Tilde {
                last - 1
            } else {
                last
            }
        }
    };
    let name = join_tight(&head[name_start..]);
    let ret: Vec<Spanned<Lexeme>> = head[..name_start]
        .iter()
        .filter(|t| !SPECIFIERS.contains(&t.node.spelling()))
        .cloned()
        .collect();
    let ret = if name == class_name && ret.is_empty() {
        String::new()
    } else {
        join_type(&ret)
    };
    (name, ret)
}

/// `const vertex_type& vertex = x` into name, type and default.
fn parse_param(tokens: &[Spanned<Lexeme>]) -> Option<Param> {
    if tokens.is_empty() {
        return None;
    }
    let (decl, default) = match top_level_positions(tokens, |t| *t == Lexeme::Eq).first() {
        Some(&eq) => (&tokens[..eq], Some(join_tight(&tokens[eq + 1..]))),
        None => (tokens, None),
    };
    let named = decl.len() >= 2 && decl[decl.len() - 1].node.is_name_like();
    let (ty, name) = if named {
        (
            join_type(&decl[..decl.len() - 1]),
            decl[decl.len() - 1].node.spelling().to_string(),
        )
    } else {
        (join_type(decl), String::new())
    };
    Some(Param { name, ty, default })
}

/// Lines following a `#pragma AUTOMI` marker, up to the first blank line.
/// Returns an empty list when the marker is absent.
pub(crate) fn locate_patch(source: &str) -> Vec<String> {
    let mut lines = source.lines();
    let found = lines.any(|line| line.trim_start().starts_with(PATCH_PRAGMA));
    if !found {
        return Vec::new();
    }
    lines
        .take_while(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}
