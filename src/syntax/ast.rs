//! File-level declarations recovered from a single-instance vertex program.

use crate::syntax::span::{Span, Spanned};
use crate::syntax::tree::SyntaxNode;

/// A parsed input file: the `#pragma AUTOMI` patch lines and every
/// top-level struct/class.
#[derive(Clone, Debug, Default)]
pub struct SourceFile {
    pub patch: Vec<String>,
    pub classes: Vec<ClassDef>,
}

impl SourceFile {
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name.node == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKeyword {
    Struct,
    Class,
}

#[derive(Clone, Debug)]
pub struct ClassDef {
    pub keyword: ClassKeyword,
    pub name: Spanned<String>,
    /// Identifiers mentioned in the base-clause, e.g. `IS_POD_TYPE`.
    pub bases: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDef>,
    pub span: Span,
}

impl ClassDef {
    pub fn derives(&self, base: &str) -> bool {
        self.bases.iter().any(|b| b == base)
    }

    pub fn is_pod(&self) -> bool {
        self.derives("IS_POD_TYPE")
    }

    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods
            .iter()
            .filter(move |m| m.name == self.name.node && m.ret.is_empty())
    }
}

/// A data member: `ans_type dist = 1;`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: String,
    pub default: Option<String>,
    pub span: Span,
}

/// A function parameter: `const vertex_type & vertex`.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: String,
    pub default: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MethodDef {
    pub name: String,
    /// Return type; empty for constructors.
    pub ret: String,
    pub params: Vec<Param>,
    /// Trailing qualifiers such as `const` or `override`.
    pub qualifiers: Vec<String>,
    pub body: Option<SyntaxNode>,
    pub span: Span,
}

impl MethodDef {
    pub fn is_const(&self) -> bool {
        self.qualifiers.iter().any(|q| q == "const")
    }

    /// `ret name(params) [const]`, with parameters rendered `type name`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.name.is_empty() {
                    p.ty.clone()
                } else {
                    format!("{} {}", p.ty, p.name)
                }
            })
            .collect();
        let mut sig = format!("{} {}({})", self.ret, self.name, params.join(", "));
        if self.is_const() {
            sig.push_str(" const");
        }
        sig
    }
}
