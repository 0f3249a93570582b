//! Whole-file conversion.
//!
//! Recovers the four pieces of a single-instance vertex program
//! (`vertex_data`, `edge_data`, `msg_type` and the vertex program class)
//! from a parsed source file, converts the three phase bodies, and emits
//! the multi-instance program around them.

mod emit;


pub use emit::emit_program;

use tracing::{debug, instrument};

use crate::annotate::{compound_op, top_level_index};
use crate::config::ConvertOptions;
use crate::diagnostic::Diagnostic;
use crate::ops::{pairwise_op, PairOp};
use crate::phase::{convert_phase, Phase, PhaseOutput};
use crate::syntax::{
    self, ClassDef, FieldDecl, MethodDef, Param, ParseNode, SourceFile, Span, SyntaxKind,
    SyntaxNode,
};

pub const VERTEX_DATA: &str = "vertex_data";
pub const EDGE_DATA: &str = "edge_data";
pub const MSG_TYPE: &str = "msg_type";
pub const VERTEX_PROGRAM: &str = "vertex_program";
/// Base class that marks a vertex program declared under another name.
pub const PROGRAM_BASE: &str = "ivertex_program";

const ACCUMULATE: &str = "operator+=";
const GATHER_EDGES: &str = "gather_edges";
const SCATTER_EDGES: &str = "scatter_edges";
/// Regenerated from the field list rather than converted.
const SERIALIZERS: [&str; 2] = ["save", "load"];

// --- Program model ---

/// A data member as the converted program declares it.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub default: Option<String>,
}

impl Field {
    fn from_param(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            ty: param.ty.clone(),
            default: param.default.clone(),
        }
    }

    fn from_decl(decl: &FieldDecl) -> Self {
        Self {
            name: decl.name.clone(),
            ty: decl.ty.clone(),
            default: decl.default.clone(),
        }
    }
}

/// `vertex_data` or `edge_data`.
#[derive(Clone, Debug)]
pub struct DataStruct {
    pub name: String,
    /// Derives `graphlab::IS_POD_TYPE`.
    pub pod: bool,
    pub fields: Vec<Field>,
}

/// One `field = <reduction>;` line of the message's `operator+=`.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulate {
    pub field: String,
    pub op: PairOp,
}

#[derive(Clone, Debug)]
pub struct MessageStruct {
    pub fields: Vec<Field>,
    pub accumulate: Vec<Accumulate>,
}

impl MessageStruct {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A phase method of the vertex program with its parsed body.
#[derive(Clone, Debug)]
pub struct PhaseMethod {
    pub phase: Phase,
    pub params: Vec<Param>,
    pub body: SyntaxNode,
}

#[derive(Clone, Debug)]
pub struct VertexProgram {
    pub name: String,
    pub fields: Vec<Field>,
    /// Source text of `gather_edges`, copied verbatim.
    pub gather_edges: Option<String>,
    /// Source text of `scatter_edges`, copied verbatim.
    pub scatter_edges: Option<String>,
    /// One entry per phase, in execution order.
    pub phases: Vec<PhaseMethod>,
}

impl VertexProgram {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseMethod> {
        self.phases.iter().find(|m| m.phase == phase)
    }

    /// Name of the accumulated message: the last parameter of `apply`.
    pub fn message_param(&self) -> &str {
        self.phase(Phase::Apply)
            .and_then(|m| m.params.last())
            .map(|p| p.name.as_str())
            .unwrap_or_default()
    }
}

/// Everything the emitter needs from a single-instance source file.
#[derive(Clone, Debug)]
pub struct SourceProgram {
    /// Lines of the `#pragma AUTOMI` patch, copied verbatim.
    pub patch: Vec<String>,
    pub vertex_data: DataStruct,
    /// `None` when the source declares no `edge_data`.
    pub edge_data: Option<DataStruct>,
    pub msg_type: MessageStruct,
    pub vertex_program: VertexProgram,
    pub warnings: Vec<Diagnostic>,
}

/// The converted program text and what was found along the way.
#[derive(Clone, Debug)]
pub struct Converted {
    pub text: String,
    pub phases: Vec<PhaseOutput>,
    pub warnings: Vec<Diagnostic>,
}

// --- Recovery ---

/// Parse a source file and recover its program pieces. Every missing
/// piece is reported before any phase body is walked.
pub fn parse_program(source: &str) -> Result<SourceProgram, Vec<Diagnostic>> {
    let file = syntax::parse_source(source)?;
    Recovery::new(source).program(&file)
}

struct Recovery<'src> {
    source: &'src str,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'src> Recovery<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn program(mut self, file: &SourceFile) -> Result<SourceProgram, Vec<Diagnostic>> {
        let vertex_data = self.require(file.class(VERTEX_DATA), VERTEX_DATA);
        let msg_type = self.require(file.class(MSG_TYPE), MSG_TYPE);
        let program_class = self.require(
            file.class(VERTEX_PROGRAM)
                .or_else(|| file.classes.iter().find(|c| c.derives(PROGRAM_BASE))),
            VERTEX_PROGRAM,
        );

        let vertex_data = vertex_data.map(data_struct);
        let edge_data = file.class(EDGE_DATA).map(data_struct);
        let msg_type = msg_type.map(|class| self.message_struct(class));
        let vertex_program = program_class.and_then(|class| self.vertex_program(class));

        match (vertex_data, msg_type, vertex_program) {
            (Some(vertex_data), Some(Some(msg_type)), Some(vertex_program))
                if self.errors.is_empty() =>
            {
                Ok(SourceProgram {
                    patch: file.patch.clone(),
                    vertex_data,
                    edge_data,
                    msg_type,
                    vertex_program,
                    warnings: self.warnings,
                })
            }
            _ => Err(self.errors),
        }
    }

    fn require<'a>(&mut self, class: Option<&'a ClassDef>, name: &str) -> Option<&'a ClassDef> {
        if class.is_none() {
            self.errors.push(
                Diagnostic::error(
                    format!("missing '{}' in the source program", name),
                    Span::dummy(),
                )
                .with_help(format!(
                    "a vertex program needs vertex_data, msg_type and a class deriving {}",
                    PROGRAM_BASE
                )),
            );
        }
        class
    }

    /// `None` when an accumulate line cannot be converted.
    fn message_struct(&mut self, class: &ClassDef) -> Option<MessageStruct> {
        let fields = field_list(class);
        let mut accumulate = Vec::new();
        let Some(body) = class.method(ACCUMULATE).and_then(|m| m.body.as_ref()) else {
            self.warnings.push(
                Diagnostic::warning(
                    format!("'{}' has no {} body", MSG_TYPE, ACCUMULATE),
                    class.name.span,
                )
                .with_note("the converted accumulator only merges the track mask".to_string()),
            );
            return Some(MessageStruct { fields, accumulate });
        };

        let errors_before = self.errors.len();
        for stmt in body.children() {
            match stmt.kind() {
                SyntaxKind::Return => {}
                SyntaxKind::BinaryOperator => {
                    if let Some(acc) = self.accumulate_line(stmt, &fields) {
                        accumulate.push(acc);
                    }
                }
                _ => self.warnings.push(Diagnostic::warning(
                    format!("{} dropped from {}", stmt.kind().name(), ACCUMULATE),
                    stmt.span(),
                )),
            }
        }
        (self.errors.len() == errors_before).then_some(MessageStruct { fields, accumulate })
    }

    fn accumulate_line(&mut self, stmt: &SyntaxNode, fields: &[Field]) -> Option<Accumulate> {
        let tokens = stmt.token_spellings();
        let Some(at) = top_level_index(&tokens, |t| t == "=" || compound_op(t).is_some()) else {
            self.warnings.push(Diagnostic::warning(
                format!("expression without assignment dropped from {}", ACCUMULATE),
                stmt.span(),
            ));
            return None;
        };
        let target = tokens[..at].concat();
        let field = target.strip_prefix("this->").unwrap_or(&target).to_string();
        let op = if tokens[at] == "=" {
            pairwise_op(&tokens[at + 1..].concat())
        } else {
            pairwise_op(tokens[at].trim_end_matches('='))
        };

        let Some(op) = op else {
            self.errors.push(
                Diagnostic::error(
                    format!(
                        "accumulation of '{}' matches no pairwise reduction",
                        field
                    ),
                    stmt.span(),
                )
                .with_help(format!(
                    "supported reductions: {}",
                    PairOp::ALL.map(|op| op.spelling()).join(", ")
                )),
            );
            return None;
        };
        if !fields.iter().any(|f| f.name == field) {
            self.warnings.push(Diagnostic::warning(
                format!("{} accumulates unknown field '{}'", ACCUMULATE, field),
                stmt.span(),
            ));
            return None;
        }
        Some(Accumulate { field, op })
    }

    fn vertex_program(&mut self, class: &ClassDef) -> Option<VertexProgram> {
        let mut phases = Vec::new();
        for phase in Phase::ALL {
            let Some(method) = class.method(phase.name()) else {
                self.errors.push(Diagnostic::error(
                    format!("'{}' has no {} method", class.name.node, phase),
                    class.name.span,
                ));
                continue;
            };
            if let Some(found) = self.phase_method(phase, method) {
                phases.push(found);
            }
        }

        for method in &class.methods {
            let known = [GATHER_EDGES, SCATTER_EDGES]
                .iter()
                .chain(SERIALIZERS.iter())
                .chain(Phase::ALL.map(Phase::name).iter())
                .any(|name| method.name == *name);
            if !known {
                debug!(method = %method.name, "method dropped");
                self.warnings.push(Diagnostic::warning(
                    format!(
                        "method '{}' of '{}' dropped from the converted program",
                        method.name, class.name.node
                    ),
                    method.span,
                ));
            }
        }

        if phases.len() != Phase::ALL.len() {
            return None;
        }
        Some(VertexProgram {
            name: class.name.node.clone(),
            fields: class.fields.iter().map(Field::from_decl).collect(),
            gather_edges: self.verbatim(class.method(GATHER_EDGES)),
            scatter_edges: self.verbatim(class.method(SCATTER_EDGES)),
            phases,
        })
    }

    fn phase_method(&mut self, phase: Phase, method: &MethodDef) -> Option<PhaseMethod> {
        let Some(body) = &method.body else {
            self.errors.push(Diagnostic::error(
                format!("{} is declared without a body", phase),
                method.span,
            ));
            return None;
        };
        if body.children().is_empty() {
            self.errors.push(Diagnostic::error(
                format!("the {} body has no statements to convert", phase),
                body.span(),
            ));
            return None;
        }
        if phase == Phase::Apply && method.params.is_empty() {
            self.errors.push(
                Diagnostic::error("apply takes no parameters".to_string(), method.span)
                    .with_help("the accumulated message must be the last parameter".to_string()),
            );
            return None;
        }
        Some(PhaseMethod {
            phase,
            params: method.params.clone(),
            body: body.clone(),
        })
    }

    fn verbatim(&self, method: Option<&MethodDef>) -> Option<String> {
        method.map(|m| m.span.slice(self.source).to_string())
    }
}

/// Fields from the first constructor that takes parameters, else the
/// member declarations.
fn field_list(class: &ClassDef) -> Vec<Field> {
    match class.constructors().find(|c| !c.params.is_empty()) {
        Some(ctor) => ctor.params.iter().map(Field::from_param).collect(),
        None => class.fields.iter().map(Field::from_decl).collect(),
    }
}

fn data_struct(class: &ClassDef) -> DataStruct {
    DataStruct {
        name: class.name.node.clone(),
        pod: class.is_pod(),
        fields: field_list(class),
    }
}

// --- Conversion ---

/// Convert the three phases and emit the multi-instance program.
#[instrument(skip_all, fields(tracking = options.tracking))]
pub fn convert_program(
    program: &SourceProgram,
    options: &ConvertOptions,
) -> Result<Converted, Vec<Diagnostic>> {
    let message_param = program.vertex_program.message_param();
    let mut phases = Vec::new();
    let mut errors = Vec::new();
    for method in &program.vertex_program.phases {
        let lowering = method.phase.lowering(options, message_param);
        match convert_phase(method.phase, &method.body, &lowering) {
            Ok(output) => phases.push(output),
            Err(diag) => errors.push(diag),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut warnings = program.warnings.clone();
    warnings.extend(phases.iter().flat_map(|p| p.warnings.iter().cloned()));
    let text = emit_program(program, &phases, options);
    debug!(
        warnings = warnings.len(),
        bytes = text.len(),
        "program converted"
    );
    Ok(Converted {
        text,
        phases,
        warnings,
    })
}
