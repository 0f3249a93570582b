use crate::config::ConvertOptions;
use crate::lower::{INDENT, TRACK_FIELD};
use crate::phase::{Phase, PhaseOutput, VP_TRACK};
use crate::syntax::Param;

use super::{DataStruct, Field, MessageStruct, SourceProgram, VertexProgram, EDGE_DATA, MSG_TYPE};

const PROGRAM_HEADER: [&str; 2] = ["#include <graphlab.hpp>", "#include <limits>"];

/// Emit the multi-instance program: header and patch, the three data
/// types, the graph helpers, then the vertex program class.
pub fn emit_program(
    program: &SourceProgram,
    phases: &[PhaseOutput],
    options: &ConvertOptions,
) -> String {
    let mut emitter = Emitter::new(options);
    for line in PROGRAM_HEADER {
        emitter.line(line);
    }
    for line in &program.patch {
        emitter.line(line);
    }
    emitter.blank();
    emitter.vertex_data(&program.vertex_data);
    emitter.blank();
    match &program.edge_data {
        Some(edge) => emitter.edge_data(edge),
        None => emitter.line(format!("typedef graphlab::empty {};", EDGE_DATA)),
    }
    emitter.blank();
    emitter.msg_type(&program.msg_type);
    emitter.blank();
    emitter.helpers();
    emitter.blank();
    emitter.vertex_program(&program.vertex_program, phases);
    emitter.finish()
}

struct Emitter<'a> {
    options: &'a ConvertOptions,
    output: Vec<String>,
}

impl<'a> Emitter<'a> {
    fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            output: Vec::new(),
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    fn blank(&mut self) {
        self.output.push(String::new());
    }

    fn finish(self) -> String {
        let mut text = self.output.join("\n");
        text.push('\n');
        text
    }

    /// `<vector_type><ty>`
    fn vector(&self, ty: &str) -> String {
        format!("{}<{}>", self.options.vector_type, ty)
    }

    /// Size a vector field to the lane count and fill it with its default.
    fn sized(&mut self, field: &Field) {
        let sized = format!(
            "{}{}{} = {}({});",
            INDENT,
            INDENT,
            field.name,
            self.vector(&field.ty),
            self.options.lanes
        );
        self.line(sized);
        if let Some(default) = &field.default {
            self.line(format!("{}{}{}.set_all({});", INDENT, INDENT, field.name, default));
        }
    }

    fn vector_fields(&mut self, fields: &[Field]) {
        for field in fields {
            let decl = format!("{}{} {};", INDENT, self.vector(&field.ty), field.name);
            self.line(decl);
        }
    }

    fn serializers(&mut self, names: &[&str]) {
        self.line(format!("{}void save(graphlab::oarchive &oarc) const {{", INDENT));
        for name in names {
            self.line(format!("{}{}oarc << {};", INDENT, INDENT, name));
        }
        self.line(format!("{}}}", INDENT));
        self.line(format!("{}void load(graphlab::iarchive &iarc) {{", INDENT));
        for name in names {
            self.line(format!("{}{}iarc >> {};", INDENT, INDENT, name));
        }
        self.line(format!("{}}}", INDENT));
    }

    // --- Data types ---

    fn vertex_data(&mut self, data: &DataStruct) {
        self.line(format!("struct {} {{", data.name));
        self.vector_fields(&data.fields);

        self.line(format!("{}{}() {{", INDENT, data.name));
        for field in &data.fields {
            self.sized(field);
        }
        self.line(format!("{}}}", INDENT));

        if !data.fields.is_empty() {
            let params: Vec<String> = data
                .fields
                .iter()
                .map(|f| format!("const {}& {}", self.vector(&f.ty), f.name))
                .collect();
            self.line(format!(
                "{}explicit {}({}) : {} {{}}",
                INDENT,
                data.name,
                params.join(", "),
                member_inits(&data.fields)
            ));
        }

        self.serializers(&field_names(&data.fields));
        self.line(format!("}}; // end of {}", data.name));
    }

    /// Edges are shared by every instance, so edge data stays scalar.
    fn edge_data(&mut self, data: &DataStruct) {
        if data.pod {
            self.line(format!("struct {} : graphlab::IS_POD_TYPE {{", data.name));
        } else {
            self.line(format!("struct {} {{", data.name));
        }
        for field in &data.fields {
            self.line(format!("{}{} {};", INDENT, field.ty, field.name));
        }
        if !data.fields.is_empty() {
            let params: Vec<String> = data
                .fields
                .iter()
                .map(|f| match &f.default {
                    Some(default) => format!("{} {} = {}", f.ty, f.name, default),
                    None => format!("{} {}", f.ty, f.name),
                })
                .collect();
            self.line(format!(
                "{}{}({}) : {} {{}}",
                INDENT,
                data.name,
                params.join(", "),
                member_inits(&data.fields)
            ));
        }
        if !data.pod {
            self.serializers(&field_names(&data.fields));
        }
        self.line(format!("}}; // end of {}", data.name));
    }

    fn msg_type(&mut self, msg: &MessageStruct) {
        let tracking = self.options.tracking;
        let track = Field {
            name: TRACK_FIELD.to_string(),
            ty: "bool".to_string(),
            default: Some("false".to_string()),
        };

        self.line(format!("struct {} {{", MSG_TYPE));
        self.vector_fields(&msg.fields);
        if tracking {
            self.vector_fields(std::slice::from_ref(&track));
        }

        // default: every lane holds the field default
        self.line(format!("{}{}() {{", INDENT, MSG_TYPE));
        for field in &msg.fields {
            self.sized(field);
        }
        if tracking {
            self.sized(&track);
        }
        self.line(format!("{}}}", INDENT));

        // single lane: the message a single-instance program would send
        let mut params: Vec<String> = msg
            .fields
            .iter()
            .map(|f| format!("{} {}_in", f.ty, f.name))
            .collect();
        params.push("size_t idx".to_string());
        self.line(format!("{}{}({}) {{", INDENT, MSG_TYPE, params.join(", ")));
        for field in &msg.fields {
            self.sized(field);
            self.line(format!(
                "{}{}{}.set_single({}_in, idx);",
                INDENT, INDENT, field.name, field.name
            ));
        }
        if tracking {
            self.sized(&track);
            self.line(format!("{}{}{}.set_single(true, idx);", INDENT, INDENT, TRACK_FIELD));
        }
        self.line(format!("{}}}", INDENT));

        // explicit: one whole vector per field
        let mut vectors: Vec<&Field> = msg.fields.iter().collect();
        if tracking {
            vectors.push(&track);
        }
        if !vectors.is_empty() {
            let params: Vec<String> = vectors
                .iter()
                .map(|f| format!("const {}& {}_in", self.vector(&f.ty), f.name))
                .collect();
            self.line(format!("{}{}({}) {{", INDENT, MSG_TYPE, params.join(", ")));
            for field in &vectors {
                let copy = format!(
                    "{}{}{} = {}({}_in);",
                    INDENT,
                    INDENT,
                    field.name,
                    self.vector(&field.ty),
                    field.name
                );
                self.line(copy);
            }
            self.line(format!("{}}}", INDENT));
        }

        self.line(format!(
            "{}{}& operator+=(const {}& other) {{",
            INDENT, MSG_TYPE, MSG_TYPE
        ));
        if tracking {
            let merge = format!(
                "{}{}{}::pair_op_or({}, other.{});",
                INDENT,
                INDENT,
                self.vector("bool"),
                TRACK_FIELD,
                TRACK_FIELD
            );
            self.line(merge);
        }
        for acc in &msg.accumulate {
            let Some(field) = msg.field(&acc.field) else {
                continue;
            };
            let reduce = format!(
                "{}{}{}::{}({}, other.{});",
                INDENT,
                INDENT,
                self.vector(&field.ty),
                acc.op.primitive(),
                field.name,
                field.name
            );
            self.line(reduce);
        }
        self.line(format!("{}{}return *this;", INDENT, INDENT));
        self.line(format!("{}}}", INDENT));

        let mut names = field_names(&msg.fields);
        if tracking {
            names.push(TRACK_FIELD);
        }
        self.serializers(&names);
        self.line(format!("}}; // end of {}", MSG_TYPE));
    }

    fn helpers(&mut self) {
        self.line("typedef graphlab::distributed_graph<vertex_data, edge_data> graph_type;");
        self.line("inline graph_type::vertex_type");
        self.line("get_other_vertex(const graph_type::edge_type& edge,");
        self.line("                 const graph_type::vertex_type& vertex) {");
        self.line(format!(
            "{}return edge.source().id() == vertex.id() ? edge.target() : edge.source();",
            INDENT
        ));
        self.line("}");
    }

    // --- Vertex program ---

    fn vertex_program(&mut self, program: &VertexProgram, phases: &[PhaseOutput]) {
        let tracking = self.options.tracking;
        self.line(format!(
            "class {} : public graphlab::ivertex_program<graph_type, {}, {}> {{",
            program.name, MSG_TYPE, MSG_TYPE
        ));
        self.vector_fields(&program.fields);
        if tracking {
            let decl = format!("{}{} {};", INDENT, self.vector("bool"), VP_TRACK);
            self.line(decl);
        }
        self.line("public:");

        if let Some(text) = &program.gather_edges {
            self.blank();
            self.verbatim(text);
        }

        for output in phases {
            let Some(method) = program.phase(output.phase) else {
                continue;
            };
            let signature = match output.phase {
                Phase::Gather => {
                    format!("{} gather({}) const", MSG_TYPE, param_list(&method.params))
                }
                Phase::Apply => format!("void apply({})", param_list(&method.params)),
                Phase::Scatter => {
                    format!("void scatter({}) const", param_list(&method.params))
                }
            };
            self.blank();
            self.line(format!("{}{} {{", INDENT, signature));
            if tracking && output.phase == Phase::Apply {
                self.line(format!(
                    "{}{}{} = {}.{};",
                    INDENT,
                    INDENT,
                    VP_TRACK,
                    program.message_param(),
                    TRACK_FIELD
                ));
            }
            for line in &output.lines {
                self.line(format!("{}{}", INDENT, line));
            }
            self.line(format!("{}}}", INDENT));
        }

        if let Some(text) = &program.scatter_edges {
            self.blank();
            self.verbatim(text);
        }

        self.blank();
        let mut names = field_names(&program.fields);
        if tracking {
            names.push(VP_TRACK);
        }
        self.serializers(&names);
        self.line("}; // end of vertex program class");
    }

    /// Source text placed at member indentation. Continuation lines keep
    /// their original indentation.
    fn verbatim(&mut self, text: &str) {
        for (i, line) in text.lines().enumerate() {
            if i == 0 {
                self.line(format!("{}{}", INDENT, line.trim_end()));
            } else {
                self.line(line.trim_end());
            }
        }
    }
}

fn field_names(fields: &[Field]) -> Vec<&str> {
    fields.iter().map(|f| f.name.as_str()).collect()
}

/// `a(a), b(b)`
fn member_inits(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!("{}({})", f.name, f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn param_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| match &p.default {
            Some(default) => format!("{} {} = {}", p.ty, p.name, default),
            None => format!("{} {}", p.ty, p.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
