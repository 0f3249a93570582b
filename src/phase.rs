//! Per-phase conversion: annotate one body with its own label counter, then
//! lower it under that phase's predication policy.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::annotate::Annotator;
use crate::config::ConvertOptions;
use crate::diagnostic::Diagnostic;
use crate::lower::{Lowering, TRACK_FIELD};
use crate::syntax::tree::ParseNode;

/// Program-level mask that scatter inherits from apply.
pub const VP_TRACK: &str = "vp_track";

/// The three user-defined phases of a vertex program, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Gather,
    Apply,
    Scatter,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Gather, Phase::Apply, Phase::Scatter];

    /// Method name in the vertex program class.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Gather => "gather",
            Phase::Apply => "apply",
            Phase::Scatter => "scatter",
        }
    }

    /// Lowering policy. Gather never tracks; apply resolves `ROOT` to the
    /// incoming message's track field; scatter to the program's `vp_track`.
    pub fn lowering(self, options: &ConvertOptions, message_param: &str) -> Lowering {
        let (tracking, ambient) = match self {
            Phase::Gather => (false, VP_TRACK.to_string()),
            Phase::Apply => (
                options.tracking,
                format!("{}.{}", message_param, TRACK_FIELD),
            ),
            Phase::Scatter => (options.tracking, VP_TRACK.to_string()),
        };
        Lowering::new(tracking, &ambient).with_vector_type(&options.vector_type)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown phase '{}' (expected gather, apply or scatter)", s))
    }
}

/// Lowered lines of one phase body, plus any non-fatal findings.
#[derive(Clone, Debug)]
pub struct PhaseOutput {
    pub phase: Phase,
    pub lines: Vec<String>,
    pub masks: u32,
    pub warnings: Vec<Diagnostic>,
}

/// Convert one phase body. An empty body is rejected before the walk.
#[instrument(skip_all, fields(phase = %phase, tracking = lowering.tracking))]
pub fn convert_phase<N: ParseNode>(
    phase: Phase,
    body: &N,
    lowering: &Lowering,
) -> Result<PhaseOutput, Diagnostic> {
    if body.children().is_empty() {
        return Err(Diagnostic::error(
            format!("the {} body has no statements to convert", phase),
            body.span(),
        ));
    }
    let annotated = Annotator::new().annotate(body)?;
    let lines = lowering.lower_body(&annotated.root);
    debug!(
        masks = annotated.masks,
        lines = lines.len(),
        dropped = annotated.warnings.len(),
        "phase converted"
    );
    Ok(PhaseOutput {
        phase,
        lines,
        masks: annotated.masks,
        warnings: annotated.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_block;

    #[test]
    fn test_phase_names_roundtrip() {
        for phase in Phase::ALL {
            assert_eq!(phase.name().parse::<Phase>(), Ok(phase));
        }
        assert!("init".parse::<Phase>().is_err());
    }

    #[test]
    fn test_gather_never_tracks() {
        let options = ConvertOptions::default();
        assert!(options.tracking);
        assert!(!Phase::Gather.lowering(&options, "msg").tracking);
        assert!(Phase::Apply.lowering(&options, "msg").tracking);
    }

    #[test]
    fn test_ambient_masks() {
        let options = ConvertOptions::default();
        assert_eq!(
            Phase::Apply.lowering(&options, "msg_acc").ambient_mask,
            "msg_acc.track"
        );
        assert_eq!(
            Phase::Scatter.lowering(&options, "msg_acc").ambient_mask,
            "vp_track"
        );
    }

    #[test]
    fn test_track_free_option() {
        let options = ConvertOptions {
            tracking: false,
            ..ConvertOptions::default()
        };
        assert!(!Phase::Apply.lowering(&options, "m").tracking);
        assert!(!Phase::Scatter.lowering(&options, "m").tracking);
    }

    #[test]
    fn test_empty_body_rejected() {
        let body = parse_block("{ }").unwrap();
        let lowering = Lowering::new(true, "t");
        let err = convert_phase(Phase::Apply, &body, &lowering).unwrap_err();
        assert!(err.message.contains("apply body has no statements"));
    }

    #[test]
    fn test_negative_literal_is_a_set() {
        let body = parse_block("{ y = -1; }").unwrap();
        let lowering = Lowering::new(true, "msg_acc.track");
        let out = convert_phase(Phase::Apply, &body, &lowering).unwrap();
        assert_eq!(out.lines, vec!["  y.vec_op_set_mask(msg_acc.track, -1);"]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_labels_restart_in_every_phase() {
        let body = parse_block("{ if (x) { y = 1; } }").unwrap();
        let options = ConvertOptions::default();
        for phase in Phase::ALL {
            let out = convert_phase(phase, &body, &phase.lowering(&options, "m")).unwrap();
            assert_eq!(out.masks, 1);
            assert!(out.lines[0].ends_with("<bool> mask_1;"));
        }
    }
}
