//! JSON interchange format for rules.
//!
//! Vertex IDs are written out verbatim, along with the next ID each diagram
//! would hand out, so that a reloaded rule matches and rewrites exactly like
//! the original. Phases are stored in their textual form, e.g. `"2a + 1/4"`.

use std::collections::BTreeSet;
use serde::{ Deserialize, Serialize };
use thiserror::Error;
use crate::{
    expr::PhaseExpr,
    graph::{
        Diagram,
        EdgeKind,
        GraphError,
        Position,
        Vertex,
        VertexId,
        VertexKind,
    },
    rule::{ Rule, Side, ValidationError },
};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("vertex id {1} appears more than once in the {0}")]
    RepeatedId(Side, VertexId),

    #[error("edge in the {0} refers to unknown vertex {1}")]
    UnknownId(Side, VertexId),

    #[error("vertex id {1} in the {0} exceeds the limit of {}", MAX_ID)]
    IdOutOfRange(Side, VertexId),

    #[error("invalid edge in the {0}: {1}")]
    Graph(Side, GraphError),

    #[error("invalid rule: {0}")]
    Validation(#[from] ValidationError),
}
pub type FormatResult<T> = Result<T, FormatError>;

/// Largest vertex ID, and `next_id`, accepted when loading a rule.
pub const MAX_ID: VertexId = 1 << 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RuleRepr {
    name: String,
    #[serde(default)]
    description: String,
    lhs: DiagramRepr,
    rhs: DiagramRepr,
    boundary_order: Vec<(VertexId, VertexId)>,
    free_variables: BTreeSet<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DiagramRepr {
    #[serde(default)]
    next_id: usize,
    vertices: Vec<VertexRepr>,
    edges: Vec<EdgeRepr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct VertexRepr {
    id: VertexId,
    kind: VertexKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    phase: String,
    #[serde(default)]
    pos: Position,
    #[serde(default, skip_serializing_if = "is_false")]
    unfusable: bool,
}

fn is_false(b: &bool) -> bool { !*b }

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EdgeRepr {
    a: VertexId,
    b: VertexId,
    kind: EdgeKind,
}

impl From<&Diagram> for DiagramRepr {
    fn from(dg: &Diagram) -> Self {
        let vertices: Vec<VertexRepr> =
            dg.vertices()
            .map(|(id, v)| {
                VertexRepr {
                    id,
                    kind: v.kind,
                    phase:
                        if v.phase.is_zero() {
                            String::new()
                        } else {
                            v.phase.to_string()
                        },
                    pos: v.pos,
                    unfusable: v.unfusable,
                }
            })
            .collect();
        let edges: Vec<EdgeRepr> =
            dg.edges()
            .map(|(a, b, kind)| EdgeRepr { a, b, kind })
            .collect();
        Self { next_id: dg.next_id(), vertices, edges }
    }
}

impl DiagramRepr {
    fn into_diagram(self, side: Side) -> FormatResult<Diagram> {
        let mut dg = Diagram::new();
        if self.next_id > MAX_ID {
            return Err(FormatError::IdOutOfRange(side, self.next_id));
        }
        for VertexRepr { id, kind, phase, pos, unfusable } in self.vertices {
            if id > MAX_ID { return Err(FormatError::IdOutOfRange(side, id)); }
            let phase: PhaseExpr =
                if phase.trim().is_empty() {
                    PhaseExpr::zero()
                } else {
                    phase.parse()
                        .map_err(|err| {
                            ValidationError::InvalidPhaseExpression(
                                side, id, format!("{}", err))
                        })?
                };
            let mut vertex = Vertex::new(kind, phase);
            vertex.pos = pos;
            vertex.unfusable = unfusable;
            dg.place_vertex(id, vertex)
                .map_err(|_| FormatError::RepeatedId(side, id))?;
        }
        dg.reserve_ids(self.next_id);
        for EdgeRepr { a, b, kind } in self.edges {
            dg.add_edge(a, b, kind)
                .map_err(|err| match err {
                    GraphError::UnknownVertex(id) => FormatError::UnknownId(side, id),
                    err => FormatError::Graph(side, err),
                })?;
        }
        Ok(dg)
    }
}

impl Rule {
    fn to_repr(&self) -> RuleRepr {
        RuleRepr {
            name: self.name.clone(),
            description: self.description.clone(),
            lhs: (&self.lhs).into(),
            rhs: (&self.rhs).into(),
            boundary_order: self.boundary_order.clone(),
            free_variables: self.free_variables.clone(),
        }
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> FormatResult<String> {
        Ok(serde_json::to_string(&self.to_repr())?)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> FormatResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_repr())?)
    }

    /// Decode a rule from JSON, then validate it.
    pub fn from_json(s: &str) -> FormatResult<Self> {
        let repr: RuleRepr = serde_json::from_str(s)?;
        let lhs = repr.lhs.into_diagram(Side::Lhs)?;
        let rhs = repr.rhs.into_diagram(Side::Rhs)?;
        let rule =
            Self::from_parts(
                repr.name,
                repr.description,
                lhs,
                rhs,
                repr.free_variables,
                repr.boundary_order,
            )?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ diagram, phase::Phase, rewrite::CancelToken };

    // Z(a) with an H-box leg  =>  X(1/8 - a) behind Hadamard wires
    fn rule() -> Rule {
        let (mut lhs, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( PhaseExpr::var("a") ),
                h = h ( ),
                o = boundary ( ),
            },
            wires: { i -- a -- o, a -- h },
        ).unwrap();
        lhs.set_unfusable(1, true).unwrap();
        let (mut rhs, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = x ( -PhaseExpr::var("a") + Phase::pi4() ),
                o = boundary ( ),
            },
            h_wires: { i -- a -- o },
        ).unwrap();
        rhs.remove_vertex(1).unwrap();
        let a = rhs.add_vertex(Vertex::x(-PhaseExpr::var("a") + Phase::pi4()).at(1.0, 0.5));
        rhs.add_edge(0, a, EdgeKind::Hadamard).unwrap();
        rhs.add_edge(a, 2, EdgeKind::Hadamard).unwrap();
        Rule::new("odd", lhs, rhs).unwrap().with_description("for testing")
    }

    #[test]
    fn round_trip() {
        let rule = rule();
        let json = rule.to_json().unwrap();
        let back = Rule::from_json(&json).unwrap();
        assert_eq!(back.name(), "odd");
        assert_eq!(back.description(), "for testing");
        assert_eq!(back.boundary_order(), rule.boundary_order());
        assert_eq!(back.free_variables(), rule.free_variables());
        assert_eq!(back.rhs().next_id(), 4);
        assert!(!back.rhs().has_vertex(1));
        let a = back.rhs().vertex(3).unwrap();
        assert_eq!(a.pos, Position::new(1.0, 0.5));
        assert_eq!(a.phase, "-a + 1/8".parse::<PhaseExpr>().unwrap());
        assert!(back.lhs().vertex(1).unwrap().unfusable);
        assert_eq!(back.lhs().edge_kind(1, 2), Some(EdgeKind::Plain));
        assert_eq!(back.to_json_pretty().unwrap(), rule.to_json_pretty().unwrap());
    }

    #[test]
    fn same_matches_after_reload() {
        let rule = rule();
        let back = Rule::from_json(&rule.to_json_pretty().unwrap()).unwrap();
        let (target, _) = diagram!(
            nodes: {
                i = boundary ( ),
                s = z ( Phase::new(3, 8) ),
                h = h ( ),
                o = boundary ( ),
            },
            wires: { i -- s -- o, s -- h },
        ).unwrap();
        let cancel = CancelToken::new();
        let before = rule.find_matches(&target, None, &cancel).unwrap();
        let after = back.find_matches(&target, None, &cancel).unwrap();
        assert_eq!(before, after);
        let matches = before.into_matches().unwrap();
        assert_eq!(matches.len(), 2);
        for m in matches.iter() {
            let x = rule.apply(&target, m).unwrap();
            let y = back.apply(&target, m).unwrap();
            assert!(x.is_isomorphic(&y));
            assert_eq!(
                x.vertices().map(|(id, _)| id).collect::<Vec<_>>(),
                y.vertices().map(|(id, _)| id).collect::<Vec<_>>(),
            );
        }
    }

    #[test]
    fn bad_phase() {
        for bad in ["-a*a + 1/8", "-a + 9223372036854775807 + 1"] {
            let json = rule().to_json().unwrap().replace("-a + 1/8", bad);
            assert!(matches!(
                Rule::from_json(&json),
                Err(FormatError::Validation(
                    ValidationError::InvalidPhaseExpression(Side::Rhs, 3, _)
                )),
            ));
        }
    }

    #[test]
    fn bad_ids() {
        let json = r#"{
            "name": "bad",
            "lhs": {
                "vertices": [
                    { "id": 0, "kind": "Boundary" },
                    { "id": 0, "kind": "Z" }
                ],
                "edges": []
            },
            "rhs": { "vertices": [], "edges": [] },
            "boundary_order": [],
            "free_variables": []
        }"#;
        assert!(matches!(
            Rule::from_json(json),
            Err(FormatError::RepeatedId(Side::Lhs, 0)),
        ));

        let json = r#"{
            "name": "bad",
            "lhs": {
                "vertices": [ { "id": 0, "kind": "Z" } ],
                "edges": [ { "a": 0, "b": 5, "kind": "Plain" } ]
            },
            "rhs": { "vertices": [], "edges": [] },
            "boundary_order": [],
            "free_variables": []
        }"#;
        assert!(matches!(
            Rule::from_json(json),
            Err(FormatError::UnknownId(Side::Lhs, 5)),
        ));
    }

    #[test]
    fn huge_ids() {
        let doc = |vertex_id: &str, next_id: &str| {
            format!(r#"{{
                "name": "huge",
                "lhs": {{
                    "next_id": {next_id},
                    "vertices": [ {{ "id": {vertex_id}, "kind": "Z" }} ],
                    "edges": []
                }},
                "rhs": {{ "vertices": [], "edges": [] }},
                "boundary_order": [],
                "free_variables": []
            }}"#)
        };
        assert!(matches!(
            Rule::from_json(&doc("18446744073709551615", "0")),
            Err(FormatError::IdOutOfRange(Side::Lhs, usize::MAX)),
        ));
        assert!(matches!(
            Rule::from_json(&doc("1000000000000", "0")),
            Err(FormatError::IdOutOfRange(Side::Lhs, 1000000000000)),
        ));
        assert!(matches!(
            Rule::from_json(&doc("0", "1000000000000")),
            Err(FormatError::IdOutOfRange(Side::Lhs, 1000000000000)),
        ));
        let rule = Rule::from_json(&doc(&MAX_ID.to_string(), "0")).unwrap();
        assert_eq!(rule.lhs().next_id(), MAX_ID + 1);
    }

    #[test]
    fn minimal_document() {
        let json = r#"{
            "name": "kill",
            "lhs": {
                "vertices": [ { "id": 4, "kind": "X", "phase": "pi" } ],
                "edges": []
            },
            "rhs": { "vertices": [], "edges": [] },
            "boundary_order": [],
            "free_variables": []
        }"#;
        let rule = Rule::from_json(json).unwrap();
        assert_eq!(rule.description(), "");
        assert_eq!(rule.lhs().next_id(), 5);
        assert_eq!(
            rule.lhs().vertex(4).and_then(|v| v.phase.as_phase()),
            Some(Phase::pi()),
        );
    }

    #[test]
    fn syntax_error() {
        assert!(matches!(Rule::from_json("{ \"name\": "), Err(FormatError::Json(_))));
    }

    #[test]
    fn validated_on_load() {
        let json = rule().to_json().unwrap().replace("\"free_variables\":[\"a\"]", "\"free_variables\":[]");
        assert!(matches!(
            Rule::from_json(&json),
            Err(FormatError::Validation(ValidationError::FreeVariableMismatch { .. })),
        ));
    }
}
