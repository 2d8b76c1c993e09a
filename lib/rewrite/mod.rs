//! Locating and applying custom rewrite rules.
//!
//! Rewriting proceeds in three stages:
//! - [`Matcher`] enumerates the [`Embedding`]s of a rule's left-hand side into
//! a target diagram;
//! - [`solve`] turns each embedding into an [`Assignment`] of the rule's free
//! variables, or rejects it if the phases of the target can't be reproduced;
//! - [`apply`] replaces the matched region with an instance of the rule's
//! right-hand side, producing a new diagram.
//!
//! The first two are bundled by [`find_matches`], which is usually all that's
//! needed:
//! ```
//! use zx_rewrite::{
//!     diagram,
//!     expr::PhaseExpr,
//!     phase::Phase,
//!     rewrite::{ self, CancelToken },
//!     rule::Rule,
//! };
//!
//! // a single-qubit phase gate with a symbolic angle ...
//! let (lhs, _) = diagram!(
//!     nodes: {
//!         i = boundary ( ),
//!         a = z ( PhaseExpr::var("a") ),
//!         o = boundary ( ),
//!     },
//!     wires: { i -- a -- o },
//! ).unwrap();
//! // ... becomes its color-flipped version
//! let (rhs, _) = diagram!(
//!     nodes: {
//!         i = boundary ( ),
//!         a = x ( PhaseExpr::var("a") ),
//!         o = boundary ( ),
//!     },
//!     h_wires: { i -- a -- o },
//! ).unwrap();
//! let rule = Rule::new("flip", lhs, rhs).unwrap();
//!
//! let (target, ids) = diagram!(
//!     nodes: {
//!         i = boundary ( ),
//!         s = z ( Phase::pi4() ),
//!         o = boundary ( ),
//!     },
//!     wires: { i -- s -- o },
//! ).unwrap();
//! let outcome =
//!     rewrite::find_matches(&rule, &target, None, &CancelToken::new()).unwrap();
//! let matches = outcome.into_matches().unwrap();
//! assert_eq!(matches.len(), 2); // the wire can be read in either direction
//! let new = rewrite::apply(&rule, &target, &matches[0]).unwrap();
//! assert_eq!(new.count_x(), 1);
//! assert!(!new.has_vertex(ids["s"]));
//! ```

use std::{
    collections::{ BTreeMap, BTreeSet },
    sync::{ Arc, atomic::{ AtomicBool, Ordering } },
};
use thiserror::Error;
use crate::{
    expr::PhaseExpr,
    graph::{ Diagram, GraphError, VertexId },
    rule::{ Rule, ValidationError },
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("malformed rule: {0}")]
    MalformedRule(#[from] ValidationError),

    #[error("anchor vertex {0} does not exist in the target diagram")]
    UnknownVertex(VertexId),
}
pub type MatchResult<T> = Result<T, MatchError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("boundary order has {order} entries, but the left- and right-hand sides have {lhs} and {rhs} boundaries")]
    BoundaryArityMismatch { order: usize, lhs: usize, rhs: usize },

    #[error("variable '{0}' has no concrete value")]
    UnresolvedSymbolicPhase(String),

    #[error("match does not embed left-hand side vertex {0} in the target diagram")]
    InvalidMatch(VertexId),

    #[error("replacement edge {0} -- {1} already exists in the target diagram")]
    EdgeConflict(VertexId, VertexId),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}
pub type ApplyResult<T> = Result<T, ApplyError>;

pub(crate) mod matcher;
pub use matcher::*;

pub(crate) mod solver;
pub use solver::*;

pub(crate) mod apply;
pub use apply::*;

/// An injective, structure-preserving map from the vertices of a pattern
/// diagram to those of a target diagram.
///
/// Also holds the induced correspondence between pattern and target edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Embedding {
    vertices: BTreeMap<VertexId, VertexId>,
    edges: BTreeMap<(VertexId, VertexId), (VertexId, VertexId)>,
}

impl Embedding {
    /// Create a new embedding from `(pattern, target)` vertex pairs.
    ///
    /// Every edge of `pattern` with both endpoints in the map is recorded in
    /// the edge correspondence.
    pub fn new<I>(pattern: &Diagram, pairs: I) -> Self
    where I: IntoIterator<Item = (VertexId, VertexId)>
    {
        let vertices: BTreeMap<VertexId, VertexId> =
            pairs.into_iter().collect();
        let edges: BTreeMap<(VertexId, VertexId), (VertexId, VertexId)> =
            pattern.edges()
            .filter_map(|(a, b, _)| {
                let ta = vertices.get(&a)?;
                let tb = vertices.get(&b)?;
                Some(((a, b), (*ta, *tb)))
            })
            .collect();
        Self { vertices, edges }
    }

    /// Return the image of a pattern vertex.
    pub fn get(&self, id: VertexId) -> Option<VertexId> {
        self.vertices.get(&id).copied()
    }

    /// Return the number of mapped vertices.
    pub fn len(&self) -> usize { self.vertices.len() }

    /// Return `true` if no vertices are mapped.
    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }

    /// Return an iterator over all `(pattern, target)` vertex pairs in order of
    /// increasing pattern ID.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertices.iter().map(|(p, t)| (*p, *t))
    }

    /// Return `true` if `id` is the image of a pattern vertex.
    pub fn contains_target(&self, id: VertexId) -> bool {
        self.vertices.values().any(|t| *t == id)
    }

    /// Return the map from pattern edges to target edges.
    ///
    /// Pattern edges are keyed with the smaller ID first; each target edge
    /// lists the images of the key's endpoints in the same order.
    pub fn edge_map(&self) -> &BTreeMap<(VertexId, VertexId), (VertexId, VertexId)> {
        &self.edges
    }
}

/// Values of a rule's free variables.
///
/// Each variable maps to a [`PhaseExpr`], which is concrete unless the
/// variable is not fully constrained by a match. Residual symbolic values are
/// expressed in terms of the other free variables, e.g. `a = 3/4 - b`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    values: BTreeMap<String, PhaseExpr>,
}

impl FromIterator<(String, PhaseExpr)> for Assignment {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = (String, PhaseExpr)>
    {
        Self { values: iter.into_iter().collect() }
    }
}

impl Assignment {
    /// Create a new, empty assignment.
    pub fn new() -> Self { Self::default() }

    /// Return the value of a variable.
    pub fn get(&self, name: &str) -> Option<&PhaseExpr> {
        self.values.get(name)
    }

    /// Set the value of a variable, returning the old value if it existed.
    pub fn insert<S>(&mut self, name: S, value: PhaseExpr) -> Option<PhaseExpr>
    where S: Into<String>
    {
        self.values.insert(name.into(), value)
    }

    /// Return the number of variables with values.
    pub fn len(&self) -> usize { self.values.len() }

    /// Return `true` if no variable has a value.
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Return an iterator over all variables and their values, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhaseExpr)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Return the set of variables still appearing in any value.
    pub fn residual_vars(&self) -> BTreeSet<String> {
        self.values.values()
            .flat_map(|value| value.free_vars())
            .map(|name| name.to_string())
            .collect()
    }

    /// Return `true` if every value is concrete.
    pub fn is_complete(&self) -> bool {
        self.values.values().all(|value| value.is_concrete())
    }
}

/// A located occurrence of a rule's left-hand side, ready to be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    embedding: Embedding,
    assignment: Assignment,
}

impl Match {
    pub fn new(embedding: Embedding, assignment: Assignment) -> Self {
        Self { embedding, assignment }
    }

    pub fn embedding(&self) -> &Embedding { &self.embedding }

    pub fn assignment(&self) -> &Assignment { &self.assignment }
}

/// Result of a complete match search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The search ran to completion.
    Found(Vec<Match>),
    /// The search was abandoned through a [`CancelToken`].
    Cancelled,
}

impl MatchOutcome {
    /// Return `true` if `self` is `Cancelled`.
    pub fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled) }

    /// Return the matches found, if the search completed.
    pub fn matches(&self) -> Option<&[Match]> {
        match self {
            Self::Found(matches) => Some(matches.as_slice()),
            Self::Cancelled => None,
        }
    }

    /// Convert into the matches found, if the search completed.
    pub fn into_matches(self) -> Option<Vec<Match>> {
        match self {
            Self::Found(matches) => Some(matches),
            Self::Cancelled => None,
        }
    }
}

/// Shared flag to abandon a running match search from elsewhere, e.g. another
/// thread.
///
/// Clones refer to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    /// Request cancellation of every search holding this token.
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed); }

    /// Return `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

/// Find all matches of a rule's left-hand side in a diagram.
///
/// If `anchor` is given, only embeddings whose image contains every anchor
/// vertex are considered.
pub fn find_matches(
    rule: &Rule,
    diagram: &Diagram,
    anchor: Option<&[VertexId]>,
    cancel: &CancelToken,
) -> MatchResult<MatchOutcome>
{
    let mut matcher = Matcher::new(rule, diagram).cancel(cancel);
    if let Some(ids) = anchor {
        matcher = matcher.anchor(ids.iter().copied());
    }
    matcher.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ diagram, phase::Phase };

    // Z(a) -- Z(a) => Z(2a)
    fn equal_pair_rule() -> Rule {
        let (lhs, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( PhaseExpr::var("a") ),
                b = z ( PhaseExpr::var("a") ),
                o = boundary ( ),
            },
            wires: { i -- a -- b -- o },
        ).unwrap();
        let (rhs, _) = diagram!(
            nodes: {
                i = boundary ( ),
                s = z ( PhaseExpr::var("a") * 2 ),
                o = boundary ( ),
            },
            wires: { i -- s -- o },
        ).unwrap();
        Rule::new("equal pair", lhs, rhs).unwrap()
    }

    #[test]
    fn inconsistent_embedding_among_others() {
        let rule = equal_pair_rule();
        let (target, ids) = diagram!(
            nodes: {
                i = boundary ( ),
                p = z ( Phase::new(1, 4) ),
                q = z ( Phase::new(1, 2) ),
                r = z ( Phase::new(1, 2) ),
                o = boundary ( ),
            },
            wires: { i -- p -- q -- r -- o },
        ).unwrap();

        // the embedding onto p, q is rejected by the solver on its own
        let lhs = rule.lhs();
        let bad = Embedding::new(lhs, [(0, ids["i"]), (1, ids["p"]), (2, ids["q"]), (3, ids["r"])]);
        assert_eq!(solve(lhs, &target, &bad), None);
        let good = Embedding::new(lhs, [(0, ids["p"]), (1, ids["q"]), (2, ids["r"]), (3, ids["o"])]);
        assert!(solve(lhs, &target, &good).is_some());

        // ... while the search still turns up q, r in both directions
        let found =
            find_matches(&rule, &target, None, &CancelToken::new())
            .unwrap()
            .into_matches()
            .unwrap();
        assert_eq!(found.len(), 2);
        for m in found.iter() {
            let image: BTreeSet<VertexId> =
                [1, 2].into_iter().filter_map(|p| m.embedding().get(p)).collect();
            assert_eq!(image, [ids["q"], ids["r"]].into_iter().collect());
            assert_eq!(m.assignment().get("a"), Some(&PhaseExpr::from(Phase::pi())));
        }
    }

    #[test]
    fn cancelled_find_matches() {
        let rule = equal_pair_rule();
        let (target, _) = diagram!(
            nodes: {
                i = boundary ( ),
                p = z ( Phase::pi4() ),
                q = z ( Phase::pi4() ),
                r = z ( Phase::pi4() ),
                o = boundary ( ),
            },
            wires: { i -- p -- q -- r -- o },
        ).unwrap();
        let before = target.clone();
        let token = CancelToken::new();
        let outcome = find_matches(&rule, &target, None, &token).unwrap();
        assert_eq!(outcome.matches().map(|ms| ms.len()), Some(4));

        token.cancel();
        let outcome = find_matches(&rule, &target, None, &token).unwrap();
        assert_eq!(outcome, MatchOutcome::Cancelled);
        assert!(outcome.into_matches().is_none());
        assert!(target.is_isomorphic(&before));
        assert_eq!(target.next_id(), before.next_id());
    }

    #[test]
    fn assignment_residuals() {
        let asg: Assignment =
            [
                ("a".to_string(), "3/4 - b".parse::<PhaseExpr>().unwrap()),
                ("b".to_string(), PhaseExpr::var("b")),
                ("c".to_string(), PhaseExpr::from(Phase::pi())),
            ]
            .into_iter()
            .collect();
        assert_eq!(asg.len(), 3);
        assert!(!asg.is_complete());
        assert_eq!(asg.residual_vars().into_iter().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(asg.get("c").and_then(|v| v.as_phase()), Some(Phase::pi()));
        assert!(asg.get("d").is_none());
    }

    #[test]
    fn cancel_token_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn embedding_edges() {
        let (pattern, ids) = crate::diagram!(
            nodes: { i = boundary ( ), a = z ( Phase::zero() ), o = boundary ( ) },
            wires: { i -- a -- o },
        ).unwrap();
        let emb =
            Embedding::new(&pattern, [(ids["i"], 10), (ids["a"], 11), (ids["o"], 12)]);
        assert_eq!(emb.len(), 3);
        assert_eq!(emb.get(ids["a"]), Some(11));
        assert!(emb.contains_target(12));
        assert!(!emb.contains_target(13));
        assert_eq!(emb.edge_map().len(), 2);
        assert_eq!(emb.edge_map().get(&(ids["i"], ids["a"])), Some(&(10, 11)));
    }
}
