//! Custom rewrite rules.
//!
//! A [`Rule`] pairs a left-hand side pattern with a right-hand side
//! replacement. Boundary vertices on each side stand for the wires connecting
//! the rewritten region to the rest of a diagram, and are paired up by the
//! rule's boundary order. Phases may be [symbolic][crate::expr::PhaseExpr], in
//! which case every variable on the right must also appear on the left.
//!
//! Rules are validated on construction, so a `Rule` value is always
//! structurally sound.

use std::collections::BTreeSet;
use crate::{
    graph::{ Diagram, VertexId },
    rewrite::{
        self,
        ApplyResult,
        CancelToken,
        Match,
        MatchOutcome,
        MatchResult,
        Matcher,
    },
};

pub(crate) mod validate;
pub use validate::*;

pub(crate) mod format;
pub use format::*;

/// A named rewrite rule `lhs => rhs`.
#[derive(Clone, Debug)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) lhs: Diagram,
    pub(crate) rhs: Diagram,
    pub(crate) free_variables: BTreeSet<String>,
    pub(crate) boundary_order: Vec<(VertexId, VertexId)>,
}

impl Rule {
    /// Create a new rule, pairing the boundaries of both sides in order of
    /// increasing ID.
    pub fn new<S>(name: S, lhs: Diagram, rhs: Diagram) -> ValidationResult<Self>
    where S: Into<String>
    {
        let boundary_order: Vec<(VertexId, VertexId)> =
            lhs.boundaries().into_iter()
            .zip(rhs.boundaries())
            .collect();
        Self::with_boundary_order(name, lhs, rhs, boundary_order)
    }

    /// Create a new rule with an explicit list of `(lhs, rhs)` boundary pairs.
    pub fn with_boundary_order<S>(
        name: S,
        lhs: Diagram,
        rhs: Diagram,
        boundary_order: Vec<(VertexId, VertexId)>,
    ) -> ValidationResult<Self>
    where S: Into<String>
    {
        let free_variables: BTreeSet<String> =
            lhs.free_vars().into_iter()
            .chain(rhs.free_vars())
            .collect();
        Self::from_parts(
            name.into(),
            String::new(),
            lhs,
            rhs,
            free_variables,
            boundary_order,
        )
    }

    /// Assemble a rule from all of its parts, checking that the declared free
    /// variables are exactly the ones used.
    pub fn from_parts(
        name: String,
        description: String,
        lhs: Diagram,
        rhs: Diagram,
        free_variables: BTreeSet<String>,
        boundary_order: Vec<(VertexId, VertexId)>,
    ) -> ValidationResult<Self>
    {
        let rule =
            Self { name, description, lhs, rhs, free_variables, boundary_order };
        validate(&rule)?;
        Ok(rule)
    }

    /// Attach a human-readable description.
    pub fn with_description<S>(mut self, description: S) -> Self
    where S: Into<String>
    {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn description(&self) -> &str { &self.description }

    /// Return the pattern.
    pub fn lhs(&self) -> &Diagram { &self.lhs }

    /// Return the replacement.
    pub fn rhs(&self) -> &Diagram { &self.rhs }

    /// Return the names of all variables appearing on either side.
    pub fn free_variables(&self) -> &BTreeSet<String> { &self.free_variables }

    /// Return the `(lhs, rhs)` boundary pairs.
    pub fn boundary_order(&self) -> &[(VertexId, VertexId)] {
        &self.boundary_order
    }

    /// Return the rule read right to left.
    ///
    /// Fails if the reversed rule is invalid, e.g. because some variable only
    /// appears in the left-hand side.
    pub fn inverse(&self) -> ValidationResult<Self> {
        let boundary_order: Vec<(VertexId, VertexId)> =
            self.boundary_order.iter().map(|(l, r)| (*r, *l)).collect();
        let inv =
            Self::from_parts(
                format!("{} (inverse)", self.name),
                self.description.clone(),
                self.rhs.clone(),
                self.lhs.clone(),
                self.free_variables.clone(),
                boundary_order,
            )?;
        Ok(inv)
    }

    /// Prepare a match search for this rule in `target`.
    pub fn matcher<'a>(&'a self, target: &'a Diagram) -> Matcher<'a> {
        Matcher::new(self, target)
    }

    /// Find all matches of this rule in `target`.
    ///
    /// See [`rewrite::find_matches`].
    pub fn find_matches(
        &self,
        target: &Diagram,
        anchor: Option<&[VertexId]>,
        cancel: &CancelToken,
    ) -> MatchResult<MatchOutcome>
    {
        rewrite::find_matches(self, target, anchor, cancel)
    }

    /// Apply this rule at a match.
    ///
    /// See [`rewrite::apply`].
    pub fn apply(&self, diagram: &Diagram, m: &Match) -> ApplyResult<Diagram> {
        rewrite::apply(self, diagram, m)
    }
}
