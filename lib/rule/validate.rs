use std::{ collections::BTreeSet, fmt };
use rustc_hash::FxHashSet;
use thiserror::Error;
use crate::{
    expr::is_valid_var_name,
    graph::{ Diagram, VertexId },
    rule::Rule,
};

/// One of the two diagrams in a [`Rule`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Lhs,
    Rhs,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lhs => write!(f, "left-hand side"),
            Self::Rhs => write!(f, "right-hand side"),
        }
    }
}

/// A structural defect that makes a rule unusable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("left-hand side has no vertices")]
    EmptyPattern,

    #[error("boundary vertex {1} in the {0} has a nonzero phase")]
    BoundaryPhase(Side, VertexId),

    #[error("boundary vertex {0} in the left-hand side is not connected to anything")]
    IsolatedBoundary(VertexId),

    #[error("boundary vertex {0} in the left-hand side is marked unfusable")]
    InvalidUnfusableBoundary(VertexId),

    #[error("invalid phase expression for vertex {1} in the {0}: {2}")]
    InvalidPhaseExpression(Side, VertexId, String),

    #[error("boundary order has {order} entries, but the left- and right-hand sides have {lhs} and {rhs} boundaries")]
    BoundaryArityMismatch { order: usize, lhs: usize, rhs: usize },

    #[error("boundary order refers to vertex {1}, which is not a boundary of the {0} or is used twice")]
    BoundaryOrder(Side, VertexId),

    #[error("variable '{0}' in the right-hand side does not appear in the left-hand side")]
    UnboundVariable(String),

    #[error("declared free variables {declared:?} differ from the ones used {found:?}")]
    FreeVariableMismatch { declared: Vec<String>, found: Vec<String> },
}
pub type ValidationResult<T> = Result<T, ValidationError>;

// boundaries carry no phase and every variable has an acceptable name
fn check_diagram(side: Side, dg: &Diagram) -> ValidationResult<()> {
    for (id, v) in dg.vertices() {
        if v.is_boundary() && !v.phase.is_zero() {
            return Err(ValidationError::BoundaryPhase(side, id));
        }
        if let Some(name) = v.phase.free_vars().find(|name| !is_valid_var_name(name)) {
            return Err(ValidationError::InvalidPhaseExpression(
                side, id, format!("'{}' is not a valid variable name", name)));
        }
    }
    Ok(())
}

/// Check that a diagram can be used as the pattern of a match search.
pub(crate) fn check_pattern(lhs: &Diagram) -> ValidationResult<()> {
    check_diagram(Side::Lhs, lhs)?;
    if lhs.count_vertices() == 0 {
        return Err(ValidationError::EmptyPattern);
    }
    for (id, v) in lhs.vertices() {
        if !v.is_boundary() { continue; }
        if v.unfusable {
            return Err(ValidationError::InvalidUnfusableBoundary(id));
        }
        if lhs.degree(id).is_ok_and(|deg| deg == 0) {
            return Err(ValidationError::IsolatedBoundary(id));
        }
    }
    Ok(())
}

/// Check the structural integrity of a rule.
///
/// Rules built through [`Rule`]'s constructors have already passed this check.
pub fn validate(rule: &Rule) -> ValidationResult<()> {
    let lhs = rule.lhs();
    let rhs = rule.rhs();
    check_pattern(lhs)?;
    check_diagram(Side::Rhs, rhs)?;

    let order = rule.boundary_order();
    let n_lhs = lhs.count_boundaries();
    let n_rhs = rhs.count_boundaries();
    (order.len() == n_lhs && order.len() == n_rhs).then_some(())
        .ok_or(ValidationError::BoundaryArityMismatch {
            order: order.len(),
            lhs: n_lhs,
            rhs: n_rhs,
        })?;
    let mut seen_lhs: FxHashSet<VertexId> = FxHashSet::default();
    let mut seen_rhs: FxHashSet<VertexId> = FxHashSet::default();
    for &(l, r) in order.iter() {
        if !lhs.vertex(l).is_some_and(|v| v.is_boundary()) || !seen_lhs.insert(l) {
            return Err(ValidationError::BoundaryOrder(Side::Lhs, l));
        }
        if !rhs.vertex(r).is_some_and(|v| v.is_boundary()) || !seen_rhs.insert(r) {
            return Err(ValidationError::BoundaryOrder(Side::Rhs, r));
        }
    }

    let lhs_vars = lhs.free_vars();
    let rhs_vars = rhs.free_vars();
    if let Some(name) = rhs_vars.difference(&lhs_vars).next() {
        return Err(ValidationError::UnboundVariable(name.clone()));
    }
    let found: BTreeSet<String> = lhs_vars.union(&rhs_vars).cloned().collect();
    if &found != rule.free_variables() {
        return Err(ValidationError::FreeVariableMismatch {
            declared: rule.free_variables().iter().cloned().collect(),
            found: found.into_iter().collect(),
        });
    }
    Ok(())
}
