//! Gaussian elimination over the rationals for symbolic phase constraints.
//!
//! Every matched pattern vertex with a symbolic phase contributes one equation
//! `Σ cᵢ·xᵢ + k = t`, where `t` is the phase of its image. The system is solved
//! exactly; since phases are only defined modulo a full turn, an equation that
//! reduces to `0 = n` for a whole number `n` is satisfied.
//!
//! Dividing `c·x = s` by `c = p/q` picks one of the `|p|` values of `x` modulo a
//! turn, `(s + n)/c` for `n` in `0..|p|`. Each of them is tried in turn against
//! the rest of the system before the equations are declared inconsistent.

use std::collections::BTreeSet;
use num_rational::Rational64 as R64;
use num_traits::{ CheckedAdd, CheckedSub, One, Signed, Zero };
use crate::{
    expr::{ Linear, PhaseExpr },
    graph::Diagram,
    log,
    phase::is_whole,
    rewrite::{ Assignment, Embedding },
};

// Σ cᵢ·xᵢ = rhs, where the right-hand side may carry symbols from the target
#[derive(Clone, Debug)]
struct Row {
    lhs: Linear,
    rhs: Linear,
}

impl Row {
    fn coeff(&self, var: &str) -> R64 {
        self.lhs.terms.get(var).copied().unwrap_or_else(R64::zero)
    }

    fn scale(&mut self, k: R64) -> Option<()> {
        self.lhs.try_scale(k)?;
        self.rhs.try_scale(k)
    }

    // self -= k * other
    fn eliminate(&mut self, other: &Row, k: R64) -> Option<()> {
        self.lhs.try_add_scaled(&other.lhs, -k)?;
        self.rhs.try_add_scaled(&other.rhs, -k)
    }

    fn is_satisfied(&self) -> bool {
        self.rhs.is_constant() && is_whole(self.rhs.constant)
    }
}

// partially reduced system; `pivots` holds the row solved for each variable
#[derive(Clone, Debug)]
struct System {
    rows: Vec<Row>,
    pivots: Vec<(String, usize)>,
}

impl System {
    fn is_pivot(&self, r: usize) -> bool {
        self.pivots.iter().any(|(_, k)| *k == r)
    }

    // solve row `r` for `var` after shifting its right-hand side by `n` whole
    // turns, and clear `var` from every other row
    fn pivot(&mut self, var: &str, r: usize, n: i64) -> Option<()> {
        let c = self.rows[r].coeff(var);
        let row = &mut self.rows[r];
        row.rhs.constant = row.rhs.constant.checked_add(&R64::from_integer(n))?;
        row.scale(c.recip())?;
        let pivot_row = self.rows[r].clone();
        for (k, row) in self.rows.iter_mut().enumerate() {
            if k == r { continue; }
            let ck = row.coeff(var);
            if !ck.is_zero() { row.eliminate(&pivot_row, ck)?; }
        }
        self.pivots.push((var.to_string(), r));
        Some(())
    }

    // reduced row echelon form in the remaining `vars`, preferring unit pivots;
    // `None` if every choice of solutions leaves a contradiction
    fn reduce(self, vars: &[&str]) -> Option<Self> {
        let Some((var, rest)) = vars.split_first() else {
            let unsatisfied =
                self.rows.iter().enumerate()
                .filter(|(k, row)| !self.is_pivot(*k) && !row.is_satisfied())
                .count();
            if unsatisfied > 0 {
                log::trace!(unsatisfied, "inconsistent phase equations");
                return None;
            }
            return Some(self);
        };
        let candidates: Vec<usize> =
            (0..self.rows.len())
            .filter(|k| !self.is_pivot(*k) && !self.rows[*k].coeff(var).is_zero())
            .collect();
        let Some(&r) =
            candidates.iter()
            .find(|k| self.rows[**k].coeff(var).abs().is_one())
            .or_else(|| candidates.first())
        else { return self.reduce(rest); };
        // the choice of solution only matters if `var` occurs elsewhere
        let shared =
            self.rows.iter().enumerate()
            .any(|(k, row)| k != r && !row.coeff(var).is_zero());
        let solutions =
            if shared { self.rows[r].coeff(var).numer().checked_abs()? } else { 1 };
        (0..solutions).find_map(|n| {
            let mut branch = self.clone();
            branch.pivot(var, r, n)?;
            branch.reduce(rest)
        })
    }
}

/// Find values for the free variables of `pattern` under which the phases of
/// all matched pattern vertices equal those of their images in `target`.
///
/// Returns `None` if there are none. Variables that the equations leave
/// underdetermined keep symbolic values: pivot variables are expressed in terms
/// of the remaining free ones, which map to themselves. Systems whose exact
/// elimination would overflow are treated as having no solution.
///
/// ```
/// use zx_rewrite::{ diagram, expr::PhaseExpr, phase::Phase, rewrite::* };
///
/// let (pattern, p) = diagram!(
///     nodes: { a = z ( "a + b".parse::<PhaseExpr>().unwrap() ) },
/// ).unwrap();
/// let (target, t) = diagram!(
///     nodes: { a = z ( Phase::new(3, 4) ) },
/// ).unwrap();
/// let emb = Embedding::new(&pattern, [(p["a"], t["a"])]);
/// let asg = solve(&pattern, &target, &emb).unwrap();
/// assert_eq!(asg.get("a"), Some(&"3/4 - b".parse::<PhaseExpr>().unwrap()));
/// assert_eq!(asg.get("b"), Some(&PhaseExpr::var("b")));
/// ```
pub fn solve(pattern: &Diagram, target: &Diagram, embedding: &Embedding)
    -> Option<Assignment>
{
    let mut rows: Vec<Row> = Vec::new();
    for (p, t) in embedding.iter() {
        let Some(pv) = pattern.vertex(p) else { continue; };
        if pv.is_boundary() || pv.phase.is_concrete() { continue; }
        let tv = target.vertex(t)?;
        let mut lhs = Linear::from(&pv.phase);
        let mut rhs = Linear::from(&tv.phase);
        rhs.constant = rhs.constant.checked_sub(&lhs.constant)?;
        lhs.constant = R64::zero();
        rows.push(Row { lhs, rhs });
    }
    let vars: BTreeSet<String> =
        pattern.vertices()
        .flat_map(|(_, v)| v.phase.free_vars())
        .map(|name| name.to_string())
        .collect();
    let var_names: Vec<&str> = vars.iter().map(|name| name.as_str()).collect();

    let System { rows, pivots } =
        System { rows, pivots: Vec::new() }.reduce(&var_names)?;

    let mut assignment = Assignment::new();
    for (var, r) in pivots.iter() {
        let Row { lhs, rhs } = &rows[*r];
        let mut value = rhs.clone();
        for (name, c) in lhs.terms.iter().filter(|(name, _)| *name != var) {
            value.try_add_term(name, -*c)?;
        }
        assignment.insert(var.as_str(), PhaseExpr::from(value));
    }
    for var in vars.iter() {
        if assignment.get(var).is_none() {
            assignment.insert(var.as_str(), PhaseExpr::var(var.as_str()));
        }
    }
    Some(assignment)
}
