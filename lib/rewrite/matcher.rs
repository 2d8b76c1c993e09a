use std::{ cmp::Reverse, collections::BTreeSet };
use itertools::Itertools;
use num_rational::Rational64 as R64;
use num_traits::Signed;
use rustc_hash::{ FxHashMap, FxHashSet };
use crate::{
    graph::{ Diagram, EdgeKind, VertexId },
    log,
    phase::is_whole,
    rewrite::{
        CancelToken,
        Embedding,
        Match,
        MatchError,
        MatchOutcome,
        MatchResult,
        apply::is_applicable,
        solve,
    },
    rule::{ self, Rule },
};

/// Builder-style driver for a match search.
///
/// Created from a [`Rule`] (or a bare pattern diagram), configured with
/// optional anchor and selection sets and a [`CancelToken`], then consumed by
/// [`run`][Self::run] or one of the lazy iterators.
///
/// Left-hand side vertices are placed in order of decreasing degree, with ties
/// broken by increasing ID, and embeddings are produced in the order they are
/// discovered. A pattern vertex may only be placed on a target vertex that
/// - has the same kind, unless the pattern vertex is a boundary;
/// - has an equal phase, if the pattern phase is concrete, or a concrete phase
///   consistent with the variables already fixed in the current attempt, if it
///   is symbolic;
/// - has the same degree, unless the pattern vertex is a boundary (any degree)
///   or a fusable spider or H-box with a plain wire to a boundary of degree 1
///   (at least the same degree, since the extra legs can be unfused onto that
///   wire);
/// - is joined to the images of the already-placed pattern neighbors by edges
///   of the same kinds.
///
/// When searching for a rule, matches whose replacement would add an edge
/// between two vertices that are already joined are left out.
#[derive(Clone, Debug)]
pub struct Matcher<'a> {
    rule: Option<&'a Rule>,
    pattern: &'a Diagram,
    target: &'a Diagram,
    checked: bool,
    anchor: Vec<VertexId>,
    within: Option<FxHashSet<VertexId>>,
    cancel: Option<CancelToken>,
}

impl<'a> Matcher<'a> {
    /// Prepare a search for a rule's left-hand side.
    pub fn new(rule: &'a Rule, target: &'a Diagram) -> Self {
        Self {
            rule: Some(rule),
            pattern: rule.lhs(),
            target,
            checked: true,
            anchor: Vec::new(),
            within: None,
            cancel: None,
        }
    }

    /// Prepare a search for an arbitrary pattern diagram.
    ///
    /// The pattern is checked for well-formedness when the search starts.
    pub fn pattern(pattern: &'a Diagram, target: &'a Diagram) -> Self {
        Self {
            rule: None,
            pattern,
            target,
            checked: false,
            anchor: Vec::new(),
            within: None,
            cancel: None,
        }
    }

    /// Only keep embeddings whose image contains every vertex in `ids`.
    pub fn anchor<I>(mut self, ids: I) -> Self
    where I: IntoIterator<Item = VertexId>
    {
        for id in ids.into_iter() {
            if !self.anchor.contains(&id) { self.anchor.push(id); }
        }
        self
    }

    /// Only place non-boundary pattern vertices on vertices in `ids`.
    pub fn within<I>(mut self, ids: I) -> Self
    where I: IntoIterator<Item = VertexId>
    {
        self.within = Some(ids.into_iter().collect());
        self
    }

    /// Check `token` before every step of the search.
    pub fn cancel(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    /// Start the search, returning a lazy iterator over raw embeddings.
    ///
    /// Fails if an anchor vertex does not exist in the target or if the
    /// pattern is malformed.
    pub fn embeddings(self) -> MatchResult<Embeddings<'a>> {
        if !self.checked {
            rule::check_pattern(self.pattern)?;
        }
        if let Some(id) =
            self.anchor.iter().find(|id| !self.target.has_vertex(**id))
        {
            return Err(MatchError::UnknownVertex(*id));
        }
        Ok(Embeddings::new(
            self.pattern,
            self.target,
            self.anchor,
            self.within,
            self.cancel,
            false,
        ))
    }

    /// Start the search, returning a lazy iterator over solved matches.
    pub fn matches(self) -> MatchResult<Matches<'a>> {
        let rule = self.rule;
        let pattern = self.pattern;
        let target = self.target;
        let search = self.embeddings()?;
        Ok(Matches { rule, pattern, target, search })
    }

    /// Run the search to completion.
    pub fn run(self) -> MatchResult<MatchOutcome> {
        let mut matches = self.matches()?;
        let found: Vec<Match> = matches.by_ref().collect();
        if matches.is_cancelled() {
            log::debug!("match search cancelled");
            Ok(MatchOutcome::Cancelled)
        } else {
            log::debug!(matches = found.len(), "match search finished");
            Ok(MatchOutcome::Found(found))
        }
    }
}

/// Lazy iterator over solved matches, created by [`Matcher::matches`].
///
/// Embeddings for which the target phases can't be reproduced are skipped, as
/// are those the rule can't be applied to.
pub struct Matches<'a> {
    rule: Option<&'a Rule>,
    pattern: &'a Diagram,
    target: &'a Diagram,
    search: Embeddings<'a>,
}

impl<'a> Matches<'a> {
    /// Return `true` if iteration stopped because of a [`CancelToken`].
    pub fn is_cancelled(&self) -> bool { self.search.is_cancelled() }
}

impl<'a> Iterator for Matches<'a> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let embedding = self.search.next()?;
            let Some(assignment) = solve(self.pattern, self.target, &embedding)
            else {
                log::trace!(?embedding, "inconsistent phases; embedding rejected");
                continue;
            };
            let m = Match::new(embedding, assignment);
            if self.rule.is_some_and(|rule| !is_applicable(rule, self.target, &m)) {
                log::trace!(
                    embedding = ?m.embedding(),
                    "replacement duplicates an edge; match rejected"
                );
                continue;
            }
            return Some(m);
        }
    }
}

impl<'a> std::iter::FusedIterator for Matches<'a> { }

// per-pattern-vertex data fixed for the whole search
#[derive(Copy, Clone, Debug)]
struct PatternInfo {
    degree: usize,
    absorbing: bool,
    boundary: bool,
}

#[derive(Clone, Debug)]
struct Frame {
    candidates: Vec<VertexId>,
    next: usize,
    chosen: Option<(VertexId, Option<String>)>,
}

impl Frame {
    fn new(candidates: Vec<VertexId>) -> Self {
        Self { candidates, next: 0, chosen: None }
    }
}

/// Lazy iterator over the embeddings of a pattern in a target diagram,
/// created by [`Matcher::embeddings`].
///
/// The search state is held on an explicit stack of frames, one per placed
/// pattern vertex, so that it can be suspended after each embedding and
/// abandoned between any two steps.
pub struct Embeddings<'a> {
    pattern: &'a Diagram,
    target: &'a Diagram,
    order: Vec<VertexId>,
    info: FxHashMap<VertexId, PatternInfo>,
    anchor: Vec<VertexId>,
    within: Option<FxHashSet<VertexId>>,
    cancel: Option<CancelToken>,
    // require an isomorphism of labeled graphs
    strict: bool,
    p2t: FxHashMap<VertexId, VertexId>,
    used: FxHashSet<VertexId>,
    // single-variable phases fix their variable up to whole turns
    pins: FxHashMap<String, R64>,
    stack: Vec<Frame>,
    started: bool,
    cancelled: bool,
}

impl<'a> Embeddings<'a> {
    fn new(
        pattern: &'a Diagram,
        target: &'a Diagram,
        anchor: Vec<VertexId>,
        within: Option<FxHashSet<VertexId>>,
        cancel: Option<CancelToken>,
        strict: bool,
    ) -> Self
    {
        let info: FxHashMap<VertexId, PatternInfo> =
            pattern.vertices()
            .map(|(id, v)| {
                let degree = pattern.degree(id).unwrap_or(0);
                let absorbing =
                    (v.is_spider() || v.is_h()) && !v.unfusable
                    && pattern.neighbors(id).into_iter().flatten()
                        .any(|(nb, kind)| is_absorbing(pattern, nb, kind));
                let info = PatternInfo { degree, absorbing, boundary: v.is_boundary() };
                (id, info)
            })
            .collect();
        let order: Vec<VertexId> =
            info.keys().copied()
            .sorted_by_key(|id| (Reverse(info[id].degree), *id))
            .collect();
        log::trace!(?order, "pattern placement order");
        Self {
            pattern,
            target,
            order,
            info,
            anchor,
            within,
            cancel,
            strict,
            p2t: FxHashMap::default(),
            used: FxHashSet::default(),
            pins: FxHashMap::default(),
            stack: Vec::new(),
            started: false,
            cancelled: false,
        }
    }

    /// Return `true` if the search was abandoned because of a
    /// [`CancelToken`].
    pub fn is_cancelled(&self) -> bool { self.cancelled }

    fn candidates(&self, p: VertexId) -> Vec<VertexId> {
        let placed_nb: Option<VertexId> =
            self.pattern.neighbors(p).into_iter().flatten()
            .find_map(|(q, _)| self.p2t.get(&q).copied());
        let mut candidates: Vec<VertexId> =
            match placed_nb {
                Some(tq) => {
                    self.target.neighbors(tq).into_iter().flatten()
                        .map(|(t, _)| t)
                        .collect()
                },
                None => self.target.vertices().map(|(t, _)| t).collect(),
            };
        candidates.retain(|t| !self.used.contains(t));
        candidates.sort_unstable();
        candidates
    }

    // `None` if `p` can't be placed on `t`; otherwise any variable fixed by
    // doing so
    fn admissible(&self, p: VertexId, t: VertexId)
        -> Option<Option<(String, R64)>>
    {
        let pv = self.pattern.vertex(p)?;
        let tv = self.target.vertex(t)?;
        let info = self.info.get(&p)?;
        if self.used.contains(&t) { return None; }

        // kind
        if (self.strict || !info.boundary) && pv.kind != tv.kind {
            return None;
        }
        if !info.boundary
            && self.within.as_ref().is_some_and(|sel| !sel.contains(&t))
        {
            return None;
        }

        // degree
        let t_degree = self.target.degree(t).ok()?;
        let degree_ok =
            if self.strict || pv.unfusable {
                t_degree == info.degree
            } else if info.boundary {
                true
            } else if info.absorbing {
                t_degree >= info.degree
            } else {
                t_degree == info.degree
            };
        if !degree_ok { return None; }

        // anchors must still fit in the remaining placements
        let remaining = self.order.len() - self.p2t.len() - 1;
        let uncovered =
            self.anchor.iter()
            .filter(|a| **a != t && !self.used.contains(*a))
            .count();
        if uncovered > remaining { return None; }

        // edges to everything already placed
        for (&q, &tq) in self.p2t.iter() {
            let q_info = self.info.get(&q)?;
            let q_unfusable = self.pattern.vertex(q).is_some_and(|v| v.unfusable);
            match (self.pattern.edge_kind(p, q), self.target.edge_kind(t, tq)) {
                (Some(pk), Some(tk)) if pk == tk => { },
                (Some(_), _) => { return None; },
                (None, Some(_)) => {
                    // an extra leg may only lead out of the matched region
                    if self.strict
                        || pv.unfusable
                        || q_unfusable
                        || (!info.boundary && !q_info.boundary)
                    {
                        return None;
                    }
                },
                (None, None) => { },
            }
        }

        // phase
        if self.strict {
            return (pv.phase == tv.phase).then_some(None);
        }
        if info.boundary { return Some(None); }
        if let Some(ph) = pv.phase.as_phase() {
            return (tv.phase.as_phase() == Some(ph)).then_some(None);
        }
        let t_phase = tv.phase.as_phase()?;
        match pv.phase.as_single_var() {
            Some((name, c, k)) => {
                let rhs = (t_phase - k).turns();
                match self.pins.get(name) {
                    Some(&v) if c.is_integer() => {
                        is_whole(c * v - rhs).then_some(None)
                    },
                    Some(_) => Some(None),
                    None if c.abs() == R64::from_integer(1) => {
                        Some(Some((name.to_string(), rhs / c)))
                    },
                    None => Some(None),
                }
            },
            None => Some(None),
        }
    }

    fn place(&mut self, p: VertexId, t: VertexId, pin: Option<(String, R64)>)
        -> Option<String>
    {
        self.p2t.insert(p, t);
        self.used.insert(t);
        pin.map(|(name, value)| {
            self.pins.insert(name.clone(), value);
            name
        })
    }

    fn unplace(&mut self, p: VertexId, t: VertexId, pin: Option<String>) {
        self.p2t.remove(&p);
        self.used.remove(&t);
        if let Some(name) = pin { self.pins.remove(&name); }
    }

    fn is_triggered(&self) -> bool {
        self.cancel.as_ref().is_some_and(|token| token.is_cancelled())
    }
}

impl<'a> Iterator for Embeddings<'a> {
    type Item = Embedding;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancelled { return None; }
        if !self.started {
            self.started = true;
            let first = *self.order.first()?;
            let candidates = self.candidates(first);
            self.stack.push(Frame::new(candidates));
        }
        loop {
            if self.is_triggered() {
                self.cancelled = true;
                self.stack.clear();
                return None;
            }
            let depth = self.stack.len().checked_sub(1)?;
            let p = self.order[depth];
            if let Some((t, pin)) = self.stack[depth].chosen.take() {
                self.unplace(p, t, pin);
            }
            let k = self.stack[depth].next;
            let Some(t) = self.stack[depth].candidates.get(k).copied() else {
                self.stack.pop();
                continue;
            };
            self.stack[depth].next += 1;
            let Some(pin) = self.admissible(p, t) else { continue; };
            let pinned = self.place(p, t, pin);
            self.stack[depth].chosen = Some((t, pinned));
            if depth + 1 == self.order.len() {
                let embedding =
                    Embedding::new(
                        self.pattern,
                        self.p2t.iter().map(|(p, t)| (*p, *t)),
                    );
                return Some(embedding);
            }
            let candidates = self.candidates(self.order[depth + 1]);
            self.stack.push(Frame::new(candidates));
        }
    }
}

impl<'a> std::iter::FusedIterator for Embeddings<'a> { }

// a boundary of degree 1 on a plain wire, onto which a spider's extra legs can
// be unfused
pub(crate) fn is_absorbing(pattern: &Diagram, nb: VertexId, kind: EdgeKind)
    -> bool
{
    kind == EdgeKind::Plain
        && pattern.vertex(nb).is_some_and(|v| v.is_boundary())
        && pattern.degree(nb).is_ok_and(|deg| deg == 1)
}

impl Diagram {
    /// Return `true` if `self` and `other` are the same diagram up to a
    /// renaming of vertex IDs.
    ///
    /// Vertex kinds, phases, and edge kinds must agree exactly. Positions and
    /// unfusable flags are ignored.
    pub fn is_isomorphic(&self, other: &Diagram) -> bool {
        if self.count_vertices() != other.count_vertices()
            || self.count_edges() != other.count_edges()
        {
            return false;
        }
        let labels = |dg: &Diagram| -> BTreeSet<(usize, String)> {
            dg.vertices()
                .map(|(id, v)| {
                    let deg = dg.degree(id).unwrap_or(0);
                    (deg, format!("{:?}:{}", v.kind, v.phase))
                })
                .collect()
        };
        if labels(self) != labels(other) { return false; }
        if self.count_vertices() == 0 { return true; }
        Embeddings::new(self, other, Vec::new(), None, None, true)
            .next()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagram,
        expr::PhaseExpr,
        graph::{ GraphError, Vertex },
        phase::Phase,
        rule::ValidationError,
    };

    fn var(name: &str) -> PhaseExpr { PhaseExpr::var(name) }

    fn embeddings(pattern: &Diagram, target: &Diagram) -> Vec<Embedding> {
        Matcher::pattern(pattern, target).embeddings().unwrap().collect()
    }

    // a chain of `n` Z-spiders between two boundaries
    fn z_chain(phases: &[Phase]) -> Diagram {
        let mut dg = Diagram::new();
        let mut last = dg.add_vertex(Vertex::boundary());
        for ph in phases.iter() {
            let z = dg.add_vertex(Vertex::z(*ph));
            dg.add_edge(last, z, EdgeKind::Plain).unwrap();
            last = z;
        }
        let o = dg.add_vertex(Vertex::boundary());
        dg.add_edge(last, o, EdgeKind::Plain).unwrap();
        dg
    }

    #[test]
    fn placement_order() {
        let (pattern, ids) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( Phase::zero() ),
                b = x ( Phase::zero() ),
                o0 = boundary ( ),
                o1 = boundary ( ),
            },
            wires: { i -- a -- b -- o0, b -- o1 },
        ).unwrap();
        let target = pattern.clone();
        let search = Matcher::pattern(&pattern, &target).embeddings().unwrap();
        assert_eq!(
            search.order,
            vec![ids["b"], ids["a"], ids["i"], ids["o0"], ids["o1"]],
        );
    }

    #[test]
    fn kind_and_phase() {
        let (pattern, ids) = diagram!(
            nodes: { i = boundary ( ), a = z ( Phase::pi() ), o = boundary ( ) },
            wires: { i -- a -- o },
        ).unwrap();
        let target = z_chain(&[Phase::zero(), Phase::pi(), Phase::pi4()]);
        let found = embeddings(&pattern, &target);
        // only the middle spider, read in both directions
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|emb| emb.get(ids["a"]) == Some(2)));

        let target = z_chain(&[Phase::pi2(), Phase::pi4()]);
        assert!(embeddings(&pattern, &target).is_empty());
    }

    #[test]
    fn boundary_is_wildcard() {
        let (pattern, ids) = diagram!(
            nodes: { i = boundary ( ), a = x ( Phase::zero() ) },
            wires: { i -- a },
        ).unwrap();
        let (target, tids) = diagram!(
            nodes: { h = h ( ), b = x ( Phase::zero() ), z = z ( Phase::pi() ) },
            wires: { h -- b, z -- h },
        ).unwrap();
        let found = embeddings(&pattern, &target);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get(ids["i"]), Some(tids["h"]));
    }

    #[test]
    fn unfusable_degree() {
        let (pattern, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z_unfusable ( Phase::zero() ),
                o = boundary ( ),
            },
            wires: { i -- a -- o },
        ).unwrap();
        let (target, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( Phase::zero() ),
                o = boundary ( ),
                p = boundary ( ),
            },
            wires: { i -- a -- o, a -- p },
        ).unwrap();
        assert!(embeddings(&pattern, &target).is_empty());

        // the same spider without the flag absorbs the extra leg
        let mut fusable = pattern.clone();
        fusable.set_unfusable(1, false).unwrap();
        assert_eq!(embeddings(&fusable, &target).len(), 6);
    }

    #[test]
    fn exact_degree_without_absorbing_boundary() {
        // spider joined to its boundary by a Hadamard wire can't absorb legs
        let (pattern, _) = diagram!(
            nodes: { i = boundary ( ), a = z ( Phase::zero() ) },
            h_wires: { i -- a },
        ).unwrap();
        let (target, _) = diagram!(
            nodes: { a = z ( Phase::zero() ), b = x ( Phase::zero() ), c = x ( Phase::zero() ) },
            h_wires: { a -- b, a -- c },
        ).unwrap();
        assert!(embeddings(&pattern, &target).is_empty());
        let (target, _) = diagram!(
            nodes: { a = z ( Phase::zero() ), b = x ( Phase::zero() ) },
            h_wires: { a -- b },
        ).unwrap();
        assert_eq!(embeddings(&pattern, &target).len(), 1);
    }

    #[test]
    fn edge_kinds() {
        let (pattern, _) = diagram!(
            nodes: { a = z ( Phase::zero() ), b = z ( Phase::zero() ) },
            h_wires: { a -- b },
        ).unwrap();
        let (target, _) = diagram!(
            nodes: { a = z ( Phase::zero() ), b = z ( Phase::zero() ) },
            wires: { a -- b },
        ).unwrap();
        assert!(embeddings(&pattern, &target).is_empty());
    }

    #[test]
    fn interior_extra_edges() {
        // two fusable spiders with their own absorbing boundaries may not be
        // joined by an edge the pattern doesn't have
        let (pattern, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( Phase::zero() ),
                b = x ( Phase::zero() ),
                o = boundary ( ),
            },
            wires: { i -- a, b -- o },
        ).unwrap();
        let (target, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( Phase::zero() ),
                b = x ( Phase::zero() ),
                o = boundary ( ),
            },
            wires: { i -- a -- b -- o },
        ).unwrap();
        assert!(embeddings(&pattern, &target).is_empty());
    }

    #[test]
    fn symbolic_pins() {
        let (pattern, _) = diagram!(
            nodes: {
                i = boundary ( ),
                a = z ( var("a") ),
                b = z ( var("a") ),
                o = boundary ( ),
            },
            wires: { i -- a -- b -- o },
        ).unwrap();
        let target = z_chain(&[Phase::pi4(), Phase::pi4()]);
        assert_eq!(embeddings(&pattern, &target).len(), 2);
        let target = z_chain(&[Phase::pi4(), Phase::pi2()]);
        assert!(embeddings(&pattern, &target).is_empty());

        // a symbolic pattern phase needs a concrete target phase
        let mut target = z_chain(&[Phase::pi4(), Phase::pi4()]);
        target.vertex_mut(1).unwrap().phase = var("t");
        assert!(embeddings(&pattern, &target).is_empty());
    }

    #[test]
    fn anchors() {
        let (pattern, ids) = diagram!(
            nodes: { i = boundary ( ), a = z ( Phase::zero() ), o = boundary ( ) },
            wires: { i -- a -- o },
        ).unwrap();
        let target = z_chain(&[Phase::zero(), Phase::zero(), Phase::zero()]);
        assert_eq!(embeddings(&pattern, &target).len(), 6);
        let anchored: Vec<Embedding> =
            Matcher::pattern(&pattern, &target)
            .anchor([3])
            .embeddings().unwrap()
            .collect();
        assert_eq!(anchored.len(), 4);
        assert!(anchored.iter().all(|emb| emb.contains_target(3)));
        let anchored: Vec<Embedding> =
            Matcher::pattern(&pattern, &target)
            .anchor([1, 3])
            .embeddings().unwrap()
            .collect();
        assert_eq!(anchored.len(), 2);
        assert!(anchored.iter().all(|emb| emb.get(ids["a"]) == Some(2)));

        let res = Matcher::pattern(&pattern, &target).anchor([99]).embeddings();
        assert!(matches!(res, Err(MatchError::UnknownVertex(99))));
    }

    #[test]
    fn selection() {
        let (pattern, ids) = diagram!(
            nodes: { i = boundary ( ), a = z ( Phase::zero() ), o = boundary ( ) },
            wires: { i -- a -- o },
        ).unwrap();
        let target = z_chain(&[Phase::zero(), Phase::zero(), Phase::zero()]);
        let found: Vec<Embedding> =
            Matcher::pattern(&pattern, &target)
            .within([3])
            .embeddings().unwrap()
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|emb| emb.get(ids["a"]) == Some(3)));
    }

    #[test]
    fn malformed_pattern() {
        let target = z_chain(&[Phase::zero()]);
        let empty = Diagram::new();
        let res = Matcher::pattern(&empty, &target).embeddings();
        assert!(matches!(
            res, Err(MatchError::MalformedRule(ValidationError::EmptyPattern))));
    }

    #[test]
    fn cancelled_search() {
        let (pattern, _) = diagram!(
            nodes: { i = boundary ( ), a = z ( Phase::zero() ), o = boundary ( ) },
            wires: { i -- a -- o },
        ).unwrap();
        let target = z_chain(&[Phase::zero(); 8]);
        let before = target.clone();
        let token = CancelToken::new();
        let mut search =
            Matcher::pattern(&pattern, &target)
            .cancel(&token)
            .embeddings().unwrap();
        assert!(search.next().is_some());
        token.cancel();
        assert!(search.next().is_none());
        assert!(search.is_cancelled());
        assert!(target.is_isomorphic(&before));
        assert_eq!(target.count_edges(), before.count_edges());
    }

    #[test]
    fn isomorphism() {
        let a = z_chain(&[Phase::pi(), Phase::pi4()]);
        let b = z_chain(&[Phase::pi4(), Phase::pi()]);
        assert!(a.is_isomorphic(&b));
        let c = z_chain(&[Phase::pi(), Phase::pi2()]);
        assert!(!a.is_isomorphic(&c));
        let mut d = b.clone();
        d.remove_edge(0, 1).unwrap();
        d.add_edge(0, 1, EdgeKind::Hadamard).unwrap();
        assert!(!a.is_isomorphic(&d));
        assert!(Diagram::new().is_isomorphic(&Diagram::new()));
        assert_eq!(d.add_edge(0, 1, EdgeKind::Plain), Err(GraphError::DuplicateEdge(0, 1)));
    }
}
