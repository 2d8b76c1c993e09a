use rustc_hash::{ FxHashMap, FxHashSet };
use crate::{
    expr::PhaseExpr,
    graph::{
        Diagram,
        EdgeKind,
        GraphError,
        Position,
        SubgraphRef,
        Vertex,
        VertexId,
        VertexKind,
    },
    log,
    rewrite::{ ApplyError, ApplyResult, Match, matcher::is_absorbing },
    rule::Rule,
};

/// Replace the region of `diagram` matched by `m` with an instance of the
/// rule's right-hand side.
///
/// `diagram` itself is left untouched. Vertices of `diagram` that are not
/// images of left-hand side interior vertices keep their IDs, and the images of
/// the left-hand side boundaries stay in place as the connection points of the
/// replacement; the new vertices receive fresh IDs.
///
/// Interior spiders that were matched with more legs than the pattern gives
/// them are first unfused: the extra legs are moved onto a fresh zero-phase
/// spider of the same kind placed on the wire to the pattern boundary that
/// absorbs them, and it is that spider the replacement is attached to.
/// H-boxes are unfused the same way, except that the fresh H-box is joined to
/// the matched one through a second, two-legged H-box, which then takes the
/// place of the boundary.
///
/// Variables without a concrete value in the match's assignment stay symbolic
/// in the new phases. See [`apply_concrete`] to forbid this.
pub fn apply(rule: &Rule, diagram: &Diagram, m: &Match) -> ApplyResult<Diagram> {
    let lhs = rule.lhs();
    let rhs = rule.rhs();
    let order = rule.boundary_order();
    let n_lhs = lhs.count_boundaries();
    let n_rhs = rhs.count_boundaries();
    if order.len() != n_lhs || order.len() != n_rhs {
        return Err(ApplyError::BoundaryArityMismatch {
            order: order.len(),
            lhs: n_lhs,
            rhs: n_rhs,
        });
    }
    check_match(lhs, diagram, m)?;
    let emb = m.embedding();

    let mut dg = diagram.clone();
    // left-hand side boundary -> vertex the replacement is attached to
    let mut alias: FxHashMap<VertexId, VertexId> =
        lhs.boundaries().into_iter()
        .filter_map(|b| emb.get(b).map(|t| (b, t)))
        .collect();

    // unfuse legs the pattern doesn't account for
    let mut interior: Vec<VertexId> = Vec::new();
    for (p, pv) in lhs.vertices() {
        if pv.is_boundary() { continue; }
        let t = emb.get(p).ok_or(ApplyError::InvalidMatch(p))?;
        interior.push(t);
        if pv.unfusable || !(pv.is_spider() || pv.is_h()) { continue; }
        let claimed: FxHashSet<VertexId> =
            lhs.neighbors(p)?
            .filter_map(|(q, _)| emb.get(q))
            .collect();
        let extra: Vec<(VertexId, EdgeKind)> =
            dg.neighbors(t)?
            .filter(|(nb, _)| !claimed.contains(nb))
            .collect();
        if extra.is_empty() { continue; }
        let absorber: VertexId =
            lhs.neighbors(p)?
            .filter(|(q, kind)| is_absorbing(lhs, *q, *kind))
            .map(|(q, _)| q)
            .min()
            .ok_or(ApplyError::InvalidMatch(p))?;
        let tb = alias.get(&absorber).copied()
            .ok_or(ApplyError::InvalidMatch(absorber))?;
        let (kind, pos_t) =
            dg.vertex(t)
            .map(|v| (v.kind, v.pos))
            .ok_or(GraphError::UnknownVertex(t))?;
        let pos_b = dg.vertex(tb).map(|v| v.pos).unwrap_or(pos_t);
        let pos_f = Position::centroid([pos_t, pos_b]).unwrap_or(pos_t);
        let f = dg.add_vertex(Vertex::new(kind, PhaseExpr::zero()).at(pos_f.x, pos_f.y));
        dg.remove_edge(t, tb)?;
        dg.add_edge(f, tb, EdgeKind::Plain)?;
        for (nb, edge) in extra.into_iter() {
            dg.remove_edge(t, nb)?;
            dg.add_edge(f, nb, edge)?;
        }
        let attach =
            if kind == VertexKind::HBox {
                let pos_m = Position::centroid([pos_t, pos_f]).unwrap_or(pos_t);
                let mid = dg.add_vertex(Vertex::h().at(pos_m.x, pos_m.y));
                dg.add_edge(t, mid, EdgeKind::Plain)?;
                dg.add_edge(mid, f, EdgeKind::Plain)?;
                mid
            } else {
                dg.add_edge(t, f, EdgeKind::Plain)?;
                f
            };
        log::trace!(vertex = t, unfused = f, "unfused extra legs");
        alias.insert(absorber, attach);
    }

    // boundary-boundary edges of the pattern are part of the matched region
    let boundary_edges: Vec<(VertexId, VertexId)> =
        lhs.edges()
        .filter_map(|(a, b, _)| {
            let ta = alias.get(&a)?;
            let tb = alias.get(&b)?;
            Some((*ta, *tb))
        })
        .collect();

    let center_removed =
        Position::centroid(
            interior.iter().filter_map(|t| dg.vertex(*t)).map(|v| v.pos)
        );
    dg.remove(interior.iter().copied(), boundary_edges);

    // right-hand side boundary -> surviving vertex
    let rhs_alias: FxHashMap<VertexId, VertexId> =
        order.iter()
        .filter_map(|(l, r)| alias.get(l).map(|t| (*r, *t)))
        .collect();

    let center_rhs =
        Position::centroid(
            rhs.vertices().filter(|(_, v)| v.is_boundary()).map(|(_, v)| v.pos)
        );
    let center_dg =
        Position::centroid(
            rhs_alias.values().filter_map(|t| dg.vertex(*t)).map(|v| v.pos)
        )
        .or(center_removed);
    let offset = match (center_dg, center_rhs) {
        (Some(to), Some(from)) => to - from,
        (Some(to), None) => {
            let from =
                Position::centroid(rhs.vertices().map(|(_, v)| v.pos))
                .unwrap_or_default();
            to - from
        },
        _ => Position::default(),
    };

    let assignment = m.assignment();
    let new_vertices: Vec<(VertexId, Vertex)> =
        rhs.vertices()
        .filter(|(_, v)| !v.is_boundary())
        .map(|(r, v)| {
            let mut new = Vertex::new(v.kind, v.phase.substitute(assignment));
            new.pos = v.pos + offset;
            (r, new)
        })
        .collect();
    let endpoint = |r: VertexId| -> SubgraphRef<VertexId> {
        match rhs_alias.get(&r) {
            Some(t) => SubgraphRef::Existing(*t),
            None => SubgraphRef::New(r),
        }
    };
    let new_edges: Vec<(SubgraphRef<VertexId>, SubgraphRef<VertexId>, EdgeKind)> =
        rhs.edges()
        .map(|(a, b, kind)| (endpoint(a), endpoint(b), kind))
        .collect();
    dg.insert_subgraph(new_vertices, new_edges)
        .map_err(|err| match err {
            GraphError::DuplicateEdge(a, b) => ApplyError::EdgeConflict(a, b),
            err => ApplyError::Graph(err),
        })?;

    log::debug!(
        rule = rule.name(),
        removed = interior.len(),
        vertices = dg.count_vertices(),
        "applied rewrite"
    );
    Ok(dg)
}

// only an edge between two right-hand side boundaries can duplicate one that's
// already in the diagram, so the trial rewrite is skipped for rules without
// them
pub(crate) fn is_applicable(rule: &Rule, diagram: &Diagram, m: &Match) -> bool {
    let rhs = rule.rhs();
    let is_boundary = |id: VertexId| rhs.vertex(id).is_some_and(|v| v.is_boundary());
    let joins_boundaries = rhs.edges().any(|(a, b, _)| is_boundary(a) && is_boundary(b));
    !joins_boundaries
        || !matches!(apply(rule, diagram, m), Err(ApplyError::EdgeConflict(..)))
}

/// Like [`apply`], but fail if any phase of the replacement would remain
/// symbolic.
pub fn apply_concrete(rule: &Rule, diagram: &Diagram, m: &Match)
    -> ApplyResult<Diagram>
{
    let assignment = m.assignment();
    for name in rule.rhs().free_vars() {
        if !assignment.get(&name).is_some_and(|value| value.is_concrete()) {
            return Err(ApplyError::UnresolvedSymbolicPhase(name));
        }
    }
    apply(rule, diagram, m)
}

// the match has to be an embedding of the whole left-hand side
fn check_match(lhs: &Diagram, diagram: &Diagram, m: &Match) -> ApplyResult<()> {
    let emb = m.embedding();
    let mut seen: FxHashSet<VertexId> = FxHashSet::default();
    for (p, _) in lhs.vertices() {
        let t = emb.get(p).ok_or(ApplyError::InvalidMatch(p))?;
        if !diagram.has_vertex(t) || !seen.insert(t) {
            return Err(ApplyError::InvalidMatch(p));
        }
    }
    for (a, b, kind) in lhs.edges() {
        let ta = emb.get(a).ok_or(ApplyError::InvalidMatch(a))?;
        let tb = emb.get(b).ok_or(ApplyError::InvalidMatch(b))?;
        if diagram.edge_kind(ta, tb) != Some(kind) {
            return Err(ApplyError::InvalidMatch(a));
        }
    }
    Ok(())
}
