use std::{ collections::BTreeSet, hash::Hash };
use rustc_hash::{ FxHashMap, FxHashSet };
use crate::graph::{
    EdgeKind,
    GraphResult,
    Vertex,
    VertexId,
    VertexKind,
};

use crate::graph::GraphError::*;

fn ordered(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Endpoint of an edge passed to [`Diagram::insert_subgraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubgraphRef<K> {
    /// One of the vertices being inserted, by its temporary id.
    New(K),
    /// A vertex already in the diagram.
    Existing(VertexId),
}

/// Represents a diagram in the ZX(H)-calculus.
///
/// Every vertex is given a unique index for identification purposes. At most
/// one edge may join any two vertices and no vertex is joined to itself.
///
/// Removed ids are never handed out again, so an id always refers to the
/// vertex it was first assigned to for as long as that vertex lives.
#[derive(Clone, Debug, Default)]
pub struct Diagram {
    pub(crate) vertices: Vec<Option<Vertex>>,
    pub(crate) vertex_count: usize,
    pub(crate) wires: Vec<Option<Vec<(VertexId, EdgeKind)>>>,
    pub(crate) edge_count: usize,
}

impl Diagram {
    /// Create a new, empty diagram.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            vertex_count: 0,
            wires: Vec::new(),
            edge_count: 0,
        }
    }

    /// Return the number of vertices.
    pub fn count_vertices(&self) -> usize { self.vertex_count }

    /// Return the number of edges.
    pub fn count_edges(&self) -> usize { self.edge_count }

    /// Return the number of vertices of a given kind.
    pub fn count_kind(&self, kind: VertexKind) -> usize {
        self.vertices.iter()
            .filter(|mb_v| mb_v.as_ref().is_some_and(|v| v.kind == kind))
            .count()
    }

    /// Return the number of Z-spiders.
    pub fn count_z(&self) -> usize { self.count_kind(VertexKind::Z) }

    /// Return the number of X-spiders.
    pub fn count_x(&self) -> usize { self.count_kind(VertexKind::X) }

    /// Return the number of H-boxes.
    pub fn count_h(&self) -> usize { self.count_kind(VertexKind::HBox) }

    /// Return the number of boundaries.
    pub fn count_boundaries(&self) -> usize {
        self.count_kind(VertexKind::Boundary)
    }

    /// Return the ID that the next added vertex will receive.
    pub fn next_id(&self) -> VertexId { self.vertices.len() }

    /// Get the vertex associated with a particular ID if it exists.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id).and_then(|mb_v| mb_v.as_ref())
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id).and_then(|mb_v| mb_v.as_mut())
    }

    /// Return `true` if a vertex exists with the given ID.
    pub fn has_vertex(&self, id: VertexId) -> bool {
        self.vertices.get(id).is_some_and(|mb_v| mb_v.is_some())
    }

    /// Set the unfusable flag on a vertex.
    pub fn set_unfusable(&mut self, id: VertexId, unfusable: bool)
        -> GraphResult<()>
    {
        self.vertex_mut(id)
            .map(|v| { v.unfusable = unfusable; })
            .ok_or(UnknownVertex(id))
    }

    /// Add a vertex to the diagram and return its ID.
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(Some(vertex));
        self.wires.push(Some(Vec::new()));
        self.vertex_count += 1;
        id
    }

    // put a vertex under a caller-chosen id, e.g. when reloading a saved
    // diagram
    pub(crate) fn place_vertex(&mut self, id: VertexId, vertex: Vertex)
        -> GraphResult<()>
    {
        if self.has_vertex(id) { return Err(OccupiedId(id)); }
        self.reserve_ids(id + 1);
        self.vertices[id] = Some(vertex);
        self.wires[id] = Some(Vec::new());
        self.vertex_count += 1;
        Ok(())
    }

    // make sure that ids below `n` are never handed out by `add_vertex`
    pub(crate) fn reserve_ids(&mut self, n: usize) {
        if self.vertices.len() < n {
            self.vertices.resize_with(n, || None);
            self.wires.resize_with(n, || None);
        }
    }

    /// Add an edge of the given kind between two vertices.
    ///
    /// Fails if either vertex does not exist, if `a == b`, or if the vertices
    /// are already connected.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId, kind: EdgeKind)
        -> GraphResult<()>
    {
        self.has_vertex(a).then_some(()).ok_or(UnknownVertex(a))?;
        self.has_vertex(b).then_some(()).ok_or(UnknownVertex(b))?;
        (a != b).then_some(()).ok_or(SelfLoop(a))?;
        self.edge_kind(a, b).is_none().then_some(())
            .ok_or(DuplicateEdge(a, b))?;
        self.push_edge(a, b, kind);
        Ok(())
    }

    // caller guarantees that both vertices exist and are not yet connected
    fn push_edge(&mut self, a: VertexId, b: VertexId, kind: EdgeKind) {
        if let Some(Some(nnb)) = self.wires.get_mut(a) { nnb.push((b, kind)); }
        if let Some(Some(nnb)) = self.wires.get_mut(b) { nnb.push((a, kind)); }
        self.edge_count += 1;
    }

    /// Remove the edge between two vertices, returning its kind if it existed.
    ///
    /// Fails if either vertex does not exist.
    pub fn remove_edge(&mut self, a: VertexId, b: VertexId)
        -> GraphResult<Option<EdgeKind>>
    {
        self.has_vertex(a).then_some(()).ok_or(UnknownVertex(a))?;
        self.has_vertex(b).then_some(()).ok_or(UnknownVertex(b))?;
        let mut kind: Option<EdgeKind> = None;
        if let Some(Some(nnb)) = self.wires.get_mut(a) {
            if let Some(k) = nnb.iter().position(|(nb, _)| *nb == b) {
                kind = Some(nnb.swap_remove(k).1);
            }
        }
        if let Some(Some(nnb)) = self.wires.get_mut(b) {
            if let Some(k) = nnb.iter().position(|(nb, _)| *nb == a) {
                nnb.swap_remove(k);
            }
        }
        if kind.is_some() { self.edge_count -= 1; }
        Ok(kind)
    }

    /// Remove the vertex associated with a particular ID and return its data.
    ///
    /// This method also removes all edges with an endpoint at the vertex.
    pub fn remove_vertex(&mut self, id: VertexId) -> GraphResult<Vertex> {
        let vertex =
            self.vertices.get_mut(id)
            .and_then(|mb_v| mb_v.take())
            .ok_or(UnknownVertex(id))?;
        let nnb_of = self.wires[id].take().unwrap_or_default();
        self.vertex_count -= 1;
        self.edge_count -= nnb_of.len();
        for (nb_of, _) in nnb_of.into_iter() {
            if let Some(Some(nnb)) = self.wires.get_mut(nb_of) {
                nnb.retain(|(nb, _)| *nb != id);
            }
        }
        Ok(vertex)
    }

    /// Remove a set of vertices (with every edge touching them) and a set of
    /// edges.
    ///
    /// IDs and edges that are not present are skipped, so calling this twice
    /// with the same arguments is the same as calling it once.
    pub fn remove<I, J>(&mut self, vertices: I, edges: J)
    where
        I: IntoIterator<Item = VertexId>,
        J: IntoIterator<Item = (VertexId, VertexId)>,
    {
        for (a, b) in edges.into_iter() {
            if self.has_vertex(a) && self.has_vertex(b) {
                self.remove_edge(a, b).ok();
            }
        }
        for id in vertices.into_iter() {
            if self.has_vertex(id) {
                self.remove_vertex(id).ok();
            }
        }
    }

    /// Insert a collection of vertices and edges, allocating fresh IDs for the
    /// vertices.
    ///
    /// Vertices are given with caller-chosen temporary IDs of any type; edges
    /// may connect new vertices to each other or to vertices already in the
    /// diagram. Returns the mapping from temporary to allocated IDs. Allocated
    /// IDs are distinct from every ID the diagram has ever used.
    ///
    /// Nothing is inserted if any edge is invalid.
    pub fn insert_subgraph<K, I, J>(&mut self, vertices: I, edges: J)
        -> GraphResult<FxHashMap<K, VertexId>>
    where
        K: Copy + Eq + Hash,
        I: IntoIterator<Item = (K, Vertex)>,
        J: IntoIterator<Item = (SubgraphRef<K>, SubgraphRef<K>, EdgeKind)>,
    {
        let vertices: Vec<(K, Vertex)> = vertices.into_iter().collect();
        let base = self.vertices.len();
        let mut id_map: FxHashMap<K, VertexId> = FxHashMap::default();
        for (k, (tmp, _)) in vertices.iter().enumerate() {
            if id_map.insert(*tmp, base + k).is_some() {
                return Err(DuplicateTempId(k));
            }
        }

        let mut to_add: Vec<(VertexId, VertexId, EdgeKind)> = Vec::new();
        let mut seen: FxHashSet<(VertexId, VertexId)> = FxHashSet::default();
        for (k, (a, b, kind)) in edges.into_iter().enumerate() {
            let resolve = |r: SubgraphRef<K>| -> GraphResult<VertexId> {
                match r {
                    SubgraphRef::New(tmp) => {
                        id_map.get(&tmp).copied().ok_or(UnknownTempId(k))
                    },
                    SubgraphRef::Existing(id) => {
                        self.has_vertex(id).then_some(id)
                            .ok_or(UnknownVertex(id))
                    },
                }
            };
            let a = resolve(a)?;
            let b = resolve(b)?;
            (a != b).then_some(()).ok_or(SelfLoop(a))?;
            let fresh = a >= base || b >= base || self.edge_kind(a, b).is_none();
            (fresh && seen.insert(ordered(a, b))).then_some(())
                .ok_or(DuplicateEdge(a, b))?;
            to_add.push((a, b, kind));
        }

        vertices.into_iter()
            .for_each(|(_, v)| { self.add_vertex(v); });
        to_add.into_iter()
            .for_each(|(a, b, kind)| { self.push_edge(a, b, kind); });
        Ok(id_map)
    }

    /// Return an iterator over the neighbors of a vertex, with the kinds of
    /// the connecting edges.
    ///
    /// Fails if the vertex does not exist.
    ///
    /// The iterator item type is `(`[`VertexId`]`, `[`EdgeKind`]`)`.
    pub fn neighbors(&self, id: VertexId) -> GraphResult<Neighbors<'_>> {
        self.wires.get(id)
            .and_then(|mb_nnb| mb_nnb.as_ref())
            .map(|nnb| Neighbors { iter: nnb.iter() })
            .ok_or(UnknownVertex(id))
    }

    /// Return the number of edges attached to a vertex.
    ///
    /// Fails if the vertex does not exist.
    pub fn degree(&self, id: VertexId) -> GraphResult<usize> {
        self.wires.get(id)
            .and_then(|mb_nnb| mb_nnb.as_ref().map(|nnb| nnb.len()))
            .ok_or(UnknownVertex(id))
    }

    /// Return the kind of the edge between two vertices, if it exists.
    pub fn edge_kind(&self, a: VertexId, b: VertexId) -> Option<EdgeKind> {
        self.wires.get(a)
            .and_then(|mb_nnb| mb_nnb.as_ref())
            .and_then(|nnb| {
                nnb.iter().find_map(|(nb, kind)| (*nb == b).then_some(*kind))
            })
    }

    /// Return an iterator over all vertices, visited in index order.
    ///
    /// The iterator item type is `(`[`VertexId`]`, &`[`Vertex`]`)`.
    pub fn vertices(&self) -> Vertices<'_> {
        Vertices { len: self.vertex_count, iter: self.vertices.iter().enumerate() }
    }

    /// Return an iterator over all edges, each visited once as `(a, b, kind)`
    /// with `a < b`.
    ///
    /// Left IDs increase monotonically over the course of iteration.
    pub fn edges(&self) -> Edges<'_> {
        Edges {
            len: self.edge_count,
            group: None,
            iter: self.wires.iter().enumerate(),
        }
    }

    /// Return the IDs of all boundary vertices in increasing order.
    pub fn boundaries(&self) -> Vec<VertexId> {
        self.vertices()
            .filter_map(|(id, v)| v.is_boundary().then_some(id))
            .collect()
    }

    /// Return the names of all variables appearing in any phase.
    pub fn free_vars(&self) -> BTreeSet<String> {
        self.vertices()
            .flat_map(|(_, v)| v.phase.free_vars())
            .map(|name| name.to_string())
            .collect()
    }
}

/// Iterator over all vertices in a diagram, visited in index order.
///
/// The iterator item type is `(`[`VertexId`]`, &`[`Vertex`]`)`.
pub struct Vertices<'a> {
    len: usize,
    iter: std::iter::Enumerate<std::slice::Iter<'a, Option<Vertex>>>,
}

impl<'a> Iterator for Vertices<'a> {
    type Item = (VertexId, &'a Vertex);

    fn next(&mut self) -> Option<Self::Item> {
        let next =
            self.iter.find_map(|(id, mb_v)| mb_v.as_ref().map(|v| (id, v)));
        if next.is_some() { self.len = self.len.saturating_sub(1); }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.len, Some(self.len)) }
}

impl<'a> ExactSizeIterator for Vertices<'a> {
    fn len(&self) -> usize { self.len }
}

impl<'a> std::iter::FusedIterator for Vertices<'a> { }

/// Iterator over all edges in a diagram.
///
/// Each edge is visited once, as `(a, b, kind)` with `a < b`.
pub struct Edges<'a> {
    len: usize,
    group: Option<(VertexId, std::slice::Iter<'a, (VertexId, EdgeKind)>)>,
    iter: std::iter::Enumerate<
        std::slice::Iter<'a, Option<Vec<(VertexId, EdgeKind)>>>
    >,
}

impl<'a> Iterator for Edges<'a> {
    type Item = (VertexId, VertexId, EdgeKind);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((left, group_iter)) = self.group.as_mut() {
                let left = *left;
                if let Some(&(right, kind)) =
                    group_iter.find(|&&(right, _)| right > left)
                {
                    self.len = self.len.saturating_sub(1);
                    return Some((left, right, kind));
                }
            }
            let (new_left, mb_nnb) = self.iter.next()?;
            self.group = mb_nnb.as_ref().map(|nnb| (new_left, nnb.iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.len, Some(self.len)) }
}

impl<'a> ExactSizeIterator for Edges<'a> {
    fn len(&self) -> usize { self.len }
}

impl<'a> std::iter::FusedIterator for Edges<'a> { }

/// Iterator over the neighbors of a vertex, visited in arbitrary order.
///
/// The iterator item type is `(`[`VertexId`]`, `[`EdgeKind`]`)`.
pub struct Neighbors<'a> {
    iter: std::slice::Iter<'a, (VertexId, EdgeKind)>,
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = (VertexId, EdgeKind);

    fn next(&mut self) -> Option<Self::Item> { self.iter.next().copied() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl<'a> DoubleEndedIterator for Neighbors<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().copied()
    }
}

impl<'a> ExactSizeIterator for Neighbors<'a> {
    fn len(&self) -> usize { self.iter.len() }
}

impl<'a> std::iter::FusedIterator for Neighbors<'a> { }

/// Create a [`Diagram`] using an abbreviated syntax.
///
/// The first block defines vertices with the syntax
/// ```text
/// <label> = <constructor> ( args )
/// ```
/// where `<constructor>` is an associated function of
/// [`Vertex`][crate::graph::Vertex] (e.g. `z`, `x_unfusable`, `h`, `boundary`)
/// and `args` are passed to it as-is. Labels are then used to define edges in
/// up to three further blocks, one per edge kind, with the syntax
/// ```text
/// <v1> -- <v2> [ -- <v3> ... ]
/// ```
/// `wires` creates plain edges, `h_wires` Hadamard edges and `w_wires` W-node
/// internal edges; each block is optional but they must appear in this order.
///
/// The total return type is [`Result`]`<(`[`Diagram`]`,
/// `[`HashMap`][std::collections::HashMap]`<&'static `[`str`]`,
/// `[`VertexId`]`>), `[`GraphError`][crate::graph::GraphError]`>`.
///
/// ```
/// use zx_rewrite::{ diagram, phase::Phase };
///
/// let (dg, ids) = diagram!(
///     nodes: {
///         i = boundary ( ),
///         o = boundary ( ),
///         a = z ( Phase::pi() ),
///         b = x ( Phase::zero() ),
///     },
///     wires: { i -- a -- o },
///     h_wires: { a -- b },
/// ).unwrap();
/// assert_eq!(dg.count_vertices(), 4);
/// assert_eq!(dg.count_edges(), 3);
/// assert_eq!(dg.degree(ids["a"]), Ok(3));
/// ```
#[macro_export]
macro_rules! diagram {
    (
        nodes: {
            $( $node_name:ident = $node_def:ident ( $( $arg:expr ),* $(,)? ) ),*
            $(,)?
        }
        $(, wires: {
            $( $p1:ident $( -- $pk:ident )+ ),* $(,)?
        } )?
        $(, h_wires: {
            $( $h1:ident $( -- $hk:ident )+ ),* $(,)?
        } )?
        $(, w_wires: {
            $( $w1:ident $( -- $wk:ident )+ ),* $(,)?
        } )?
        $(,)?
    ) => {
        {
            let mut diagram = $crate::graph::Diagram::new();
            $(
                let $node_name =
                    diagram.add_vertex(
                        $crate::graph::Vertex::$node_def($( $arg ),*)
                    );
            )*
            #[allow(unused_mut)]
            let mut res: $crate::graph::GraphResult<()> = Ok(());
            $( $(
                let mut last = $p1;
                $(
                    res = res.and_then(|_| {
                        diagram.add_edge(last, $pk, $crate::graph::EdgeKind::Plain)
                    });
                    last = $pk;
                )+
                let _ = last;
            )* )?
            $( $(
                let mut last = $h1;
                $(
                    res = res.and_then(|_| {
                        diagram.add_edge(last, $hk, $crate::graph::EdgeKind::Hadamard)
                    });
                    last = $hk;
                )+
                let _ = last;
            )* )?
            $( $(
                let mut last = $w1;
                $(
                    res = res.and_then(|_| {
                        diagram.add_edge(last, $wk, $crate::graph::EdgeKind::WIO)
                    });
                    last = $wk;
                )+
                let _ = last;
            )* )?
            res.map(|_| {
                let ids:
                    std::collections::HashMap<
                        &'static str,
                        $crate::graph::VertexId
                    > =
                    [$( (stringify!($node_name), $node_name) ),*]
                    .into_iter()
                    .collect();
                (diagram, ids)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ expr::PhaseExpr, graph::GraphError, phase::Phase };

    fn build_simple() -> Diagram {
        let mut dg = Diagram::new();
        let b0 = dg.add_vertex(Vertex::boundary());         // 0
        let z0 = dg.add_vertex(Vertex::z(Phase::new(1, 4))); // 1
        let x0 = dg.add_vertex(Vertex::x(Phase::zero()));    // 2
        let h0 = dg.add_vertex(Vertex::h());                 // 3
        let b1 = dg.add_vertex(Vertex::boundary());         // 4
        dg.add_edge(b0, z0, EdgeKind::Plain).unwrap();
        dg.add_edge(z0, x0, EdgeKind::Hadamard).unwrap();
        dg.add_edge(z0, h0, EdgeKind::Plain).unwrap();
        dg.add_edge(x0, b1, EdgeKind::Plain).unwrap();
        dg
    }

    #[test]
    fn counts() {
        let mut dg = build_simple();
        assert_eq!(dg.count_vertices(),   5);
        assert_eq!(dg.count_edges(),      4);
        assert_eq!(dg.count_z(),          1);
        assert_eq!(dg.count_x(),          1);
        assert_eq!(dg.count_h(),          1);
        assert_eq!(dg.count_boundaries(), 2);
        dg.remove_vertex(1).unwrap();
        assert_eq!(dg.count_vertices(),   4);
        assert_eq!(dg.count_edges(),      1);
        assert_eq!(dg.count_z(),          0);
        assert_eq!(dg.boundaries(),       vec![0, 4]);
    }

    #[test]
    fn edges_and_neighbors() {
        let dg = build_simple();
        let mut nnb: Vec<_> = dg.neighbors(1).unwrap().collect();
        nnb.sort();
        assert_eq!(
            nnb,
            vec![(0, EdgeKind::Plain), (2, EdgeKind::Hadamard), (3, EdgeKind::Plain)],
        );
        assert_eq!(dg.degree(1), Ok(3));
        assert_eq!(dg.degree(9), Err(GraphError::UnknownVertex(9)));
        assert!(dg.neighbors(9).is_err());
        assert_eq!(dg.edge_kind(2, 1), Some(EdgeKind::Hadamard));
        assert_eq!(dg.edge_kind(0, 4), None);
        let edges: Vec<_> = dg.edges().collect();
        assert_eq!(edges.len(), dg.count_edges());
        assert!(edges.iter().all(|(a, b, _)| a < b));
        assert!(edges.contains(&(2, 4, EdgeKind::Plain)));
    }

    #[test]
    fn add_edge_errors() {
        let mut dg = build_simple();
        assert_eq!(dg.add_edge(1, 1, EdgeKind::Plain), Err(GraphError::SelfLoop(1)));
        assert_eq!(
            dg.add_edge(2, 1, EdgeKind::Plain),
            Err(GraphError::DuplicateEdge(2, 1)),
        );
        assert_eq!(dg.add_edge(1, 7, EdgeKind::Plain), Err(GraphError::UnknownVertex(7)));
        assert_eq!(dg.remove_edge(1, 2), Ok(Some(EdgeKind::Hadamard)));
        assert_eq!(dg.remove_edge(1, 2), Ok(None));
        assert_eq!(dg.count_edges(), 3);
    }

    #[test]
    fn remove_idempotent() {
        let mut dg = build_simple();
        dg.remove([1, 42], [(2, 4), (0, 3)]);
        assert_eq!(dg.count_vertices(), 4);
        assert_eq!(dg.count_edges(), 0);
        let before: Vec<_> = dg.vertices().map(|(id, _)| id).collect();
        dg.remove([1, 42], [(2, 4), (0, 3)]);
        assert_eq!(dg.vertices().map(|(id, _)| id).collect::<Vec<_>>(), before);
        assert_eq!(dg.count_edges(), 0);
    }

    #[test]
    fn insert_subgraph_fresh_ids() {
        let mut dg = build_simple();
        dg.remove_vertex(4).unwrap();
        let map =
            dg.insert_subgraph(
                [("a", Vertex::z(PhaseExpr::var("t"))), ("b", Vertex::x(Phase::pi()))],
                [
                    (SubgraphRef::New("a"), SubgraphRef::New("b"), EdgeKind::Plain),
                    (SubgraphRef::New("a"), SubgraphRef::Existing(0), EdgeKind::Hadamard),
                ],
            )
            .unwrap();
        // id 4 was used once and is not handed out again
        assert_eq!(map["a"], 5);
        assert_eq!(map["b"], 6);
        assert_eq!(dg.edge_kind(5, 0), Some(EdgeKind::Hadamard));
        assert_eq!(dg.count_vertices(), 6);
        assert_eq!(dg.free_vars().into_iter().collect::<Vec<_>>(), vec!["t"]);
        // untouched vertices keep their ids
        assert!(dg.vertex(1).is_some_and(|v| v.is_z()));
    }

    #[test]
    fn insert_subgraph_atomic() {
        let mut dg = build_simple();
        let res =
            dg.insert_subgraph(
                [(0_u8, Vertex::h())],
                [
                    (SubgraphRef::New(0), SubgraphRef::Existing(1), EdgeKind::Plain),
                    (SubgraphRef::Existing(1), SubgraphRef::Existing(2), EdgeKind::Plain),
                ],
            );
        assert_eq!(res, Err(GraphError::DuplicateEdge(1, 2)));
        assert_eq!(dg.count_vertices(), 5);
        assert_eq!(dg.count_edges(), 4);
        let res =
            dg.insert_subgraph(
                [(0_u8, Vertex::h())],
                [(SubgraphRef::New(0), SubgraphRef::New(1), EdgeKind::Plain)],
            );
        assert_eq!(res, Err(GraphError::UnknownTempId(0)));
        let res =
            dg.insert_subgraph(
                [(0_u8, Vertex::h()), (0_u8, Vertex::w())],
                [],
            );
        assert_eq!(res, Err(GraphError::DuplicateTempId(1)));
        assert_eq!(dg.count_vertices(), 5);
    }

    #[test]
    fn macro_build() {
        let (dg, ids) = crate::diagram!(
            nodes: {
                i = boundary ( ),
                a = z_unfusable ( PhaseExpr::var("a") ),
                w0 = w ( ),
                w1 = w ( ),
            },
            wires: { i -- a -- w0 },
            w_wires: { w0 -- w1 },
        ).unwrap();
        assert_eq!(dg.count_vertices(), 4);
        assert_eq!(dg.edge_kind(ids["w0"], ids["w1"]), Some(EdgeKind::WIO));
        assert!(dg.vertex(ids["a"]).is_some_and(|v| v.unfusable));

        let res = crate::diagram!(
            nodes: { a = h ( ), b = h ( ) },
            wires: { a -- b },
            h_wires: { b -- a },
        );
        assert!(matches!(res, Err(GraphError::DuplicateEdge(_, _))));
    }
}
