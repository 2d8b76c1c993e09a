use serde::{ Deserialize, Serialize };
use crate::expr::PhaseExpr;

/// The generator represented by a vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub enum VertexKind {
    /// A Z-spider.
    Z,
    /// An X-spider.
    X,
    /// An H-box.
    HBox,
    /// A W-node.
    W,
    /// An open wire end.
    Boundary,
}

impl VertexKind {
    /// Return `true` for Z- and X-spiders, which obey spider fusion and can
    /// therefore be unfused.
    pub fn is_spider(self) -> bool { matches!(self, Self::Z | Self::X) }
}

/// The type of an edge between two vertices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub enum EdgeKind {
    /// An ordinary wire.
    Plain,
    /// A wire carrying a Hadamard gate.
    Hadamard,
    /// The internal wire joining the input and output halves of a W-node.
    WIO,
}

/// Location of a vertex on the canvas.
///
/// Positions are carried for renderers only; they never affect matching.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Return the mean position of a collection of positions, or `None` if it
    /// is empty.
    pub fn centroid<I>(positions: I) -> Option<Self>
    where I: IntoIterator<Item = Position>
    {
        let (n, sx, sy) =
            positions.into_iter()
            .fold((0_usize, 0.0, 0.0), |(n, sx, sy), p| (n + 1, sx + p.x, sy + p.y));
        (n > 0).then(|| Self::new(sx / n as f64, sy / n as f64))
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A single vertex in a [`Diagram`][crate::graph::Diagram].
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub kind: VertexKind,
    pub phase: PhaseExpr,
    pub pos: Position,
    /// If set and the vertex is part of a rule's left-hand side, any matching
    /// vertex must have exactly the same neighborhood as this one.
    pub unfusable: bool,
}

impl Vertex {
    /// Create a new vertex at the origin.
    pub fn new<P>(kind: VertexKind, phase: P) -> Self
    where P: Into<PhaseExpr>
    {
        Self {
            kind,
            phase: phase.into(),
            pos: Position::default(),
            unfusable: false,
        }
    }

    /// Create a new Z-spider.
    pub fn z<P>(phase: P) -> Self
    where P: Into<PhaseExpr>
    {
        Self::new(VertexKind::Z, phase)
    }

    /// Create a new X-spider.
    pub fn x<P>(phase: P) -> Self
    where P: Into<PhaseExpr>
    {
        Self::new(VertexKind::X, phase)
    }

    /// Create a new unfusable Z-spider.
    pub fn z_unfusable<P>(phase: P) -> Self
    where P: Into<PhaseExpr>
    {
        Self::z(phase).unfusable()
    }

    /// Create a new unfusable X-spider.
    pub fn x_unfusable<P>(phase: P) -> Self
    where P: Into<PhaseExpr>
    {
        Self::x(phase).unfusable()
    }

    /// Create a new H-box.
    pub fn h() -> Self { Self::new(VertexKind::HBox, PhaseExpr::zero()) }

    /// Create a new W-node.
    pub fn w() -> Self { Self::new(VertexKind::W, PhaseExpr::zero()) }

    /// Create a new boundary.
    pub fn boundary() -> Self {
        Self::new(VertexKind::Boundary, PhaseExpr::zero())
    }

    /// Set the position, consuming `self`.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.pos = Position::new(x, y);
        self
    }

    /// Set the unfusable flag, consuming `self`.
    pub fn unfusable(mut self) -> Self {
        self.unfusable = true;
        self
    }

    /// Return `true` if `self` is a Z-spider.
    pub fn is_z(&self) -> bool { self.kind == VertexKind::Z }

    /// Return `true` if `self` is an X-spider.
    pub fn is_x(&self) -> bool { self.kind == VertexKind::X }

    /// Return `true` if `self` is a Z- or X-spider.
    pub fn is_spider(&self) -> bool { self.kind.is_spider() }

    /// Return `true` if `self` is an H-box.
    pub fn is_h(&self) -> bool { self.kind == VertexKind::HBox }

    /// Return `true` if `self` is a W-node.
    pub fn is_w(&self) -> bool { self.kind == VertexKind::W }

    /// Return `true` if `self` is a boundary.
    pub fn is_boundary(&self) -> bool { self.kind == VertexKind::Boundary }

    /// Return `true` if `self` has the same kind and phase as `other`,
    /// ignoring position and flags.
    pub fn same_label(&self, other: &Self) -> bool {
        self.kind == other.kind && self.phase == other.phase
    }
}
