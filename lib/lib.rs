#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! This package implements user-defined rewrite rules for diagrams in the
//! [ZX- and ZH-calculi][wiki].
//!
//! A rule is a pair of small diagrams `lhs => rhs`, possibly carrying symbolic
//! phases such as `a + b` or `2a + pi/4`. Applying a rule to a larger diagram
//! happens in three steps:
//! - [`find_matches`] locates every occurrence of the left-hand side, solving
//! for the rule's variables along the way;
//! - the caller picks one of the resulting [`Match`][rewrite::Match]es;
//! - [`apply`] cuts out the matched region and splices in an instance of the
//! right-hand side, producing a new diagram.
//!
//! Modules:
//! - [`phase`] and [`expr`] provide exact phases (as fractions of a full turn)
//! and linear expressions over them.
//! - [`graph`] holds the diagram representation itself.
//! - [`rule`] defines rules, their validation, and a JSON interchange format.
//! - [`rewrite`] contains the matcher, the symbolic phase solver, and the
//! applicator.
//!
//! ```
//! use zx_rewrite::{ diagram, expr::PhaseExpr, phase::Phase, rule::Rule };
//! use zx_rewrite::rewrite::CancelToken;
//!
//! // spider fusion, restricted to two Z-spiders on a wire
//! let (lhs, _) = diagram!(
//!     nodes: {
//!         i = boundary ( ),
//!         a = z ( PhaseExpr::var("a") ),
//!         b = z ( PhaseExpr::var("b") ),
//!         o = boundary ( ),
//!     },
//!     wires: { i -- a -- b -- o },
//! ).unwrap();
//! let (rhs, _) = diagram!(
//!     nodes: {
//!         i = boundary ( ),
//!         ab = z ( PhaseExpr::var("a") + PhaseExpr::var("b") ),
//!         o = boundary ( ),
//!     },
//!     wires: { i -- ab -- o },
//! ).unwrap();
//! let rule = Rule::new("fuse", lhs, rhs).unwrap();
//!
//! let (dg, _) = diagram!(
//!     nodes: {
//!         i = boundary ( ),
//!         s = z ( Phase::pi4() ),
//!         t = z ( Phase::pi2() ),
//!         o = boundary ( ),
//!     },
//!     wires: { i -- s -- t -- o },
//! ).unwrap();
//! let matches =
//!     zx_rewrite::find_matches(&rule, &dg, None, &CancelToken::new())
//!     .unwrap()
//!     .into_matches()
//!     .unwrap();
//! let new = zx_rewrite::apply(&rule, &dg, &matches[0]).unwrap();
//! assert_eq!(new.count_z(), 1);
//! let (_, fused) = new.vertices().find(|(_, v)| v.is_z()).unwrap();
//! assert_eq!(fused.phase.as_phase(), Some(Phase::new(3, 8)));
//! ```
//!
//! [wiki]: https://en.wikipedia.org/wiki/ZX-calculus
//!
//! # See also
//! - [PyZX](https://github.com/Quantomatic/pyzx): a Python implementation of
//! the ZX-calculus and its rewrite rules.
//! - [QuiZX](https://github.com/Quantomatic/quizx/tree/master): a Rust
//! implementation of the above.
//!
//! # Further reading
//! - J. van de Wetering, "ZX-calculus for the working quantum computer
//! scientist." [arXiv:2012.13966](https://arxiv.org/abs/2012.13966)
//! - A. Kissinger, J. van de Wetering, "PyZX: Large scale automated
//! diagrammatic reasoning." [arXiv:1904.04735](https://arxiv.org/abs/1904.04735)
//!

pub(crate) mod log;

pub mod phase;
pub mod expr;
pub mod graph;
pub mod rule;
pub mod rewrite;

pub use rule::validate;
pub use rewrite::{ apply, apply_concrete, find_matches };
