//! Timber framing for parametric canopies: mitered member chains, trusses,
//! post stacks, beams and braces, and the roof with its substructure and
//! trim.
//!
//! Builders are pure functions of their parameter structs. Most return
//! [`types::Member`]s or [`types::Piece`]s, which are realized as solids in
//! a [`canopy_kernel::topology::brep::EntityStore`] by the caller.

pub mod beams;
pub mod board;
pub mod member;
pub mod miter;
pub mod posts;
pub mod roof;
pub mod section;
pub mod truss;
pub mod types;

pub use types::{Member, MemberRole, Piece, Role, Section, TaggedSolid};
