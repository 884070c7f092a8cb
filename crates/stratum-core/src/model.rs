//! Typed architecture model.
//!
//! The parser turns raw layer records into these types. Element and
//! relationship kinds are closed enums with an `Other` variant carrying the
//! original tag, so code can match exhaustively on the kinds it knows and
//! still round-trip the ones it doesn't.

mod element;
mod layer;
mod relationship;

pub use element::{Element, ElementKind, Field, PropertyValue, Properties, Visual};
pub use layer::{Layer, MetaModel};
pub use relationship::{Relationship, RelationshipKind};
