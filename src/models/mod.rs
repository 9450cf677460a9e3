//! Domain models for the family registry.
//!
//! - [`Person`]: a registry record with identity, name, birthday and up to
//!   [`MAX_PARENTS`] parent references. Parent links are stored on the child.
//! - [`CreatePersonInput`]: request body for adding a person.
//! - [`AncestryNode`]: a person with their ancestors resolved recursively.

mod person;

pub use person::*;
