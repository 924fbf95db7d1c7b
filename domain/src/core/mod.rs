//! Core value objects: models, tool identifiers, and the error taxonomy.

pub mod error;
pub mod model;
pub mod tool;
