//! Port definitions implemented by infrastructure adapters.

pub mod text_generator;
