//! Application layer for gengate
//!
//! This crate defines the boundary contract the content pipeline calls
//! ([`TextGenerator`]) and the thin use case wired around it. It depends
//! only on the domain layer; the fallback router in the infrastructure
//! layer implements the port.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::text_generator::TextGenerator;
pub use use_cases::generate_text::GenerateTextUseCase;
