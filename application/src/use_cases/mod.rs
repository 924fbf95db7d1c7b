//! Use cases orchestrating the ports.

pub mod generate_text;
