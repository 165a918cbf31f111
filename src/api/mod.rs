//! External APIs exposed by the library.

pub mod dart;
