//! Composition over the extends graph: traversal, satisfiability, and
//! mixin application.

pub mod mixin;
pub mod resolver;
