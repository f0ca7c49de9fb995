//! Route handlers.

pub mod dimensions;
pub mod health;
pub mod model;
pub mod predict;
