//! Small numeric helpers shared by the geometry and sampling modules.

pub mod points;
