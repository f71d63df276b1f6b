//! Mathematical primitives for the SDP plasma mapper.

pub mod coords;
pub mod interp;
pub mod newton;
pub mod polygon;
