pub use pushcoord_core::prelude::*;

// vim: ts=4
