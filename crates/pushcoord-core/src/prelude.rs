pub use pushcoord_types::prelude::*;

// vim: ts=4
