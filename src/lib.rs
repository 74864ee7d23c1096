pub use moor_core::*;
