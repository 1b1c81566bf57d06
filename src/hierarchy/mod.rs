pub mod resolve;
pub mod tree;

pub use tree::{Branch, Tree};
