//! Segmentation
//!
//! Global threshold search, seeded region growing, connected-component
//! labeling with region borders, and quad-tree decomposition. Every function
//! is a pure pass over its input image.

mod border;
pub use border::*;

mod growth;
pub use growth::*;

mod label;
pub use label::*;

mod quadtree;
pub use quadtree::*;

mod threshold;
pub use threshold::*;

mod union_find;
