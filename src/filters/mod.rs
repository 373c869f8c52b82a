//! Dataset and knowledge-graph filtering stages.
//!
//! Each stage is a pure function over the owned state: immutable input,
//! fresh output, no in-place surprises. The iterative stages (k-core,
//! alignment) loop until a round removes nothing; both terminate because the
//! record count is monotonically non-increasing and bounded below by zero.

pub mod alignment;
pub mod features;
pub mod kcore;
pub mod linking;
pub mod split;

pub use alignment::align;
pub use features::{ItemFeatures, extract_item_features};
pub use kcore::iterative_kcore;
pub use linking::clean_linking;
pub use split::{Split, SplitStrategy, split};
