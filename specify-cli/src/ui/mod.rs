//! Terminal presentation: banner, step tree and variant selector.

pub mod banner;
pub mod selector;
pub mod tree;

pub use banner::{print_banner, print_usage_hint};
pub use selector::select_variant;
pub use tree::{LineReporter, LiveTree};
