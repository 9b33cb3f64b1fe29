pub mod span;
pub mod positions;
pub mod buffer;
pub mod intern;
pub mod detector;
pub mod segment;
pub mod index;
pub mod incremental;
pub mod notifier;

pub use span::*;
pub use positions::*;
pub use buffer::*;
pub use intern::*;
pub use detector::*;
pub use segment::*;
pub use index::*;
pub use incremental::*;
pub use notifier::*;

#[cfg(test)]
mod tests;
