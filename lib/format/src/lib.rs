mod descriptor;
mod registry;
mod resolver;
mod sniff;

pub use descriptor::{FormatDescriptor, RdfFormat};
pub use registry::FormatRegistry;
pub use resolver::{FormatHint, FormatResolver, GUESS};
pub use sniff::{sniff, SNIFF_LENGTH};
