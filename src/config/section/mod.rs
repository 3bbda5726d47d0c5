//! Configuration section definitions.

mod images;
mod paths;
mod serve;
mod style;

pub use images::ImagesConfig;
pub use paths::{PathPair, PathsConfig};
pub use serve::ServeConfig;
pub use style::{StyleConfig, TargetsConfig};
