//! Bundled extensions.

pub mod debug;
pub mod general;
pub mod links;

use crate::extensions::Extension;

/// Loaded before everything else; startup aborts if it fails.
pub fn mandatory() -> Box<dyn Extension> {
    Box::new(debug::DebugTools)
}

/// Extensions loaded at startup, in order.
pub fn extensions() -> Vec<Box<dyn Extension>> {
    vec![Box::new(general::General), Box::new(links::Links)]
}
