// State management module.
// Handles navigation, data loading, and the screen description for the renderer.

pub mod navigation;
pub mod navigator;
pub mod resource;
pub mod screen;

#[cfg(test)]
pub mod testing;

pub use navigator::Navigator;
pub use resource::ResourceClient;
pub use screen::{Body, DialogView, Hint, JobAction, NodeRef, Row, Screen};
