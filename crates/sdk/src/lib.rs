//! Tessera SDK
//!
//! Content entry types and render instructions shared between the kernel
//! and renderers. Renderers depend on this crate only; they never see the
//! linking or resolution machinery.

pub mod render;
pub mod types;

// Re-export serde_json so renderers can build props without a direct dependency
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::render;
    pub use crate::render::RenderInstruction;
    pub use crate::types::*;
}
