// ABOUTME: Tool module - defines tools, the result envelope, and the registry.
// ABOUTME: Core abstraction behind every gateway capability.

mod params;
mod registry;
mod result;
mod traits;

pub use params::*;
pub use registry::*;
pub use result::*;
pub use traits::*;
