mod loader;
mod types;

pub use loader::resolve_secret;
pub use types::*;
