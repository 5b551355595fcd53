#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::{AuthScheme, OpenAiProvider};
