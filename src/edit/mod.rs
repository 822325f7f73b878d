//! Image edit module: request client and response materializer.

mod client;
mod materialize;
mod types;

pub use client::{EditClient, EditClientBuilder};
pub use materialize::{materialize, sanitize_prompt};
pub use types::{
    EditImage, EditModel, EditOutcome, EditRequest, EditResponse, ImageFormat, OutputArtifact,
    DEFAULT_PROMPT, EDIT_SIZE,
};
