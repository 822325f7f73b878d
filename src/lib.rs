#![warn(missing_docs)]
//! img2img - image-to-image editing via AI Foundry deployments.
//!
//! This crate sends a local image plus a text instruction to a hosted
//! image-edit endpoint (a GPT image or Flux deployment), decodes the
//! base64-encoded results, and writes each image to a timestamped file.
//!
//! # Quick Start
//!
//! ```no_run
//! use img2img::{materialize, EditClient, EditModel, EditRequest};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> img2img::Result<()> {
//!     let client = EditClient::builder().build()?; // settings from env
//!     let request = EditRequest::from_file("make it a watercolor", "cat.png")?;
//!     let outcome = client.submit(EditModel::Gpt, &request).await?;
//!     let artifacts = materialize(
//!         &outcome.raw,
//!         outcome.model,
//!         &request.prompt,
//!         Path::new("generated"),
//!     )?;
//!     println!("wrote {} image(s)", artifacts.len());
//!     Ok(())
//! }
//! ```
//!
//! # Input resolution
//!
//! The CLI offers two named strategies for filling in whatever flags did
//! not: [`InteractiveResolver`] (asks on stdin, model defaults to `gpt`)
//! and [`EnvResolver`] (flags and environment only, model defaults to
//! `flux`). Library callers can skip both and build an
//! [`EditRequest`] directly.

mod error;

pub mod config;
pub mod edit;
pub mod resolve;

pub use config::FoundryConfig;
pub use error::{EditError, Result};

pub use edit::{
    materialize, sanitize_prompt, EditClient, EditClientBuilder, EditImage, EditModel,
    EditOutcome, EditRequest, EditResponse, ImageFormat, OutputArtifact, DEFAULT_PROMPT,
    EDIT_SIZE,
};

pub use resolve::{EnvResolver, InputResolver, InteractiveResolver, RunOverrides, RunPlan};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::FoundryConfig;
    pub use crate::edit::{materialize, EditClient, EditModel, EditRequest};
    pub use crate::error::{EditError, Result};
    pub use crate::resolve::{EnvResolver, InputResolver, InteractiveResolver};
}
