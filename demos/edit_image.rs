//! Image editing example - modifies an existing image with a text prompt.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png>`
//!
//! Requires `FOUNDRY_ENDPOINT`, `FOUNDRY_API_KEY`, `FOUNDRY_API_VERSION`,
//! and `GPT_DEPLOYMENT_NAME` environment variables.

use img2img::{materialize, EditClient, EditModel, EditRequest};
use std::path::Path;

const PROMPT: &str = "Make the colors more vibrant and add a warm sunset glow";

#[tokio::main]
async fn main() -> img2img::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit_image <input_image.png>");

    let client = EditClient::builder().build()?;
    let request = EditRequest::from_file(PROMPT, &input_path)?;

    let outcome = client.submit(EditModel::Gpt, &request).await?;
    println!("Edit completed in {:.3}s", outcome.elapsed.as_secs_f64());

    let artifacts = materialize(&outcome.raw, outcome.model, PROMPT, Path::new("generated"))?;
    for artifact in &artifacts {
        println!(
            "Edited image saved to {} ({} bytes)",
            artifact.path.display(),
            artifact.bytes
        );
    }

    Ok(())
}
