//! Input resolution strategies for an edit run.
//!
//! One capability, two policies: [`InteractiveResolver`] asks the user for
//! whatever was not supplied (and defaults the model to `gpt`), while
//! [`EnvResolver`] works from flags and configuration defaults alone (and
//! defaults the model to `flux`). Both produce a [`RunPlan`]; the core never
//! cares which strategy built it.

use crate::config::FoundryConfig;
use crate::edit::{EditModel, DEFAULT_PROMPT};
use crate::error::{EditError, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Extensions considered when scanning for a default input image.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "webp"];

/// Everything a single run needs.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Which model variant to use.
    pub model: EditModel,
    /// Path to the input image.
    pub image_path: PathBuf,
    /// The edit instruction.
    pub prompt: String,
}

/// Values already fixed at the boundary, typically by CLI flags.
///
/// A resolver only fills in what is still `None`.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Model selected with `--model`.
    pub model: Option<EditModel>,
    /// Image path given with `--image`.
    pub image: Option<PathBuf>,
    /// Prompt given with `--prompt`.
    pub prompt: Option<String>,
}

/// Strategy for turning overrides, configuration defaults, and (optionally)
/// user interaction into a concrete [`RunPlan`].
pub trait InputResolver {
    /// Resolves the plan for one run.
    fn resolve(&self, config: &FoundryConfig) -> Result<RunPlan>;
}

/// Non-interactive resolution from flags and configuration only.
///
/// The model defaults to [`EditModel::Flux`] when no flag was given. A
/// missing image path is an error rather than a question.
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    overrides: RunOverrides,
}

impl EnvResolver {
    /// Creates a resolver with the given overrides.
    pub fn new(overrides: RunOverrides) -> Self {
        Self { overrides }
    }
}

impl InputResolver for EnvResolver {
    fn resolve(&self, config: &FoundryConfig) -> Result<RunPlan> {
        let model = self.overrides.model.unwrap_or(EditModel::Flux);

        let image_path = self
            .overrides
            .image
            .clone()
            .or_else(|| config.default_image.clone())
            .ok_or_else(|| {
                EditError::InvalidRequest(
                    "no input image: pass --image or set DEFAULT_INPUT_IMAGE".into(),
                )
            })?;

        let prompt = resolve_prompt(self.overrides.prompt.as_deref(), config);

        Ok(RunPlan {
            model,
            image_path,
            prompt,
        })
    }
}

/// Interactive resolution on stdin/stdout.
///
/// Anything already overridden is not asked again. The model defaults to
/// [`EditModel::Gpt`] on an empty answer; the image question scans the
/// working directory for a default candidate and loops until a readable
/// file is named or the user types `quit`.
#[derive(Debug, Clone, Default)]
pub struct InteractiveResolver {
    overrides: RunOverrides,
}

impl InteractiveResolver {
    /// Creates a resolver with the given overrides.
    pub fn new(overrides: RunOverrides) -> Self {
        Self { overrides }
    }

    fn ask_model(&self) -> Result<EditModel> {
        loop {
            let answer = prompt_line("Select model to use ('gpt' or 'flux') [gpt]: ")?;
            if answer.is_empty() {
                return Ok(EditModel::Gpt);
            }
            match EditModel::parse(&answer) {
                Some(model) => return Ok(model),
                None => println!("Invalid selection. Please enter 'gpt' or 'flux'."),
            }
        }
    }

    fn ask_image(&self, config: &FoundryConfig) -> Result<PathBuf> {
        let default = config
            .default_image
            .clone()
            .filter(|path| path.is_file())
            .or_else(|| find_default_image(Path::new(".")));

        loop {
            let question = match &default {
                Some(path) => format!(
                    "Enter path to input image [{}] (or type 'quit' to exit): ",
                    path.display()
                ),
                None => "Enter path to input image (or type 'quit' to exit): ".to_string(),
            };
            let answer = prompt_line(&question)?;

            if answer.eq_ignore_ascii_case("quit") {
                return Err(EditError::Aborted);
            }

            let candidate = if answer.is_empty() {
                match &default {
                    Some(path) => path.clone(),
                    None => {
                        println!("Please provide a path to an image file.");
                        continue;
                    }
                }
            } else {
                PathBuf::from(answer)
            };

            if candidate.is_file() {
                return Ok(candidate);
            }
            println!("File not found: {}", candidate.display());
        }
    }

    fn ask_prompt(&self, config: &FoundryConfig) -> Result<String> {
        let default = config.default_prompt.as_deref().unwrap_or(DEFAULT_PROMPT);
        let answer = prompt_line(&format!("Enter prompt [{default}]: "))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }
}

impl InputResolver for InteractiveResolver {
    fn resolve(&self, config: &FoundryConfig) -> Result<RunPlan> {
        let model = match self.overrides.model {
            Some(model) => model,
            None => self.ask_model()?,
        };

        let image_path = match &self.overrides.image {
            Some(path) => path.clone(),
            None => self.ask_image(config)?,
        };

        let prompt = match self.overrides.prompt.as_deref().filter(|p| !p.is_empty()) {
            Some(prompt) => prompt.to_string(),
            None => self.ask_prompt(config)?,
        };

        Ok(RunPlan {
            model,
            image_path,
            prompt,
        })
    }
}

/// Picks the first image file in `dir`, by extension.
///
/// Directory read failures mean no default, never an error.
pub fn find_default_image(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn resolve_prompt(given: Option<&str>, config: &FoundryConfig) -> String {
    match given.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prompt) => prompt.to_string(),
        None => config
            .default_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
    }
}

fn prompt_line(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_resolver_defaults_to_flux() {
        let config = FoundryConfig::new().with_default_image("cat.png");
        let plan = EnvResolver::new(RunOverrides::default())
            .resolve(&config)
            .unwrap();
        assert_eq!(plan.model, EditModel::Flux);
        assert_eq!(plan.image_path, PathBuf::from("cat.png"));
        assert_eq!(plan.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_env_resolver_overrides_win() {
        let config = FoundryConfig::new()
            .with_default_image("cat.png")
            .with_default_prompt("make it rain");
        let overrides = RunOverrides {
            model: Some(EditModel::Gpt),
            image: Some(PathBuf::from("dog.jpg")),
            prompt: Some("make it snow".into()),
        };
        let plan = EnvResolver::new(overrides).resolve(&config).unwrap();
        assert_eq!(plan.model, EditModel::Gpt);
        assert_eq!(plan.image_path, PathBuf::from("dog.jpg"));
        assert_eq!(plan.prompt, "make it snow");
    }

    #[test]
    fn test_env_resolver_without_image_fails() {
        let config = FoundryConfig::new();
        let err = EnvResolver::new(RunOverrides::default())
            .resolve(&config)
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidRequest(_)));
    }

    #[test]
    fn test_prompt_falls_back_to_config_then_builtin() {
        let with_default = FoundryConfig::new().with_default_prompt("make it rain");
        assert_eq!(resolve_prompt(None, &with_default), "make it rain");
        assert_eq!(resolve_prompt(Some("  "), &with_default), "make it rain");
        assert_eq!(resolve_prompt(Some("sunset"), &with_default), "sunset");

        let bare = FoundryConfig::new();
        assert_eq!(resolve_prompt(None, &bare), DEFAULT_PROMPT);
    }

    #[test]
    fn test_find_default_image_picks_first_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zebra.png"), b"z").unwrap();
        std::fs::write(dir.path().join("apple.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"n").unwrap();

        let found = find_default_image(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "apple.jpg");
    }

    #[test]
    fn test_find_default_image_none_when_no_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"n").unwrap();
        assert!(find_default_image(dir.path()).is_none());
    }

    #[test]
    fn test_is_image_file_extension_matching() {
        assert!(is_image_file(Path::new("photo.PNG")));
        assert!(is_image_file(Path::new("photo.jpeg")));
        assert!(!is_image_file(Path::new("photo.txt")));
        assert!(!is_image_file(Path::new("photo")));
    }
}
