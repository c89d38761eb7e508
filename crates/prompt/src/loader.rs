//! Prompt loader for YAML prompt overrides.

use crate::defaults::{self, DOCUMENT_SEARCH_ID, INQUIRY_ID, QUERY_REWRITE_ID};
use crate::types::PromptDefinition;
use docchat_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// The three system prompts a chat turn needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub query_rewrite: String,
    pub document_search: String,
    pub inquiry: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            query_rewrite: defaults::QUERY_REWRITE_PROMPT.to_string(),
            document_search: defaults::DOCUMENT_SEARCH_PROMPT.to_string(),
            inquiry: defaults::INQUIRY_PROMPT.to_string(),
        }
    }
}

impl PromptSet {
    /// Load the prompt set for a workspace.
    ///
    /// Each prompt comes from `.docchat/prompts/<id>.yml` when that file
    /// exists and from the built-in text otherwise. A file that exists but
    /// is invalid is an error rather than a silent fallback.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        Ok(Self {
            query_rewrite: load_or_builtin(workspace_path, QUERY_REWRITE_ID)?,
            document_search: load_or_builtin(workspace_path, DOCUMENT_SEARCH_ID)?,
            inquiry: load_or_builtin(workspace_path, INQUIRY_ID)?,
        })
    }
}

fn load_or_builtin(workspace_path: &Path, prompt_id: &str) -> AppResult<String> {
    if prompt_path(workspace_path, prompt_id).exists() {
        return Ok(load_prompt(workspace_path, prompt_id)?.template);
    }

    defaults::builtin(prompt_id)
        .map(str::to_string)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt id: {}", prompt_id)))
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".docchat/prompts")
}

fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    prompts_dir(workspace_path).join(format!("{}.yml", prompt_id))
}

/// Load a prompt definition by ID from the workspace.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.docchat/`
/// * `prompt_id` - Prompt identifier (e.g., "answer.inquiry")
///
/// # Example
/// ```no_run
/// use docchat_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "answer.inquiry")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, prompt_id)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List the prompt override IDs present in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt id '{}' does not match file name '{}'",
            def.id, expected_id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, body: &str) -> PathBuf {
        let prompts = dir.join(".docchat/prompts");
        fs::create_dir_all(&prompts).unwrap();
        let file_path = prompts.join(format!("{}.yml", id));
        fs::write(&file_path, body).unwrap();
        file_path
    }

    fn valid_prompt(id: &str, template: &str) -> String {
        format!(
            "id: {}\ntitle: \"Custom\"\napiVersion: \"1.0\"\ntemplate: \"{}\"\n",
            id, template
        )
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            INQUIRY_ID,
            &valid_prompt(INQUIRY_ID, "Answer: {{context}}"),
        );

        let prompt = load_prompt(temp_dir.path(), INQUIRY_ID).unwrap();
        assert_eq!(prompt.id, INQUIRY_ID);
        assert_eq!(prompt.template, "Answer: {{context}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), INQUIRY_ID, "invalid: yaml: content:");

        assert!(load_prompt(temp_dir.path(), INQUIRY_ID).is_err());
    }

    #[test]
    fn test_mismatched_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            INQUIRY_ID,
            &valid_prompt(QUERY_REWRITE_ID, "text"),
        );

        assert!(load_prompt(temp_dir.path(), INQUIRY_ID).is_err());
    }

    #[test]
    fn test_prompt_set_defaults_without_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let set = PromptSet::load(temp_dir.path()).unwrap();
        assert_eq!(set, PromptSet::default());
    }

    #[test]
    fn test_prompt_set_uses_override() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            DOCUMENT_SEARCH_ID,
            &valid_prompt(DOCUMENT_SEARCH_ID, "Find it: {{context}}"),
        );

        let set = PromptSet::load(temp_dir.path()).unwrap();
        assert_eq!(set.document_search, "Find it: {{context}}");
        assert_eq!(set.inquiry, defaults::INQUIRY_PROMPT);
    }

    #[test]
    fn test_prompt_set_rejects_broken_override() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), QUERY_REWRITE_ID, "invalid: yaml: content:");

        assert!(PromptSet::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), INQUIRY_ID, &valid_prompt(INQUIRY_ID, "a"));
        write_prompt(
            temp_dir.path(),
            QUERY_REWRITE_ID,
            &valid_prompt(QUERY_REWRITE_ID, "b"),
        );

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts, vec![INQUIRY_ID.to_string(), QUERY_REWRITE_ID.to_string()]);
    }
}
