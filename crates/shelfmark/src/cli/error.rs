//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use shelfmark::ShelfError;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Path does not exist
    pub fn path_not_found(path: &Path) -> Self {
        Self::new(format!("Path not found: {}", path.display()))
            .with_context("The specified path does not exist on the filesystem")
            .with_suggestions([
                format!("TRY: Check that the path exists: ls -la {}", path.display()),
                "TRY: Check for typos in the path".to_string(),
            ])
    }

    /// No catalog under the root
    pub fn not_initialized(root: &Path) -> Self {
        Self::new(format!("No catalog found in {}", root.display()))
            .with_context("The directory has no .shelfmark folder")
            .with_suggestions([
                format!(
                    "TRY: Create one: shelfmark init {} --model model.json",
                    root.display()
                ),
                "TRY: Generate a schema first: shelfmark model model.json".to_string(),
            ])
    }

    /// Catalog already present
    pub fn already_initialized(root: &Path) -> Self {
        Self::new(format!("A catalog already exists in {}", root.display()))
            .with_suggestions([
                format!("TRY: Update it instead: shelfmark sync {}", root.display()),
                format!(
                    "TRY: Remove {}/.shelfmark to start over",
                    root.display()
                ),
            ])
    }

    /// Field not in the schema
    pub fn unknown_field(field: &str) -> Self {
        Self::new(format!("Unknown field: {}", field))
            .with_context("Field names are case-sensitive and come from the catalog schema")
            .with_suggestion("TRY: List the fields: shelfmark status ROOT")
    }

    /// No record with that ID
    pub fn record_not_found(selector: &str) -> Self {
        Self::new(format!("No record matches {}", selector))
            .with_suggestion("TRY: Find the ID with: shelfmark query ROOT --field Name VALUE")
    }

    /// Translate a library error for a catalog at `root`.
    pub fn from_shelf(err: ShelfError, root: &Path) -> Self {
        match err {
            ShelfError::NotInitialized(_) => Self::not_initialized(root),
            ShelfError::AlreadyInitialized(_) => Self::already_initialized(root),
            ShelfError::UnknownField(field) => Self::unknown_field(&field),
            ShelfError::RecordNotFound(selector) => Self::record_not_found(&selector),
            other => Self::new(other.to_string()),
        }
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
