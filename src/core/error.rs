//! Error handling for bldrx
//!
//! This module provides the error taxonomy and user-friendly error reporting for the
//! template engine. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code (every classified failure
//!    is a [`BldrxError`] variant that can be recovered with `downcast_ref`)
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Resolution**: [`BldrxError::TemplateNotFound`] aborts before any write
//! - **Rendering**: [`BldrxError::RenderSyntaxError`], [`BldrxError::RenderUndefinedVariable`]
//! - **Transactions**: [`BldrxError::AtomicTransactionFailure`] is raised only after
//!   rollback has been attempted
//! - **Version control**: [`BldrxError::VcsIntegrationFailure`]
//! - **Registry**: [`BldrxError::TemplateAlreadyExists`], [`BldrxError::UserTemplateNotFound`]
//!
//! Binary and oversized template files are never errors: they surface as informational
//! `skipped-*` results in the action stream.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bldrx::core::{BldrxError, user_friendly_error};
//!
//! let error = BldrxError::TemplateNotFound {
//!     name: "python-cli".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bldrx operations
///
/// Each variant represents one failure mode of the engine. Variants carry the
/// relative template path or destination path that triggered them so the CLI can
/// point at the offending file.
///
/// # Propagation policy
///
/// Planning decisions (skip, `would-*`) are never errors. Only resolution failures,
/// render failures and atomic write failures abort a run and reach the caller.
#[derive(Error, Debug)]
pub enum BldrxError {
    /// No template root contains a directory with the requested name
    ///
    /// Lookup order is: explicit templates dir, user templates, packaged templates.
    #[error(
        "Template '{name}' not found in provided templates dir, user templates, or packaged templates"
    )]
    TemplateNotFound {
        /// Name of the template that could not be resolved
        name: String,
    },

    /// The rendering grammar rejected a template body
    #[error("Template syntax error in '{path}': {message}")]
    RenderSyntaxError {
        /// Template-relative path of the renderable file
        path: String,
        /// Diagnostic text produced by the template engine
        message: String,
    },

    /// A template referenced a variable that the metadata context does not define
    #[error("Undefined variable '{variable}' in template '{path}'")]
    RenderUndefinedVariable {
        /// Template-relative path of the renderable file
        path: String,
        /// The variable that was referenced but not defined
        variable: String,
        /// Similarly named metadata keys, closest first
        suggestions: Vec<String>,
    },

    /// An atomic run failed and was rolled back
    ///
    /// Every file touched earlier in the same run has been restored (best-effort)
    /// before this error is returned.
    #[error("Atomic apply failed while writing '{path}'; all changes were rolled back")]
    AtomicTransactionFailure {
        /// Destination path whose write triggered the rollback
        path: String,
        /// Underlying I/O cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Committing the applied changes to version control failed
    #[error("Version control integration failed: {reason}")]
    VcsIntegrationFailure {
        /// What went wrong
        reason: String,
        /// Diagnostic output of the underlying tool, if any
        output: String,
    },

    /// A computed destination path would escape the destination root
    #[error("Refusing to write outside the destination root: {path}")]
    UnsafePath {
        /// The offending relative path
        path: String,
    },

    /// A user template with this name is already installed
    #[error("Template '{name}' already exists in user templates")]
    TemplateAlreadyExists {
        /// Name of the installed template
        name: String,
    },

    /// Uninstall was requested for a template that is not installed
    #[error("User template '{name}' not found")]
    UserTemplateNotFound {
        /// Name of the missing template
        name: String,
    },

    /// A directory given as a template source is missing or not a directory
    #[error("Source template path '{path}' not found or is not a directory")]
    InvalidTemplateSource {
        /// The path that was supplied
        path: String,
    },

    /// Metadata supplied on the command line is malformed
    #[error("Invalid metadata '{input}': expected KEY=VALUE")]
    InvalidMetadata {
        /// The raw argument
        input: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper carrying user-facing details and a suggestion
///
/// Produced by [`user_friendly_error`] and printed by the CLI entry point.
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`BldrxError`] variants and [`std::io::Error`] kinds anywhere in the
/// error chain; everything else is displayed with its full context chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bldrx_error) = error.chain().find_map(|e| e.downcast_ref::<BldrxError>()) {
        return create_error_context(bldrx_error);
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        let base = ErrorContext::new(format!("{error:#}"));
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => base
                .with_suggestion("Check file ownership and permissions of the destination")
                .with_details("bldrx could not read or write a file"),
            std::io::ErrorKind::NotFound => base
                .with_suggestion("Check that the file or directory exists and the path is correct"),
            _ => base,
        };
    }

    ErrorContext::new(format!("{error:#}"))
}

fn create_error_context(error: &BldrxError) -> ErrorContext {
    let base = ErrorContext::new(error.to_string());
    match error {
        BldrxError::TemplateNotFound {
            ..
        } => base
            .with_suggestion("Run 'bldrx list' to see available templates, or pass --templates-dir")
            .with_details(
                "Templates are looked up in --templates-dir, then BLDRX_TEMPLATES_DIR or \
                 ~/.bldrx/templates, then the packaged templates directory",
            ),
        BldrxError::RenderSyntaxError {
            ..
        } => base.with_suggestion("Fix the template syntax, or run 'bldrx validate <template>'"),
        BldrxError::RenderUndefinedVariable {
            suggestions,
            ..
        } => {
            if suggestions.is_empty() {
                base.with_suggestion("Provide the variable with --meta KEY=VALUE")
            } else {
                base.with_suggestion(format!(
                    "Provide the variable with --meta KEY=VALUE (did you mean: {}?)",
                    suggestions.join(", ")
                ))
            }
        }
        BldrxError::AtomicTransactionFailure {
            source,
            ..
        } => base
            .with_details(format!("Cause: {source}"))
            .with_suggestion("The destination was restored to its previous state; fix the cause and retry"),
        BldrxError::VcsIntegrationFailure {
            output,
            ..
        } => {
            let ctx = base.with_suggestion(
                "Initialize a git repository in the destination or drop --git-commit",
            );
            if output.trim().is_empty() {
                ctx
            } else {
                ctx.with_details(output.trim().to_string())
            }
        }
        BldrxError::TemplateAlreadyExists {
            ..
        } => base.with_suggestion("Use --force to overwrite, or --name to install under another name"),
        BldrxError::UserTemplateNotFound {
            ..
        } => base.with_suggestion("Run 'bldrx list' to see installed user templates"),
        BldrxError::InvalidMetadata {
            ..
        } => base.with_suggestion("Pass metadata as --meta key=value"),
        _ => base,
    }
}
