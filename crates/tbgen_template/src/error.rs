//! Template error types.

/// Errors produced while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The template text is malformed.
    #[error("syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based line of the offending delimiter.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// The template is well-formed but could not be rendered against the context.
    #[error("render error at line {line}: {message}")]
    Render {
        /// 1-based line of the offending expression or tag.
        line: usize,
        /// What was wrong.
        message: String,
    },
}

impl TemplateError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        TemplateError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn render(line: usize, message: impl Into<String>) -> Self {
        TemplateError::Render {
            line,
            message: message.into(),
        }
    }

    /// The 1-based template line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            TemplateError::Syntax { line, .. } | TemplateError::Render { line, .. } => *line,
        }
    }
}
