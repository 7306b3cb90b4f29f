//! Fatal generation errors.

use std::io;
use std::path::PathBuf;

/// Errors that stop generation before any artifact is attempted.
///
/// Failures of individual artifacts are not errors; they are recorded in the
/// [`GenerationReport`](crate::GenerationReport).
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The output directory or one of its fixed subdirectories could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The configuration declares no interfaces, so there is no primary protocol.
    #[error("configuration `{project}` declares no interfaces")]
    NoInterfaces {
        /// Project name of the rejected configuration.
        project: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dir_display() {
        let err = GenerateError::CreateDir {
            path: PathBuf::from("out/tb"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "failed to create output directory out/tb: denied"
        );
    }

    #[test]
    fn no_interfaces_display() {
        let err = GenerateError::NoInterfaces {
            project: "mem_tb".into(),
        };
        assert_eq!(err.to_string(), "configuration `mem_tb` declares no interfaces");
    }
}
