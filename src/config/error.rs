//! Errors raised while loading `folio.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("malformed folio.toml")]
    Parse(#[from] toml::de::Error),

    /// A value that parsed but makes no sense for the pipeline.
    #[error("invalid [{section}] settings: {message}")]
    Invalid {
        section: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub fn invalid(section: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            section,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_read_error_names_the_file_and_keeps_the_cause() {
        let err = ConfigError::Read(
            PathBuf::from("site/folio.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read config file `site/folio.toml`");
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }

    #[test]
    fn test_invalid_names_the_section() {
        let err = ConfigError::invalid("index", "`enable` is empty");
        assert_eq!(err.to_string(), "invalid [index] settings: `enable` is empty");
    }

    #[test]
    fn test_parse_error_from_toml() {
        let toml_err = toml::from_str::<toml::Table>("= nope").unwrap_err();
        let err = ConfigError::from(toml_err);
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.source().is_some());
    }
}
