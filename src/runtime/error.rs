use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error("File at {:?} is invalid{}.", path, Error::format_msg_as_detail(msg))]
    FileNotValid {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Failed parsing {}{}", context, Error::format_msg_as_detail(msg))]
    ParseError {
        context: String,
        msg: Option<String>,
    },

    #[error("Read '{}' covers no significant offsets; such reads must be filtered out before partitioning.", id)]
    NoSignificantOffsets { id: String },

    #[error("Threshold {} is outside [0, 1].", threshold)]
    InvalidThreshold { threshold: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn file_not_valid<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::FileNotValid {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn parse_error<C: Into<String>, M: Into<String>>(context: C, msg: Option<M>) -> Self {
        Error::ParseError {
            context: context.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn no_significant_offsets<I: Into<String>>(id: I) -> Self {
        Error::NoSignificantOffsets { id: id.into() }
    }

    #[cold]
    pub fn invalid_threshold(threshold: f64) -> Self {
        Error::InvalidThreshold { threshold }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}
