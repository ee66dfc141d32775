use thiserror::Error as ThisError;

/// The two failure kinds every operation can surface. Both map to HTTP 400
/// on the wire; `kind_name` supplies the `name` field of the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("{0}")]
    Input(String),

    #[error("{0}")]
    Access(String),
}

impl Error {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn access(msg: impl Into<String>) -> Self {
        Self::Access(msg.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Input(_) => "InputError",
            Self::Access(_) => "AccessError",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
