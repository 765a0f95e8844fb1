use quickdraw_core::records::PersistError;

#[derive(Debug)]
pub enum RuntimeError {
    Config(String),
    Io(std::io::Error),
    Persist(PersistError),
    /// The session task is gone; commands can no longer be delivered.
    SessionClosed,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(m) => write!(f, "invalid configuration: {m}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Persist(e) => write!(f, "{e}"),
            Self::SessionClosed => write!(f, "session is no longer running"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Persist(e) => Some(e),
            Self::Config(_) | Self::SessionClosed => None,
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<PersistError> for RuntimeError {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

impl From<toml::de::Error> for RuntimeError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
