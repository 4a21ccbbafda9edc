use std::fmt;

/// Error type for directory operations.
#[derive(Debug)]
pub enum DirectoryError {
    /// A credential was given neither as a flag nor in the environment.
    MissingConfig { env_var: &'static str, flag: &'static str },
    /// 401/403 from the directory.
    Auth { status: u16, message: String },
    /// 400/422: the directory refused the request as sent.
    Rejected { status: u16, message: String },
    /// Still 429 after every retry.
    RateLimited { attempts: u32 },
    /// 5xx, network failure or an unexpected 4xx, after retries where applicable.
    Upstream(String),
    /// Response body was not the expected shape.
    Parse(String),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::MissingConfig { env_var, flag } => {
                write!(f, "missing directory setting {env_var} (use {flag} or set {env_var})")
            }
            DirectoryError::Auth { status, message } => {
                write!(f, "directory auth failed ({status}): {message}")
            }
            DirectoryError::Rejected { status, message } => {
                write!(f, "directory request rejected ({status}): {message}")
            }
            DirectoryError::RateLimited { attempts } => {
                write!(f, "directory rate limited after {attempts} attempts")
            }
            DirectoryError::Upstream(msg) => write!(f, "directory upstream error: {msg}"),
            DirectoryError::Parse(msg) => write!(f, "directory response parse error: {msg}"),
        }
    }
}

impl std::error::Error for DirectoryError {}
