//! CLI Exit Code Registry
//!
//! Single source of truth for `householder` exit codes. Scripts rely on them.
//!
//! | Range   | Domain     | Description                                 |
//! |---------|------------|---------------------------------------------|
//! | 0       | Universal  | Success                                     |
//! | 1       | Universal  | General error (unspecified)                 |
//! | 2       | Universal  | CLI usage error (bad args)                  |
//! | 3-9     | local      | Input/output files, rules file              |
//! | 50-59   | directory  | Contact directory configuration and access  |

use householder_directory::DirectoryError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Local files (3-9)
// =============================================================================

/// Input CSV unreadable or missing a required column; output not writable.
pub const EXIT_IO: u8 = 3;

/// Rules file does not parse or fails validation.
pub const EXIT_RULES: u8 = 4;

// =============================================================================
// Directory (50-59)
// =============================================================================

/// Credential missing (neither flag nor env var).
pub const EXIT_DIRECTORY_NOT_CONFIGURED: u8 = 50;

/// Auth rejected by the directory (401/403).
pub const EXIT_DIRECTORY_AUTH: u8 = 51;

/// Request rejected by the directory (400/422).
pub const EXIT_DIRECTORY_REJECTED: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_DIRECTORY_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), network failure or unreadable response.
pub const EXIT_DIRECTORY_UPSTREAM: u8 = 54;

/// Map a DirectoryError to its exit code.
pub fn directory_exit_code(err: &DirectoryError) -> u8 {
    match err {
        DirectoryError::MissingConfig { .. } => EXIT_DIRECTORY_NOT_CONFIGURED,
        DirectoryError::Auth { .. } => EXIT_DIRECTORY_AUTH,
        DirectoryError::Rejected { .. } => EXIT_DIRECTORY_REJECTED,
        DirectoryError::RateLimited { .. } => EXIT_DIRECTORY_RATE_LIMIT,
        DirectoryError::Upstream(_) | DirectoryError::Parse(_) => EXIT_DIRECTORY_UPSTREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_errors_map_to_registry() {
        let missing = DirectoryError::MissingConfig {
            env_var: "AIRTABLE_BASE_ID",
            flag: "--base",
        };
        assert_eq!(directory_exit_code(&missing), 50);
        let auth = DirectoryError::Auth { status: 403, message: "no".into() };
        assert_eq!(directory_exit_code(&auth), 51);
        let rejected = DirectoryError::Rejected { status: 422, message: "bad".into() };
        assert_eq!(directory_exit_code(&rejected), 52);
        assert_eq!(directory_exit_code(&DirectoryError::RateLimited { attempts: 4 }), 53);
        assert_eq!(directory_exit_code(&DirectoryError::Parse("x".into())), 54);
    }
}
