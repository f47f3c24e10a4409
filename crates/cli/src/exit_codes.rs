//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad day)      |
//! | 40-49   | service          | Poll service login/network/HTTP codes    |
//! | 60-69   | terminal         | Interactive grid / clipboard codes       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use duudl_client::ClientError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unparsable day or value.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Service (40-49)
// =============================================================================

/// Not logged in, or the service rejected the saved login.
pub const EXIT_NOT_AUTH: u8 = 40;

/// No poll with the given token.
pub const EXIT_NOT_FOUND: u8 = 41;

/// Network failure talking to the service.
pub const EXIT_NETWORK: u8 = 42;

/// Service rejected the request body (400/422).
pub const EXIT_VALIDATION: u8 = 43;

/// Other HTTP error status, or an unreadable response.
pub const EXIT_HTTP: u8 = 44;

/// The cell belongs to another participant.
pub const EXIT_FORBIDDEN_CELL: u8 = 45;

// =============================================================================
// Terminal (60-69)
// =============================================================================

/// Terminal could not be set up or drawn.
pub const EXIT_TERMINAL: u8 = 60;

/// Clipboard unavailable.
pub const EXIT_CLIPBOARD: u8 = 61;

/// Map a ClientError to its exit code.
pub fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::NotAuthenticated => EXIT_NOT_AUTH,
        ClientError::NotFound(_) => EXIT_NOT_FOUND,
        ClientError::Network(_) => EXIT_NETWORK,
        ClientError::Validation(_) => EXIT_VALIDATION,
        ClientError::Http(..) | ClientError::Parse(_) => EXIT_HTTP,
    }
}
