//! Command implementations.

pub mod auth;
pub mod org;

use clap::Subcommand;
use zbooks_client::ApiError;

/// One-time passcode subcommands.
#[derive(Subcommand, Debug)]
pub enum OtpCommand {
    /// Request a passcode for an email address or mobile number
    Request {
        /// Where to send the passcode
        destination: String,
    },

    /// Verify a received passcode and log in
    Verify {
        /// The destination the passcode was sent to
        destination: String,
        /// The passcode
        code: String,
    },
}

/// Organization subcommands.
#[derive(Subcommand, Debug)]
pub enum OrgCommand {
    /// List your organizations
    List,

    /// Switch the active organization
    Switch {
        /// Organization ID to switch to
        id: i64,
    },

    /// Create a new organization
    Create(org::CreateArgs),
}

/// Map a client error to a CLI-facing one.
///
/// `fallback` is the per-operation message used when the server gave
/// nothing better; an expired session gets a re-login hint instead.
pub fn operation_error(err: &ApiError, fallback: &str) -> anyhow::Error {
    if matches!(err, ApiError::SessionExpired) {
        anyhow::anyhow!("session expired, run `zbooks login`")
    } else {
        anyhow::anyhow!("{}", err.display_message(fallback))
    }
}
