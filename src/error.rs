use std::fmt;

use crate::protocol::CommandStep;
use crate::types::Preset;

#[derive(Debug)]
pub enum Error {
    /// No auth token; call `login` first or supply a stored token.
    NotAuthenticated,
    /// No device selected; call `select_endpoint` first.
    NoEndpoint,
    /// Command needs a reconciled snapshot; call `refresh` first.
    NoSnapshot,
    /// Login rejected by the API.
    Auth { status: u16 },
    /// Transport error on the read/auth path.
    Http(reqwest::Error),
    /// Non-200 on the read endpoint. The last published state is kept.
    Fetch { status: u16, body: String },
    /// Transport error on a write step; the rest of the sequence is
    /// not issued.
    CommandHttp {
        step: CommandStep,
        source: reqwest::Error,
    },
    /// Non-200 on a write step; the rest of the sequence is not issued.
    Command {
        step: CommandStep,
        status: u16,
        body: String,
    },
    /// The preset has no directly settable target temperature.
    UnsettablePreset(Preset),
    /// Temperature writes only apply to the currently active preset.
    PresetNotActive { requested: Preset, active: Preset },
    /// Response body did not match the expected shape.
    Protocol(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotAuthenticated => write!(f, "not authenticated"),
            Error::NoEndpoint => write!(f, "no endpoint selected"),
            Error::NoSnapshot => write!(f, "no device snapshot yet"),
            Error::Auth { status } => write!(f, "login rejected (status {status})"),
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Fetch { status, .. } => write!(f, "fetch failed with status {status}"),
            Error::CommandHttp { step, source } => {
                write!(f, "{} failed: {source}", step.as_str())
            }
            Error::Command { step, status, .. } => {
                write!(f, "{} failed with status {status}", step.as_str())
            }
            Error::UnsettablePreset(preset) => {
                write!(f, "preset {preset} has no settable target temperature")
            }
            Error::PresetNotActive { requested, active } => {
                write!(f, "preset {requested} is not active (current: {active})")
            }
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::CommandHttp { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
