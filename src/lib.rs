mod client;
mod error;
mod logger;
mod protocol;
mod reconcile;
mod types;

pub use client::{CosaClient, CosaClientBuilder};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use protocol::{CommandStep, DEFAULT_BASE_URL, RawSnapshot};
pub use reconcile::reconcile;
pub use types::*;
