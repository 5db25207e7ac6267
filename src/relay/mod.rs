//! Best-effort relays to third-party services.

mod brevo;

pub use brevo::{BrevoRelay, RelayOutcome};
