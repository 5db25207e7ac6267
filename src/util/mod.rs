//! Utility functions for common operations.
//!
//! - **Email validation**: shape check for newsletter signup addresses
//! - **HTML escaping**: for plain-text fields interpolated into rendered markup

mod email;
mod html;

pub use email::is_valid_email;
pub use html::escape_html;

/// Maximum accepted length for a slug in request bodies. Anything longer
/// is rejected before touching storage.
pub const MAX_SLUG_LENGTH: usize = 256;
