//! Backend for a bilingual (English/Arabic) content website.
//!
//! Articles are authored in an external CMS and read here: the service
//! exposes an HTTP JSON API for published articles, active categories,
//! reader accounts (profile + recently-read list), and newsletter signup
//! with a best-effort relay to Brevo.
//!
//! Session verification is delegated to a fronting auth proxy which injects
//! the authenticated reader's id as an `x-user-id` header; this service
//! never issues or validates credentials itself.

pub mod config;
pub mod content;
pub mod http;
pub mod relay;
pub mod storage;
pub mod util;
