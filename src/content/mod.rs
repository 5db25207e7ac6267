//! Locale-aware rendering of structured article content.

mod blocks;

pub use blocks::{render_blocks, ContentBlock, Layout};

/// Rendering locale for bilingual content.
///
/// Anything that is not exactly `"ar"` renders as English, the same
/// exact-match rule the site's locale routing has always applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        if tag == "ar" {
            Locale::Ar
        } else {
            Locale::En
        }
    }

    pub fn is_arabic(self) -> bool {
        self == Locale::Ar
    }

    /// Text direction attribute value for this locale.
    pub fn dir(self) -> &'static str {
        match self {
            Locale::En => "ltr",
            Locale::Ar => "rtl",
        }
    }
}
