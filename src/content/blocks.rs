//! Article content blocks and their HTML rendering.
//!
//! Articles carry an ordered sequence of typed blocks authored in the CMS.
//! Each block holds a default-language HTML fragment and, optionally, an
//! Arabic fragment; rendering picks exactly one of the two so the inactive
//! locale's text never leaks into the output.
use serde::{Deserialize, Serialize};

use super::Locale;
use crate::util::escape_html;

// ============================================================================
// Block Types
// ============================================================================

/// A single content block as stored on an article.
///
/// Closed sum over the kinds the CMS emits today; the `Unknown` variant
/// absorbs any kind added later so old deployments skip it instead of
/// failing to deserialize the whole article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(default)]
        text_html: Option<String>,
        #[serde(default)]
        arabic_content: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        alt: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ImageText {
        #[serde(default)]
        text_html: Option<String>,
        #[serde(default)]
        arabic_content: Option<String>,
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        layout: Layout,
    },
    #[serde(rename_all = "camelCase")]
    Carousel {
        #[serde(default)]
        images: Vec<String>,
        /// Legacy single-image field from before the carousel held a list.
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },
    /// Any block kind this build does not know about.
    #[serde(other)]
    Unknown,
}

/// Layout for `imageText` blocks.
///
/// Unrecognized layout strings fall back to `ImgBlock`, matching how the
/// site has always treated anything that is not exactly `img-left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    ImgLeft,
    #[default]
    ImgBlock,
}

impl Layout {
    fn as_str(self) -> &'static str {
        match self {
            Layout::ImgLeft => "img-left",
            Layout::ImgBlock => "img-block",
        }
    }
}

impl Serialize for Layout {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(if tag == "img-left" {
            Layout::ImgLeft
        } else {
            Layout::ImgBlock
        })
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render blocks to HTML fragments for the given locale.
///
/// Lazy: one fragment per input block, input order preserved. Empty input
/// yields an empty iterator. Blocks that have nothing to show (`image` with
/// no reference, unknown kinds) are skipped rather than treated as errors.
pub fn render_blocks(
    blocks: &[ContentBlock],
    locale: Locale,
) -> impl Iterator<Item = String> + '_ {
    blocks.iter().filter_map(move |block| match block {
        ContentBlock::Text {
            text_html,
            arabic_content,
        } => Some(render_text(text_html, arabic_content, locale)),
        ContentBlock::Image {
            image_url,
            caption,
            alt,
        } => render_image(image_url.as_deref(), caption.as_deref(), alt.as_deref()),
        ContentBlock::ImageText {
            text_html,
            arabic_content,
            image_url,
            caption,
            alt,
            layout,
        } => Some(render_image_text(
            text_html,
            arabic_content,
            image_url.as_deref(),
            caption.as_deref(),
            alt.as_deref(),
            *layout,
            locale,
        )),
        ContentBlock::Carousel {
            images,
            image_url,
            caption,
        } => Some(render_carousel(
            images,
            image_url.as_deref(),
            caption.as_deref(),
            locale,
        )),
        ContentBlock::Unknown => None,
    })
}

/// Pick the locale-appropriate fragment: the Arabic fragment only when the
/// locale is Arabic and the fragment exists, otherwise the default one.
fn pick_fragment<'a>(
    text_html: &'a Option<String>,
    arabic_content: &'a Option<String>,
    locale: Locale,
) -> &'a str {
    if locale.is_arabic() {
        if let Some(ar) = arabic_content.as_deref() {
            return ar;
        }
    }
    text_html.as_deref().unwrap_or("")
}

fn render_text(
    text_html: &Option<String>,
    arabic_content: &Option<String>,
    locale: Locale,
) -> String {
    let content = pick_fragment(text_html, arabic_content, locale);
    format!(r#"<div class="article-text">{content}</div>"#)
}

/// `image` blocks require a reference; without one there is nothing to
/// render and the block is skipped. The caption sits outside the image.
fn render_image(image_url: Option<&str>, caption: Option<&str>, alt: Option<&str>) -> Option<String> {
    let url = image_url?;
    let mut html = format!(r#"<figure class="article-image">{}"#, img_tag(url, alt));
    if let Some(caption) = caption {
        html.push_str(&format!(
            r#"<figcaption>{}</figcaption>"#,
            escape_html(caption)
        ));
    }
    html.push_str("</figure>");
    Some(html)
}

fn render_image_text(
    text_html: &Option<String>,
    arabic_content: &Option<String>,
    image_url: Option<&str>,
    caption: Option<&str>,
    alt: Option<&str>,
    layout: Layout,
    locale: Locale,
) -> String {
    let content = pick_fragment(text_html, arabic_content, locale);

    // img-left needs an image to sit beside the text; without one the block
    // degrades to the stacked layout.
    let effective = match layout {
        Layout::ImgLeft if image_url.is_some() => Layout::ImgLeft,
        _ => Layout::ImgBlock,
    };

    match effective {
        Layout::ImgLeft => {
            // image_url is Some here by construction
            let url = image_url.unwrap_or_default();
            let mut figure = format!(r#"<figure>{}"#, img_tag(url, alt));
            if let Some(caption) = caption {
                figure.push_str(&format!(
                    r#"<figcaption>{}</figcaption>"#,
                    escape_html(caption)
                ));
            }
            figure.push_str("</figure>");
            format!(
                r#"<div class="image-text img-left" dir="{}"><div class="article-text">{}</div>{}</div>"#,
                locale.dir(),
                content,
                figure
            )
        }
        Layout::ImgBlock => {
            let mut html = format!(r#"<div class="image-text img-block" dir="{}">"#, locale.dir());
            if let Some(url) = image_url {
                html.push_str(&format!(
                    r#"<figure>{}"#,
                    img_tag(url, alt)
                ));
                if let Some(caption) = caption {
                    html.push_str(&format!(
                        r#"<figcaption>{}</figcaption>"#,
                        escape_html(caption)
                    ));
                }
                html.push_str("</figure>");
            }
            html.push_str(&format!(r#"<div class="article-text">{content}</div>"#));
            html.push_str("</div>");
            html
        }
    }
}

fn render_carousel(
    images: &[String],
    legacy_image_url: Option<&str>,
    caption: Option<&str>,
    locale: Locale,
) -> String {
    // Older articles stored a single image before the carousel held a list;
    // synthesize a one-element carousel from it.
    let legacy: Vec<String>;
    let images = if images.is_empty() {
        match legacy_image_url {
            Some(url) => {
                legacy = vec![url.to_string()];
                &legacy[..]
            }
            None => &[][..],
        }
    } else {
        images
    };

    if images.is_empty() {
        // An empty region reads as a rendering bug; show a placeholder.
        let text = match locale {
            Locale::Ar => "لا توجد صور متاحة.",
            Locale::En => "No images available.",
        };
        return format!(r#"<p class="carousel-empty">{text}</p>"#);
    }

    let mut html = String::from(r#"<div class="carousel">"#);
    for url in images {
        html.push_str(&img_tag(url, None));
    }
    if let Some(caption) = caption {
        html.push_str(&format!(
            r#"<figcaption>{}</figcaption>"#,
            escape_html(caption)
        ));
    }
    html.push_str("</div>");
    html
}

fn img_tag(url: &str, alt: Option<&str>) -> String {
    format!(
        r#"<img src="{}" alt="{}">"#,
        escape_html(url),
        escape_html(alt.unwrap_or("Article image"))
    )
}

// ============================================================================
// Tests
// ============================================================================
