//! Bubble text compositor: letters dialogue and monologue into the first
//! detected speech and thought bubble of a panel's artwork.
//!
//! Never fails. Anything that goes wrong (bad base64, undecodable image, JPEG
//! encode error) is logged and the original artwork comes back untouched.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::{fit_text, BitmapFont};
use crate::models::Artwork;
use crate::typeset::cleanup::clean_text;
use crate::typeset::raster::{draw_layout, INK};
use crate::typeset::{Bubble, BubbleKind};

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
enum CompositeError {
    #[error("artwork payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Letters `dialogue` into the first speech bubble and `monologue` into the
/// first thought bubble. Returns the input unchanged when there is nothing to
/// draw or the artwork cannot be processed.
pub fn compose(image: &Artwork, dialogue: &str, monologue: &str, bubbles: &[Bubble]) -> Artwork {
    let jobs = lettering_jobs(dialogue, monologue, bubbles);
    if jobs.is_empty() {
        debug!("no bubble/text pairs to letter");
        return image.clone();
    }

    match letter(image, &jobs) {
        Ok(lettered) => lettered,
        Err(e) => {
            warn!("typesetting skipped, keeping original artwork: {e}");
            image.clone()
        }
    }
}

/// Pairs each non-empty text with the first bubble of its kind.
fn lettering_jobs(dialogue: &str, monologue: &str, bubbles: &[Bubble]) -> Vec<(String, Bubble)> {
    [
        (BubbleKind::Speech, clean_text(dialogue)),
        (BubbleKind::Thought, clean_text(monologue)),
    ]
    .into_iter()
    .filter(|(_, text)| !text.is_empty())
    .filter_map(|(kind, text)| {
        bubbles
            .iter()
            .find(|b| b.kind == kind)
            .map(|bubble| (text, *bubble))
    })
    .collect()
}

fn letter(image: &Artwork, jobs: &[(String, Bubble)]) -> Result<Artwork, CompositeError> {
    let bytes = image.decode()?;
    let mut canvas = image::load_from_memory(&bytes)?.to_rgba8();
    let font = BitmapFont;

    for (text, bubble) in jobs {
        match fit_text(text, bubble.bounds(), &font) {
            Some(layout) => {
                debug!(
                    "lettering {:?} bubble at {}px: {:?}",
                    bubble.kind,
                    layout.font_size,
                    layout.line_texts()
                );
                if layout.overflows {
                    debug!(
                        "lettering overflows {:?} bubble at {}px",
                        bubble.kind, layout.font_size
                    );
                }
                draw_layout(&mut canvas, &layout, &font, INK);
            }
            None => debug!("{:?} bubble too small to letter", bubble.kind),
        }
    }

    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut encoded = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&rgb)?;

    Ok(Artwork::from_jpeg_bytes(&encoded.into_inner()))
}
