//! Local image decoding
//!
//! Only the header is read: the preview needs natural dimensions, not
//! pixels.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// Natural pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Read the dimensions of an encoded image
pub fn decode_dimensions(bytes: &[u8]) -> Result<Dimensions, DecodeError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;

    if width == 0 || height == 0 {
        return Err(DecodeError::Empty);
    }

    Ok(Dimensions { width, height })
}
