//! Background-removal gateway
//!
//! Provides:
//! - Data URL parsing for inbound images
//! - Background removal via the Gemini image model

mod background;
mod data_url;

use thiserror::Error;

use crate::gemini::GeminiError;

pub use background::{
    extract_image, remove_background, EditedImage, DEFAULT_MIME_TYPE, REMOVE_BACKGROUND_PROMPT,
};
pub use data_url::{parse_data_url, DataUrl};

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid image data URL format")]
    InvalidDataUrl,

    #[error("No response from AI model")]
    NoResponse,

    #[error("No image generated in response")]
    NoImage,

    #[error(transparent)]
    Upstream(#[from] GeminiError),
}
