//! Background removal through the Gemini image model
//!
//! The image and a fixed instruction go out in one generateContent call; the
//! first inline image in the first candidate comes back as the result.

use tracing::{debug, info};

use super::{DataUrl, GatewayError};
use crate::gemini::{GeminiClient, GenerateContentResponse, Part};

/// Mime type assumed when the caller or the model does not name one
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Instruction sent alongside every image
pub const REMOVE_BACKGROUND_PROMPT: &str = "Remove the background from this image completely and make it transparent. \
Keep only the main subject/foreground of the image. \
The output should be a PNG image with a transparent background. \
Do not add any new elements, just remove the background.";

/// Image returned by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    pub image_base64: String,
    pub mime_type: String,
}

impl EditedImage {
    /// Wrap the result back into a data URL
    pub fn to_data_url(&self) -> DataUrl {
        DataUrl::new(&self.mime_type, &self.image_base64)
    }
}

/// Ask the model to strip the background from a base64 image
pub async fn remove_background(
    gemini: &GeminiClient,
    image_base64: &str,
    mime_type: Option<&str>,
) -> Result<EditedImage, GatewayError> {
    let mime_type = mime_type.unwrap_or(DEFAULT_MIME_TYPE);

    debug!(
        "Requesting background removal ({}, {} base64 chars)",
        mime_type,
        image_base64.len()
    );

    let parts = vec![
        Part::text(REMOVE_BACKGROUND_PROMPT),
        Part::inline(mime_type, image_base64),
    ];
    let response = gemini.generate_content(parts).await?;
    let image = extract_image(response)?;

    info!(
        "Background removed with {} ({})",
        gemini.model(),
        image.mime_type
    );
    Ok(image)
}

/// Pick the first inline image out of a model response
pub fn extract_image(response: GenerateContentResponse) -> Result<EditedImage, GatewayError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .filter(|parts| !parts.is_empty())
        .ok_or(GatewayError::NoResponse)?;

    parts
        .into_iter()
        .find_map(|part| part.inline_data)
        .map(|inline| EditedImage {
            image_base64: inline.data,
            mime_type: inline
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        })
        .ok_or(GatewayError::NoImage)
}
