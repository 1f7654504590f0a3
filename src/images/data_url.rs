//! `data:<mime>;base64,<payload>` parsing

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::GatewayError;

static DATA_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:([^;]+);base64,(.+)$").unwrap());

/// A base64 image carried inline in a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    /// Still base64-encoded
    pub data: String,
}

impl DataUrl {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Split a data URL into mime type and payload.
///
/// The payload is passed through as-is; the model decides what it accepts.
///
/// # Examples
/// ```
/// use washd::images::parse_data_url;
///
/// let parsed = parse_data_url("data:image/png;base64,QUJD").unwrap();
/// assert_eq!(parsed.mime_type, "image/png");
/// assert_eq!(parsed.data, "QUJD");
///
/// assert!(parse_data_url("QUJD").is_err());
/// ```
pub fn parse_data_url(input: &str) -> Result<DataUrl, GatewayError> {
    let captures = DATA_URL_REGEX
        .captures(input)
        .ok_or(GatewayError::InvalidDataUrl)?;

    Ok(DataUrl::new(&captures[1], &captures[2]))
}
