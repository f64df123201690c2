//! Station QR payloads.
//!
//! A QR code carries the participant page URL with a `station=<id>` query
//! parameter, the same shape as a deep link. Encoding and decoding live here
//! so the generator and the scanner cannot drift apart.

use thiserror::Error;
use url::Url;

/// Query parameter naming the station in both QR payloads and deep links.
pub const STATION_PARAM: &str = "station";

/// Failures while building or reading a QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    #[error("`{0}` is not a valid base URL for QR payloads")]
    InvalidBaseUrl(String),
    #[error("QR payload is not a URL")]
    NotAUrl,
    #[error("QR payload has no `station` parameter")]
    MissingStation,
}

/// Symmetric encoder/decoder for station QR payloads.
#[derive(Debug, Clone)]
pub struct QrCodec {
    base: Url,
}

impl QrCodec {
    pub fn new(public_base_url: &str) -> Result<Self, QrError> {
        let base = Url::parse(public_base_url.trim())
            .map_err(|_| QrError::InvalidBaseUrl(public_base_url.to_owned()))?;
        if base.cannot_be_a_base() {
            return Err(QrError::InvalidBaseUrl(public_base_url.to_owned()));
        }
        Ok(Self { base })
    }

    /// Payload to encode into the QR code of `station_id`.
    pub fn encode(&self, station_id: &str) -> String {
        let mut url = self.base.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != STATION_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(STATION_PARAM, station_id);
        url.into()
    }

    /// Extract the station id from scanned text.
    pub fn decode(&self, payload: &str) -> Result<String, QrError> {
        let url = Url::parse(payload.trim()).map_err(|_| QrError::NotAUrl)?;
        url.query_pairs()
            .find(|(key, _)| key == STATION_PARAM)
            .map(|(_, value)| value.trim().to_owned())
            .filter(|id| !id.is_empty())
            .ok_or(QrError::MissingStation)
    }
}

/// File name suggested when downloading the QR image of `station_id`.
pub fn download_file_name(station_id: &str) -> String {
    format!("station-{station_id}.png")
}
