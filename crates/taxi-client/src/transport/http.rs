//! Booking commands over HTTP.

use reqwest::header::CONTENT_TYPE;
use taxi_proto::{
    BOOKINGS_SEGMENTS, BookingId, CancelBookingReply, CancelBookingRequest, CreateBookingReply,
    CreateBookingRequest, ProtocolError,
};
use url::Url;

use super::{TransportConfig, TransportError, parse_url};
use crate::error::CommandFailure;

/// Longest error body kept in [`CommandFailure::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Client for the booking resource.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBookingApi {
    /// Build a client for `config.api_base_url`.
    ///
    /// Any path in the base URL is kept as a prefix of the booking paths.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let base_url = parse_url(&config.api_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                url: config.api_base_url.clone(),
                reason: "not a hierarchical URL".into(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// `POST /api/bookings`.
    pub async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<CreateBookingReply, CommandFailure> {
        let body = serde_json::to_vec(request).map_err(ProtocolError::from)?;
        let reply = self.post(self.endpoint(None)?, body).await?;
        Ok(CreateBookingReply::from_json(&reply)?)
    }

    /// `POST /api/bookings/{id}`.
    ///
    /// Does not check that `id` refers to a live booking.
    pub async fn cancel_booking(
        &self,
        id: &BookingId,
        request: &CancelBookingRequest,
    ) -> Result<CancelBookingReply, CommandFailure> {
        let body = serde_json::to_vec(request).map_err(ProtocolError::from)?;
        let reply = self.post(self.endpoint(Some(id))?, body).await?;
        Ok(CancelBookingReply::from_json(&reply)?)
    }

    /// Booking collection, or the resource for `id`, under the base URL.
    ///
    /// The id is a single percent-encoded segment.
    fn endpoint(&self, id: Option<&BookingId>) -> Result<Url, CommandFailure> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                CommandFailure::Transport(format!("{} cannot be a base URL", self.base_url))
            })?;
            segments.pop_if_empty().extend(BOOKINGS_SEGMENTS);
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }

    async fn post(&self, url: Url, body: Vec<u8>) -> Result<Vec<u8>, CommandFailure> {
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| CommandFailure::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| CommandFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            let mut body = String::from_utf8_lossy(&bytes).into_owned();
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(CommandFailure::Status { code: status.as_u16(), body });
        }

        Ok(bytes.to_vec())
    }
}
