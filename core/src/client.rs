//! Stateless HTTP request builder and response parser for the Holodex API.
//!
//! # Design
//! `HolodexClient` holds only its configuration and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! validates and encodes an `HttpRequest`, and a `parse_*` method that
//! consumes an `HttpResponse`. The one-shot methods (`live`, `videos`, ...)
//! chain the two around a caller-supplied [`Transport`].

use redact::Secret;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::decode::decode;
use crate::encode::{encode_search_body, encode_url};
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::filter::{Field, Filters, SearchQuery};
use crate::http::{HttpRequest, HttpResponse, Transport, API_KEY_HEADER};
use crate::types::{Channel, Video};
use crate::validate::{validate_filters, validate_search};

/// Synchronous, stateless client for the Holodex v2 API.
#[derive(Debug, Clone)]
pub struct HolodexClient {
    base_url: String,
    api_key: Secret<String>,
}

impl HolodexClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url,
            api_key: config.api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// `GET /live`: live and upcoming videos.
    pub fn build_live(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::Live, filters)
    }

    /// `GET /live?channel_id=...`: live and upcoming videos of one channel.
    pub fn build_live_for_channel(&self, channel_id: &str) -> Result<HttpRequest, ApiError> {
        if channel_id.is_empty() {
            return Err(ApiError::MissingRequiredField {
                endpoint: Endpoint::Live,
                field: Field::ChannelId,
            });
        }
        self.build_get(Endpoint::Live, &Filters::for_channel(channel_id))
    }

    pub fn build_videos(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::Videos, filters)
    }

    pub fn build_channel(&self, channel_id: &str) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::Channel, &Filters::for_channel(channel_id))
    }

    /// `GET /channels/{channel_id}/{relation}`.
    pub fn build_channel_videos(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::ChannelVideos, filters)
    }

    /// `GET /users/live`: live and upcoming videos for a set of channels.
    pub fn build_live_for_channels(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::UsersLive, filters)
    }

    pub fn build_video(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::Video, filters)
    }

    pub fn build_channels(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.build_get(Endpoint::Channels, filters)
    }

    pub fn build_search_videos(&self, query: &SearchQuery) -> Result<HttpRequest, ApiError> {
        self.build_post(Endpoint::SearchVideos, query)
    }

    pub fn build_search_comments(&self, query: &SearchQuery) -> Result<HttpRequest, ApiError> {
        self.build_post(Endpoint::SearchComments, query)
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    pub fn parse_live(&self, response: HttpResponse) -> Result<Vec<Video>, ApiError> {
        self.parse(Endpoint::Live, response)
    }

    pub fn parse_videos(&self, response: HttpResponse) -> Result<Vec<Video>, ApiError> {
        self.parse(Endpoint::Videos, response)
    }

    pub fn parse_channel(&self, response: HttpResponse) -> Result<Channel, ApiError> {
        self.parse(Endpoint::Channel, response)
    }

    pub fn parse_channel_videos(&self, response: HttpResponse) -> Result<Vec<Video>, ApiError> {
        self.parse(Endpoint::ChannelVideos, response)
    }

    pub fn parse_live_for_channels(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Video>, ApiError> {
        self.parse(Endpoint::UsersLive, response)
    }

    pub fn parse_video(&self, response: HttpResponse) -> Result<Video, ApiError> {
        self.parse(Endpoint::Video, response)
    }

    pub fn parse_channels(&self, response: HttpResponse) -> Result<Vec<Channel>, ApiError> {
        self.parse(Endpoint::Channels, response)
    }

    pub fn parse_search_videos(&self, response: HttpResponse) -> Result<Vec<Video>, ApiError> {
        self.parse(Endpoint::SearchVideos, response)
    }

    /// Videos whose `comments` hold the matching comments.
    pub fn parse_search_comments(&self, response: HttpResponse) -> Result<Vec<Video>, ApiError> {
        self.parse(Endpoint::SearchComments, response)
    }

    // -----------------------------------------------------------------------
    // Round-trip
    // -----------------------------------------------------------------------

    pub fn live<T: Transport>(
        &self,
        transport: &T,
        filters: &Filters,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_live(filters)?;
        self.parse_live(send(transport, Endpoint::Live, &request)?)
    }

    pub fn live_for_channel<T: Transport>(
        &self,
        transport: &T,
        channel_id: &str,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_live_for_channel(channel_id)?;
        self.parse_live(send(transport, Endpoint::Live, &request)?)
    }

    pub fn videos<T: Transport>(
        &self,
        transport: &T,
        filters: &Filters,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_videos(filters)?;
        self.parse_videos(send(transport, Endpoint::Videos, &request)?)
    }

    pub fn channel<T: Transport>(
        &self,
        transport: &T,
        channel_id: &str,
    ) -> Result<Channel, ApiError> {
        let request = self.build_channel(channel_id)?;
        self.parse_channel(send(transport, Endpoint::Channel, &request)?)
    }

    pub fn channel_videos<T: Transport>(
        &self,
        transport: &T,
        filters: &Filters,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_channel_videos(filters)?;
        self.parse_channel_videos(send(transport, Endpoint::ChannelVideos, &request)?)
    }

    pub fn live_for_channels<T: Transport>(
        &self,
        transport: &T,
        filters: &Filters,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_live_for_channels(filters)?;
        self.parse_live_for_channels(send(transport, Endpoint::UsersLive, &request)?)
    }

    pub fn video<T: Transport>(&self, transport: &T, filters: &Filters) -> Result<Video, ApiError> {
        let request = self.build_video(filters)?;
        self.parse_video(send(transport, Endpoint::Video, &request)?)
    }

    pub fn channels<T: Transport>(
        &self,
        transport: &T,
        filters: &Filters,
    ) -> Result<Vec<Channel>, ApiError> {
        let request = self.build_channels(filters)?;
        self.parse_channels(send(transport, Endpoint::Channels, &request)?)
    }

    pub fn search_videos<T: Transport>(
        &self,
        transport: &T,
        query: &SearchQuery,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_search_videos(query)?;
        self.parse_search_videos(send(transport, Endpoint::SearchVideos, &request)?)
    }

    pub fn search_comments<T: Transport>(
        &self,
        transport: &T,
        query: &SearchQuery,
    ) -> Result<Vec<Video>, ApiError> {
        let request = self.build_search_comments(query)?;
        self.parse_search_comments(send(transport, Endpoint::SearchComments, &request)?)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn build_get(&self, endpoint: Endpoint, filters: &Filters) -> Result<HttpRequest, ApiError> {
        validate_filters(endpoint, filters)?;
        let url = encode_url(&self.base_url, endpoint, filters)?;
        tracing::debug!(endpoint = %endpoint, method = "GET", %url, "built request");
        Ok(HttpRequest {
            method: endpoint.descriptor().method,
            url,
            headers: self.headers(false),
            body: None,
        })
    }

    fn build_post(&self, endpoint: Endpoint, query: &SearchQuery) -> Result<HttpRequest, ApiError> {
        validate_search(endpoint, query)?;
        let url = encode_url(&self.base_url, endpoint, &Filters::default())?;
        let body = encode_search_body(query)?;
        tracing::debug!(endpoint = %endpoint, method = "POST", %url, "built request");
        Ok(HttpRequest {
            method: endpoint.descriptor().method,
            url,
            headers: self.headers(true),
            body: Some(body),
        })
    }

    fn headers(&self, json_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if json_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers.push((API_KEY_HEADER.to_string(), self.api_key.expose_secret().clone()));
        headers
    }

    fn parse<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        response: HttpResponse,
    ) -> Result<T, ApiError> {
        check_status(endpoint, None, &response)?;
        let decoded = decode(endpoint, &response.body)?;
        tracing::debug!(endpoint = %endpoint, status = response.status, "decoded response");
        Ok(decoded)
    }
}

/// Hand `request` to the transport, annotating failures with the endpoint
/// and URL.
fn send<T: Transport>(
    transport: &T,
    endpoint: Endpoint,
    request: &HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let response = transport.send(request).map_err(|e| ApiError::Transport {
        endpoint,
        url: request.url.clone(),
        source: Box::new(e),
    })?;
    check_status(endpoint, Some(&request.url), &response)?;
    Ok(response)
}

/// Map non-2xx responses to `ApiError::Status`.
fn check_status(
    endpoint: Endpoint,
    url: Option<&str>,
    response: &HttpResponse,
) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    tracing::warn!(endpoint = %endpoint, status = response.status, url, "non-success status");
    Err(ApiError::Status {
        endpoint,
        url: url.map(str::to_string),
        status: response.status,
        body: response.body.clone(),
    })
}
