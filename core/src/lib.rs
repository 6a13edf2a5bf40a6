//! Synchronous API client core for the Holodex v2 API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, either by hand or through a [`Transport`], which
//! keeps the core deterministic and testable.
//!
//! # Design
//! - `HolodexClient` is stateless; it holds only its base URL and API key.
//! - Every call runs validate → encode → (transport) → decode. Validation
//!   and encoding are driven by the static [`EndpointDescriptor`] table, so
//!   which filters an endpoint accepts, requires and in what order it emits
//!   them lives in one place.
//! - Response entities keep every optional field as `Option`, so "omitted by
//!   the API" and "empty" stay distinguishable.

pub mod client;
pub mod config;
mod decode;
pub mod encode;
pub mod endpoint;
pub mod enums;
pub mod error;
pub mod filter;
pub mod http;
pub mod types;
pub mod validate;

pub use client::HolodexClient;
pub use config::{ClientConfig, ConfigError};
pub use endpoint::{Endpoint, EndpointDescriptor, Segment};
pub use enums::{
    ChannelType, ExtraInfo, Language, Organization, Relation, SearchSort, SortOrder,
    UnknownVariant, VideoStatus, VideoType,
};
pub use error::ApiError;
pub use filter::{Field, Filters, SearchQuery};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{Channel, Comment, Credit, Credits, Song, Video};
