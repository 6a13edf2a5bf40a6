//! Query encoder: turns validated filters into a request URL or JSON body.
//!
//! # Design
//! Output is a pure function of the inputs. Query parameters are emitted in
//! the endpoint's `accepted` order; list values become one comma-joined
//! parameter with each element escaped individually, so the delimiter itself
//! stays literal. Fields that appear in the path template are spliced into
//! the path and never repeated in the query.

use serde::Serialize;
use url::form_urlencoded;

use crate::config::parse_base_url;
use crate::endpoint::{Endpoint, Segment};
use crate::enums::{Language, Organization, SearchSort, VideoType};
use crate::error::ApiError;
use crate::filter::{Filters, SearchQuery};
use crate::validate::check_path_segment;

/// Render the query string (without the leading `?`) for `endpoint`.
pub fn encode_query(endpoint: Endpoint, filters: &Filters) -> String {
    endpoint
        .descriptor()
        .query_fields()
        .filter_map(|field| {
            let name = field.wire_name()?;
            let tokens = filters.tokens(field);
            if tokens.is_empty() {
                return None;
            }
            let value: Vec<String> = tokens.iter().map(|t| escape(t)).collect();
            Some(format!("{name}={}", value.join(",")))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Absolute URL for `endpoint`: base URL, path template with path fields
/// filled in, and the encoded query string.
pub fn encode_url(base_url: &str, endpoint: Endpoint, filters: &Filters) -> Result<String, ApiError> {
    let mut url =
        parse_base_url(base_url).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        segments.pop_if_empty();
        for segment in endpoint.descriptor().path {
            match segment {
                Segment::Literal(text) => {
                    segments.push(text);
                }
                Segment::Field(field) => {
                    let value = filters.tokens(*field).join(",");
                    check_path_segment(endpoint, *field, &value)?;
                    segments.push(&value);
                }
            }
        }
    }

    let query = encode_query(endpoint, filters);
    url.set_query(if query.is_empty() { None } else { Some(&query) });
    Ok(url.into())
}

#[derive(Serialize)]
struct Condition<'a> {
    text: &'a str,
}

/// Wire shape of the search endpoints' body. Field order is the emission
/// order.
#[derive(Serialize)]
struct SearchBody<'a> {
    sort: SearchSort,
    #[serde(rename = "lang", skip_serializing_if = "Vec::is_empty")]
    languages: Vec<Language>,
    #[serde(rename = "target", skip_serializing_if = "Vec::is_empty")]
    targets: Vec<VideoType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<Condition<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(rename = "topic", skip_serializing_if = "Vec::is_empty")]
    topics: Vec<&'a str>,
    #[serde(rename = "vch", skip_serializing_if = "Vec::is_empty")]
    channel_ids: Vec<&'a str>,
    #[serde(rename = "org", skip_serializing_if = "Vec::is_empty")]
    organizations: Vec<Organization>,
    offset: u32,
    limit: u32,
}

/// Render a search body, filling in the server-side defaults for sort,
/// offset and limit so the request is explicit about them.
pub fn encode_search_body(query: &SearchQuery) -> Result<String, ApiError> {
    fn non_empty(values: &[String]) -> Vec<&str> {
        values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect()
    }

    let body = SearchBody {
        sort: query.sort.unwrap_or(SearchQuery::DEFAULT_SORT),
        languages: query.languages.clone(),
        targets: query.targets.clone(),
        conditions: non_empty(&query.conditions)
            .into_iter()
            .map(|text| Condition { text })
            .collect(),
        comment: query.comment.as_deref().filter(|c| !c.is_empty()),
        topics: non_empty(&query.topics),
        channel_ids: non_empty(&query.channel_ids),
        organizations: query.organizations.clone(),
        offset: query.offset.unwrap_or(SearchQuery::DEFAULT_OFFSET),
        limit: query.limit.unwrap_or(SearchQuery::DEFAULT_LIMIT),
    };
    Ok(serde_json::to_string(&body)?)
}

fn escape(token: &str) -> String {
    form_urlencoded::byte_serialize(token.as_bytes()).collect()
}
