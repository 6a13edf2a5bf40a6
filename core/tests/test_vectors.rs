//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file lists cases holding an input, the expected request, a
//! simulated response and the expected parse result. Cases that must fail
//! validation carry `expected_build_error` instead; cases whose response must
//! be rejected carry `expected_error`. Results are compared as decoded
//! entities, so key order and numeric-vs-string counters in the fixtures do
//! not matter.

use std::fmt::Debug;

use holodex_core::{
    ApiError, Channel, ClientConfig, Filters, HolodexClient, HttpMethod, HttpRequest,
    HttpResponse, SearchQuery, Video,
};
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "https://holodex.net/api/v2";

fn client() -> HolodexClient {
    HolodexClient::new(ClientConfig::new("test-key"))
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn error_kind(err: &ApiError) -> &'static str {
    match err {
        ApiError::UnsupportedFilter { .. } => "UnsupportedFilter",
        ApiError::MissingRequiredField { .. } => "MissingRequiredField",
        ApiError::IncompatibleFilterCombination { .. } => "IncompatibleFilterCombination",
        ApiError::InvalidPathSegment { .. } => "InvalidPathSegment",
        ApiError::MalformedResponse { .. } => "MalformedResponse",
        ApiError::Serialization(_) => "Serialization",
        ApiError::InvalidBaseUrl(_) => "InvalidBaseUrl",
        ApiError::Status { .. } => "Status",
        ApiError::Transport { .. } => "Transport",
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(
        req.method,
        parse_method(expected["method"].as_str().unwrap()),
        "{name}: method"
    );
    assert_eq!(
        req.url,
        format!("{BASE_URL}{}", expected["url"].as_str().unwrap()),
        "{name}: url"
    );

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Drive every case of one vector file through `build` and `parse`.
fn run_vectors<I, T>(
    raw: &str,
    build: impl Fn(&HolodexClient, &I) -> Result<HttpRequest, ApiError>,
    parse: impl Fn(&HolodexClient, HttpResponse) -> Result<T, ApiError>,
) where
    I: DeserializeOwned,
    T: DeserializeOwned + PartialEq + Debug,
{
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let c = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: I = serde_json::from_value(case["input"].clone())
            .unwrap_or_else(|e| panic!("{name}: bad input: {e}"));

        let built = build(&c, &input);
        if let Some(expected) = case.get("expected_build_error") {
            let err = built.expect_err(name);
            assert_eq!(error_kind(&err), expected.as_str().unwrap(), "{name}: build error");
            continue;
        }
        let req = built.unwrap_or_else(|e| panic!("{name}: build failed: {e}"));
        check_request(name, &req, &case["expected_request"]);

        let result = parse(&c, simulated(case));
        if let Some(expected) = case.get("expected_error") {
            let err = result.expect_err(name);
            assert_eq!(error_kind(&err), expected.as_str().unwrap(), "{name}: parse error");
        } else {
            let parsed = result.unwrap_or_else(|e| panic!("{name}: parse failed: {e}"));
            let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(parsed, expected, "{name}: parsed result");
        }
    }
}

#[test]
fn live_test_vectors() {
    run_vectors::<Filters, Vec<Video>>(
        include_str!("../../test-vectors/live.json"),
        |c, f| c.build_live(f),
        |c, r| c.parse_live(r),
    );
}

#[test]
fn videos_test_vectors() {
    run_vectors::<Filters, Vec<Video>>(
        include_str!("../../test-vectors/videos.json"),
        |c, f| c.build_videos(f),
        |c, r| c.parse_videos(r),
    );
}

#[test]
fn channel_test_vectors() {
    run_vectors::<Filters, Channel>(
        include_str!("../../test-vectors/channel.json"),
        |c, f| c.build_channel(f.channel_id.as_deref().unwrap_or_default()),
        |c, r| c.parse_channel(r),
    );
}

#[test]
fn channel_videos_test_vectors() {
    run_vectors::<Filters, Vec<Video>>(
        include_str!("../../test-vectors/channel_videos.json"),
        |c, f| c.build_channel_videos(f),
        |c, r| c.parse_channel_videos(r),
    );
}

#[test]
fn users_live_test_vectors() {
    run_vectors::<Filters, Vec<Video>>(
        include_str!("../../test-vectors/users_live.json"),
        |c, f| c.build_live_for_channels(f),
        |c, r| c.parse_live_for_channels(r),
    );
}

#[test]
fn video_test_vectors() {
    run_vectors::<Filters, Video>(
        include_str!("../../test-vectors/video.json"),
        |c, f| c.build_video(f),
        |c, r| c.parse_video(r),
    );
}

#[test]
fn channels_test_vectors() {
    run_vectors::<Filters, Vec<Channel>>(
        include_str!("../../test-vectors/channels.json"),
        |c, f| c.build_channels(f),
        |c, r| c.parse_channels(r),
    );
}

#[test]
fn search_videos_test_vectors() {
    run_vectors::<SearchQuery, Vec<Video>>(
        include_str!("../../test-vectors/search_videos.json"),
        |c, q| c.build_search_videos(q),
        |c, r| c.parse_search_videos(r),
    );
}

#[test]
fn search_comments_test_vectors() {
    run_vectors::<SearchQuery, Vec<Video>>(
        include_str!("../../test-vectors/search_comments.json"),
        |c, q| c.build_search_comments(q),
        |c, r| c.parse_search_comments(r),
    );
}

/// The key never leaks through a request's debug output, which is what ends
/// up in logs and panic messages.
#[test]
fn api_key_is_redacted_in_debug_output() {
    let req = client().build_live(&Filters::default()).unwrap();
    let debug = format!("{req:?}");
    assert!(!debug.contains("test-key"), "{debug}");
    assert!(debug.contains("x-apikey"));
}
