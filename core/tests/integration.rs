//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through a ureq-backed `Transport`. Validates that
//! request building and response parsing line up with an actual server,
//! including its auth check and error statuses.

use chrono::{TimeZone, Utc};
use holodex_core::{
    ApiError, ChannelType, ClientConfig, Filters, HolodexClient, HttpMethod, HttpRequest,
    HttpResponse, Language, Organization, Relation, SearchQuery, SearchSort, SortOrder, Transport,
    VideoType,
};
use holodex_mock::{FAUNA, PEKORA, SUISEI};

/// Blocking transport over ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data and the client classifies them.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    type Error = ureq::Error;

    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, Self::Error> {
        let mut response = match (req.method, &req.body) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(&req.url);
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Post, body) => {
                let mut builder = self.agent.post(&req.url);
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(body.as_deref().unwrap_or_default().as_bytes())?
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Start the mock server on a random port and return its API base URL.
fn start_mock() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            holodex_mock::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api/v2")
}

fn client(base_url: &str, api_key: &str) -> HolodexClient {
    let config = ClientConfig::new(api_key).with_base_url(base_url).unwrap();
    HolodexClient::new(config)
}

fn ids(videos: &[holodex_core::Video]) -> Vec<&str> {
    videos.iter().map(|v| v.id.as_str()).collect()
}

#[test]
fn every_endpoint_round_trips() {
    let base = start_mock();
    let client = client(&base, "integration-key");
    let http = UreqTransport::new();

    // live
    let live = client.live(&http, &Filters::default()).unwrap();
    assert_eq!(ids(&live), vec!["upcoming0001", "Kkj0Ek7ds8g"]);

    let suisei_live = client.live_for_channel(&http, SUISEI).unwrap();
    assert_eq!(ids(&suisei_live), vec!["Kkj0Ek7ds8g"]);
    assert!(suisei_live[0].is_live());

    // videos with a time range
    let range = Filters {
        from: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
        to: Some(Utc.with_ymd_and_hms(2024, 5, 2, 23, 59, 59).unwrap()),
        ..Filters::default()
    };
    let videos = client.videos(&http, &range).unwrap();
    assert_eq!(ids(&videos), vec!["upcoming0001", "Kkj0Ek7ds8g"]);

    // single channel: counters arrive as both strings and numbers
    let channel = client.channel(&http, SUISEI).unwrap();
    assert_eq!(channel.english_name.as_deref(), Some("Hoshimachi Suisei"));
    assert_eq!(channel.subscriber_count.as_deref(), Some("2110000"));
    assert_eq!(channel.clip_count.as_deref(), Some("7033"));
    assert_eq!(channel.channel_type, Some(ChannelType::Vtuber));

    // channel relations
    let clips = client
        .channel_videos(
            &http,
            &Filters {
                channel_id: Some(SUISEI.to_string()),
                relation: Some(Relation::Clips),
                languages: vec![Language::English],
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&clips), vec!["clip00000002"]);
    assert!(clips[0].is_clip());

    let collabs = client
        .channel_videos(
            &http,
            &Filters {
                channel_id: Some(SUISEI.to_string()),
                relation: Some(Relation::Collabs),
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&collabs), vec!["past00000001"]);

    // live for a channel set
    let users_live = client
        .live_for_channels(
            &http,
            &Filters {
                channel_ids: vec![SUISEI.to_string(), PEKORA.to_string()],
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(users_live.len(), 2);

    // single video with comments
    let video = client
        .video(
            &http,
            &Filters {
                timestamp_comments: Some(true),
                ..Filters::for_video("Kkj0Ek7ds8g")
            },
        )
        .unwrap();
    assert_eq!(video.comments.as_ref().map(Vec::len), Some(2));
    assert_eq!(video.related().count(), 2);
    assert_eq!(video.mentions.as_ref().unwrap()[0].id, FAUNA);
    assert_eq!(video.description.as_deref(), Some("Singing GHOST and more"));

    // channel listing
    let channels = client
        .channels(
            &http,
            &Filters {
                channel_type: Some(ChannelType::Vtuber),
                organization: Some(Organization::Hololive),
                sort_by_field: Some("subscriber_count".to_string()),
                sort_order: Some(SortOrder::Desc),
                ..Filters::default()
            },
        )
        .unwrap();
    let channel_ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(channel_ids, vec![PEKORA, SUISEI, FAUNA]);

    // search
    let found = client
        .search_videos(
            &http,
            &SearchQuery {
                sort: Some(SearchSort::Oldest),
                targets: vec![VideoType::Clip],
                conditions: vec!["ghost".to_string()],
                ..SearchQuery::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&found), vec!["clip00000001", "clip00000002"]);

    let hits = client
        .search_comments(&http, &SearchQuery::comments("ghost"))
        .unwrap();
    assert_eq!(ids(&hits), vec!["Kkj0Ek7ds8g", "past00000001"]);
    assert_eq!(
        hits[0].comments.as_ref().unwrap()[0].message.as_deref(),
        Some("1:02:03 GHOST")
    );
}

#[test]
fn build_and_parse_with_host_io() {
    let base = start_mock();
    let client = client(&base, "integration-key");
    let http = UreqTransport::new();

    let filters = Filters {
        languages: vec![Language::English],
        ..Filters::default()
    };
    let req = client.build_channels(&filters).unwrap();
    assert!(req.url.ends_with("/channels?lang=en"));
    let response = http.send(&req).unwrap();
    assert!(response.headers.iter().any(|(k, _)| k == "content-type"));

    let channels = client.parse_channels(response).unwrap();
    assert!(channels.iter().all(|c| c.lang.as_deref() == Some("en")));
    assert!(!channels.is_empty());
}

#[test]
fn missing_key_is_a_status_error() {
    let base = start_mock();
    let err = client(&base, "")
        .live(&UreqTransport::new(), &Filters::default())
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.is_transport_failure());
}

#[test]
fn unknown_channel_is_404() {
    let base = start_mock();
    let err = client(&base, "integration-key")
        .channel(&UreqTransport::new(), "UCdoesnotexist")
        .unwrap_err();
    match err {
        ApiError::Status { status, url, .. } => {
            assert_eq!(status, 404);
            assert!(url.unwrap().ends_with("/channels/UCdoesnotexist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn refused_connection_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(&format!("http://{addr}/api/v2"), "integration-key")
        .videos(&UreqTransport::new(), &Filters::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
    assert!(!err.to_string().contains("integration-key"));
}
