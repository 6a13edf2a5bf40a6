//! In-memory stand-in for the Holodex v2 API.
//!
//! Serves a fixed set of channels and videos under `/api/v2`, applies the
//! filters the real API documents closely enough for end-to-end tests, and
//! rejects requests without an `x-apikey` header.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    pub english_name: Option<String>,
    pub kind: String,
    pub org: Option<String>,
    pub lang: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub clip_count: u64,
    pub published_at: String,
}

#[derive(Clone, Debug)]
pub struct CommentRecord {
    pub comment_key: String,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub topic_id: Option<String>,
    pub lang: String,
    pub status: String,
    pub duration: u64,
    pub available_at: String,
    pub channel_id: String,
    pub description: String,
    /// Ids of the videos a clip was cut from.
    pub sources: Vec<String>,
    /// Ids of channels mentioned in the video.
    pub mentions: Vec<String>,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub channels: Vec<ChannelRecord>,
    pub videos: Vec<VideoRecord>,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    app_with(Store::fixtures())
}

pub fn app_with(store: Store) -> Router {
    let api = Router::new()
        .route("/live", get(live))
        .route("/videos", get(list_videos))
        .route("/videos/{id}", get(get_video))
        .route("/channels", get(list_channels))
        .route("/channels/{id}", get(get_channel))
        .route("/channels/{id}/{relation}", get(channel_videos))
        .route("/users/live", get(users_live))
        .route("/search/videoSearch", post(search_videos))
        .route("/search/commentSearch", post(search_comments))
        .layer(middleware::from_fn(require_api_key))
        .with_state(Arc::new(store));
    Router::new().nest("/api/v2", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let has_key = request
        .headers()
        .get("x-apikey")
        .is_some_and(|v| !v.is_empty());
    if !has_key {
        tracing::warn!(uri = %request.uri(), "request without API key");
        return error(StatusCode::FORBIDDEN, "missing API key");
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub lang: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order: Option<String>,
    pub org: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub channel_id: Option<String>,
    pub id: Option<String>,
    pub include: Option<String>,
    pub mentioned_channel_id: Option<String>,
    pub status: Option<String>,
    pub topic: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub channels: Option<String>,
    pub c: Option<u8>,
}

fn split(value: &Option<String>) -> Vec<&str> {
    value
        .as_deref()
        .map(|v| v.split(',').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn page<T>(items: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl Store {
    fn channel(&self, id: &str) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.id == id)
    }

    fn video(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    fn channel_min(&self, id: &str) -> Value {
        match self.channel(id) {
            Some(c) => json!({
                "id": c.id,
                "name": c.name,
                "english_name": c.english_name,
                "type": c.kind,
                "org": c.org,
            }),
            None => json!({ "id": id }),
        }
    }

    fn render_video(&self, video: &VideoRecord, include: &[&str]) -> Value {
        let mut out = json!({
            "id": video.id,
            "title": video.title,
            "type": video.kind,
            "lang": video.lang,
            "status": video.status,
            "duration": video.duration,
            "available_at": video.available_at,
            "published_at": video.available_at,
            "channel": self.channel_min(&video.channel_id),
        });
        if let Some(topic) = &video.topic_id {
            out["topic_id"] = json!(topic);
        }
        if include.contains(&"description") {
            out["description"] = json!(video.description);
        }
        if include.contains(&"mentions") {
            let mentions: Vec<Value> = video
                .mentions
                .iter()
                .map(|id| self.channel_min(id))
                .collect();
            out["mentions"] = json!(mentions);
        }
        if include.contains(&"clips") {
            let clips: Vec<Value> = self
                .videos
                .iter()
                .filter(|v| v.sources.contains(&video.id))
                .map(|v| self.render_related(v))
                .collect();
            out["clips"] = json!(clips);
        }
        if include.contains(&"sources") {
            let sources: Vec<Value> = video
                .sources
                .iter()
                .filter_map(|id| self.video(id))
                .map(|v| self.render_related(v))
                .collect();
            out["sources"] = json!(sources);
        }
        out
    }

    /// Related items carry a reduced field set.
    fn render_related(&self, video: &VideoRecord) -> Value {
        json!({
            "id": video.id,
            "title": video.title,
            "type": video.kind,
            "lang": video.lang,
            "status": video.status,
            "duration": video.duration,
            "available_at": video.available_at,
            "channel": self.channel_min(&video.channel_id),
        })
    }

    fn render_comments(video: &VideoRecord, comments: &[&CommentRecord]) -> Value {
        let comments: Vec<Value> = comments
            .iter()
            .map(|c| {
                json!({
                    "comment_key": c.comment_key,
                    "video_id": video.id,
                    "message": c.message,
                })
            })
            .collect();
        json!(comments)
    }

    fn render_channel(channel: &ChannelRecord) -> Value {
        json!({
            "id": channel.id,
            "name": channel.name,
            "english_name": channel.english_name,
            "type": channel.kind,
            "org": channel.org,
            "lang": channel.lang,
            // The real API mixes string and numeric counters.
            "subscriber_count": channel.subscriber_count.to_string(),
            "video_count": channel.video_count.to_string(),
            "clip_count": channel.clip_count,
            "published_at": channel.published_at,
            "inactive": false,
        })
    }

    fn filter_videos(&self, params: &ListParams) -> Vec<&VideoRecord> {
        let langs = split(&params.lang);
        let ids = split(&params.id);
        let mut videos: Vec<&VideoRecord> = self
            .videos
            .iter()
            .filter(|v| langs.is_empty() || langs.contains(&v.lang.as_str()))
            .filter(|v| ids.is_empty() || ids.contains(&v.id.as_str()))
            .filter(|v| params.channel_id.as_ref().is_none_or(|c| *c == v.channel_id))
            .filter(|v| params.status.as_ref().is_none_or(|s| *s == v.status))
            .filter(|v| params.kind.as_ref().is_none_or(|k| *k == v.kind))
            .filter(|v| {
                params
                    .topic
                    .as_ref()
                    .is_none_or(|t| v.topic_id.as_ref() == Some(t))
            })
            .filter(|v| {
                params
                    .mentioned_channel_id
                    .as_ref()
                    .is_none_or(|m| v.mentions.contains(m))
            })
            .filter(|v| {
                params.org.as_ref().is_none_or(|org| {
                    self.channel(&v.channel_id)
                        .and_then(|c| c.org.as_ref())
                        .is_some_and(|o| o == org)
                })
            })
            // Timestamps share one format, so string order is time order.
            .filter(|v| params.from.as_ref().is_none_or(|f| v.available_at >= *f))
            .filter(|v| params.to.as_ref().is_none_or(|t| v.available_at <= *t))
            .collect();

        videos.sort_by(|a, b| a.available_at.cmp(&b.available_at));
        if params.order.as_deref() != Some("asc") {
            videos.reverse();
        }
        videos
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn live(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Value>> {
    let include = split(&params.include);
    let videos: Vec<&VideoRecord> = db
        .filter_videos(&params)
        .into_iter()
        .filter(|v| v.status == "live" || v.status == "upcoming")
        .collect();
    let videos = page(videos, params.offset, params.limit);
    Json(videos.into_iter().map(|v| db.render_video(v, &include)).collect())
}

async fn list_videos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Value>> {
    let include = split(&params.include);
    let videos = page(db.filter_videos(&params), params.offset, params.limit);
    Json(videos.into_iter().map(|v| db.render_video(v, &include)).collect())
}

async fn get_video(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, Response> {
    let video = db
        .video(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "video not found"))?;
    let mut out = db.render_video(video, &["description", "mentions", "clips", "sources"]);

    let langs = split(&params.lang);
    if !langs.is_empty() {
        if let Some(clips) = out["clips"].as_array_mut() {
            clips.retain(|c| c["lang"].as_str().is_some_and(|l| langs.contains(&l)));
        }
    }
    if params.c == Some(1) {
        let comments: Vec<&CommentRecord> = video.comments.iter().collect();
        out["comments"] = Store::render_comments(video, &comments);
    }
    Ok(Json(out))
}

async fn list_channels(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Value>> {
    let langs = split(&params.lang);
    let mut channels: Vec<&ChannelRecord> = db
        .channels
        .iter()
        .filter(|c| langs.is_empty() || langs.contains(&c.lang.as_str()))
        .filter(|c| params.kind.as_ref().is_none_or(|k| *k == c.kind))
        .filter(|c| params.org.as_ref().is_none_or(|o| c.org.as_ref() == Some(o)))
        .collect();

    match params.sort.as_deref() {
        Some("subscriber_count") => channels.sort_by_key(|c| c.subscriber_count),
        Some("clip_count") => channels.sort_by_key(|c| c.clip_count),
        Some("name") => channels.sort_by(|a, b| a.name.cmp(&b.name)),
        _ => channels.sort_by(|a, b| a.id.cmp(&b.id)),
    }
    if params.order.as_deref() == Some("desc") {
        channels.reverse();
    }

    let channels = page(channels, params.offset, params.limit);
    Json(channels.into_iter().map(Store::render_channel).collect())
}

async fn get_channel(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, Response> {
    db.channel(&id)
        .map(|c| Json(Store::render_channel(c)))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "channel not found"))
}

async fn channel_videos(
    State(db): State<Db>,
    Path((id, relation)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, Response> {
    if db.channel(&id).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "channel not found"));
    }
    let langs = split(&params.lang);
    let owned_by = |video_id: &String| db.video(video_id).is_some_and(|v| v.channel_id == id);

    let matches: Vec<&VideoRecord> = match relation.as_str() {
        "videos" => {
            if !langs.is_empty() {
                return Err(error(
                    StatusCode::BAD_REQUEST,
                    "lang is only supported for clips and collabs",
                ));
            }
            db.videos
                .iter()
                .filter(|v| v.channel_id == id && v.kind == "stream")
                .collect()
        }
        "clips" => db
            .videos
            .iter()
            .filter(|v| v.kind == "clip" && v.sources.iter().any(owned_by))
            .collect(),
        "collabs" => db
            .videos
            .iter()
            .filter(|v| v.channel_id != id && v.mentions.contains(&id))
            .collect(),
        _ => return Err(error(StatusCode::BAD_REQUEST, "unknown relation")),
    };

    let include = split(&params.include);
    let filtered: Vec<&VideoRecord> = matches
        .into_iter()
        .filter(|v| langs.is_empty() || langs.contains(&v.lang.as_str()))
        .collect();
    let filtered = page(filtered, params.offset, params.limit);
    Ok(Json(
        filtered
            .into_iter()
            .map(|v| db.render_video(v, &include))
            .collect(),
    ))
}

async fn users_live(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, Response> {
    let channels = split(&params.channels);
    if channels.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "channels is required"));
    }
    let videos: Vec<Value> = db
        .videos
        .iter()
        .filter(|v| channels.contains(&v.channel_id.as_str()))
        .filter(|v| v.status == "live" || v.status == "upcoming")
        .map(|v| db.render_video(v, &[]))
        .collect();
    Ok(Json(videos))
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub text: String,
}

/// Search body. `sort`, `offset` and `limit` are mandatory here so tests
/// catch clients that forget to send them.
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub sort: String,
    #[serde(default)]
    pub lang: Vec<String>,
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub comment: Option<String>,
    #[serde(default)]
    pub topic: Vec<String>,
    #[serde(default)]
    pub vch: Vec<String>,
    #[serde(default)]
    pub org: Vec<String>,
    pub offset: usize,
    pub limit: usize,
}

impl Store {
    fn search(&self, body: &SearchBody) -> Vec<&VideoRecord> {
        let mut hits: Vec<&VideoRecord> = self
            .videos
            .iter()
            .filter(|v| body.lang.is_empty() || body.lang.contains(&v.lang))
            .filter(|v| body.target.is_empty() || body.target.contains(&v.kind))
            .filter(|v| {
                body.topic.is_empty()
                    || v.topic_id.as_ref().is_some_and(|t| body.topic.contains(t))
            })
            .filter(|v| body.vch.is_empty() || body.vch.contains(&v.channel_id))
            .filter(|v| {
                body.org.is_empty()
                    || self
                        .channel(&v.channel_id)
                        .and_then(|c| c.org.as_ref())
                        .is_some_and(|o| body.org.contains(o))
            })
            .filter(|v| {
                body.conditions.iter().all(|c| {
                    let needle = c.text.to_lowercase();
                    v.title.to_lowercase().contains(&needle)
                        || v.description.to_lowercase().contains(&needle)
                })
            })
            .collect();

        match body.sort.as_str() {
            "oldest" => hits.sort_by(|a, b| a.available_at.cmp(&b.available_at)),
            "longest" => hits.sort_by(|a, b| b.duration.cmp(&a.duration)),
            _ => hits.sort_by(|a, b| b.available_at.cmp(&a.available_at)),
        }
        hits
    }
}

async fn search_videos(State(db): State<Db>, Json(body): Json<SearchBody>) -> Json<Vec<Value>> {
    let hits = page(db.search(&body), Some(body.offset), Some(body.limit));
    Json(hits.into_iter().map(|v| db.render_video(v, &[])).collect())
}

async fn search_comments(
    State(db): State<Db>,
    Json(body): Json<SearchBody>,
) -> Result<Json<Vec<Value>>, Response> {
    let term = match body.comment.as_deref() {
        Some(term) if !term.is_empty() => term.to_lowercase(),
        _ => return Err(error(StatusCode::BAD_REQUEST, "comment is required")),
    };

    let hits: Vec<Value> = db
        .search(&body)
        .into_iter()
        .filter_map(|video| {
            let matching: Vec<&CommentRecord> = video
                .comments
                .iter()
                .filter(|c| c.message.to_lowercase().contains(&term))
                .collect();
            if matching.is_empty() {
                return None;
            }
            let mut out = db.render_video(video, &[]);
            out["comments"] = Store::render_comments(video, &matching);
            Some(out)
        })
        .skip(body.offset)
        .take(body.limit)
        .collect();
    Ok(Json(hits))
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const SUISEI: &str = "UC5CwaMl1eIgY8h02uZw7u8A";
pub const FAUNA: &str = "UCO_aKKYxn4tvrqPjcTzZ6EQ";
pub const PEKORA: &str = "UC1DCedRgGHBdm81E1llLhOQ";
pub const SUBBER: &str = "UCffTraducciones00000000";
pub const INDIE: &str = "UCindependentClipper0000";

impl Store {
    pub fn fixtures() -> Self {
        fn channel(
            id: &str,
            name: &str,
            english_name: Option<&str>,
            kind: &str,
            org: Option<&str>,
            lang: &str,
            subscriber_count: u64,
        ) -> ChannelRecord {
            ChannelRecord {
                id: id.to_string(),
                name: name.to_string(),
                english_name: english_name.map(str::to_string),
                kind: kind.to_string(),
                org: org.map(str::to_string),
                lang: lang.to_string(),
                subscriber_count,
                video_count: subscriber_count / 2000,
                clip_count: subscriber_count / 300,
                published_at: "2018-03-18T08:32:39.000Z".to_string(),
            }
        }

        let channels = vec![
            channel(SUISEI, "Suisei Channel", Some("Hoshimachi Suisei"), "vtuber", Some("Hololive"), "ja", 2_110_000),
            channel(FAUNA, "Ceres Fauna Ch. hololive-EN", Some("Ceres Fauna"), "vtuber", Some("Hololive"), "en", 940_000),
            channel(PEKORA, "Pekora Ch. 兎田ぺこら", Some("Usada Pekora"), "vtuber", Some("Hololive"), "ja", 2_540_000),
            channel(SUBBER, "F F Traducciones", None, "subber", None, "es", 12_000),
            channel(INDIE, "Indie Clipper", None, "subber", Some("Independents"), "en", 48_000),
        ];

        let videos = vec![
            VideoRecord {
                id: "Kkj0Ek7ds8g".to_string(),
                title: "【歌枠】Karaoke night".to_string(),
                kind: "stream".to_string(),
                topic_id: Some("singing".to_string()),
                lang: "ja".to_string(),
                status: "live".to_string(),
                duration: 0,
                available_at: "2024-05-01T12:00:00.000Z".to_string(),
                channel_id: SUISEI.to_string(),
                description: "Singing GHOST and more".to_string(),
                sources: Vec::new(),
                mentions: vec![FAUNA.to_string()],
                comments: vec![
                    CommentRecord {
                        comment_key: "Ugzehy9JSmcAGL8VQU94AaABAg".to_string(),
                        message: "1:02:03 GHOST".to_string(),
                    },
                    CommentRecord {
                        comment_key: "UgxSecondCommentKey0000AaABAg".to_string(),
                        message: "0:15:00 Stellar Stellar".to_string(),
                    },
                ],
            },
            VideoRecord {
                id: "upcoming0001".to_string(),
                title: "【Minecraft】Building day".to_string(),
                kind: "stream".to_string(),
                topic_id: Some("minecraft".to_string()),
                lang: "ja".to_string(),
                status: "upcoming".to_string(),
                duration: 0,
                available_at: "2024-05-02T10:00:00.000Z".to_string(),
                channel_id: PEKORA.to_string(),
                description: "Building a castle".to_string(),
                sources: Vec::new(),
                mentions: Vec::new(),
                comments: Vec::new(),
            },
            VideoRecord {
                id: "past00000001".to_string(),
                title: "Collab chatting".to_string(),
                kind: "stream".to_string(),
                topic_id: Some("chatting".to_string()),
                lang: "en".to_string(),
                status: "past".to_string(),
                duration: 5400,
                available_at: "2024-04-20T02:00:00.000Z".to_string(),
                channel_id: FAUNA.to_string(),
                description: "Chatting with Suisei".to_string(),
                sources: Vec::new(),
                mentions: vec![SUISEI.to_string()],
                comments: vec![CommentRecord {
                    comment_key: "UgzFaunaCommentKey00000AaABAg".to_string(),
                    message: "12:34 the GHOST story".to_string(),
                }],
            },
            VideoRecord {
                id: "clip00000001".to_string(),
                title: "Suisei canta GHOST [Sub Español]".to_string(),
                kind: "clip".to_string(),
                topic_id: None,
                lang: "es".to_string(),
                status: "past".to_string(),
                duration: 240,
                available_at: "2024-05-03T09:30:00.000Z".to_string(),
                channel_id: SUBBER.to_string(),
                description: "Clip del karaoke".to_string(),
                sources: vec!["Kkj0Ek7ds8g".to_string()],
                mentions: Vec::new(),
                comments: Vec::new(),
            },
            VideoRecord {
                id: "clip00000002".to_string(),
                title: "Suisei's GHOST live [EN sub]".to_string(),
                kind: "clip".to_string(),
                topic_id: None,
                lang: "en".to_string(),
                status: "past".to_string(),
                duration: 300,
                available_at: "2024-05-04T15:00:00.000Z".to_string(),
                channel_id: INDIE.to_string(),
                description: "Karaoke highlight".to_string(),
                sources: vec!["Kkj0Ek7ds8g".to_string()],
                mentions: Vec::new(),
                comments: Vec::new(),
            },
        ];

        Self { channels, videos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_reference_known_channels() {
        let store = Store::fixtures();
        for video in &store.videos {
            assert!(store.channel(&video.channel_id).is_some(), "{}", video.id);
            for id in &video.mentions {
                assert!(store.channel(id).is_some(), "{} mentions {id}", video.id);
            }
            for id in &video.sources {
                assert!(store.video(id).is_some(), "{} sources {id}", video.id);
            }
        }
    }

    #[test]
    fn description_only_with_include() {
        let store = Store::fixtures();
        let video = &store.videos[0];
        assert!(store.render_video(video, &[]).get("description").is_none());
        assert_eq!(
            store.render_video(video, &["description"])["description"],
            "Singing GHOST and more"
        );
    }

    #[test]
    fn channel_counters_mix_strings_and_numbers() {
        let store = Store::fixtures();
        let rendered = Store::render_channel(&store.channels[0]);
        assert!(rendered["subscriber_count"].is_string());
        assert!(rendered["clip_count"].is_number());
    }

    #[test]
    fn live_filter_keeps_order_newest_first() {
        let store = Store::fixtures();
        let videos = store.filter_videos(&ListParams::default());
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["clip00000002", "clip00000001", "upcoming0001", "Kkj0Ek7ds8g", "past00000001"]
        );
    }

    #[test]
    fn split_ignores_empty_tokens() {
        assert_eq!(split(&Some("en,,ja".to_string())), vec!["en", "ja"]);
        assert!(split(&None).is_empty());
    }

    #[test]
    fn search_body_requires_defaults() {
        let missing: Result<SearchBody, _> = serde_json::from_str(r#"{"sort":"newest"}"#);
        assert!(missing.is_err());
        let full: SearchBody =
            serde_json::from_str(r#"{"sort":"newest","offset":0,"limit":30}"#).unwrap();
        assert!(full.lang.is_empty());
        assert!(full.comment.is_none());
    }
}
