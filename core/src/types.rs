//! Response entities for the Holodex API.
//!
//! # Design
//! The server omits fields freely depending on endpoint and `include`, so
//! everything except `id` is an `Option`: an omitted field decodes to `None`,
//! never to an empty string or zero. One `Video` shape covers streams, clips
//! and the related-video lists nested inside a video (`clips`, `sources`,
//! `refers`, `simulcasts`); related entries simply carry fewer fields.
//!
//! Channel counters are kept as strings. The API has sent them both as JSON
//! strings and as numbers, and parsing them is left to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decode::string_or_number;
use crate::enums::{ChannelType, VideoStatus, VideoType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suborg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitch: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_count: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub subscriber_count: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_count: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub clip_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_crawled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yt_uploads_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yt_handle: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yt_name_history: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub video_type: Option<VideoType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
    /// Length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// When the video became (or becomes) watchable. For clips this is the
    /// upload time, for streams the scheduled or actual start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_scheduled: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_actual: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_actual: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_viewers: Option<u64>,
    /// Live translator message counts keyed by language code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_tl_count: Option<BTreeMap<String, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_live_tls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub songcount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clips: Option<Vec<Video>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Video>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refers: Option<Vec<Video>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulcasts: Option<Vec<Video>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<Channel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<Song>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jp_name: Option<String>,
    /// External link of a placeholder entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(
        rename = "placeholderType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub placeholder_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
}

impl Video {
    pub fn is_clip(&self) -> bool {
        self.video_type == Some(VideoType::Clip)
    }

    pub fn is_live(&self) -> bool {
        self.status == Some(VideoStatus::Live)
    }

    /// All related videos (clips, sources, refers, simulcasts) in that order.
    pub fn related(&self) -> impl Iterator<Item = &Video> {
        [&self.clips, &self.sources, &self.refers, &self.simulcasts]
            .into_iter()
            .flatten()
            .flatten()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,
    /// Offset into the video, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunesid: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Who added or edited an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<Credit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<Credit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Credit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn omitted_description_is_none() {
        let video: Video = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(video.description, None);

        let video: Video = serde_json::from_str(r#"{"id":"abc","description":""}"#).unwrap();
        assert_eq!(video.description.as_deref(), Some(""));

        let video: Video = serde_json::from_str(r#"{"id":"abc","description":"hello"}"#).unwrap();
        assert_eq!(video.description.as_deref(), Some("hello"));
    }

    #[test]
    fn counts_accept_strings_and_numbers() {
        let channel: Channel = serde_json::from_str(
            r#"{"id":"UC1","subscriber_count":"1820000","video_count":512,"view_count":null}"#,
        )
        .unwrap();
        assert_eq!(channel.subscriber_count.as_deref(), Some("1820000"));
        assert_eq!(channel.video_count.as_deref(), Some("512"));
        assert_eq!(channel.view_count, None);
        assert_eq!(channel.clip_count, None);
    }

    #[test]
    fn counts_reject_other_json_types() {
        let result: Result<Channel, _> =
            serde_json::from_str(r#"{"id":"UC1","clip_count":{"n":1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn timestamps_require_an_offset() {
        let video: Video =
            serde_json::from_str(r#"{"id":"v","published_at":"2021-03-01T12:00:00.000Z"}"#)
                .unwrap();
        assert_eq!(
            video.published_at,
            Some(Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap())
        );

        let bad: Result<Video, _> =
            serde_json::from_str(r#"{"id":"v","published_at":"2021-03-01 12:00"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn non_utc_offsets_normalize_to_utc() {
        let video: Video =
            serde_json::from_str(r#"{"id":"v","available_at":"2021-03-01T21:00:00.000+09:00"}"#)
                .unwrap();
        assert_eq!(
            video.available_at,
            Some(Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn related_lists_decode_recursively() {
        let video: Video = serde_json::from_str(
            r#"{
                "id": "parent",
                "type": "stream",
                "clips": [{"id": "c1", "type": "clip", "available_at": "2021-03-02T00:00:00.000Z"}],
                "sources": [],
                "simulcasts": [{"id": "s1", "channel": {"id": "UC2", "name": "Other"}}]
            }"#,
        )
        .unwrap();
        let ids: Vec<&str> = video.related().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "s1"]);
        assert!(video.clips.as_ref().unwrap()[0].is_clip());
        assert_eq!(video.sources, Some(Vec::new()));
        assert_eq!(video.refers, None);
        let nested = &video.simulcasts.as_ref().unwrap()[0];
        assert_eq!(nested.channel.as_ref().unwrap().name.as_deref(), Some("Other"));
    }

    #[test]
    fn live_translator_counts_by_language() {
        let video: Video = serde_json::from_str(
            r#"{"id":"v","status":"live","live_tl_count":{"en":12,"es":3}}"#,
        )
        .unwrap();
        assert!(video.is_live());
        let counts = video.live_tl_count.unwrap();
        assert_eq!(counts.get("en"), Some(&12));
        assert_eq!(counts.get("ja"), None);
    }

    #[test]
    fn serializing_skips_absent_fields() {
        let video = Video {
            description: Some("hello".to_string()),
            ..serde_json::from_str(r#"{"id":"v"}"#).unwrap()
        };
        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json, serde_json::json!({"id": "v", "description": "hello"}));
    }

    #[test]
    fn published_at_survives_re_encoding() {
        let video: Video =
            serde_json::from_str(r#"{"id":"v","published_at":"2024-04-30T09:00:00.123Z"}"#)
                .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 4, 30, 9, 0, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(video.published_at, Some(expected));

        let json = serde_json::to_value(&video).unwrap();
        let again: Video = serde_json::from_value(json).unwrap();
        assert_eq!(again.published_at, Some(expected));
        assert_eq!(again.published_at.unwrap().timestamp_subsec_millis(), 123);
    }
}
