//! Sparse request inputs: `Filters` for GET endpoints and `SearchQuery` for
//! the POST search endpoints.
//!
//! # Design
//! Every filter is optional. A list field that is empty and a string field
//! that is empty both count as absent, so `Filters::tokens` is the single
//! place that decides what "present" means for validation and encoding.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::enums::{
    ChannelType, ExtraInfo, Language, Organization, Relation, SearchSort, SortOrder, VideoStatus,
    VideoType,
};

/// Names every filter a request can carry.
///
/// The wire name table in [`Field::wire_name`] is what the API expects and
/// must not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ChannelId,
    VideoId,
    Languages,
    Limit,
    Offset,
    SortByField,
    SortOrder,
    Organization,
    Status,
    Topic,
    VideoType,
    ChannelType,
    Relation,
    From,
    To,
    ExtraInfo,
    MentionedChannelId,
    ChannelIds,
    MaxUpcomingHours,
    TimestampComments,
    /// Search term of the comment search body.
    Comment,
}

impl Field {
    /// Every field that can appear in a [`Filters`].
    pub const FILTERS: &'static [Field] = &[
        Field::ChannelId,
        Field::VideoId,
        Field::Languages,
        Field::Limit,
        Field::Offset,
        Field::SortByField,
        Field::SortOrder,
        Field::Organization,
        Field::Status,
        Field::Topic,
        Field::VideoType,
        Field::ChannelType,
        Field::Relation,
        Field::From,
        Field::To,
        Field::ExtraInfo,
        Field::MentionedChannelId,
        Field::ChannelIds,
        Field::MaxUpcomingHours,
        Field::TimestampComments,
    ];

    /// Query parameter (or body key) name. `Relation` only ever appears in
    /// the path and has none.
    pub fn wire_name(self) -> Option<&'static str> {
        let name = match self {
            Field::ChannelId => "channel_id",
            Field::VideoId => "id",
            Field::Languages => "lang",
            Field::Limit => "limit",
            Field::Offset => "offset",
            Field::SortByField => "sort",
            Field::SortOrder => "order",
            Field::Organization => "org",
            Field::Status => "status",
            Field::Topic => "topic",
            Field::VideoType | Field::ChannelType => "type",
            Field::Relation => return None,
            Field::From => "from",
            Field::To => "to",
            Field::ExtraInfo => "include",
            Field::MentionedChannelId => "mentioned_channel_id",
            Field::ChannelIds => "channels",
            Field::MaxUpcomingHours => "max_upcoming_hours",
            Field::TimestampComments => "c",
            Field::Comment => "comment",
        };
        Some(name)
    }

    /// Semantic name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Field::ChannelId => "channel_id",
            Field::VideoId => "video_id",
            Field::Languages => "languages",
            Field::Limit => "limit",
            Field::Offset => "offset",
            Field::SortByField => "sort_by_field",
            Field::SortOrder => "sort_order",
            Field::Organization => "organization",
            Field::Status => "status",
            Field::Topic => "topic",
            Field::VideoType => "video_type",
            Field::ChannelType => "channel_type",
            Field::Relation => "relation",
            Field::From => "from",
            Field::To => "to",
            Field::ExtraInfo => "extra_info",
            Field::MentionedChannelId => "mentioned_channel_id",
            Field::ChannelIds => "channel_ids",
            Field::MaxUpcomingHours => "max_upcoming_hours",
            Field::TimestampComments => "timestamp_comments",
            Field::Comment => "comment",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional filters for the GET endpoints.
///
/// Which fields an endpoint accepts, and which it requires, is described by
/// its [`crate::EndpointDescriptor`]. Deserializes from a sparse JSON object
/// keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filters {
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
    pub languages: Vec<Language>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Response field to sort by, e.g. `available_at` or `subscriber_count`.
    pub sort_by_field: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub organization: Option<Organization>,
    pub status: Option<VideoStatus>,
    pub topic: Option<String>,
    pub video_type: Option<VideoType>,
    pub channel_type: Option<ChannelType>,
    pub relation: Option<Relation>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub extra_info: Vec<ExtraInfo>,
    pub mentioned_channel_id: Option<String>,
    pub channel_ids: Vec<String>,
    pub max_upcoming_hours: Option<u32>,
    /// Ask the single-video endpoint for timestamped comments.
    pub timestamp_comments: Option<bool>,
}

impl Filters {
    pub fn for_channel(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            ..Self::default()
        }
    }

    pub fn for_video(video_id: impl Into<String>) -> Self {
        Self {
            video_id: Some(video_id.into()),
            ..Self::default()
        }
    }

    pub fn is_set(&self, field: Field) -> bool {
        !self.tokens(field).is_empty()
    }

    /// Unescaped value tokens for `field`. Scalars yield at most one token,
    /// lists one per element. An empty result means the field is absent.
    pub fn tokens(&self, field: Field) -> Vec<String> {
        fn text(value: &Option<String>) -> Vec<String> {
            value
                .iter()
                .filter(|v| !v.is_empty())
                .cloned()
                .collect()
        }

        fn display<T: ToString>(value: &Option<T>) -> Vec<String> {
            value.iter().map(ToString::to_string).collect()
        }

        match field {
            Field::ChannelId => text(&self.channel_id),
            Field::VideoId => text(&self.video_id),
            Field::Languages => self.languages.iter().map(ToString::to_string).collect(),
            Field::Limit => display(&self.limit),
            Field::Offset => display(&self.offset),
            Field::SortByField => text(&self.sort_by_field),
            Field::SortOrder => display(&self.sort_order),
            Field::Organization => display(&self.organization),
            Field::Status => display(&self.status),
            Field::Topic => text(&self.topic),
            Field::VideoType => display(&self.video_type),
            Field::ChannelType => display(&self.channel_type),
            Field::Relation => display(&self.relation),
            Field::From => self.from.iter().map(format_timestamp).collect(),
            Field::To => self.to.iter().map(format_timestamp).collect(),
            Field::ExtraInfo => self.extra_info.iter().map(ToString::to_string).collect(),
            Field::MentionedChannelId => text(&self.mentioned_channel_id),
            Field::ChannelIds => self
                .channel_ids
                .iter()
                .filter(|id| !id.is_empty())
                .cloned()
                .collect(),
            Field::MaxUpcomingHours => display(&self.max_upcoming_hours),
            Field::TimestampComments => self
                .timestamp_comments
                .iter()
                .map(|on| String::from(if *on { "1" } else { "0" }))
                .collect(),
            Field::Comment => Vec::new(),
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` offset, e.g.
/// `2019-08-24T14:15:22.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of the video and comment search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchQuery {
    /// Defaults to [`SearchSort::Newest`] when absent.
    pub sort: Option<SearchSort>,
    pub languages: Vec<Language>,
    pub targets: Vec<VideoType>,
    /// Free-text conditions matched against title and description.
    pub conditions: Vec<String>,
    /// Comment search term. Required by comment search, rejected by video
    /// search.
    pub comment: Option<String>,
    pub topics: Vec<String>,
    pub channel_ids: Vec<String>,
    pub organizations: Vec<Organization>,
    /// Defaults to 0 when absent.
    pub offset: Option<u32>,
    /// Defaults to 30 when absent.
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub const DEFAULT_SORT: SearchSort = SearchSort::Newest;
    pub const DEFAULT_OFFSET: u32 = 0;
    pub const DEFAULT_LIMIT: u32 = 30;

    pub fn comments(term: impl Into<String>) -> Self {
        Self {
            comment: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
    }
}
