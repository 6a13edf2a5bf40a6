//! Static descriptors for every Holodex operation the client speaks.
//!
//! A descriptor fixes the HTTP method, the path template, which filters the
//! endpoint accepts and which it requires. `accepted` is also the order in
//! which query parameters are emitted, so the same `Filters` always encodes
//! to the same bytes.

use std::fmt;

use crate::filter::Field;
use crate::http::HttpMethod;

/// One piece of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    /// Filled from the named filter, which is then not sent as a query
    /// parameter.
    Field(Field),
}

#[derive(Debug)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static [Segment],
    pub accepted: &'static [Field],
    pub required: &'static [Field],
}

impl EndpointDescriptor {
    pub fn accepts(&self, field: Field) -> bool {
        self.accepted.contains(&field)
    }

    pub fn requires(&self, field: Field) -> bool {
        self.required.contains(&field)
    }

    pub fn in_path(&self, field: Field) -> bool {
        self.path.contains(&Segment::Field(field))
    }

    /// Accepted fields that travel in the query string, in emission order.
    pub fn query_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.accepted
            .iter()
            .copied()
            .filter(move |field| !self.in_path(*field))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /live`
    Live,
    /// `GET /videos`
    Videos,
    /// `GET /channels/{channel_id}`
    Channel,
    /// `GET /channels/{channel_id}/{relation}`
    ChannelVideos,
    /// `GET /users/live`
    UsersLive,
    /// `GET /videos/{video_id}`
    Video,
    /// `GET /channels`
    Channels,
    /// `POST /search/videoSearch`
    SearchVideos,
    /// `POST /search/commentSearch`
    SearchComments,
}

const LIVE_FIELDS: &[Field] = &[
    Field::Languages,
    Field::Limit,
    Field::Offset,
    Field::SortOrder,
    Field::Organization,
    Field::SortByField,
    Field::ChannelId,
    Field::VideoId,
    Field::ExtraInfo,
    Field::MaxUpcomingHours,
    Field::MentionedChannelId,
    Field::Status,
    Field::Topic,
    Field::VideoType,
];

const VIDEOS_FIELDS: &[Field] = &[
    Field::Languages,
    Field::Limit,
    Field::Offset,
    Field::SortOrder,
    Field::Organization,
    Field::SortByField,
    Field::ChannelId,
    Field::VideoId,
    Field::ExtraInfo,
    Field::MaxUpcomingHours,
    Field::MentionedChannelId,
    Field::Status,
    Field::Topic,
    Field::VideoType,
    Field::From,
    Field::To,
];

static LIVE: EndpointDescriptor = EndpointDescriptor {
    name: "live",
    method: HttpMethod::Get,
    path: &[Segment::Literal("live")],
    accepted: LIVE_FIELDS,
    required: &[],
};

static VIDEOS: EndpointDescriptor = EndpointDescriptor {
    name: "videos",
    method: HttpMethod::Get,
    path: &[Segment::Literal("videos")],
    accepted: VIDEOS_FIELDS,
    required: &[],
};

static CHANNEL: EndpointDescriptor = EndpointDescriptor {
    name: "channel",
    method: HttpMethod::Get,
    path: &[Segment::Literal("channels"), Segment::Field(Field::ChannelId)],
    accepted: &[Field::ChannelId],
    required: &[Field::ChannelId],
};

static CHANNEL_VIDEOS: EndpointDescriptor = EndpointDescriptor {
    name: "channel_videos",
    method: HttpMethod::Get,
    path: &[
        Segment::Literal("channels"),
        Segment::Field(Field::ChannelId),
        Segment::Field(Field::Relation),
    ],
    accepted: &[
        Field::ChannelId,
        Field::Relation,
        Field::Languages,
        Field::Limit,
        Field::Offset,
        Field::ExtraInfo,
    ],
    required: &[Field::ChannelId, Field::Relation],
};

static USERS_LIVE: EndpointDescriptor = EndpointDescriptor {
    name: "users_live",
    method: HttpMethod::Get,
    path: &[Segment::Literal("users"), Segment::Literal("live")],
    accepted: &[Field::ChannelIds],
    required: &[Field::ChannelIds],
};

static VIDEO: EndpointDescriptor = EndpointDescriptor {
    name: "video",
    method: HttpMethod::Get,
    path: &[Segment::Literal("videos"), Segment::Field(Field::VideoId)],
    accepted: &[Field::VideoId, Field::TimestampComments, Field::Languages],
    required: &[Field::VideoId],
};

static CHANNELS: EndpointDescriptor = EndpointDescriptor {
    name: "channels",
    method: HttpMethod::Get,
    path: &[Segment::Literal("channels")],
    accepted: &[
        Field::Languages,
        Field::Limit,
        Field::Offset,
        Field::SortOrder,
        Field::Organization,
        Field::SortByField,
        Field::ChannelType,
    ],
    required: &[],
};

static SEARCH_VIDEOS: EndpointDescriptor = EndpointDescriptor {
    name: "search_videos",
    method: HttpMethod::Post,
    path: &[Segment::Literal("search"), Segment::Literal("videoSearch")],
    accepted: &[],
    required: &[],
};

static SEARCH_COMMENTS: EndpointDescriptor = EndpointDescriptor {
    name: "search_comments",
    method: HttpMethod::Post,
    path: &[Segment::Literal("search"), Segment::Literal("commentSearch")],
    accepted: &[Field::Comment],
    required: &[Field::Comment],
};

impl Endpoint {
    pub const ALL: &'static [Endpoint] = &[
        Endpoint::Live,
        Endpoint::Videos,
        Endpoint::Channel,
        Endpoint::ChannelVideos,
        Endpoint::UsersLive,
        Endpoint::Video,
        Endpoint::Channels,
        Endpoint::SearchVideos,
        Endpoint::SearchComments,
    ];

    pub fn descriptor(self) -> &'static EndpointDescriptor {
        match self {
            Endpoint::Live => &LIVE,
            Endpoint::Videos => &VIDEOS,
            Endpoint::Channel => &CHANNEL,
            Endpoint::ChannelVideos => &CHANNEL_VIDEOS,
            Endpoint::UsersLive => &USERS_LIVE,
            Endpoint::Video => &VIDEO,
            Endpoint::Channels => &CHANNELS,
            Endpoint::SearchVideos => &SEARCH_VIDEOS,
            Endpoint::SearchComments => &SEARCH_COMMENTS,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// POST endpoints take a JSON body instead of a query string.
    pub fn has_body(self) -> bool {
        self.descriptor().method == HttpMethod::Post
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
