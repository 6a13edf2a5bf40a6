//! Closed vocabularies shared by filters and response entities.
//!
//! Every enumeration has exactly one canonical wire string. `as_str`,
//! `Display`, `FromStr` and the serde impls all go through that string, so a
//! value renders identically in a query string, a JSON body, and a decoded
//! response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A string did not match any value of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Content language codes understood by the `lang` filter.
    Language {
        English => "en",
        Japanese => "ja",
        Chinese => "zh",
        Korean => "ko",
        Indonesian => "id",
        Spanish => "es",
        Russian => "ru",
        French => "fr",
        German => "de",
        Italian => "it",
        Portuguese => "pt",
    }
}

wire_enum! {
    /// Direction for the `order` query parameter.
    SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
}

wire_enum! {
    /// Ordering for the search endpoints' `sort` body key.
    SearchSort {
        Newest => "newest",
        Oldest => "oldest",
        Longest => "longest",
    }
}

wire_enum! {
    /// Lifecycle state of a video.
    VideoStatus {
        New => "new",
        Upcoming => "upcoming",
        Live => "live",
        Past => "past",
        Missing => "missing",
    }
}

wire_enum! {
    VideoType {
        Stream => "stream",
        Clip => "clip",
        Placeholder => "placeholder",
    }
}

wire_enum! {
    ChannelType {
        Vtuber => "vtuber",
        Subber => "subber",
    }
}

wire_enum! {
    /// Which videos of a channel to list. Rendered as a path segment, never
    /// as a query parameter.
    Relation {
        /// Uploads and streams by the channel itself.
        Videos => "videos",
        /// Clips made about the channel.
        Clips => "clips",
        /// Other channels' videos that mention this one.
        Collabs => "collabs",
    }
}

wire_enum! {
    /// Optional response sections requested through `include`.
    ExtraInfo {
        Clips => "clips",
        Refers => "refers",
        Sources => "sources",
        Simulcasts => "simulcasts",
        Mentions => "mentions",
        Description => "description",
        LiveInfo => "live_info",
        ChannelStats => "channel_stats",
        Songs => "songs",
    }
}

wire_enum! {
    /// Organizations as the API names them. Matching is case-sensitive on
    /// the server, so these keep the API's display casing.
    Organization {
        Hololive => "Hololive",
        Nijisanji => "Nijisanji",
        Independents => "Independents",
        VSpo => "VSpo",
        VShojo => "VShojo",
        PhaseConnect => "Phase Connect",
        IdolCorp => "idol Corp",
        KizunaAi => "Kizuna Ai Inc.",
        Inc774 => "774inc",
        Noripro => "Noripro",
        Prism => "PRISM",
        AtelierLive => "Atelier Live",
    }
}
