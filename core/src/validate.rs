//! Per-endpoint precondition checks, run before anything is encoded.
//!
//! Order of checks: unsupported filters, then required filters, then path
//! ids, then combinations. The first failure wins.

use crate::endpoint::{Endpoint, Segment};
use crate::enums::Relation;
use crate::error::ApiError;
use crate::filter::{Field, Filters, SearchQuery};

pub fn validate_filters(endpoint: Endpoint, filters: &Filters) -> Result<(), ApiError> {
    let descriptor = endpoint.descriptor();

    if let Some(field) = Field::FILTERS
        .iter()
        .copied()
        .find(|f| filters.is_set(*f) && !descriptor.accepts(*f))
    {
        return Err(ApiError::UnsupportedFilter { endpoint, field });
    }

    if let Some(field) = descriptor
        .required
        .iter()
        .copied()
        .find(|f| !filters.is_set(*f))
    {
        return Err(ApiError::MissingRequiredField { endpoint, field });
    }

    for segment in descriptor.path {
        if let Segment::Field(field) = segment {
            check_path_segment(endpoint, *field, &filters.tokens(*field).join(","))?;
        }
    }

    // The API only filters clips and collabs by language.
    if endpoint == Endpoint::ChannelVideos
        && filters.relation == Some(Relation::Videos)
        && filters.is_set(Field::Languages)
    {
        return Err(ApiError::IncompatibleFilterCombination {
            endpoint,
            reason: "language filter only applies to clips and collabs, not videos",
        });
    }

    Ok(())
}

/// Reject values that URL normalization treats as dot-segments.
pub(crate) fn check_path_segment(
    endpoint: Endpoint,
    field: Field,
    value: &str,
) -> Result<(), ApiError> {
    if value == "." || value == ".." {
        return Err(ApiError::InvalidPathSegment {
            endpoint,
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub fn validate_search(endpoint: Endpoint, query: &SearchQuery) -> Result<(), ApiError> {
    let descriptor = endpoint.descriptor();
    if query.has_comment() && !descriptor.accepts(Field::Comment) {
        return Err(ApiError::UnsupportedFilter {
            endpoint,
            field: Field::Comment,
        });
    }
    if descriptor.requires(Field::Comment) && !query.has_comment() {
        return Err(ApiError::MissingRequiredField {
            endpoint,
            field: Field::Comment,
        });
    }
    Ok(())
}
