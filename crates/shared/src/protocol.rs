use std::num::NonZeroU64;

use serde::{Deserialize, Serialize, Serializer};

use crate::{domain::Record, error::QueryError};

/// Geographic narrowing of the dataset. A district is always scoped to a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum GeoFilter {
    #[default]
    All,
    State(String),
    District { state: String, district: String },
}

impl GeoFilter {
    /// Builds a filter from optional parts; empty strings count as absent.
    pub fn from_parts(state: Option<&str>, district: Option<&str>) -> Result<Self, QueryError> {
        let state = state.filter(|value| !value.is_empty());
        let district = district.filter(|value| !value.is_empty());
        match (state, district) {
            (None, None) => Ok(Self::All),
            (Some(state), None) => Ok(Self::State(state.to_string())),
            (Some(state), Some(district)) => Ok(Self::District {
                state: state.to_string(),
                district: district.to_string(),
            }),
            (None, Some(_)) => Err(QueryError::DistrictWithoutState),
        }
    }

    pub fn state(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::State(state) | Self::District { state, .. } => Some(state),
        }
    }

    pub fn district(&self) -> Option<&str> {
        match self {
            Self::District { district, .. } => Some(district),
            _ => None,
        }
    }
}

/// Offset/limit window. The offset is always a multiple of the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    offset: u64,
    limit: u64,
}

impl PageWindow {
    pub fn new(offset: u64, limit: u64) -> Result<Self, QueryError> {
        if limit == 0 {
            return Err(QueryError::ZeroLimit);
        }
        if offset % limit != 0 {
            return Err(QueryError::MisalignedOffset { offset, limit });
        }
        Ok(Self { offset, limit })
    }

    pub const fn start(limit: NonZeroU64) -> Self {
        Self {
            offset: 0,
            limit: limit.get(),
        }
    }

    pub fn with_offset(self, offset: u64) -> Result<Self, QueryError> {
        Self::new(offset, self.limit)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn next(self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }

    pub fn previous(self) -> Option<Self> {
        let offset = self.offset.checked_sub(self.limit)?;
        Some(Self {
            offset,
            limit: self.limit,
        })
    }
}

/// Parameters of one paged query. Serializes to the gateway's query string
/// keys; filter keys are omitted when the dimension is unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pub filter: GeoFilter,
    pub window: PageWindow,
}

impl QueryParams {
    pub fn new(filter: GeoFilter, window: PageWindow) -> Self {
        Self { filter, window }
    }

    pub fn offset(&self) -> u64 {
        self.window.offset()
    }

    pub fn limit(&self) -> u64 {
        self.window.limit()
    }
}

#[derive(Serialize)]
struct WireQuery<'a> {
    offset: u64,
    limit: u64,
    #[serde(rename = "filters[state]", skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(rename = "filters[district]", skip_serializing_if = "Option::is_none")]
    district: Option<&'a str>,
}

impl Serialize for QueryParams {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WireQuery {
            offset: self.window.offset(),
            limit: self.window.limit(),
            state: self.filter.state(),
            district: self.filter.district(),
        }
        .serialize(serializer)
    }
}

/// Body of the paged records endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub data: Vec<Record>,
}

/// One page of records plus the server's count for the whole filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub records: Vec<Record>,
    pub total: u64,
}

impl From<RecordsResponse> for ResultPage {
    fn from(value: RecordsResponse) -> Self {
        Self {
            records: value.data,
            total: value.total,
        }
    }
}
