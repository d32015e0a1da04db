//! Wire types shared by the collaborators and the dashboard state.
//!
//! Field names follow the backend's JSON exactly (`message_id`,
//! `physician_id`, ...), so the structs deserialize straight from the
//! `/messages/` and `/classify/{id}` payloads.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identity of a message record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

// =============================================================================
// MESSAGE RECORD
// =============================================================================

/// A single message as served by the listing endpoint. Immutable once received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub physician_id: i64,
    pub message_text: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub compliance_tag: Option<String>,
    #[serde(default)]
    pub delivery_status: Option<String>,
    #[serde(default)]
    pub response_latency_sec: Option<f64>,
}

/// Creation time of a record: either an ISO-8601 string or epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(f64),
    Text(String),
}

impl Timestamp {
    /// Render as `YYYY-MM-DD HH:MM:SS` in UTC.
    ///
    /// Offset-less ISO strings (the backend's naive datetimes) are read as
    /// UTC. Anything unparseable is returned verbatim.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        let parsed = match self {
            Self::EpochMillis(ms) => from_epoch_millis(*ms),
            Self::Text(raw) => parse_iso(raw),
        };
        parsed
            .and_then(|dt| {
                dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
                    .ok()
            })
            .unwrap_or_else(|| self.raw())
    }

    fn raw(&self) -> String {
        match self {
            Self::EpochMillis(ms) => ms.to_string(),
            Self::Text(raw) => raw.clone(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn from_epoch_millis(ms: f64) -> Option<OffsetDateTime> {
    if !ms.is_finite() {
        return None;
    }
    let nanos = (ms * 1_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

fn parse_iso(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(&format!("{raw}Z"), &Rfc3339))
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
}

/// Sentiment label. Unknown labels are kept as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    Other(String),
}

impl Sentiment {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Sentiment {
    fn from(label: String) -> Self {
        match label.as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Other(label),
        }
    }
}

impl From<Sentiment> for String {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RESPONSE ENVELOPES
// =============================================================================

/// `GET /messages/` response body. A missing or null `data` field means no records.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessagesPage {
    #[serde(default)]
    pub data: Option<Vec<Message>>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// `POST /classify/{id}` response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub message: String,
}

// =============================================================================
// LIST QUERY
// =============================================================================

/// Constraints applied to a list fetch. All-`None` means unfiltered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub physician: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ListQuery {
    #[must_use]
    pub fn unfiltered() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_physician(physician: impl Into<String>) -> Self {
        Self { physician: Some(physician.into()), ..Self::default() }
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.physician.is_none() && self.from.is_none() && self.to.is_none()
    }

    /// Query-string pairs using the backend's parameter names.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::new();
        if let Some(physician) = &self.physician {
            params.push(("physician", physician.as_str()));
        }
        if let Some(from) = &self.from {
            params.push(("fromDate", from.as_str()));
        }
        if let Some(to) = &self.to {
            params.push(("toDate", to.as_str()));
        }
        params
    }
}

impl fmt::Display for ListQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unfiltered() {
            return f.write_str("unfiltered");
        }
        let pairs = self
            .params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>();
        f.write_str(&pairs.join("&"))
    }
}
