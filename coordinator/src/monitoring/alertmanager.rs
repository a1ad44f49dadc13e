use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::constants::prometheus;
use crate::errors::{PreconditionError, RemoteError};
use crate::http::client::{read_json, HttpHelper, HttpOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceUnits {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl SilenceUnits {
    pub fn seconds(&self) -> i64 {
        match self {
            SilenceUnits::Minutes => 60,
            SilenceUnits::Hours => 3_600,
            SilenceUnits::Days => 86_400,
            SilenceUnits::Weeks => 604_800,
        }
    }
}

impl fmt::Display for SilenceUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SilenceUnits::Minutes => f.write_str("minutes"),
            SilenceUnits::Hours => f.write_str("hours"),
            SilenceUnits::Days => f.write_str("days"),
            SilenceUnits::Weeks => f.write_str("weeks"),
        }
    }
}

impl FromStr for SilenceUnits {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minutes" => Ok(SilenceUnits::Minutes),
            "hours" => Ok(SilenceUnits::Hours),
            "days" => Ok(SilenceUnits::Days),
            "weeks" => Ok(SilenceUnits::Weeks),
            other => Err(PreconditionError::InvalidUnits {
                units: other.to_string(),
            }),
        }
    }
}

/// How long a new silence lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceWindow {
    pub duration: u64,
    pub units: SilenceUnits,
}

impl SilenceWindow {
    /// End of a silence starting at `starts_at`. Fails when the window does
    /// not fit in a timestamp.
    pub fn ends_at(&self, starts_at: DateTime<Utc>) -> Result<DateTime<Utc>, PreconditionError> {
        i64::try_from(self.duration)
            .ok()
            .and_then(|duration| duration.checked_mul(self.units.seconds()))
            .and_then(TimeDelta::try_seconds)
            .and_then(|window| starts_at.checked_add_signed(window))
            .ok_or(PreconditionError::InvalidDuration {
                duration: self.duration,
                units: self.units.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    pub name: String,
    pub value: String,
    pub is_regex: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostableSilence {
    matchers: Vec<Matcher>,
    starts_at: String,
    ends_at: String,
    comment: String,
    created_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SilenceCreated {
    #[serde(rename = "silenceID")]
    silence_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SilenceStatus {
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Silence {
    pub id: String,
    pub status: SilenceStatus,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
}

impl Silence {
    /// Host this tool silenced: the value of a leading `alias` matcher.
    /// Silences created here carry exactly one matcher.
    pub fn silenced_alias(&self) -> Option<&str> {
        self.matchers
            .first()
            .filter(|m| m.name == prometheus::MATCHER_LABEL)
            .map(|m| m.value.as_str())
    }

    pub fn is_active_patching_silence(&self) -> bool {
        self.status.state == "active" && self.created_by == prometheus::CREATED_BY
    }
}

/// Alertmanager v2 silence API
pub struct AlertmanagerClient {
    http: HttpHelper,
    base_url: String,
}

impl AlertmanagerClient {
    pub fn new(server: &str, port: u16) -> Result<Self, RemoteError> {
        Ok(Self {
            http: HttpHelper::new(HttpOptions::default())?,
            base_url: format!("http://{}:{}/api/v2", server, port),
        })
    }

    /// Silence `target` between the two instants; returns the silence id.
    pub async fn create_silence(
        &self,
        target: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<String, RemoteError> {
        let payload = PostableSilence {
            matchers: vec![Matcher {
                name: prometheus::MATCHER_LABEL.to_string(),
                value: target.to_string(),
                is_regex: false,
            }],
            starts_at: starts_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ends_at: ends_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            comment: format!("Silencing alerts on {} for patching", target),
            created_by: prometheus::CREATED_BY.to_string(),
        };

        let url = format!("{}/silences", self.base_url);
        let created: SilenceCreated = read_json(self.http.post(&url, &payload).await?).await?;
        debug!("Created silence {} for {}", created.silence_id, target);
        Ok(created.silence_id)
    }

    pub async fn list_silences(&self) -> Result<Vec<Silence>, RemoteError> {
        let url = format!("{}/silences", self.base_url);
        read_json(self.http.get(&url).await?).await
    }

    pub async fn delete_silence(&self, silence_id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/silence/{}", self.base_url, silence_id);
        self.http.delete(&url).await?;
        debug!("Expired silence {}", silence_id);
        Ok(())
    }
}
