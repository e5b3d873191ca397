use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::{CalendarProvider, NewEvent};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
// Refresh this long before Google's expiry.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

pub struct GoogleCalendarProvider {
    key: ServiceAccountKey,
    calendar_id: String,
    time_zone: Tz,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleCalendarProvider {
    pub fn new(
        key: ServiceAccountKey,
        calendar_id: String,
        time_zone: Tz,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build calendar HTTP client")?;
        Ok(Self {
            key,
            calendar_id,
            time_zone,
            client,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now().timestamp();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TOKEN_REFRESH_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let claims = Claims {
            iss: &self.key.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .context("invalid service account private key")?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .context("failed to sign service account assertion")?;

        let resp: TokenResponse = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("failed to call Google token endpoint")?
            .error_for_status()
            .context("Google token endpoint returned error")?
            .json()
            .await
            .context("failed to parse Google token response")?;

        tracing::debug!(expires_in = resp.expires_in, "obtained Google access token");
        let value = resp.access_token.clone();
        *cached = Some(CachedToken {
            value: resp.access_token,
            expires_at: now + resp.expires_in,
        });
        Ok(value)
    }

    fn events_url(&self, event_id: Option<&str>) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(CALENDAR_API).context("invalid calendar API base")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("calendar API base cannot have path segments"))?;
            segments.pop_if_empty();
            segments.extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn rfc3339(&self, local: NaiveDateTime) -> anyhow::Result<String> {
        self.time_zone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.to_rfc3339())
            .ok_or_else(|| anyhow::anyhow!("{local} does not exist in {}", self.time_zone))
    }
}

pub fn event_body(event: &NewEvent) -> serde_json::Value {
    let fmt = "%Y-%m-%dT%H:%M:%S";
    json!({
        "summary": event.summary,
        "description": event.description,
        "start": {
            "dateTime": event.start.format(fmt).to_string(),
            "timeZone": event.time_zone,
        },
        "end": {
            "dateTime": event.end.format(fmt).to_string(),
            "timeZone": event.time_zone,
        },
        "attendees": event.attendees.iter().map(|a| json!({
            "email": a.email,
            "displayName": a.display_name,
        })).collect::<Vec<_>>(),
        "reminders": {
            "useDefault": false,
            "overrides": event.reminders,
        },
    })
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn check_availability(
        &self,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> anyhow::Result<bool> {
        let end = start + chrono::Duration::minutes(duration_minutes);
        let token = self.access_token().await?;
        let time_min = self.rfc3339(start)?;
        let time_max = self.rfc3339(end)?;

        let data: serde_json::Value = self
            .client
            .get(self.events_url(None)?)
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .context("failed to query Google Calendar events")?
            .error_for_status()
            .context("Google Calendar events.list returned error")?
            .json()
            .await
            .context("failed to parse Google Calendar events")?;

        let busy = data["items"].as_array().map(|items| items.len()).unwrap_or(0);
        let available = busy == 0;
        tracing::info!(%start, available, "availability check");
        Ok(available)
    }

    async fn create_event(&self, event: &NewEvent) -> anyhow::Result<Option<String>> {
        let token = self.access_token().await?;
        let data: serde_json::Value = self
            .client
            .post(self.events_url(None)?)
            .bearer_auth(token)
            .json(&event_body(event))
            .send()
            .await
            .context("failed to create Google Calendar event")?
            .error_for_status()
            .context("Google Calendar events.insert returned error")?
            .json()
            .await
            .context("failed to parse created event")?;

        let id = data["id"].as_str().unwrap_or_default();
        tracing::info!(event_id = id, "created calendar event");

        let reference = data["htmlLink"]
            .as_str()
            .filter(|l| !l.is_empty())
            .or(Some(id).filter(|i| !i.is_empty()))
            .map(str::to_string);
        Ok(reference)
    }

    async fn cancel_event(&self, event_id: &str) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        self.client
            .delete(self.events_url(Some(event_id))?)
            .bearer_auth(token)
            .send()
            .await
            .context("failed to delete Google Calendar event")?
            .error_for_status()
            .context("Google Calendar events.delete returned error")?;
        tracing::info!(event_id, "cancelled calendar event");
        Ok(())
    }
}
