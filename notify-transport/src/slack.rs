//! Slack Web API sender.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use notify_core::{Recipients, TransportError};
use notify_routing::{Link, MessagePayload, MessageSender};

use crate::error::ClientError;
use crate::github::parse_base_url;

pub const DEFAULT_API_URL: &str = "https://slack.com/api/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct AuthTestDto {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    team: Option<String>,
}

#[derive(Deserialize)]
struct PostMessageDto {
    ts: String,
}

#[derive(Deserialize)]
struct LookupDto {
    user: SlackUserDto,
}

#[derive(Deserialize)]
struct SlackUserDto {
    id: String,
}

/// Posts change notifications to Slack channels.
pub struct SlackSender {
    http: Client,
    token: SecretString,
    api: Url,
}

impl SlackSender {
    pub fn new(token: SecretString) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            token,
            api: parse_base_url(DEFAULT_API_URL)?,
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self, ClientError> {
        self.api = parse_base_url(url)?;
        Ok(self)
    }

    /// Check the token with `auth.test` before anything is sent.
    pub async fn authenticate(self) -> Result<Self, ClientError> {
        let auth: AuthTestDto = self.call("auth.test", &json!({})).await?;
        info!(
            user = auth.user.as_deref().unwrap_or("?"),
            team = auth.team.as_deref().unwrap_or("?"),
            "slack token accepted"
        );
        Ok(self)
    }

    /// Post the notification; returns the message timestamp.
    pub async fn post_notification(
        &self,
        channel: &str,
        payload: &MessagePayload,
    ) -> Result<String, ClientError> {
        let body = json!({
            "channel": channel,
            "text": payload.title,
            "blocks": notification_blocks(payload),
            "unfurl_links": false,
            "unfurl_media": false,
        });
        let posted: PostMessageDto = self.call("chat.postMessage", &body).await?;
        Ok(posted.ts)
    }

    /// Reply in the notification's thread mentioning everyone subscribed.
    pub async fn post_subscribers(
        &self,
        channel: &str,
        thread_ts: &str,
        title: &str,
        recipients: &Recipients,
    ) -> Result<(), ClientError> {
        let mut mentions = Vec::with_capacity(recipients.users.len() + recipients.groups.len());
        for user in &recipients.users {
            mentions.push(self.mention(user).await);
        }
        mentions.extend(recipients.groups.iter().map(|g| format!("@{}", escape(g))));

        let body = json!({
            "channel": channel,
            "thread_ts": thread_ts,
            "text": title,
            "blocks": [{
                "type": "section",
                "text": { "type": "mrkdwn", "text": "*Subscribers:*" },
                "fields": [{ "type": "mrkdwn", "text": mentions.join(", ") }],
            }],
            "unfurl_links": false,
            "unfurl_media": false,
        });
        let _: PostMessageDto = self.call("chat.postMessage", &body).await?;
        Ok(())
    }

    /// `<@ID>` for a user found by e-mail, otherwise the escaped raw entry.
    async fn mention(&self, user: &str) -> String {
        let user = user.trim();
        if !user.contains('@') {
            return escape(user);
        }
        match self.lookup_by_email(user).await {
            Ok(id) => format!("<@{id}>"),
            Err(err) => {
                warn!(user, error = %err, "user lookup failed, mentioning raw address");
                escape(user)
            }
        }
    }

    async fn lookup_by_email(&self, email: &str) -> Result<String, ClientError> {
        let url = self.endpoint("users.lookupByEmail")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|source| ClientError::Http {
                target: "users.lookupByEmail".to_string(),
                source,
            })?;
        let found: LookupDto = unwrap_envelope("users.lookupByEmail", response).await?;
        debug!(email, id = %found.user.id, "resolved slack user");
        Ok(found.user.id)
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, body: &Value) -> Result<T, ClientError> {
        let url = self.endpoint(method)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                target: method.to_string(),
                source,
            })?;
        unwrap_envelope(method, response).await
    }

    fn endpoint(&self, method: &str) -> Result<Url, ClientError> {
        self.api.join(method).map_err(|e| ClientError::Url {
            url: method.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl MessageSender for SlackSender {
    async fn send_message(
        &self,
        destination: &str,
        payload: &MessagePayload,
        recipients: &Recipients,
    ) -> Result<(), TransportError> {
        let ts = self.post_notification(destination, payload).await?;
        if !recipients.is_empty() {
            self.post_subscribers(destination, &ts, &payload.title, recipients)
                .await?;
        }
        Ok(())
    }
}

/// Check HTTP status and Slack's `ok` flag, then decode the rest.
async fn unwrap_envelope<T: DeserializeOwned>(
    method: &'static str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            target: method.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    let value: Value = response.json().await.map_err(|e| ClientError::Decode {
        target: method.to_string(),
        message: e.to_string(),
    })?;
    if value.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        return Err(ClientError::Slack { method, error });
    }
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        target: method.to_string(),
        message: e.to_string(),
    })
}

/// Block Kit rendering of a notification.
pub fn notification_blocks(payload: &MessagePayload) -> Value {
    let mut blocks = vec![json!({
        "type": "header",
        "text": { "type": "plain_text", "text": payload.title },
    })];

    let mut fields = vec![link_field("Source", &payload.source)];
    if let Some(author) = &payload.author {
        fields.push(link_field("Author", author));
    }
    blocks.push(json!({ "type": "section", "fields": fields }));

    if !payload.files.is_empty() {
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": "*Modified files:*" },
            "fields": [{
                "type": "mrkdwn",
                "text": format!("```\n{}\n```", payload.files.join("\n")),
            }],
        }));
    }
    if !payload.message.is_empty() {
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": "*Custom Message:*" },
            "fields": [{ "type": "mrkdwn", "text": payload.message }],
        }));
    }
    Value::Array(blocks)
}

fn link_field(label: &str, link: &Link) -> Value {
    match &link.url {
        Some(url) => json!({
            "type": "mrkdwn",
            "text": format!("*{label}:*\n<{url}|{}>", escape(&link.text)),
        }),
        None => json!({
            "type": "plain_text",
            "text": format!("{label}: {}", link.text),
        }),
    }
}

/// Escape the three characters Slack treats as control sequences.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
