use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::roblox::{
    DatastoreEntry, DatastoreError, PlayerIdentifier, PlayerLookup, PublishError, RobloxApi,
    RobloxUser, UniverseId, DATASTORE_NAME,
};

/// Base URLs of the Roblox web APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobloxEndpoints {
    pub users: String,
    pub thumbnails: String,
    pub open_cloud: String,
}

impl Default for RobloxEndpoints {
    fn default() -> Self {
        Self {
            users: "https://users.roblox.com".to_string(),
            thumbnails: "https://thumbnails.roblox.com".to_string(),
            open_cloud: "https://apis.roblox.com".to_string(),
        }
    }
}

impl RobloxEndpoints {
    fn usernames_url(&self) -> String {
        format!("{}/v1/usernames/users", self.users)
    }

    fn user_url(&self, user_id: u64) -> String {
        format!("{}/v1/users/{}", self.users, user_id)
    }

    fn avatar_url(&self, user_id: u64) -> String {
        format!(
            "{}/v1/users/avatar?userIds={}&size=420x420&format=Png&isCircular=false",
            self.thumbnails, user_id
        )
    }

    fn topic_url(&self, universe_id: UniverseId, topic: &str) -> String {
        format!(
            "{}/messaging-service/v1/universes/{}/topics/{}",
            self.open_cloud, universe_id, topic
        )
    }

    fn entry_url(&self, universe_id: UniverseId, player_id: u64) -> String {
        format!(
            "{}/datastores/v1/universes/{}/standard-datastores/datastore/entries/entry?datastoreName={}&entryKey={}",
            self.open_cloud, universe_id, DATASTORE_NAME, player_id
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UsernamesRequest<'a> {
    usernames: [&'a str; 1],
    exclude_banned_users: bool,
}

#[derive(Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ApiUser {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiThumbnail {
    image_url: Option<String>,
}

#[derive(Serialize)]
struct PublishBody<'a> {
    message: &'a str,
}

/// reqwest-backed implementation of the Roblox calls.
pub struct RobloxHttpClient {
    client: Client,
    endpoints: RobloxEndpoints,
}

impl RobloxHttpClient {
    pub fn new(endpoints: RobloxEndpoints) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("RobloxBridgeBot/1.0"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, endpoints })
    }

    fn api_key_header(api_key: &str) -> Result<HeaderValue, String> {
        HeaderValue::from_str(api_key).map_err(|e| format!("invalid API key header: {}", e))
    }

    async fn lookup_username(&self, name: &str) -> Result<Option<RobloxUser>, reqwest::Error> {
        let body = UsernamesRequest {
            usernames: [name],
            exclude_banned_users: false,
        };

        let list: DataList<ApiUser> = self
            .client
            .post(self.endpoints.usernames_url())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(list.data.into_iter().next().map(|u| RobloxUser {
            id: u.id,
            name: u.name,
        }))
    }

    async fn lookup_id(&self, user_id: u64) -> Result<Option<RobloxUser>, reqwest::Error> {
        let response = self
            .client
            .get(self.endpoints.user_url(user_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let user: ApiUser = response.error_for_status()?.json().await?;
        Ok(Some(RobloxUser {
            id: user.id,
            name: user.name,
        }))
    }
}

#[async_trait]
impl RobloxApi for RobloxHttpClient {
    async fn validate_player(&self, identifier: &PlayerIdentifier) -> PlayerLookup {
        let result = match identifier {
            PlayerIdentifier::Username(name) => self.lookup_username(name).await,
            PlayerIdentifier::UserId(id) => self.lookup_id(*id).await,
        };

        match result {
            Ok(Some(user)) => PlayerLookup::Found(user),
            Ok(None) => PlayerLookup::NotFound,
            Err(e) => PlayerLookup::Failed(format!("Error with name check API: {}", e)),
        }
    }

    async fn avatar_url(&self, user_id: u64) -> Option<String> {
        let response = match self
            .client
            .get(self.endpoints.avatar_url(user_id))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(user_id, "Avatar lookup failed: {}", e);
                return None;
            }
        };

        let list: DataList<ApiThumbnail> = response.json().await.ok()?;
        list.data.into_iter().next().and_then(|t| t.image_url)
    }

    async fn publish_message(
        &self,
        api_key: &str,
        universe_id: UniverseId,
        topic: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        let key = Self::api_key_header(api_key).map_err(PublishError::Transport)?;

        let response = self
            .client
            .post(self.endpoints.topic_url(universe_id, topic))
            .header("x-api-key", key)
            .header(CONTENT_TYPE, "application/json")
            .json(&PublishBody { message })
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        PublishError::check_response(status, &body)
    }

    async fn write_datastore_entry(
        &self,
        api_key: &str,
        universe_id: UniverseId,
        player_id: u64,
        entry: &DatastoreEntry,
    ) -> Result<serde_json::Value, DatastoreError> {
        let key = Self::api_key_header(api_key).map_err(DatastoreError::Transport)?;

        let response = self
            .client
            .post(self.endpoints.entry_url(universe_id, player_id))
            .header("x-api-key", key)
            .header("content-md5", entry.content_md5.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(entry.body.clone())
            .send()
            .await
            .map_err(|e| DatastoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DatastoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DatastoreError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_urls() {
        let endpoints = RobloxEndpoints::default();

        assert_eq!(
            endpoints.usernames_url(),
            "https://users.roblox.com/v1/usernames/users"
        );
        assert_eq!(
            endpoints.user_url(123456),
            "https://users.roblox.com/v1/users/123456"
        );
        assert_eq!(
            endpoints.topic_url(UniverseId::from(4242), "DTR"),
            "https://apis.roblox.com/messaging-service/v1/universes/4242/topics/DTR"
        );
        assert_eq!(
            endpoints.entry_url(UniverseId::from(4242), 123456),
            "https://apis.roblox.com/datastores/v1/universes/4242/standard-datastores/datastore/entries/entry?datastoreName=DTR_Production001&entryKey=123456"
        );
        assert!(endpoints
            .avatar_url(1)
            .starts_with("https://thumbnails.roblox.com/v1/users/avatar?userIds=1&"));
    }

    #[test]
    fn test_entry_url_targets_production_store() {
        let endpoints = RobloxEndpoints::default();
        let url = reqwest::Url::parse(&endpoints.entry_url(UniverseId::from(4242), 123456)).unwrap();

        assert_eq!(
            url.path(),
            "/datastores/v1/universes/4242/standard-datastores/datastore/entries/entry"
        );
        assert_eq!(
            url.query(),
            Some("datastoreName=DTR_Production001&entryKey=123456")
        );
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_username_request_body() {
        let body = UsernamesRequest {
            usernames: ["Builderman"],
            exclude_banned_users: false,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"usernames":["Builderman"],"excludeBannedUsers":false}"#
        );
    }

    #[test]
    fn test_publish_body_wraps_payload_string() {
        let body = PublishBody {
            message: r#"{"Method":"Shutdown"}"#,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"message":"{\"Method\":\"Shutdown\"}"}"#
        );
    }

    #[test]
    fn test_thumbnail_response_parsing() {
        let list: DataList<ApiThumbnail> = serde_json::from_str(
            r#"{"data":[{"targetId":1,"state":"Completed","imageUrl":"https://tr.rbxcdn.com/a.png"}]}"#,
        )
        .unwrap();
        assert_eq!(
            list.data[0].image_url.as_deref(),
            Some("https://tr.rbxcdn.com/a.png")
        );

        let empty: DataList<ApiUser> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(empty.data.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_lookup_failure() {
        let client = RobloxHttpClient::new(RobloxEndpoints {
            users: "http://127.0.0.1:9".to_string(),
            thumbnails: "http://127.0.0.1:9".to_string(),
            open_cloud: "http://127.0.0.1:9".to_string(),
        })
        .unwrap();

        let lookup = client
            .validate_player(&PlayerIdentifier::Username("x".to_string()))
            .await;
        assert!(matches!(lookup, PlayerLookup::Failed(ref m) if m.starts_with("Error with name check API")));
        assert_eq!(client.avatar_url(1).await, None);

        let publish = client.publish_message("k", UniverseId::from(1), "DTR", "{}").await;
        assert!(matches!(publish, Err(PublishError::Transport(_))));
    }
}
