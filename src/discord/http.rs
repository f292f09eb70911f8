use super::{Channel, CurrentUser, DiscordApi, DiscordError, Message, PartialGuild};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use twilight_model::id::{
    marker::{ChannelMarker, GuildMarker, MessageMarker},
    Id,
};
use url::Url;

/// [`DiscordApi`] over HTTPS.
#[derive(Clone, Debug)]
pub(crate) struct HttpDiscord {
    client: Client,
    base: Url,
}

impl HttpDiscord {
    /// `base` is the versioned API root, e.g. `https://discord.com/api/v9/`.
    pub(crate) fn new(client: Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    fn endpoint(&self, path: &str) -> Result<Url, DiscordError> {
        Ok(self.base.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, url: Url) -> Result<T, DiscordError> {
        debug!("GET {}", url.path());
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, token)
            .send()
            .await?;
        let body = checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete(&self, token: &str, url: Url) -> Result<(), DiscordError> {
        debug!("DELETE {}", url.path());
        let response = self
            .client
            .delete(url)
            .header(AUTHORIZATION, token)
            .send()
            .await?;
        checked_body(response).await?;
        Ok(())
    }
}

async fn checked_body(response: Response) -> Result<String, DiscordError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DiscordError::Status { status, body });
    }
    Ok(body)
}

#[async_trait]
impl DiscordApi for HttpDiscord {
    async fn current_user(&self, token: &str) -> Result<CurrentUser, DiscordError> {
        self.get(token, self.endpoint("users/@me")?).await
    }

    async fn guilds(&self, token: &str) -> Result<Vec<PartialGuild>, DiscordError> {
        self.get(token, self.endpoint("users/@me/guilds")?).await
    }

    async fn guild_channels(
        &self,
        token: &str,
        guild_id: Id<GuildMarker>,
    ) -> Result<Vec<Channel>, DiscordError> {
        let url = self.endpoint(&format!("guilds/{guild_id}/channels"))?;
        self.get(token, url).await
    }

    async fn private_channels(&self, token: &str) -> Result<Vec<Channel>, DiscordError> {
        self.get(token, self.endpoint("users/@me/channels")?).await
    }

    async fn channel_messages(
        &self,
        token: &str,
        channel_id: Id<ChannelMarker>,
        limit: u16,
    ) -> Result<Vec<Message>, DiscordError> {
        let mut url = self.endpoint(&format!("channels/{channel_id}/messages"))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.get(token, url).await
    }

    async fn delete_message(
        &self,
        token: &str,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), DiscordError> {
        let url = self.endpoint(&format!("channels/{channel_id}/messages/{message_id}"))?;
        self.delete(token, url).await
    }

    async fn leave_guild(
        &self,
        token: &str,
        guild_id: Id<GuildMarker>,
    ) -> Result<(), DiscordError> {
        let url = self.endpoint(&format!("users/@me/guilds/{guild_id}"))?;
        self.delete(token, url).await
    }

    async fn delete_channel(
        &self,
        token: &str,
        channel_id: Id<ChannelMarker>,
    ) -> Result<(), DiscordError> {
        let url = self.endpoint(&format!("channels/{channel_id}"))?;
        self.delete(token, url).await
    }
}
