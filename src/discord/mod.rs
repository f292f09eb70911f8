mod http;
pub(crate) use http::HttpDiscord;

pub(crate) mod models;
pub(crate) use models::{Channel, CurrentUser, Message, PartialGuild};

use async_trait::async_trait;
use reqwest::StatusCode;
use twilight_model::id::{
    marker::{ChannelMarker, GuildMarker, MessageMarker},
    Id,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum DiscordError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("discord returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl DiscordError {
    /// The target no longer exists, e.g. a message removed by a concurrent sweep.
    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, DiscordError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// The subset of the Discord REST API used to sweep an account.
///
/// Every call acts as the owner of `token`, which is sent verbatim in the
/// `Authorization` header.
#[async_trait]
pub(crate) trait DiscordApi: Send + Sync {
    async fn current_user(&self, token: &str) -> Result<CurrentUser, DiscordError>;

    async fn guilds(&self, token: &str) -> Result<Vec<PartialGuild>, DiscordError>;

    async fn guild_channels(
        &self,
        token: &str,
        guild_id: Id<GuildMarker>,
    ) -> Result<Vec<Channel>, DiscordError>;

    /// Direct and group messages of the current user.
    async fn private_channels(&self, token: &str) -> Result<Vec<Channel>, DiscordError>;

    /// Most recent messages of a channel, newest first.
    async fn channel_messages(
        &self,
        token: &str,
        channel_id: Id<ChannelMarker>,
        limit: u16,
    ) -> Result<Vec<Message>, DiscordError>;

    async fn delete_message(
        &self,
        token: &str,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), DiscordError>;

    async fn leave_guild(&self, token: &str, guild_id: Id<GuildMarker>)
        -> Result<(), DiscordError>;

    /// Closes a private channel. For a group this leaves the group.
    async fn delete_channel(
        &self,
        token: &str,
        channel_id: Id<ChannelMarker>,
    ) -> Result<(), DiscordError>;
}
