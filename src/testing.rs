//! In-memory stand-ins for Discord and the throttle.

use crate::db::{Credential, MemoryCredentialStore};
use crate::discord::models::{Author, Recipient};
use crate::discord::{Channel, CurrentUser, DiscordApi, DiscordError, Message, PartialGuild};
use crate::state::{AppState, StateRef};
use crate::sweep::Throttle;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::time::Instant;
use twilight_model::{
    channel::ChannelType,
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker},
        Id,
    },
};

/// User id of the account every fake acts as.
pub(crate) const ME: u64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Call {
    CurrentUser,
    Guilds,
    GuildChannels(u64),
    PrivateChannels,
    Messages(u64),
    DeleteMessage(u64, u64),
    LeaveGuild(u64),
    DeleteChannel(u64),
}

impl Call {
    pub(crate) fn is_removal(&self) -> bool {
        matches!(
            self,
            Call::DeleteMessage(..) | Call::LeaveGuild(_) | Call::DeleteChannel(_)
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDiscord {
    user: Option<CurrentUser>,
    guilds: Vec<PartialGuild>,
    guild_channels: HashMap<u64, Vec<Channel>>,
    private_channels: Vec<Channel>,
    messages: HashMap<u64, Vec<Message>>,
    failing: HashMap<Call, u16>,
    calls: Mutex<Vec<(Call, Instant)>>,
}

impl FakeDiscord {
    pub(crate) fn new() -> Self {
        Self {
            user: Some(CurrentUser {
                id: Id::new(ME),
                username: "me".to_string(),
            }),
            ..Default::default()
        }
    }

    pub(crate) fn without_user(mut self) -> Self {
        self.user = None;
        self
    }

    pub(crate) fn guild(mut self, guild_id: u64, channels: Vec<Channel>) -> Self {
        self.guilds.push(PartialGuild {
            id: Id::new(guild_id),
            name: format!("guild {guild_id}"),
        });
        self.guild_channels.insert(guild_id, channels);
        self
    }

    pub(crate) fn private_channel(mut self, channel: Channel) -> Self {
        self.private_channels.push(channel);
        self
    }

    pub(crate) fn messages(mut self, channel_id: u64, messages: Vec<Message>) -> Self {
        self.messages.insert(channel_id, messages);
        self
    }

    pub(crate) fn fail(mut self, call: Call, status: u16) -> Self {
        self.failing.insert(call, status);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.timed_calls().into_iter().map(|(call, _)| call).collect()
    }

    pub(crate) fn timed_calls(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), DiscordError> {
        self.calls.lock().unwrap().push((call.clone(), Instant::now()));
        match self.failing.get(&call) {
            Some(&status) => Err(status_error(status)),
            None => Ok(()),
        }
    }
}

pub(crate) fn status_error(status: u16) -> DiscordError {
    DiscordError::Status {
        status: StatusCode::from_u16(status).unwrap(),
        body: r#"{"message": "fake failure", "code": 0}"#.to_string(),
    }
}

#[async_trait]
impl DiscordApi for FakeDiscord {
    async fn current_user(&self, _token: &str) -> Result<CurrentUser, DiscordError> {
        self.record(Call::CurrentUser)?;
        self.user.clone().ok_or_else(|| status_error(401))
    }

    async fn guilds(&self, _token: &str) -> Result<Vec<PartialGuild>, DiscordError> {
        self.record(Call::Guilds)?;
        Ok(self.guilds.clone())
    }

    async fn guild_channels(
        &self,
        _token: &str,
        guild_id: Id<GuildMarker>,
    ) -> Result<Vec<Channel>, DiscordError> {
        self.record(Call::GuildChannels(guild_id.get()))?;
        self.guild_channels
            .get(&guild_id.get())
            .cloned()
            .ok_or_else(|| status_error(404))
    }

    async fn private_channels(&self, _token: &str) -> Result<Vec<Channel>, DiscordError> {
        self.record(Call::PrivateChannels)?;
        Ok(self.private_channels.clone())
    }

    async fn channel_messages(
        &self,
        _token: &str,
        channel_id: Id<ChannelMarker>,
        limit: u16,
    ) -> Result<Vec<Message>, DiscordError> {
        self.record(Call::Messages(channel_id.get()))?;
        Ok(self
            .messages
            .get(&channel_id.get())
            .map(|messages| messages.iter().take(limit.into()).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_message(
        &self,
        _token: &str,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), DiscordError> {
        self.record(Call::DeleteMessage(channel_id.get(), message_id.get()))
    }

    async fn leave_guild(
        &self,
        _token: &str,
        guild_id: Id<GuildMarker>,
    ) -> Result<(), DiscordError> {
        self.record(Call::LeaveGuild(guild_id.get()))
    }

    async fn delete_channel(
        &self,
        _token: &str,
        channel_id: Id<ChannelMarker>,
    ) -> Result<(), DiscordError> {
        self.record(Call::DeleteChannel(channel_id.get()))
    }
}

/// Counts pauses without sleeping.
#[derive(Debug, Default)]
pub(crate) struct CountingThrottle {
    pauses: AtomicUsize,
}

impl CountingThrottle {
    pub(crate) fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Throttle for CountingThrottle {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn state_with(api: Arc<FakeDiscord>) -> AppState {
    Arc::new(StateRef::new(
        api,
        Arc::new(MemoryCredentialStore::default()),
        Arc::new(CountingThrottle::default()),
    ))
}

pub(crate) async fn stored_credential(state: &StateRef) -> Credential {
    let credential = Credential::new(Id::new(ME), "me".to_string(), "token".to_string());
    state.store.save(&credential).await.unwrap();
    credential
}

fn channel(
    id: u64,
    kind: ChannelType,
    guild_id: Option<u64>,
    recipients: Option<usize>,
) -> Channel {
    Channel {
        id: Id::new(id),
        kind,
        guild_id: guild_id.map(Id::new),
        recipients: recipients.map(|count| {
            (0..count as u64)
                .map(|n| Recipient {
                    id: Id::new(ME + 1 + n),
                })
                .collect()
        }),
    }
}

pub(crate) fn text_channel(id: u64, guild_id: u64) -> Channel {
    channel(id, ChannelType::GuildText, Some(guild_id), None)
}

pub(crate) fn voice_channel(id: u64, guild_id: u64) -> Channel {
    channel(id, ChannelType::GuildVoice, Some(guild_id), None)
}

pub(crate) fn dm(id: u64) -> Channel {
    channel(id, ChannelType::Private, None, Some(1))
}

pub(crate) fn group(id: u64, recipients: usize) -> Channel {
    channel(id, ChannelType::Group, None, Some(recipients))
}

pub(crate) fn message(id: u64, channel_id: u64, author: u64) -> Message {
    Message {
        id: Id::new(id),
        channel_id: Id::new(channel_id),
        author: Author {
            id: Id::new(author),
        },
    }
}
