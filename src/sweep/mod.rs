//! Rate limited bulk deletion and bulk leave over a user's Discord account.
//!
//! A sweep resolves its containers, lists one page of messages per container,
//! deletes the ones authored by the credential's owner and pauses after every
//! delete. Failures are recorded in the [`SweepResult`] and never abort the
//! sweep.

mod delay;
pub(crate) use delay::{RandomDelay, Throttle};

mod job;
pub(crate) use job::{run, SweepError, SweepReport, SweepRequest};

mod registry;
pub(crate) use registry::SweepRegistry;

use crate::db::Credential;
use crate::discord::{Channel, DiscordApi, DiscordError, Message};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use twilight_model::{
    channel::ChannelType,
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
        Id,
    },
};

pub(crate) const MESSAGE_PAGE_LIMIT: u16 = 100;

/// Larger groups cannot be left through the API.
pub(crate) const GROUP_LEAVE_MAX_RECIPIENTS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    SingleContainer(Id<ChannelMarker>),
    AllGuildChannels,
    AllDirectMessages,
    /// Guild channels first, then direct messages.
    Everything,
    LeaveGuilds,
    LeaveGroupDms,
}

impl Scope {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Scope::SingleContainer(_) => "single_container",
            Scope::AllGuildChannels => "all_guild_channels",
            Scope::AllDirectMessages => "all_direct_messages",
            Scope::Everything => "everything",
            Scope::LeaveGuilds => "leave_guilds",
            Scope::LeaveGroupDms => "leave_group_dms",
        }
    }
}

/// What a recorded failure was about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Target {
    Guilds,
    PrivateChannels,
    Guild {
        guild_id: Id<GuildMarker>,
    },
    Channel {
        channel_id: Id<ChannelMarker>,
    },
    Message {
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    },
}

/// Result of a single delete or leave call.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done,
    Failed(String),
}

impl From<Result<(), DiscordError>> for Outcome {
    fn from(result: Result<(), DiscordError>) -> Self {
        match result {
            Ok(()) => Outcome::Done,
            Err(error) if error.is_not_found() => Outcome::Failed(format!("already gone: {error}")),
            Err(error) => Outcome::Failed(error.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct SweepFailure {
    pub(crate) target: Target,
    pub(crate) reason: String,
}

/// Aggregate of one sweep. For leave scopes `deleted` counts memberships removed.
#[derive(Clone, Debug, Default, Serialize)]
pub(crate) struct SweepResult {
    pub(crate) attempted: usize,
    pub(crate) deleted: usize,
    pub(crate) failures: Vec<SweepFailure>,
    pub(crate) cancelled: bool,
}

impl SweepResult {
    /// Delete or leave calls that did not succeed.
    pub(crate) fn failed(&self) -> usize {
        self.attempted - self.deleted
    }

    fn record(&mut self, target: Target, outcome: Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Done => self.deleted += 1,
            Outcome::Failed(reason) => {
                warn!(?target, %reason, "call failed, continuing");
                self.failures.push(SweepFailure { target, reason });
            }
        }
    }

    fn skip(&mut self, target: Target, error: DiscordError) {
        warn!(?target, %error, "listing failed, skipping");
        self.failures.push(SweepFailure {
            target,
            reason: error.to_string(),
        });
    }
}

fn can_leave_group(channel: &Channel, user: Id<UserMarker>) -> bool {
    channel.kind == ChannelType::Group
        && channel
            .recipient_count(user)
            .is_some_and(|count| count <= GROUP_LEAVE_MAX_RECIPIENTS)
}

#[derive(Clone)]
pub(crate) struct Sweeper {
    api: Arc<dyn DiscordApi>,
    throttle: Arc<dyn Throttle>,
}

impl Sweeper {
    pub(crate) fn new(api: Arc<dyn DiscordApi>, throttle: Arc<dyn Throttle>) -> Self {
        Self { api, throttle }
    }

    /// Runs `scope` to completion, or until `cancelled` turns true.
    ///
    /// Containers and items are processed one at a time in listing order.
    pub(crate) async fn sweep(
        &self,
        credential: &Credential,
        scope: Scope,
        cancelled: watch::Receiver<bool>,
    ) -> SweepResult {
        info!(
            user_id = credential.user_id.get(),
            scope = scope.name(),
            "starting sweep"
        );
        let mut run = Run {
            api: self.api.as_ref(),
            throttle: self.throttle.as_ref(),
            credential,
            cancelled,
            result: SweepResult::default(),
        };
        match scope {
            Scope::SingleContainer(channel_id) => run.clear_channel(channel_id).await,
            Scope::AllGuildChannels => run.clear_guild_channels().await,
            Scope::AllDirectMessages => run.clear_private_channels().await,
            Scope::Everything => {
                run.clear_guild_channels().await;
                if !run.is_cancelled() {
                    run.clear_private_channels().await;
                }
            }
            Scope::LeaveGuilds => run.leave_guilds().await,
            Scope::LeaveGroupDms => run.leave_groups().await,
        }

        let result = run.result;
        info!(
            user_id = credential.user_id.get(),
            scope = scope.name(),
            attempted = result.attempted,
            deleted = result.deleted,
            failures = result.failures.len(),
            cancelled = result.cancelled,
            "sweep finished"
        );
        result
    }
}

struct Run<'a> {
    api: &'a dyn DiscordApi,
    throttle: &'a dyn Throttle,
    credential: &'a Credential,
    cancelled: watch::Receiver<bool>,
    result: SweepResult,
}

impl Run<'_> {
    fn is_cancelled(&mut self) -> bool {
        if !self.result.cancelled && *self.cancelled.borrow() {
            debug!(user_id = self.credential.user_id.get(), "sweep cancelled");
            self.result.cancelled = true;
        }
        self.result.cancelled
    }

    async fn finish(&mut self, target: Target, outcome: Outcome) {
        self.result.record(target, outcome);
        self.throttle.pause().await;
    }

    async fn clear_channel(&mut self, channel_id: Id<ChannelMarker>) {
        let (api, credential) = (self.api, self.credential);
        let token = credential.token.as_str();

        let messages = match api
            .channel_messages(token, channel_id, MESSAGE_PAGE_LIMIT)
            .await
        {
            Ok(messages) => messages,
            Err(error) => return self.result.skip(Target::Channel { channel_id }, error),
        };
        let own: Vec<Message> = messages
            .into_iter()
            .filter(|message| message.author.id == credential.user_id)
            .collect();
        debug!(
            channel_id = channel_id.get(),
            count = own.len(),
            "deleting own messages"
        );

        for message in own {
            if self.is_cancelled() {
                return;
            }
            let outcome = api
                .delete_message(token, message.channel_id, message.id)
                .await
                .into();
            self.finish(
                Target::Message {
                    channel_id: message.channel_id,
                    message_id: message.id,
                },
                outcome,
            )
            .await;
        }
    }

    async fn clear_guild_channels(&mut self) {
        let (api, credential) = (self.api, self.credential);
        let token = credential.token.as_str();

        let guilds = match api.guilds(token).await {
            Ok(guilds) => guilds,
            Err(error) => return self.result.skip(Target::Guilds, error),
        };
        for guild in guilds {
            if self.is_cancelled() {
                return;
            }
            let channels = match api.guild_channels(token, guild.id).await {
                Ok(channels) => channels,
                Err(error) => {
                    self.result.skip(Target::Guild { guild_id: guild.id }, error);
                    continue;
                }
            };
            debug!(guild_id = guild.id.get(), name = %guild.name, "sweeping guild");
            for channel in channels
                .into_iter()
                .filter(|channel| channel.kind == ChannelType::GuildText)
            {
                if self.is_cancelled() {
                    return;
                }
                debug!(
                    channel_id = channel.id.get(),
                    guild_id = ?channel.guild_id.map(Id::get),
                    "sweeping channel"
                );
                self.clear_channel(channel.id).await;
            }
        }
    }

    async fn clear_private_channels(&mut self) {
        let (api, credential) = (self.api, self.credential);
        let token = credential.token.as_str();

        let channels = match api.private_channels(token).await {
            Ok(channels) => channels,
            Err(error) => return self.result.skip(Target::PrivateChannels, error),
        };
        for channel in channels
            .into_iter()
            .filter(|channel| matches!(channel.kind, ChannelType::Private | ChannelType::Group))
        {
            if self.is_cancelled() {
                return;
            }
            self.clear_channel(channel.id).await;
        }
    }

    async fn leave_guilds(&mut self) {
        let (api, credential) = (self.api, self.credential);
        let token = credential.token.as_str();

        let guilds = match api.guilds(token).await {
            Ok(guilds) => guilds,
            Err(error) => return self.result.skip(Target::Guilds, error),
        };
        for guild in guilds {
            if self.is_cancelled() {
                return;
            }
            debug!(guild_id = guild.id.get(), name = %guild.name, "leaving guild");
            let outcome = api.leave_guild(token, guild.id).await.into();
            self.finish(Target::Guild { guild_id: guild.id }, outcome)
                .await;
        }
    }

    async fn leave_groups(&mut self) {
        let (api, credential) = (self.api, self.credential);
        let token = credential.token.as_str();

        let channels = match api.private_channels(token).await {
            Ok(channels) => channels,
            Err(error) => return self.result.skip(Target::PrivateChannels, error),
        };
        for channel in channels
            .into_iter()
            .filter(|channel| channel.kind == ChannelType::Group)
        {
            if !can_leave_group(&channel, credential.user_id) {
                debug!(
                    channel_id = channel.id.get(),
                    recipients = ?channel.recipient_count(credential.user_id),
                    "group too large to leave"
                );
                continue;
            }
            if self.is_cancelled() {
                return;
            }
            let outcome = api.delete_channel(token, channel.id).await.into();
            self.finish(
                Target::Channel {
                    channel_id: channel.id,
                },
                outcome,
            )
            .await;
        }
    }
}
