use serde::Deserialize;
use twilight_model::{
    channel::ChannelType,
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
        Id,
    },
};

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CurrentUser {
    pub(crate) id: Id<UserMarker>,
    pub(crate) username: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PartialGuild {
    pub(crate) id: Id<GuildMarker>,
    #[serde(default)]
    pub(crate) name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Recipient {
    pub(crate) id: Id<UserMarker>,
}

/// A channel as returned by the guild and private channel listings.
///
/// `recipients` is only present on direct and group messages.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Channel {
    pub(crate) id: Id<ChannelMarker>,
    #[serde(rename = "type")]
    pub(crate) kind: ChannelType,
    #[serde(default)]
    pub(crate) guild_id: Option<Id<GuildMarker>>,
    #[serde(default)]
    pub(crate) recipients: Option<Vec<Recipient>>,
}

impl Channel {
    /// Recipients other than `user`. Discord leaves the current user out of
    /// the list, but older payloads may still carry it.
    pub(crate) fn recipient_count(&self, user: Id<UserMarker>) -> Option<usize> {
        self.recipients.as_ref().map(|recipients| {
            recipients
                .iter()
                .filter(|recipient| recipient.id != user)
                .count()
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: Id<UserMarker>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Message {
    pub(crate) id: Id<MessageMarker>,
    pub(crate) channel_id: Id<ChannelMarker>,
    pub(crate) author: Author,
}
