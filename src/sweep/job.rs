use super::{Scope, SweepFailure, SweepResult};
use crate::state::StateRef;
use serde::{Deserialize, Serialize};
use twilight_model::id::{marker::ChannelMarker, Id};

/// Reasons a sweep never starts.
#[derive(Debug, thiserror::Error)]
pub(crate) enum SweepError {
    #[error("token not configured")]
    MissingCredential,
    #[error("channel id is required")]
    MissingChannelId,
    #[error("invalid channel id {0:?}")]
    InvalidChannelId(String),
    #[error("credential store failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// Scope names accepted from callers, including the dashboard's older action names.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScopeKind {
    #[serde(alias = "clear_dm", alias = "clear_server_messages")]
    SingleContainer,
    AllGuildChannels,
    #[serde(alias = "clear_all_dms")]
    AllDirectMessages,
    #[serde(alias = "trigger_cleanup")]
    Everything,
    #[serde(alias = "leave_all_servers")]
    LeaveGuilds,
    LeaveGroupDms,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SweepRequest {
    /// Key returned when the token was saved.
    #[serde(default)]
    pub(crate) credential: Option<String>,
    pub(crate) scope: ScopeKind,
    #[serde(default, alias = "channelId")]
    pub(crate) channel_id: Option<String>,
}

impl SweepRequest {
    fn resolve_scope(&self) -> Result<Scope, SweepError> {
        Ok(match self.scope {
            ScopeKind::SingleContainer => Scope::SingleContainer(self.channel_id()?),
            ScopeKind::AllGuildChannels => Scope::AllGuildChannels,
            ScopeKind::AllDirectMessages => Scope::AllDirectMessages,
            ScopeKind::Everything => Scope::Everything,
            ScopeKind::LeaveGuilds => Scope::LeaveGuilds,
            ScopeKind::LeaveGroupDms => Scope::LeaveGroupDms,
        })
    }

    fn channel_id(&self) -> Result<Id<ChannelMarker>, SweepError> {
        let raw = self
            .channel_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(SweepError::MissingChannelId)?;
        raw.parse::<u64>()
            .ok()
            .and_then(Id::new_checked)
            .ok_or_else(|| SweepError::InvalidChannelId(raw.to_owned()))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SweepReport {
    /// True only when every call succeeded and the sweep ran to the end.
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) attempted: usize,
    pub(crate) deleted: usize,
    pub(crate) failed: usize,
    pub(crate) cancelled: bool,
    pub(crate) failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub(crate) fn new(scope: Scope, result: SweepResult) -> Self {
        let mut message = match scope {
            Scope::LeaveGuilds => format!("Left {} servers.", result.deleted),
            Scope::LeaveGroupDms => format!("Left {} group DMs.", result.deleted),
            _ => format!("Cleanup finished! {} messages deleted.", result.deleted),
        };
        if !result.failures.is_empty() {
            message.push_str(&format!(" {} failures.", result.failures.len()));
        }
        if result.cancelled {
            message.push_str(" Cancelled before completion.");
        }
        Self {
            success: result.failures.is_empty() && !result.cancelled,
            message,
            attempted: result.attempted,
            deleted: result.deleted,
            failed: result.failed(),
            cancelled: result.cancelled,
            failures: result.failures,
        }
    }
}

/// Validates `request` and sweeps with the referenced credential.
///
/// Errors are only returned before the first remote call; once the sweep has
/// started every failure ends up in the report.
pub(crate) async fn run(
    state: &StateRef,
    request: SweepRequest,
) -> Result<SweepReport, SweepError> {
    let key = request
        .credential
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or(SweepError::MissingCredential)?;
    let scope = request.resolve_scope()?;
    let credential = state
        .store
        .get(key)
        .await?
        .ok_or(SweepError::MissingCredential)?;

    let guard = state.sweeps.register(key);
    let result = state
        .sweeper
        .sweep(&credential, scope, guard.cancellation())
        .await;
    Ok(SweepReport::new(scope, result))
}
