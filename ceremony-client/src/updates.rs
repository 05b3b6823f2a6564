//! Progress reporting for in-flight ceremonies.

use tokio::sync::watch;

/// A coarse progress marker published while a ceremony runs.
///
/// Updates describe the most recent state transition, not a history: a
/// subscriber that polls between transitions only observes the latest value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum CeremonyUpdate {
    /// No ceremony has run yet.
    #[default]
    Idle,
    /// A registration ceremony has started.
    Registering {
        /// The username being registered.
        username: String,
    },
    /// A registration ceremony finished and the credential was stored.
    Registered {
        /// The username that was registered.
        username: String,
        /// The new credential's id, base64url encoded.
        credential_id: String,
    },
    /// An authentication ceremony has started.
    Authenticating {
        /// The username being authenticated.
        username: String,
    },
    /// An authentication ceremony finished and the counter was advanced.
    Authenticated {
        /// The username that was authenticated.
        username: String,
    },
    /// The stored credentials were listed.
    CredentialsListed {
        /// How many credentials the store held.
        count: usize,
    },
    /// One or all stored credentials were removed.
    CredentialsCleared,
    /// The most recent ceremony failed.
    Failed {
        /// A presentable description of the failure.
        detail: String,
    },
}

impl std::fmt::Display for CeremonyUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Registering { username } => write!(f, "registering {username}"),
            Self::Registered {
                username,
                credential_id,
            } => write!(f, "registered {username} with credential {credential_id}"),
            Self::Authenticating { username } => write!(f, "authenticating {username}"),
            Self::Authenticated { username } => write!(f, "authenticated {username}"),
            Self::CredentialsListed { count } => write!(f, "listed {count} stored credentials"),
            Self::CredentialsCleared => f.write_str("stored credentials removed"),
            Self::Failed { detail } => write!(f, "ceremony failed: {detail}"),
        }
    }
}

/// The write half of the update channel, owned by the client.
///
/// Only the client publishes, so the usual watch-channel races between
/// writers cannot happen.
#[derive(Debug)]
pub(crate) struct UpdateCell {
    sender: watch::Sender<CeremonyUpdate>,
}

impl UpdateCell {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(CeremonyUpdate::default());
        Self { sender }
    }

    pub(crate) fn publish(&self, update: CeremonyUpdate) {
        log::info!("{update}");
        // send_replace stores the value even with no subscribers.
        self.sender.send_replace(update);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<CeremonyUpdate> {
        self.sender.subscribe()
    }
}
