//! Member directory state.
//!
//! Authoritative-server mode: the backend list is the source of truth and
//! the local `Vec` is a staging layer committed only after a confirmed
//! server response (dispatch intent, await the ack, then commit). Deletes
//! are ADMIN-gated locally before any network traffic and only accept a
//! [`ConfirmedDelete`] produced by walking through a [`DeletePrompt`].

use portal_client::{ApiResponse, Member, NewMember, PortalClient, UserRole};
use tracing::debug;

const ADMIN_ONLY: &str = "Hanya admin yang dapat menghapus data member";

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteTarget {
    One(String),
    All,
}

/// The confirmation step for a destructive action, with distinct copy for
/// delete-one vs delete-all. Dropping it (or calling [`cancel`]) performs no
/// mutation; only [`confirm`] yields the token the directory accepts.
///
/// [`cancel`]: DeletePrompt::cancel
/// [`confirm`]: DeletePrompt::confirm
#[derive(Debug)]
pub struct DeletePrompt {
    target: DeleteTarget,
}

impl DeletePrompt {
    pub fn title(&self) -> &'static str {
        match self.target {
            DeleteTarget::One(_) => "Hapus Member?",
            DeleteTarget::All => "Hapus Semua Member?",
        }
    }

    pub fn body(&self) -> &'static str {
        match self.target {
            DeleteTarget::One(_) => {
                "Anda akan menghapus data member ini. Tindakan ini tidak dapat dibatalkan."
            }
            DeleteTarget::All => {
                "Anda akan menghapus semua data member. Tindakan ini tidak dapat dibatalkan."
            }
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self.target {
            DeleteTarget::One(_) => "Hapus",
            DeleteTarget::All => "Hapus Semua",
        }
    }

    pub fn cancel_label(&self) -> &'static str {
        "Batal"
    }

    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete {
            target: self.target,
        }
    }

    pub fn cancel(self) {}
}

/// Proof that the confirmation gesture completed. Only obtainable through
/// [`DeletePrompt::confirm`].
#[derive(Debug)]
pub struct ConfirmedDelete {
    target: DeleteTarget,
}

pub struct MemberDirectory {
    client: PortalClient,
    members: Vec<Member>,
    loading: bool,
    error: Option<String>,
}

impl MemberDirectory {
    pub fn new(client: PortalClient) -> Self {
        Self {
            client,
            members: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the local list with the server's.
    pub async fn fetch(&mut self) {
        self.loading = true;
        self.error = None;

        match self.client.list_members().await {
            ApiResponse::Success { data, .. } => {
                debug!(count = data.len(), "fetched members");
                self.members = data;
                self.loading = false;
            }
            ApiResponse::Error { message, .. } => {
                self.error = Some(message.unwrap_or_else(|| "Failed to fetch members.".into()));
                self.loading = false;
            }
        }
    }

    /// Server-confirmed create. The returned record carries the
    /// server-assigned id and registration timestamp; it joins the local
    /// list only after the ack.
    pub async fn add(&mut self, member: NewMember) -> Result<Member, String> {
        match self.client.add_member(&member).await {
            ApiResponse::Success { data, .. } => {
                self.members.push(data.clone());
                Ok(data)
            }
            ApiResponse::Error { message, .. } => {
                Err(message.unwrap_or_else(|| "Failed to add member.".into()))
            }
        }
    }

    pub fn delete_prompt(&self, id: impl Into<String>) -> DeletePrompt {
        DeletePrompt {
            target: DeleteTarget::One(id.into()),
        }
    }

    pub fn delete_all_prompt(&self) -> DeletePrompt {
        DeletePrompt {
            target: DeleteTarget::All,
        }
    }

    /// Execute a confirmed delete. Rejected locally, with no network call,
    /// unless the caller's role is ADMIN.
    pub async fn delete(
        &mut self,
        role: UserRole,
        confirmed: ConfirmedDelete,
    ) -> Result<(), String> {
        if !role.is_admin() {
            return Err(ADMIN_ONLY.into());
        }

        match confirmed.target {
            DeleteTarget::One(id) => self.delete_one(&id).await,
            DeleteTarget::All => self.delete_every().await,
        }
    }

    async fn delete_one(&mut self, id: &str) -> Result<(), String> {
        match self.client.delete_member(id).await {
            ApiResponse::Success { .. } => {
                // At most one record leaves the list per call.
                if let Some(index) = self.members.iter().position(|member| member.id == id) {
                    self.members.remove(index);
                }
                Ok(())
            }
            ApiResponse::Error { message, .. } => {
                Err(message.unwrap_or_else(|| "Failed to delete member.".into()))
            }
        }
    }

    /// The contract has no bulk endpoint, so bulk clear iterates single
    /// deletes. Each ack commits its removal; the first failure stops and
    /// surfaces the error, leaving already-acked removals committed.
    async fn delete_every(&mut self) -> Result<(), String> {
        let ids: Vec<String> = self.members.iter().map(|member| member.id.clone()).collect();
        for id in ids {
            self.delete_one(&id).await?;
        }
        Ok(())
    }

    /// Case-insensitive substring match across full name, email and phone
    /// number. Applied client-side only; the term never reaches the server.
    pub fn filter(&self, term: &str) -> Vec<&Member> {
        let needle = term.to_lowercase();
        self.members
            .iter()
            .filter(|member| {
                member.full_name.to_lowercase().contains(&needle)
                    || member.email.to_lowercase().contains(&needle)
                    || member.phone_number.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
