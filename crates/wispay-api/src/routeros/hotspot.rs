// Hotspot endpoints
//
// Hotspot account management via /ip/hotspot/user and live session
// inspection via /ip/hotspot/active. Writes go through PUT (add) and
// PATCH (set) with the entry's `.id`.

use tracing::debug;

use crate::error::Error;
use crate::routeros::client::RouterOsClient;
use crate::routeros::models::{ActiveEntry, HotspotUser, HotspotUserPatch, NewHotspotUser};

impl RouterOsClient {
    /// Look up a hotspot account by name.
    ///
    /// `GET /rest/ip/hotspot/user?name={name}`
    pub async fn find_user(&self, name: &str) -> Result<Option<HotspotUser>, Error> {
        debug!(name, "looking up hotspot user");
        let mut users: Vec<HotspotUser> =
            self.get_list("ip/hotspot/user", &[("name", name)]).await?;
        Ok(if users.is_empty() { None } else { Some(users.swap_remove(0)) })
    }

    /// Create a hotspot account.
    ///
    /// `PUT /rest/ip/hotspot/user`
    ///
    /// A duplicate name fails with HTTP 400 and a `"failure: already have
    /// user with this name"` detail — see [`Error::is_name_conflict`].
    pub async fn add_user(&self, user: &NewHotspotUser) -> Result<HotspotUser, Error> {
        debug!(name = %user.name, profile = %user.profile, "adding hotspot user");
        self.put("ip/hotspot/user", user).await
    }

    /// Update a hotspot account by `.id`.
    ///
    /// `PATCH /rest/ip/hotspot/user/{id}`
    pub async fn update_user(
        &self,
        id: &str,
        patch: &HotspotUserPatch,
    ) -> Result<HotspotUser, Error> {
        debug!(id, "updating hotspot user");
        self.patch(&format!("ip/hotspot/user/{id}"), patch).await
    }

    /// Remove a hotspot account by `.id`.
    ///
    /// `DELETE /rest/ip/hotspot/user/{id}`
    pub async fn remove_user(&self, id: &str) -> Result<(), Error> {
        debug!(id, "removing hotspot user");
        self.delete(&format!("ip/hotspot/user/{id}")).await
    }

    /// List all currently connected hotspot sessions.
    ///
    /// `GET /rest/ip/hotspot/active`
    pub async fn list_active(&self) -> Result<Vec<ActiveEntry>, Error> {
        debug!("listing active hotspot sessions");
        self.get_list("ip/hotspot/active", &[]).await
    }

    /// Find the active session for a given account, if any.
    ///
    /// `GET /rest/ip/hotspot/active?user={name}`
    pub async fn find_active(&self, user: &str) -> Result<Option<ActiveEntry>, Error> {
        debug!(user, "looking up active session");
        let mut sessions: Vec<ActiveEntry> =
            self.get_list("ip/hotspot/active", &[("user", user)]).await?;
        Ok(if sessions.is_empty() { None } else { Some(sessions.swap_remove(0)) })
    }

    /// Kick an active session by `.id`.
    ///
    /// `DELETE /rest/ip/hotspot/active/{id}`
    pub async fn disconnect_active(&self, id: &str) -> Result<(), Error> {
        debug!(id, "disconnecting active session");
        self.delete(&format!("ip/hotspot/active/{id}")).await
    }
}
