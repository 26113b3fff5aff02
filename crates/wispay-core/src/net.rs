// ── Network access controller adapter ──
//
// Domain-level operations against the RouterOS gateway: account
// provisioning, enable/disable, session inspection, and the expiry
// scheduler pair. Resolves usernames to RouterOS `.id`s and maps wire
// models into domain types; transport failures surface as distinct
// `CoreError` variants and are never retried here -- retry policy belongs
// to the orchestrator.

use chrono::{DateTime, Local, Utc};
use tracing::{debug, warn};

use wispay_api::RouterOsClient;
use wispay_api::routeros::models::{HotspotUserPatch, NewHotspotUser, NewScheduler, NewScript};

use crate::config::RouterConfig;
use crate::error::CoreError;
use crate::model::{AccountStatus, ActiveUser, HotspotAccount, SessionInfo};

pub struct AccessController {
    client: RouterOsClient,
}

impl AccessController {
    pub fn new(config: &RouterConfig) -> Result<Self, CoreError> {
        let client = RouterOsClient::new(
            config.url.clone(),
            config.username.clone(),
            config.password.clone(),
            &config.transport(),
        )?;
        Ok(Self { client })
    }

    // ── Accounts ─────────────────────────────────────────────────────

    /// Create a hotspot account in the disabled state.
    ///
    /// A name collision maps to [`CoreError::AccountExists`] so the caller
    /// can regenerate credentials and retry.
    pub async fn create_disabled_account(
        &self,
        username: &str,
        password: &str,
        profile: &str,
        comment: &str,
    ) -> Result<(), CoreError> {
        let result = self
            .client
            .add_user(&NewHotspotUser {
                name: username.to_owned(),
                password: password.to_owned(),
                profile: profile.to_owned(),
                disabled: "true".into(),
                comment: Some(comment.to_owned()),
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_name_conflict() => Err(CoreError::AccountExists {
                username: username.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Flip an account's enabled state, optionally rewriting its comment.
    pub async fn set_enabled(
        &self,
        username: &str,
        enabled: bool,
        comment: Option<String>,
    ) -> Result<(), CoreError> {
        let user = self
            .client
            .find_user(username)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound {
                username: username.to_owned(),
            })?;

        self.client
            .update_user(
                &user.id,
                &HotspotUserPatch {
                    disabled: Some(if enabled { "false".into() } else { "true".into() }),
                    comment,
                },
            )
            .await?;
        Ok(())
    }

    /// Look up an account by name.
    pub async fn account(&self, username: &str) -> Result<Option<HotspotAccount>, CoreError> {
        Ok(self.client.find_user(username).await?.map(Into::into))
    }

    /// Remove an account by name. Used only to avoid orphans when record
    /// persistence fails right after provisioning.
    pub async fn remove_account(&self, username: &str) -> Result<(), CoreError> {
        match self.client.find_user(username).await? {
            Some(user) => Ok(self.client.remove_user(&user.id).await?),
            None => Ok(()),
        }
    }

    /// Check a guest's credentials against the router's account table.
    ///
    /// The hotspot stores portal passwords in clear, so this is a direct
    /// comparison; a missing account and a wrong password are deliberately
    /// indistinguishable to the caller.
    pub async fn verify_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<HotspotAccount, CoreError> {
        let user = self
            .client
            .find_user(username)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        if user.password.as_deref() != Some(password) {
            return Err(CoreError::InvalidCredentials);
        }
        Ok(user.into())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// The live session for an account, if connected.
    pub async fn active_session(&self, username: &str) -> Result<Option<SessionInfo>, CoreError> {
        Ok(self.client.find_active(username).await?.map(Into::into))
    }

    /// All currently connected guests.
    pub async fn list_active_users(&self) -> Result<Vec<ActiveUser>, CoreError> {
        Ok(self
            .client
            .list_active()
            .await?
            .into_iter()
            .map(|entry| ActiveUser {
                username: entry.user.clone(),
                session: entry.into(),
            })
            .collect())
    }

    /// Account + session view for the portal status page.
    pub async fn account_status(&self, username: &str) -> Result<AccountStatus, CoreError> {
        let account = self
            .account(username)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound {
                username: username.to_owned(),
            })?;
        let session = self.active_session(username).await?;
        Ok(AccountStatus { account, session })
    }

    /// Kick the account's live session, if any. Returns whether one existed.
    pub async fn disconnect_session(&self, username: &str) -> Result<bool, CoreError> {
        match self.client.find_active(username).await? {
            Some(entry) => {
                self.client.disconnect_active(&entry.id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ── Expiry scheduling ────────────────────────────────────────────

    /// Arm a one-shot expiry for an account: a removal script plus a
    /// scheduler entry firing at `expires_at` (router-local time). Any
    /// stale pair for the same account is replaced first. Returns the
    /// scheduler `.id` for the traceability comment.
    pub async fn schedule_expiry(
        &self,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        let script_name = format!("remove-user-{username}");
        let scheduler_name = format!("expire-user-{username}");

        // Replace stale pairs from an earlier purchase of the same name.
        if let Some(script) = self.client.find_script(&script_name).await? {
            debug!(name = %script_name, "replacing stale removal script");
            self.client.remove_script(&script.id).await?;
        }
        if let Some(entry) = self.client.find_scheduler(&scheduler_name).await? {
            debug!(name = %scheduler_name, "replacing stale expiry scheduler");
            self.client.remove_scheduler(&entry.id).await?;
        }

        self.client
            .add_script(&NewScript {
                name: script_name.clone(),
                source: format!("/ip hotspot user remove [find name={username}]"),
                policy: "read,write".into(),
                dont_require_permissions: "yes".into(),
            })
            .await?;

        let local = expires_at.with_timezone(&Local);
        let result = self
            .client
            .add_scheduler(&NewScheduler {
                name: scheduler_name,
                start_date: format_scheduler_date(&local),
                start_time: local.format("%H:%M:%S").to_string(),
                interval: "0".into(),
                on_event: script_name.clone(),
                policy: "read,write".into(),
                disabled: "no".into(),
            })
            .await;

        match result {
            Ok(entry) => Ok(entry.id),
            Err(e) => {
                // Don't leave a script with no scheduler to fire it.
                if let Ok(Some(script)) = self.client.find_script(&script_name).await {
                    if let Err(cleanup) = self.client.remove_script(&script.id).await {
                        warn!(name = %script_name, error = %cleanup, "failed to clean up removal script");
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Best-effort removal of a previously armed expiry pair.
    pub async fn cancel_expiry(&self, username: &str) -> Result<(), CoreError> {
        let script_name = format!("remove-user-{username}");
        let scheduler_name = format!("expire-user-{username}");

        if let Some(entry) = self.client.find_scheduler(&scheduler_name).await? {
            self.client.remove_scheduler(&entry.id).await?;
        }
        if let Some(script) = self.client.find_script(&script_name).await? {
            self.client.remove_script(&script.id).await?;
        }
        Ok(())
    }
}

/// MikroTik scheduler date format: lowercase `mmm/dd/yyyy`, e.g.
/// `"jun/23/2025"`.
fn format_scheduler_date(at: &DateTime<Local>) -> String {
    at.format("%b/%d/%Y").to_string().to_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::format_scheduler_date;

    #[test]
    fn scheduler_date_is_lowercase_mikrotik_form() {
        let at = Local
            .with_ymd_and_hms(2025, 6, 23, 13, 0, 0)
            .single()
            .expect("valid local time");
        assert_eq!(format_scheduler_date(&at), "jun/23/2025");
    }
}
