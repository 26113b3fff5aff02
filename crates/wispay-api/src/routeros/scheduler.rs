// System script / scheduler endpoints
//
// Used for account expiry: a one-shot scheduler fires a removal script at
// the purchased package's end time. Scripts and schedulers are named per
// account so stale pairs can be found and replaced.

use tracing::debug;

use crate::error::Error;
use crate::routeros::client::RouterOsClient;
use crate::routeros::models::{NewScheduler, NewScript, SchedulerEntry, ScriptEntry};

impl RouterOsClient {
    /// Look up a system script by name.
    ///
    /// `GET /rest/system/script?name={name}`
    pub async fn find_script(&self, name: &str) -> Result<Option<ScriptEntry>, Error> {
        let mut scripts: Vec<ScriptEntry> =
            self.get_list("system/script", &[("name", name)]).await?;
        Ok(if scripts.is_empty() { None } else { Some(scripts.swap_remove(0)) })
    }

    /// Create a system script.
    ///
    /// `PUT /rest/system/script`
    pub async fn add_script(&self, script: &NewScript) -> Result<ScriptEntry, Error> {
        debug!(name = %script.name, "adding system script");
        self.put("system/script", script).await
    }

    /// Remove a system script by `.id`.
    ///
    /// `DELETE /rest/system/script/{id}`
    pub async fn remove_script(&self, id: &str) -> Result<(), Error> {
        debug!(id, "removing system script");
        self.delete(&format!("system/script/{id}")).await
    }

    /// Look up a scheduler entry by name.
    ///
    /// `GET /rest/system/scheduler?name={name}`
    pub async fn find_scheduler(&self, name: &str) -> Result<Option<SchedulerEntry>, Error> {
        let mut entries: Vec<SchedulerEntry> =
            self.get_list("system/scheduler", &[("name", name)]).await?;
        Ok(if entries.is_empty() { None } else { Some(entries.swap_remove(0)) })
    }

    /// Create a scheduler entry.
    ///
    /// `PUT /rest/system/scheduler`
    pub async fn add_scheduler(&self, scheduler: &NewScheduler) -> Result<SchedulerEntry, Error> {
        debug!(name = %scheduler.name, start = %scheduler.start_date, "adding scheduler");
        self.put("system/scheduler", scheduler).await
    }

    /// Remove a scheduler entry by `.id`.
    ///
    /// `DELETE /rest/system/scheduler/{id}`
    pub async fn remove_scheduler(&self, id: &str) -> Result<(), Error> {
        debug!(id, "removing scheduler");
        self.delete(&format!("system/scheduler/{id}")).await
    }
}
