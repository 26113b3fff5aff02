// ── Approval workflow orchestrator ──
//
// The request state machine: Submitted -> (AccountCreated) -> Notified ->
// {Approved, Rejected}. Holds no in-memory state across the human approval
// gap -- everything needed to resume on an approval event lives in the
// store. Ordering invariants:
//
//   * the disabled account is created BEFORE the record is persisted, so a
//     persistence failure can never leave a record without a backing
//     account (and a failed put tears the account back down);
//   * on approval, the account is enabled BEFORE the record transitions,
//     so "Approved" always means the guest can actually connect.

use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Utc};
use tracing::{debug, error, info, warn};

use crate::credentials::CredentialGenerator;
use crate::error::CoreError;
use crate::model::{ApprovalAction, ApprovalEvent, Package, PendingRequest, RequestStatus};
use crate::net::AccessController;
use crate::notify::ApprovalNotifier;
use crate::store::PendingStore;

/// Regeneration bound for credential collisions on the router.
const MAX_PROVISION_ATTEMPTS: u32 = 3;

/// A guest's top-up submission.
#[derive(Debug, Clone)]
pub struct SubmitInput {
    /// Package wire name, validated against the enumerated set.
    pub package: String,
    pub contact_number: String,
    pub proof_reference: Option<String>,
    pub source_address: Option<IpAddr>,
}

/// Result of handling an approval event.
#[derive(Debug)]
pub enum ApprovalOutcome {
    /// The decision was applied to this request.
    Applied(PendingRequest),
    /// The request was already decided -- a benign duplicate delivery.
    AlreadyDecided(PendingRequest),
}

pub struct Orchestrator {
    store: PendingStore,
    access: AccessController,
    notifier: ApprovalNotifier,
    generator: CredentialGenerator,
}

impl Orchestrator {
    pub fn new(
        store: PendingStore,
        access: AccessController,
        notifier: ApprovalNotifier,
        generator: CredentialGenerator,
    ) -> Self {
        Self {
            store,
            access,
            notifier,
            generator,
        }
    }

    pub fn store(&self) -> &PendingStore {
        &self.store
    }

    pub fn access(&self) -> &AccessController {
        &self.access
    }

    pub fn notifier(&self) -> &ApprovalNotifier {
        &self.notifier
    }

    /// Handle a guest submission: provision a disabled account, persist the
    /// pending record, and notify the admin.
    ///
    /// The returned record carries the plaintext credentials -- this is the
    /// single point where they are shown to the guest; they are not
    /// retrievable through this interface again.
    pub async fn submit(&self, input: SubmitInput) -> Result<PendingRequest, CoreError> {
        let package = Package::from_str(&input.package).map_err(|_| CoreError::InvalidPackage {
            name: input.package.clone(),
        })?;
        validate_contact(&input.contact_number)?;

        let credentials = self.provision_account(package, &input).await?;

        let request = PendingRequest {
            id: credentials.username.clone(),
            username: credentials.username,
            password: credentials.password,
            package,
            contact_number: input.contact_number,
            proof_reference: input.proof_reference,
            source_address: input.source_address,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
        };

        if let Err(e) = self.store.put(&request).await {
            // Tear the account back down so a failed submission leaves
            // nothing behind on the router.
            warn!(id = %request.id, error = %e, "failed to persist request; removing account");
            if let Err(cleanup) = self.access.remove_account(&request.username).await {
                error!(
                    username = %request.username,
                    error = %cleanup,
                    "orphaned disabled account left on router"
                );
            }
            return Err(e);
        }

        match self.notifier.notify_submission(&request).await {
            Ok(message_id) => {
                debug!(id = %request.id, message_id, "admin notified");
            }
            Err(e) => {
                // Degraded but recoverable: the guest has credentials and
                // the record is durable; the operator finds it via
                // `list_pending`.
                warn!(id = %request.id, error = %e, "admin notification failed; request awaits manual follow-up");
            }
        }

        info!(id = %request.id, package = %request.package, "submission accepted");
        Ok(request)
    }

    /// Handle an asynchronous approval/rejection event from the channel.
    ///
    /// Idempotent under duplicate delivery: events for already-decided
    /// requests report [`ApprovalOutcome::AlreadyDecided`] without side
    /// effects. Unresolvable events fail with `RequestNotFound` /
    /// `AmbiguousCorrelation` and mutate nothing.
    pub async fn on_approval_event(
        &self,
        event: &ApprovalEvent,
    ) -> Result<ApprovalOutcome, CoreError> {
        let request = self.store.find_by_correlation(&event.correlation).await?;

        if request.status.is_terminal() {
            debug!(id = %request.id, status = %request.status, "duplicate delivery; ignoring");
            return Ok(ApprovalOutcome::AlreadyDecided(request));
        }

        match event.action {
            ApprovalAction::Approve => self.approve(request).await,
            ApprovalAction::Reject => self.reject(request).await,
        }
    }

    // ── Submission internals ─────────────────────────────────────────

    async fn provision_account(
        &self,
        package: Package,
        input: &SubmitInput,
    ) -> Result<crate::credentials::Credentials, CoreError> {
        let comment = format!(
            "pending | {} | {}",
            input.contact_number,
            input
                .source_address
                .map_or_else(|| "unknown".into(), |ip| ip.to_string()),
        );

        for attempt in 1..=MAX_PROVISION_ATTEMPTS {
            let credentials = self.generator.generate();
            match self
                .access
                .create_disabled_account(
                    &credentials.username,
                    &credentials.password,
                    package.profile(),
                    &comment,
                )
                .await
            {
                Ok(()) => return Ok(credentials),
                Err(CoreError::AccountExists { username }) => {
                    warn!(username, attempt, "credential collision; regenerating");
                }
                Err(e) => {
                    return Err(CoreError::ProvisioningFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(CoreError::ProvisioningFailed {
            message: format!("{MAX_PROVISION_ATTEMPTS} credential collisions in a row"),
        })
    }

    // ── Decision internals ───────────────────────────────────────────

    async fn approve(&self, request: PendingRequest) -> Result<ApprovalOutcome, CoreError> {
        let decided_at = Utc::now();
        let expires_at = decided_at + Duration::days(request.package.duration_days());

        // Arm the expiry first; a scheduler failure must not leave an
        // enabled account that never expires.
        let scheduler_id = self
            .access
            .schedule_expiry(&request.username, expires_at)
            .await?;

        let comment = format!(
            "{} | {} | scheduler={}",
            request.contact_number,
            expiry_display(expires_at),
            scheduler_id,
        );

        if let Err(e) = self
            .access
            .set_enabled(&request.username, true, Some(comment))
            .await
        {
            // Approval is not applied until the account is enabled; leave
            // the record Pending so the admin can retry the button.
            warn!(id = %request.id, error = %e, "enable failed; request stays pending");
            if let Err(cleanup) = self.access.cancel_expiry(&request.username).await {
                warn!(id = %request.id, error = %cleanup, "failed to disarm expiry after enable failure");
            }
            return Err(e);
        }

        match self
            .store
            .update_status(&request.id, RequestStatus::Approved)
            .await
        {
            Ok(updated) => {
                info!(id = %updated.id, expires = %expiry_display(expires_at), "request approved");
                Ok(ApprovalOutcome::Applied(updated))
            }
            // A concurrent duplicate won the race after our terminal check;
            // the account is enabled either way.
            Err(CoreError::InvalidTransition { .. }) => {
                let current = self.store.get(&request.id).await?;
                Ok(ApprovalOutcome::AlreadyDecided(current))
            }
            Err(e) => {
                error!(id = %request.id, error = %e, "account enabled but record not transitioned");
                Err(e)
            }
        }
    }

    async fn reject(&self, request: PendingRequest) -> Result<ApprovalOutcome, CoreError> {
        // The disabled account stays on the router; only the record moves.
        match self
            .store
            .update_status(&request.id, RequestStatus::Rejected)
            .await
        {
            Ok(updated) => {
                info!(id = %updated.id, "request rejected");
                Ok(ApprovalOutcome::Applied(updated))
            }
            Err(CoreError::InvalidTransition { .. }) => {
                let current = self.store.get(&request.id).await?;
                Ok(ApprovalOutcome::AlreadyDecided(current))
            }
            Err(e) => Err(e),
        }
    }
}

/// Display form for expiry instants, router-local: `"2025-06-30 13:00"`.
pub fn expiry_display(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// bKash wallet numbers are 11 digits (e.g. `01712345678`).
fn validate_contact(contact: &str) -> Result<(), CoreError> {
    if contact.len() != 11 {
        return Err(CoreError::InvalidContact {
            reason: format!("expected 11 digits, got {}", contact.len()),
        });
    }
    if !contact.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::InvalidContact {
            reason: "non-digit characters present".into(),
        });
    }
    Ok(())
}
