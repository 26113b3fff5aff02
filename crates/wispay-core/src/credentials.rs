// ── Credential generation ──

use std::fmt;

use rand::Rng;

/// A freshly generated username/password pair.
///
/// Shown to the guest exactly once, at submission time. `Debug` redacts
/// the password so the pair can be traced through logs safely.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Generates hotspot credentials: `{prefix}NNNN` usernames and 6-digit
/// numeric passwords.
///
/// Values satisfy RouterOS account naming rules (ASCII letters and
/// digits). Uniqueness is probabilistic only -- the orchestrator treats a
/// name collision on the router as retryable and regenerates.
#[derive(Debug, Clone)]
pub struct CredentialGenerator {
    prefix: String,
}

impl CredentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn generate(&self) -> Credentials {
        let mut rng = rand::thread_rng();
        Credentials {
            username: format!("{}{:04}", self.prefix, rng.gen_range(0..10_000)),
            password: format!("{:06}", rng.gen_range(0..1_000_000)),
        }
    }
}

impl Default for CredentialGenerator {
    fn default() -> Self {
        Self::new("user")
    }
}
