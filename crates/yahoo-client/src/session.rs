use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracker_core::TrackerError;

/// Every direct network call is bounded by this timeout; expiry is a normal
/// failure path, not an exceptional one.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser identity presented to the upstream endpoints. Yahoo rejects
/// requests without a plausible User-Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpersonationProfile {
    Chrome,
    Firefox,
    Plain,
}

impl ImpersonationProfile {
    pub fn user_agent(&self) -> &'static str {
        match self {
            ImpersonationProfile::Chrome => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36"
            }
            ImpersonationProfile::Firefox => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0"
            }
            ImpersonationProfile::Plain => "Mozilla/5.0",
        }
    }
}

/// Process-wide HTTP trust policy. Replaced wholesale on settings change,
/// never mutated field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    pub tls_verify: bool,
    pub impersonate: ImpersonationProfile,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            tls_verify: true,
            impersonate: ImpersonationProfile::Chrome,
        }
    }
}

/// One configured HTTP client shared by every network-facing task. Tasks
/// capture the `Arc` current at their construction; rebuilding the session
/// never retroactively alters in-flight work.
pub struct SessionHandle {
    policy: SessionPolicy,
    client: Client,
}

impl SessionHandle {
    pub fn build(policy: SessionPolicy) -> Result<Arc<Self>, TrackerError> {
        let mut builder = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(policy.impersonate.user_agent());

        if !policy.tls_verify {
            // User-opted insecure mode; the coordinator keeps a persistent
            // warning visible while this policy is active.
            tracing::warn!("TLS certificate verification is DISABLED for all requests");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| TrackerError::SessionError(e.to_string()))?;

        Ok(Arc::new(Self { policy, client }))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn tls_verify(&self) -> bool {
        self.policy.tls_verify
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuilt_session_leaves_old_handle_untouched() {
        let old = SessionHandle::build(SessionPolicy::default()).unwrap();
        assert!(old.tls_verify());

        let replacement = SessionHandle::build(SessionPolicy {
            tls_verify: false,
            impersonate: ImpersonationProfile::Firefox,
        })
        .unwrap();

        // A task that captured `old` keeps the verify flag it was built with.
        assert!(old.tls_verify());
        assert!(!replacement.tls_verify());
        assert_eq!(old.policy().impersonate, ImpersonationProfile::Chrome);
    }
}
