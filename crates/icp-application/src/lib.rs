//! Application layer for the Interview Coach Prep client.
//!
//! Coordinates the domain types of `icp-core` with the injected backend,
//! storage and device capabilities. The [`InterviewController`] is the sole
//! writer of the live session.

pub mod auth_state;
pub mod interview;

pub use auth_state::{AuthEvent, AuthStateService};
pub use interview::{
    Capabilities, EndOutcome, InterviewController, InterviewView, Preferences, SessionResult,
    SubmitOutcome,
};

#[cfg(test)]
pub(crate) mod test_support {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// A signed-looking token expiring `expires_in_secs` from now.
    pub fn test_token(expires_in_secs: i64, has_analyzed: bool) -> String {
        let payload = serde_json::json!({
            "exp": chrono::Utc::now().timestamp() + expires_in_secs,
            "name": "Candidate",
            "email": "candidate@example.com",
            "has_analyzed": has_analyzed,
        });
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", body)
    }
}
