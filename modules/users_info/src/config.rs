use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// HMAC secret for the token helper. Empty disables token issuance.
    #[serde(default)]
    pub jwt_secret: String,
}
