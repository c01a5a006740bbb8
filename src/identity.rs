//! Collaborator identity resolution.
//!
//! Username resolution order:
//! 1) CLI --username (explicit)
//! 2) DECOMP_USER environment variable
//! 3) Config default (identity.default_username)

use uuid::Uuid;

use crate::config::Config;

/// Identity attached to a relay connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

/// Resolve the current username using CLI, environment, and config.
pub fn resolve_username(config: &Config, cli_username: Option<&str>) -> String {
    if let Some(username) = non_empty(cli_username) {
        return username.to_string();
    }

    if let Ok(env_username) = std::env::var("DECOMP_USER") {
        if let Some(username) = non_empty(Some(env_username.as_str())) {
            return username.to_string();
        }
    }

    config.identity.default_username.clone()
}

/// Resolve a full identity, generating a user id when none is supplied.
///
/// The relay records this identity at join time and stamps it on every
/// broadcast attributed to the connection.
pub fn resolve_identity(
    config: &Config,
    cli_user_id: Option<&str>,
    cli_username: Option<&str>,
) -> Identity {
    let user_id = non_empty(cli_user_id)
        .map(|id| id.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Identity {
        user_id,
        username: resolve_username(config, cli_username),
    }
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_username_wins() {
        let config = Config::default();
        assert_eq!(resolve_username(&config, Some("maria")), "maria");
    }

    #[test]
    fn whitespace_username_falls_through_to_config() {
        let config = Config::default();
        assert_eq!(resolve_username(&config, Some("   ")), "anonymous");
    }

    #[test]
    fn identity_generates_user_id_when_missing() {
        let config = Config::default();
        let identity = resolve_identity(&config, None, Some("maria"));
        assert_eq!(identity.username, "maria");
        assert!(!identity.user_id.is_empty());

        let explicit = resolve_identity(&config, Some("u-1"), Some("maria"));
        assert_eq!(explicit.user_id, "u-1");
    }
}
