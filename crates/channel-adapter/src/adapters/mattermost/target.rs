//! Parsing of outbound send targets.

use crate::error::ActionError;

/// Where a message should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendTarget {
    Channel(String),
    User(String),
    Username(String),
}

/// Parse `channel:<id>`, `user:<id>`, `@username`, or a bare channel id.
/// A leading `mattermost:` qualifier is ignored.
pub fn parse_target(raw: &str) -> Result<SendTarget, ActionError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("mattermost:").unwrap_or(trimmed).trim();

    let target = if let Some(id) = trimmed.strip_prefix("channel:") {
        SendTarget::Channel(id.trim().to_string())
    } else if let Some(id) = trimmed.strip_prefix("user:") {
        SendTarget::User(id.trim().to_string())
    } else if let Some(name) = trimmed.strip_prefix('@') {
        SendTarget::Username(name.trim().to_string())
    } else {
        SendTarget::Channel(trimmed.to_string())
    };

    let empty = match &target {
        SendTarget::Channel(v) | SendTarget::User(v) | SendTarget::Username(v) => v.is_empty(),
    };
    if empty {
        return Err(ActionError::Validation(format!(
            "to requires a Mattermost target, got '{}'",
            raw
        )));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id_is_channel() {
        assert_eq!(parse_target("c1").unwrap(), SendTarget::Channel("c1".into()));
    }

    #[test]
    fn prefixed_forms() {
        assert_eq!(
            parse_target("channel:abc").unwrap(),
            SendTarget::Channel("abc".into())
        );
        assert_eq!(parse_target("user:u1").unwrap(), SendTarget::User("u1".into()));
        assert_eq!(
            parse_target("@alice").unwrap(),
            SendTarget::Username("alice".into())
        );
        assert_eq!(
            parse_target("mattermost:user:u2").unwrap(),
            SendTarget::User("u2".into())
        );
    }

    #[test]
    fn empty_targets_rejected() {
        assert!(parse_target("").is_err());
        assert!(parse_target("channel:").is_err());
        assert!(parse_target("@ ").is_err());
    }
}
