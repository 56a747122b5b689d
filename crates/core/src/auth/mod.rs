//! Capability checks for privileged operations.
//!
//! Authorization is an explicit predicate evaluated by the workflow before
//! every privileged transition. A refusal is visible to the caller and
//! mutates nothing.

/// Identity of whoever triggered an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Platform user id.
    pub id: String,
    /// Human-readable name, used in embeds and audit records.
    pub display_name: String,
    /// Role ids the user holds in the guild.
    pub roles: Vec<String>,
}

impl Caller {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            roles,
        }
    }

    /// Returns true if this caller holds the given role.
    pub fn has_role(&self, required_role: &str) -> bool {
        has_role(&self.roles, required_role)
    }

    /// Mention string for embeds.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Returns true if `caller_roles` contains `required_role`.
pub fn has_role(caller_roles: &[String], required_role: &str) -> bool {
    caller_roles.iter().any(|r| r == required_role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role_match() {
        let roles = vec!["100".to_string(), "500".to_string()];
        assert!(has_role(&roles, "500"));
    }

    #[test]
    fn test_has_role_no_match() {
        let roles = vec!["100".to_string()];
        assert!(!has_role(&roles, "500"));
    }

    #[test]
    fn test_has_role_empty() {
        assert!(!has_role(&[], "500"));
    }

    #[test]
    fn test_caller_has_role() {
        let caller = Caller::new("1", "alice", vec!["500".to_string()]);
        assert!(caller.has_role("500"));
        assert!(!caller.has_role("600"));
    }

    #[test]
    fn test_caller_mention() {
        let caller = Caller::new("42", "bob", vec![]);
        assert_eq!(caller.mention(), "<@42>");
    }
}
