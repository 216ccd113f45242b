//! Actors and the approval roster
//!
//! The core trusts the `Actor` it is handed per call and performs no
//! authentication of its own; approval authority is exactly the
//! `can_approve` capability on the actor, never ambient session state.
//! The roster is the CLI-side convenience that produces actors from the
//! project's `.fdc/roster.yaml`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Vault;

/// The identity acting on a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
    pub can_approve: bool,
}

/// A roster member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterMember {
    pub name: String,
    pub email: String,
    /// Username for matching git user (git config user.name or user.email)
    pub username: String,
    #[serde(default)]
    pub can_approve: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RosterMember {
    pub fn as_actor(&self) -> Actor {
        Actor {
            id: self.username.clone(),
            display_name: self.name.clone(),
            can_approve: self.can_approve,
        }
    }
}

/// Approval roster configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub members: Vec<RosterMember>,
}

fn default_version() -> u32 {
    1
}

impl Roster {
    /// Load the roster from the vault's .fdc/roster.yaml
    pub fn load(vault: &Vault) -> Option<Self> {
        Self::load_from_path(&vault.fdc_dir().join("roster.yaml"))
    }

    /// Load the roster from a specific path
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&contents).ok()
    }

    /// Save the roster to the vault's .fdc/roster.yaml
    pub fn save(&self, vault: &Vault) -> std::io::Result<()> {
        self.save_to_path(&vault.fdc_dir().join("roster.yaml"))
    }

    /// Save the roster to a specific path
    pub fn save_to_path(&self, path: &Path) -> std::io::Result<()> {
        let contents = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, contents)
    }

    /// Find an active member by username (matches git user.name)
    pub fn find_member(&self, username: &str) -> Option<&RosterMember> {
        self.members
            .iter()
            .find(|m| m.active && m.username.eq_ignore_ascii_case(username))
    }

    /// Find an active member by email
    pub fn find_member_by_email(&self, email: &str) -> Option<&RosterMember> {
        self.members
            .iter()
            .find(|m| m.active && m.email.eq_ignore_ascii_case(email))
    }

    /// Get the current user as a roster member.
    ///
    /// Resolution order: FDC_USER env var, then git config user.name, then
    /// git config user.email.
    pub fn current_member(&self) -> Option<&RosterMember> {
        if let Ok(username) = std::env::var("FDC_USER") {
            if let Some(member) = self.find_member(&username) {
                return Some(member);
            }
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    if let Some(member) = self.find_member(&name) {
                        return Some(member);
                    }
                }
            }
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.email"])
            .output()
        {
            if output.status.success() {
                let email = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !email.is_empty() {
                    if let Some(member) = self.find_member_by_email(&email) {
                        return Some(member);
                    }
                }
            }
        }

        None
    }

    /// Add a member to the roster
    pub fn add_member(&mut self, member: RosterMember) {
        self.members.push(member);
    }

    /// Remove a member by username
    pub fn remove_member(&mut self, username: &str) -> bool {
        let len_before = self.members.len();
        self.members
            .retain(|m| !m.username.eq_ignore_ascii_case(username));
        self.members.len() < len_before
    }

    /// All active members
    pub fn active_members(&self) -> impl Iterator<Item = &RosterMember> {
        self.members.iter().filter(|m| m.active)
    }

    /// Generate default roster.yaml template content
    pub fn default_template() -> &'static str {
        r#"# FDC Approval Roster
# Defines who may act on controlled documents and who holds approval authority

version: 1

members:
  # Example member entry:
  # - name: "Jane Smith"
  #   email: "jane@example.com"
  #   username: "jsmith"        # Matches git config user.name or FDC_USER
  #   can_approve: true
  #   active: true
  []
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_roster() -> Roster {
        let mut roster = Roster::default();
        roster.members.push(RosterMember {
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            username: "jsmith".to_string(),
            can_approve: true,
            active: true,
        });
        roster.members.push(RosterMember {
            name: "Bob Wilson".to_string(),
            email: "bob@example.com".to_string(),
            username: "bwilson".to_string(),
            can_approve: false,
            active: true,
        });
        roster.members.push(RosterMember {
            name: "Gone Person".to_string(),
            email: "gone@example.com".to_string(),
            username: "gone".to_string(),
            can_approve: true,
            active: false,
        });
        roster
    }

    #[test]
    fn test_find_member() {
        let roster = create_test_roster();
        let member = roster.find_member("jsmith").unwrap();
        assert_eq!(member.name, "Jane Smith");
    }

    #[test]
    fn test_find_member_case_insensitive() {
        let roster = create_test_roster();
        assert!(roster.find_member("JSMITH").is_some());
        assert!(roster.find_member("JSmith").is_some());
    }

    #[test]
    fn test_inactive_members_are_invisible() {
        let roster = create_test_roster();
        assert!(roster.find_member("gone").is_none());
        assert_eq!(roster.active_members().count(), 2);
    }

    #[test]
    fn test_as_actor_carries_capability() {
        let roster = create_test_roster();
        let jane = roster.find_member("jsmith").unwrap().as_actor();
        let bob = roster.find_member("bwilson").unwrap().as_actor();
        assert!(jane.can_approve);
        assert!(!bob.can_approve);
        assert_eq!(jane.id, "jsmith");
        assert_eq!(jane.display_name, "Jane Smith");
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("roster.yaml");

        let roster = create_test_roster();
        roster.save_to_path(&path).unwrap();

        let loaded = Roster::load_from_path(&path).unwrap();
        assert_eq!(loaded.members.len(), 3);
        assert_eq!(loaded.members[0].name, "Jane Smith");
        assert!(loaded.members[0].can_approve);
    }

    #[test]
    fn test_add_remove_member() {
        let mut roster = Roster::default();

        roster.add_member(RosterMember {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            can_approve: false,
            active: true,
        });

        assert_eq!(roster.members.len(), 1);
        assert!(roster.find_member("testuser").is_some());

        roster.remove_member("testuser");
        assert_eq!(roster.members.len(), 0);
        assert!(roster.find_member("testuser").is_none());
    }
}
