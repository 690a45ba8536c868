//! Team entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_team_name, TeamValidationError};

/// Team identifier - a UUID assigned at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(Uuid);

impl TeamId {
    /// Generate a fresh team ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a team ID from its string form
    pub fn parse(id: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(id)?))
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TeamId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team entity
///
/// A team has no single owning user on the row itself; ownership lives in
/// the membership records attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    id: TeamId,
    /// Display name
    name: String,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team
    pub fn new(name: impl Into<String>) -> Result<Self, TeamValidationError> {
        let name = name.into();
        validate_team_name(&name)?;

        Ok(Self {
            id: TeamId::generate(),
            name,
            description: None,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a team from stored fields
    pub fn from_parts(
        id: TeamId,
        name: String,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
        }
    }

    /// Set description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // Getters

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let team = Team::new("Ocean Cleanup Crew").unwrap();

        assert_eq!(team.name(), "Ocean Cleanup Crew");
        assert!(team.description().is_none());
    }

    #[test]
    fn test_team_with_description() {
        let team = Team::new("Ocean Cleanup Crew")
            .unwrap()
            .with_description("Working on SDG 14");

        assert_eq!(team.description(), Some("Working on SDG 14"));
    }

    #[test]
    fn test_team_invalid_name() {
        assert!(Team::new("").is_err());
    }

    #[test]
    fn test_team_ids_are_unique() {
        let a = Team::new("A").unwrap();
        let b = Team::new("B").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_team_id_parse_round_trip() {
        let id = TeamId::generate();
        let parsed = TeamId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_team_id_parse_invalid() {
        assert!(TeamId::parse("not-a-uuid").is_err());
    }
}
