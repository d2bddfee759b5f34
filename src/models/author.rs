use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book author. Books reference authors by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub nationality: String,
    pub birth_year: Option<i32>,
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an author
#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    pub nationality: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub biography: Option<String>,
}

/// Partial author update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorUpdate {
    pub name: Option<String>,
    pub nationality: Option<String>,
    pub birth_year: Option<i32>,
    pub biography: Option<String>,
}

impl Author {
    /// Creates a new author stamped with the current time
    pub fn new(name: impl Into<String>, nationality: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            nationality: nationality.into(),
            birth_year: None,
            biography: None,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: AuthorUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(nationality) = update.nationality {
            self.nationality = nationality;
        }
        if update.birth_year.is_some() {
            self.birth_year = update.birth_year;
        }
        if update.biography.is_some() {
            self.biography = update.biography;
        }
    }
}

impl From<NewAuthor> for Author {
    fn from(new: NewAuthor) -> Self {
        Self {
            birth_year: new.birth_year,
            biography: new.biography,
            ..Author::new(new.name, new.nationality)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_author() {
        let author = Author::new("José Saramago", "Portuguese");
        assert_eq!(author.name, "José Saramago");
        assert_eq!(author.nationality, "Portuguese");
        assert!(author.birth_year.is_none());
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut author = Author::new("Eça de Queirós", "Portuguese");
        author.birth_year = Some(1845);

        author.apply(AuthorUpdate {
            biography: Some("Realist novelist".to_string()),
            ..Default::default()
        });

        assert_eq!(author.name, "Eça de Queirós");
        assert_eq!(author.birth_year, Some(1845));
        assert_eq!(author.biography.as_deref(), Some("Realist novelist"));
    }
}
