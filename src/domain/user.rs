use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub image: Option<String>,
}

/// Author block shown on a post card or comment preview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    /// Username, falling back to the display name when none is set.
    pub handle: String,
    pub image: Option<String>,
}

impl From<User> for AuthorSummary {
    fn from(user: User) -> Self {
        let handle = user.username.unwrap_or_else(|| user.name.clone());
        Self {
            id: user.id,
            name: user.name,
            handle,
            image: user.image,
        }
    }
}
