//! Entity shapes stored by the service
//!
//! Payload fields are opaque to the store. Missing fields decode as empty
//! strings and any client-supplied `id` is ignored; the store assigns ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A record kind that can live in a [`Store`](crate::store::Store).
pub trait Entity: Clone + Send + 'static {
    /// Collection name, also the first path segment of its HTTP routes.
    const COLLECTION: &'static str;

    /// Externally visible representation.
    type View: Serialize + Send + 'static;

    /// Called by the store exactly once, while the entity is being inserted.
    fn assign_id(&mut self, id: String);

    fn view(&self) -> Self::View;
}

/// Stored user. Not serializable: only [`UserView`] ever leaves the process.
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip_deserializing)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// User as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    type View = UserView;

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn view(&self) -> UserView {
        UserView::from(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(skip_deserializing)]
    pub id: String,
    pub caption: String,
    pub image_url: String,
    pub timestamp: String,
}

impl Entity for Post {
    const COLLECTION: &'static str = "posts";
    type View = Post;

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn view(&self) -> Post {
        self.clone()
    }
}
