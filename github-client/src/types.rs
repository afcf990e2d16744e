//! Request and response types for the repository endpoints.

use serde::{Deserialize, Serialize};

/// Account a repository belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOwner {
    /// The user the token was issued for (`/user/repos`).
    AuthenticatedUser,
    /// A named user account.
    User(String),
    /// An organization (`/orgs/{org}/repos`).
    Organization(String),
}

impl RepositoryOwner {
    /// Owner login, if known without asking the API.
    pub fn login(&self) -> Option<&str> {
        match self {
            RepositoryOwner::AuthenticatedUser => None,
            RepositoryOwner::User(login) | RepositoryOwner::Organization(login) => {
                Some(login.as_str())
            }
        }
    }
}

/// Body of a repository creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    /// Repository name.
    pub name: String,
    /// Short description; omitted when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the repository is private.
    pub private: bool,
}

impl NewRepository {
    /// A public repository with no description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            private: false,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the visibility.
    #[must_use]
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}

/// Repository as returned by the API.
///
/// Every field is optional so that sparse responses still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// Numeric repository id.
    #[serde(default)]
    pub id: Option<u64>,
    /// Repository name.
    #[serde(default)]
    pub name: Option<String>,
    /// `owner/name`.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Browser URL.
    #[serde(default)]
    pub html_url: Option<String>,
    /// API URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Visibility flag.
    #[serde(default)]
    pub private: bool,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// The account behind the token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Login name.
    pub login: String,
    /// Numeric account id.
    #[serde(default)]
    pub id: Option<u64>,
}
