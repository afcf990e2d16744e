//! Repository lifecycle operations.

use crate::client::Client;
use crate::error::Result;
use crate::types::{NewRepository, Repository, RepositoryOwner, User};

impl Client {
    /// Create a repository for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyExists`](crate::ClientError::AlreadyExists) when the
    /// owner already has a repository with that name, or another error if the
    /// request fails.
    pub async fn create_repository(
        &self,
        owner: &RepositoryOwner,
        repository: &NewRepository,
    ) -> Result<Repository> {
        let path = match owner {
            RepositoryOwner::Organization(org) => format!("orgs/{}/repos", org),
            RepositoryOwner::AuthenticatedUser | RepositoryOwner::User(_) => "user/repos".to_string(),
        };

        tracing::debug!(repository = %repository.name, path = %path, "Creating repository");
        let response = self.post(&path, repository).await?;
        self.handle_response(response).await
    }

    /// Fetch a repository by owner login and name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`](crate::ClientError::NotFound) if it does not exist.
    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        let response = self.get(&format!("repos/{}/{}", owner, name)).await?;
        self.handle_response(response).await
    }

    /// Delete a repository by owner login and name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`](crate::ClientError::NotFound) if it does not exist.
    pub async fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
        tracing::debug!(owner = %owner, repository = %name, "Deleting repository");
        let response = self.delete(&format!("repos/{}/{}", owner, name)).await?;
        self.handle_empty_response(response).await
    }

    /// The account the configured token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or invalid.
    pub async fn authenticated_user(&self) -> Result<User> {
        let response = self.get("user").await?;
        self.handle_response(response).await
    }
}
