//! Remote repository provider.
//!
//! The reconciler only needs two operations from a hosting platform: create a
//! repository and delete one by name. [`RepositoryProvider`] captures that
//! capability; [`GitHubProvider`] implements it on top of `github-client`.

use github_client::{Client, ClientError, NewRepository, RepositoryOwner};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors reported by a repository provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The repository does not exist.
    #[error("repository not found: {0}")]
    NotFound(String),

    /// A repository with this name already exists.
    #[error("repository already exists: {0}")]
    AlreadyExists(String),

    /// The request is invalid and will fail the same way if repeated.
    #[error("request rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the provider.
        message: String,
    },

    /// The provider refused or failed the request for a reason that may clear up.
    #[error("provider unavailable (status {status}): {message}")]
    Unavailable {
        /// HTTP status code.
        status: u16,
        /// Error message from the provider.
        message: String,
    },

    /// The request did not complete before the deadline.
    #[error("request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The configured user owner is not the account the token belongs to.
    #[error("configured owner {configured} does not match token owner {authenticated}")]
    OwnerMismatch {
        /// Login given in configuration.
        configured: String,
        /// Login the token authenticates as.
        authenticated: String,
    },
}

impl ProviderError {
    /// Whether repeating the same request could succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            ProviderError::Rejected { .. }
                | ProviderError::AlreadyExists(_)
                | ProviderError::OwnerMismatch { .. }
        )
    }
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        if err.is_timeout() {
            return ProviderError::Timeout;
        }

        match err {
            ClientError::NotFound(message) => ProviderError::NotFound(message),
            ClientError::AlreadyExists(message) => ProviderError::AlreadyExists(message),
            ClientError::Api { status, message } if status == 400 || status == 422 => {
                ProviderError::Rejected { status, message }
            }
            ClientError::Api { status, message } => ProviderError::Unavailable { status, message },
            other => ProviderError::Transport(other.to_string()),
        }
    }
}

/// Parameters of a repository creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepository {
    /// Repository name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Visibility.
    pub private: bool,
}

/// What the provider reports about a repository it created or found.
///
/// Fields are optional because providers do not always return them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRepository {
    /// Numeric identifier.
    pub id: Option<u64>,
    /// Browser URL.
    pub html_url: Option<String>,
    /// API URL.
    pub api_url: Option<String>,
}

impl From<github_client::Repository> for RemoteRepository {
    fn from(repo: github_client::Repository) -> Self {
        Self {
            id: repo.id,
            html_url: repo.html_url,
            api_url: repo.url,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Type alias for async provider futures.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = ProviderResult<T>> + Send + 'a>>;

/// A hosting platform that can create and delete repositories by name.
///
/// Implementations are shared by every reconciliation and must be safe for
/// concurrent use. Calls are single-shot: retrying is the caller's decision.
pub trait RepositoryProvider: Send + Sync {
    /// Create a repository.
    ///
    /// Must be safe to repeat: if the repository already exists the
    /// implementation should report the existing one rather than fail.
    fn create_repository(&self, request: CreateRepository) -> ProviderFuture<'_, RemoteRepository>;

    /// Delete a repository by name.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] if there is nothing to delete.
    fn delete_repository(&self, name: String) -> ProviderFuture<'_, ()>;
}

/// [`RepositoryProvider`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: Client,
    owner: RepositoryOwner,
    /// Login used for `/repos/{owner}/{name}` paths.
    login: String,
}

impl GitHubProvider {
    /// Create a provider for a known owner.
    pub fn new(client: Client, owner: RepositoryOwner, login: impl Into<String>) -> Self {
        Self {
            client,
            owner,
            login: login.into(),
        }
    }

    /// Create a provider for the configured owner.
    ///
    /// Organization owners are taken as given. Repositories for a user owner
    /// are created under the token's account, so the login is always read
    /// from `GET /user` and a configured user login must match it.
    ///
    /// # Errors
    ///
    /// Returns an error if the login cannot be discovered, or
    /// [`ProviderError::OwnerMismatch`] if it differs from the configured one.
    pub async fn connect(
        client: Client,
        owner: Option<String>,
        organization: bool,
    ) -> ProviderResult<Self> {
        if let (Some(login), true) = (&owner, organization) {
            return Ok(Self::new(
                client,
                RepositoryOwner::Organization(login.clone()),
                login.clone(),
            ));
        }

        let user = client.authenticated_user().await?;
        match owner {
            Some(configured) if !configured.eq_ignore_ascii_case(&user.login) => {
                Err(ProviderError::OwnerMismatch {
                    configured,
                    authenticated: user.login,
                })
            }
            _ => {
                tracing::info!(login = %user.login, "Resolved GitHub owner from token");
                Ok(Self::new(client, RepositoryOwner::AuthenticatedUser, user.login))
            }
        }
    }

    /// Login repositories are created under.
    pub fn login(&self) -> &str {
        &self.login
    }

    async fn create(&self, request: CreateRepository) -> ProviderResult<RemoteRepository> {
        let new_repo = NewRepository::new(request.name.clone())
            .description(request.description)
            .private(request.private);

        match self.client.create_repository(&self.owner, &new_repo).await {
            Ok(repo) => Ok(repo.into()),
            Err(ClientError::AlreadyExists(message)) => {
                // Earlier attempt may have succeeded without its result being recorded.
                tracing::info!(
                    owner = %self.login,
                    repository = %request.name,
                    message = %message,
                    "Repository already exists, adopting it"
                );
                let repo = self.client.get_repository(&self.login, &request.name).await?;
                Ok(repo.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl RepositoryProvider for GitHubProvider {
    fn create_repository(&self, request: CreateRepository) -> ProviderFuture<'_, RemoteRepository> {
        Box::pin(self.create(request))
    }

    fn delete_repository(&self, name: String) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            self.client
                .delete_repository(&self.login, &name)
                .await
                .map_err(ProviderError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_mapping() {
        assert_eq!(
            ProviderError::from(ClientError::NotFound("Not Found".into())),
            ProviderError::NotFound("Not Found".into())
        );
        assert_eq!(
            ProviderError::from(ClientError::Api {
                status: 422,
                message: "Validation Failed".into()
            }),
            ProviderError::Rejected {
                status: 422,
                message: "Validation Failed".into()
            }
        );
        assert_eq!(
            ProviderError::from(ClientError::Api {
                status: 403,
                message: "rate limited".into()
            }),
            ProviderError::Unavailable {
                status: 403,
                message: "rate limited".into()
            }
        );
        assert!(matches!(
            ProviderError::from(ClientError::InvalidUrl("nope".into())),
            ProviderError::Transport(_)
        ));
    }

    #[test]
    fn transient_classification() {
        assert!(ProviderError::Timeout.is_transient());
        assert!(ProviderError::Transport("reset".into()).is_transient());
        assert!(
            ProviderError::Unavailable {
                status: 502,
                message: "bad gateway".into()
            }
            .is_transient()
        );
        assert!(
            !ProviderError::Rejected {
                status: 400,
                message: "bad".into()
            }
            .is_transient()
        );
        assert!(
            !ProviderError::OwnerMismatch {
                configured: "alice".into(),
                authenticated: "octocat".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn remote_repository_from_github() {
        let repo = github_client::Repository {
            id: Some(9),
            html_url: Some("https://github.com/octocat/svc-a".into()),
            ..Default::default()
        };
        let remote = RemoteRepository::from(repo);
        assert_eq!(remote.id, Some(9));
        assert_eq!(remote.api_url, None);
    }
}
