//! Minimal GitHub REST client for repository lifecycle operations.
//!
//! Covers what a repository controller needs: create a repository for a user
//! or organization, look one up, delete it, and discover the account behind
//! a token.
//!
//! # Example
//!
//! ```no_run
//! use github_client::{Client, ClientError, NewRepository, RepositoryOwner};
//!
//! # async fn example() -> Result<(), ClientError> {
//! let client = Client::new("https://api.github.com")?.with_token("ghp_example");
//! let owner = RepositoryOwner::AuthenticatedUser;
//!
//! match client
//!     .create_repository(&owner, &NewRepository::new("svc-a").private(true))
//!     .await
//! {
//!     Ok(repo) => println!("created {:?}", repo.html_url),
//!     Err(ClientError::AlreadyExists(_)) => println!("already there"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod repositories;
mod types;

pub use client::{Client, DEFAULT_API_URL};
pub use error::{ClientError, Result};
pub use types::{NewRepository, Repository, RepositoryOwner, User};
