//! GitHub Kubernetes Operator binary.
//!
//! Runs the GitRepository controller against the cluster from the ambient
//! kubeconfig or in-cluster service account.

use clap::Parser;
use futures::StreamExt;
use github_operator::config::OperatorConfig;
use github_operator::controller::{ControllerContext, RetryTracker, error_policy, reconcile};
use github_operator::crd::GitRepository;
use github_operator::observability::{TracingConfig, init_tracing};
use github_operator::provider::GitHubProvider;
use github_operator::store::KubeRepositoryStore;
use kube::runtime::Controller;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::{Api, Client};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = OperatorConfig::parse();

    if config.generate_crds {
        println!("---");
        println!("{}", GitRepository::crd_yaml()?);
        return Ok(());
    }

    init_tracing(&TracingConfig::from_env(config.log_filter()))?;
    config.validate()?;

    tracing::info!(
        api_url = %config.github_api_url,
        namespace = config.namespace.as_deref().unwrap_or("<all>"),
        "Starting GitHub operator"
    );

    let provider = build_provider(&config).await?;
    tracing::info!(owner = %provider.login(), "GitHub provider ready");

    let client = Client::try_default().await?;
    tracing::info!("Connected to Kubernetes cluster");

    let ctx = Arc::new(
        ControllerContext::new(
            Arc::new(KubeRepositoryStore::new(client.clone())),
            Arc::new(provider),
        )
        .with_retries(RetryTracker::new(config.retry_base(), config.retry_max())),
    );

    let repositories: Api<GitRepository> = match config.namespace.as_deref() {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    };

    Controller::new(repositories, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj, action)) => {
                    tracing::debug!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or_default(),
                        ?action,
                        "Reconciled GitRepository"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "GitRepository controller stream error");
                }
            }
        })
        .await;

    tracing::info!("GitHub operator stopped");
    Ok(())
}

async fn build_provider(config: &OperatorConfig) -> anyhow::Result<GitHubProvider> {
    let token = config.github_token.clone().unwrap_or_default();
    let client = github_client::Client::new(&config.github_api_url)?
        .with_token(token)
        .with_user_agent(concat!("github-operator/", env!("CARGO_PKG_VERSION")))
        .with_timeout(config.request_timeout())?;

    let provider =
        GitHubProvider::connect(client, config.github_owner.clone(), config.github_organization)
            .await?;
    Ok(provider)
}
