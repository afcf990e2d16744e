//! Common test utilities for github-operator tests.
//!
//! In-memory stand-ins for the Kubernetes API and GitHub that record every
//! call, so tests can assert on exactly what the reconciler did.

use github_operator::controller::ControllerContext;
use github_operator::controller::finalizer::GITHUB_REPO_FINALIZER;
use github_operator::crd::{GitRepository, GitRepositorySpec, GitRepositoryStatus};
use github_operator::error::{OperatorError, OperatorResult};
use github_operator::provider::{
    CreateRepository, ProviderError, ProviderFuture, RemoteRepository, RepositoryProvider,
};
use github_operator::store::{ObjectKey, RepositoryStore, StoreFuture};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

pub const NAMESPACE: &str = "default";

/// Build a namespaced GitRepository with resource version "1".
#[allow(dead_code)]
pub fn git_repository(name: &str, private: bool, description: &str) -> GitRepository {
    let mut repo = GitRepository::new(
        name,
        GitRepositorySpec {
            name: name.to_string(),
            private,
            description: description.to_string(),
        },
    );
    repo.metadata.namespace = Some(NAMESPACE.to_string());
    repo.metadata.resource_version = Some("1".to_string());
    repo
}

/// Same object, already created and guarded.
#[allow(dead_code)]
pub fn active_repository(name: &str) -> GitRepository {
    let mut repo = git_repository(name, false, "");
    repo.metadata.finalizers = Some(vec![GITHUB_REPO_FINALIZER.to_string()]);
    repo.status = Some(GitRepositoryStatus {
        created: true,
        id: "100".to_string(),
        url: format!("https://github.com/octocat/{}", name),
        conditions: Vec::new(),
    });
    repo
}

/// Mark an object as being deleted.
#[allow(dead_code)]
pub fn deleting(mut repo: GitRepository) -> GitRepository {
    repo.metadata.deletion_timestamp = Some(Time(chrono::Utc::now()));
    repo
}

pub fn key(name: &str) -> ObjectKey {
    ObjectKey::new(NAMESPACE, name)
}

/// Which write a store call was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Update,
    UpdateStatus,
}

#[derive(Default)]
struct StoreState {
    objects: BTreeMap<ObjectKey, GitRepository>,
    writes: Vec<(ObjectKey, Write)>,
    gets: usize,
    fail_next: VecDeque<(Write, StoreFailure)>,
}

/// Injected store failure.
#[derive(Debug, Clone, Copy)]
pub enum StoreFailure {
    /// Reject as if the resource version were stale.
    Conflict,
}

/// In-memory [`RepositoryStore`] with resource-version checks.
///
/// Objects that are being deleted are removed once their last finalizer is
/// gone, mirroring the API server.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(repos: impl IntoIterator<Item = GitRepository>) -> Self {
        let store = Self::new();
        for repo in repos {
            store.insert(repo);
        }
        store
    }

    pub fn insert(&self, repo: GitRepository) {
        let key = ObjectKey::from_object(&repo).expect("test objects are namespaced");
        self.state.lock().objects.insert(key, repo);
    }

    pub fn object(&self, name: &str) -> Option<GitRepository> {
        self.state.lock().objects.get(&key(name)).cloned()
    }

    /// Change an object out of band, bumping its resource version.
    pub fn modify(&self, name: &str, f: impl FnOnce(&mut GitRepository)) {
        let mut state = self.state.lock();
        let repo = state.objects.get_mut(&key(name)).expect("object exists");
        f(repo);
        bump(repo);
    }

    pub fn remove(&self, name: &str) {
        self.state.lock().objects.remove(&key(name));
    }

    pub fn writes(&self) -> Vec<(ObjectKey, Write)> {
        self.state.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    pub fn gets(&self) -> usize {
        self.state.lock().gets
    }

    pub fn fail_next(&self, write: Write, failure: StoreFailure) {
        self.state.lock().fail_next.push_back((write, failure));
    }

    fn write(&self, repo: GitRepository, kind: Write) -> OperatorResult<GitRepository> {
        let key = ObjectKey::from_object(&repo)?;
        let mut state = self.state.lock();

        if state.fail_next.front().is_some_and(|(expected, _)| *expected == kind) {
            state.fail_next.pop_front();
            return Err(conflict(&key));
        }

        let stored = state
            .objects
            .get_mut(&key)
            .ok_or_else(|| OperatorError::InvalidConfig(format!("{} not found", key)))?;

        if stored.metadata.resource_version != repo.metadata.resource_version {
            return Err(conflict(&key));
        }

        match kind {
            Write::Update => stored.metadata.finalizers = repo.metadata.finalizers.clone(),
            Write::UpdateStatus => stored.status = repo.status.clone(),
        }
        bump(stored);
        let result = stored.clone();

        let reap = result.metadata.deletion_timestamp.is_some()
            && result
                .metadata
                .finalizers
                .as_ref()
                .is_none_or(|f| f.is_empty());
        if reap {
            state.objects.remove(&key);
        }

        state.writes.push((key, kind));
        Ok(result)
    }
}

fn bump(repo: &mut GitRepository) {
    let version = repo
        .metadata
        .resource_version
        .as_deref()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    repo.metadata.resource_version = Some((version + 1).to_string());
}

fn conflict(key: &ObjectKey) -> OperatorError {
    OperatorError::Conflict {
        kind: "GitRepository".into(),
        name: key.name.clone(),
        namespace: key.namespace.clone(),
    }
}

impl RepositoryStore for InMemoryStore {
    fn get(&self, key: ObjectKey) -> StoreFuture<'_, Option<GitRepository>> {
        let mut state = self.state.lock();
        state.gets += 1;
        let repo = state.objects.get(&key).cloned();
        Box::pin(async move { Ok(repo) })
    }

    fn update(&self, repo: GitRepository) -> StoreFuture<'_, GitRepository> {
        let result = self.write(repo, Write::Update);
        Box::pin(async move { result })
    }

    fn update_status(&self, repo: GitRepository) -> StoreFuture<'_, GitRepository> {
        let result = self.write(repo, Write::UpdateStatus);
        Box::pin(async move { result })
    }
}

/// A provider call as seen by [`FakeProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Create(CreateRepository),
    Delete(String),
}

#[derive(Default)]
struct ProviderState {
    repositories: BTreeMap<String, u64>,
    next_id: u64,
    calls: Vec<ProviderCall>,
    create_errors: VecDeque<ProviderError>,
    delete_errors: VecDeque<ProviderError>,
    successful_creates: usize,
}

/// In-memory [`RepositoryProvider`] that behaves like GitHub: creating an
/// existing name returns the existing repository, deleting a missing one
/// reports `NotFound`.
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<ProviderState>>,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(self, name: &str) -> Self {
        {
            let mut state = self.state.lock();
            state.next_id += 1;
            let id = state.next_id;
            state.repositories.insert(name.to_string(), id);
        }
        self
    }

    pub fn fail_next_create(&self, error: ProviderError) {
        self.state.lock().create_errors.push_back(error);
    }

    pub fn fail_next_delete(&self, error: ProviderError) {
        self.state.lock().delete_errors.push_back(error);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Create(_)))
            .count()
    }

    /// Creates that actually produced a new repository.
    pub fn successful_creates(&self) -> usize {
        self.state.lock().successful_creates
    }

    pub fn exists(&self, name: &str) -> bool {
        self.state.lock().repositories.contains_key(name)
    }

    pub fn repository_count(&self) -> usize {
        self.state.lock().repositories.len()
    }

    fn remote(name: &str, id: u64) -> RemoteRepository {
        RemoteRepository {
            id: Some(id),
            html_url: Some(format!("https://github.com/octocat/{}", name)),
            api_url: Some(format!("https://api.github.com/repos/octocat/{}", name)),
        }
    }
}

impl RepositoryProvider for FakeProvider {
    fn create_repository(&self, request: CreateRepository) -> ProviderFuture<'_, RemoteRepository> {
        let mut state = self.state.lock();
        state.calls.push(ProviderCall::Create(request.clone()));

        let result = match state.create_errors.pop_front() {
            Some(error) => Err(error),
            None => match state.repositories.get(&request.name) {
                Some(id) => Ok(Self::remote(&request.name, *id)),
                None => {
                    state.next_id += 1;
                    let id = state.next_id;
                    state.repositories.insert(request.name.clone(), id);
                    state.successful_creates += 1;
                    Ok(Self::remote(&request.name, id))
                }
            },
        };
        Box::pin(async move { result })
    }

    fn delete_repository(&self, name: String) -> ProviderFuture<'_, ()> {
        let mut state = self.state.lock();
        state.calls.push(ProviderCall::Delete(name.clone()));

        let result = match state.delete_errors.pop_front() {
            Some(error) => Err(error),
            None => match state.repositories.remove(&name) {
                Some(_) => Ok(()),
                None => Err(ProviderError::NotFound(name)),
            },
        };
        Box::pin(async move { result })
    }
}

/// Context wired to the given fakes.
pub fn context(store: &InMemoryStore, provider: &FakeProvider) -> Arc<ControllerContext> {
    Arc::new(ControllerContext::new(
        Arc::new(store.clone()),
        Arc::new(provider.clone()),
    ))
}
