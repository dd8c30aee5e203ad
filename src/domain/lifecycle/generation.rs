//! Cache generations and the asset manifest

use std::fmt;

use futures::future::join_all;
use reqwest::Url;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::DomainError;
use crate::domain::cache::{CacheStorage, validate_cache_name};
use crate::domain::fetch::FetchRequest;

/// Identifier of the current cache generation, e.g. `app-v2`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GenerationId(String);

impl GenerationId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_cache_name(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of core asset paths that must be cached on install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    entries: Vec<String>,
}

impl AssetManifest {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves every entry against the scope URL as a GET request
    pub fn requests(&self, scope: &Url) -> Result<Vec<FetchRequest>, DomainError> {
        self.entries
            .iter()
            .map(|entry| {
                scope
                    .join(entry)
                    .map(|url| FetchRequest::new(reqwest::Method::GET, url))
                    .map_err(|e| {
                        DomainError::configuration(format!(
                            "Manifest entry '{}' does not resolve against {}: {}",
                            entry, scope, e
                        ))
                    })
            })
            .collect()
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new(["./", "./index.html", "./style.css", "./manifest.json"])
    }
}

/// Outcome of removing stale generations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// Deletes every generation other than `current`.
///
/// Deletions run concurrently; a failure is logged and recorded but never
/// stops the others.
pub async fn prune_generations(
    storage: &dyn CacheStorage,
    current: &GenerationId,
) -> Result<PruneReport, DomainError> {
    let stale: Vec<String> = storage
        .keys()
        .await?
        .into_iter()
        .filter(|name| name != current.as_str())
        .collect();

    let outcomes = join_all(stale.into_iter().map(|name| async move {
        let outcome = storage.delete(&name).await;
        (name, outcome)
    }))
    .await;

    let mut report = PruneReport::default();

    for (name, outcome) in outcomes {
        match outcome {
            Ok(_) => {
                info!(generation = %name, "Deleted stale cache generation");
                report.deleted.push(name);
            }
            Err(e) => {
                warn!(generation = %name, error = %e, "Failed to delete stale cache generation");
                report.failed.push(name);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::InMemoryCacheStorage;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_generation_id_validation() {
        assert_ok!(GenerationId::new("gousto-v2"));
        assert_err!(GenerationId::new(""));
        assert_err!(GenerationId::new("../etc"));
    }

    #[test]
    fn test_manifest_resolves_relative_to_scope() {
        let manifest = AssetManifest::new(["./", "./index.html"]);
        let scope = Url::parse("http://localhost:8081/app/").unwrap();

        let urls: Vec<String> = manifest
            .requests(&scope)
            .unwrap()
            .iter()
            .map(|r| r.url().to_string())
            .collect();

        assert_eq!(
            urls,
            vec![
                "http://localhost:8081/app/".to_string(),
                "http://localhost:8081/app/index.html".to_string(),
            ]
        );
    }

    #[test]
    fn test_default_manifest() {
        let manifest = AssetManifest::default();

        assert_eq!(manifest.len(), 4);
        assert_eq!(manifest.entries()[1], "./index.html");
    }

    #[tokio::test]
    async fn test_prune_keeps_only_current() {
        let storage = InMemoryCacheStorage::new();
        storage.open("app-v1").await.unwrap();
        storage.open("app-v2").await.unwrap();
        storage.open("other").await.unwrap();
        let current = GenerationId::new("app-v2").unwrap();

        let mut report = prune_generations(&storage, &current).await.unwrap();
        report.deleted.sort();

        assert_eq!(report.deleted, vec!["app-v1".to_string(), "other".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(storage.keys().await.unwrap(), vec!["app-v2".to_string()]);
    }
}
