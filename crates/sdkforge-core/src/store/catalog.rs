//! Catalog store and the auto-update step.
//!
//! The catalog is read-only at runtime except for auto-update: each
//! component type's newest record points at a repository, and
//! `<repository>/releases.json` lists the versions the vendor currently
//! ships. Versions whose subdir is not in the catalog yet are appended.
//! An unreachable or malformed feed degrades to "no update".

use crate::error::StoreError;
use crate::paths::Paths;
use reqwest::Client;
use sdkforge_schema::{Catalog, ComponentType, SdkFamily, Version};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One entry of a remote release feed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseEntry {
    version: String,
    subdir: String,
    #[serde(default)]
    expected_size_mb: Option<u64>,
}

/// Handle to the catalog document.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    catalog: Catalog,
}

impl CatalogStore {
    /// Load the catalog document.
    pub fn load(paths: &Paths) -> Result<Self, StoreError> {
        let path = paths.catalog_file();
        let json = std::fs::read_to_string(&path)?;
        let catalog = Catalog::from_json(&json).map_err(|source| StoreError::Malformed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { path, catalog })
    }

    /// Read access to the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetch release feeds and append newly discovered component versions.
    ///
    /// Returns the number of appended records. Never fails on network
    /// errors; those are logged and skipped.
    pub async fn auto_update(&mut self, client: &Client) -> Result<usize, StoreError> {
        let mut appended = 0usize;

        let groups: Vec<(SdkFamily, ComponentType)> = self
            .catalog
            .families
            .iter()
            .flat_map(|(fam, f)| {
                f.component_types
                    .iter()
                    .map(move |t| (fam.clone(), t.clone()))
            })
            .collect();

        for (family, ctype) in groups {
            let Some(template) = self
                .catalog
                .components(&family, &ctype)
                .first()
                .map(|c| (*c).clone())
            else {
                continue;
            };
            if template.repository.is_empty() {
                continue;
            }

            let feed_url = format!("{}/releases.json", template.repository.trim_end_matches('/'));
            let entries = match fetch_feed(client, &feed_url).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(%family, %ctype, "release feed unavailable, skipping: {e}");
                    continue;
                }
            };

            for entry in entries {
                if self.catalog.has_subdir(&family, &ctype, &entry.subdir) {
                    debug!(subdir = entry.subdir, "already in catalog");
                    continue;
                }
                info!(%family, %ctype, version = entry.version, "discovered new component version");
                let mut component = template.clone();
                component.id = format!("{}-{}", ctype, entry.version).into();
                component.version = Version::parse(&entry.version);
                component.subdir = entry.subdir;
                if let Some(mb) = entry.expected_size_mb {
                    component.expected_size_mb = mb;
                }
                self.catalog.append(&family, &ctype, component);
                appended += 1;
            }
        }

        if appended > 0 {
            self.save()?;
        }
        Ok(appended)
    }

    fn save(&self) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(&self.catalog).map_err(|source| StoreError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

async fn fetch_feed(client: &Client, url: &str) -> Result<Vec<ReleaseEntry>, String> {
    let resp = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| e.to_string())?;
    resp.json().await.map_err(|e| e.to_string())
}
