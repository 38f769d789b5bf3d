//! Content references for exported files.
//!
//! Share targets never see filesystem paths. They get a `content://` URI that
//! resolves only for files under a configured root, only for reading, and only
//! until the grant expires or is revoked.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::config::{IMAGES_DIR, ShareConfig};
use crate::error::{PipelineError, Result};

/// A read-only, expiring reference to a shared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReference {
    uri: String,
    mime_type: String,
    expires_at: DateTime<Utc>,
}

impl ShareReference {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[derive(Debug)]
struct Grant {
    path: PathBuf,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct FileProvider {
    authority: String,
    roots: Vec<(String, PathBuf)>,
    ttl: chrono::Duration,
    grants: Mutex<BTreeMap<String, Grant>>,
}

impl FileProvider {
    pub fn new(authority: impl Into<String>, ttl: Duration) -> Self {
        Self {
            authority: authority.into(),
            roots: Vec::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1)),
            grants: Mutex::new(BTreeMap::new()),
        }
    }

    /// Provider exposing only the export images directory.
    pub fn from_config(config: &ShareConfig) -> Self {
        Self::new(config.provider_authority.clone(), config.grant_ttl)
            .with_root(IMAGES_DIR, config.images_dir())
    }

    /// Exposes files under `dir` as `content://<authority>/<name>/...`.
    pub fn with_root(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.roots.push((name.into(), dir.into()));
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    fn grants(&self) -> MutexGuard<'_, BTreeMap<String, Grant>> {
        self.grants.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn grant_read(&self, path: &Path, mime_type: &str) -> Result<ShareReference> {
        self.grant_read_at(path, mime_type, Utc::now())
    }

    pub fn grant_read_at(
        &self,
        path: &Path,
        mime_type: &str,
        now: DateTime<Utc>,
    ) -> Result<ShareReference> {
        let canonical = path.canonicalize().map_err(|err| {
            PipelineError::permission_grant(path, format!("cannot resolve path: {err}"))
        })?;
        if !canonical.is_file() {
            return Err(PipelineError::permission_grant(path, "not a regular file"));
        }

        let uri = self
            .roots
            .iter()
            .find_map(|(name, dir)| {
                let root = dir.canonicalize().ok()?;
                let relative = canonical.strip_prefix(&root).ok()?;
                let segments: Vec<_> = relative
                    .iter()
                    .map(|segment| segment.to_string_lossy())
                    .collect();
                Some(format!(
                    "content://{}/{}/{}",
                    self.authority,
                    name,
                    segments.join("/")
                ))
            })
            .ok_or_else(|| {
                PipelineError::permission_grant(path, "outside of the provider's shared roots")
            })?;

        let expires_at = now + self.ttl;
        self.grants().insert(
            uri.clone(),
            Grant {
                path: canonical,
                expires_at,
            },
        );
        debug!(target: "shareasqr::export", "read grant issued for {uri} until {expires_at}");

        Ok(ShareReference {
            uri,
            mime_type: mime_type.to_owned(),
            expires_at,
        })
    }

    /// Opens the referenced file for reading, as a share target would.
    pub fn open(&self, reference: &ShareReference) -> Result<File> {
        self.open_at(reference, Utc::now())
    }

    pub fn open_at(&self, reference: &ShareReference, now: DateTime<Utc>) -> Result<File> {
        let mut grants = self.grants();
        let Some(grant) = grants.get(reference.uri()) else {
            return Err(PipelineError::permission_grant(
                reference.uri(),
                "no active grant",
            ));
        };
        if now >= grant.expires_at {
            grants.remove(reference.uri());
            warn!(target: "shareasqr::export", "read grant for {} expired", reference.uri());
            return Err(PipelineError::permission_grant(
                reference.uri(),
                "grant expired",
            ));
        }

        File::open(&grant.path).map_err(|err| PipelineError::export_io(&grant.path, err))
    }

    /// Ends a grant. Returns whether one was active.
    pub fn revoke(&self, reference: &ShareReference) -> bool {
        let revoked = self.grants().remove(reference.uri()).is_some();
        if revoked {
            debug!(target: "shareasqr::export", "read grant for {} revoked", reference.uri());
        }
        revoked
    }

    pub fn active_grants(&self) -> usize {
        self.grants().len()
    }
}
