// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-addressed output store.
//
// Formatted payloads are kept on disk under their SHA-256 hash; job records
// carry only the hash. Identical outputs deduplicate naturally.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use bookforge_core::error::{BookforgeError, Result};

/// Filesystem store for formatted document payloads.
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Write `bytes` under their SHA-256 hash, returning the hex hash.
    #[instrument(skip_all, fields(len = bytes.len()))]
    pub fn store(&self, bytes: &[u8]) -> Result<String> {
        let hash = hex::encode(Sha256::digest(bytes));
        let path = self.root.join(&hash);
        if !path.exists() {
            std::fs::write(&path, bytes)?;
        }
        debug!(%hash, "payload stored");
        Ok(hash)
    }

    /// Read a payload back by its hex hash.
    #[instrument(skip(self))]
    pub fn load(&self, hash: &str) -> Result<Vec<u8>> {
        // Hashes are hex only; anything else would escape the store root.
        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BookforgeError::Database(format!(
                "malformed output reference: {hash}"
            )));
        }
        let path = self.root.join(hash);
        Ok(std::fs::read(path)?)
    }
}
