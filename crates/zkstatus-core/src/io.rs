//! Serialization helpers for status chains and `ProofArtifact`s.
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON
//! for writes.
//!
//! Extras:
//! - In-memory CBOR helpers: [`to_cbor`] / [`from_cbor`]
//! - [`write_atomic`]: temp sibling + rename, so readers never observe a
//!   partially written file.

use crate::{ProofArtifact, Status};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Ensure the parent directory for a file exists (no-op if none).
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

/// ------------------------------
/// Generic JSON / CBOR
/// ------------------------------

/// Read any `T` from **JSON**.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("deserialize JSON {}", display(path_ref)))
}

/// Write any `T` to **JSON** (pretty).
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v)
        .with_context(|| format!("serialize JSON {}", display(path_ref)))?;
    w.flush().with_context(|| format!("flush {}", display(path_ref)))?;
    Ok(())
}

/// Read any `T` from **CBOR**.
pub fn read_cbor<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr)
        .with_context(|| format!("deserialize CBOR {}", display(path_ref)))
}

/// Write any `T` to **CBOR**.
pub fn write_cbor<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w)
        .with_context(|| format!("serialize CBOR {}", display(path_ref)))?;
    w.flush().with_context(|| format!("flush {}", display(path_ref)))?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_auto<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_json(path),
        Some("cbor") => read_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported extension: {} (supported: .json, .cbor)",
            other
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_auto<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_cbor(path, v),
        _ => write_json(path, v),
    }
}

/// ------------------------------
/// Status chains
/// ------------------------------

/// Read a `Vec<Status>` chain (`.json` / `.cbor`).
pub fn read_status_chain_auto<P: AsRef<Path>>(path: P) -> Result<Vec<Status>> {
    read_auto(path).context("read status chain")
}

/// Write a status chain (JSON unless the extension says `.cbor`).
pub fn write_status_chain_auto<P: AsRef<Path>>(path: P, v: &[Status]) -> Result<()> {
    write_auto(path, v).context("write status chain")
}

/// ------------------------------
/// ProofArtifact I/O
/// ------------------------------

/// Auto-detect read for `ProofArtifact` by extension.
pub fn read_proof_artifact_auto<P: AsRef<Path>>(path: P) -> Result<ProofArtifact> {
    read_auto(path).context("read proof artifact")
}

/// Auto-detect write for `ProofArtifact` (defaults to **JSON** if unknown).
pub fn write_proof_artifact_auto<P: AsRef<Path>>(path: P, v: &ProofArtifact) -> Result<()> {
    write_auto(path, v).context("write proof artifact")
}

/// ------------------------------
/// Atomic writes
/// ------------------------------

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling path used while writing `path` atomically.
///
/// Unique per call (process id plus a process-wide sequence number), so
/// concurrent writers of the same target never share a temp file.
#[must_use]
pub fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".tmp.{}.{seq}", std::process::id()));
    path.with_file_name(name)
}

/// Write `bytes` to a temp sibling, fsync, then rename over `path`.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let tmp = tmp_sibling(path_ref);
    {
        let mut f = File::create(&tmp).with_context(|| format!("create {}", display(&tmp)))?;
        f.write_all(bytes)
            .with_context(|| format!("write {}", display(&tmp)))?;
        f.sync_all().with_context(|| format!("sync {}", display(&tmp)))?;
    }
    fs::rename(&tmp, path_ref).with_context(|| {
        let _ = fs::remove_file(&tmp);
        format!("rename {} -> {}", display(&tmp), display(path_ref))
    })?;
    Ok(())
}

/// ------------------------------
/// In-memory CBOR helpers
/// ------------------------------

/// Serialize any `T: Serialize` to **CBOR bytes** using `ciborium`.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).with_context(|| "serialize CBOR (to_cbor)")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from **CBOR bytes** using `ciborium`.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let v = ciborium::de::from_reader(&mut cur).with_context(|| "deserialize CBOR (from_cbor)")?;
    Ok(v)
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Human-friendly path display for error messages.
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
