//! Shared test utilities for integration tests.
//!
//! This module provides archive byte builders, on-disk fixtures and a
//! recording resource pool used across multiple test files.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use arcmgr::{Archive, ArchiveId, Event, Inbox, Registry, RegistryConfig, ResourcePool};
use tempfile::TempDir;
use zip::write::FileOptions;

// =============================================================================
// Archive byte builders
// =============================================================================

/// Builds a Doom wad with the given lumps, in order.
pub fn wad_bytes(iwad: bool, lumps: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut directory = Vec::new();
    for (name, data) in lumps {
        directory.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
        directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
        let mut raw = [0u8; 8];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        directory.extend_from_slice(&raw);
        body.extend_from_slice(data);
    }

    let mut out = Vec::new();
    out.extend_from_slice(if iwad { b"IWAD" } else { b"PWAD" });
    out.extend_from_slice(&(lumps.len() as i32).to_le_bytes());
    out.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&directory);
    out
}

/// Builds a PWAD with the given lumps.
pub fn pwad(lumps: &[(&str, &[u8])]) -> Vec<u8> {
    wad_bytes(false, lumps)
}

/// Builds a stored (uncompressed) zip with the given files.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (path, data) in files {
        writer.start_file(*path, options).expect("start zip file");
        writer.write_all(data).expect("write zip file");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Builds a Quake pak with the given files.
pub fn pak_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut directory = Vec::new();
    for (name, data) in files {
        let mut raw = [0u8; 56];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        directory.extend_from_slice(&raw);
        directory.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
        directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
        body.extend_from_slice(data);
    }

    let mut out = b"PACK".to_vec();
    out.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
    out.extend_from_slice(&(directory.len() as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&directory);
    out
}

/// Builds a Build engine grp with the given files.
pub fn grp_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = b"KenSilverman".to_vec();
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());
    for (name, data) in files {
        let mut raw = [0u8; 12];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&raw);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    }
    for (_, data) in files {
        out.extend_from_slice(data);
    }
    out
}

/// Builds a ustar archive with the given regular files.
pub fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    const BLOCK: usize = 512;

    let mut out = Vec::new();
    for (name, data) in files {
        let mut header = [0u8; BLOCK];
        header[..name.len()].copy_from_slice(name.as_bytes());
        header[100..108].copy_from_slice(b"0000644\0");
        header[124..136].copy_from_slice(format!("{:011o}\0", data.len()).as_bytes());
        header[156] = b'0';
        header[257..263].copy_from_slice(b"ustar\0");
        header[263..265].copy_from_slice(b"00");
        header[148..156].copy_from_slice(b"        ");
        let sum: u64 = header.iter().map(|&b| u64::from(b)).sum();
        header[148..156].copy_from_slice(format!("{:06o}\0 ", sum).as_bytes());

        out.extend_from_slice(&header);
        out.extend_from_slice(data);
        out.resize(out.len().div_ceil(BLOCK) * BLOCK, 0);
    }
    out.extend_from_slice(&[0u8; BLOCK * 2]);
    out
}

/// Builds a Quake wad2 with the given uncompressed lumps.
pub fn wad2_bytes(lumps: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut directory = Vec::new();
    for (name, data) in lumps {
        directory.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
        directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
        directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
        directory.extend_from_slice(&[0x44, 0, 0, 0]);
        let mut raw = [0u8; 16];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        directory.extend_from_slice(&raw);
        body.extend_from_slice(data);
    }

    let mut out = b"WAD2".to_vec();
    out.extend_from_slice(&(lumps.len() as i32).to_le_bytes());
    out.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&directory);
    out
}

// =============================================================================
// On-disk fixtures
// =============================================================================

/// Writes `bytes` to `name` inside `dir` and returns the full path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture directory");
    }
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Creates a temporary directory for fixtures.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

/// Builds a registry with default configuration.
pub fn registry() -> Registry {
    Registry::new(RegistryConfig::default())
}

/// Builds a registry that mounts embedded wads.
pub fn mounting_registry() -> Registry {
    Registry::new(RegistryConfig::new().auto_mount_embedded(true))
}

/// Subscribes an inbox that records every registry notification.
pub fn record_events(registry: &mut Registry) -> Inbox<Event> {
    registry.events_mut().subscribe_inbox().1
}

/// Returns the filename of a registered archive.
pub fn filename(registry: &Registry, id: ArchiveId) -> String {
    registry
        .archive(id)
        .map(|archive| archive.filename().to_string())
        .expect("archive is registered")
}

/// Panics unless `result` is an error, returning the error.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("expected an error"),
        Err(e) => e,
    }
}

// =============================================================================
// Resource pool
// =============================================================================

/// One call received by [`RecordingPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolCall {
    Add(ArchiveId),
    Remove(ArchiveId),
}

/// Resource pool that records every call.
#[derive(Debug, Default)]
pub struct RecordingPool {
    pub calls: Vec<PoolCall>,
}

impl RecordingPool {
    /// Creates a shared pool handle for [`Registry::with_pool`].
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Returns the archives currently added and not removed.
    pub fn live(&self) -> Vec<ArchiveId> {
        let mut live = Vec::new();
        for call in &self.calls {
            match *call {
                PoolCall::Add(id) => live.push(id),
                PoolCall::Remove(id) => live.retain(|&l| l != id),
            }
        }
        live
    }
}

impl ResourcePool for RecordingPool {
    fn add_archive(&mut self, id: ArchiveId, _archive: &dyn Archive) {
        self.calls.push(PoolCall::Add(id));
    }

    fn remove_archive(&mut self, id: ArchiveId) {
        self.calls.push(PoolCall::Remove(id));
    }
}
