//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! The reader inflates every member up front into an ordered map keyed by
//! member name; the writer deflates parts into an in-memory archive.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Largest inflated size accepted for one member.
pub const MAX_MEMBER_SIZE: u64 = 1 << 30;

/// Physical package reader holding the inflated members of a ZIP archive.
#[derive(Debug, Clone, Default)]
pub struct PhysPkgReader {
    /// Member name (no leading slash) to inflated bytes
    members: BTreeMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Read every file member of a ZIP archive.
    ///
    /// Directory entries are skipped. Member names written with backslash
    /// separators are normalized to forward slashes.
    ///
    /// # Errors
    /// Returns `ZipError` if the bytes are not a readable archive, and
    /// `OversizedMember` for a member that declares or inflates to more than
    /// [`MAX_MEMBER_SIZE`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = BTreeMap::new();

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = PackURI::from_membername(file.name()).membername().to_string();
            let declared = file.size();
            if declared > MAX_MEMBER_SIZE {
                return Err(OpcError::OversizedMember { name, size: declared });
            }

            // Reserve no more than the archive itself holds.
            let capacity = declared.min(data.len() as u64) as usize;
            let mut blob = Vec::with_capacity(capacity);
            file.take(MAX_MEMBER_SIZE + 1).read_to_end(&mut blob)?;
            if blob.len() as u64 > MAX_MEMBER_SIZE {
                return Err(OpcError::OversizedMember {
                    name,
                    size: blob.len() as u64,
                });
            }
            members.insert(name, blob);
        }

        Ok(Self { members })
    }

    /// Get the number of file members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the package is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate member names in sorted order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Consume the reader and return the member map.
    #[inline]
    pub fn into_members(self) -> BTreeMap<String, Vec<u8>> {
        self.members
    }
}

/// Physical package writer for creating OPC packages in memory.
pub struct PhysPkgWriter {
    archive: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    /// Create a new package writer that writes to memory.
    pub fn new() -> Self {
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Write a part to the package with Deflate compression.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.write_member(pack_uri.membername(), blob)
    }

    /// Write a member by its raw name with Deflate compression.
    pub fn write_member(&mut self, membername: &str, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.archive.start_file(membername, options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the package bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.archive.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
