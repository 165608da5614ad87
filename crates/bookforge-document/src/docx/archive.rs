// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX container handling.
//
// A DOCX file is a ZIP archive of XML parts and resources. The formatter only
// needs to read `word/document.xml`, replace it, and repack everything else
// untouched, so the container is modelled as a flat path → bytes map.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};

use zip::CompressionMethod;
use zip::read::ZipArchive;
use zip::write::ZipWriter;

use bookforge_core::error::{BookforgeError, Result};

/// Path of the main document part inside the container.
pub const DOCUMENT_XML: &str = "word/document.xml";

/// An unpacked DOCX container.
#[derive(Debug)]
pub struct DocxArchive {
    /// All files in the archive, keyed by path.
    files: HashMap<String, Vec<u8>>,
}

impl DocxArchive {
    /// Unpack a DOCX from raw bytes already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Unpack from any reader that implements Read + Seek.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| BookforgeError::Docx(format!("not a ZIP container: {e}")))?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| BookforgeError::Docx(format!("archive entry {i}: {e}")))?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// An empty container, for synthesizing documents from scratch.
    pub fn empty() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Get a part's contents by path.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// The main document content (`word/document.xml`).
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_XML)
            .ok_or_else(|| BookforgeError::Docx(format!("missing part {DOCUMENT_XML}")))
    }

    /// Set or replace a part's contents.
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a part's contents from a string.
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Check if a part exists in the archive.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Repack the container into DOCX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to any writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options =
            zip::write::SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        // Sort keys for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort();

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path.clone(), options)
                .map_err(|e| BookforgeError::Docx(format!("start entry {path}: {e}")))?;
            zip.write_all(contents)?;
        }

        zip.finish()
            .map_err(|e| BookforgeError::Docx(format!("finish archive: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_round_trip() {
        let mut archive = DocxArchive::empty();
        archive.set_string(DOCUMENT_XML, "<w:document/>");
        assert!(archive.contains(DOCUMENT_XML));

        let bytes = archive.to_bytes().expect("repack");
        let restored = DocxArchive::from_bytes(&bytes).expect("unpack");
        assert_eq!(restored.document_xml().expect("part"), b"<w:document/>");
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let result = DocxArchive::from_bytes(b"definitely not a zip");
        assert!(matches!(result, Err(BookforgeError::Docx(_))));
    }

    #[test]
    fn missing_document_part_is_reported() {
        let archive = DocxArchive::empty();
        assert!(archive.document_xml().is_err());
    }
}
