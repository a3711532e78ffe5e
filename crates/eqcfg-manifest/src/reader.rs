//! Bundle metadata reader
//!
//! Opens one plugin archive, locates `META-INF/MANIFEST.MF` and turns its
//! main attributes into a [`BundleDescriptor`].
//!
//! Entries are scanned in stream order through their local headers, so an
//! archive with a damaged or missing central directory is still read. Only
//! when an entry before the manifest has no sizes in its local header (data
//! descriptor) is the rest of the archive buffered and the central directory
//! used instead.
//!
//! Three outcomes are possible:
//! - `Ok(Some(_))` - the archive is an OSGi bundle or fragment
//! - `Ok(None)` - the archive cannot be inspected as a bundle: not a zip
//!   container, no manifest, or no `Bundle-SymbolicName`
//! - `Err(_)` - an I/O fault while reading, fatal for the whole run

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::read::read_zipfile_from_stream;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::descriptor::BundleDescriptor;
use crate::errors::ManifestError;
use crate::manifest::{
    strip_directives, JarManifest, BUNDLE_SYMBOLIC_NAME, BUNDLE_VERSION, FRAGMENT_HOST,
    MANIFEST_PATH,
};

/// Read bundle metadata from an archive stream.
///
/// `file_name` is recorded in the descriptor and in error messages. The
/// stream is consumed and dropped before returning, whatever the outcome.
pub fn read_bundle<R: Read>(
    archive: R,
    file_name: &str,
) -> Result<Option<BundleDescriptor>, ManifestError> {
    if file_name.is_empty() {
        return Err(ManifestError::InvalidDescriptor(
            "archive file name must not be empty",
        ));
    }

    let Some(manifest) = load_manifest(archive, file_name)? else {
        debug!("No manifest in {}", file_name);
        return Ok(None);
    };

    let Some(raw_name) = manifest.main_attribute(BUNDLE_SYMBOLIC_NAME) else {
        debug!("Not a bundle: no {} in {}", BUNDLE_SYMBOLIC_NAME, file_name);
        return Ok(None);
    };
    let symbolic_name = strip_directives(raw_name);
    if symbolic_name.is_empty() {
        debug!("Not a bundle: empty {} in {}", BUNDLE_SYMBOLIC_NAME, file_name);
        return Ok(None);
    }

    let version = manifest.main_attribute(BUNDLE_VERSION).map(str::to_string);

    let descriptor = match manifest.main_attribute(FRAGMENT_HOST) {
        None => BundleDescriptor::bundle(file_name, symbolic_name, version)?,
        Some(host) => {
            BundleDescriptor::fragment(file_name, symbolic_name, version, strip_directives(host))?
        }
    };
    debug!("Read {}", descriptor);
    Ok(Some(descriptor))
}

/// Read bundle metadata from an archive on disk.
pub fn read_bundle_file(path: &Path) -> Result<Option<BundleDescriptor>, ManifestError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(ManifestError::InvalidDescriptor(
            "archive path has no UTF-8 file name",
        ))?;

    let file = File::open(path).map_err(|source| ManifestError::ArchiveRead {
        archive: file_name.to_string(),
        source,
    })?;
    read_bundle(BufReader::new(file), file_name)
}

enum StreamScan {
    Found(Vec<u8>),
    NotFound,
    /// An entry's local header cannot be streamed past
    NeedsDirectory,
}

/// Keeps every byte read so the archive can be reopened from memory.
struct RecordingReader<R> {
    inner: R,
    consumed: Vec<u8>,
}

impl<R: Read> RecordingReader<R> {
    fn new(inner: R) -> Self {
        RecordingReader {
            inner,
            consumed: Vec::new(),
        }
    }

    fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        self.inner.read_to_end(&mut self.consumed)?;
        Ok(self.consumed)
    }
}

impl<R: Read> Read for RecordingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.consumed.extend_from_slice(&buf[..read]);
        Ok(read)
    }
}

fn load_manifest<R: Read>(archive: R, file_name: &str) -> Result<Option<JarManifest>, ManifestError> {
    let mut stream = RecordingReader::new(archive);
    let bytes = match scan_stream(&mut stream, file_name)? {
        StreamScan::Found(bytes) => bytes,
        StreamScan::NotFound => return Ok(None),
        StreamScan::NeedsDirectory => {
            debug!("Reading {} through its central directory", file_name);
            let buffered = stream
                .into_bytes()
                .map_err(|source| archive_read(file_name, source))?;
            match read_from_directory(Cursor::new(buffered), file_name)? {
                Some(bytes) => bytes,
                None => return Ok(None),
            }
        }
    };

    JarManifest::parse(&bytes)
        .map(Some)
        .map_err(|err| ManifestError::MalformedManifest {
            archive: file_name.to_string(),
            line: err.line,
            reason: err.reason,
        })
}

// A stream that ends or stops looking like a local header ends the entries,
// as with `java.util.zip.ZipInputStream`.
fn scan_stream<R: Read>(stream: &mut R, file_name: &str) -> Result<StreamScan, ManifestError> {
    loop {
        let mut entry = match read_zipfile_from_stream(stream) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(StreamScan::NotFound),
            Err(ZipError::UnsupportedArchive(reason)) => {
                debug!("Cannot stream {}: {}", file_name, reason);
                return Ok(StreamScan::NeedsDirectory);
            }
            Err(ZipError::Io(source)) if source.kind() == io::ErrorKind::UnexpectedEof => {
                return Ok(StreamScan::NotFound);
            }
            Err(ZipError::Io(source)) => return Err(archive_read(file_name, source)),
            Err(other) => {
                debug!("No more entries in {}: {}", file_name, other);
                return Ok(StreamScan::NotFound);
            }
        };

        if entry.name() == MANIFEST_PATH {
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| archive_read(file_name, source))?;
            return Ok(StreamScan::Found(bytes));
        }
    }
}

fn read_from_directory(
    archive: Cursor<Vec<u8>>,
    file_name: &str,
) -> Result<Option<Vec<u8>>, ManifestError> {
    let mut zip = match ZipArchive::new(archive) {
        Ok(zip) => zip,
        Err(err) => {
            debug!("{} has no readable central directory: {}", file_name, err);
            return Ok(None);
        }
    };

    let Some(index) = (0..zip.len()).find(|&i| zip.name_for_index(i) == Some(MANIFEST_PATH))
    else {
        return Ok(None);
    };

    let mut entry = zip.by_index(index).map_err(|err| match err {
        ZipError::Io(source) => archive_read(file_name, source),
        other => archive_read(file_name, io::Error::other(other)),
    })?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|source| archive_read(file_name, source))?;
    Ok(Some(bytes))
}

fn archive_read(file_name: &str, source: io::Error) -> ManifestError {
    ManifestError::ArchiveRead {
        archive: file_name.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn jar_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn read(bytes: Vec<u8>, file_name: &str) -> Option<BundleDescriptor> {
        read_bundle(Cursor::new(bytes), file_name).unwrap()
    }

    #[test]
    fn test_read_bundle() {
        let jar = jar_bytes(&[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\nBundle-SymbolicName: com.sarod.test.bundle;singleton:=true\nBundle-Version: 1.0.0\n"),
            ("com/sarod/Test.class", "bytes"),
        ]);
        let info = read(jar, "bundle.jar").unwrap();
        assert_eq!(info.symbolic_name(), "com.sarod.test.bundle");
        assert_eq!(info.file_name(), "bundle.jar");
        assert_eq!(info.version(), Some("1.0.0"));
        assert!(!info.is_fragment());
    }

    #[test]
    fn test_read_fragment() {
        let jar = jar_bytes(&[(
            "META-INF/MANIFEST.MF",
            "Bundle-SymbolicName: com.sarod.test.fragment\nFragment-Host: com.sarod.test.bundle;bundle-version=\"1.0.0\"\n",
        )]);
        let info = read(jar, "fragment.jar").unwrap();
        assert_eq!(info.symbolic_name(), "com.sarod.test.fragment");
        assert!(info.is_fragment());
        assert_eq!(info.fragment_host(), Some("com.sarod.test.bundle"));
        assert_eq!(info.version(), None);
    }

    #[test]
    fn test_manifest_found_after_other_entries() {
        let jar = jar_bytes(&[
            ("plugin.xml", "<plugin/>"),
            ("META-INF/MANIFEST.MF", "Bundle-SymbolicName:  padded.name  \n"),
        ]);
        assert_eq!(read(jar, "late.jar").unwrap().symbolic_name(), "padded.name");
    }

    #[test]
    fn test_version_kept_verbatim() {
        let jar = jar_bytes(&[(
            "META-INF/MANIFEST.MF",
            "Bundle-SymbolicName: v\nBundle-Version: 3.1.0.v20240101 \n",
        )]);
        assert_eq!(read(jar, "v.jar").unwrap().version(), Some("3.1.0.v20240101 "));
    }

    #[test]
    fn test_non_osgi_jar() {
        let jar = jar_bytes(&[("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\nMain-Class: Foo\n")]);
        assert!(read(jar, "non-osgi.jar").is_none());
    }

    #[test]
    fn test_no_manifest() {
        let jar = jar_bytes(&[("readme.txt", "hello")]);
        assert!(read(jar, "no-manifest.zip").is_none());
    }

    #[test]
    fn test_empty_zip() {
        assert!(read(jar_bytes(&[]), "empty.jar").is_none());
    }

    #[test]
    fn test_not_a_jar() {
        let text = b"This is definitely not a zip archive, just some text.\n".to_vec();
        assert!(read(text, "not-a-jar.txt").is_none());
        assert!(read(Vec::new(), "zero-bytes.jar").is_none());
    }

    #[test]
    fn test_directive_only_name_is_not_a_bundle() {
        let jar = jar_bytes(&[("META-INF/MANIFEST.MF", "Bundle-SymbolicName: ;singleton:=true\n")]);
        assert!(read(jar, "odd.jar").is_none());
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let jar = jar_bytes(&[(
            "META-INF/MANIFEST.MF",
            "Bundle-SymbolicName: ok\nthis line has no separator\n",
        )]);
        let err = read_bundle(Cursor::new(jar), "bad.jar").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MalformedManifest { ref archive, line: 2, .. } if archive == "bad.jar"
        ));
    }

    #[test]
    fn test_empty_file_name_rejected() {
        let jar = jar_bytes(&[("META-INF/MANIFEST.MF", "Bundle-SymbolicName: a\n")]);
        assert!(matches!(
            read_bundle(Cursor::new(jar), ""),
            Err(ManifestError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_manifest_read_without_end_of_central_directory() {
        let mut jar = jar_bytes(&[
            ("META-INF/MANIFEST.MF", "Bundle-SymbolicName: streamed\nBundle-Version: 2.0\n"),
            ("plugin.xml", "<plugin/>"),
        ]);
        // End of central directory record without a comment
        jar.truncate(jar.len() - 22);

        let info = read(jar, "cut.jar").unwrap();
        assert_eq!(info.symbolic_name(), "streamed");
        assert_eq!(info.version(), Some("2.0"));
    }

    #[test]
    fn test_data_descriptor_entry_uses_central_directory() {
        let mut jar = jar_bytes(&[
            ("plugin.xml", "<plugin/>"),
            ("META-INF/MANIFEST.MF", "Bundle-SymbolicName: described\n"),
        ]);
        // General purpose flag bit 3 of the first local header
        jar[6] |= 0x08;

        assert_eq!(read(jar, "described.jar").unwrap().symbolic_name(), "described");
    }

    #[test]
    fn test_corrupted_manifest_is_an_archive_read_error() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                "META-INF/MANIFEST.MF",
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored),
            )
            .unwrap();
        writer.write_all(b"Bundle-SymbolicName: crc.bundle\n").unwrap();
        let mut jar = writer.finish().unwrap().into_inner();

        let at = jar
            .windows(b"crc.bundle".len())
            .position(|window| window == b"crc.bundle")
            .unwrap();
        jar[at] = b'x';

        let err = read_bundle(Cursor::new(jar), "crc.jar").unwrap_err();
        assert!(matches!(err, ManifestError::ArchiveRead { ref archive, .. } if archive == "crc.jar"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_read_bundle_file_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = read_bundle_file(&temp.path().join("gone.jar")).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ArchiveRead { ref archive, .. } if archive == "gone.jar"
        ));
    }

    #[test]
    fn test_read_bundle_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("disk.jar");
        std::fs::write(
            &path,
            jar_bytes(&[("META-INF/MANIFEST.MF", "Bundle-SymbolicName: on.disk\n")]),
        )
        .unwrap();
        let info = read_bundle_file(&path).unwrap().unwrap();
        assert_eq!(info.symbolic_name(), "on.disk");
        assert_eq!(info.file_name(), "disk.jar");
    }
}
