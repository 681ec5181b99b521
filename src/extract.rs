//! Extraction.
//!
//! This module unpacks a downloaded zip or gzip-compressed tar archive into the install root.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{instrument, trace, warn};

/// Extracts the given archive into the target directory (created if absent) and deletes the archive afterwards.
///
/// Archives with the extension `.zip` are treated as zip, everything else as gzip-compressed tar. A failed
/// extraction is not rolled back.
#[instrument(level = "trace")]
pub fn extract(archive: &Path, target_dir: &Path) -> Result<PathBuf> {
    let failed = |source: io::Error| Error::ExtractionFailed {
        archive: archive.to_path_buf(),
        source,
    };

    fs::create_dir_all(target_dir).map_err(failed)?;

    let is_zip = archive.extension().is_some_and(|ext| ext == "zip");
    if is_zip {
        extract_zip(archive, target_dir).map_err(failed)?;
    } else {
        extract_tar_gz(archive, target_dir).map_err(failed)?;
    }

    fs::remove_file(archive).map_err(failed)?;

    Ok(target_dir.to_path_buf())
}

// Extracts a zip archive entry by entry.
#[doc(hidden)]
fn extract_zip(archive: &Path, target_dir: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(io::Error::other)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(io::Error::other)?;

        // skip entry with dangerous name
        let Some(name) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping dangerous name");
            continue;
        };

        let path = target_dir.join(name);
        trace!("unpacking {path:?}");

        if entry.name().ends_with('/') {
            match fs::create_dir_all(&path) {
                Err(err) if err.kind() != io::ErrorKind::AlreadyExists => return Err(err),
                _ => {}
            }
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&path)?;
            io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&path, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

// Extracts a gzip-compressed tar archive as a whole.
#[doc(hidden)]
fn extract_tar_gz(archive: &Path, target_dir: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.unpack(target_dir)
}

#[cfg(test)]
pub(crate) mod tests {

    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;
    use test_log::test;
    use zip::write::SimpleFileOptions;

    /// Writes a gzip-compressed tar archive containing the given files.
    pub(crate) fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    /// Writes a zip archive containing the given directories and files.
    pub(crate) fn write_zip(path: &Path, dirs: &[&str], files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for dir in dirs {
            zip.add_directory(*dir, options).unwrap();
        }
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn children(dir: &Path) -> Vec<String> {
        let mut children: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        children.sort();
        children
    }

    #[test]
    fn extract_tar_gz_archive() {
        let tempdir = tempdir().unwrap();
        let archive = tempdir.path().join("jre.tar.gz");
        write_tar_gz(&archive, &[("jdk8u-jre/bin/java", "#!/bin/sh"), ("jdk8u-jre/release", "JAVA_VERSION=8")]);
        let root = tempdir.path().join("jre");

        let dir = extract(&archive, &root).unwrap();
        assert_eq!(root, dir);
        assert_eq!(vec!["jdk8u-jre".to_string()], children(&root));
        assert!(root.join("jdk8u-jre").join("bin").join("java").is_file());
        assert!(!archive.exists());
    }

    #[test]
    fn extract_zip_archive() {
        let tempdir = tempdir().unwrap();
        let archive = tempdir.path().join("jre.zip");
        write_zip(
            &archive,
            &["jdk8u-jre/", "jdk8u-jre/bin/"],
            &[("jdk8u-jre/bin/java.exe", "MZ"), ("jdk8u-jre/lib/rt.jar", "PK")],
        );
        let root = tempdir.path().join("jre");

        extract(&archive, &root).unwrap();
        assert_eq!(vec!["jdk8u-jre".to_string()], children(&root));
        assert_eq!("MZ", fs::read_to_string(root.join("jdk8u-jre").join("bin").join("java.exe")).unwrap());
        assert!(root.join("jdk8u-jre").join("lib").join("rt.jar").is_file());
        assert!(!archive.exists());
    }

    #[test]
    fn extract_zip_into_existing_dirs() {
        let tempdir = tempdir().unwrap();
        let archive = tempdir.path().join("jre.zip");
        write_zip(&archive, &["jdk/", "jdk/bin/"], &[("jdk/bin/java.exe", "MZ")]);
        let root = tempdir.path().join("jre");
        fs::create_dir_all(root.join("jdk").join("bin")).unwrap();

        extract(&archive, &root).unwrap();
        assert!(root.join("jdk").join("bin").join("java.exe").is_file());
    }

    #[test]
    fn extract_corrupt_archive() {
        let tempdir = tempdir().unwrap();
        let archive = tempdir.path().join("jre.tar.gz");
        fs::write(&archive, "not a tarball").unwrap();

        let err = extract(&archive, &tempdir.path().join("jre")).unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed { .. }));
        // the archive is kept on failure
        assert!(archive.exists());
    }
}
