//! Zip archive extraction for template deployment.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use super::error::{TemplateError, TemplateResult};
use super::traits::ArchiveExtractor;

/// In-process zip extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new zip extractor.
    pub fn new() -> Self {
        Self
    }

    fn open(&self, archive: &Path) -> TemplateResult<ZipArchive<File>> {
        let file = File::open(archive)
            .map_err(|e| TemplateError::extraction(archive, format!("failed to open: {}", e)))?;

        ZipArchive::new(file).map_err(|e| TemplateError::extraction(archive, e))
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> TemplateResult<usize> {
        let mut archive = self.open(archive_path)?;

        fs::create_dir_all(dest_dir).map_err(|e| TemplateError::extraction(dest_dir, e))?;

        let mut files = 0;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| TemplateError::extraction(archive_path, e))?;

            let outpath = match entry.enclosed_name() {
                Some(path) => dest_dir.join(path),
                None => {
                    warn!(entry = entry.name(), "Skipping archive entry with unsafe path");
                    continue;
                }
            };

            if entry.is_dir() {
                fs::create_dir_all(&outpath).map_err(|e| TemplateError::extraction(&outpath, e))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| TemplateError::extraction(parent, e))?;
            }

            let mut outfile =
                File::create(&outpath).map_err(|e| TemplateError::extraction(&outpath, e))?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|e| TemplateError::extraction(archive_path, e))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).ok();
                }
            }

            files += 1;
        }

        debug!(
            archive = %archive_path.display(),
            dest = %dest_dir.display(),
            files,
            "Archive extracted"
        );

        Ok(files)
    }

    fn list_contents(&self, archive_path: &Path) -> TemplateResult<Vec<String>> {
        let archive = self.open(archive_path)?;
        Ok(archive.file_names().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, dirs: &[&str], files: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for dir in dirs {
            zip.add_directory(*dir, options).unwrap();
        }
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_nested_files() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("t.zip");
        write_zip(
            &archive,
            &["root/", "root/b/"],
            &[("root/a.txt", "alpha"), ("root/b/c.txt", "gamma")],
        );

        let dest = temp.path().join("out");
        let files = ZipExtractor::new().extract(&archive, &dest).unwrap();

        assert_eq!(files, 2);
        assert_eq!(fs::read_to_string(dest.join("root/a.txt")).unwrap(), "alpha");
        assert_eq!(
            fs::read_to_string(dest.join("root/b/c.txt")).unwrap(),
            "gamma"
        );
    }

    #[test]
    fn test_extract_creates_missing_parents() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("t.zip");
        write_zip(&archive, &[], &[("deep/nested/file.md", "x")]);

        let dest = temp.path().join("out");
        ZipExtractor::new().extract(&archive, &dest).unwrap();
        assert!(dest.join("deep/nested/file.md").is_file());
    }

    #[test]
    fn test_list_contents() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("t.zip");
        write_zip(&archive, &["root/"], &[("root/a.txt", "a")]);

        let names = ZipExtractor::new().list_contents(&archive).unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"root/".to_string()));
        assert!(names.contains(&"root/a.txt".to_string()));
    }

    #[test]
    fn test_corrupt_archive_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bad.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let result = ZipExtractor::new().extract(&archive, &temp.path().join("out"));
        assert!(matches!(result, Err(TemplateError::Extraction { .. })));
        assert!(ZipExtractor::new().list_contents(&archive).is_err());
    }

    #[test]
    fn test_missing_archive_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let result = ZipExtractor::new().list_contents(&temp.path().join("missing.zip"));
        assert!(matches!(result, Err(TemplateError::Extraction { .. })));
    }
}
