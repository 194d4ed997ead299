//! Zip implementation of [`Archive`].

use super::Archive;
use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read},
    path::Path,
};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

/// Zip archives as used by `.klib` compiled libraries.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    fn zip_error(path: &Path) -> impl FnOnce(zip::result::ZipError) -> Error + '_ {
        move |error| Error::Archive {
            path: path.to_path_buf(),
            error,
        }
    }
}

impl Archive for ZipArchiver {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive).fs_context("opening library archive", archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file)).map_err(Self::zip_error(archive))?;

        fs::create_dir_all(dest).fs_context("creating extraction directory", dest)?;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(Self::zip_error(archive))?;

            let Some(relative) = entry.enclosed_name() else {
                log::warn!(
                    "Skipping entry with unsafe path {:?} in {}",
                    entry.name(),
                    archive.display()
                );
                continue;
            };
            let outpath = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&outpath).fs_context("creating directory", &outpath)?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).fs_context("creating directory", parent)?;
            }

            #[cfg(unix)]
            if entry
                .unix_mode()
                .is_some_and(|mode| (mode & 0o170000) == 0o120000)
            {
                let mut target = String::new();
                entry
                    .read_to_string(&mut target)
                    .fs_context("reading symlink entry", &outpath)?;
                if outpath.symlink_metadata().is_ok() {
                    fs::remove_file(&outpath).fs_context("replacing symlink", &outpath)?;
                }
                std::os::unix::fs::symlink(&target, &outpath)
                    .fs_context("creating symlink", &outpath)?;
                continue;
            }

            let mut outfile = File::create(&outpath).fs_context("creating file", &outpath)?;
            io::copy(&mut entry, &mut outfile).fs_context("extracting file", &outpath)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))
                    .fs_context("setting permissions", &outpath)?;
            }
        }

        log::debug!("Extracted {} into {}", archive.display(), dest.display());
        Ok(())
    }

    fn compress(&self, dir: &Path, archive: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(Error::GenericError(format!(
                "cannot archive {}: not a directory",
                dir.display()
            )));
        }

        let file = File::create(archive).fs_context("creating library archive", archive)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(dir)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let relative = entry.path().strip_prefix(dir)?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let file_type = entry.file_type();
            if file_type.is_dir() {
                zip.add_directory(format!("{name}/"), options)
                    .map_err(Self::zip_error(archive))?;
            } else if file_type.is_symlink() {
                let target = fs::read_link(entry.path())
                    .fs_context("reading symlink", entry.path())?;
                zip.add_symlink(name, target.to_string_lossy().into_owned(), options)
                    .map_err(Self::zip_error(archive))?;
            } else {
                #[cfg(unix)]
                let options = {
                    use std::os::unix::fs::PermissionsExt;
                    let mode = entry
                        .metadata()?
                        .permissions()
                        .mode();
                    options.unix_permissions(mode)
                };

                zip.start_file(name, options)
                    .map_err(Self::zip_error(archive))?;
                let mut source =
                    File::open(entry.path()).fs_context("opening file to archive", entry.path())?;
                io::copy(&mut source, &mut zip).fs_context("archiving file", entry.path())?;
            }
        }

        let mut writer = zip.finish().map_err(Self::zip_error(archive))?;
        io::Write::flush(&mut writer).fs_context("flushing library archive", archive)?;

        log::debug!("Archived {} into {}", dir.display(), archive.display());
        Ok(())
    }
}
