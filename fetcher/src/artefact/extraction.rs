//! Binary extraction from verified release archives.
//!
//! rclone archives nest the executable under a versioned directory
//! (`rclone-v1.72.1-linux-amd64/rclone`), so members are matched by
//! basename only. Members are scanned in central-directory order and the
//! first match wins when two members share the basename.
//!
//! Only the selected member is written, and always to a fixed filename in
//! the destination directory, so archive paths never influence where bytes
//! land.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::{Cursor, Read, Write};

/// Trait for extracting the executable from an archive, enabling test
/// mocking.
///
/// # Examples
///
/// ```
/// use rclone_bin_fetcher::artefact::extraction::ZipExtractor;
///
/// let extractor = ZipExtractor;
/// // Use extractor.extract(&archive_bytes, "rclone", dest_dir, true) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait BinaryExtractor {
    /// Extract the member named `binary_name` from `archive` to
    /// `dest_dir/binary_name`, replacing any existing file.
    ///
    /// When `executable` is set the written file is made executable by
    /// owner, group and others on Unix hosts.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::BinaryNotFound`] if no member matches,
    /// [`ExtractionError::Archive`] if the container cannot be read, and
    /// [`ExtractionError::Io`] on filesystem failures.
    fn extract(
        &self,
        archive: &[u8],
        binary_name: &str,
        dest_dir: &Utf8Path,
        executable: bool,
    ) -> Result<Utf8PathBuf, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No archive member has the expected basename.
    #[error("no archive member named {binary}")]
    BinaryNotFound {
        /// The basename that was searched for.
        binary: String,
    },

    /// The zip container is corrupt or unsupported.
    #[error("zip error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Writing the extracted file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being removed, written or chmodded.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Default extractor using the `zip` crate over an in-memory archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl BinaryExtractor for ZipExtractor {
    fn extract(
        &self,
        archive: &[u8],
        binary_name: &str,
        dest_dir: &Utf8Path,
        executable: bool,
    ) -> Result<Utf8PathBuf, ExtractionError> {
        let contents = read_member(archive, binary_name)?;
        let dest_path = dest_dir.join(binary_name);
        replace_file(&dest_path, &contents)?;
        if executable {
            make_executable(&dest_path)?;
        }
        Ok(dest_path)
    }
}

/// Return the decompressed bytes of the first non-directory member whose
/// basename equals `binary_name`.
fn read_member(archive: &[u8], binary_name: &str) -> Result<Vec<u8>, ExtractionError> {
    let mut reader = zip::ZipArchive::new(Cursor::new(archive))?;
    for index in 0..reader.len() {
        let mut member = reader.by_index(index)?;
        if member.is_dir() || basename(member.name()) != binary_name {
            continue;
        }
        log::debug!("selected archive member {}", member.name());
        let mut contents = Vec::new();
        member
            .read_to_end(&mut contents)
            .map_err(zip::result::ZipError::Io)?;
        return Ok(contents);
    }
    Err(ExtractionError::BinaryNotFound {
        binary: binary_name.to_owned(),
    })
}

/// The final path component of a zip member name, accepting either
/// separator.
fn basename(member_name: &str) -> &str {
    member_name.rsplit(['/', '\\']).next().unwrap_or(member_name)
}

/// Remove any existing file at `path`, then write `contents` atomically via
/// a temporary file in the same directory.
fn replace_file(path: &Utf8Path, contents: &[u8]) -> Result<(), ExtractionError> {
    let io_err = |source: std::io::Error| ExtractionError::Io {
        path: path.to_owned(),
        source,
    };

    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("removed stale {path}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(e)),
    }

    let dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(contents).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> Result<(), ExtractionError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|source| {
        ExtractionError::Io {
            path: path.to_owned(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(path: &Utf8Path) -> Result<(), ExtractionError> {
    log::debug!("cannot set Unix permissions on {path} from this host");
    Ok(())
}
