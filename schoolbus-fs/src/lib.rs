//! Capability-based UTF-8 file helpers for the school bus tooling.
//!
//! Every helper resolves an ambient directory handle with `cap-std` and then
//! works relative to it, so callers deal only in `camino` paths.
#![forbid(unsafe_code)]

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open an existing file for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read a whole file into a string.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let mut contents = String::new();
    open_utf8_file(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Return whether `path` exists and is a regular file.
///
/// A missing file is reported as an [`io::ErrorKind::NotFound`] error so that
/// callers can tell it apart from a directory sitting at the same path.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create (or truncate) a file for writing, creating missing parent
/// directories first.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent(path)?;
    dir.create(name.as_str())
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    let (base, relative) = split_at_base(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Open the directory holding `path` and return it with the file name.
fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `dir` into an ambient base directory and the path below it.
///
/// Absolute paths are anchored at their root (including any Windows drive
/// prefix); relative paths are anchored at the working directory.
fn split_at_base(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let base = if dir.has_root() {
        dir.ancestors().last().unwrap_or(dir)
    } else {
        Utf8Path::new(".")
    };
    let relative = if dir.has_root() {
        dir.strip_prefix(base)
            .map_err(|_| io::Error::other(format!("failed to strip {base} from {dir}")))?
    } else {
        dir
    };
    let handle = fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?;
    Ok((handle, relative.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::Write;
    use tempfile::TempDir;

    struct Scratch {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn scratch() -> Scratch {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Scratch { _dir: dir, root }
    }

    #[rstest]
    fn created_files_can_be_read_back(scratch: Scratch) {
        let path = scratch.root.join("out/nested/plan.json");
        let mut file = create_utf8_file(&path).expect("create file");
        file.write_all(b"{\"routes\":[]}").expect("write file");
        drop(file);

        assert_eq!(read_utf8_file(&path).expect("read file"), "{\"routes\":[]}");
        assert!(file_is_file(&path).expect("inspect file"));
    }

    #[rstest]
    fn directories_are_not_files(scratch: Scratch) {
        assert!(!file_is_file(&scratch.root).expect("inspect directory"));
    }

    #[rstest]
    fn missing_files_are_not_found(scratch: Scratch) {
        let err = file_is_file(&scratch.root.join("absent.json")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn bare_file_names_need_no_parent() {
        ensure_parent_dir(Utf8Path::new("request.json")).expect("nothing to create");
    }
}
