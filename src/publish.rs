use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::artifact::Artifact;
use crate::error::Result;

/// Copy artifacts into `dest`, overwriting earlier copies and keeping each
/// file's modification time.
///
/// Copies inherit the source permissions, so read-only artifacts give
/// read-only copies. An earlier copy is removed rather than truncated, and
/// the timestamp is set through a read-only handle.
pub fn copy_artifacts(artifacts: &[Artifact], dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)?;

    for artifact in artifacts {
        let target = dest.join(&artifact.filename);
        let modified = fs::metadata(&artifact.path)?.modified()?;
        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::copy(&artifact.path, &target)?;
        File::open(&target)?.set_modified(modified)?;
        tracing::debug!(from = %artifact.relative, to = %target.display(), "copied");
    }

    tracing::info!(dir = %dest.display(), count = artifacts.len(), "published artifacts");
    Ok(artifacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn copies_and_keeps_mtime() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let path = src.path().join("regex-2024.11.6-cp313-cp313-wasix_wasm32.whl");
        fs::write(&path, b"wheel bytes").unwrap();
        let mtime = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();

        let artifact = Artifact {
            path: path.clone(),
            relative: "regex-2024.11.6-cp313-cp313-wasix_wasm32.whl".into(),
            filename: "regex-2024.11.6-cp313-cp313-wasix_wasm32.whl".into(),
        };
        let out = dest.path().join("dist/packages");
        assert_eq!(copy_artifacts(&[artifact], &out).unwrap(), 1);

        let copied = out.join("regex-2024.11.6-cp313-cp313-wasix_wasm32.whl");
        assert_eq!(fs::read(&copied).unwrap(), b"wheel bytes");
        assert_eq!(fs::metadata(&copied).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn overwrites_existing_copy() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let path = src.path().join("six-1.17.0.tar.gz");
        fs::write(&path, b"new").unwrap();
        fs::write(dest.path().join("six-1.17.0.tar.gz"), b"old").unwrap();

        let artifact = Artifact {
            path,
            relative: "six-1.17.0.tar.gz".into(),
            filename: "six-1.17.0.tar.gz".into(),
        };
        copy_artifacts(&[artifact], dest.path()).unwrap();
        assert_eq!(fs::read(dest.path().join("six-1.17.0.tar.gz")).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn read_only_artifact_is_copied_twice() {
        use std::os::unix::fs::PermissionsExt;

        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let path = src.path().join("six-1.16.0.tar.gz");
        fs::write(&path, b"six sdist").unwrap();
        let mtime = UNIX_EPOCH + Duration::from_secs(1_650_000_000);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        let artifact = Artifact {
            path,
            relative: "artifacts/six-1.16.0.tar.gz".into(),
            filename: "six-1.16.0.tar.gz".into(),
        };
        let out = dest.path().join("out");
        assert_eq!(copy_artifacts(std::slice::from_ref(&artifact), &out).unwrap(), 1);
        assert_eq!(copy_artifacts(&[artifact], &out).unwrap(), 1);

        let copied = out.join("six-1.16.0.tar.gz");
        let meta = fs::metadata(&copied).unwrap();
        assert_eq!(fs::read(&copied).unwrap(), b"six sdist");
        assert_eq!(meta.modified().unwrap(), mtime);
        assert_eq!(meta.permissions().mode() & 0o777, 0o444);
    }
}
