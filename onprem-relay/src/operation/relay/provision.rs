/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use crate::destination::RemoteSession;
use crate::error::{from_kind, Error, ErrorKind};

/// Deepest directory chain we are willing to create on a destination.
const MAX_DEPTH: usize = 64;

/// Make sure `dir` and all of its ancestors exist on the destination.
///
/// Walks up from `dir` to the first existing ancestor, then creates the missing levels top
/// down. A `mkdir` that fails is tolerated if the directory exists afterwards (another writer
/// created it first).
pub(crate) fn ensure_dir_chain(session: &mut dyn RemoteSession, dir: &Path) -> Result<(), Error> {
    let mut missing: Vec<PathBuf> = Vec::new();
    let mut current = Some(dir);

    while let Some(candidate) = current {
        // `/` is never stat'ed
        if candidate.parent().is_none()
            || candidate.as_os_str().is_empty()
            || session.exists(candidate)?
        {
            break;
        }
        if missing.len() == MAX_DEPTH {
            return Err(from_kind(ErrorKind::DestinationIo)(format!(
                "{} is more than {MAX_DEPTH} directories deep",
                dir.display()
            )));
        }
        missing.push(candidate.to_path_buf());
        current = candidate.parent();
    }

    while let Some(next) = missing.pop() {
        if let Err(err) = session.mkdir(&next) {
            if !session.exists(&next)? {
                return Err(err);
            }
            tracing::debug!("{} appeared concurrently", next.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::ensure_dir_chain;
    use crate::error::ErrorKind;
    use crate::test_util::MemoryRemote;

    #[test]
    fn test_creates_missing_levels_top_down() {
        let mut remote = MemoryRemote::with_dirs(&["/From_AWS"]);
        ensure_dir_chain(&mut remote, Path::new("/From_AWS/2024/01/02/03")).unwrap();

        let state = remote.state.lock().unwrap();
        assert_eq!(4, state.mkdir_calls);
        assert!(state.dirs.contains(Path::new("/From_AWS/2024/01/02/03")));
    }

    #[test]
    fn test_existing_chain_is_untouched() {
        let mut remote = MemoryRemote::default();
        let dir = Path::new("/From_AWS/2024/01/02/03");
        ensure_dir_chain(&mut remote, dir).unwrap();
        let calls = remote.state.lock().unwrap().mkdir_calls;
        assert_eq!(5, calls);

        ensure_dir_chain(&mut remote, dir).unwrap();
        assert_eq!(calls, remote.state.lock().unwrap().mkdir_calls);
    }

    #[test]
    fn test_root_needs_nothing() {
        let mut remote = MemoryRemote::default();
        ensure_dir_chain(&mut remote, Path::new("/")).unwrap();
        assert_eq!(0, remote.state.lock().unwrap().mkdir_calls);
    }

    #[test]
    fn test_concurrently_created_dir_is_tolerated() {
        let mut remote = MemoryRemote::with_dirs(&["/From_AWS", "/From_AWS/2024"]);
        remote.raced_dirs = vec![PathBuf::from("/From_AWS/2024/01")];

        ensure_dir_chain(&mut remote, Path::new("/From_AWS/2024/01/02")).unwrap();
        assert!(remote
            .state
            .lock()
            .unwrap()
            .dirs
            .contains(Path::new("/From_AWS/2024/01/02")));
    }

    #[test]
    fn test_failed_mkdir_propagates() {
        #[derive(Debug)]
        struct ReadOnly;

        impl crate::destination::RemoteSession for ReadOnly {
            fn exists(&mut self, path: &Path) -> Result<bool, crate::error::Error> {
                Ok(path == Path::new("/"))
            }
            fn mkdir(&mut self, _path: &Path) -> Result<(), crate::error::Error> {
                Err(crate::error::from_kind(ErrorKind::DestinationIo)("permission denied"))
            }
            fn upload(&mut self, _local: &Path, _remote: &Path) -> Result<u64, crate::error::Error> {
                unreachable!()
            }
            fn close(self: Box<Self>) -> Result<(), crate::error::Error> {
                Ok(())
            }
        }

        let err = ensure_dir_chain(&mut ReadOnly, Path::new("/From_AWS/2024")).unwrap_err();
        assert_eq!(&ErrorKind::DestinationIo, err.kind());
    }

    #[test]
    fn test_root_is_assumed_to_exist() {
        #[derive(Debug, Default)]
        struct Chrooted {
            created: Vec<PathBuf>,
        }

        impl crate::destination::RemoteSession for Chrooted {
            fn exists(&mut self, path: &Path) -> Result<bool, crate::error::Error> {
                if path == Path::new("/") {
                    return Err(crate::error::from_kind(ErrorKind::DestinationIo)(
                        "permission denied",
                    ));
                }
                Ok(self.created.iter().any(|dir| dir == path))
            }
            fn mkdir(&mut self, path: &Path) -> Result<(), crate::error::Error> {
                self.created.push(path.to_path_buf());
                Ok(())
            }
            fn upload(&mut self, _local: &Path, _remote: &Path) -> Result<u64, crate::error::Error> {
                unreachable!()
            }
            fn close(self: Box<Self>) -> Result<(), crate::error::Error> {
                Ok(())
            }
        }

        let mut session = Chrooted::default();
        ensure_dir_chain(&mut session, Path::new("/From_AWS/2024")).unwrap();
        assert_eq!(
            vec![PathBuf::from("/From_AWS"), PathBuf::from("/From_AWS/2024")],
            session.created
        );
        ensure_dir_chain(&mut session, Path::new("/")).unwrap();
    }

    #[test]
    fn test_depth_limit() {
        let mut remote = MemoryRemote::default();
        let deep: PathBuf = std::iter::once("/".to_owned())
            .chain((0..65).map(|i| format!("d{i}")))
            .collect();

        let err = ensure_dir_chain(&mut remote, &deep).unwrap_err();
        assert_eq!(&ErrorKind::DestinationIo, err.kind());
        assert_eq!(0, remote.state.lock().unwrap().mkdir_calls);
    }
}
