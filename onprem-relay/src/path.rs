/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use path_clean::PathClean;

/// UTC hour path `YYYY/MM/DD/HH` for the given instant.
///
/// Used both as the scan prefix in the source bucket and as the folder at each destination.
pub(crate) fn hour_path(now: SystemTime) -> String {
    DateTime::<Utc>::from(now).format("%Y/%m/%d/%H").to_string()
}

/// Remote destination path `<root>/<hour path>/<file name>`.
///
/// Only the configured root is normalised; the hour path and file name are appended as is.
pub(crate) fn remote_path(root: &str, now: SystemTime, file_name: &str) -> PathBuf {
    Path::new("/")
        .join(root)
        .clean()
        .join(hour_path(now))
        .join(file_name)
}
