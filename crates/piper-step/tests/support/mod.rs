//! Shared test utilities for piper-step CLI tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// Environment variables the CLI reads; cleared so the host CI environment
/// cannot leak into assertions.
const AMBIENT_ENV: &[&str] = &[
    "piperPath",
    "GITHUB_JOB",
    "PIPER_STEP_LOG",
    "PIPER_STEP_LOG_FORMAT",
    "RUST_LOG",
];

/// `piper-step` command with a clean environment
pub fn piper_step() -> Command {
    let mut cmd = Command::cargo_bin("piper-step").unwrap();
    for var in AMBIENT_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// Write a stand-in Piper binary that echoes each argument as `arg:<value>`
/// on stdout, writes one diagnostic line to stderr and exits with
/// `FAKE_PIPER_EXIT` (default 0).
#[cfg(unix)]
pub fn write_fake_piper(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("piper");
    let script = r#"#!/bin/sh
for arg in "$@"; do
  echo "arg:$arg"
done
echo "fake piper diagnostic" >&2
exit ${FAKE_PIPER_EXIT:-0}
"#;
    std::fs::write(&path, script).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}
