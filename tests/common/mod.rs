#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Six students with encoded and labelled categories mixed together.
pub fn students_fixture() -> PathBuf {
    fixture_path("students.csv")
}

/// The binary under test with logging silenced.
pub fn dashboard() -> Command {
    let mut command = Command::cargo_bin("student-analytics").expect("binary exists");
    command.env("RUST_LOG", "off");
    command
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a CSV built from `headers` and `rows`.
    pub fn write_csv(&self, name: &str, headers: &[&str], rows: &[&[&str]]) -> PathBuf {
        let mut contents = headers.join(",");
        contents.push('\n');
        for row in rows {
            contents.push_str(&row.join(","));
            contents.push('\n');
        }
        self.write(name, &contents)
    }

    /// Copies the student fixture into the workspace.
    pub fn copy_students(&self, name: &str) -> PathBuf {
        let contents = std::fs::read_to_string(students_fixture()).expect("read fixture");
        self.write(name, &contents)
    }
}
