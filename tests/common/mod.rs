//! Common test utilities for bundle-unpack integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bundle_unpack::{GitUnpacker, GitUnpackerConfig};
use git2::{IndexEntry, IndexTime, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

pub const MODE_FILE: u32 = 0o100_644;
pub const MODE_EXECUTABLE: u32 = 0o100_755;
pub const MODE_SYMLINK: u32 = 0o120_000;

/// Route library logs to the test harness; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A git repository used as a fetch source
pub struct FixtureRepo {
    temp: TempDir,
    pub repo: Repository,
}

impl FixtureRepo {
    /// Create an empty repository whose HEAD points at `main`
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(temp.path(), &options).expect("Failed to init repository");
        Self { temp, repo }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// `file://` URL of this repository
    pub fn url(&self) -> String {
        format!("file://{}", self.path().display())
    }

    /// Path of this repository relative to the current directory, with no scheme
    pub fn relative_url(&self) -> String {
        let cwd = std::env::current_dir()
            .and_then(|d| d.canonicalize())
            .expect("Failed to read current directory");
        let target = self.path().canonicalize().expect("Failed to canonicalize fixture");
        let shared = cwd
            .components()
            .zip(target.components())
            .take_while(|(a, b)| a == b)
            .count();
        let mut relative = PathBuf::new();
        for _ in cwd.components().skip(shared) {
            relative.push("..");
        }
        for component in target.components().skip(shared) {
            relative.push(component);
        }
        relative.to_string_lossy().replace('\\', "/")
    }

    /// Commit a complete snapshot of regular files onto `branch`
    pub fn commit(&self, branch: &str, message: &str, files: &[(&str, &str)]) -> Oid {
        let entries: Vec<(&str, &[u8], u32)> = files
            .iter()
            .map(|(path, content)| (*path, content.as_bytes(), MODE_FILE))
            .collect();
        self.commit_entries(branch, message, &entries)
    }

    /// Commit a complete snapshot with explicit file modes onto `branch`
    pub fn commit_entries(&self, branch: &str, message: &str, entries: &[(&str, &[u8], u32)]) -> Oid {
        let mut index = self.repo.index().expect("Failed to open index");
        index.clear().expect("Failed to clear index");
        for (path, content, mode) in entries {
            let entry = IndexEntry {
                ctime: IndexTime::new(0, 0),
                mtime: IndexTime::new(0, 0),
                dev: 0,
                ino: 0,
                mode: *mode,
                uid: 0,
                gid: 0,
                file_size: u32::try_from(content.len()).expect("fixture file too large"),
                id: Oid::zero(),
                flags: 0,
                flags_extended: 0,
                path: path.as_bytes().to_vec(),
            };
            index
                .add_frombuffer(&entry, content)
                .expect("Failed to add fixture file");
        }
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let refname = format!("refs/heads/{branch}");
        let parent = self
            .repo
            .find_reference(&refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let sig = Signature::now("Test", "test@test.com").expect("Failed to create signature");
        self.repo
            .commit(Some(&refname), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit")
    }

    /// Create a branch pointing at `target`
    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, true)
            .expect("Failed to create branch");
    }

    /// Create an annotated tag pointing at `target`
    pub fn tag(&self, name: &str, target: Oid) {
        let object = self
            .repo
            .find_object(target, None)
            .expect("Failed to find tag target");
        let sig = Signature::now("Test", "test@test.com").expect("Failed to create signature");
        self.repo
            .tag(name, &object, &sig, &format!("release {name}"), false)
            .expect("Failed to create tag");
    }

    /// Create a lightweight tag pointing at `target`
    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        let object = self
            .repo
            .find_object(target, None)
            .expect("Failed to find tag target");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("Failed to create tag");
    }
}

/// An unpacker whose scratch repositories go to a directory the test owns
pub struct TestUnpacker {
    pub scratch: TempDir,
    pub unpacker: GitUnpacker,
}

impl TestUnpacker {
    pub fn new() -> Self {
        let scratch = TempDir::new().expect("Failed to create scratch directory");
        let unpacker = GitUnpacker::new(GitUnpackerConfig {
            temp_base: scratch.path().to_path_buf(),
            shallow: true,
        });
        Self { scratch, unpacker }
    }

    /// Entries left behind in the scratch directory
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch.path())
            .expect("Failed to read scratch directory")
            .map(|e| e.expect("Failed to read entry").path())
            .collect()
    }
}

pub fn is_full_hex(id: &str) -> bool {
    id.len() == 40 && id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}
