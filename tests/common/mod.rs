//! Temp Git repositories for integration tests

#![allow(dead_code)]

use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const ANA: (&str, &str) = ("Ana", "ana@example.com");
pub const BOB: (&str, &str) = ("Bob", "bob@example.com");

pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repository,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file without committing it
    pub fn write(&self, rel: &str, body: &str) {
        let full = self.path().join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, body).unwrap();
    }

    pub fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.path().join(rel)).unwrap();
    }

    /// Write and commit `files` as `who`
    pub fn commit(&self, who: (&str, &str), files: &[(&str, &str)]) {
        let mut index = self.repo.index().unwrap();
        for (rel, body) in files {
            self.write(rel, body);
            index.add_path(Path::new(rel)).unwrap();
        }
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now(who.0, who.1).unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)
            .unwrap();
    }
}
