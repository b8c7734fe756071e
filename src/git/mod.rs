//! Attribution: map a file to the most recent commit that touched it

use crate::config::AuthorFormat;
use crate::MonitorError;
use git2::{DiffOptions, ErrorCode, Repository, Sort};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Author and commit of the last change to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub author: String,
    pub commit_id: String,
}

/// Looks up last-commit attribution in a Git working tree
pub struct GitAttributor {
    repo: Repository,
    /// Root prefix relative to the working directory (empty when root is the top level)
    prefix: PathBuf,
    format: AuthorFormat,
    memo: HashMap<PathBuf, Attribution>,
}

impl GitAttributor {
    /// Open the repository containing `root`
    pub fn open(root: &Path, format: AuthorFormat) -> Result<Self, MonitorError> {
        let not_a_repo = || MonitorError::NotARepository {
            path: root.to_path_buf(),
        };
        let repo = Repository::discover(root).map_err(|_| not_a_repo())?;
        let workdir = repo.workdir().ok_or_else(not_a_repo)?;

        let canonical_root = root
            .canonicalize()
            .map_err(|e| MonitorError::io(root, e))?;
        let canonical_workdir = workdir
            .canonicalize()
            .map_err(|e| MonitorError::io(workdir, e))?;
        let prefix = canonical_root
            .strip_prefix(&canonical_workdir)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        debug!(workdir = %canonical_workdir.display(), "opened git repository");
        Ok(Self {
            repo,
            prefix,
            format,
            memo: HashMap::new(),
        })
    }

    /// Last commit touching `rel_path` (relative to the root given to `open`)
    pub fn last_commit(&mut self, rel_path: &Path) -> Result<Attribution, MonitorError> {
        if let Some(hit) = self.memo.get(rel_path) {
            return Ok(hit.clone());
        }
        let attribution = self.lookup(rel_path)?;
        self.memo.insert(rel_path.to_path_buf(), attribution.clone());
        Ok(attribution)
    }

    fn lookup(&self, rel_path: &Path) -> Result<Attribution, MonitorError> {
        let not_tracked = || MonitorError::NotTracked {
            path: rel_path.to_path_buf(),
        };
        let repo_path = self.prefix.join(rel_path);
        let spec = repo_path.to_string_lossy().replace('\\', "/");

        let index = self.repo.index()?;
        if index.get_path(Path::new(&spec), 0).is_none() {
            return Err(not_tracked());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        match revwalk.push_head() {
            Ok(()) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(not_tracked());
            }
            Err(e) => return Err(e.into()),
        }

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let tree = commit.tree()?;
            let parent_tree = commit.parent(0).ok().map(|p| p.tree()).transpose()?;

            let mut opts = DiffOptions::new();
            opts.pathspec(spec.as_str()).disable_pathspec_match(true);
            let diff =
                self.repo
                    .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
            if diff.deltas().len() == 0 {
                continue;
            }

            let author = commit.author();
            let name = author.name().unwrap_or("Unknown");
            let email = author.email().unwrap_or("");
            let author = match self.format {
                AuthorFormat::NameEmail => format!("{} <{}>", name, email),
                AuthorFormat::Email => email.to_string(),
            };
            debug!(file = %spec, %author, "attributed file");
            return Ok(Attribution {
                author,
                commit_id: commit.id().to_string(),
            });
        }
        Err(not_tracked())
    }
}
