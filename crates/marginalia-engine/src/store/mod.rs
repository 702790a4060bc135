use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use relative_path::RelativePathBuf;

use crate::models::Post;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid posts directory: {0}")]
    InvalidPostsDir(String),
}

/// File-backed post storage.
///
/// Each post is one markdown file named after its slug; the file body is the
/// raw authored text, markup included, and is the source of truth for
/// re-editing. Clean content and the note set are derived on load, which
/// keeps them in lockstep with the raw text: every save regenerates the
/// whole note set.
///
/// A leading underscore marks a draft, so `_workbench.md` is the unpublished
/// post `workbench`.
pub struct PostStore {
    root: PathBuf,
}

impl PostStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        validate_posts_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves raw authored text and returns the parsed post.
    ///
    /// Flipping `published` renames the file, so a slug never resolves to
    /// two files at once.
    pub fn save_post(
        &self,
        slug: &str,
        raw_content: &str,
        published: bool,
    ) -> Result<Post, StoreError> {
        let path = self.path_for(slug, published);
        if let Some((existing, _)) = self.locate(slug)
            && existing != path
        {
            fs::remove_file(&existing)?;
        }
        fs::write(&path, raw_content)?;
        self.load_post(slug)
    }

    /// Loads and re-parses a post. Note ids are assigned by discovery order,
    /// so a load right after a save reproduces the identical note set.
    pub fn load_post(&self, slug: &str) -> Result<Post, StoreError> {
        let (path, published) = self
            .locate(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        let raw_content = fs::read_to_string(&path)?;
        let (created_at, updated_at) = file_times(&path);
        Ok(Post::from_raw(
            slug,
            raw_content,
            published,
            created_at,
            updated_at,
        ))
    }

    /// Deletes a post's file, and with it the post's notes: note ownership
    /// is per-document, nothing else references them.
    pub fn delete_post(&self, slug: &str) -> Result<(), StoreError> {
        let (path, _) = self
            .locate(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        fs::remove_file(path)?;
        Ok(())
    }

    /// All posts, drafts included, sorted by slug.
    pub fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let mut slugs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() || path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let slug = stem.strip_prefix('_').unwrap_or(stem);
                if !slug.is_empty() {
                    slugs.push(slug.to_string());
                }
            }
        }
        slugs.sort();
        // A slug with both a draft and a published file resolves once.
        slugs.dedup();

        slugs.iter().map(|slug| self.load_post(slug)).collect()
    }

    /// Finds the file backing a slug, preferring the published name.
    fn locate(&self, slug: &str) -> Option<(PathBuf, bool)> {
        let published = self.path_for(slug, true);
        if published.is_file() {
            return Some((published, true));
        }
        let draft = self.path_for(slug, false);
        draft.is_file().then_some((draft, false))
    }

    fn path_for(&self, slug: &str, published: bool) -> PathBuf {
        let file_name = if published {
            format!("{slug}.md")
        } else {
            format!("_{slug}.md")
        };
        RelativePathBuf::from(file_name).to_path(&self.root)
    }
}

pub fn validate_posts_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() || !path.is_dir() {
        return Err(StoreError::InvalidPostsDir(
            "Directory does not exist".to_string(),
        ));
    }
    Ok(())
}

/// Creation and modification times from file metadata, falling back to the
/// modification time on filesystems without a birth time.
fn file_times(path: &Path) -> (DateTime<Utc>, DateTime<Utc>) {
    let meta = fs::metadata(path).ok();
    let updated_at = meta
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(Utc::now);
    let created_at = meta
        .as_ref()
        .and_then(|m| m.created().ok())
        .map(DateTime::<Utc>::from)
        .unwrap_or(updated_at);
    (created_at, updated_at)
}
