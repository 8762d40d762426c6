use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::database::config::DatabaseFormat;
use crate::database::format::{self, RawLists, SENTINEL};
use crate::types::{Category, Checksum, Classification};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Malformed checksum database {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("Checksum {checksum} is classified both {first} and {second}")]
    ConflictingClassification {
        checksum: Checksum,
        first: Category,
        second: Category,
    },
}

/// Good/bad/unknown checksum sets for one subject.
///
/// Loaded fresh for every artifact check. A checksum is in at most one
/// category; this is checked on load only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationDatabase {
    sets: BTreeMap<Category, BTreeSet<Checksum>>,
    dirty: bool,
}

impl Default for ClassificationDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationDatabase {
    pub fn new() -> Self {
        Self {
            sets: Category::ALL
                .into_iter()
                .map(|category| (category, BTreeSet::new()))
                .collect(),
            dirty: false,
        }
    }

    /// Read the database at `path`, or start empty if there is no file.
    ///
    /// A file that parses but is not in canonical written form (unsorted,
    /// duplicates, missing sentinel or list) loads dirty so the next save
    /// normalizes it.
    pub fn load(path: &Path, format: DatabaseFormat) -> Result<Self, DatabaseError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no checksum database yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let raw = format::parse(format, &text).map_err(|e| DatabaseError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let db = Self::from_raw(path, &raw)?;

        debug!(
            path = %path.display(),
            checksums = db.len(),
            dirty = db.dirty,
            "loaded checksum database"
        );
        Ok(db)
    }

    fn from_raw(path: &Path, raw: &RawLists) -> Result<Self, DatabaseError> {
        let mut db = Self::new();
        let mut seen: BTreeMap<Checksum, Category> = BTreeMap::new();

        for category in Category::SEARCH_ORDER {
            let Some(entries) = raw.get(&category) else {
                continue;
            };
            for entry in entries.iter().filter(|e| e.as_str() != SENTINEL) {
                let checksum =
                    Checksum::parse(entry.as_str()).map_err(|e| DatabaseError::Malformed {
                        path: path.to_path_buf(),
                        reason: format!("{} entry: {e}", category.list_name()),
                    })?;
                match seen.get(&checksum) {
                    Some(&first) if first != category => {
                        return Err(DatabaseError::ConflictingClassification {
                            checksum,
                            first,
                            second: category,
                        });
                    }
                    Some(_) => {}
                    None => {
                        seen.insert(checksum.clone(), category);
                    }
                }
                db.sets.entry(category).or_default().insert(checksum);
            }
        }

        db.dirty = !db.matches_canonical(raw);
        Ok(db)
    }

    fn matches_canonical(&self, raw: &RawLists) -> bool {
        self.sets.iter().all(|(category, set)| {
            raw.get(category).is_some_and(|entries| {
                entries
                    .iter()
                    .map(String::as_str)
                    .eq(set.iter().map(Checksum::as_str).chain([SENTINEL]))
            })
        })
    }

    pub fn category_of(&self, checksum: &Checksum) -> Option<Category> {
        Category::SEARCH_ORDER.into_iter().find(|category| {
            self.sets
                .get(category)
                .is_some_and(|set| set.contains(checksum))
        })
    }

    /// Report the checksum's category, recording it as unknown if it is novel.
    pub fn classify(&mut self, checksum: &Checksum) -> Classification {
        if let Some(category) = self.category_of(checksum) {
            debug!(%checksum, %category, "checksum already classified");
            return Classification {
                category,
                mutated: false,
            };
        }

        self.sets
            .entry(Category::Unknown)
            .or_default()
            .insert(checksum.clone());
        self.dirty = true;
        debug!(%checksum, "novel checksum added as unknown");

        Classification {
            category: Category::Unknown,
            mutated: true,
        }
    }

    pub fn checksums(&self, category: Category) -> impl Iterator<Item = &Checksum> {
        self.sets.get(&category).into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.sets.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn render(&self, format: DatabaseFormat) -> Result<String, DatabaseError> {
        format::render(format, &self.sets).map_err(DatabaseError::from)
    }

    /// Write the database back if it changed. Returns whether a write happened.
    ///
    /// The file is replaced whole via a sibling temp file and a rename.
    pub fn save(&mut self, path: &Path, format: DatabaseFormat) -> Result<bool, DatabaseError> {
        if !self.dirty {
            return Ok(false);
        }

        let text = self.render(format)?;
        write_replacing(path, text.as_bytes())?;
        self.dirty = false;

        info!(path = %path.display(), checksums = self.len(), "updated checksum database");
        Ok(true)
    }
}

fn write_replacing(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("database path has no file name: {}", path.display()),
        )
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let written = (|| {
        let mut f = fs::File::create(&temp_path)?;
        f.write_all(contents)?;
        f.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}
