//! Session and seed persistence for every language

use super::{StoreError, seed, write_atomic};
use crate::core::{Language, SessionRecord, Word};
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DAY_FORMAT: &str = "%d-%m-%Y";

/// Owner of all on-disk state under one data directory
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the session file for one day and language
    #[must_use]
    pub fn session_path(&self, day: NaiveDate, language: Language) -> PathBuf {
        self.root
            .join("Days")
            .join(language.code())
            .join(format!("{}.txt", day.format(DAY_FORMAT)))
    }

    /// Path of the seed dictionary for a language
    #[must_use]
    pub fn seed_path(&self, language: Language) -> PathBuf {
        self.root.join("Dicts").join(format!("{}.txt", language.code()))
    }

    /// Parse a day in the session file naming format (`dd-mm-YYYY`)
    ///
    /// # Errors
    /// Returns the chrono parse error for anything else.
    pub fn parse_day(text: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(text, DAY_FORMAT)
    }

    /// Create the directories and empty seed files for the given languages
    ///
    /// # Errors
    /// Returns `StoreError::Write` if a directory or file cannot be created.
    pub fn ensure_layout(&self, languages: &[Language]) -> Result<(), StoreError> {
        for &language in languages {
            let days = self.root.join("Days").join(language.code());
            fs::create_dir_all(&days).map_err(|source| StoreError::Write {
                path: days.clone(),
                source,
            })?;

            let seed = self.seed_path(language);
            if !seed.exists() {
                write_atomic(&seed, b"")?;
            }
        }
        Ok(())
    }

    /// Load the record for a day, empty if there is none yet
    ///
    /// # Errors
    /// `StoreError::CorruptState` if the file is not a word → score object;
    /// the file is left in place, see [`Self::set_aside`]. `StoreError::Read` on I/O failure.
    pub fn load(&self, day: NaiveDate, language: Language) -> Result<SessionRecord, StoreError> {
        let path = self.session_path(day, language);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no session file yet");
                return Ok(SessionRecord::new());
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        if content.trim().is_empty() {
            return Ok(SessionRecord::new());
        }

        let record: SessionRecord = serde_json::from_str(&content)
            .map_err(|source| StoreError::CorruptState { path: path.clone(), source })?;
        debug!(path = %path.display(), words = record.len(), "session loaded");
        Ok(record)
    }

    /// Move an unreadable session file out of the way
    ///
    /// The file is renamed to `<name>.corrupt` (or `<name>.corrupt.<n>` if
    /// that is taken) so the next save cannot overwrite it.
    ///
    /// # Errors
    /// Returns `StoreError::Write` if the file cannot be renamed.
    pub fn set_aside(&self, day: NaiveDate, language: Language) -> Result<PathBuf, StoreError> {
        let path = self.session_path(day, language);
        let mut target = path.with_extension("txt.corrupt");
        let mut n = 1;
        while target.exists() {
            target = path.with_extension(format!("txt.corrupt.{n}"));
            n += 1;
        }

        fs::rename(&path, &target).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        warn!(from = %path.display(), to = %target.display(), "corrupt session set aside");
        Ok(target)
    }

    /// Atomically overwrite the record for a day
    ///
    /// # Errors
    /// Returns `StoreError::Write` if the file cannot be written.
    pub fn save(
        &self,
        day: NaiveDate,
        language: Language,
        record: &SessionRecord,
    ) -> Result<PathBuf, StoreError> {
        let path = self.session_path(day, language);
        let json = serde_json::to_vec(record).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: io::Error::other(e),
        })?;
        write_atomic(&path, &json)?;
        debug!(path = %path.display(), words = record.len(), "session saved");
        Ok(path)
    }

    /// Seed words for a language, in file order
    ///
    /// # Errors
    /// Returns `StoreError::Read` if the seed file cannot be read.
    pub fn load_seed(&self, language: Language) -> Result<Vec<Word>, StoreError> {
        seed::load_from_file(self.seed_path(language))
    }

    /// Remove words from a language's seed dictionary
    ///
    /// # Errors
    /// Returns a `StoreError` if the seed file cannot be read or rewritten.
    pub fn prune_seed(&self, language: Language, words: &[Word]) -> Result<usize, StoreError> {
        let removed = seed::prune(&self.seed_path(language), words)?;
        if removed > 0 {
            info!(%language, removed, "pruned unknown words from seeds");
        }
        Ok(removed)
    }

    /// Add new words to a language's seed dictionary
    ///
    /// # Errors
    /// Returns a `StoreError` if the seed file cannot be read or rewritten.
    pub fn append_seed(&self, language: Language, words: &[Word]) -> Result<usize, StoreError> {
        seed::append(&self.seed_path(language), words)
    }

    /// Remove duplicate entries from a language's seed dictionary
    ///
    /// # Errors
    /// Returns a `StoreError` if the seed file cannot be read or rewritten.
    pub fn dedupe_seed(&self, language: Language) -> Result<usize, StoreError> {
        seed::dedupe(&self.seed_path(language))
    }
}
