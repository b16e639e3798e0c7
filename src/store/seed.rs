//! Seed dictionary files
//!
//! A seed file lists candidate words, one per line. It only shrinks by
//! pruning words the oracle rejected, and grows by explicit appends.

use super::{StoreError, write_atomic};
use crate::core::Word;
use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Load words from a seed file
///
/// Blank and invalid lines are skipped. A missing file is an empty list.
///
/// # Errors
///
/// Returns `StoreError::Read` if the file exists but cannot be read.
///
/// # Examples
/// ```no_run
/// use cemantix_solver::store::seed::load_from_file;
///
/// let words = load_from_file("Dicts/fr.txt").unwrap();
/// println!("Loaded {} words", words.len());
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Word>, StoreError> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    Ok(words_from_lines(&content))
}

fn words_from_lines(content: &str) -> Vec<Word> {
    content
        .lines()
        .filter_map(|line| Word::new(line).ok())
        .collect()
}

fn read_lines(path: &Path) -> Result<Vec<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_lines<'a>(path: &Path, lines: impl IntoIterator<Item = &'a str>) -> Result<(), StoreError> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    write_atomic(path, contents.as_bytes())
}

/// Remove the given words from a seed file
///
/// Removal is by normalised word, not by position; every other line is kept
/// in its original order. Returns the number of lines removed.
///
/// # Errors
///
/// Returns a `StoreError` if the file cannot be read or rewritten.
pub fn prune(path: &Path, words: &[Word]) -> Result<usize, StoreError> {
    if words.is_empty() {
        return Ok(0);
    }

    let rejected: FxHashSet<&Word> = words.iter().collect();
    let lines = read_lines(path)?;
    let kept: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|line| Word::new(line).map_or(true, |word| !rejected.contains(&word)))
        .collect();

    let removed = lines.len() - kept.len();
    if removed > 0 {
        write_lines(path, kept)?;
    }
    Ok(removed)
}

/// Append words that are not already in the seed file
///
/// Returns the number of words added.
///
/// # Errors
///
/// Returns a `StoreError` if the file cannot be read or rewritten.
pub fn append(path: &Path, words: &[Word]) -> Result<usize, StoreError> {
    let lines = read_lines(path)?;
    let mut present: FxHashSet<Word> = words_from_lines(&lines.join("\n")).into_iter().collect();

    let added: Vec<&Word> = words.iter().filter(|word| present.insert((*word).clone())).collect();
    if added.is_empty() {
        return Ok(0);
    }

    write_lines(
        path,
        lines
            .iter()
            .map(String::as_str)
            .chain(added.iter().map(|word| word.text())),
    )?;
    Ok(added.len())
}

/// Rewrite a seed file with one normalised copy of each word
///
/// First occurrence wins; invalid lines are dropped. Returns the number of
/// lines removed.
///
/// # Errors
///
/// Returns a `StoreError` if the file cannot be read or rewritten.
pub fn dedupe(path: &Path) -> Result<usize, StoreError> {
    let lines = read_lines(path)?;
    let mut seen = FxHashSet::default();
    let unique: Vec<Word> = words_from_lines(&lines.join("\n"))
        .into_iter()
        .filter(|word| seen.insert(word.clone()))
        .collect();

    let removed = lines.len() - unique.len();
    if removed > 0 {
        write_lines(path, unique.iter().map(Word::text))?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::words_from_slice;

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(Word::text).collect()
    }

    #[test]
    fn load_skips_blank_and_invalid_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.txt");
        fs::write(&path, "chien\n\n  Chat \ndeux mots\nloup\n").unwrap();

        let words = load_from_file(&path).unwrap();
        assert_eq!(texts(&words), ["chien", "chat", "loup"]);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_file(dir.path().join("none.txt")).unwrap().is_empty());
    }

    #[test]
    fn prune_removes_only_given_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.txt");
        fs::write(&path, "chien\nxyzzy\nchat\nXYZZY\nloup\n").unwrap();

        let removed = prune(&path, &words_from_slice(&["xyzzy", "absent"])).unwrap();
        assert_eq!(removed, 2);

        let words = load_from_file(&path).unwrap();
        assert_eq!(texts(&words), ["chien", "chat", "loup"]);
    }

    #[test]
    fn prune_nothing_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.txt");
        fs::write(&path, "b\na\nb\n").unwrap();

        assert_eq!(prune(&path, &[]).unwrap(), 0);
        assert_eq!(prune(&path, &words_from_slice(&["zz"])).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b\na\nb\n");
    }

    #[test]
    fn append_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.txt");
        fs::write(&path, "dog\ncat\n").unwrap();

        let added = append(&path, &words_from_slice(&["Cat", "wolf", "fox", "wolf"])).unwrap();
        assert_eq!(added, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "dog\ncat\nwolf\nfox\n");
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dicts").join("en.txt");
        assert_eq!(append(&path, &words_from_slice(&["dog"])).unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "dog\n");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.txt");
        fs::write(&path, "chien\nchat\nChien\n\nloup\nchat\n").unwrap();

        assert_eq!(dedupe(&path).unwrap(), 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "chien\nchat\nloup\n");
    }
}
