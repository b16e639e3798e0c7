//! WordNet-backed lexicon
//!
//! Reads a Princeton WordNet 3.0 database (`data.noun`, `data.verb`,
//! `data.adj`, `data.adv`) for the synset graph and English lemmas, plus any
//! Open Multilingual Wordnet tables (`wn-data-<code>.tab`) for lemmas in
//! other languages. OMW tables reuse the Princeton synset offsets.
//!
//! Data file line layout:
//!
//! ```text
//! offset lex_filenum ss_type w_cnt (word lex_id)* p_cnt (symbol offset pos src/tgt)* [frames] | gloss
//! ```

use super::{Lexicon, LexiconError};
use crate::core::{Language, Word};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

const DATA_FILES: [&str; 4] = ["data.noun", "data.verb", "data.adj", "data.adv"];

/// Part of speech of a synset; adjective satellites fold into `Adjective`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "n" => Some(Self::Noun),
            "v" => Some(Self::Verb),
            "a" | "s" => Some(Self::Adjective),
            "r" => Some(Self::Adverb),
            _ => None,
        }
    }

    const fn tag(self) -> char {
        match self {
            Self::Noun => 'n',
            Self::Verb => 'v',
            Self::Adjective => 'a',
            Self::Adverb => 'r',
        }
    }
}

/// Synset identifier: byte offset in the data file plus part of speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SynsetId {
    offset: u32,
    pos: PartOfSpeech,
}

impl SynsetId {
    #[must_use]
    pub const fn new(offset: u32, pos: PartOfSpeech) -> Self {
        Self { offset, pos }
    }

    fn parse(offset: &str, pos: &str) -> Option<Self> {
        Some(Self {
            offset: offset.parse().ok()?,
            pos: PartOfSpeech::from_tag(pos)?,
        })
    }
}

impl FromStr for SynsetId {
    type Err = String;

    /// Parse the OMW form, e.g. `02084071-n`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (offset, pos) = s
            .split_once('-')
            .ok_or_else(|| format!("synset id '{s}' has no part of speech"))?;
        Self::parse(offset, pos).ok_or_else(|| format!("invalid synset id '{s}'"))
    }
}

impl fmt::Display for SynsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}-{}", self.offset, self.pos.tag())
    }
}

#[derive(Debug, Clone, Default)]
struct Relations {
    hypernyms: Vec<SynsetId>,
    hyponyms: Vec<SynsetId>,
}

/// One parsed line of a data file
#[derive(Debug, Clone)]
struct ParsedSynset {
    id: SynsetId,
    lemmas: Vec<Word>,
    relations: Relations,
}

/// Lemmas of one language, indexed both ways
#[derive(Debug, Clone, Default)]
struct LemmaTable {
    by_synset: FxHashMap<SynsetId, Vec<Word>>,
    senses: FxHashMap<Word, Vec<SynsetId>>,
}

impl LemmaTable {
    fn add(&mut self, id: SynsetId, word: Word) {
        let lemmas = self.by_synset.entry(id).or_default();
        if !lemmas.contains(&word) {
            lemmas.push(word.clone());
        }
        let senses = self.senses.entry(word).or_default();
        if !senses.contains(&id) {
            senses.push(id);
        }
    }

    fn lemmas(&self, id: SynsetId) -> &[Word] {
        self.by_synset.get(&id).map_or(&[], Vec::as_slice)
    }
}

/// Lexicon reading a local WordNet distribution
#[derive(Debug, Clone, Default)]
pub struct WordNetLexicon {
    relations: FxHashMap<SynsetId, Relations>,
    tables: FxHashMap<Language, LemmaTable>,
    plural_fallback: bool,
}

impl WordNetLexicon {
    /// Load every data file and lemma table found in `dir`
    ///
    /// Data files are parsed in parallel. Missing data files are skipped,
    /// but at least one must exist.
    ///
    /// # Errors
    /// Returns `LexiconError::Io` if no data file can be read, or
    /// `LexiconError::Parse` on a malformed line.
    pub fn load(dir: &Path) -> Result<Self, LexiconError> {
        let parsed: Vec<Vec<ParsedSynset>> = DATA_FILES
            .par_iter()
            .filter_map(|name| {
                let path = dir.join(name);
                if path.is_file() {
                    Some(parse_data_file(&path, name))
                } else {
                    warn!(path = %path.display(), "WordNet data file missing");
                    None
                }
            })
            .collect::<Result<_, _>>()?;

        if parsed.is_empty() {
            let path = dir.join(DATA_FILES[0]);
            return Err(LexiconError::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no WordNet data files"),
            });
        }

        let mut lexicon = Self::default();
        for synset in parsed.into_iter().flatten() {
            lexicon.insert_synset(synset);
        }

        for language in Language::ALL {
            if language == Language::English {
                continue;
            }
            let path = dir.join(format!("wn-data-{}.tab", language.wordnet_code()));
            if path.is_file() {
                let content = fs::read_to_string(&path).map_err(|source| LexiconError::Io {
                    path: path.clone(),
                    source,
                })?;
                lexicon.add_lemma_table(language, &content, &path.display().to_string())?;
            }
        }

        info!(
            synsets = lexicon.relations.len(),
            languages = lexicon.tables.len(),
            "WordNet loaded"
        );
        Ok(lexicon)
    }

    /// Retry lookups of an unknown word ending in `s` without the `s`
    #[must_use]
    pub const fn with_plural_fallback(mut self, enabled: bool) -> Self {
        self.plural_fallback = enabled;
        self
    }

    /// Languages that have lemmas loaded
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<_> = self.tables.keys().copied().collect();
        languages.sort();
        languages
    }

    fn insert_synset(&mut self, synset: ParsedSynset) {
        let english = self.tables.entry(Language::English).or_default();
        for lemma in synset.lemmas {
            english.add(synset.id, lemma);
        }
        self.relations.insert(synset.id, synset.relations);
    }

    /// Add lemmas from an OMW tab file's content
    fn add_lemma_table(
        &mut self,
        language: Language,
        content: &str,
        file: &str,
    ) -> Result<(), LexiconError> {
        let table = self.tables.entry(language).or_default();
        let mut added = 0_usize;

        for (index, line) in content.lines().enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let (Some(id), Some(kind), Some(lemma)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(LexiconError::Parse {
                    file: file.to_string(),
                    line: index + 1,
                    message: "expected three tab-separated fields".to_string(),
                });
            };
            if !kind.ends_with(":lemma") {
                continue;
            }
            let id: SynsetId = id.parse().map_err(|message| LexiconError::Parse {
                file: file.to_string(),
                line: index + 1,
                message,
            })?;
            if let Ok(word) = Word::from_lemma(lemma) {
                table.add(id, word);
                added += 1;
            }
        }

        debug!(%language, lemmas = added, file, "lemma table loaded");
        Ok(())
    }

    fn senses<'a>(&self, table: &'a LemmaTable, word: &Word) -> Option<&'a [SynsetId]> {
        if let Some(senses) = table.senses.get(word) {
            return Some(senses);
        }
        if !self.plural_fallback {
            return None;
        }
        let singular = word.text().strip_suffix('s')?;
        let singular = Word::new(singular).ok()?;
        table.senses.get(&singular).map(Vec::as_slice)
    }

    /// Synchronous lookup behind [`Lexicon::related`]
    ///
    /// # Errors
    /// `UnsupportedLanguage` without a lemma table, `Miss` for an unknown word.
    pub fn lookup(&self, word: &Word, language: Language) -> Result<Vec<Word>, LexiconError> {
        let table = self
            .tables
            .get(&language)
            .ok_or(LexiconError::UnsupportedLanguage(language))?;
        let senses = self.senses(table, word).ok_or_else(|| LexiconError::Miss {
            word: word.clone(),
            language,
        })?;

        let mut seen = FxHashSet::default();
        let mut related = Vec::new();
        let mut collect = |id: SynsetId| {
            for lemma in table.lemmas(id) {
                if seen.insert(lemma) {
                    related.push(lemma.clone());
                }
            }
        };

        for &id in senses {
            collect(id);
            if let Some(relations) = self.relations.get(&id) {
                relations.hypernyms.iter().copied().for_each(&mut collect);
                relations.hyponyms.iter().copied().for_each(&mut collect);
            }
        }

        Ok(related)
    }
}

impl Lexicon for WordNetLexicon {
    async fn related(&self, word: &Word, language: Language) -> Result<Vec<Word>, LexiconError> {
        self.lookup(word, language)
    }

    fn name(&self) -> &str {
        "wordnet"
    }
}

fn parse_data_file(path: &Path, name: &str) -> Result<Vec<ParsedSynset>, LexiconError> {
    let content = fs::read_to_string(path).map_err(|source| LexiconError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_data(&content, name)
}

fn parse_data(content: &str, file: &str) -> Result<Vec<ParsedSynset>, LexiconError> {
    content
        .lines()
        .enumerate()
        // License header lines start with two spaces
        .filter(|(_, line)| !line.starts_with(' ') && !line.trim().is_empty())
        .map(|(index, line)| {
            parse_data_line(line).map_err(|message| LexiconError::Parse {
                file: file.to_string(),
                line: index + 1,
                message,
            })
        })
        .collect()
}

fn parse_data_line(line: &str) -> Result<ParsedSynset, String> {
    let fields = line.split('|').next().unwrap_or_default();
    let mut tokens = fields.split_whitespace();
    let mut next = |what: &str| tokens.next().ok_or_else(|| format!("missing {what}"));

    let offset = next("offset")?;
    let _lex_filenum = next("lex_filenum")?;
    let ss_type = next("ss_type")?;
    let id = SynsetId::parse(offset, ss_type)
        .ok_or_else(|| format!("invalid synset '{offset} {ss_type}'"))?;

    let w_cnt = usize::from_str_radix(next("w_cnt")?, 16).map_err(|e| format!("w_cnt: {e}"))?;
    let mut lemmas = Vec::with_capacity(w_cnt);
    for _ in 0..w_cnt {
        let lemma = next("word")?;
        let _lex_id = next("lex_id")?;
        if let Ok(word) = Word::from_lemma(strip_adjective_marker(lemma)) {
            lemmas.push(word);
        }
    }

    let p_cnt: usize = next("p_cnt")?.parse().map_err(|e| format!("p_cnt: {e}"))?;
    let mut relations = Relations::default();
    for _ in 0..p_cnt {
        let symbol = next("pointer symbol")?;
        let target_offset = next("pointer offset")?;
        let target_pos = next("pointer pos")?;
        let _source_target = next("pointer source/target")?;

        let target = SynsetId::parse(target_offset, target_pos)
            .ok_or_else(|| format!("invalid pointer '{target_offset} {target_pos}'"))?;
        match symbol {
            // Instance links (`@i`, `~i`) name individuals, not broader or
            // narrower terms
            "@" => relations.hypernyms.push(target),
            "~" => relations.hyponyms.push(target),
            _ => {}
        }
    }

    Ok(ParsedSynset {
        id,
        lemmas,
        relations,
    })
}

/// Drop the syntactic marker some adjectives carry, e.g. `galore(ip)`
fn strip_adjective_marker(lemma: &str) -> &str {
    match lemma.find('(') {
        Some(pos) if lemma.ends_with(')') => &lemma[..pos],
        _ => lemma,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_NOUN: &str = "  1 This software and database is being provided to you, the LICENSEE, by
  2 Princeton University under the following license.
02083346 05 n 02 canine 0 canid 0 002 @ 02075296 n 0000 ~ 02084071 n 0000 | any of various fissiped mammals
02084071 05 n 03 dog 0 domestic_dog 0 Canis_familiaris 0 003 @ 02083346 n 0000 ~ 02085374 n 0000 ~i 09999999 n 0000 | a member of the genus Canis
02085374 05 n 01 toy_dog 0 001 @ 02084071 n 0000 | any of several breeds of very small dogs
02075296 05 n 01 carnivore 0 001 ~ 02083346 n 0000 | a terrestrial or aquatic flesh-eating mammal
";

    const DATA_ADJ: &str = "01932973 00 s 01 galore(ip) 0 001 & 01530200 a 0000 | in great numbers
";

    const FRA_TAB: &str = "# Wordnet Libre du Français\tfra\thttp://alpage.inria.fr/~sagot/wolf.html\tCeCILL-C
02084071-n\tfra:lemma\tchien
02084071-n\tfra:def\tun membre du genre Canis
02083346-n\tfra:lemma\tcanidé
02085374-n\tfra:lemma\tchien de manchon
02075296-n\tfra:lemma\tcarnivore
";

    fn lexicon() -> WordNetLexicon {
        let mut lexicon = WordNetLexicon::default();
        for synset in parse_data(DATA_NOUN, "data.noun").unwrap() {
            lexicon.insert_synset(synset);
        }
        for synset in parse_data(DATA_ADJ, "data.adj").unwrap() {
            lexicon.insert_synset(synset);
        }
        lexicon
            .add_lemma_table(Language::French, FRA_TAB, "wn-data-fra.tab")
            .unwrap();
        lexicon
    }

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(Word::text).collect()
    }

    #[test]
    fn parses_data_line() {
        let synsets = parse_data(DATA_NOUN, "data.noun").unwrap();
        assert_eq!(synsets.len(), 4);

        let dog = &synsets[1];
        assert_eq!(dog.id.to_string(), "02084071-n");
        assert_eq!(
            texts(&dog.lemmas),
            ["dog", "domestic-dog", "canis-familiaris"]
        );
        assert_eq!(dog.relations.hypernyms.len(), 1);
        // The `~i` instance link is not a hyponym
        assert_eq!(dog.relations.hyponyms.len(), 1);
    }

    #[test]
    fn satellite_adjective_marker_stripped() {
        let synsets = parse_data(DATA_ADJ, "data.adj").unwrap();
        assert_eq!(texts(&synsets[0].lemmas), ["galore"]);
        assert_eq!(synsets[0].id.pos, PartOfSpeech::Adjective);
    }

    #[test]
    fn malformed_line_reports_position() {
        let err = parse_data("02084071 05 n 03 dog 0\n", "data.noun").unwrap_err();
        assert!(matches!(err, LexiconError::Parse { line: 1, .. }));
    }

    #[test]
    fn english_related_words() {
        let lexicon = lexicon();
        let related = lexicon
            .lookup(&Word::new("dog").unwrap(), Language::English)
            .unwrap();
        assert_eq!(
            texts(&related),
            ["dog", "domestic-dog", "canis-familiaris", "canine", "canid", "toy-dog"]
        );
    }

    #[test]
    fn french_related_words() {
        let lexicon = lexicon();
        let related = lexicon
            .lookup(&Word::new("chien").unwrap(), Language::French)
            .unwrap();
        assert_eq!(texts(&related), ["chien", "canidé", "chien-de-manchon"]);
    }

    #[test]
    fn unknown_word_is_a_miss() {
        let lexicon = lexicon();
        let err = lexicon
            .lookup(&Word::new("xyzzy").unwrap(), Language::French)
            .unwrap_err();
        assert!(matches!(err, LexiconError::Miss { .. }));
    }

    #[test]
    fn plural_fallback_is_optional() {
        let word = Word::new("chiens").unwrap();

        let strict = lexicon();
        assert!(strict.lookup(&word, Language::French).is_err());

        let lenient = lexicon().with_plural_fallback(true);
        let related = lenient.lookup(&word, Language::French).unwrap();
        assert!(related.contains(&Word::new("canidé").unwrap()));
    }

    #[test]
    fn missing_language_table() {
        let mut lexicon = WordNetLexicon::default();
        for synset in parse_data(DATA_NOUN, "data.noun").unwrap() {
            lexicon.insert_synset(synset);
        }
        let err = lexicon
            .lookup(&Word::new("chien").unwrap(), Language::French)
            .unwrap_err();
        assert!(matches!(err, LexiconError::UnsupportedLanguage(Language::French)));
        assert_eq!(lexicon.languages(), [Language::English]);
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.noun"), DATA_NOUN).unwrap();
        fs::write(dir.path().join("wn-data-fra.tab"), FRA_TAB).unwrap();

        let lexicon = WordNetLexicon::load(dir.path()).unwrap();
        assert_eq!(lexicon.languages(), [Language::English, Language::French]);
    }

    #[test]
    fn load_from_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            WordNetLexicon::load(dir.path()),
            Err(LexiconError::Io { .. })
        ));
    }
}
