//! Corpora and vocabularies.
//!
//! A domain corpus lives in `<dir>/<domain>/` as two files:
//! `<domain>.docs` with one document per line (whitespace-separated
//! word ids) and `<domain>.vocab` with one `id:word` entry per line.

use crate::common::*;
use crate::common_io::read_lines;

use sorted_iter::assume::AssumeSortedByItemExt;
use sorted_iter::SortedIterator;
use std::collections::HashMap;
use std::path::Path;

/// Bidirectional word <-> dense id mapping
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<Box<str>>,
    word_to_id: HashMap<Box<str>, WordId>,
}

impl Vocabulary {
    /// Build a vocabulary where the i-th word gets id `i`
    pub fn from_words<I, S>(words: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ret = Vocabulary::default();
        for w in words {
            ret.push(w.as_ref())?;
        }
        Ok(ret)
    }

    fn push(&mut self, word: &str) -> anyhow::Result<WordId> {
        if self.word_to_id.contains_key(word) {
            return Err(anyhow::anyhow!("duplicate word in vocabulary: {}", word));
        }
        let id = self.words.len();
        self.words.push(word.into());
        self.word_to_id.insert(word.into(), id);
        Ok(id)
    }

    /// Read `id:word` lines. Ids must cover `0..V` exactly once.
    ///
    /// * `vocab_file` - file name--either gzipped or not
    pub fn from_file(vocab_file: &str) -> anyhow::Result<Self> {
        let lines = read_lines(vocab_file)?;
        let n_words = lines.iter().filter(|l| !l.trim().is_empty()).count();
        let mut slots: Vec<Option<Box<str>>> = vec![None; n_words];

        for (i, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (id, word) = line.split_once(':').ok_or(anyhow::anyhow!(
                "{}:{}: expected `id:word`, found `{}`",
                vocab_file,
                i + 1,
                line
            ))?;
            let id: WordId = id
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("{}:{}: bad word id: {}", vocab_file, i + 1, e))?;

            if id >= n_words {
                anyhow::bail!(
                    "{}:{}: word id {} out of range for {} words",
                    vocab_file,
                    i + 1,
                    id,
                    n_words
                );
            }
            if slots[id].is_some() {
                return Err(anyhow::anyhow!("{}: word id {} repeated", vocab_file, id));
            }
            slots[id] = Some(word.trim().into());
        }

        let mut ret = Vocabulary::default();
        for (id, word) in slots.into_iter().enumerate() {
            let word = word.ok_or(anyhow::anyhow!("{}: word id {} missing", vocab_file, id))?;
            ret.push(&word)?;
        }
        Ok(ret)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, id: WordId) -> &str {
        &self.words[id]
    }

    pub fn id(&self, word: &str) -> Option<WordId> {
        self.word_to_id.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_to_id.contains_key(word)
    }

    /// `id:word` lines
    pub fn to_lines(&self) -> Vec<Box<str>> {
        self.words
            .iter()
            .enumerate()
            .map(|(id, w)| format!("{}:{}", id, w).into_boxed_str())
            .collect()
    }
}

/// Documents of one domain over its own vocabulary
#[derive(Debug, Clone)]
pub struct Corpus {
    pub domain: Box<str>,
    pub docs: Vec<Vec<WordId>>,
    pub vocab: Vocabulary,
    /// sorted, distinct documents containing each word
    word_docs: Vec<Vec<DocId>>,
}

impl Corpus {
    /// Validate word ids against the vocabulary and index documents by word.
    pub fn new(domain: &str, docs: Vec<Vec<WordId>>, vocab: Vocabulary) -> anyhow::Result<Self> {
        let nwords = vocab.len();
        let mut word_docs: Vec<Vec<DocId>> = vec![vec![]; nwords];

        for (d, doc) in docs.iter().enumerate() {
            for &w in doc.iter() {
                if w >= nwords {
                    return Err(anyhow::anyhow!(
                        "{}: document {} has word id {} outside vocabulary of size {}",
                        domain,
                        d,
                        w,
                        nwords
                    ));
                }
                // documents are visited in order
                if word_docs[w].last() != Some(&d) {
                    word_docs[w].push(d);
                }
            }
        }

        Ok(Corpus {
            domain: domain.into(),
            docs,
            vocab,
            word_docs,
        })
    }

    /// Build a corpus from tokenized documents; the vocabulary follows
    /// first appearance.
    pub fn from_tokens<D, S>(domain: &str, docs: &[D]) -> anyhow::Result<Self>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut vocab = Vocabulary::default();
        let mut id_docs = Vec::with_capacity(docs.len());
        for doc in docs {
            let mut ids = Vec::with_capacity(doc.as_ref().len());
            for tok in doc.as_ref() {
                let tok = tok.as_ref();
                let id = match vocab.id(tok) {
                    Some(id) => id,
                    None => vocab.push(tok)?,
                };
                ids.push(id);
            }
            id_docs.push(ids);
        }
        Corpus::new(domain, id_docs, vocab)
    }

    /// Read `.docs` and `.vocab` files
    ///
    /// * `domain` - domain name
    /// * `docs_file` - one document of whitespace-separated word ids per line
    /// * `vocab_file` - one `id:word` per line
    pub fn from_files(domain: &str, docs_file: &str, vocab_file: &str) -> anyhow::Result<Self> {
        let vocab = Vocabulary::from_file(vocab_file)?;

        let mut docs = vec![];
        for (i, line) in read_lines(docs_file)?.iter().enumerate() {
            let doc = line
                .split_whitespace()
                .map(|x| x.parse::<WordId>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow::anyhow!("{}:{}: {}", docs_file, i + 1, e))?;
            docs.push(doc);
        }

        Corpus::new(domain, docs, vocab)
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_words(&self) -> usize {
        self.vocab.len()
    }

    pub fn num_tokens(&self) -> usize {
        self.docs.iter().map(|x| x.len()).sum()
    }

    /// Number of documents containing `w`
    pub fn document_frequency(&self, w: WordId) -> usize {
        self.word_docs[w].len()
    }

    /// Number of documents containing both `w1` and `w2`
    pub fn co_document_frequency(&self, w1: WordId, w2: WordId) -> usize {
        self.word_docs[w1]
            .iter()
            .copied()
            .assume_sorted_by_item()
            .intersection(self.word_docs[w2].iter().copied().assume_sorted_by_item())
            .count()
    }

    /// Write `.docs` and `.vocab` files into `dir/<domain>/`
    pub fn to_files(&self, dir: &str) -> anyhow::Result<()> {
        let domain_dir = format!("{}/{}", dir, self.domain);
        crate::common_io::mkdir(&domain_dir)?;

        let doc_lines: Vec<Box<str>> = self
            .docs
            .iter()
            .map(|doc| {
                doc.iter()
                    .map(|w| w.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .into_boxed_str()
            })
            .collect();

        crate::common_io::write_lines(&doc_lines, &format!("{}/{}.docs", domain_dir, self.domain))?;
        crate::common_io::write_lines(
            &self.vocab.to_lines(),
            &format!("{}/{}.vocab", domain_dir, self.domain),
        )?;
        Ok(())
    }
}

/// Load every `<dir>/<domain>/<domain>.{docs_ext,vocab_ext}` pair, sorted
/// by domain name.
///
/// * `dir` - root directory with one subdirectory per domain
/// * `docs_ext` - extension of document files, e.g. `docs`
/// * `vocab_ext` - extension of vocabulary files, e.g. `vocab`
pub fn load_domain_corpora(
    dir: &str,
    docs_ext: &str,
    vocab_ext: &str,
) -> anyhow::Result<Vec<Corpus>> {
    let mut domains: Vec<Box<str>> = vec![];
    for entry in std::fs::read_dir(dir).map_err(|e| anyhow::anyhow!("{}: {}", dir, e))? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            domains.push(name.into());
        }
    }
    domains.sort();

    let mut corpora = vec![];
    for domain in domains {
        let docs_file = format!("{}/{}/{}.{}", dir, domain, domain, docs_ext);
        let vocab_file = format!("{}/{}/{}.{}", dir, domain, domain, vocab_ext);
        if !Path::new(&docs_file).exists() || !Path::new(&vocab_file).exists() {
            warn!("skipping {}: no {} / {} files", domain, docs_ext, vocab_ext);
            continue;
        }
        corpora.push(Corpus::from_files(&domain, &docs_file, &vocab_file)?);
    }

    if corpora.is_empty() {
        return Err(anyhow::anyhow!("no domain corpus found under {}", dir));
    }

    info!("loaded {} domains from {}", corpora.len(), dir);
    Ok(corpora)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_frequencies() -> anyhow::Result<()> {
        let corpus = Corpus::from_tokens(
            "toy",
            &[
                vec!["battery", "life", "battery"],
                vec!["battery", "screen"],
                vec!["screen", "life"],
            ],
        )?;
        let battery = corpus.vocab.id("battery").unwrap();
        let life = corpus.vocab.id("life").unwrap();
        let screen = corpus.vocab.id("screen").unwrap();

        assert_eq!(corpus.document_frequency(battery), 2);
        assert_eq!(corpus.document_frequency(life), 2);
        assert_eq!(corpus.co_document_frequency(battery, life), 1);
        assert_eq!(corpus.co_document_frequency(battery, screen), 1);
        assert_eq!(corpus.co_document_frequency(life, life), 2);
        assert_eq!(corpus.num_tokens(), 7);
        Ok(())
    }

    #[test]
    fn test_word_id_out_of_range() -> anyhow::Result<()> {
        let vocab = Vocabulary::from_words(["a", "b"])?;
        assert!(Corpus::new("bad", vec![vec![0, 2]], vocab).is_err());
        Ok(())
    }

    #[test]
    fn test_duplicate_vocabulary_word() {
        assert!(Vocabulary::from_words(["a", "b", "a"]).is_err());
    }

    #[test]
    fn test_vocabulary_file_ids() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let file = tmp.path().join("toy.vocab");
        let file = file.to_str().ok_or(anyhow::anyhow!("non-utf8 path"))?;

        crate::common_io::write_lines(&["1:life", "", "0:battery"], file)?;
        let vocab = Vocabulary::from_file(file)?;
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.word(0), "battery");
        assert_eq!(vocab.id("life"), Some(1));

        for bad in [
            vec!["0:battery", "99999999999:life"],
            vec!["0:battery", "18446744073709551615:life"],
            vec!["0:battery", "2:life"],
            vec!["0:battery", "0:life"],
            vec!["0:battery", "life"],
        ] {
            crate::common_io::write_lines(&bad, file)?;
            assert!(Vocabulary::from_file(file).is_err(), "{:?}", bad);
        }
        Ok(())
    }
}
