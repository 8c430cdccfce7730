use crate::common::*;

/// Live placements of every word occurrence, grouped by (topic, word) so
/// that one occurrence of a word under a topic can be picked and evicted
/// in O(1).
#[derive(Debug, Clone)]
pub struct OccurrenceIndex {
    n_words: usize,
    /// `groups[t * n_words + w]`: (document, position) pairs
    groups: Vec<Vec<(DocId, usize)>>,
    /// where each (document, position) sits in its group
    slots: Vec<Vec<Option<usize>>>,
}

impl OccurrenceIndex {
    pub fn new(docs: &[Vec<WordId>], n_topics: usize, n_words: usize) -> Self {
        OccurrenceIndex {
            n_words,
            groups: vec![vec![]; n_topics * n_words],
            slots: docs.iter().map(|doc| vec![None; doc.len()]).collect(),
        }
    }

    /// Record word `w` at `(d, n)` under topic `t`. Panics if `(d, n)` is
    /// already recorded.
    pub fn insert(&mut self, w: WordId, d: DocId, n: usize, t: TopicId) {
        let group = &mut self.groups[t * self.n_words + w];
        let slot = &mut self.slots[d][n];
        if slot.is_some() {
            panic!("duplicate occurrence record: word {} at ({}, {})", w, d, n);
        }
        *slot = Some(group.len());
        group.push((d, n));
    }

    /// Drop the record of word `w` at `(d, n)` under topic `t`
    pub fn remove(&mut self, w: WordId, d: DocId, n: usize, t: TopicId) {
        let Some(idx) = self.slots[d][n].take() else {
            panic!("no occurrence record: word {} at ({}, {})", w, d, n);
        };
        let group = &mut self.groups[t * self.n_words + w];
        assert_eq!(
            group[idx],
            (d, n),
            "occurrence ({}, {}) is not recorded under topic {}",
            d,
            n,
            t
        );
        group.swap_remove(idx);
        if let Some(&(d_moved, n_moved)) = group.get(idx) {
            self.slots[d_moved][n_moved] = Some(idx);
        }
    }

    /// Occurrences of word `w` under topic `t`
    pub fn group(&self, t: TopicId, w: WordId) -> &[(DocId, usize)] {
        &self.groups[t * self.n_words + w]
    }

    pub fn contains(&self, d: DocId, n: usize) -> bool {
        self.slots[d][n].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_keeps_slots() {
        let docs = vec![vec![0, 1, 0], vec![0]];
        let mut index = OccurrenceIndex::new(&docs, 2, 2);
        index.insert(0, 0, 0, 1);
        index.insert(0, 0, 2, 1);
        index.insert(0, 1, 0, 1);
        assert_eq!(index.group(1, 0).len(), 3);

        index.remove(0, 0, 0, 1);
        assert_eq!(index.group(1, 0).len(), 2);
        assert!(!index.contains(0, 0));

        // the swapped-in record can still be removed
        index.remove(0, 1, 0, 1);
        index.remove(0, 0, 2, 1);
        assert!(index.group(1, 0).is_empty());
    }

    #[test]
    #[should_panic(expected = "duplicate occurrence record")]
    fn test_duplicate_insert_panics() {
        let docs = vec![vec![0]];
        let mut index = OccurrenceIndex::new(&docs, 1, 1);
        index.insert(0, 0, 0, 0);
        index.insert(0, 0, 0, 0);
    }
}
