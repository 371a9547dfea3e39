//! Ordering and index bookkeeping that the block layout consumes.

use std::collections::{HashMap, HashSet};

use crate::error::SpecError;
use crate::ir::{Spec, SpecEntry};

/// Order entries so that every node comes after all of its children.
///
/// Entries are placed in input order as soon as their children are placed;
/// an entry waiting on a child is queued under that child and retried when the
/// child lands. Terminals therefore keep their relative order. Entries still
/// queued at the end (a cycle, or a child that does not exist) are reported.
pub fn toposort(spec: &[SpecEntry]) -> Result<Spec, SpecError> {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut queue: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut out: Spec = Vec::with_capacity(spec.len());

    for start in 0..spec.len() {
        let mut pending = vec![start];
        while let Some(idx) = pending.pop() {
            let entry = &spec[idx];
            if let Some(missing) = entry
                .children
                .iter()
                .find(|child| !placed.contains(child.as_str()))
            {
                queue.entry(missing.as_str()).or_default().push(idx);
                continue;
            }
            out.push(entry.clone());
            placed.insert(entry.id.as_str());
            if let Some(waiting) = queue.remove(entry.id.as_str()) {
                // reversed so that waiters are retried in the order they queued
                pending.extend(waiting.into_iter().rev());
            }
        }
    }

    if out.len() < spec.len() {
        let mut stuck: Vec<String> = queue
            .values()
            .flatten()
            .map(|&idx| spec[idx].id.clone())
            .collect();
        stuck.sort();
        return Err(SpecError::Unplaceable(stuck));
    }
    Ok(out)
}

/// A validated spec in topological order with ids renumbered to dense indices.
#[derive(Debug, Clone)]
pub struct PreparedSpec {
    pub entries: Spec,
    pub index: HashMap<String, usize>,
    pub children: Vec<Vec<usize>>,
    pub parent: Vec<Option<usize>>,
    /// Position among the terminals of the rightmost terminal under each entry.
    pub rightmost: Vec<usize>,
}

impl PreparedSpec {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_nonterminals(&self) -> bool {
        self.entries.iter().any(|e| !e.is_terminal())
    }
}

pub fn prepare(spec: &[SpecEntry]) -> Result<PreparedSpec, SpecError> {
    validate(spec)?;
    let entries = toposort(spec)?;
    let index: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), i))
        .collect();

    let children: Vec<Vec<usize>> = entries
        .iter()
        .map(|e| e.children.iter().map(|c| index[c.as_str()]).collect())
        .collect();

    let mut parent = vec![None; entries.len()];
    for (idx, kids) in children.iter().enumerate() {
        for &kid in kids {
            if parent[kid].is_some() {
                return Err(SpecError::SharedChild(entries[kid].id.clone()));
            }
            parent[kid] = Some(idx);
        }
    }

    let rightmost = rightmost_terminals(&children);

    Ok(PreparedSpec {
        entries,
        index,
        children,
        parent,
        rightmost,
    })
}

/// Entries must already be in topological order.
pub fn rightmost_terminals(children: &[Vec<usize>]) -> Vec<usize> {
    let mut rightmost = vec![0; children.len()];
    let mut next_terminal = 0usize;
    for (idx, kids) in children.iter().enumerate() {
        if kids.is_empty() {
            rightmost[idx] = next_terminal;
            next_terminal += 1;
        } else {
            rightmost[idx] = kids.iter().map(|&k| rightmost[k]).max().unwrap_or(0);
        }
    }
    rightmost
}

fn validate(spec: &[SpecEntry]) -> Result<(), SpecError> {
    let mut ids: HashSet<&str> = HashSet::new();
    for entry in spec {
        if !ids.insert(entry.id.as_str()) {
            return Err(SpecError::DuplicateId(entry.id.clone()));
        }
    }
    for entry in spec {
        let references = entry
            .children
            .iter()
            .chain(entry.secondary.iter().map(|s| &s.id))
            .chain(entry.only.iter());
        for to in references {
            if !ids.contains(to.as_str()) {
                return Err(SpecError::UnknownReference {
                    from: entry.id.clone(),
                    to: to.clone(),
                });
            }
        }
        if let Some(only) = &entry.only
            && !entry.children.contains(only)
        {
            return Err(SpecError::OnlyNotAChild {
                id: entry.id.clone(),
                only: only.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chain() -> Spec {
        vec![
            SpecEntry::terminal("1"),
            SpecEntry::node("2", &["1"]),
            SpecEntry::node("3", &["2"]),
        ]
    }

    fn ids(spec: &[SpecEntry]) -> Vec<&str> {
        spec.iter().map(|e| e.id.as_str()).collect()
    }

    fn is_topological(spec: &[SpecEntry]) -> bool {
        let pos: HashMap<&str, usize> = spec
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.as_str(), i))
            .collect();
        spec.iter()
            .enumerate()
            .all(|(i, e)| e.children.iter().all(|c| pos[c.as_str()] < i))
    }

    #[test]
    fn every_permutation_of_a_chain_sorts_to_the_chain() {
        let subject = chain();
        let perms = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for perm in perms {
            let shuffled: Spec = perm.iter().map(|&i| subject[i].clone()).collect();
            let sorted = toposort(&shuffled).expect("sortable");
            assert_eq!(ids(&sorted), vec!["1", "2", "3"], "from {perm:?}");
        }
    }

    #[test]
    fn cycles_are_reported() {
        let spec = vec![
            SpecEntry::terminal("a"),
            SpecEntry::node("X", &["a", "Y"]),
            SpecEntry::node("Y", &["X"]),
        ];
        assert_eq!(
            toposort(&spec),
            Err(SpecError::Unplaceable(vec!["X".to_string(), "Y".to_string()]))
        );
    }

    #[test]
    fn prepare_rejects_dangling_references() {
        let spec = vec![SpecEntry::terminal("a"), SpecEntry::node("S", &["a", "b"])];
        assert_eq!(
            prepare(&spec).unwrap_err(),
            SpecError::UnknownReference {
                from: "S".to_string(),
                to: "b".to_string()
            }
        );
        let spec = vec![
            SpecEntry::terminal("a"),
            SpecEntry::node("S", &["a"]).with_secondary("zz", "SB"),
        ];
        assert!(matches!(
            prepare(&spec),
            Err(SpecError::UnknownReference { .. })
        ));
    }

    #[test]
    fn prepare_rejects_duplicates_and_bad_only() {
        let spec = vec![SpecEntry::terminal("a"), SpecEntry::terminal("a")];
        assert_eq!(
            prepare(&spec).unwrap_err(),
            SpecError::DuplicateId("a".to_string())
        );
        let spec = vec![
            SpecEntry::terminal("a"),
            SpecEntry::terminal("b"),
            SpecEntry::node("S", &["a"]).with_only("b"),
        ];
        assert!(matches!(prepare(&spec), Err(SpecError::OnlyNotAChild { .. })));
    }

    #[test]
    fn prepare_rejects_shared_children() {
        let spec = vec![
            SpecEntry::terminal("a"),
            SpecEntry::node("X", &["a"]),
            SpecEntry::node("Y", &["a"]),
        ];
        assert_eq!(
            prepare(&spec).unwrap_err(),
            SpecError::SharedChild("a".to_string())
        );
    }

    #[test]
    fn rightmost_terminal_follows_word_order() {
        let spec = vec![
            SpecEntry::terminal("jag"),
            SpecEntry::terminal("ville"),
            SpecEntry::terminal("åka"),
            SpecEntry::terminal("dit"),
            SpecEntry::node("IP", &["åka", "dit"]),
            SpecEntry::node("VP", &["IP", "ville"]),
            SpecEntry::node("S", &["jag", "VP"]),
        ];
        let prepared = prepare(&spec).expect("valid");
        let at = |id: &str| prepared.rightmost[prepared.index[id]];
        assert_eq!(at("jag"), 0);
        assert_eq!(at("dit"), 3);
        assert_eq!(at("IP"), 3);
        assert_eq!(at("S"), 3);
        assert_eq!(prepared.parent[prepared.index["IP"]], Some(prepared.index["VP"]));
        assert_eq!(prepared.parent[prepared.index["S"]], None);
    }

    fn sentence() -> Spec {
        vec![
            SpecEntry::terminal("a"),
            SpecEntry::terminal("b"),
            SpecEntry::terminal("c"),
            SpecEntry::terminal("d"),
            SpecEntry::terminal("e"),
            SpecEntry::node("C", &["c", "e"]),
            SpecEntry::node("AB", &["a", "b"]),
            SpecEntry::node("S", &["AB", "C", "d"]),
        ]
    }

    proptest! {
        #[test]
        fn any_permutation_sorts_topologically(
            shuffled in Just(sentence()).prop_shuffle()
        ) {
            let sorted = toposort(&shuffled).expect("sortable");
            prop_assert_eq!(sorted.len(), shuffled.len());
            prop_assert!(is_topological(&sorted));
            let again = toposort(&sorted).expect("sortable");
            prop_assert_eq!(again, sorted);
        }
    }
}
