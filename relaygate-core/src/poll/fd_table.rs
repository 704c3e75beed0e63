//! Ordered descriptor-to-token map for the portable backend.

use std::collections::BTreeMap;
use std::os::unix::io::RawFd;

use super::Token;
use crate::error::PollError;

/// Maps registered descriptors to their tokens.
///
/// `poll(2)` reports readiness by descriptor only, so the portable backend
/// looks tokens up here after each scan. Keys are unique.
#[derive(Debug, Default)]
pub struct FdTable {
    entries: BTreeMap<RawFd, Token>,
}

impl FdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new key. Fails if `fd` is already present.
    pub fn insert(&mut self, fd: RawFd, token: Token) -> Result<(), PollError> {
        use std::collections::btree_map::Entry;

        match self.entries.entry(fd) {
            Entry::Occupied(_) => Err(PollError::AlreadyRegistered { fd }),
            Entry::Vacant(slot) => {
                slot.insert(token);
                Ok(())
            }
        }
    }

    /// Replaces the token of an existing key.
    pub fn replace(&mut self, fd: RawFd, token: Token) -> Result<(), PollError> {
        match self.entries.get_mut(&fd) {
            Some(existing) => {
                *existing = token;
                Ok(())
            }
            None => Err(PollError::NotRegistered { fd }),
        }
    }

    pub fn remove(&mut self, fd: RawFd) -> Result<Token, PollError> {
        self.entries
            .remove(&fd)
            .ok_or(PollError::NotRegistered { fd })
    }

    pub fn get(&self, fd: RawFd) -> Option<Token> {
        self.entries.get(&fd).copied()
    }

    pub fn contains(&self, fd: RawFd) -> bool {
        self.entries.contains_key(&fd)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered descriptors in ascending order.
    pub fn fds(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_insert_lookup_remove() {
        let mut table = FdTable::new();
        table.insert(5, Token(50)).unwrap();
        table.insert(3, Token(30)).unwrap();
        table.insert(9, Token(90)).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(3), Some(Token(30)));
        assert_eq!(table.get(4), None);
        assert_eq!(table.fds().collect::<Vec<_>>(), vec![3, 5, 9]);

        assert_eq!(table.remove(5).unwrap(), Token(50));
        assert!(!table.contains(5));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_and_missing_keys() {
        let mut table = FdTable::new();
        table.insert(1, Token(1)).unwrap();

        assert!(matches!(
            table.insert(1, Token(2)),
            Err(PollError::AlreadyRegistered { fd: 1 })
        ));
        assert_eq!(table.get(1), Some(Token(1)));

        assert!(matches!(
            table.replace(2, Token(2)),
            Err(PollError::NotRegistered { fd: 2 })
        ));
        assert!(matches!(
            table.remove(2),
            Err(PollError::NotRegistered { fd: 2 })
        ));

        table.replace(1, Token::CONTROL).unwrap();
        assert_eq!(table.get(1), Some(Token::CONTROL));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(RawFd, usize),
        Replace(RawFd, usize),
        Remove(RawFd),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..32, any::<usize>()).prop_map(|(fd, t)| Op::Insert(fd, t)),
            (0..32, any::<usize>()).prop_map(|(fd, t)| Op::Replace(fd, t)),
            (0..32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_matches_model(ops in proptest::collection::vec(op(), 0..256)) {
            let mut table = FdTable::new();
            let mut model: HashMap<RawFd, Token> = HashMap::new();

            for op in ops {
                match op {
                    Op::Insert(fd, t) => {
                        let expected_ok = !model.contains_key(&fd);
                        prop_assert_eq!(table.insert(fd, Token(t)).is_ok(), expected_ok);
                        model.entry(fd).or_insert(Token(t));
                    }
                    Op::Replace(fd, t) => {
                        let expected_ok = model.contains_key(&fd);
                        prop_assert_eq!(table.replace(fd, Token(t)).is_ok(), expected_ok);
                        if let Some(existing) = model.get_mut(&fd) {
                            *existing = Token(t);
                        }
                    }
                    Op::Remove(fd) => {
                        prop_assert_eq!(table.remove(fd).ok(), model.remove(&fd));
                    }
                }
                prop_assert_eq!(table.len(), model.len());
            }

            let mut keys: Vec<_> = model.keys().copied().collect();
            keys.sort_unstable();
            prop_assert_eq!(table.fds().collect::<Vec<_>>(), keys);
            for (fd, token) in &model {
                prop_assert_eq!(table.get(*fd), Some(*token));
            }
        }
    }
}
