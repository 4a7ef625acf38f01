//! Ordered prefix tree for symbol names.
//!
//! Children are kept in byte order, so every traversal yields keys sorted
//! lexicographically, which is the order completion listings are printed in.

use std::collections::BTreeMap;

/// A trie (prefix tree) with sorted iteration.
///
/// # Examples
///
/// ```
/// use bevy_console_overlay::core::Trie;
///
/// let mut trie = Trie::new();
/// trie.insert("debug_objects", 1);
/// trie.insert("debug_bsp", 2);
/// trie.insert("cheat_all_weapons", 3);
///
/// let keys: Vec<_> = trie.prefix_iter("debug_").map(|(k, _)| k).collect();
/// assert_eq!(keys, vec!["debug_bsp", "debug_objects"]);
/// ```
#[derive(Debug, Clone)]
pub struct Trie<V> {
    root: TrieNode<V>,
    len: usize,
}

#[derive(Debug, Clone)]
struct TrieNode<V> {
    children: BTreeMap<u8, TrieNode<V>>,
    entry: Option<(Box<str>, V)>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            entry: None,
        }
    }
}

impl<V> TrieNode<V> {
    /// Take the entry at `key` below this node, dropping nodes left empty.
    fn remove(&mut self, key: &[u8]) -> Option<V> {
        let Some((byte, rest)) = key.split_first() else {
            return self.entry.take().map(|(_, v)| v);
        };

        let child = self.children.get_mut(byte)?;
        let value = child.remove(rest)?;
        if child.entry.is_none() && child.children.is_empty() {
            self.children.remove(byte);
        }
        Some(value)
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a key-value pair, returning the previous value.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for &byte in key.as_bytes() {
            node = node.children.entry(byte).or_default();
        }

        let old = node.entry.replace((key.into(), value)).map(|(_, v)| v);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    fn node(&self, key: &str) -> Option<&TrieNode<V>> {
        key.as_bytes()
            .iter()
            .try_fold(&self.root, |node, byte| node.children.get(byte))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.node(key)?.entry.as_ref().map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut node = &mut self.root;
        for byte in key.as_bytes() {
            node = node.children.get_mut(byte)?;
        }
        node.entry.as_mut().map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key, returning its value. Branches left without entries
    /// are pruned.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let value = self.root.remove(key.as_bytes())?;
        self.len -= 1;
        Some(value)
    }

    /// Iterate, in key order, over the entries starting with `prefix`.
    pub fn prefix_iter(&self, prefix: &str) -> PrefixIter<'_, V> {
        PrefixIter {
            stack: self.node(prefix).into_iter().collect(),
        }
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> PrefixIter<'_, V> {
        self.prefix_iter("")
    }

    /// Iterate over all keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }
}

/// Pre-order walk over a subtree, yielding sorted keys.
pub struct PrefixIter<'a, V> {
    stack: Vec<&'a TrieNode<V>>,
}

impl<'a, V> Iterator for PrefixIter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // reversed so the smallest byte is popped first
            self.stack.extend(node.children.values().rev());

            if let Some((key, value)) = &node.entry {
                return Some((&**key, value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trie_basic() {
        let mut trie = Trie::new();
        assert!(trie.is_empty());

        trie.insert("hello", 1);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get("hello"), Some(&1));
        assert_eq!(trie.get("hell"), None);
        assert!(!trie.contains("world"));
    }

    #[test]
    fn test_trie_overwrite() {
        let mut trie = Trie::new();
        assert_eq!(trie.insert("key", 1), None);
        assert_eq!(trie.insert("key", 2), Some(1));
        assert_eq!(trie.get("key"), Some(&2));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_trie_remove() {
        let mut trie = Trie::new();
        trie.insert("hello", 1);
        trie.insert("help", 2);

        assert_eq!(trie.remove("hello"), Some(1));
        assert_eq!(trie.remove("hello"), None);
        assert_eq!(trie.remove("nonexistent"), None);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.keys().collect::<Vec<_>>(), vec!["help"]);
    }

    #[test]
    fn test_trie_remove_prunes_empty_branches() {
        let mut trie = Trie::new();
        trie.insert("hello", 1);
        trie.insert("help", 2);
        trie.insert("he", 3);

        trie.remove("hello");
        assert!(trie.node("hell").is_some_and(|n| n.children.len() == 1));
        assert!(trie.node("hello").is_none());

        // an entry on the path keeps its node
        trie.remove("help");
        assert!(trie.node("hel").is_none());
        assert_eq!(trie.get("he"), Some(&3));

        trie.remove("he");
        assert!(trie.root.children.is_empty());
        assert!(trie.is_empty());
    }

    #[test]
    fn test_trie_sorted_iteration() {
        let mut trie = Trie::new();
        for key in ["tested", "b", "test", "a", "testing", "ab"] {
            trie.insert(key, ());
        }

        let keys: Vec<_> = trie.keys().collect();
        assert_eq!(keys, vec!["a", "ab", "b", "test", "tested", "testing"]);

        let prefixed: Vec<_> = trie.prefix_iter("test").map(|(k, _)| k).collect();
        assert_eq!(prefixed, vec!["test", "tested", "testing"]);
        assert_eq!(trie.prefix_iter("xyz").count(), 0);
    }

    #[test]
    fn test_trie_get_mut() {
        let mut trie = Trie::new();
        trie.insert("key", 1);
        if let Some(v) = trie.get_mut("key") {
            *v = 42;
        }
        assert_eq!(trie.get("key"), Some(&42));
    }
}
