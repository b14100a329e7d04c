//! Specialized collection types
//!
//! [`RegistryList`] is the owning, insertion-ordered container behind the
//! window registry. Entries live in a slot map so their keys stay stable
//! across removals, while a separate key vector remembers the order in which
//! entries were appended.

pub use slotmap::{DefaultKey, Key, SlotMap};

/// Insertion-ordered registry of owned values addressed by stable keys
#[derive(Debug)]
pub struct RegistryList<K: Key, T> {
    items: SlotMap<K, T>,
    order: Vec<K>,
}

impl<K: Key, T> RegistryList<K, T> {
    /// Create an empty registry list
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Append a value at the tail and return its key
    pub fn append(&mut self, value: T) -> K {
        self.append_with_key(|_| value)
    }

    /// Append a value that needs to know its own key
    pub fn append_with_key(&mut self, f: impl FnOnce(K) -> T) -> K {
        let key = self.items.insert_with_key(f);
        self.order.push(key);
        key
    }

    /// Remove the first entry (in insertion order) matching `pred`
    ///
    /// Returns `None` and leaves the list untouched when nothing matches.
    pub fn remove_first(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let position = self.order.iter().position(|key| pred(&self.items[*key]))?;
        let key = self.order.remove(position);
        self.items.remove(key)
    }

    /// Find the first entry matching `pred`
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().map(|(_, value)| value).find(|value| pred(*value))
    }

    /// Find the key of the first entry matching `pred`
    pub fn find_key(&self, mut pred: impl FnMut(&T) -> bool) -> Option<K> {
        self.iter().find(|(_, value)| pred(*value)).map(|(key, _)| key)
    }

    /// Remove an entry by key
    pub fn remove(&mut self, key: K) -> Option<T> {
        let value = self.items.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(value)
    }

    /// Get an entry by key
    pub fn get(&self, key: K) -> Option<&T> {
        self.items.get(key)
    }

    /// Get a mutable reference to an entry by key
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    /// Whether `key` refers to a live entry
    pub fn contains_key(&self, key: K) -> bool {
        self.items.contains_key(key)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the list has no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.order.iter().map(move |key| (*key, &self.items[*key]))
    }

    /// Drain every entry tail-to-head, handing each one to `destructor` once
    pub fn free_all(&mut self, mut destructor: impl FnMut(K, T)) {
        while let Some(key) = self.order.pop() {
            if let Some(value) = self.items.remove(key) {
                destructor(key, value);
            }
        }
    }
}

impl<K: Key, T> Default for RegistryList<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u32]) -> (RegistryList<DefaultKey, u32>, Vec<DefaultKey>) {
        let mut list = RegistryList::new();
        let keys = values.iter().map(|v| list.append(*v)).collect();
        (list, keys)
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let (list, keys) = list_of(&[3, 1, 2]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.keys().collect::<Vec<_>>(), keys);
        let values: Vec<u32> = list.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_first_only_removes_one_match() {
        let (mut list, _) = list_of(&[7, 8, 7]);
        assert_eq!(list.remove_first(|v| *v == 7), Some(7));
        let values: Vec<u32> = list.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![8, 7]);
    }

    #[test]
    fn test_remove_first_without_match_is_noop() {
        let (mut list, _) = list_of(&[1, 2]);
        assert_eq!(list.remove_first(|v| *v == 42), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_find_and_find_key() {
        let (list, keys) = list_of(&[10, 20, 30]);
        assert_eq!(list.find(|v| *v > 15), Some(&20));
        assert_eq!(list.find_key(|v| *v == 30), Some(keys[2]));
        assert_eq!(list.find(|v| *v > 100), None);
    }

    #[test]
    fn test_removed_key_is_not_reused_as_live() {
        let (mut list, keys) = list_of(&[1]);
        assert_eq!(list.remove(keys[0]), Some(1));
        assert!(!list.contains_key(keys[0]));
        assert_eq!(list.remove(keys[0]), None);

        let fresh = list.append(2);
        assert_ne!(fresh, keys[0]);
        assert_eq!(list.get(keys[0]), None);
    }

    #[test]
    fn test_free_all_runs_tail_to_head_once_each() {
        let (mut list, keys) = list_of(&[1, 2, 3]);
        let mut freed = Vec::new();
        list.free_all(|key, value| freed.push((key, value)));

        assert_eq!(freed, vec![(keys[2], 3), (keys[1], 2), (keys[0], 1)]);
        assert!(list.is_empty());

        list.free_all(|_, _| panic!("destructor called on empty list"));
    }
}
