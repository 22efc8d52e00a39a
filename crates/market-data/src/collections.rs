//! 삽입 순서를 보존하는 맵과 식별자 합집합 유틸리티.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// 최초 삽입 순서를 보존하는 맵.
///
/// 이미 존재하는 키에 다시 삽입하면 값만 교체되고 위치는 유지됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K, V>
where
    K: Eq + Hash,
{
    keys: Vec<K>,
    entries: HashMap<K, V>,
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// 값을 삽입하고 이전 값을 반환합니다.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if !self.entries.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 삽입 순서대로 키를 반환합니다.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }

    /// 삽입 순서대로 (키, 값)을 반환합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys
            .iter()
            .filter_map(move |k| self.entries.get(k).map(|v| (k, v)))
    }

    /// 처음 `n`개 항목만 남깁니다.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.keys.len() {
            return;
        }
        for key in self.keys.drain(n..) {
            self.entries.remove(&key);
        }
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        let mut entries = self.entries;
        self.keys
            .into_iter()
            .filter_map(|k| entries.remove(&k).map(|v| (k, v)))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V> Serialize for OrderedMap<K, V>
where
    K: Eq + Hash + Clone + Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
where
    K: Eq + Hash + Clone + Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = OrderedMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((k, v)) = access.next_entry()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Eq + Hash + Clone + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// 기존 식별자 뒤에 새 식별자를 이어 붙인 중복 없는 합집합.
///
/// 기존 식별자의 순서는 그대로 유지되고, 처음 등장하는 새 식별자만
/// 등장 순서대로 뒤에 추가됩니다.
pub fn union_ids<'a, K>(prior: &[K], incoming: impl IntoIterator<Item = &'a K>) -> Vec<K>
where
    K: Eq + Hash + Clone + 'a,
{
    let mut seen: HashSet<&K> = HashSet::with_capacity(prior.len());
    let mut ids = Vec::with_capacity(prior.len());

    for id in prior {
        if seen.insert(id) {
            ids.push(id.clone());
        }
    }
    for id in incoming {
        if seen.insert(id) {
            ids.push(id.clone());
        }
    }

    ids
}
