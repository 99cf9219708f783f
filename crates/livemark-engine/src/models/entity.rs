use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of an entity in a document's entity table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub u64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Hyperlink,
    Image,
    Video,
    Audio,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Hyperlink => "hyperlink",
            EntityType::Image => "image",
            EntityType::Video => "video",
            EntityType::Audio => "audio",
        }
    }
}

/// How text edits inside an entity's run treat the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mutability {
    /// Chars may be added and removed freely; typed chars inside inherit it.
    Mutable,
    /// Deleting any char deletes the whole run; typing inside drops it.
    Immutable,
    /// Deleting a char deletes its whitespace-delimited segment.
    Segmented,
}

impl Mutability {
    pub fn as_str(self) -> &'static str {
        match self {
            Mutability::Mutable => "MUTABLE",
            Mutability::Immutable => "IMMUTABLE",
            Mutability::Segmented => "SEGMENTED",
        }
    }
}

/// Payload of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityData {
    Link {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Media {
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

impl EntityData {
    pub fn link(href: impl Into<String>) -> Self {
        EntityData::Link {
            href: href.into(),
            title: None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            EntityData::Link { title, .. } | EntityData::Media { title, .. } => title.as_deref(),
        }
    }
}

/// Out-of-band metadata referenced by key from block characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    entity_type: EntityType,
    mutability: Mutability,
    data: EntityData,
}

impl Entity {
    pub fn new(entity_type: EntityType, mutability: Mutability, data: EntityData) -> Self {
        Self {
            entity_type,
            mutability,
            data,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub(crate) fn set_data(&mut self, data: EntityData) {
        self.data = data;
    }
}

/// Arena of entities. Keys are never reused and entries are never removed,
/// so a key held by a block can only dangle if a seed was malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMap {
    entries: BTreeMap<EntityKey, Entity>,
    next: u64,
}

impl EntityMap {
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, entity: Entity) -> EntityKey {
        let key = EntityKey(self.next);
        self.next += 1;
        self.entries.insert(key, entity);
        key
    }

    /// Inserts under a caller-chosen key, as when loading a seed.
    pub(crate) fn insert_with_key(&mut self, key: EntityKey, entity: Entity) {
        self.next = self.next.max(key.0 + 1);
        self.entries.insert(key, entity);
    }

    pub(crate) fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entries.get_mut(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_allocated_monotonically() {
        let mut map = EntityMap::default();
        let link = Entity::new(
            EntityType::Hyperlink,
            Mutability::Mutable,
            EntityData::link("http://x.com"),
        );
        let a = map.insert(link.clone());
        let b = map.insert(link.clone());
        assert_eq!((a, b), (EntityKey(0), EntityKey(1)));

        map.insert_with_key(EntityKey(10), link.clone());
        assert_eq!(map.insert(link), EntityKey(11));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn link_data_serializes_without_missing_title() {
        let json = serde_json::to_string(&EntityData::link("http://x.com")).unwrap();
        assert_eq!(json, r#"{"href":"http://x.com"}"#);
    }

    #[test]
    fn untagged_data_picks_media_by_src() {
        let data: EntityData =
            serde_json::from_str(r#"{"src":"cat.png","alt":"cat"}"#).unwrap();
        assert_eq!(
            data,
            EntityData::Media {
                src: "cat.png".into(),
                alt: "cat".into(),
                title: None
            }
        );
    }
}
