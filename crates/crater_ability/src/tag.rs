//! Gameplay tags and tag containers

use crater_core::NamedId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A dot-separated hierarchical tag such as `Combat.Ready`
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameplayTag(NamedId);

impl GameplayTag {
    /// Create a tag from its full name
    pub fn new(name: &str) -> Self {
        Self(NamedId::new(name))
    }

    /// Full tag name
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// True if this tag equals `other` or is a descendant of it.
    ///
    /// `Combat.Ready.Full` matches `Combat.Ready` and `Combat`, but not
    /// `Combat.Re`.
    pub fn matches_tag(&self, other: &GameplayTag) -> bool {
        let name = self.name();
        let parent = other.name();
        if name == parent {
            return true;
        }
        name.len() > parent.len()
            && name.starts_with(parent)
            && name.as_bytes()[parent.len()] == b'.'
    }

    /// Immediate parent, if any
    pub fn parent(&self) -> Option<GameplayTag> {
        self.name().rsplit_once('.').map(|(head, _)| Self::new(head))
    }
}

impl fmt::Debug for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.name())
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for GameplayTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An ordered set of gameplay tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagContainer {
    tags: BTreeSet<GameplayTag>,
}

impl TagContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from tag names
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().map(GameplayTag::new).collect()
    }

    /// Add a tag. Returns false if it was already present.
    pub fn add(&mut self, tag: GameplayTag) -> bool {
        self.tags.insert(tag)
    }

    /// Remove a tag. Returns false if it was not present.
    pub fn remove(&mut self, tag: &GameplayTag) -> bool {
        self.tags.remove(tag)
    }

    /// Add every tag of another container
    pub fn append(&mut self, other: &TagContainer) {
        self.tags.extend(other.tags.iter().cloned());
    }

    /// Remove all tags
    pub fn reset(&mut self) {
        self.tags.clear();
    }

    /// Hierarchical membership: some tag here matches `tag`
    pub fn has_tag(&self, tag: &GameplayTag) -> bool {
        self.tags.iter().any(|owned| owned.matches_tag(tag))
    }

    /// Exact membership
    pub fn has_tag_exact(&self, tag: &GameplayTag) -> bool {
        self.tags.contains(tag)
    }

    /// Every tag of `other` is matched here. True when `other` is empty.
    pub fn has_all(&self, other: &TagContainer) -> bool {
        other.tags.iter().all(|tag| self.has_tag(tag))
    }

    /// Any tag of `other` is matched here. False when `other` is empty.
    pub fn has_any(&self, other: &TagContainer) -> bool {
        other.tags.iter().any(|tag| self.has_tag(tag))
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate tags in order
    pub fn iter(&self) -> impl Iterator<Item = &GameplayTag> {
        self.tags.iter()
    }
}

impl FromIterator<GameplayTag> for TagContainer {
    fn from_iter<I: IntoIterator<Item = GameplayTag>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TagContainer {
    type Item = &'a GameplayTag;
    type IntoIter = std::collections::btree_set::Iter<'a, GameplayTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_hierarchy() {
        let full = GameplayTag::new("Combat.Ready.Full");

        assert!(full.matches_tag(&GameplayTag::new("Combat.Ready.Full")));
        assert!(full.matches_tag(&GameplayTag::new("Combat.Ready")));
        assert!(full.matches_tag(&GameplayTag::new("Combat")));
        assert!(!full.matches_tag(&GameplayTag::new("Combat.Re")));
        assert!(!GameplayTag::new("Combat").matches_tag(&full));
        assert_eq!(full.parent(), Some(GameplayTag::new("Combat.Ready")));
        assert_eq!(GameplayTag::new("Combat").parent(), None);
    }

    #[test]
    fn test_has_all_and_has_any() {
        let owner = TagContainer::from_names(["Combat.Ready", "State.Alive"]);

        assert!(owner.has_all(&TagContainer::new()));
        assert!(!owner.has_any(&TagContainer::new()));

        assert!(owner.has_all(&TagContainer::from_names(["Combat", "State.Alive"])));
        assert!(!owner.has_all(&TagContainer::from_names(["Combat", "State.Stunned"])));

        assert!(owner.has_any(&TagContainer::from_names(["State.Stunned", "State"])));
        assert!(!owner.has_any(&TagContainer::from_names(["State.Stunned"])));
    }

    #[test]
    fn test_container_mutation() {
        let mut tags = TagContainer::new();

        assert!(tags.add(GameplayTag::new("A")));
        assert!(!tags.add(GameplayTag::new("A")));
        tags.append(&TagContainer::from_names(["B", "C"]));
        assert_eq!(tags.len(), 3);

        assert!(tags.remove(&GameplayTag::new("B")));
        assert!(!tags.has_tag_exact(&GameplayTag::new("B")));

        tags.reset();
        assert!(tags.is_empty());
    }
}
