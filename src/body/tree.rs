//! Limb containment tree
//!
//! A body owns an arena of limb records. Records link to their parent and
//! children by index; the root is the limb held by the body itself. Severing
//! a limb unlinks it (and everything hanging off it) from the tree but keeps
//! the record so the loose limb can still be addressed.

use serde::{Deserialize, Serialize};

use crate::body::part::{BodyPart, PartType};
use crate::core::types::EntityId;

/// Index of a limb inside its body's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LimbId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimbRecord {
    pub entity: EntityId,
    pub part: BodyPart,
    parent: Option<LimbId>,
    children: Vec<LimbId>,
    attached: bool,
}

impl LimbRecord {
    pub fn parent(&self) -> Option<LimbId> {
        self.parent
    }

    pub fn children(&self) -> &[LimbId] {
        &self.children
    }

    /// Still held by a parent limb or by the body as root
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyTree {
    limbs: Vec<LimbRecord>,
    root: Option<LimbId>,
}

impl BodyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Torso root with head, arms and legs hanging off it
    pub fn humanoid() -> Self {
        let mut tree = Self::new();
        let torso = tree.set_root(EntityId::new(), BodyPart::new(PartType::Torso));
        for part_type in [
            PartType::Head,
            PartType::LeftArm,
            PartType::RightArm,
            PartType::LeftLeg,
            PartType::RightLeg,
        ] {
            tree.attach(torso, EntityId::new(), BodyPart::new(part_type));
        }
        tree
    }

    /// Insert a limb as the body's root
    ///
    /// A previous root stays in the arena but is no longer attached.
    pub fn set_root(&mut self, entity: EntityId, part: BodyPart) -> LimbId {
        if let Some(old) = self.root.take() {
            if let Some(record) = self.limbs.get_mut(old.0) {
                record.attached = false;
            }
        }
        let id = self.push(entity, part, None);
        self.root = Some(id);
        id
    }

    /// Insert a limb under `parent`
    pub fn attach(&mut self, parent: LimbId, entity: EntityId, part: BodyPart) -> Option<LimbId> {
        self.limbs.get(parent.0)?;
        let id = self.push(entity, part, Some(parent));
        if let Some(record) = self.limbs.get_mut(parent.0) {
            record.children.push(id);
        }
        Some(id)
    }

    fn push(&mut self, entity: EntityId, part: BodyPart, parent: Option<LimbId>) -> LimbId {
        let id = LimbId(self.limbs.len());
        self.limbs.push(LimbRecord {
            entity,
            part,
            parent,
            children: Vec::new(),
            attached: true,
        });
        id
    }

    pub fn root(&self) -> Option<LimbId> {
        self.root
    }

    pub fn get(&self, id: LimbId) -> Option<&LimbRecord> {
        self.limbs.get(id.0)
    }

    pub fn get_mut(&mut self, id: LimbId) -> Option<&mut LimbRecord> {
        self.limbs.get_mut(id.0)
    }

    /// Arena index of the limb with this entity id
    pub fn find(&self, entity: EntityId) -> Option<LimbId> {
        self.limbs
            .iter()
            .position(|record| record.entity == entity)
            .map(LimbId)
    }

    /// `from` and all its descendants in pre-order
    pub fn traverse(&self, from: LimbId) -> Vec<LimbId> {
        let mut out = Vec::new();
        if self.limbs.get(from.0).is_none() {
            return out;
        }

        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(record) = self.limbs.get(id.0) {
                // Reverse so the first child is visited first
                stack.extend(record.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every limb still connected to the root
    pub fn attached_limbs(&self) -> Vec<LimbId> {
        self.root.map(|root| self.traverse(root)).unwrap_or_default()
    }

    /// Unlink a limb from whatever holds it
    ///
    /// Returns false if the limb is unknown or already loose.
    pub fn detach(&mut self, id: LimbId) -> bool {
        let Some(record) = self.limbs.get(id.0) else {
            return false;
        };
        if !record.attached {
            return false;
        }

        match record.parent {
            Some(parent) => {
                if let Some(parent_record) = self.limbs.get_mut(parent.0) {
                    parent_record.children.retain(|&child| child != id);
                }
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }

        if let Some(record) = self.limbs.get_mut(id.0) {
            record.parent = None;
            record.attached = false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LimbId, &LimbRecord)> {
        self.limbs.iter().enumerate().map(|(idx, record)| (LimbId(idx), record))
    }
}

/// Body component: the limb tree rooted at the body entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub tree: BodyTree,
    pub gibbed: bool,
}

impl Body {
    pub fn new(tree: BodyTree) -> Self {
        Self { tree, gibbed: false }
    }

    pub fn humanoid() -> Self {
        Self::new(BodyTree::humanoid())
    }

    /// Entity of the root limb, if one is held
    pub fn root_entity(&self) -> Option<EntityId> {
        let root = self.tree.root()?;
        self.tree.get(root).map(|record| record.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanoid_has_six_attached_limbs() {
        let tree = BodyTree::humanoid();
        let limbs = tree.attached_limbs();
        assert_eq!(limbs.len(), 6);
        // Root first
        assert_eq!(tree.get(limbs[0]).unwrap().part.part_type, PartType::Torso);
    }

    #[test]
    fn test_traverse_is_preorder() {
        let mut tree = BodyTree::new();
        let torso = tree.set_root(EntityId::new(), BodyPart::new(PartType::Torso));
        let arm = tree.attach(torso, EntityId::new(), BodyPart::new(PartType::LeftArm)).unwrap();
        let leg = tree.attach(torso, EntityId::new(), BodyPart::new(PartType::LeftLeg)).unwrap();
        let head = tree.attach(arm, EntityId::new(), BodyPart::new(PartType::Head)).unwrap();

        assert_eq!(tree.traverse(torso), vec![torso, arm, head, leg]);
    }

    #[test]
    fn test_detach_removes_subtree_from_root() {
        let mut tree = BodyTree::humanoid();
        let root = tree.root().unwrap();
        let arm = tree.get(root).unwrap().children()[1];

        assert!(tree.detach(arm));
        assert!(!tree.get(arm).unwrap().is_attached());
        assert_eq!(tree.attached_limbs().len(), 5);
        assert!(!tree.attached_limbs().contains(&arm));

        // Already loose
        assert!(!tree.detach(arm));
    }

    #[test]
    fn test_detach_root_clears_root() {
        let mut tree = BodyTree::humanoid();
        let root = tree.root().unwrap();
        assert!(tree.detach(root));
        assert!(tree.root().is_none());
        assert!(tree.attached_limbs().is_empty());
    }

    #[test]
    fn test_find_by_entity() {
        let mut tree = BodyTree::new();
        let entity = EntityId::new();
        let id = tree.set_root(entity, BodyPart::new(PartType::Torso));
        assert_eq!(tree.find(entity), Some(id));
        assert_eq!(tree.find(EntityId::new()), None);
    }
}
