use glam::Vec2;

use crate::{core::types::Rect, utils::allocator::ObjectId};

/// One cell of the spatial grid: an ordered set of object ids plus the
/// rectangle the cell covers.
#[derive(Debug, Clone)]
pub struct SpatialGridNode {
    id: usize,
    bounds: Rect,
    objects: Vec<ObjectId>,
    dirty: bool,
}

impl SpatialGridNode {
    pub fn new(id: usize, bounds: Rect) -> Self {
        Self {
            id,
            bounds,
            objects: Vec::new(),
            dirty: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Adds `object` unless it is already a member. Returns whether it was added.
    pub fn add_object(&mut self, object: ObjectId) -> bool {
        if self.objects.contains(&object) {
            return false;
        }
        self.objects.push(object);
        self.dirty = true;
        true
    }

    /// Removes `object` if present. Returns whether it was a member.
    pub fn remove_object(&mut self, object: ObjectId) -> bool {
        match self.objects.iter().position(|&o| o == object) {
            Some(index) => {
                self.objects.remove(index);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn has_object(&self, object: ObjectId) -> bool {
        self.objects.contains(&object)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.bounds.contains_point(point)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_a_set_and_marks_dirty() {
        let mut node = SpatialGridNode::new(0, Rect::new(0.0, 0.0, 10.0, 10.0));
        let id = ObjectId::from_index(3);

        assert!(node.add_object(id));
        assert!(!node.add_object(id));
        assert_eq!(node.len(), 1);
        assert!(node.is_dirty());

        node.clear_dirty();
        assert!(!node.remove_object(ObjectId::from_index(9)));
        assert!(!node.is_dirty());

        assert!(node.remove_object(id));
        assert!(node.is_dirty());
        assert!(node.is_empty());
    }

    #[test]
    fn contains_uses_cell_bounds() {
        let node = SpatialGridNode::new(4, Rect::new(10.0, 10.0, 10.0, 10.0));
        assert!(node.contains(Vec2::new(15.0, 10.0)));
        assert!(!node.contains(Vec2::new(20.0, 15.0)));

        let degenerate = SpatialGridNode::new(5, Rect::new(0.0, 0.0, 0.0, 0.0));
        assert!(!degenerate.contains(Vec2::ZERO));
    }
}
