use serde::{Deserialize, Serialize};

/// Handle to a collidable object. The grid stores these instead of the objects
/// themselves, so a stale handle simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ObjectId {
    index: usize,
    generation: u32,
}

impl ObjectId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn from_index(index: u32) -> Self {
        Self::new(index as usize, 0)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == usize::MAX
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new(usize::MAX, 0)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Object storage for a collision world. Removing an object bumps its slot's
/// generation, so ids handed out before the removal stop resolving even after
/// the slot is reused.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    vacant: Vec<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> ObjectId {
        self.live += 1;
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.value = Some(value);
                ObjectId::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                ObjectId::new(self.slots.len() - 1, 0)
            }
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.slot(id)?.value.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.slot_mut(id)?.value.as_mut()
    }

    /// Borrows two distinct live objects mutably, in argument order.
    pub fn get2_mut(&mut self, a: ObjectId, b: ObjectId) -> Option<(&mut T, &mut T)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia.max(ib) >= self.slots.len() {
            return None;
        }

        let (low, high) = self.slots.split_at_mut(ia.max(ib));
        let (lower, upper) = (&mut low[ia.min(ib)], &mut high[0]);
        let (slot_a, slot_b) = if ia < ib { (lower, upper) } else { (upper, lower) };

        if slot_a.generation != a.generation() || slot_b.generation != b.generation() {
            return None;
        }
        Some((slot_a.value.as_mut()?, slot_b.value.as_mut()?))
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        let slot = self.slot_mut(id)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(id.index());
        self.live -= 1;
        Some(value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }

    #[cfg(feature = "parallel")]
    pub fn par_iter_mut(&mut self) -> impl rayon::iter::ParallelIterator<Item = &mut T> + '_
    where
        T: Send,
    {
        use rayon::prelude::*;
        self.slots.par_iter_mut().filter_map(|slot| slot.value.as_mut())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn slot(&self, id: ObjectId) -> Option<&Slot<T>> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
    }

    fn slot_mut(&mut self, id: ObjectId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
    }
}
