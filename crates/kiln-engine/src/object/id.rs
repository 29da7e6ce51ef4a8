use std::fmt;

/// Identity of a game object within a running engine.
///
/// Ids start at 1; the value 0 is reserved as the "nothing here" sentinel
/// written by the picking pass wherever no object was drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Pick-buffer value meaning "no object".
    pub const PICK_NONE: u32 = 0;

    /// Decodes a value read back from the pick target.
    #[inline]
    pub fn from_pick(raw: u32) -> Option<Self> {
        (raw != Self::PICK_NONE).then_some(Self(raw))
    }

    /// Value written into the pick target for this object.
    #[inline]
    pub fn to_pick(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out unique object ids.
///
/// One allocator is owned by the engine and shared by every scene it builds,
/// so ids are never reused across scene switches.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        // Wrapping back onto the sentinel would alias "no object".
        self.next = self.next.checked_add(1).unwrap_or_else(|| {
            log::error!("object id space exhausted; restarting at 1");
            1
        });
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_above_sentinel() {
        let mut ids = IdAllocator::new();
        let first = ids.allocate();
        assert_ne!(first.to_pick(), ObjectId::PICK_NONE);
        assert_eq!(first.get(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
    }

    #[test]
    fn sentinel_decodes_to_none() {
        assert_eq!(ObjectId::from_pick(0), None);
    }

    #[test]
    fn pick_value_decodes_to_same_object() {
        let mut ids = IdAllocator::new();
        let id = ids.allocate();
        assert_eq!(ObjectId::from_pick(id.to_pick()), Some(id));
    }
}
