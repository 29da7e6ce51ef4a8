use super::{SortKey, SpriteCmd, ZIndex};

/// A single draw item: sort key + command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: SpriteCmd,
}

/// Recorded draw stream for one pass.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame allocation once warmed
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes a draw command with the given z-index.
    #[inline]
    pub fn push(&mut self, z: ZIndex, cmd: SpriteCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
        });

        self.sorted_dirty = true;
    }

    /// Iterates items in paint order (back-to-front) without cloning commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // Stable ordering is ensured by SortKey including insertion order.
        self.sorted_indices
            .sort_by(|&a, &b| self.items[a].key.cmp(&self.items[b].key));

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;

    fn quad(x: f32) -> SpriteCmd {
        SpriteCmd::solid(Rect::new(x, 0.0, 1.0, 1.0), Color::WHITE)
    }

    fn paint_order(list: &mut DrawList) -> Vec<f32> {
        list.iter_in_paint_order().map(|i| i.cmd.rect.origin.x).collect()
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn equal_z_keeps_insertion_order() {
        let mut list = DrawList::new();
        list.push(ZIndex(0), quad(1.0));
        list.push(ZIndex(0), quad(2.0));
        list.push(ZIndex(0), quad(3.0));
        assert_eq!(paint_order(&mut list), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn lower_z_paints_first() {
        let mut list = DrawList::new();
        list.push(ZIndex(5), quad(1.0));
        list.push(ZIndex(-1), quad(2.0));
        list.push(ZIndex(5), quad(3.0));
        list.push(ZIndex(0), quad(4.0));
        assert_eq!(paint_order(&mut list), vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn clear_resets_order() {
        let mut list = DrawList::new();
        list.push(ZIndex(0), quad(1.0));
        list.clear();
        list.push(ZIndex(0), quad(2.0));
        assert_eq!(list.items()[0].key.order, 0);
        assert_eq!(paint_order(&mut list), vec![2.0]);
    }

    // ── helpers ───────────────────────────────────────────────────────────

    #[test]
    fn empty_sprites_are_skipped() {
        let mut list = DrawList::new();
        list.push_sprite(ZIndex(0), SpriteCmd::solid(Rect::new(0.0, 0.0, 0.0, 4.0), Color::WHITE));
        assert!(list.is_empty());
    }

    #[test]
    fn outline_is_four_edges_inside_rect() {
        let mut list = DrawList::new();
        list.push_outline(ZIndex(0), Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, Color::BLACK);
        assert_eq!(list.len(), 4);
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        for item in list.items() {
            assert!(bounds.contains(item.cmd.rect.origin));
            assert!(item.cmd.object.is_none());
        }
    }
}
