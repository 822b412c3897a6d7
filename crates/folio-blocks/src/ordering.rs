//! Sort-key allocation for sibling blocks.
//!
//! `order` values are sparse integers. A new position takes the midpoint
//! between its neighbours; only when no integer fits are the siblings
//! renumbered to `0, ORDER_STEP, 2 * ORDER_STEP, ...`.

use crate::block::{Block, BlockId, ordered};

/// Gap between consecutive order values after renumbering or appending.
pub const ORDER_STEP: i64 = 10;

/// Order value strictly between `prev` and `next`, if one exists.
fn order_between(prev: Option<i64>, next: Option<i64>) -> Option<i64> {
    match (prev, next) {
        (None, None) => Some(0),
        (Some(p), None) => p.checked_add(ORDER_STEP),
        (None, Some(n)) => n.checked_sub(ORDER_STEP),
        (Some(p), Some(n)) => {
            let gap = n.checked_sub(p)?;
            (gap >= 2).then(|| p + gap / 2)
        }
    }
}

/// Order value for inserting at `position` of the ordered siblings.
///
/// `exclude` names a block that is being moved and must not count as a
/// neighbour. Returns `None` when a sibling is unplaced or no integer fits.
fn slot_order(siblings: &[Block], position: usize, exclude: Option<BlockId>) -> Option<i64> {
    let sorted: Vec<&Block> = ordered(siblings)
        .into_iter()
        .filter(|b| Some(b.id) != exclude)
        .collect();
    let position = position.min(sorted.len());

    let prev = match position.checked_sub(1) {
        Some(idx) => Some(sorted[idx].order?),
        None => None,
    };
    let next = match sorted.get(position) {
        Some(block) => Some(block.order?),
        None => None,
    };

    order_between(prev, next)
}

/// Rewrite sibling orders to evenly spaced values, keeping their sequence.
fn renumber(siblings: &mut [Block], exclude: Option<BlockId>) {
    let sequence: Vec<BlockId> = ordered(siblings)
        .into_iter()
        .filter(|b| Some(b.id) != exclude)
        .map(|b| b.id)
        .collect();

    let mut next = 0_i64;
    for id in sequence {
        if let Some(block) = siblings.iter_mut().find(|b| b.id == id) {
            block.order = Some(next);
            next = next.saturating_add(ORDER_STEP);
        }
    }
    tracing::debug!(count = siblings.len(), "Renumbered sibling blocks");
}

/// Allocate an order value placing a block at `position` among `siblings`.
///
/// Existing siblings keep their values unless there is no room, in which
/// case they are renumbered first.
pub(crate) fn assign_order(
    siblings: &mut [Block],
    position: usize,
    exclude: Option<BlockId>,
) -> i64 {
    if let Some(order) = slot_order(siblings, position, exclude) {
        return order;
    }
    renumber(siblings, exclude);
    slot_order(siblings, position, exclude).unwrap_or(i64::MAX)
}

/// Order value appending after the current maximum.
pub(crate) fn append_order(siblings: &mut [Block]) -> i64 {
    let len = siblings.len();
    assign_order(siblings, len, None)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::block::{BlockType, Content};

    fn siblings(orders: &[Option<i64>]) -> Vec<Block> {
        orders
            .iter()
            .map(|&order| {
                let mut block = Block::new(BlockType::Text, Content::new());
                block.order = order;
                block
            })
            .collect()
    }

    fn orders(blocks: &[Block]) -> Vec<Option<i64>> {
        blocks.iter().map(|b| b.order).collect()
    }

    #[test]
    fn test_order_between() {
        assert_eq!(order_between(None, None), Some(0));
        assert_eq!(order_between(Some(20), None), Some(30));
        assert_eq!(order_between(None, Some(0)), Some(-10));
        assert_eq!(order_between(Some(0), Some(10)), Some(5));
        assert_eq!(order_between(Some(4), Some(5)), None);
        assert_eq!(order_between(Some(i64::MAX), None), None);
    }

    #[test]
    fn test_append_to_empty_is_zero() {
        let mut blocks = Vec::new();

        assert_eq!(append_order(&mut blocks), 0);
    }

    #[test]
    fn test_append_after_maximum() {
        let mut blocks = siblings(&[Some(40), Some(0), Some(20)]);

        assert_eq!(append_order(&mut blocks), 50);
        assert_eq!(orders(&blocks), vec![Some(40), Some(0), Some(20)]);
    }

    #[test]
    fn test_insert_between_neighbours() {
        let mut blocks = siblings(&[Some(0), Some(10)]);

        assert_eq!(assign_order(&mut blocks, 1, None), 5);
        assert_eq!(assign_order(&mut blocks, 0, None), -10);
    }

    #[test]
    fn test_collision_renumbers_siblings() {
        let mut blocks = siblings(&[Some(3), Some(4)]);

        let order = assign_order(&mut blocks, 1, None);

        assert_eq!(orders(&blocks), vec![Some(0), Some(10)]);
        assert_eq!(order, 5);
    }

    #[test]
    fn test_unplaced_sibling_triggers_renumber() {
        let mut blocks = siblings(&[Some(7), None]);

        let order = append_order(&mut blocks);

        assert_eq!(orders(&blocks), vec![Some(0), Some(10)]);
        assert_eq!(order, 20);
    }

    #[test]
    fn test_excluded_block_is_not_a_neighbour() {
        let mut blocks = siblings(&[Some(0), Some(10), Some(20)]);
        let moving = blocks[2].id;

        let order = assign_order(&mut blocks, 0, Some(moving));

        assert_eq!(order, -10);
    }
}
