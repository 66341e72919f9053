//! Card and list ordering rules.
//!
//! Active cards of a list always hold positions `0..n` with no gaps or
//! duplicates; the same holds for the lists of a board. Every operation that
//! changes membership rebuilds the affected orderings through these helpers.

use opsboard_core::{BoardError, BoardResult};
use uuid::Uuid;

use crate::board::BoardId;
use crate::card::{BoardCard, CardId};
use crate::list::{BoardList, ListId};

/// Active cards of a list in display order. Ties on `position` (possible in
/// data written before positions were enforced) fall back to creation order.
pub fn ordered_cards(cards: &[BoardCard], list_id: ListId) -> Vec<&BoardCard> {
    let mut in_list: Vec<_> = cards
        .iter()
        .filter(|c| c.list_id == list_id && c.is_active())
        .collect();
    in_list.sort_by_key(|c| (c.position, c.created_at, c.id));
    in_list
}

pub fn ordered_card_ids(cards: &[BoardCard], list_id: ListId) -> Vec<CardId> {
    ordered_cards(cards, list_id).iter().map(|c| c.id).collect()
}

/// Append index for a list.
pub fn next_position_in_list(cards: &[BoardCard], list_id: ListId) -> i32 {
    cards
        .iter()
        .filter(|c| c.list_id == list_id && c.is_active())
        .count() as i32
}

/// Clamp a requested insertion index into `[0, len]`.
pub fn clamp_index(requested: i64, len: usize) -> usize {
    if requested <= 0 {
        0
    } else {
        (requested as u64).min(len as u64) as usize
    }
}

/// Write `order` into the cards: each listed card lands in `list_id` at its
/// index in `order`.
pub fn apply_card_order(cards: &mut [BoardCard], list_id: ListId, order: &[CardId]) {
    for (index, id) in order.iter().enumerate() {
        if let Some(card) = cards.iter_mut().find(|c| c.id == *id) {
            card.place(list_id, index as i32);
        }
    }
}

/// Renumber a list's active cards to `0..n`, keeping their current order.
pub fn compact_list_positions(cards: &mut [BoardCard], list_id: ListId) {
    let order = ordered_card_ids(cards, list_id);
    apply_card_order(cards, list_id, &order);
}

pub fn is_contiguous(cards: &[BoardCard], list_id: ListId) -> bool {
    ordered_cards(cards, list_id)
        .iter()
        .enumerate()
        .all(|(index, card)| card.position == index as i32)
}

/// Resolved effect of moving one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub card_id: CardId,
    pub source_list_id: ListId,
    pub target_list_id: ListId,
    pub from_index: usize,
    pub to_index: usize,
    /// Final order of the source list; empty when source and target coincide.
    pub source_order: Vec<CardId>,
    pub target_order: Vec<CardId>,
}

impl MovePlan {
    pub fn is_same_list(&self) -> bool {
        self.source_list_id == self.target_list_id
    }

    pub fn is_noop(&self) -> bool {
        self.is_same_list() && self.from_index == self.to_index
    }
}

/// Work out the final orderings for moving `card_id` to `requested_index` of
/// `target_list_id` without touching any card.
///
/// The caller is responsible for checking that the target list exists.
pub fn plan_card_move(
    cards: &[BoardCard],
    card_id: CardId,
    target_list_id: ListId,
    requested_index: i64,
) -> BoardResult<MovePlan> {
    let card = cards
        .iter()
        .find(|c| c.id == card_id)
        .ok_or_else(|| BoardError::not_found(format!("Card {}", card_id)))?;
    if !card.is_active() {
        return Err(BoardError::BusinessRule(
            "Archived cards cannot be moved; restore the card first".to_string(),
        ));
    }

    let source_list_id = card.list_id;
    let mut source: Vec<CardId> = ordered_card_ids(cards, source_list_id);
    let from_index = source
        .iter()
        .position(|id| *id == card_id)
        .ok_or_else(|| BoardError::Internal(format!("Card {} missing from its list", card_id)))?;
    source.remove(from_index);

    if source_list_id == target_list_id {
        let to_index = clamp_index(requested_index, source.len());
        source.insert(to_index, card_id);
        return Ok(MovePlan {
            card_id,
            source_list_id,
            target_list_id,
            from_index,
            to_index,
            source_order: Vec::new(),
            target_order: source,
        });
    }

    let mut target = ordered_card_ids(cards, target_list_id);
    let to_index = clamp_index(requested_index, target.len());
    target.insert(to_index, card_id);
    Ok(MovePlan {
        card_id,
        source_list_id,
        target_list_id,
        from_index,
        to_index,
        source_order: source,
        target_order: target,
    })
}

pub fn apply_move_plan(cards: &mut [BoardCard], plan: &MovePlan) {
    if !plan.is_same_list() {
        apply_card_order(cards, plan.source_list_id, &plan.source_order);
    }
    apply_card_order(cards, plan.target_list_id, &plan.target_order);
}

pub fn ordered_lists(lists: &[BoardList], board_id: BoardId) -> Vec<&BoardList> {
    let mut of_board: Vec<_> = lists.iter().filter(|l| l.board_id == board_id).collect();
    of_board.sort_by_key(|l| (l.position, l.created_at, l.id));
    of_board
}

pub fn next_list_position(lists: &[BoardList], board_id: BoardId) -> i32 {
    lists.iter().filter(|l| l.board_id == board_id).count() as i32
}

pub fn apply_list_order(lists: &mut [BoardList], order: &[Uuid]) {
    for (index, id) in order.iter().enumerate() {
        if let Some(list) = lists.iter_mut().find(|l| l.id == *id) {
            list.update_position(index as i32);
        }
    }
}

pub fn compact_board_lists(lists: &mut [BoardList], board_id: BoardId) {
    let order: Vec<ListId> = ordered_lists(lists, board_id).iter().map(|l| l.id).collect();
    apply_list_order(lists, &order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::UNPLACED_POSITION;

    fn list_with(cards: &mut Vec<BoardCard>, list_id: ListId, n: usize) -> Vec<CardId> {
        (0..n)
            .map(|i| {
                let mut card = BoardCard::new(Uuid::new_v4(), list_id, format!("card {i}"), None);
                card.position = i as i32;
                let id = card.id;
                cards.push(card);
                id
            })
            .collect()
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-3, 4), 0);
        assert_eq!(clamp_index(0, 4), 0);
        assert_eq!(clamp_index(2, 4), 2);
        assert_eq!(clamp_index(4, 4), 4);
        assert_eq!(clamp_index(99, 4), 4);
        assert_eq!(clamp_index(i64::MAX, 0), 0);
    }

    #[test]
    fn test_cross_list_move_reindexes_both_lists() {
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let mut cards = Vec::new();
        let s = list_with(&mut cards, source, 3);
        let t = list_with(&mut cards, target, 2);

        let plan = plan_card_move(&cards, s[1], target, 1).unwrap();
        assert_eq!(plan.from_index, 1);
        assert_eq!(plan.to_index, 1);
        apply_move_plan(&mut cards, &plan);

        assert_eq!(ordered_card_ids(&cards, source), vec![s[0], s[2]]);
        assert_eq!(ordered_card_ids(&cards, target), vec![t[0], s[1], t[1]]);
        assert!(is_contiguous(&cards, source));
        assert!(is_contiguous(&cards, target));
    }

    #[test]
    fn test_same_list_move_down_and_up() {
        let list = Uuid::new_v4();
        let mut cards = Vec::new();
        let ids = list_with(&mut cards, list, 4);

        let plan = plan_card_move(&cards, ids[0], list, 2).unwrap();
        apply_move_plan(&mut cards, &plan);
        assert_eq!(ordered_card_ids(&cards, list), vec![ids[1], ids[2], ids[0], ids[3]]);

        let plan = plan_card_move(&cards, ids[3], list, 0).unwrap();
        apply_move_plan(&mut cards, &plan);
        assert_eq!(ordered_card_ids(&cards, list), vec![ids[3], ids[1], ids[2], ids[0]]);
        assert!(is_contiguous(&cards, list));
    }

    #[test]
    fn test_index_past_end_appends() {
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let mut cards = Vec::new();
        let s = list_with(&mut cards, source, 1);
        let t = list_with(&mut cards, target, 2);

        let plan = plan_card_move(&cards, s[0], target, 500).unwrap();
        assert_eq!(plan.to_index, 2);
        apply_move_plan(&mut cards, &plan);
        assert_eq!(ordered_card_ids(&cards, target), vec![t[0], t[1], s[0]]);
        assert!(ordered_card_ids(&cards, source).is_empty());
    }

    #[test]
    fn test_move_into_empty_list() {
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let mut cards = Vec::new();
        let s = list_with(&mut cards, source, 2);

        let plan = plan_card_move(&cards, s[0], target, 3).unwrap();
        apply_move_plan(&mut cards, &plan);
        assert_eq!(ordered_card_ids(&cards, target), vec![s[0]]);
        assert_eq!(cards.iter().find(|c| c.id == s[1]).unwrap().position, 0);
    }

    #[test]
    fn test_noop_move_detected() {
        let list = Uuid::new_v4();
        let mut cards = Vec::new();
        let ids = list_with(&mut cards, list, 3);
        let plan = plan_card_move(&cards, ids[1], list, 1).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn test_unknown_and_archived_cards_rejected() {
        let list = Uuid::new_v4();
        let mut cards = Vec::new();
        let ids = list_with(&mut cards, list, 2);

        assert!(matches!(
            plan_card_move(&cards, Uuid::new_v4(), list, 0),
            Err(BoardError::NotFound(_))
        ));

        cards[0].archive();
        assert!(matches!(
            plan_card_move(&cards, ids[0], list, 0),
            Err(BoardError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_compact_repairs_gaps_and_duplicates() {
        let list = Uuid::new_v4();
        let mut cards = Vec::new();
        let ids = list_with(&mut cards, list, 4);
        cards[0].position = 7;
        cards[1].position = 3;
        cards[2].position = 3;
        cards[3].position = UNPLACED_POSITION;
        cards[3].archive();

        compact_list_positions(&mut cards, list);
        assert!(is_contiguous(&cards, list));
        assert_eq!(ordered_card_ids(&cards, list)[2], ids[0]);
        assert_eq!(cards[3].position, UNPLACED_POSITION);
    }

    #[test]
    fn test_list_reordering() {
        let board = Uuid::new_v4();
        let mut lists: Vec<BoardList> = (0..3)
            .map(|i| BoardList::new(Uuid::new_v4(), board, format!("L{i}"), i * 10))
            .collect();
        compact_board_lists(&mut lists, board);
        let positions: Vec<i32> = ordered_lists(&lists, board).iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(next_list_position(&lists, board), 3);
    }
}
