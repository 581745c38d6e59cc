use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};

/// The nine hand classes, weakest to strongest. Discriminants give the
/// primary sort key at showdown.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// Evaluated strength: category plus tie-break ranks in descending
/// significance. Unused kicker slots stay zero, which compares below every
/// real rank.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    pub kickers: [u8; 5],
}

impl HandStrength {
    fn new(category: Category, kickers: [u8; 5]) -> Self {
        Self { category, kickers }
    }
}

/// Rank a 5, 6 or 7 card set.
///
/// Works from rank-count and suit groups over the whole set rather than
/// enumerating five-card subsets. Deterministic: the result depends only on
/// the multiset of cards.
///
/// # Panics
///
/// Panics on a slice outside 5..=7 cards; callers own the dealing counts.
pub fn evaluate_hand(cards: &[Card]) -> HandStrength {
    assert!(
        (5..=7).contains(&cards.len()),
        "hand evaluation takes 5 to 7 cards, got {}",
        cards.len()
    );

    let mut rank_counts = [0u8; 15]; // indices 2..=14
    let mut rank_mask: u16 = 0;
    let mut suit_masks = [0u16; 4];
    let mut suit_counts = [0u8; 4];
    for &c in cards {
        let r = c.rank as usize;
        rank_counts[r] += 1;
        rank_mask |= 1 << r;
        let s = suit_index(c.suit);
        suit_counts[s] += 1;
        suit_masks[s] |= 1 << r;
    }

    let flush_suit = (0..4).find(|&s| suit_counts[s] >= 5);

    if let Some(s) = flush_suit {
        if let Some(high) = straight_high(suit_masks[s]) {
            return HandStrength::new(Category::StraightFlush, [high, 0, 0, 0, 0]);
        }
    }

    // Rank groups ordered by (count desc, rank desc); drives everything
    // from quads down to high card.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    if groups[0].0 == 4 {
        let quad = groups[0].1;
        let kicker = top_ranks_excluding(&groups, &[quad], 1);
        return HandStrength::new(Category::FourOfAKind, [quad, kicker[0], 0, 0, 0]);
    }

    if groups[0].0 == 3 && groups.len() > 1 && groups[1].0 >= 2 {
        // Second trips fill the pair slot when present.
        return HandStrength::new(Category::FullHouse, [groups[0].1, groups[1].1, 0, 0, 0]);
    }

    if let Some(s) = flush_suit {
        let ranks = ranks_desc_from_mask(suit_masks[s]);
        let mut k = [0u8; 5];
        k.copy_from_slice(&ranks[..5]);
        return HandStrength::new(Category::Flush, k);
    }

    if let Some(high) = straight_high(rank_mask) {
        return HandStrength::new(Category::Straight, [high, 0, 0, 0, 0]);
    }

    match groups[0].0 {
        3 => {
            let trip = groups[0].1;
            let kickers = top_ranks_excluding(&groups, &[trip], 2);
            HandStrength::new(Category::ThreeOfAKind, [trip, kickers[0], kickers[1], 0, 0])
        }
        2 if groups.len() > 1 && groups[1].0 == 2 => {
            let high = groups[0].1;
            let low = groups[1].1;
            let kickers = top_ranks_excluding(&groups, &[high, low], 1);
            HandStrength::new(Category::TwoPair, [high, low, kickers[0], 0, 0])
        }
        2 => {
            let pair = groups[0].1;
            let kickers = top_ranks_excluding(&groups, &[pair], 3);
            HandStrength::new(Category::OnePair, [pair, kickers[0], kickers[1], kickers[2], 0])
        }
        _ => {
            let kickers = top_ranks_excluding(&groups, &[], 5);
            let mut k = [0u8; 5];
            k.copy_from_slice(&kickers[..5]);
            HandStrength::new(Category::HighCard, k)
        }
    }
}

/// Total order over evaluated hands: category first, then kickers
/// position by position. `Ordering::Equal` is a true chop.
pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

/// Highest straight top-rank in a rank bitmask, if any. The ace is mirrored
/// into the low slot so A-2-3-4-5 reads as a five-high straight.
fn straight_high(mask: u16) -> Option<u8> {
    let mut m = mask;
    if m & (1 << 14) != 0 {
        m |= 1 << 1;
    }
    for high in (5..=14u8).rev() {
        let window = 0b1_1111u16 << (high - 4);
        if m & window == window {
            return Some(high);
        }
    }
    None
}

fn ranks_desc_from_mask(mask: u16) -> Vec<u8> {
    (2..=14u8).rev().filter(|&r| mask & (1 << r) != 0).collect()
}

/// Highest `take` ranks not in `exclude`, padded with zeros. Ranks that
/// appear in pairs still count once as kickers; for hold'em group shapes
/// this only ever surfaces singles.
fn top_ranks_excluding(groups: &[(u8, u8)], exclude: &[u8], take: usize) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(take);
    let mut ranks: Vec<u8> = groups
        .iter()
        .map(|&(_, r)| r)
        .filter(|r| !exclude.contains(r))
        .collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    out.extend(ranks.into_iter().take(take));
    while out.len() < take {
        out.push(0);
    }
    out
}
