use serde::{Deserialize, Serialize};

use crate::seat::Seat;

/// One contribution layer of the pot. Seats listed in `eligible` are the
/// live seats that funded at least this layer's level; only they can win
/// it. Folded seats fund layers as dead money without eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u32,
    pub eligible: Vec<usize>,
}

/// Layer the hand's total commitments into pots, lowest level first.
///
/// One pot per distinct commitment level among contributors. A layer
/// whose eligible set is a single seat is an uncalled excess and flows
/// straight back to that seat at award time; a layer nobody live reaches
/// (possible only through dead money above every live commitment) folds
/// into the previous pot.
pub fn side_pots(seats: &[Seat]) -> Vec<SidePot> {
    let mut levels: Vec<u32> = seats
        .iter()
        .filter(|s| s.committed_total > 0 && s.is_live())
        .map(|s| s.committed_total)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<SidePot> = Vec::new();
    let mut prev = 0u32;
    for &level in &levels {
        let amount: u32 = seats
            .iter()
            .map(|s| s.committed_total.min(level).saturating_sub(s.committed_total.min(prev)))
            .sum();
        let eligible: Vec<usize> = seats
            .iter()
            .filter(|s| s.is_live() && s.committed_total >= level)
            .map(|s| s.index)
            .collect();
        if amount == 0 {
            prev = level;
            continue;
        }
        if eligible.is_empty() {
            if let Some(last) = pots.last_mut() {
                last.amount += amount;
            }
            prev = level;
            continue;
        }
        pots.push(SidePot { amount, eligible });
        prev = level;
    }

    // Dead money above the highest live level (a folder who out-committed
    // everyone still live) lands in the top pot.
    let total: u32 = seats.iter().map(|s| s.committed_total).sum();
    let potted: u32 = pots.iter().map(|p| p.amount).sum();
    if let Some(last) = pots.last_mut() {
        last.amount += total.saturating_sub(potted);
    }

    pots
}

/// Split one pot among its winners, odd chips to the earliest winner
/// clockwise from the button. Returns (seat, share) pairs.
pub fn split_award(
    amount: u32,
    winners: &[usize],
    button: usize,
    seat_count: usize,
) -> Vec<(usize, u32)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let share = amount / winners.len() as u32;
    let mut remainder = amount % winners.len() as u32;

    // Winners ordered by clockwise distance from the seat after the button.
    let mut ordered: Vec<usize> = winners.to_vec();
    ordered.sort_by_key(|&w| (w + seat_count - (button + 1) % seat_count) % seat_count);

    ordered
        .into_iter()
        .map(|seat| {
            let extra = if remainder > 0 {
                remainder -= 1;
                1
            } else {
                0
            };
            (seat, share + extra)
        })
        .collect()
}
