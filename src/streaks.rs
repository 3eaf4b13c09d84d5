//! Longest win/loss streak detection over chronologically ordered trades.
//!
//! Single forward pass, O(n) time. At most one winning and one losing
//! streak is in progress at a time and they are mutually exclusive:
//! extending one discards the other. Input must already be ordered
//! ascending by timestamp; the audit store guarantees that ordering.

use crate::models::{StreakKind, StreakReport, TradeAudit, TradeOutcome, TradeStreak};

pub fn analyze(trades: &[TradeAudit]) -> StreakReport {
    let mut current_win: Option<TradeStreak> = None;
    let mut current_loss: Option<TradeStreak> = None;
    let mut longest_win: Option<TradeStreak> = None;
    let mut longest_loss: Option<TradeStreak> = None;

    for trade in trades {
        match trade.outcome {
            TradeOutcome::Win => {
                extend_or_start(&mut current_win, StreakKind::Win, trade);
                current_loss = None;
            }
            TradeOutcome::Loss => {
                extend_or_start(&mut current_loss, StreakKind::Loss, trade);
                current_win = None;
            }
            // A pending trade terminates both runs without starting one
            TradeOutcome::Pending => {
                current_win = None;
                current_loss = None;
            }
        }

        promote(&current_win, &mut longest_win);
        promote(&current_loss, &mut longest_loss);
    }

    StreakReport {
        longest_win,
        longest_loss,
    }
}

fn extend_or_start(current: &mut Option<TradeStreak>, kind: StreakKind, trade: &TradeAudit) {
    match current {
        Some(streak) => {
            streak.length += 1;
            streak.end_timestamp = trade.timestamp;
            streak.trades.push(trade.clone());
        }
        None => {
            *current = Some(TradeStreak {
                kind,
                length: 1,
                start_timestamp: trade.timestamp,
                end_timestamp: trade.timestamp,
                trades: vec![trade.clone()],
            });
        }
    }
}

/// Strict comparison: ties keep the earliest-found streak.
fn promote(current: &Option<TradeStreak>, longest: &mut Option<TradeStreak>) {
    if let Some(streak) = current {
        if longest.as_ref().map_or(true, |l| streak.length > l.length) {
            *longest = Some(streak.clone());
        }
    }
}
