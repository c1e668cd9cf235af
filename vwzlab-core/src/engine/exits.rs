//! Single-position exit evaluation.
//!
//! Priority is fixed: stop-loss, then take-profit, then the side's
//! force-exit signal. Only the first match fires. Stops and targets fill at
//! their own level; signal exits fill at the close.

use crate::conditions::directional_favors;
use crate::config::HoldPolicy;
use crate::domain::{ExitReason, Position};
use crate::snapshot::IndicatorSnapshot;

/// A decided exit: why, and at what price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitFill {
    pub reason: ExitReason,
    pub price: f64,
}

/// Decide whether `position` leaves the book on this bar.
///
/// Under [`HoldPolicy::WhileDirectionalFavors`] a take-profit or signal exit
/// is latched on the position instead of filled while the DI pair still
/// favours it, and released at the close of the first bar where it no
/// longer does. Stop-loss is never deferred.
pub fn evaluate_exit(
    position: &mut Position,
    snapshot: &IndicatorSnapshot,
    force_exit: bool,
    policy: HoldPolicy,
) -> Option<ExitFill> {
    let bar = &snapshot.bar;

    if position.stop_hit(bar) {
        if let Some(price) = position.stop_loss {
            return Some(ExitFill {
                reason: ExitReason::StopLoss,
                price,
            });
        }
    }

    let candidate = match position.take_profit {
        Some(price) if position.target_hit(bar) => Some(ExitFill {
            reason: ExitReason::TakeProfit,
            price,
        }),
        _ if force_exit => Some(ExitFill {
            reason: ExitReason::Signal,
            price: bar.close,
        }),
        _ => None,
    };

    match policy {
        HoldPolicy::Never => candidate,
        HoldPolicy::WhileDirectionalFavors => {
            let favors = directional_favors(snapshot, position.direction);
            match candidate {
                Some(fill) if favors => {
                    position.deferred_exit.get_or_insert(fill.reason);
                    None
                }
                Some(fill) => Some(fill),
                None if favors => None,
                None => position.deferred_exit.map(|reason| ExitFill {
                    reason,
                    price: bar.close,
                }),
            }
        }
    }
}
