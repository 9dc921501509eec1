//! Collateral allocation between fresh and unsettled balances

use serde::Serialize;

use crate::common::types::UnsettledCollateralAccount;

/// Two-part funding of a trade; `amount + unsettled_amount` is the trade size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollateralSplit {
    /// Drawn from the owner's spendable collateral balance
    pub amount: u64,
    /// Drawn from collateral owed but not yet settled
    pub unsettled_amount: u64,
}

impl CollateralSplit {
    pub fn total(&self) -> u64 {
        self.amount + self.unsettled_amount
    }
}

/// Collateral allocation utilities
///
/// Unsettled collateral is always spent before fresh collateral.
pub struct CollateralSplitter;

impl CollateralSplitter {
    /// Split `size` between fresh and unsettled collateral
    ///
    /// # Arguments
    /// * `size` - Trade size in collateral units
    /// * `account` - The owner's unsettled collateral account, if it exists
    pub fn split(size: u64, account: Option<&UnsettledCollateralAccount>) -> CollateralSplit {
        let pending = account.map(|a| a.pending_amount).unwrap_or(0);

        if pending == 0 {
            CollateralSplit {
                amount: size,
                unsettled_amount: 0,
            }
        } else if size >= pending {
            CollateralSplit {
                amount: size - pending,
                unsettled_amount: pending,
            }
        } else {
            CollateralSplit {
                amount: 0,
                unsettled_amount: size,
            }
        }
    }
}
