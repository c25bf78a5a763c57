//! Call message types for the auction module.

use auctions_types::{Coin, Coins, Params};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Call messages for the auction module.
///
/// The sender is not part of the message; the host supplies it through
/// [`CallContext`](crate::CallContext).
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionCall {
    /// Outbid the current highest bid of the open round.
    Bid { amount: Coin },

    /// Add revenue to the open round's pot (anyone).
    DepositCoin { amount: Coins },

    // === Admin ===
    /// Replace the module parameters (authority only).
    UpdateParams { params: Params },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_json_shape() {
        let call = AuctionCall::Bid {
            amount: Coin::new("ubid", 50),
        };
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["bid"]["amount"]["denom"], "ubid");
        assert_eq!(value["bid"]["amount"]["amount"], "50");
    }
}
