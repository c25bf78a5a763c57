//! Collaborator capabilities consumed by the auction module.
//!
//! The module never owns balances itself. It moves funds through a [`Ledger`]
//! and checks parameter updates against an [`Authority`]. [`Bank`] is an
//! in-memory ledger used by the mock chain and by tests.

use auctions_types::{format_address, Address, Coins};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by a ledger implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient funds: {account} has {available}{denom}, needs {required}{denom}")]
    InsufficientFunds {
        account: String,
        denom: String,
        required: u128,
        available: u128,
    },

    #[error("balance overflow for {0}")]
    Overflow(String),
}

/// Account and balance bookkeeping.
///
/// Each call is all-or-nothing across every entry of `coins`: on error no
/// balance has changed.
pub trait Ledger {
    /// Spendable balance of `account` in `denom`.
    fn balance_of(&self, account: &Address, denom: &str) -> u128;

    /// Move `coins` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, coins: &Coins) -> Result<(), LedgerError>;

    /// Remove `coins` held by `holder` from circulation.
    fn dispose(&mut self, holder: &Address, coins: &Coins) -> Result<(), LedgerError>;
}

/// Permission check for parameter updates.
pub trait Authority {
    fn is_authorized(&self, caller: &Address) -> bool;
}

/// A single governance account.
impl Authority for Address {
    fn is_authorized(&self, caller: &Address) -> bool {
        self == caller
    }
}

/// In-memory ledger.
///
/// Cloning a `Bank` gives an independent branch; hosts run a message against
/// a clone and keep it only if the message succeeds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bank {
    balances: BTreeMap<(Address, String), u128>,
    supply: BTreeMap<String, u128>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new coins in `to`'s account.
    pub fn mint(&mut self, to: &Address, coins: &Coins) -> Result<(), LedgerError> {
        for (denom, amount) in coins.iter() {
            let balance = self.balance_of(to, denom);
            if balance.checked_add(amount).is_none()
                || self.supply_of(denom).checked_add(amount).is_none()
            {
                return Err(LedgerError::Overflow(denom.to_string()));
            }
        }
        for (denom, amount) in coins.iter() {
            *self.balances.entry((*to, denom.to_string())).or_default() += amount;
            *self.supply.entry(denom.to_string()).or_default() += amount;
        }
        Ok(())
    }

    /// Total amount of `denom` in circulation.
    pub fn supply_of(&self, denom: &str) -> u128 {
        self.supply.get(denom).copied().unwrap_or(0)
    }

    /// All non-zero balances of `account`.
    pub fn balances_of(&self, account: &Address) -> Coins {
        let entries = self
            .balances
            .iter()
            .filter(|((owner, _), amount)| owner == account && **amount > 0)
            .map(|((_, denom), amount)| auctions_types::Coin::new(denom.clone(), *amount));
        // Entries come from a map keyed by denom, so they are valid and unique.
        Coins::from_coins(entries).unwrap_or_default()
    }

    fn ensure_funds(&self, account: &Address, coins: &Coins) -> Result<(), LedgerError> {
        for (denom, amount) in coins.iter() {
            let available = self.balance_of(account, denom);
            if available < amount {
                return Err(LedgerError::InsufficientFunds {
                    account: format_address(account),
                    denom: denom.to_string(),
                    required: amount,
                    available,
                });
            }
        }
        Ok(())
    }

    fn debit(&mut self, account: &Address, denom: &str, amount: u128) {
        let key = (*account, denom.to_string());
        if let Some(balance) = self.balances.get_mut(&key) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(&key);
            }
        }
    }
}

impl Ledger for Bank {
    fn balance_of(&self, account: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(*account, denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, coins: &Coins) -> Result<(), LedgerError> {
        self.ensure_funds(from, coins)?;
        if from == to {
            return Ok(());
        }
        for (denom, amount) in coins.iter() {
            if self.balance_of(to, denom).checked_add(amount).is_none() {
                return Err(LedgerError::Overflow(denom.to_string()));
            }
        }
        for (denom, amount) in coins.iter() {
            self.debit(from, denom, amount);
            *self.balances.entry((*to, denom.to_string())).or_default() += amount;
        }
        Ok(())
    }

    fn dispose(&mut self, holder: &Address, coins: &Coins) -> Result<(), LedgerError> {
        self.ensure_funds(holder, coins)?;
        for (denom, amount) in coins.iter() {
            self.debit(holder, denom, amount);
            if let Some(supply) = self.supply.get_mut(denom) {
                *supply = supply.saturating_sub(amount);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auctions_types::Coin;

    fn coins(entries: &[(&str, u128)]) -> Coins {
        Coins::from_coins(entries.iter().map(|(d, a)| Coin::new(*d, *a))).unwrap()
    }

    #[test]
    fn test_mint_and_transfer() {
        let mut bank = Bank::new();
        let alice = [1u8; 32];
        let bob = [2u8; 32];

        bank.mint(&alice, &coins(&[("ubid", 100)])).unwrap();
        bank.transfer(&alice, &bob, &coins(&[("ubid", 40)]))
            .unwrap();

        assert_eq!(bank.balance_of(&alice, "ubid"), 60);
        assert_eq!(bank.balance_of(&bob, "ubid"), 40);
        assert_eq!(bank.supply_of("ubid"), 100);
    }

    #[test]
    fn test_transfer_is_all_or_nothing() {
        let mut bank = Bank::new();
        let alice = [1u8; 32];
        let bob = [2u8; 32];
        bank.mint(&alice, &coins(&[("uatom", 10), ("ubid", 5)]))
            .unwrap();
        let before = bank.clone();

        // uatom is covered but ubid is not
        let result = bank.transfer(&alice, &bob, &coins(&[("uatom", 10), ("ubid", 6)]));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { required: 6, available: 5, .. })
        ));
        assert_eq!(bank, before);
    }

    #[test]
    fn test_dispose_reduces_supply() {
        let mut bank = Bank::new();
        let holder = [9u8; 32];
        bank.mint(&holder, &coins(&[("ubid", 60)])).unwrap();
        bank.dispose(&holder, &coins(&[("ubid", 60)])).unwrap();

        assert_eq!(bank.balance_of(&holder, "ubid"), 0);
        assert_eq!(bank.supply_of("ubid"), 0);
        assert!(bank.balances_of(&holder).is_empty());
    }

    #[test]
    fn test_address_authority() {
        let gov = [5u8; 32];
        assert!(gov.is_authorized(&[5u8; 32]));
        assert!(!gov.is_authorized(&[6u8; 32]));
    }
}
