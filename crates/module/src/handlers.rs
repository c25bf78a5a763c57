//! Call handlers for the auction module.
//!
//! These functions implement the business logic for each call type. Every
//! handler validates its input against the parameters and the open round
//! before touching the ledger, so a rejected call leaves no trace.

use crate::call::AuctionCall;
use crate::error::AuctionError;
use crate::events::AuctionEvent;
use crate::ledger::{Authority, Ledger};
use crate::state::AuctionState;
use auctions_types::{format_address, Address, Bid, Coin, Coins, Params};
use tracing::{debug, info};

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Height of the block the call is included in
    pub block_height: u64,
}

/// Everything a handler may read or mutate, passed in explicitly.
pub struct ModuleContext<'a, L: Ledger + ?Sized> {
    /// Parameter store and round state
    pub state: &'a mut AuctionState,
    /// Balance bookkeeping; the module only moves funds through this
    pub ledger: &'a mut L,
    /// Who may update parameters
    pub authority: &'a dyn Authority,
}

impl<'a, L: Ledger + ?Sized> ModuleContext<'a, L> {
    pub fn new(
        state: &'a mut AuctionState,
        ledger: &'a mut L,
        authority: &'a dyn Authority,
    ) -> Self {
        Self {
            state,
            ledger,
            authority,
        }
    }
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AuctionError>;

/// Route a call message to its handler.
pub fn dispatch<L: Ledger + ?Sized>(
    module: &mut ModuleContext<'_, L>,
    ctx: &CallContext,
    call: AuctionCall,
) -> HandlerResult<AuctionEvent> {
    match call {
        AuctionCall::Bid { amount } => handle_bid(module, ctx, amount),
        AuctionCall::DepositCoin { amount } => handle_deposit_coin(module, ctx, amount),
        AuctionCall::UpdateParams { params } => handle_update_params(module, ctx, params),
    }
}

/// Handle Bid call.
///
/// Locks `amount` in escrow and releases the superseded bid to its bidder in
/// the same call, so escrow only ever holds the current highest bid.
pub fn handle_bid<L: Ledger + ?Sized>(
    module: &mut ModuleContext<'_, L>,
    ctx: &CallContext,
    amount: Coin,
) -> HandlerResult<AuctionEvent> {
    let state = &mut *module.state;

    if !state.params.enabled {
        return Err(AuctionError::Disabled);
    }

    amount.validate()?;
    if amount.denom != state.bid_denom {
        return Err(AuctionError::InvalidAmount(format!(
            "bid must be in {}, got {}",
            state.bid_denom, amount.denom
        )));
    }

    if let Some(highest) = state.locked_bid() {
        if amount.amount <= highest.amount.amount {
            return Err(AuctionError::BidTooLow {
                highest: highest.amount.clone(),
            });
        }
    }

    let escrow = state.escrow_account;
    let new_lock = Coins::from(amount.clone());
    let previous = state.round.highest_bid.clone();

    // Fails with InsufficientFunds before anything has moved.
    module.ledger.transfer(&ctx.sender, &escrow, &new_lock)?;

    if let Some(prev) = &previous {
        let released = Coins::from(prev.amount.clone());
        if let Err(err) = module.ledger.transfer(&escrow, &prev.bidder, &released) {
            // Escrow holds the new lock, so returning it cannot run short.
            module.ledger.transfer(&escrow, &ctx.sender, &new_lock)?;
            return Err(err.into());
        }
        debug!(
            round = state.round.number,
            bidder = %format_address(&prev.bidder),
            amount = %prev.amount,
            "Refunded outbid bidder"
        );
    }

    state.round.highest_bid = Some(Bid {
        bidder: ctx.sender,
        amount: amount.clone(),
    });

    info!(
        round = state.round.number,
        bidder = %format_address(&ctx.sender),
        amount = %amount,
        "Bid accepted"
    );

    Ok(AuctionEvent::Bid {
        round: state.round.number,
        sender: ctx.sender,
        amount,
        refunded: previous,
    })
}

/// Handle DepositCoin call.
///
/// Anyone may deposit; the coins join the open round's pot.
pub fn handle_deposit_coin<L: Ledger + ?Sized>(
    module: &mut ModuleContext<'_, L>,
    ctx: &CallContext,
    amount: Coins,
) -> HandlerResult<AuctionEvent> {
    let state = &mut *module.state;

    if !state.params.enabled {
        return Err(AuctionError::Disabled);
    }

    if amount.is_empty() {
        return Err(AuctionError::InvalidAmount(
            "deposit must not be empty".into(),
        ));
    }
    // Decoded messages bypass `Coins::from_coins`, so check every entry again.
    for coin in amount.to_vec() {
        coin.validate()?;
    }
    if amount.contains_denom(&state.bid_denom) {
        return Err(AuctionError::InvalidAmount(format!(
            "cannot deposit the bid denomination {}",
            state.bid_denom
        )));
    }

    let mut pot = state.round.pot.clone();
    pot.add(&amount)?;

    module
        .ledger
        .transfer(&ctx.sender, &state.escrow_account, &amount)?;
    state.round.pot = pot;

    info!(
        round = state.round.number,
        depositor = %format_address(&ctx.sender),
        amount = %amount,
        "Deposit added to pot"
    );

    Ok(AuctionEvent::DepositCoin {
        round: state.round.number,
        sender: ctx.sender,
        amount,
    })
}

/// Handle UpdateParams call.
///
/// A new `round_duration` applies from the next round on; the open round
/// keeps its end height. Re-enabling a disabled module restarts the open
/// round's window at the current height.
pub fn handle_update_params<L: Ledger + ?Sized>(
    module: &mut ModuleContext<'_, L>,
    ctx: &CallContext,
    params: Params,
) -> HandlerResult<AuctionEvent> {
    if !module.authority.is_authorized(&ctx.sender) {
        return Err(AuctionError::Unauthorized(format_address(&ctx.sender)));
    }
    params.validate()?;

    let state = &mut *module.state;
    let was_enabled = state.params.enabled;
    state.params = params.clone();

    if !was_enabled && params.enabled {
        state.restart_round_window(ctx.block_height);
        info!(
            round = state.round.number,
            end_height = state.round.end_height,
            "Auctions re-enabled"
        );
    }

    info!(
        enabled = params.enabled,
        round_duration = params.round_duration,
        "Params updated"
    );

    Ok(AuctionEvent::UpdateParams { params })
}
