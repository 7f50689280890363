//! Execution simulator — a per-order state machine over subsequent bars.
//!
//! Lifecycle: `Pending → Filled → {Stopped, Targeted, TimedOut}`.
//!
//! - A pending order fills at the next bar's open, adjusted adversely by
//!   the slippage model.
//! - From the bar after the fill onward, the stop and target levels are
//!   resolved against each bar's low/high. When both levels fall inside
//!   one bar's range the stop is assumed to trigger first. This is a
//!   stated policy (conservative bias), not an accident of iteration
//!   order.
//! - If neither level is touched within the maximum holding period, the
//!   position closes at that bar's close.
//!
//! Stop and timeout exits are market-style and pay slippage; target
//! exits are limit-style and fill at their level.

use chrono::{DateTime, Utc};

use crate::domain::{Bar, ContractSpec, ExitReason, Side, SizedOrder, Trade};
use crate::execution::fees::FeeModel;
use crate::execution::slippage::SlippageModel;

/// Non-terminal order states. Terminal states exist only as a `Trade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Filled,
}

/// A submitted order working its way through the market.
#[derive(Debug, Clone)]
pub struct OpenOrder {
    pub order: SizedOrder,
    status: OrderStatus,
    fill_ts: Option<DateTime<Utc>>,
    fill_price: f64,
    entry_slippage: f64,
    stop_price: f64,
    target_price: f64,
    bars_since_fill: usize,
}

impl OpenOrder {
    pub fn new(order: SizedOrder) -> Self {
        let candidate = &order.candidate.candidate;
        let stop_price = candidate.stop_price();
        let target_price = candidate.target_price();
        Self {
            order,
            status: OrderStatus::Pending,
            fill_ts: None,
            fill_price: 0.0,
            entry_slippage: 0.0,
            stop_price,
            target_price,
            bars_since_fill: 0,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    pub fn symbol(&self) -> &str {
        self.order.symbol()
    }

    fn side(&self) -> Side {
        self.order.candidate.candidate.side
    }
}

/// Advances open orders bar by bar, producing closed trades.
pub struct ExecutionSimulator {
    slippage: Box<dyn SlippageModel>,
    fees: FeeModel,
    max_holding_bars: usize,
}

impl ExecutionSimulator {
    pub fn new(slippage: Box<dyn SlippageModel>, fees: FeeModel, max_holding_bars: usize) -> Self {
        Self {
            slippage,
            fees,
            max_holding_bars,
        }
    }

    pub fn max_holding_bars(&self) -> usize {
        self.max_holding_bars
    }

    /// Advance one order through one bar.
    ///
    /// Returns the closed trade when the bar resolves the position; the
    /// caller drops the `OpenOrder` at that point, so a closed trade is
    /// never touched again.
    pub fn on_bar(&self, open: &mut OpenOrder, bar: &Bar, spec: &ContractSpec) -> Option<Trade> {
        match open.status {
            OrderStatus::Pending => {
                let slip = self.slippage.compute(spec, bar.open);
                let sign = open.side().sign();
                open.fill_price = bar.open + sign * slip;
                open.entry_slippage = slip;
                open.fill_ts = Some(bar.timestamp);
                open.status = OrderStatus::Filled;
                open.bars_since_fill = 0;
                None
            }
            OrderStatus::Filled => {
                open.bars_since_fill += 1;
                let sign = open.side().sign();

                // Stop first (conservative same-bar priority)
                let stop_touched = match open.side() {
                    Side::Long => bar.low <= open.stop_price,
                    Side::Short => bar.high >= open.stop_price,
                };
                if stop_touched {
                    let slip = self.slippage.compute(spec, open.stop_price);
                    let exit = open.stop_price - sign * slip;
                    return Some(self.close(open, bar, exit, slip, ExitReason::Stopped, spec));
                }

                let target_touched = match open.side() {
                    Side::Long => bar.high >= open.target_price,
                    Side::Short => bar.low <= open.target_price,
                };
                if target_touched {
                    return Some(self.close(
                        open,
                        bar,
                        open.target_price,
                        0.0,
                        ExitReason::Targeted,
                        spec,
                    ));
                }

                if open.bars_since_fill >= self.max_holding_bars {
                    let slip = self.slippage.compute(spec, bar.close);
                    let exit = bar.close - sign * slip;
                    return Some(self.close(open, bar, exit, slip, ExitReason::TimedOut, spec));
                }

                None
            }
        }
    }

    /// Close a filled position at the given bar's close (end of data).
    /// Pending orders have nothing to close; the caller discards them.
    pub fn force_close(&self, open: &mut OpenOrder, bar: &Bar, spec: &ContractSpec) -> Option<Trade> {
        if !open.is_filled() {
            return None;
        }
        let sign = open.side().sign();
        let slip = self.slippage.compute(spec, bar.close);
        let exit = bar.close - sign * slip;
        Some(self.close(open, bar, exit, slip, ExitReason::TimedOut, spec))
    }

    fn close(
        &self,
        open: &OpenOrder,
        bar: &Bar,
        exit_price: f64,
        exit_slippage: f64,
        exit_reason: ExitReason,
        spec: &ContractSpec,
    ) -> Trade {
        let order = &open.order;
        let quantity = order.quantity;
        let sign = open.side().sign();

        let gross_pnl =
            (exit_price - open.fill_price) * sign * spec.point_value * quantity as f64;
        let fees = self.fees.round_trip(quantity);
        let net_pnl = gross_pnl - fees;
        let slippage_cost =
            (open.entry_slippage + exit_slippage) * spec.point_value * quantity as f64;
        let r_multiple = if order.total_risk > 0.0 {
            net_pnl / order.total_risk
        } else {
            0.0
        };

        Trade {
            symbol: order.symbol().to_string(),
            side: open.side(),
            quantity,
            entry_ts: open.fill_ts.unwrap_or(bar.timestamp),
            entry_price: open.fill_price,
            exit_ts: bar.timestamp,
            exit_price,
            exit_reason,
            stop_price: open.stop_price,
            target_price: open.target_price,
            gross_pnl,
            fees,
            slippage: slippage_cost,
            net_pnl,
            r_multiple,
            bars_held: open.bars_since_fill,
        }
    }
}
