//! Broker capability interface.
//!
//! The engine depends only on this trait: submit an order, advance a
//! bar, collect closed trades. The simulator-backed `SimBroker` is the
//! paper implementation; a live adapter would satisfy the same surface.

use crate::domain::{Bar, ContractSpec, SizedOrder, Trade};
use crate::execution::simulator::{ExecutionSimulator, OpenOrder};

/// A position closed by the broker, with the risk that was reserved for
/// it at entry so the caller can release it.
#[derive(Debug, Clone)]
pub struct ClosedPosition {
    pub trade: Trade,
    pub reserved_risk: f64,
}

/// Order submission and fill reporting.
pub trait Broker: Send {
    /// Accept an order; it becomes eligible to fill on later bars only.
    fn submit(&mut self, order: SizedOrder);

    /// Advance every working order through this bar; report closes.
    fn on_bar(&mut self, bar: &Bar) -> Vec<ClosedPosition>;

    /// Open (filled) positions on a symbol.
    fn open_positions(&self, symbol: &str) -> usize;

    /// Orders submitted but not yet filled.
    fn pending_orders(&self) -> usize;

    /// Close every filled position at this bar's close and discard
    /// unfilled orders. Used at end of data.
    fn close_all(&mut self, bar: &Bar) -> Vec<ClosedPosition>;

    /// Name of this backend.
    fn name(&self) -> &str;
}

/// Paper broker: drives the execution simulator over in-memory orders.
pub struct SimBroker {
    simulator: ExecutionSimulator,
    spec: ContractSpec,
    working: Vec<OpenOrder>,
}

impl SimBroker {
    pub fn new(simulator: ExecutionSimulator, spec: ContractSpec) -> Self {
        Self {
            simulator,
            spec,
            working: Vec::new(),
        }
    }

    pub fn spec(&self) -> &ContractSpec {
        &self.spec
    }
}

impl Broker for SimBroker {
    fn submit(&mut self, order: SizedOrder) {
        self.working.push(OpenOrder::new(order));
    }

    fn on_bar(&mut self, bar: &Bar) -> Vec<ClosedPosition> {
        let mut closed = Vec::new();
        let mut still_working = Vec::with_capacity(self.working.len());

        for mut open in self.working.drain(..) {
            match self.simulator.on_bar(&mut open, bar, &self.spec) {
                Some(trade) => closed.push(ClosedPosition {
                    reserved_risk: open.order.total_risk,
                    trade,
                }),
                None => still_working.push(open),
            }
        }

        self.working = still_working;
        closed
    }

    fn open_positions(&self, symbol: &str) -> usize {
        self.working
            .iter()
            .filter(|o| o.is_filled() && o.symbol() == symbol)
            .count()
    }

    fn pending_orders(&self) -> usize {
        self.working.iter().filter(|o| !o.is_filled()).count()
    }

    fn close_all(&mut self, bar: &Bar) -> Vec<ClosedPosition> {
        let mut closed = Vec::new();
        for mut open in self.working.drain(..) {
            if let Some(trade) = self.simulator.force_close(&mut open, bar, &self.spec) {
                closed.push(ClosedPosition {
                    reserved_risk: open.order.total_risk,
                    trade,
                });
            }
        }
        closed
    }

    fn name(&self) -> &str {
        "SimBroker"
    }
}
