// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing gate decisions and refresh outcomes.
#[derive(Debug, Default)]
pub struct GateMetrics {
	gates: AtomicU64,
	reuses: AtomicU64,
	refreshes: AtomicU64,
	failures: AtomicU64,
}
impl GateMetrics {
	/// Returns the total number of validity-gate evaluations.
	pub fn gates(&self) -> u64 {
		self.gates.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that reused the held token without refreshing.
	pub fn reuses(&self) -> u64 {
		self.reuses.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that installed a new token.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh attempts that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_gate(&self) {
		self.gates.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_reuse(&self) {
		self.reuses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
