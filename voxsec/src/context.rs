use crate::config::{Config, Thresholds};
use crate::pool::SectionPools;
use spin::Once;

/// Shared state for building and finalizing sections: the selection thresholds and the
/// buffer pools. A context is shared between threads; the sections using it are not.
#[derive(Debug)]
pub struct Context {
	thresholds: Thresholds,
	pools: SectionPools
}

impl Context {
	pub fn new(config: &Config) -> Self {
		Context {
			thresholds: config.thresholds,
			pools: SectionPools::new(&config.pools)
		}
	}

	/// A process-wide context with the default configuration, built on first use.
	pub fn global() -> &'static Context {
		static GLOBAL: Once<Context> = Once::new();

		GLOBAL.call_once(Context::default)
	}

	pub fn thresholds(&self) -> &Thresholds {
		&self.thresholds
	}

	pub fn pools(&self) -> &SectionPools {
		&self.pools
	}
}

impl Default for Context {
	fn default() -> Self {
		Context::new(&Config::default())
	}
}
