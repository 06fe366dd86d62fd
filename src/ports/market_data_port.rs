//! Historical data access port trait.

use crate::domain::error::PapertraderError;
use crate::domain::market_data::SimulationWindow;
use crate::domain::ohlcv::OhlcvBar;

pub trait MarketDataPort {
    /// Bars for one ticker within the window, ordered by date.
    fn fetch_series(
        &self,
        ticker: &str,
        window: SimulationWindow,
    ) -> Result<Vec<OhlcvBar>, PapertraderError>;

    /// Tickers this source has data for.
    fn list_tickers(&self) -> Result<Vec<String>, PapertraderError>;
}
