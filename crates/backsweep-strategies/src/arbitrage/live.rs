//! Live multi-venue price collector for the cross-venue arbitrage strategy.
//!
//! One bounded-concurrency HTTP GET per venue with a short timeout, silently
//! dropping venues that error out or fail to parse rather than failing the
//! whole snapshot. This is a pure data-source adapter: it is never invoked
//! from the deterministic backtest path, only from whatever live-mode
//! collector sits above the engine.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// The twelve venues the reference arbitrage simulator polls, paired with
/// their public ticker endpoints.
pub const VENUE_ENDPOINTS: [(&str, &str); 12] = [
    ("Bitfinex", "https://api-pub.bitfinex.com/v2/ticker/tBTCUSD"),
    ("Binance", "https://api.binance.com/api/v3/ticker/price?symbol=BTCUSDT"),
    ("Coinbase", "https://api.coinbase.com/v2/prices/BTC-USD/spot"),
    ("Kraken", "https://api.kraken.com/0/public/Ticker?pair=XBTUSD"),
    ("Huobi", "https://api.huobi.pro/market/detail/merged?symbol=btcusdt"),
    ("OKX", "https://www.okx.com/api/v5/market/ticker?instId=BTC-USDT"),
    ("KuCoin", "https://api.kucoin.com/api/v1/market/orderbook/level1?symbol=BTC-USDT"),
    ("Gate.io", "https://api.gateio.ws/api/v4/spot/tickers?currency_pair=BTC_USDT"),
    ("Bitstamp", "https://www.bitstamp.net/api/v2/ticker/btcusd/"),
    ("Gemini", "https://api.gemini.com/v1/pubticker/btcusd"),
    ("Poloniex", "https://api.poloniex.com/markets/BTC_USDT/price"),
    ("Crypto.com", "https://api.crypto.com/v2/public/get-ticker?instrument_name=BTC_USDT"),
];

/// Per-venue fetch failure. Never fatal to a snapshot: the collector absorbs
/// these and simply omits the venue from the returned map.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("request to {venue} timed out or failed: {source}")]
    Request {
        venue: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not parse a price out of {venue}'s response")]
    Parse { venue: String },
}

/// Produces `(venue, price)` pairs. Implemented by [`HttpPriceCollector`] for
/// live use and freely mockable in tests — the backtest path never depends
/// on this trait.
pub trait PriceCollector: Send + Sync {
    fn snapshot(&self) -> impl std::future::Future<Output = HashMap<String, f64>> + Send;
}

/// Concrete `reqwest`-backed collector: one GET per venue, bounded by a
/// shared timeout, run concurrently and joined with `futures_util::future::join_all`.
pub struct HttpPriceCollector {
    client: reqwest::Client,
    venues: Vec<(String, String)>,
}

impl HttpPriceCollector {
    /// Build a collector over the default twelve venues with a 3s timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(3))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction should not fail with static config");
        Self {
            client,
            venues: VENUE_ENDPOINTS
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
        }
    }

    async fn fetch_one(&self, venue: &str, url: &str) -> Result<f64, CollectorError> {
        let body: serde_json::Value = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CollectorError::Request {
                venue: venue.to_string(),
                source,
            })?
            .json()
            .await
            .map_err(|source| CollectorError::Request {
                venue: venue.to_string(),
                source,
            })?;
        parse_price(venue, &body).ok_or_else(|| CollectorError::Parse {
            venue: venue.to_string(),
        })
    }
}

impl Default for HttpPriceCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCollector for HttpPriceCollector {
    async fn snapshot(&self) -> HashMap<String, f64> {
        let fetches = self
            .venues
            .iter()
            .map(|(venue, url)| self.fetch_one(venue, url));
        let results = futures_util::future::join_all(fetches).await;

        let mut prices = HashMap::with_capacity(self.venues.len());
        for ((venue, _), result) in self.venues.iter().zip(results) {
            match result {
                Ok(price) => {
                    prices.insert(venue.clone(), price);
                }
                Err(err) => {
                    tracing::debug!(venue, error = %err, "price collector dropped venue");
                }
            }
        }
        prices
    }
}

/// Per-venue response parsing: each exchange's ticker endpoint shapes its
/// JSON differently, so there is one path per venue rather than a shared
/// deserializer.
fn parse_price(venue: &str, data: &serde_json::Value) -> Option<f64> {
    match venue {
        "Bitfinex" => data.get(6)?.as_f64(),
        "Binance" => data.get("price")?.as_str()?.parse().ok(),
        "Coinbase" => data.get("data")?.get("amount")?.as_str()?.parse().ok(),
        "Kraken" => data
            .get("result")?
            .get("XXBTZUSD")?
            .get("c")?
            .get(0)?
            .as_str()?
            .parse()
            .ok(),
        "Huobi" => data.get("tick")?.get("close")?.as_f64(),
        "OKX" => data.get("data")?.get(0)?.get("last")?.as_str()?.parse().ok(),
        "KuCoin" => data.get("data")?.get("price")?.as_str()?.parse().ok(),
        "Gate.io" => data.get(0)?.get("last")?.as_str()?.parse().ok(),
        "Bitstamp" => data.get("last")?.as_str()?.parse().ok(),
        "Gemini" => data.get("last")?.as_str()?.parse().ok(),
        "Poloniex" => data.get("price")?.as_str()?.parse().ok(),
        "Crypto.com" => data
            .get("result")?
            .get("data")?
            .get(0)?
            .get("a")?
            .as_str()?
            .parse()
            .ok(),
        _ => None,
    }
}
