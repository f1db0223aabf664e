use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use configuration::MarketDataConfig;
use core_types::{PriceBar, PriceSeries};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;
use std::time::Duration;

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{ChartError, ChartResponse};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A symbol whose history could not be retrieved.
#[derive(Debug)]
pub struct FetchFailure {
    pub symbol: String,
    pub error: ApiError,
}

/// Result of one batch retrieval over the universe.
#[derive(Debug, Default)]
pub struct HistoryBatch {
    /// Successfully retrieved series, in request order.
    pub series: Vec<PriceSeries>,
    pub failures: Vec<FetchFailure>,
}

/// The abstract interface for a market data source.
/// This trait is the contract the screening run uses, allowing the
/// underlying implementation (live or in-memory) to be swapped out.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches daily history for every symbol.
    ///
    /// Individual symbol failures are reported in `HistoryBatch::failures`; the
    /// call itself fails only when nothing at all could be retrieved.
    async fn fetch_history(&self, symbols: &[String]) -> Result<HistoryBatch, ApiError>;
}

/// A concrete implementation of `MarketDataProvider` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
    range: String,
    interval: String,
    concurrency: usize,
}

impl YahooClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            range: config.range.clone(),
            interval: config.interval.clone(),
            concurrency: config.max_concurrent_requests.max(1),
        })
    }

    async fn fetch_one(&self, symbol: &str) -> Result<PriceSeries, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", self.range.as_str()),
                ("interval", self.interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // The API reports unknown symbols as a 404 with a JSON error body.
        let parsed = serde_json::from_str::<ChartResponse>(&text);
        match parsed {
            Ok(body) => parse_chart(symbol, body),
            Err(_) if !status.is_success() => Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(ApiError::Deserialization(e.to_string())),
        }
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_history(&self, symbols: &[String]) -> Result<HistoryBatch, ApiError> {
        tracing::info!(
            symbols = symbols.len(),
            range = %self.range,
            interval = %self.interval,
            "Downloading market data."
        );

        let results: Vec<(String, Result<PriceSeries, ApiError>)> =
            stream::iter(symbols.iter().cloned())
                .map(|symbol| async move {
                    let result = self.fetch_one(&symbol).await;
                    (symbol, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut batch = HistoryBatch::default();
        for (symbol, result) in results {
            match result {
                Ok(series) => batch.series.push(series),
                Err(error) => {
                    tracing::warn!(%symbol, %error, "Market data retrieval failed.");
                    batch.failures.push(FetchFailure { symbol, error });
                }
            }
        }

        if batch.series.is_empty() {
            return Err(ApiError::NoData {
                requested: symbols.len(),
            });
        }

        tracing::info!(
            retrieved = batch.series.len(),
            failed = batch.failures.len(),
            "Market data download finished."
        );
        Ok(batch)
    }
}

/// Converts a chart response into a validated series.
///
/// Bars with any missing field are dropped rather than filled. When two bars map to
/// the same trading date the later one wins.
pub fn parse_chart(symbol: &str, body: ChartResponse) -> Result<PriceSeries, ApiError> {
    if let Some(err) = body.chart.error {
        return Err(ApiError::ApiError(format!("{}: {}", err.code, err.description)));
    }
    let result = body
        .chart
        .result
        .and_then(|mut results| results.pop())
        .ok_or_else(|| ApiError::InvalidData(format!("empty chart result for {}", symbol)))?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    let mut dropped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |column: &[Option<f64>]| {
            column
                .get(i)
                .copied()
                .flatten()
                .and_then(Decimal::from_f64)
        };
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        ) else {
            dropped += 1;
            continue;
        };

        let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| {
                ApiError::InvalidData(format!("invalid timestamp {} for {}", ts, symbol))
            })?
            .date_naive();
        by_date.insert(
            date,
            PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            },
        );
    }

    if by_date.is_empty() {
        return Err(ApiError::InvalidData(format!("no complete bars for {}", symbol)));
    }
    if dropped > 0 {
        tracing::debug!(symbol, dropped, "Dropped incomplete bars.");
    }

    Ok(PriceSeries::new(symbol, by_date.into_values().collect())?)
}
