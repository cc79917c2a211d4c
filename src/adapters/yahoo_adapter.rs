//! Yahoo Finance chart API quote adapter.
//!
//! `GET {base_url}/{symbol}{suffix}?range={1d|20d}&interval=1d`. Rows with a
//! null open/high/low/close are dropped; a null volume keeps the bar with no
//! volume.

use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::config::ProviderConfig;
use crate::domain::error::QuotepollError;
use crate::domain::ohlcv::{OhlcvBar, Period};
use crate::ports::quote_port::QuotePort;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooQuoteAdapter {
    client: Client,
    config: ProviderConfig,
}

impl YahooQuoteAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self, QuotepollError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| QuotepollError::Provider {
                symbol: String::new(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}{}",
            self.config.base_url, symbol, self.config.symbol_suffix
        )
    }
}

impl QuotePort for YahooQuoteAdapter {
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, QuotepollError> {
        let provider_err = |reason: String| QuotepollError::Provider {
            symbol: symbol.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", period.as_range()), ("interval", "1d")])
            .send()
            .map_err(|e| provider_err(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| provider_err(e.to_string()))?;

        // Yahoo reports unknown symbols as 404 with a chart.error body.
        if !status.is_success() {
            let reason = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map(|err| format!("{}: {}", err.code, err.description))
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(provider_err(reason));
        }

        parse_chart_response(symbol, period, &body)
    }
}

/// Decode a chart API body into time-ordered bars.
///
/// A body with neither a result nor an error is `NoData`.
pub fn parse_chart_response(
    symbol: &str,
    period: Period,
    body: &str,
) -> Result<Vec<OhlcvBar>, QuotepollError> {
    let provider_err = |reason: String| QuotepollError::Provider {
        symbol: symbol.to_string(),
        reason,
    };

    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| provider_err(format!("malformed body: {e}")))?;

    if let Some(err) = response.chart.error {
        return Err(provider_err(format!("{}: {}", err.code, err.description)));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(QuotepollError::NoData {
            symbol: symbol.to_string(),
            period: period.to_string(),
        });
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let mut bars = Vec::with_capacity(result.timestamp.len());

    for (i, &epoch) in result.timestamp.iter().enumerate() {
        let column = |c: &Vec<Option<f64>>| c.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open),
            column(&quote.high),
            column(&quote.low),
            column(&quote.close),
        ) else {
            continue;
        };

        let Some(timestamp) = DateTime::from_timestamp(epoch, 0) else {
            return Err(provider_err(format!("invalid timestamp {epoch}")));
        };

        bars.push(OhlcvBar {
            symbol: symbol.to_string(),
            timestamp: timestamp.naive_utc(),
            open,
            high,
            low,
            close,
            volume: column(&quote.volume).map(|v| v.round() as i64),
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}
