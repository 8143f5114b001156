// src/currency.rs
//
// Ruble to dollar conversion against the Central Bank of Russia daily
// rate feed (https://www.cbr.ru/scripts/XML_daily.asp).

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const CBR_DAILY_URL: &str = "https://www.cbr.ru/scripts/XML_daily.asp";

#[derive(Debug)]
pub enum CurrencyError {
    Http(reqwest::Error),
    RateUnavailable,
}

impl fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyError::Http(e) => write!(f, "rate feed http error: {e}"),
            CurrencyError::RateUnavailable => write!(f, "usd rate not found in rate feed"),
        }
    }
}

impl From<reqwest::Error> for CurrencyError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

fn usd_rate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // The feed is one <Valute> block per currency; the value uses a
        // comma decimal separator ("92,1234").
        Regex::new(r"(?s)<CharCode>USD</CharCode>.*?<Value>([0-9]+(?:,[0-9]+)?)</Value>")
            .expect("valid rate regex")
    })
}

/// Pulls the USD rate out of the CBR daily XML body.
pub fn extract_usd_rate(xml: &str) -> Option<f64> {
    let captures = usd_rate_re().captures(xml)?;
    captures.get(1)?.as_str().replace(',', ".").parse().ok()
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub async fn convert_rub_to_usd(amount_rub: f64) -> Result<f64, CurrencyError> {
    let body = reqwest::get(CBR_DAILY_URL).await?.text().await?;
    let rate = extract_usd_rate(&body).ok_or(CurrencyError::RateUnavailable)?;

    Ok(round_to_cents(amount_rub / rate))
}
