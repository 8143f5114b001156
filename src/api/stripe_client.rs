// src/api/stripe_client.rs
//
// Minimal client for the Stripe HTTP API (https://api.stripe.com).
// Authorization: Bearer <secret key>, form-encoded request bodies.

use serde::Deserialize;
use std::fmt;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug)]
pub enum StripeError {
    Http(reqwest::Error),
    Api { status: u16, body: String },
    InvalidResponse(String),
}

impl fmt::Display for StripeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripeError::Http(e) => write!(f, "http error: {e}"),
            StripeError::Api { status, body } => {
                write!(f, "stripe api error status={status} body={body}")
            }
            StripeError::InvalidResponse(e) => write!(f, "invalid response: {e}"),
        }
    }
}

impl From<reqwest::Error> for StripeError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

#[derive(Debug, Deserialize)]
pub struct Price {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: Option<String>, // paid | unpaid | no_payment_required
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, StripeError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(StripeError::Api {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str::<T>(&body)
        .map_err(|e| StripeError::InvalidResponse(format!("{e}; body={body}")))
}

/// Creates a monthly recurring USD price for the paid item.
pub async fn create_price(
    secret_key: &str,
    amount_usd: f64,
    product_name: &str,
) -> Result<Price, StripeError> {
    let client = reqwest::Client::new();
    let unit_amount = (amount_usd * 100.0).round() as i64;

    let params = [
        ("currency", "usd".to_string()),
        ("unit_amount", unit_amount.to_string()),
        ("recurring[interval]", "month".to_string()),
        ("product_data[name]", product_name.to_string()),
    ];

    let resp = client
        .post(format!("{STRIPE_API_BASE}/v1/prices"))
        .bearer_auth(secret_key)
        .form(&params)
        .send()
        .await?;

    parse_response(resp).await
}

/// Creates a checkout session for the price and returns its id and
/// payment url.
pub async fn create_checkout_session(
    secret_key: &str,
    price_id: &str,
    base_url: &str,
) -> Result<CheckoutSession, StripeError> {
    let client = reqwest::Client::new();

    let params = [
        ("line_items[0][price]", price_id.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        ("mode", "subscription".to_string()),
        ("success_url", format!("{base_url}/")),
        ("cancel_url", format!("{base_url}/")),
    ];

    let resp = client
        .post(format!("{STRIPE_API_BASE}/v1/checkout/sessions"))
        .bearer_auth(secret_key)
        .form(&params)
        .send()
        .await?;

    parse_response(resp).await
}

pub async fn retrieve_session(
    secret_key: &str,
    session_id: &str,
) -> Result<CheckoutSession, StripeError> {
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{STRIPE_API_BASE}/v1/checkout/sessions/{session_id}"))
        .bearer_auth(secret_key)
        .send()
        .await?;

    parse_response(resp).await
}
