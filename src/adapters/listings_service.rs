use crate::common::error::{AppError, ServiceResult};
use crate::settings::AppSettings;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

fn make_url(endpoint: &str) -> String {
    let settings = AppSettings::get();
    format!("{}{endpoint}", settings.listings_service_base_url)
}

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub listing_id: i64,
    pub owner_id: Option<i64>,
    pub title: String,
    pub price: Decimal,
    pub status: String,
}

#[derive(Serialize)]
struct ListingLookupQuery {
    listing_id: i64,
}

pub async fn fetch_by_id(listing_id: i64) -> ServiceResult<Listing> {
    let url = make_url("/api/v1/listings/lookup");
    let response = CLIENT
        .get(url)
        .query(&ListingLookupQuery { listing_id })
        .send()
        .await?;
    match response.status() {
        StatusCode::NOT_FOUND => Err(AppError::ListingsNotFound),
        _ => Ok(response.json().await?),
    }
}
