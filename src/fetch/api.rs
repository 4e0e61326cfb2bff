// src/fetch/api.rs
use crate::errors::ServerError;
use crate::fetch::models::{ApiCustomer, ApiOrder};
use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use reqwest::blocking::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OrderApiConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub seller_id: String,
}

pub struct OrderApi {
    client: Client,
    cfg: OrderApiConfig,
}

impl OrderApi {
    pub fn new(cfg: OrderApiConfig) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ServerError::Upstream(e.to_string()))?;

        Ok(Self { client, cfg })
    }

    /// All orders for one calendar day, with bounded retries. A terminal
    /// failure here is fatal for the whole run: no partial write happens
    /// downstream.
    pub fn fetch_orders_for_day(&self, day: NaiveDate) -> Result<Vec<ApiOrder>, ServerError> {
        const MAX_ATTEMPTS: u64 = 5;
        const MAX_BACKOFF_SECS: u64 = 10;
        const JITTER_MAX_SECS: u64 = 2;

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let start = std::time::Instant::now();

            match self.try_fetch_orders_for_day(day) {
                Ok(orders) => {
                    eprintln!(
                        "✅ Orders for {day} fetched on attempt {attempt} in {:?}",
                        start.elapsed()
                    );
                    return Ok(orders);
                }
                Err(e) => {
                    eprintln!(
                        "⚠️ Orders for {day}, attempt {attempt} failed in {:?}: {e}",
                        start.elapsed()
                    );
                    last_err = Some(e);

                    let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
                    std::thread::sleep(Duration::from_secs(base + jitter));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ServerError::Upstream("order fetch retry loop failed".into())))
    }

    fn try_fetch_orders_for_day(&self, day: NaiveDate) -> Result<Vec<ApiOrder>, ServerError> {
        let url = format!("{}/orders", self.cfg.base_url);
        let date = day.format("%Y-%m-%d").to_string();

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.cfg.username, Some(&self.cfg.password))
            .header("Accept", "application/json")
            .query(&[("data", date.as_str()), ("sellerid", &self.cfg.seller_id)])
            .send()
            .map_err(|e| ServerError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(ServerError::Upstream(format!(
                "orders endpoint HTTP {status}: {text}"
            )));
        }

        resp.json::<Vec<ApiOrder>>()
            .map_err(|e| ServerError::Upstream(format!("orders payload: {e}")))
    }

    /// Walk a date range day by day, handing each day's batch to `on_day`.
    pub fn fetch_orders_range<F>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        mut on_day: F,
    ) -> Result<(), ServerError>
    where
        F: FnMut(NaiveDate, Vec<ApiOrder>) -> Result<(), ServerError>,
    {
        let mut current = start;
        while current <= end {
            eprintln!("📡 Fetching orders for {current}");
            let orders = self.fetch_orders_for_day(current)?;
            on_day(current, orders)?;
            current += ChronoDuration::days(1);
        }
        Ok(())
    }

    /// One customer by id. A 404 is a lookup miss, not an error.
    pub fn fetch_customer(&self, customer_id: &str) -> Result<Option<ApiCustomer>, ServerError> {
        let url = format!("{}/customers/{}", self.cfg.base_url, customer_id);

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.cfg.username, Some(&self.cfg.password))
            .query(&[("sellerid", self.cfg.seller_id.as_str())])
            .send()
            .map_err(|e| ServerError::Upstream(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        let status = resp.status();
        if !status.is_success() {
            return Err(ServerError::Upstream(format!(
                "customer {customer_id}: HTTP {status}"
            )));
        }

        resp.json::<ApiCustomer>()
            .map(Some)
            .map_err(|e| ServerError::Upstream(format!("customer payload: {e}")))
    }
}
