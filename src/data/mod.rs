//! Core data models for the IPO terminal
//!
//! This module contains the data types used throughout the application for
//! representing IPO listings, their lifecycle status, provenance, and the
//! market ticker strip.

pub mod live;
pub mod seed;

pub use live::{FeedError, GeminiClient, LiveFeed, RetryPolicy};
pub use seed::{recently_listed, seed_ipos, ticker_items};

use serde::{Deserialize, Serialize};

/// Lifecycle status of an IPO listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpoStatus {
    /// Subscription window currently open
    Open,
    /// Announced but not yet open for subscription
    Upcoming,
    /// Subscription window closed, awaiting listing
    Closed,
    /// Trading on the exchange; post-listing fields are populated
    Listed,
}

/// Market segment the IPO belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpoType {
    /// NSE/BSE mainboard issue
    Mainboard,
    /// Small and medium enterprise platform issue
    #[serde(rename = "SME")]
    Sme,
}

impl IpoType {
    /// Returns a short display label for the segment.
    pub fn label(&self) -> &'static str {
        match self {
            IpoType::Mainboard => "Mainboard",
            IpoType::Sme => "SME",
        }
    }
}

/// A search-grounding citation attached to a live record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    /// Source page title
    pub title: String,
    /// Source URI
    pub uri: String,
}

/// One IPO listing as fetched from the live feed or served from cache
///
/// Serialized in camelCase to match the wire schema the live feed is
/// prompted to produce; the persisted snapshot uses the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpoRecord {
    /// Unique identifier within a snapshot; generated by the feed client
    /// when the producer omits one
    #[serde(default)]
    pub id: String,
    /// Company name
    pub name: String,
    /// Industry sector, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Mainboard or SME
    #[serde(rename = "type")]
    pub kind: IpoType,
    /// Lifecycle status
    pub status: IpoStatus,
    /// Free-form price band, e.g. "₹108 - ₹114" or a single value
    #[serde(default)]
    pub price_band: String,
    /// Shares per application lot
    #[serde(default)]
    pub lot_size: u32,
    /// Grey-market premium over issue price, in currency units
    #[serde(default)]
    pub gmp: i64,
    /// Free-form consolidated subscription figure, e.g. "45.2x" or "N/A"
    #[serde(default)]
    pub subscription: String,
    /// Issue price (Listed records only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_price: Option<f64>,
    /// Price at market debut (Listed records only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<f64>,
    /// Latest traded price (Listed records only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    /// Producer-computed return percentage since issue (Listed records only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<f64>,
    /// Search citations backing this record, when the feed provided them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
    /// True when produced by the most recent successful live fetch,
    /// false when served from a stale or offline fallback
    #[serde(default)]
    pub is_live: bool,
}

impl IpoRecord {
    /// Parses the free-form price band into (lower, upper) bounds.
    ///
    /// Accepts "₹108 - ₹114", "₹120 – ₹126", and single values like "₹70";
    /// currency symbols, commas, and whitespace are ignored. Returns (0, 0)
    /// when nothing numeric can be extracted.
    pub fn price_band_bounds(&self) -> (f64, f64) {
        let cleaned: String = self
            .price_band
            .chars()
            .filter(|c| !matches!(c, '₹' | ',' | ' '))
            .collect();

        let mut parts = cleaned
            .split(['-', '–'])
            .filter_map(|p| p.trim().parse::<f64>().ok());

        match (parts.next(), parts.next()) {
            (Some(lo), Some(hi)) => (lo, hi),
            (Some(single), None) => (single, single),
            _ => (0.0, 0.0),
        }
    }

    /// Estimated listing price: upper price band plus the grey-market premium.
    pub fn estimated_listing(&self) -> f64 {
        let (_, upper) = self.price_band_bounds();
        upper + self.gmp as f64
    }

    /// Expected listing gain implied by the GMP, as a percentage of the
    /// upper price band. Zero when the band is unknown.
    pub fn expected_gain_pct(&self) -> f64 {
        let (_, upper) = self.price_band_bounds();
        if upper > 0.0 {
            (self.gmp as f64 / upper) * 100.0
        } else {
            0.0
        }
    }
}

/// Direction of a ticker item's last move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

/// One entry in the market ticker strip
#[derive(Debug, Clone)]
pub struct TickerItem {
    /// Instrument label, e.g. "NIFTY 50"
    pub label: &'static str,
    /// Formatted current value
    pub value: &'static str,
    /// Formatted change, e.g. "+0.45%"
    pub change: &'static str,
    /// Direction of the change
    pub trend: Trend,
}
