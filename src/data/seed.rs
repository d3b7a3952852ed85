//! Built-in datasets for offline fallback and static views
//!
//! The seed list is the last rung of the cache fallback ladder: it is served
//! (tagged not-live) only when a refresh fails and no snapshot has ever been
//! persisted. The recently-listed dataset backs the Performance tab, and the
//! ticker items feed the market strip.

use super::{IpoRecord, IpoStatus, IpoType, TickerItem, Trend};

fn record(
    id: &str,
    name: &str,
    kind: IpoType,
    status: IpoStatus,
    price_band: &str,
    gmp: i64,
    subscription: &str,
    lot_size: u32,
    sector: &str,
) -> IpoRecord {
    IpoRecord {
        id: id.to_string(),
        name: name.to_string(),
        sector: Some(sector.to_string()),
        kind,
        status,
        price_band: price_band.to_string(),
        lot_size,
        gmp,
        subscription: subscription.to_string(),
        issue_price: None,
        listing_price: None,
        current_price: None,
        returns: None,
        grounding_sources: None,
        is_live: false,
    }
}

/// Returns the static seed dataset served when no snapshot exists.
pub fn seed_ipos() -> Vec<IpoRecord> {
    vec![
        record(
            "1",
            "Shyam Dhani Industries",
            IpoType::Sme,
            IpoStatus::Open,
            "₹70",
            62,
            "45.2x",
            2000,
            "Logistics",
        ),
        record(
            "2",
            "Gujarat Kidney & Super Speciality",
            IpoType::Mainboard,
            IpoStatus::Open,
            "₹108 - ₹114",
            5,
            "1.2x",
            128,
            "Healthcare",
        ),
        record(
            "3",
            "Dhara Rail Projects",
            IpoType::Sme,
            IpoStatus::Upcoming,
            "₹120 - ₹126",
            15,
            "N/A",
            1000,
            "Infrastructure",
        ),
        record(
            "4",
            "ICICI Prudential AMC",
            IpoType::Mainboard,
            IpoStatus::Closed,
            "₹2165",
            450,
            "25.4x",
            7,
            "Finance",
        ),
    ]
}

/// Returns the static post-listing performance dataset for the
/// Performance tab. Returns percentages are producer-side values.
pub fn recently_listed() -> Vec<IpoRecord> {
    let mut records = vec![
        record(
            "listed-1",
            "Arrowhead Fintech",
            IpoType::Mainboard,
            IpoStatus::Listed,
            "₹315",
            0,
            "68.9x",
            47,
            "Finance",
        ),
        record(
            "listed-2",
            "Medha Precision Tools",
            IpoType::Sme,
            IpoStatus::Listed,
            "₹82",
            0,
            "112.4x",
            1600,
            "Manufacturing",
        ),
        record(
            "listed-3",
            "Bharat GreenVolt Energy",
            IpoType::Mainboard,
            IpoStatus::Listed,
            "₹450",
            0,
            "9.8x",
            33,
            "Energy",
        ),
        record(
            "listed-4",
            "Krystal Foods & Beverages",
            IpoType::Mainboard,
            IpoStatus::Listed,
            "₹210",
            0,
            "3.1x",
            70,
            "FMCG",
        ),
    ];

    let performance: [(f64, f64, f64, f64); 4] = [
        (315.0, 401.0, 378.0, 20.0),
        (82.0, 110.0, 96.0, 17.07),
        (450.0, 428.0, 505.0, 12.22),
        (210.0, 240.0, 198.0, -5.71),
    ];

    for (rec, (issue, listing, current, returns)) in records.iter_mut().zip(performance) {
        rec.issue_price = Some(issue);
        rec.listing_price = Some(listing);
        rec.current_price = Some(current);
        rec.returns = Some(returns);
    }

    records
}

/// Returns the static market ticker entries.
pub fn ticker_items() -> Vec<TickerItem> {
    vec![
        TickerItem {
            label: "NIFTY 50",
            value: "26,142.20",
            change: "-0.13%",
            trend: Trend::Down,
        },
        TickerItem {
            label: "SENSEX",
            value: "85,413.60",
            change: "-0.13%",
            trend: Trend::Down,
        },
        TickerItem {
            label: "GOLD",
            value: "₹75,200",
            change: "+0.45%",
            trend: Trend::Up,
        },
        TickerItem {
            label: "SILVER",
            value: "₹92,100",
            change: "+1.20%",
            trend: Trend::Up,
        },
        TickerItem {
            label: "USD/INR",
            value: "84.02",
            change: "+0.02%",
            trend: Trend::Up,
        },
    ]
}
