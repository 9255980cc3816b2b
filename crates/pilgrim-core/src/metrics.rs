//! Mock dashboard numbers for the admin view.
//!
//! Every snapshot is drawn fresh; nothing is stored. The random source is a
//! parameter of [`snapshot_with`] so callers can make it deterministic.

use num_format::{Locale, ToFormattedString};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
}

/// One randomized reading of the dashboard, serialized with the camelCase
/// field names the admin front end reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub live_crowd_count: String,
    pub crowd_change: String,
    pub crowd_change_type: ChangeType,
    pub bookings_today: String,
    pub bookings_change: String,
    pub bookings_change_type: ChangeType,
    pub incidents_today: String,
    pub incidents_change: String,
    pub incidents_change_type: ChangeType,
}

/// Source of dashboard snapshots.
pub trait MetricsProvider: Send + Sync {
    fn snapshot(&self) -> DashboardSnapshot;
}

/// [`MetricsProvider`] backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockMetrics;

impl MetricsProvider for MockMetrics {
    fn snapshot(&self) -> DashboardSnapshot {
        snapshot_with(&mut rand::thread_rng())
    }
}

/// Draws a snapshot from `rng`.
///
/// Incident change direction is always [`ChangeType::Increase`]; the other two
/// directions are a fair coin flip.
pub fn snapshot_with<R: Rng + ?Sized>(rng: &mut R) -> DashboardSnapshot {
    let crowd = 15_000 + rng.gen_range(0..1_000u32);
    let crowd_change = percent(rng, 10.0);
    let crowd_change_type = coin_flip(rng);

    let bookings = 800 + rng.gen_range(0..100u32);
    let bookings_change = percent(rng, 5.0);
    let bookings_change_type = coin_flip(rng);

    let incidents = 40 + rng.gen_range(0..15u32);
    let incidents_change = percent(rng, 15.0);

    DashboardSnapshot {
        live_crowd_count: format!("~{}", crowd.to_formatted_string(&Locale::en)),
        crowd_change,
        crowd_change_type,
        bookings_today: bookings.to_string(),
        bookings_change,
        bookings_change_type,
        incidents_today: incidents.to_string(),
        incidents_change,
        incidents_change_type: ChangeType::Increase,
    }
}

fn percent<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> String {
    format!("{:.1}%", rng.gen::<f64>() * scale)
}

fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> ChangeType {
    if rng.gen::<f64>() > 0.5 {
        ChangeType::Increase
    } else {
        ChangeType::Decrease
    }
}
