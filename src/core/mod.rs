/// Rule-based dashboard alerts
pub mod alerts;
/// Cost components, all-in total and surcharge
pub mod costs;
/// Dashboard payload and its text rendering
pub mod dashboard;
/// Partner directory interface and its database implementation
pub mod directory;
/// Counts, averages and grouped statistics over a tariff snapshot
pub mod kpi;
/// Validity periods (year plus months)
pub mod period;
/// Cheapest-quote lookup
pub mod quotes;
/// Filtered and grouped tariff reads
pub mod repository;
/// Best-effort directory role tagging
pub mod tag_sync;
/// Creating, updating, archiving and reading tariffs
pub mod tariff;
/// Monthly trend and period-over-period variation
pub mod trend;
/// Active/expired state derivation
pub mod validity;
