//! Reconciliation of duplicate observations by natural key.
//!
//! Every forecast layer generally reports some overlapping cities, and
//! a single vision read is noisy. Averaging all independent reads per
//! `(city, province, date, hour)` key is the pipeline's accuracy
//! mechanism — never last-write-wins, since extraction order carries
//! no ranking signal.

use std::collections::BTreeMap;

use sun_map_models::{InsolationRecord, NormalizedObservation, RecordKey};

/// Collapses observations into one record per natural key.
///
/// Each group's value is the arithmetic mean of its members, rounded
/// to two decimals; groups that average to exactly zero are dropped.
/// Grouping is order-independent, and reconciling an already
/// reconciled set returns the same values (idempotent).
#[must_use]
pub fn reconcile(observations: &[NormalizedObservation]) -> Vec<InsolationRecord> {
    let mut groups: BTreeMap<RecordKey, Vec<f64>> = BTreeMap::new();

    for obs in observations {
        let key = (
            obs.city.clone(),
            obs.province.clone(),
            obs.date,
            obs.hour,
        );
        groups.entry(key).or_default().push(obs.insolation_percentage);
    }

    groups
        .into_iter()
        .filter_map(|((city, province, date, hour), values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let rounded = (mean * 100.0).round() / 100.0;
            if rounded == 0.0 {
                return None;
            }
            Some(InsolationRecord {
                city,
                province,
                date,
                hour,
                insolation_percentage: rounded,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(city: &str, hour: u8, pct: f64) -> NormalizedObservation {
        NormalizedObservation {
            city: city.to_string(),
            province: "Mazowieckie".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            hour,
            insolation_percentage: pct,
        }
    }

    #[test]
    fn averages_duplicate_keys() {
        let records = reconcile(&[obs("Warszawa", 12, 40.0), obs("Warszawa", 12, 60.0)]);
        assert_eq!(records.len(), 1);
        assert!((records[0].insolation_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn is_commutative() {
        let a = obs("Warszawa", 12, 37.5);
        let b = obs("Warszawa", 12, 62.1);
        let c = obs("Radom", 9, 14.0);

        let forward = reconcile(&[a.clone(), b.clone(), c.clone()]);
        let backward = reconcile(&[c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn is_idempotent() {
        let once = reconcile(&[
            obs("Warszawa", 12, 40.0),
            obs("Warszawa", 12, 60.0),
            obs("Radom", 9, 33.33),
        ]);
        let again: Vec<NormalizedObservation> = once
            .iter()
            .map(|r| NormalizedObservation {
                city: r.city.clone(),
                province: r.province.clone(),
                date: r.date,
                hour: r.hour,
                insolation_percentage: r.insolation_percentage,
            })
            .collect();
        assert_eq!(reconcile(&again), once);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let records = reconcile(&[
            obs("Warszawa", 12, 33.0),
            obs("Warszawa", 12, 33.0),
            obs("Warszawa", 12, 34.0),
        ]);
        assert!((records[0].insolation_percentage - 33.33).abs() < f64::EPSILON);
    }

    #[test]
    fn drops_zero_valued_groups() {
        let records = reconcile(&[obs("Warszawa", 12, 0.0), obs("Radom", 12, 20.0)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Radom");
    }

    #[test]
    fn distinct_keys_stay_distinct() {
        let records = reconcile(&[
            obs("Warszawa", 11, 40.0),
            obs("Warszawa", 12, 40.0),
            obs("Radom", 12, 40.0),
        ]);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(reconcile(&[]).is_empty());
    }
}
