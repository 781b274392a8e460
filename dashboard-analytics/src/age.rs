//! Decade histogram over raw per-age counts.

use dashboard_core::{AgeBin, AGE_BIN_COUNT};
use serde_json::Value;

use crate::series::coerce_number;

/// Buckets `{value, count}` rows into the fixed decade bins.
///
/// Rows whose age is not a finite number are skipped; a bad count counts as
/// zero. Unlike a plain `Number()` coercion, `null` and blank-string ages are
/// skipped instead of being read as age 0. Negative ages land in `0-9` and ages of 100 and above in the last
/// bin. All bins are returned, including empty ones.
pub fn bin_ages(rows: &Value) -> Vec<AgeBin> {
    let mut bins: Vec<AgeBin> = (0..AGE_BIN_COUNT)
        .map(|index| AgeBin {
            label: bin_label(index),
            count: 0.0,
        })
        .collect();

    let Some(rows) = rows.as_array() else {
        return bins;
    };

    for row in rows {
        let Some(age) = row.get("value").and_then(coerce_number) else {
            continue;
        };
        let count = row.get("count").and_then(coerce_number).unwrap_or(0.0);
        bins[bin_index(age)].count += count;
    }

    bins
}

/// Bin position for a finite age.
pub fn bin_index(age: f64) -> usize {
    let decade = (age / 10.0).floor();
    decade.clamp(0.0, (AGE_BIN_COUNT - 1) as f64) as usize
}

fn bin_label(index: usize) -> String {
    let start = index * 10;
    format!("{start}-{}", start + 9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counts(bins: &[AgeBin]) -> Vec<f64> {
        bins.iter().map(|bin| bin.count).collect()
    }

    #[test]
    fn empty_and_null_input_yield_zero_bins() {
        for input in [json!([]), Value::Null] {
            let bins = bin_ages(&input);
            assert_eq!(bins.len(), 11);
            assert!(bins.iter().all(|bin| bin.count == 0.0));
            assert_eq!(bins[0].label, "0-9");
            assert_eq!(bins[9].label, "90-99");
            assert_eq!(bins[10].label, "100-109");
        }
    }

    #[test]
    fn string_ages_and_negative_clamp() {
        let rows = json!([
            { "value": "25", "count": 5 },
            { "value": "-3", "count": 2 }
        ]);
        let bins = bin_ages(&rows);

        assert_eq!(bins[2].label, "20-29");
        assert_eq!(bins[2].count, 5.0);
        assert_eq!(bins[0].label, "0-9");
        assert_eq!(bins[0].count, 2.0);
    }

    #[test]
    fn old_ages_share_top_bin() {
        let rows = json!([
            { "value": 100, "count": 1 },
            { "value": 150, "count": 2 },
            { "value": 99.9, "count": 4 }
        ]);
        let bins = bin_ages(&rows);

        assert_eq!(bins[10].count, 3.0);
        assert_eq!(bins[9].count, 4.0);
    }

    #[test]
    fn invalid_ages_are_skipped_and_bad_counts_are_zero() {
        let rows = json!([
            { "value": "unknown", "count": 8 },
            { "count": 3 },
            { "value": 41, "count": "n/a" },
            { "value": 42, "count": 6 }
        ]);
        let bins = bin_ages(&rows);

        assert_eq!(bins[4].count, 6.0);
        assert_eq!(counts(&bins).iter().sum::<f64>(), 6.0);
    }

    #[test]
    fn null_and_blank_ages_are_not_age_zero() {
        let rows = json!([
            { "value": null, "count": 5 },
            { "value": "", "count": 2 },
            { "value": "  ", "count": 1 }
        ]);

        assert!(bin_ages(&rows).iter().all(|bin| bin.count == 0.0));
    }

    #[test]
    fn decade_boundaries() {
        assert_eq!(bin_index(0.0), 0);
        assert_eq!(bin_index(9.99), 0);
        assert_eq!(bin_index(10.0), 1);
        assert_eq!(bin_index(-0.5), 0);
        assert_eq!(bin_index(109.0), 10);
        assert_eq!(bin_index(1_000.0), 10);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Every valid row's count ends up in exactly one bin.
        #[test]
        fn bin_counts_are_conserved(
            rows in proptest::collection::vec((-50i32..250, 0u32..10_000), 0..60)
        ) {
            let payload = Value::Array(
                rows.iter()
                    .map(|(age, count)| json!({ "value": age, "count": count }))
                    .collect(),
            );

            let bins = bin_ages(&payload);
            let binned: u64 = bins.iter().map(|bin| bin.count as u64).sum();
            let expected: u64 = rows.iter().map(|(_, count)| u64::from(*count)).sum();

            prop_assert_eq!(bins.len(), 11);
            prop_assert_eq!(binned, expected);
        }

        /// Rows with unparseable ages never contribute.
        #[test]
        fn unparseable_ages_do_not_count(
            valid in proptest::collection::vec((0u32..120, 0u32..500), 0..20),
            junk in proptest::collection::vec(0u32..500, 0..20)
        ) {
            let mut payload: Vec<Value> = valid
                .iter()
                .map(|(age, count)| json!({ "value": age.to_string(), "count": count }))
                .collect();
            payload.extend(junk.iter().map(|count| json!({ "value": "n/a", "count": count })));

            let bins = bin_ages(&Value::Array(payload));
            let binned: u64 = bins.iter().map(|bin| bin.count as u64).sum();
            let expected: u64 = valid.iter().map(|(_, count)| u64::from(*count)).sum();

            prop_assert_eq!(binned, expected);
        }
    }
}
