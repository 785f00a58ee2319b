//! Quantile class breaks over a raster's value distribution.

use std::collections::BTreeMap;

use overlay_common::{is_data, Raster, NODATA};

/// Compute at most `num_breaks` strictly increasing break values that
/// partition the non-NoData histogram into approximately equal-count
/// classes. Ties collapse onto one break, so heavily repeated values
/// yield fewer breaks.
///
/// An all-NoData raster yields the single-element sentinel `[NODATA]`;
/// callers report that as a domain failure.
pub fn class_breaks(raster: &Raster, num_breaks: usize) -> Vec<i32> {
    let mut histogram: BTreeMap<i32, u64> = BTreeMap::new();
    for &v in &raster.cells {
        if is_data(v) {
            *histogram.entry(v).or_insert(0) += 1;
        }
    }
    quantile_breaks(&histogram, num_breaks)
}

/// Quantile breaks over a pre-built value histogram.
pub fn quantile_breaks(histogram: &BTreeMap<i32, u64>, num_breaks: usize) -> Vec<i32> {
    if histogram.is_empty() {
        return vec![NODATA];
    }
    let num_breaks = num_breaks.max(1);
    let total: u64 = histogram.values().sum();

    // The q-th break is the smallest value whose cumulative count reaches
    // ceil(total * q / n).
    let mut targets = (1..=num_breaks as u64).map(|q| (total * q).div_ceil(num_breaks as u64));
    let mut target = targets.next();

    let mut breaks = Vec::with_capacity(num_breaks);
    let mut cumulative = 0u64;

    'values: for (&value, &count) in histogram {
        cumulative += count;
        while let Some(t) = target {
            if cumulative < t {
                continue 'values;
            }
            if breaks.last() != Some(&value) {
                breaks.push(value);
            }
            target = targets.next();
        }
        break;
    }

    breaks
}
