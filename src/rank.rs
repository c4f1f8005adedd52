use std::cmp::Ordering;

use crate::domain::InstrumentRecord;

/// Orders records by ascending total fee. Equal totals keep their input order.
pub fn rank_by_fee(records: &[InstrumentRecord]) -> Vec<InstrumentRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(compare_total_fee);
    ranked
}

fn compare_total_fee(a: &InstrumentRecord, b: &InstrumentRecord) -> Ordering {
    a.total_fee()
        .partial_cmp(&b.total_fee())
        .unwrap_or(Ordering::Equal)
}
