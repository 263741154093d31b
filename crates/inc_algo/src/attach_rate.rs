//! crates/inc_algo/src/attach_rate.rs
//! Attach-rate record selection for a store and date.
//!
//! Among records whose inclusive window covers the date, the narrowest wins;
//! equal widths fall back to the latest `period_start`, then to source order.
//! No covering record is `None`, never a zero rate.

use chrono::NaiveDate;
use inc_core::entities::AttachRateRecord;
use inc_core::ids::StoreId;

pub fn lookup_attach_rate<'a>(
    records: &'a [AttachRateRecord],
    store_id: &StoreId,
    as_of: NaiveDate,
) -> Option<&'a AttachRateRecord> {
    let mut best: Option<&AttachRateRecord> = None;
    for r in records.iter().filter(|r| &r.store_id == store_id && r.covers(as_of)) {
        best = match best {
            None => Some(r),
            Some(b) => {
                let narrower = r.window_days() < b.window_days();
                let later = r.window_days() == b.window_days() && r.period_start > b.period_start;
                if narrower || later {
                    Some(r)
                } else {
                    Some(b)
                }
            }
        };
    }
    best
}
