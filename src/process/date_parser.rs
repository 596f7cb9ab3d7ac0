use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

/// Combine a source `DD/MM/YYYY` date and `HH.MM.SS` time into a UTC instant,
/// reading the wall-clock value at `offset`.
///
/// Missing or empty time components count as zero (`"18"` is 18:00:00).
pub fn combine_date_time(date: &str, time: &str, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let mut dmy = date.trim().split('/');
    let day: u32 = dmy.next()?.trim().parse().ok()?;
    let month: u32 = dmy.next()?.trim().parse().ok()?;
    let year: i32 = dmy.next()?.trim().parse().ok()?;
    if dmy.next().is_some() {
        return None;
    }

    let parts: Vec<&str> = time.trim().split('.').collect();
    if parts.len() > 3 {
        return None;
    }
    let mut hms = [0u32; 3];
    for (slot, part) in hms.iter_mut().zip(&parts) {
        let part = part.trim();
        if !part.is_empty() {
            *slot = part.parse().ok()?;
        }
    }

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hms[0], hms[1], hms[2])?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
