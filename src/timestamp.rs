use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike, Utc};

/// Source of the per-iteration timestamp. The harness calls it once per
/// iteration; tests swap in a fixed instant.
pub type Clock = fn() -> DateTime<Utc>;

pub fn system_clock() -> DateTime<Utc> {
    Utc::now()
}

/// strftime equivalent of the layout written by [`append_layout`].
pub const LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.9f %z %Z";

/// Longest line `append_layout` produces for four-digit years.
pub const LAYOUT_MAX_LEN: usize = "2006-01-02 15:04:05.000000000 -0700 -0700".len();

/// Appends `YYYY-MM-DD hh:mm:ss.nnnnnnnnn ±hhmm ZONE` to `buf`, digit by digit.
///
/// The zone is `UTC` for a zero offset and repeats the numeric offset
/// otherwise.
pub fn append_layout<Tz: TimeZone>(buf: &mut Vec<u8>, ts: &DateTime<Tz>) {
    let year = ts.year();
    if year < 0 {
        buf.push(b'-');
    }
    push_digits(buf, year.unsigned_abs(), 4);
    buf.push(b'-');
    push_digits(buf, ts.month(), 2);
    buf.push(b'-');
    push_digits(buf, ts.day(), 2);
    buf.push(b' ');

    // Leap seconds are carried as nanoseconds past 1e9.
    let (second, nanos) = match ts.nanosecond() {
        n if n >= 1_000_000_000 => (ts.second() + 1, n - 1_000_000_000),
        n => (ts.second(), n),
    };
    push_digits(buf, ts.hour(), 2);
    buf.push(b':');
    push_digits(buf, ts.minute(), 2);
    buf.push(b':');
    push_digits(buf, second, 2);
    buf.push(b'.');
    push_digits(buf, nanos, 9);
    buf.push(b' ');

    let offset = ts.offset().fix().local_minus_utc();
    push_offset(buf, offset);
    buf.push(b' ');
    if offset == 0 {
        buf.extend_from_slice(b"UTC");
    } else {
        push_offset(buf, offset);
    }
}

/// Allocating convenience around [`append_layout`].
pub fn format_layout<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
    let mut buf = Vec::with_capacity(LAYOUT_MAX_LEN);
    append_layout(&mut buf, ts);
    String::from_utf8_lossy(&buf).into_owned()
}

fn push_offset(buf: &mut Vec<u8>, offset_secs: i32) {
    buf.push(if offset_secs < 0 { b'-' } else { b'+' });
    let minutes = offset_secs.unsigned_abs() / 60;
    push_digits(buf, minutes / 60, 2);
    push_digits(buf, minutes % 60, 2);
}

/// Zero-padded decimal, at least `width` digits wide.
fn push_digits(buf: &mut Vec<u8>, mut value: u32, width: usize) {
    let mut digits = [b'0'; 10];
    let mut i = digits.len();
    while value > 0 {
        i -= 1;
        digits[i] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    let start = (digits.len() - width.min(digits.len())).min(i);
    buf.extend_from_slice(&digits[start..]);
}
