//! Render-time timestamp formatting.

use chrono::NaiveDateTime;

/// The "generated at" line printed under the map title.
///
/// Uses a 12-hour clock and the full month name, e.g.
/// "Map generated at 03:07 PM on September 06, 2024".
pub fn generated_at_line(now: NaiveDateTime) -> String {
    format!(
        "Map generated at {} on {}",
        now.format("%I:%M %p"),
        now.format("%B %d, %Y")
    )
}
