//! Usage notice email rendering.
//!
//! Every interpolated value is HTML-escaped. Timestamps follow the Thai locale:
//! day/month/Buddhist-era year, 24-hour time.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use crate::domain::ports::UsageNotice;

/// Offset between the Gregorian and Buddhist-era year.
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Rendered subject and HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    /// Plain-text subject line.
    pub subject: String,
    /// Escaped HTML body.
    pub html: String,
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render `at` as `d/m/yyyy HH:MM:SS` in `offset` with a Buddhist-era year.
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use coupon_board::outbound::email::format_thai_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2026, 2, 14, 12, 5, 9).single().expect("timestamp");
/// let bangkok = FixedOffset::east_opt(7 * 3600).expect("offset");
/// assert_eq!(format_thai_timestamp(at, bangkok), "14/2/2569 19:05:09");
/// ```
pub fn format_thai_timestamp(at: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = at.with_timezone(&offset);
    format!(
        "{day}/{month}/{year} {hour:02}:{minute:02}:{second:02}",
        day = local.day(),
        month = local.month(),
        year = local.year() + BUDDHIST_ERA_OFFSET,
        hour = local.hour(),
        minute = local.minute(),
        second = local.second(),
    )
}

/// Build the email announcing `notice`.
pub fn render_usage_email(notice: &UsageNotice, offset: FixedOffset) -> EmailContent {
    let coupon = &notice.coupon;
    let progress = coupon
        .usage_limit()
        .map(|limit| {
            format!(
                r#"<p style="text-align: center; font-weight: bold; color: #be123c;">ใช้ไปแล้ว {used} จาก {limit} ครั้ง</p>"#,
                used = notice.used_count,
                limit = limit.get(),
            )
        })
        .unwrap_or_default();

    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #be123c; text-align: center;">มีการใช้คูปองแล้ว!</h1>
  <div style="background-color: #ffe4e6; border-radius: 8px; padding: 20px; margin: 20px 0;">
    <div style="font-size: 48px; text-align: center; margin-bottom: 10px;">{icon}</div>
    <h2 style="color: #be123c; text-align: center; margin: 0 0 10px 0;">{title}</h2>
    <p style="text-align: center; color: #4b5563;">{description}</p>
    {progress}
    <p style="text-align: center; color: #4b5563; margin-top: 20px;">เวลาที่ใช้: {timestamp}</p>
  </div>
  <p style="text-align: center; color: #9ca3af;">อีเมลนี้ถูกส่งโดยอัตโนมัติจากเว็บไซต์ของขวัญครบรอบ 3 ปี</p>
</div>"#,
        icon = escape_html(coupon.icon()),
        title = escape_html(coupon.title()),
        description = escape_html(coupon.description()),
        timestamp = escape_html(&format_thai_timestamp(notice.redeemed_at, offset)),
    );

    EmailContent {
        subject: format!("คูปอง \"{}\" ถูกใช้งานแล้ว", coupon.title()),
        html,
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{Coupon, CouponId};

    #[fixture]
    fn bangkok() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).expect("offset")
    }

    fn notice(coupon: Coupon, used_count: u32) -> UsageNotice {
        UsageNotice {
            coupon,
            used_count,
            redeemed_at: Utc
                .with_ymd_and_hms(2025, 12, 31, 17, 30, 0)
                .single()
                .expect("timestamp"),
        }
    }

    fn coupon(raw: u32, title: &str) -> Coupon {
        Coupon::new(CouponId::new(raw).expect("id"), title, "desc", "🎁").expect("coupon")
    }

    #[rstest]
    fn timestamp_rolls_into_the_next_local_year(bangkok: FixedOffset) {
        let rendered = render_usage_email(&notice(coupon(1, "Gift"), 1), bangkok);

        assert!(rendered.html.contains("เวลาที่ใช้: 1/1/2569 00:30:00"));
    }

    #[rstest]
    fn limited_coupons_show_progress(bangkok: FixedOffset) {
        let limited = coupon(3, "Yes day").with_usage_limit(NonZeroU32::new(5).expect("limit"));

        let rendered = render_usage_email(&notice(limited, 2), bangkok);

        assert!(rendered.html.contains("ใช้ไปแล้ว 2 จาก 5 ครั้ง"));
    }

    #[rstest]
    fn single_use_coupons_omit_progress(bangkok: FixedOffset) {
        let rendered = render_usage_email(&notice(coupon(1, "Gift"), 1), bangkok);

        assert!(!rendered.html.contains("ใช้ไปแล้ว"));
    }

    #[rstest]
    fn subject_names_the_coupon(bangkok: FixedOffset) {
        let rendered = render_usage_email(&notice(coupon(2, "Hotel night"), 1), bangkok);

        assert_eq!(rendered.subject, "คูปอง \"Hotel night\" ถูกใช้งานแล้ว");
    }

    #[rstest]
    fn markup_in_coupon_text_is_escaped(bangkok: FixedOffset) {
        let rendered = render_usage_email(
            &notice(coupon(1, "<script>alert('x')</script> & co"), 1),
            bangkok,
        );

        assert!(!rendered.html.contains("<script>"));
        assert!(
            rendered
                .html
                .contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co")
        );
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a\"b", "a&quot;b")]
    #[case("<>&", "&lt;&gt;&amp;")]
    fn escape_html_replaces_significant_characters(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_html(raw), expected);
    }
}
