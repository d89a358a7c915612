//! Fixed-width ASCII encoding of outbound report and sync frames.

use crate::core::{Error, PotholeReport, Result, TimeSyncFrame};
use crate::util::write_padded;

use super::{
    AREA_DIGITS, AREA_MAX_TENTHS, DEPTH_DIGITS, DEPTH_MAX_TENTHS, REPORT_FRAME_LEN,
    REPORT_SENTINEL, SEPARATOR, SYNC_FRAME_LEN, SYNC_SENTINEL, TERMINATOR, TIMESTAMP_DIGITS,
    TIMESTAMP_MODULUS, TIMESTAMP_OFFSET,
};

/// Encodes a pothole report as `$PH,tttttttttt,aaaaa,ddd#`.
///
/// The timestamp wraps modulo 10^10. Area and depth are rounded to tenths
/// and saturate at their field maximum. Negative, NaN or infinite
/// measurements are rejected with [`Error::InvalidField`].
pub fn encode_report(report: &PotholeReport) -> Result<[u8; REPORT_FRAME_LEN]> {
    let timestamp = report.timestamp_ms % TIMESTAMP_MODULUS;
    let area = tenths("area_sqin", report.area_sqin, AREA_MAX_TENTHS)?;
    let depth = tenths("depth_in", report.depth_in, DEPTH_MAX_TENTHS)?;

    let mut out = [0u8; REPORT_FRAME_LEN];
    out[..4].copy_from_slice(REPORT_SENTINEL);

    let ts_end = TIMESTAMP_OFFSET + TIMESTAMP_DIGITS;
    write_padded(&mut out[TIMESTAMP_OFFSET..ts_end], timestamp);
    out[ts_end] = SEPARATOR;

    let area_start = ts_end + 1;
    let area_end = area_start + AREA_DIGITS;
    write_padded(&mut out[area_start..area_end], area);
    out[area_end] = SEPARATOR;

    let depth_start = area_end + 1;
    let depth_end = depth_start + DEPTH_DIGITS;
    write_padded(&mut out[depth_start..depth_end], depth);
    out[depth_end] = TERMINATOR;

    debug_assert_eq!(depth_end + 1, REPORT_FRAME_LEN);
    Ok(out)
}

/// Encodes a sync frame as `@TS,tttttttttt#`.
///
/// Timestamps that need more than ten digits are rejected with
/// [`Error::FieldOverflow`] rather than truncated.
pub fn encode_time_sync(frame: &TimeSyncFrame) -> Result<[u8; SYNC_FRAME_LEN]> {
    if frame.timestamp_ms >= TIMESTAMP_MODULUS {
        return Err(Error::FieldOverflow {
            field: "timestamp_ms",
            value: frame.timestamp_ms,
            max: TIMESTAMP_MODULUS - 1,
        });
    }

    let mut out = [0u8; SYNC_FRAME_LEN];
    out[..4].copy_from_slice(SYNC_SENTINEL);
    write_padded(
        &mut out[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_DIGITS],
        frame.timestamp_ms,
    );
    out[SYNC_FRAME_LEN - 1] = TERMINATOR;
    Ok(out)
}

/// Rounds a measurement to tenths and saturates at `max`
fn tenths(field: &'static str, value: f32, max: u64) -> Result<u64> {
    // -0.0 passes: it compares equal to zero
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidField { field, value });
    }

    let scaled = (value * 10.0).round();
    if scaled >= max as f32 {
        Ok(max)
    } else {
        Ok(scaled as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn report_str(ts: u64, area: f32, depth: f32) -> String {
        let bytes = encode_report(&PotholeReport::new(ts, area, depth)).unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_reference_report() {
        assert_eq!(report_str(1234567890, 12.3, 1.7), "$PH,1234567890,00123,017#");
    }

    #[test]
    fn test_timestamp_wraps() {
        assert_eq!(&report_str(12_345_678_901, 0.0, 0.0)[4..14], "2345678901");
        assert_eq!(&report_str(u64::MAX, 0.0, 0.0)[4..14], "3709551615");
        assert_eq!(&report_str(TIMESTAMP_MODULUS, 0.0, 0.0)[4..14], "0000000000");
    }

    #[test]
    fn test_area_saturates() {
        // round(10000.0 * 10) = 100000, one past the field
        let s = report_str(0, 10_000.0, 0.0);
        assert_eq!(&s[15..20], "99999");
        assert_eq!(s.len(), REPORT_FRAME_LEN);

        assert_eq!(&report_str(0, 1.0e9, 0.0)[15..20], "99999");
        assert_eq!(&report_str(0, 9_999.9, 0.0)[15..20], "99999");
    }

    #[test]
    fn test_depth_saturates() {
        assert_eq!(&report_str(0, 0.0, 25.5)[21..24], "255");
        assert_eq!(&report_str(0, 0.0, 25.6)[21..24], "255");
        assert_eq!(&report_str(0, 0.0, 400.0)[21..24], "255");
        assert_eq!(&report_str(0, 0.0, 0.04)[21..24], "000");
        assert_eq!(&report_str(0, 0.0, 0.05)[21..24], "001");
    }

    #[test]
    fn test_rejects_bad_measurements() {
        for bad in [-0.1f32, -100.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = encode_report(&PotholeReport::new(0, bad, 1.0)).unwrap_err();
            assert!(matches!(err, Error::InvalidField { field: "area_sqin", .. }));

            let err = encode_report(&PotholeReport::new(0, 1.0, bad)).unwrap_err();
            assert!(matches!(err, Error::InvalidField { field: "depth_in", .. }));
        }

        assert_eq!(&report_str(0, -0.0, -0.0)[15..24], "00000,000");
    }

    #[test]
    fn test_random_reports_match_field_rules() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let ts: u64 = rng.gen();
            let area_tenths: u64 = rng.gen_range(0..150_000);
            let depth_tenths: u64 = rng.gen_range(0..400);

            let s = report_str(ts, area_tenths as f32 / 10.0, depth_tenths as f32 / 10.0);
            assert_eq!(s.len(), REPORT_FRAME_LEN);
            assert_eq!(s[4..14], format!("{:010}", ts % TIMESTAMP_MODULUS));
            assert_eq!(s[15..20], format!("{:05}", area_tenths.min(AREA_MAX_TENTHS)));
            assert_eq!(s[21..24], format!("{:03}", depth_tenths.min(DEPTH_MAX_TENTHS)));
        }
    }

    #[test]
    fn test_sync_frame() {
        let bytes = encode_time_sync(&TimeSyncFrame::new(1234)).unwrap();
        assert_eq!(&bytes, b"@TS,0000001234#");

        let bytes = encode_time_sync(&TimeSyncFrame::new(9_999_999_999)).unwrap();
        assert_eq!(&bytes, b"@TS,9999999999#");
    }

    #[test]
    fn test_sync_frame_rejects_eleven_digits() {
        let err = encode_time_sync(&TimeSyncFrame::new(TIMESTAMP_MODULUS)).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldOverflow {
                field: "timestamp_ms",
                value: TIMESTAMP_MODULUS,
                max: 9_999_999_999,
            }
        ));
    }
}
