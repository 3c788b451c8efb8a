//! Time daemon drop-in for the GPS shared-memory refclock.

use std::fmt;

use crate::host::FileResource;

use super::GENERATED_BANNER;

/// Drop-in consumed by chrony's `confdir`.
pub const CHRONY_DROPIN_PATH: &str = "/etc/chrony/conf.d/gps.conf";

/// A shared-memory reference clock line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefClock {
    /// SHM segment number gpsd publishes to.
    pub segment: u8,
    /// Reference identifier shown by `chronyc sources`.
    pub refid: &'static str,
    /// Assumed precision, seconds.
    pub precision: f64,
    /// Fixed correction, seconds.
    pub offset: f64,
    /// Polling interval, log2 seconds.
    pub poll: i8,
    /// Assumed delay, seconds.
    pub delay: f64,
}

/// The GPS refclock. Constants, not derived from receiver characteristics.
pub const GPS_REFCLOCK: RefClock = RefClock {
    segment: 0,
    refid: "GPS",
    precision: 1e-1,
    offset: 0.0,
    poll: 3,
    delay: 0.2,
};

impl fmt::Display for RefClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "refclock SHM {} refid {} precision {:e} offset {:.1} poll {} delay {}",
            self.segment, self.refid, self.precision, self.offset, self.poll, self.delay
        )
    }
}

/// Render the chrony drop-in.
pub fn render_chrony_dropin() -> FileResource {
    FileResource::new(
        CHRONY_DROPIN_PATH,
        format!("{}\n{}\n", GENERATED_BANNER, GPS_REFCLOCK),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refclock_line_format() {
        assert_eq!(
            GPS_REFCLOCK.to_string(),
            "refclock SHM 0 refid GPS precision 1e-1 offset 0.0 poll 3 delay 0.2"
        );
    }

    #[test]
    fn dropin_has_banner_and_refclock() {
        let res = render_chrony_dropin();
        assert_eq!(res.path.to_str(), Some(CHRONY_DROPIN_PATH));
        let lines: Vec<_> = res.content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("refclock SHM 0"));
    }
}
