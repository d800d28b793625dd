//! Circuit breaker for forced content cutting.
//!
//! Signature cutting over a whole payload is expensive and a format whose
//! cut output repeatedly yields nothing tends to keep yielding nothing.
//! One scan-wide slot remembers the most recent offender and its failure
//! streak; once the streak fills up, further cut attempts for that format
//! are refused until a different format takes the slot over. A success
//! parks a sentinel in the slot so the format stays welcome for the rest
//! of the run.

use std::sync::Mutex;

use texsift_core::FormatInfo;

use crate::util;

const MAX_STREAK: i32 = 4;
const PROVEN: i32 = -1;

pub(crate) struct BadFormats {
    slot: Mutex<Option<(FormatInfo, i32)>>,
}

impl BadFormats {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn should_attempt(&self, format: &FormatInfo) -> bool {
        match &*util::lock(&self.slot) {
            Some((held, streak)) if held == format => *streak < MAX_STREAK,
            _ => true,
        }
    }

    pub fn record_failure(&self, format: &FormatInfo) {
        let mut slot = util::lock(&self.slot);
        match &mut *slot {
            Some((held, streak)) if held == format => {
                if *streak != PROVEN {
                    *streak += 1;
                }
            }
            _ => *slot = Some((format.clone(), 1)),
        }
    }

    pub fn record_success(&self, format: &FormatInfo) {
        *util::lock(&self.slot) = Some((format.clone(), PROVEN));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(ext: &str) -> FormatInfo {
        FormatInfo::unknown(ext)
    }

    #[test]
    fn test_streak_of_failures_trips_the_breaker() {
        let breaker = BadFormats::new();
        let dat = fmt("dat");
        let mut attempts = 0;
        for _ in 0..6 {
            if breaker.should_attempt(&dat) {
                attempts += 1;
                breaker.record_failure(&dat);
            }
        }
        assert_eq!(attempts, 4);
    }

    #[test]
    fn test_different_format_takes_the_slot() {
        let breaker = BadFormats::new();
        let dat = fmt("dat");
        for _ in 0..4 {
            breaker.record_failure(&dat);
        }
        assert!(!breaker.should_attempt(&dat));

        let pak = fmt("pak");
        assert!(breaker.should_attempt(&pak));
        breaker.record_failure(&pak);
        // The slot moved on, so the old offender gets a fresh streak.
        assert!(breaker.should_attempt(&dat));
    }

    #[test]
    fn test_success_keeps_format_welcome() {
        let breaker = BadFormats::new();
        let dat = fmt("dat");
        breaker.record_success(&dat);
        for _ in 0..10 {
            assert!(breaker.should_attempt(&dat));
            breaker.record_failure(&dat);
        }
    }
}
