//! Schedule window planning.
//!
//! Picks the window active at a given local time:
//! - Hour must fall in the window's `[start_hour, end_hour)`
//! - Weekday (0 = Sunday) must be in `days_of_week`
//! - Highest priority wins; among equals the earliest in the table wins

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::domain::ScheduleWindow;

/// Check whether a window is active at `now`
pub fn is_active(window: &ScheduleWindow, now: &NaiveDateTime) -> bool {
    let hour = now.hour() as u8;
    let weekday = now.weekday().num_days_from_sunday() as u8;
    window.contains_hour(hour) && window.days_of_week.contains(&weekday)
}

/// Return the highest-priority window active at `now`, if any.
pub fn active_window<'a>(now: &NaiveDateTime, windows: &'a [ScheduleWindow]) -> Option<&'a ScheduleWindow> {
    let mut best: Option<&ScheduleWindow> = None;

    for window in windows.iter().filter(|w| is_active(w, now)) {
        match best {
            Some(current) if window.priority <= current.priority => {}
            _ => best = Some(window),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{WindowPriority, default_windows};
    use chrono::NaiveDate;

    // 2026-03-04 is a Wednesday (weekday 3)
    fn wednesday_at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap().and_hms_opt(h, 30, 0).unwrap()
    }

    // 2026-03-08 is a Sunday (weekday 0)
    fn sunday_at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 8).unwrap().and_hms_opt(h, 30, 0).unwrap()
    }

    #[test]
    fn test_no_windows() {
        assert!(active_window(&wednesday_at(12), &[]).is_none());
    }

    #[test]
    fn test_outside_all_windows() {
        let windows = default_windows();
        assert!(active_window(&wednesday_at(9), &windows).is_none());
    }

    #[test]
    fn test_highest_priority_wins() {
        let windows = vec![
            ScheduleWindow::new("low", 8, 18, WindowPriority::Low),
            ScheduleWindow::new("high", 8, 18, WindowPriority::High),
            ScheduleWindow::new("normal", 8, 18, WindowPriority::Normal),
        ];
        let w = active_window(&wednesday_at(10), &windows).unwrap();
        assert_eq!(w.name, "high");
    }

    #[test]
    fn test_tie_first_match_wins() {
        let windows = vec![
            ScheduleWindow::new("first", 8, 18, WindowPriority::Normal),
            ScheduleWindow::new("second", 8, 18, WindowPriority::Normal),
        ];
        let w = active_window(&wednesday_at(10), &windows).unwrap();
        assert_eq!(w.name, "first");
    }

    #[test]
    fn test_end_hour_exclusive() {
        let windows = vec![ScheduleWindow::new("lunch", 12, 14, WindowPriority::Normal)];
        assert!(active_window(&wednesday_at(13), &windows).is_some());
        assert!(active_window(&wednesday_at(14), &windows).is_none());
    }

    #[test]
    fn test_weekday_filter() {
        let windows = default_windows();
        // Lunch Break is weekdays only
        assert_eq!(active_window(&wednesday_at(12), &windows).unwrap().name, "Lunch Break");
        assert!(active_window(&sunday_at(12), &windows).is_none());
    }

    #[test]
    fn test_reversed_window_never_active() {
        let windows = vec![ScheduleWindow::new("late", 22, 3, WindowPriority::High)];
        assert!(active_window(&wednesday_at(23), &windows).is_none());
        assert!(active_window(&wednesday_at(1), &windows).is_none());
    }

    #[test]
    fn test_late_night_as_two_windows() {
        let windows = vec![
            ScheduleWindow::new("late", 22, 23, WindowPriority::High),
            ScheduleWindow::new("early", 0, 3, WindowPriority::High),
        ];
        assert_eq!(active_window(&wednesday_at(22), &windows).unwrap().name, "late");
        assert_eq!(active_window(&wednesday_at(1), &windows).unwrap().name, "early");
        assert!(active_window(&wednesday_at(3), &windows).is_none());
    }

    #[test]
    fn test_inactive_higher_priority_ignored() {
        let windows = vec![
            ScheduleWindow::new("evening", 19, 23, WindowPriority::Low),
            ScheduleWindow::new("night", 0, 6, WindowPriority::High),
        ];
        assert_eq!(active_window(&wednesday_at(20), &windows).unwrap().name, "evening");
    }
}
