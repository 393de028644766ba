//! Dry-day quota enforcement for displayed schedules

use crate::models::{DailySchedule, WaterNeedsTier, HORIZON_DAYS};

/// Dry days required over the whole horizon
pub fn zero_day_target(tier: WaterNeedsTier) -> usize {
    tier.zero_days_per_week() * 2
}

/// Watering days that must be dropped to meet the tier's dry-day quota,
/// smallest volumes first. Ties keep day order.
pub fn demotion_plan(schedule: &DailySchedule, tier: WaterNeedsTier) -> Vec<usize> {
    let target = zero_day_target(tier);
    if schedule.zero_day_count() >= target {
        return Vec::new();
    }

    let mut watering: Vec<(usize, f64)> = schedule.watering_days().collect();
    // sort_by is stable
    watering.sort_by(|a, b| a.1.total_cmp(&b.1));

    let allowed = HORIZON_DAYS.saturating_sub(target);
    let days_to_zero_out = watering.len().saturating_sub(allowed);

    watering
        .into_iter()
        .take(days_to_zero_out)
        .map(|(day, _)| day)
        .collect()
}

/// Return a copy of `schedule` with at least the tier's quota of dry days.
///
/// Only ever removes watering days, so applying it twice is a no-op.
pub fn rebalance(schedule: &DailySchedule, tier: WaterNeedsTier) -> DailySchedule {
    let mut balanced = schedule.clone();
    for day in demotion_plan(schedule, tier) {
        balanced.clear_day(day);
    }
    balanced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_from(volumes: [f64; HORIZON_DAYS]) -> DailySchedule {
        let flags: Vec<u8> = volumes.iter().map(|&v| u8::from(v > 0.0)).collect();
        DailySchedule::from_parts(&flags, &volumes).unwrap()
    }

    #[test]
    fn test_targets() {
        assert_eq!(zero_day_target(WaterNeedsTier::Low), 10);
        assert_eq!(zero_day_target(WaterNeedsTier::Medium), 8);
        assert_eq!(zero_day_target(WaterNeedsTier::MediumHigh), 6);
        assert_eq!(zero_day_target(WaterNeedsTier::High), 4);
    }

    #[test]
    fn test_quota_already_met_is_unchanged() {
        let mut volumes = [0.0; HORIZON_DAYS];
        volumes[2] = 5.0;
        volumes[5] = 5.0;
        let schedule = schedule_from(volumes);
        assert_eq!(rebalance(&schedule, WaterNeedsTier::Low), schedule);
    }

    #[test]
    fn test_smallest_volumes_demoted_first() {
        // Low tier allows 4 watering days; 5 are scheduled
        let mut volumes = [0.0; HORIZON_DAYS];
        volumes[1] = 5.0;
        volumes[3] = 2.0;
        volumes[6] = 7.0;
        volumes[9] = 6.0;
        volumes[12] = 8.0;
        let schedule = schedule_from(volumes);

        assert_eq!(demotion_plan(&schedule, WaterNeedsTier::Low), vec![3]);
        let balanced = rebalance(&schedule, WaterNeedsTier::Low);
        assert!(!balanced.is_watering_day(3));
        assert_eq!(balanced.volume()[3], 0.0);
        assert!(balanced.is_watering_day(1));
        assert_eq!(balanced.zero_day_count(), 10);
    }

    #[test]
    fn test_ties_break_by_day_order() {
        let volumes = [3.0; HORIZON_DAYS];
        let schedule = schedule_from(volumes);
        // High tier allows 10 watering days, so the first 4 go
        assert_eq!(demotion_plan(&schedule, WaterNeedsTier::High), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_original_is_untouched() {
        let schedule = schedule_from([4.0; HORIZON_DAYS]);
        let before = schedule.clone();
        let _ = rebalance(&schedule, WaterNeedsTier::Medium);
        assert_eq!(schedule, before);
    }

    #[test]
    fn test_idempotent() {
        let schedule = schedule_from([
            1.0, 2.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0, 0.0, 11.0, 12.0, 13.0, 14.0,
        ]);
        for tier in WaterNeedsTier::ALL {
            let once = rebalance(&schedule, tier);
            assert_eq!(rebalance(&once, tier), once);
        }
    }
}
