//! Tiered retention policy engine.
//!
//! Decides, for a set of existing snapshot identifiers and a "now", which
//! ones have outlived their retention value. Recent snapshots all survive,
//! older ones thin to one per hour, then one per day, then drop entirely.
//! One linear walk over the ages sorted oldest-first, with a watermark of
//! the last kept age, is enough: the pre-sort means each tier only needs
//! to compare against the previous survivor.

use chrono::{DateTime, TimeDelta, Utc};

use crate::name::{self, NameError};
use crate::settings::SnapshotLogSettings;

struct Candidate<'a> {
    name: &'a str,
    age: TimeDelta,
    marked: bool,
}

/// Identifiers from `names` that may be deleted under `settings` as of
/// `now`.
///
/// Callers pass identifiers already validated against the log's pattern;
/// an unparseable one surfaces as [`NameError`] rather than being skipped.
/// The newest snapshot and the configured floor count are never returned,
/// whatever the windows say.
pub fn eligible_for_deletion(
    settings: &SnapshotLogSettings,
    now: DateTime<Utc>,
    names: &[String],
) -> Result<Vec<String>, NameError> {
    let mut candidates = names
        .iter()
        .map(|n| {
            Ok(Candidate {
                name: n.as_str(),
                age: now - name::parse_instant(n, settings.name())?,
                marked: false,
            })
        })
        .collect::<Result<Vec<_>, NameError>>()?;

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    // Oldest first. The sort is stable; equal ages are not expected since
    // identifiers are unique and monotonic within a log.
    candidates.sort_by(|a, b| b.age.cmp(&a.age));

    let one_hour = TimeDelta::hours(1);
    let one_day = TimeDelta::days(1);
    let mut age_of_prior_kept = TimeDelta::MAX;

    for candidate in candidates.iter_mut() {
        if candidate.age > settings.preserve_daily_within() {
            candidate.marked = true;
            continue;
        }

        if candidate.age > settings.preserve_hourly_within() {
            if age_of_prior_kept - candidate.age >= one_day {
                age_of_prior_kept = candidate.age;
            } else {
                candidate.marked = true;
            }
            continue;
        }

        if candidate.age > settings.preserve_all_within() {
            if age_of_prior_kept - candidate.age >= one_hour {
                age_of_prior_kept = candidate.age;
            } else {
                candidate.marked = true;
            }
            continue;
        }

        // Everything from here to the newest end is inside the
        // preserve-all window.
        break;
    }

    // The newest snapshot survives unconditionally, even with zero-length
    // windows or a skewed clock.
    if let Some(newest) = candidates.last_mut() {
        newest.marked = false;
    }

    let floor = settings.min_keep_count();
    let first_exempt = candidates.len().saturating_sub(floor);
    for candidate in &mut candidates[first_exempt..] {
        candidate.marked = false;
    }

    let doomed: Vec<String> = candidates
        .into_iter()
        .filter(|c| c.marked)
        .map(|c| c.name.to_string())
        .collect();
    tracing::trace!(
        total = names.len(),
        eligible = doomed.len(),
        "retention sweep"
    );
    Ok(doomed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const LOG: &str = "audit";

    fn now() -> DateTime<Utc> {
        NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S")
            .expect("valid test instant")
            .and_utc()
    }

    /// A name whose parsed instant lies `age` before `now`.
    fn aged(age: TimeDelta, sequence: u64) -> String {
        name::build(LOG, now() - age, sequence)
    }

    fn settings() -> SnapshotLogSettings {
        SnapshotLogSettings::new(LOG)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let doomed = eligible_for_deletion(&settings(), now(), &[]).unwrap();
        assert!(doomed.is_empty());
    }

    #[test]
    fn zero_windows_keep_only_the_newest() {
        let names = vec![
            aged(TimeDelta::minutes(3), 0),
            aged(TimeDelta::minutes(2), 1),
            aged(TimeDelta::minutes(1), 2),
        ];
        let doomed = eligible_for_deletion(&settings(), now(), &names).unwrap();
        assert_eq!(doomed, vec![names[0].clone(), names[1].clone()]);
    }

    #[test]
    fn everything_inside_preserve_all_window_survives() {
        let config = settings().with_preserve_all_within(TimeDelta::hours(1));
        let names = vec![
            aged(TimeDelta::minutes(50), 0),
            aged(TimeDelta::minutes(30), 1),
            aged(TimeDelta::minutes(10), 2),
        ];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert!(doomed.is_empty());
    }

    #[test]
    fn floor_count_overrides_age() {
        let config = settings().with_min_keep_count(3);
        let names = vec![
            aged(TimeDelta::days(30), 0),
            aged(TimeDelta::days(20), 1),
            aged(TimeDelta::days(10), 2),
            aged(TimeDelta::days(5), 3),
        ];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert_eq!(doomed, vec![names[0].clone()]);
    }

    #[test]
    fn floor_larger_than_population_deletes_nothing() {
        let config = settings().with_min_keep_count(10);
        let names = vec![aged(TimeDelta::days(30), 0), aged(TimeDelta::days(20), 1)];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert!(doomed.is_empty());
    }

    #[test]
    fn newest_survives_even_beyond_the_daily_window() {
        let config = settings().with_preserve_daily_within(TimeDelta::days(3));
        let names = vec![aged(TimeDelta::days(10), 0), aged(TimeDelta::days(9), 1)];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert_eq!(doomed, vec![names[0].clone()]);
    }

    #[test]
    fn hourly_tier_thins_to_one_survivor_per_hour_gap() {
        let config = settings()
            .with_preserve_all_within(TimeDelta::hours(1))
            .with_preserve_hourly_within(TimeDelta::hours(10))
            .with_preserve_daily_within(TimeDelta::hours(10));
        let names = vec![
            aged(TimeDelta::minutes(540), 0), // kept: oldest in tier
            aged(TimeDelta::minutes(510), 1), // 30 min after prior survivor
            aged(TimeDelta::minutes(480), 2), // kept: one hour after
            aged(TimeDelta::minutes(450), 3),
            aged(TimeDelta::minutes(420), 4), // kept
            aged(TimeDelta::minutes(30), 5),  // inside preserve-all
            aged(TimeDelta::minutes(10), 6),
        ];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert_eq!(doomed, vec![names[1].clone(), names[3].clone()]);
    }

    #[test]
    fn daily_tier_thins_to_one_survivor_per_day_gap() {
        let config = settings()
            .with_preserve_all_within(TimeDelta::hours(1))
            .with_preserve_hourly_within(TimeDelta::hours(6))
            .with_preserve_daily_within(TimeDelta::days(100));
        let names = vec![
            aged(TimeDelta::hours(80), 0), // kept: oldest
            aged(TimeDelta::hours(70), 1),
            aged(TimeDelta::hours(60), 2),
            aged(TimeDelta::hours(50), 3), // kept: 30 h after the 80 h survivor
            aged(TimeDelta::hours(40), 4),
            aged(TimeDelta::hours(30), 5),
            aged(TimeDelta::hours(20), 6), // kept: 30 h after the 50 h survivor
            aged(TimeDelta::hours(3), 7),  // hourly tier, 17 h gap
        ];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert_eq!(
            doomed,
            vec![
                names[1].clone(),
                names[2].clone(),
                names[4].clone(),
                names[5].clone(),
            ]
        );
    }

    #[test]
    fn beyond_daily_window_everything_is_expendable() {
        let config = settings()
            .with_preserve_daily_within(TimeDelta::days(3))
            .with_min_keep_count(1);
        let names = vec![
            aged(TimeDelta::days(9), 0),
            aged(TimeDelta::days(6), 1),
            aged(TimeDelta::days(4), 2),
            aged(TimeDelta::hours(1), 3),
        ];
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert_eq!(
            doomed,
            vec![names[0].clone(), names[1].clone(), names[2].clone()]
        );
    }

    #[test]
    fn unparseable_name_surfaces_as_error() {
        let names = vec![aged(TimeDelta::minutes(1), 0), "audit_garbage".to_string()];
        let result = eligible_for_deletion(&settings(), now(), &names);
        assert!(matches!(result, Err(NameError::Malformed { .. })));
    }

    #[test]
    fn input_order_does_not_matter() {
        let config = settings().with_min_keep_count(2);
        let mut names = vec![
            aged(TimeDelta::days(3), 0),
            aged(TimeDelta::days(2), 1),
            aged(TimeDelta::days(1), 2),
        ];
        names.reverse();
        let doomed = eligible_for_deletion(&config, now(), &names).unwrap();
        assert_eq!(doomed, vec![names[2].clone()]);
    }
}
