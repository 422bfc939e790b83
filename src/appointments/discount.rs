// Discount eligibility
// Ordered rule table over a patient's history with one doctor. The first
// rule whose predicate matches decides the verdict; later rules are never
// consulted.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;

/// Flat amount debited from the wallet when a discount is granted
pub fn discount_amount() -> Decimal {
    Decimal::from(50)
}

/// Discounted bookings are refused above this many scheduled appointments
pub const MAX_ACTIVE_APPOINTMENTS: i64 = 3;
/// Completed visits with the doctor needed for the loyalty grant
pub const LOYALTY_VISITS: i64 = 5;
/// Months of absence after which the retention grant applies
pub const RETENTION_MONTHS: u32 = 3;

/// Patient history facts the rules are evaluated against, all scoped to
/// a single (patient, doctor) pair except `active_scheduled` which counts
/// the patient's scheduled appointments with any doctor.
#[derive(Debug, Clone, Default)]
pub struct DiscountContext {
    pub used_discount_with_doctor: bool,
    pub active_scheduled: i64,
    pub completed_with_doctor: i64,
    pub last_completed_with_doctor: Option<DateTime<Utc>>,
}

/// Reason a discount was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountGrant {
    NewPatient,
    Loyalty,
    Retention,
}

impl DiscountGrant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountGrant::NewPatient => "new_patient",
            DiscountGrant::Loyalty => "loyalty",
            DiscountGrant::Retention => "retention",
        }
    }
}

/// Reason a discount was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountRefusal {
    AlreadyUsed,
    TooManyActive,
    RecentPatient,
}

impl DiscountRefusal {
    /// Client-facing message for this refusal
    pub fn message(&self) -> &'static str {
        match self {
            DiscountRefusal::AlreadyUsed => "Discount already used with this doctor",
            DiscountRefusal::TooManyActive => "Too many active appointments",
            DiscountRefusal::RecentPatient => "Not eligible for a discount at this time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible(DiscountGrant),
    Ineligible(DiscountRefusal),
}

type Predicate = fn(&DiscountContext, DateTime<Utc>) -> Option<Verdict>;

fn one_discount_per_doctor(ctx: &DiscountContext, _now: DateTime<Utc>) -> Option<Verdict> {
    ctx.used_discount_with_doctor
        .then_some(Verdict::Ineligible(DiscountRefusal::AlreadyUsed))
}

fn active_appointment_cap(ctx: &DiscountContext, _now: DateTime<Utc>) -> Option<Verdict> {
    (ctx.active_scheduled >= MAX_ACTIVE_APPOINTMENTS)
        .then_some(Verdict::Ineligible(DiscountRefusal::TooManyActive))
}

fn new_patient(ctx: &DiscountContext, _now: DateTime<Utc>) -> Option<Verdict> {
    (ctx.completed_with_doctor == 0).then_some(Verdict::Eligible(DiscountGrant::NewPatient))
}

fn loyalty(ctx: &DiscountContext, _now: DateTime<Utc>) -> Option<Verdict> {
    (ctx.completed_with_doctor >= LOYALTY_VISITS)
        .then_some(Verdict::Eligible(DiscountGrant::Loyalty))
}

fn retention(ctx: &DiscountContext, now: DateTime<Utc>) -> Option<Verdict> {
    let cutoff = now.checked_sub_months(Months::new(RETENTION_MONTHS))?;
    let last = ctx.last_completed_with_doctor?;
    (last < cutoff).then_some(Verdict::Eligible(DiscountGrant::Retention))
}

// Refusals first, then grants from cheapest to check to most specific.
const RULES: &[(&str, Predicate)] = &[
    ("one_discount_per_doctor", one_discount_per_doctor),
    ("active_appointment_cap", active_appointment_cap),
    ("new_patient", new_patient),
    ("loyalty", loyalty),
    ("retention", retention),
];

/// Evaluate the rule table; patients matching no rule are refused as
/// recent patients.
pub fn evaluate(ctx: &DiscountContext, now: DateTime<Utc>) -> Verdict {
    for (name, predicate) in RULES {
        if let Some(verdict) = predicate(ctx, now) {
            tracing::debug!("discount rule '{}' matched: {:?}", name, verdict);
            return verdict;
        }
    }
    Verdict::Ineligible(DiscountRefusal::RecentPatient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_new_patient_is_eligible() {
        let ctx = DiscountContext::default();
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Eligible(DiscountGrant::NewPatient)
        );
    }

    #[test]
    fn test_already_used_wins_over_everything() {
        // Even a brand-new patient profile is refused once the discount
        // has been used with this doctor.
        let ctx = DiscountContext {
            used_discount_with_doctor: true,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Ineligible(DiscountRefusal::AlreadyUsed)
        );
    }

    #[test]
    fn test_too_many_active_blocks_new_patient_grant() {
        let ctx = DiscountContext {
            active_scheduled: MAX_ACTIVE_APPOINTMENTS,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Ineligible(DiscountRefusal::TooManyActive)
        );
    }

    #[test]
    fn test_two_active_appointments_still_allowed() {
        let ctx = DiscountContext {
            active_scheduled: MAX_ACTIVE_APPOINTMENTS - 1,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Eligible(DiscountGrant::NewPatient)
        );
    }

    #[test]
    fn test_loyal_patient_is_eligible() {
        let ctx = DiscountContext {
            completed_with_doctor: LOYALTY_VISITS,
            last_completed_with_doctor: Some(now() - Duration::days(7)),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Eligible(DiscountGrant::Loyalty)
        );
    }

    #[test]
    fn test_returning_patient_after_absence_is_eligible() {
        let ctx = DiscountContext {
            completed_with_doctor: 2,
            last_completed_with_doctor: Some(now() - Duration::days(120)),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Eligible(DiscountGrant::Retention)
        );
    }

    #[test]
    fn test_recent_patient_with_few_visits_is_refused() {
        let ctx = DiscountContext {
            completed_with_doctor: 2,
            last_completed_with_doctor: Some(now() - Duration::days(10)),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, now()),
            Verdict::Ineligible(DiscountRefusal::RecentPatient)
        );
    }

    #[test]
    fn test_exactly_three_months_ago_is_not_yet_retention() {
        // The absence must exceed the window, not merely reach it.
        let at = now();
        let ctx = DiscountContext {
            completed_with_doctor: 1,
            last_completed_with_doctor: at.checked_sub_months(Months::new(RETENTION_MONTHS)),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ctx, at),
            Verdict::Ineligible(DiscountRefusal::RecentPatient)
        );
    }

    #[test]
    fn test_discount_amount_is_flat_fifty() {
        assert_eq!(discount_amount(), Decimal::from(50));
    }
}
