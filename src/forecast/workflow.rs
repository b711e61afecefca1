//! Forecast status state machine.
//!
//! Pure transition functions over an in-memory [`Forecast`] - no I/O.
//! Each guard failure comes back as a structured [`AppError`] outcome;
//! a failed guard leaves the forecast untouched. The services layer loads
//! the row, runs one of these transitions, and persists the result.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::{forecast_price, PricedLine};

use super::models::{Forecast, ForecastStatus};

/// Begin a draft forecast owned by `owner`. Drafts are created implicitly
/// by the first add-to-cart action, never by an explicit endpoint.
pub fn new_draft(owner: Uuid, now: DateTime<Utc>) -> Forecast {
    Forecast {
        id: Uuid::new_v4(),
        owner,
        moderator: None,
        status: ForecastStatus::Draft.as_i16(),
        days: None,
        date_created: now,
        date_formation: None,
        date_complete: None,
        price: None,
    }
}

/// Draft -> Submitted, by the owner.
///
/// Guards: forecast must be in Draft, and `days` must be set and positive.
/// Stamps `date_formation`.
pub fn submit(forecast: &mut Forecast, now: DateTime<Utc>) -> Result<()> {
    ensure_status(forecast, ForecastStatus::Draft)?;

    if !forecast.days.is_some_and(|d| d > 0) {
        return Err(AppError::guard("days field is not set"));
    }

    forecast.status = ForecastStatus::Submitted.as_i16();
    forecast.date_formation = Some(now);
    Ok(())
}

/// Submitted -> {Approved, Rejected}, by a moderator.
///
/// Guards: the requested target must itself be Approved or Rejected, and the
/// forecast must currently be Submitted. On approval the price is computed
/// from the line items before `date_complete` is stamped; on rejection the
/// price stays unset.
pub fn decide(
    forecast: &mut Forecast,
    target: i16,
    moderator: Uuid,
    lines: &[PricedLine],
    now: DateTime<Utc>,
) -> Result<()> {
    let target = match ForecastStatus::from_i16(target) {
        Some(s @ (ForecastStatus::Approved | ForecastStatus::Rejected)) => s,
        _ => return Err(AppError::guard("invalid target status")),
    };

    ensure_status(forecast, ForecastStatus::Submitted)?;

    if target == ForecastStatus::Approved {
        forecast.price = Some(forecast_price(forecast.days.unwrap_or(0), lines));
    }

    forecast.status = target.as_i16();
    forecast.moderator = Some(moderator);
    forecast.date_complete = Some(now);
    Ok(())
}

/// Draft -> Deleted, by the owner. Soft delete: line items are kept.
pub fn discard(forecast: &mut Forecast) -> Result<()> {
    ensure_status(forecast, ForecastStatus::Draft)?;

    forecast.status = ForecastStatus::Deleted.as_i16();
    Ok(())
}

/// Guard shared by every line-item mutation (add, remove, update count):
/// the forecast must still be a draft. Applied uniformly - the cart is
/// frozen the moment it leaves Draft.
pub fn ensure_mutable(forecast: &Forecast) -> Result<()> {
    ensure_status(forecast, ForecastStatus::Draft)
}

fn ensure_status(forecast: &Forecast, expected: ForecastStatus) -> Result<()> {
    if forecast.status == expected.as_i16() {
        Ok(())
    } else {
        Err(AppError::guard("forecast is in the wrong status"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> Forecast {
        new_draft(Uuid::new_v4(), Utc::now())
    }

    fn submitted(days: i32) -> Forecast {
        let mut f = draft();
        f.days = Some(days);
        submit(&mut f, Utc::now()).unwrap();
        f
    }

    fn lines() -> Vec<PricedLine> {
        vec![PricedLine {
            unit_price: dec!(2.50),
            count: 2,
        }]
    }

    #[test]
    fn new_draft_starts_clean() {
        let f = draft();
        assert_eq!(f.status(), Some(ForecastStatus::Draft));
        assert!(f.moderator.is_none());
        assert!(f.date_formation.is_none());
        assert!(f.date_complete.is_none());
        assert!(f.price.is_none());
    }

    #[test]
    fn submit_requires_days() {
        let mut f = draft();
        let err = submit(&mut f, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Guard(_)));
        // forecast unchanged
        assert_eq!(f.status(), Some(ForecastStatus::Draft));
        assert!(f.date_formation.is_none());

        f.days = Some(0);
        assert!(submit(&mut f, Utc::now()).is_err());

        f.days = Some(5);
        submit(&mut f, Utc::now()).unwrap();
        assert_eq!(f.status(), Some(ForecastStatus::Submitted));
        assert!(f.date_formation.is_some());
    }

    #[test]
    fn submit_requires_draft_status() {
        let mut f = submitted(5);
        assert!(matches!(
            submit(&mut f, Utc::now()),
            Err(AppError::Guard(_))
        ));
    }

    #[test]
    fn approve_sets_price_moderator_and_date_complete() {
        let mut f = submitted(5);
        let moderator = Uuid::new_v4();

        decide(
            &mut f,
            ForecastStatus::Approved.as_i16(),
            moderator,
            &lines(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(f.status(), Some(ForecastStatus::Approved));
        // 2 units * 2.50/day * 5 days
        assert_eq!(f.price, Some(dec!(25.00)));
        assert_eq!(f.moderator, Some(moderator));
        assert!(f.date_complete.is_some());
    }

    #[test]
    fn reject_leaves_price_unset() {
        let mut f = submitted(5);

        decide(
            &mut f,
            ForecastStatus::Rejected.as_i16(),
            Uuid::new_v4(),
            &lines(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(f.status(), Some(ForecastStatus::Rejected));
        assert!(f.price.is_none());
        assert!(f.date_complete.is_some());
    }

    #[test]
    fn decide_rejects_targets_outside_approved_rejected() {
        for target in [1, 2, 5, 0, 42] {
            let mut f = submitted(5);
            let err = decide(&mut f, target, Uuid::new_v4(), &lines(), Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::Guard(_)), "target {target}");
            assert_eq!(f.status(), Some(ForecastStatus::Submitted));
        }
    }

    #[test]
    fn decide_requires_submitted_status() {
        // Draft cannot be decided, for either target.
        for target in [3, 4] {
            let mut f = draft();
            assert!(decide(&mut f, target, Uuid::new_v4(), &lines(), Utc::now()).is_err());
            assert_eq!(f.status(), Some(ForecastStatus::Draft));
        }

        // An already-decided forecast cannot be re-decided.
        let mut f = submitted(5);
        decide(&mut f, 3, Uuid::new_v4(), &lines(), Utc::now()).unwrap();
        let err = decide(&mut f, 4, Uuid::new_v4(), &lines(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Guard(_)));
        assert_eq!(f.status(), Some(ForecastStatus::Approved));
    }

    #[test]
    fn price_set_iff_approved() {
        let f = draft();
        assert!(f.price.is_none());

        let f = submitted(5);
        assert!(f.price.is_none());

        let mut rejected = submitted(5);
        decide(&mut rejected, 4, Uuid::new_v4(), &lines(), Utc::now()).unwrap();
        assert!(rejected.price.is_none());

        let mut approved = submitted(5);
        decide(&mut approved, 3, Uuid::new_v4(), &lines(), Utc::now()).unwrap();
        assert!(approved.price.is_some());
    }

    #[test]
    fn discard_only_from_draft() {
        let mut f = draft();
        discard(&mut f).unwrap();
        assert_eq!(f.status(), Some(ForecastStatus::Deleted));

        let mut f = submitted(5);
        assert!(matches!(discard(&mut f), Err(AppError::Guard(_))));
        assert_eq!(f.status(), Some(ForecastStatus::Submitted));
    }

    #[test]
    fn items_mutable_only_while_draft() {
        assert!(ensure_mutable(&draft()).is_ok());
        assert!(ensure_mutable(&submitted(5)).is_err());

        let mut deleted = draft();
        discard(&mut deleted).unwrap();
        assert!(ensure_mutable(&deleted).is_err());
    }

    #[test]
    fn full_lifecycle_draft_to_approved() {
        let owner = Uuid::new_v4();
        let moderator = Uuid::new_v4();

        let mut f = new_draft(owner, Utc::now());
        assert_eq!(f.owner, owner);

        f.days = Some(5);
        submit(&mut f, Utc::now()).unwrap();
        assert_eq!(f.status(), Some(ForecastStatus::Submitted));
        assert!(f.date_formation.is_some());

        decide(&mut f, 3, moderator, &lines(), Utc::now()).unwrap();
        assert_eq!(f.status(), Some(ForecastStatus::Approved));
        assert_eq!(f.price, Some(dec!(25.00)));

        // No regression: every further transition fails.
        assert!(submit(&mut f, Utc::now()).is_err());
        assert!(decide(&mut f, 4, moderator, &lines(), Utc::now()).is_err());
        assert!(discard(&mut f).is_err());
    }
}
