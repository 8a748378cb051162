//! Billing period entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PeriodId, Timestamp};

use super::Payment;

/// One span of coverage, owning exactly one payment.
///
/// Dates stay unset until the payment is confirmed (initial purchase) or are
/// fixed in advance (renewal chaining from the previous end). Periods within
/// a subscription never overlap because renewals always start at the
/// previous `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub payment: Payment,
}

impl Period {
    /// Creates a period with unset dates; they are filled in when the
    /// payment confirms.
    pub fn new(payment: Payment) -> Self {
        Self {
            id: PeriodId::new(),
            start_date: None,
            end_date: None,
            payment,
        }
    }

    /// Creates a period with dates fixed up front (renewal chaining).
    pub fn with_dates(start: Timestamp, end: Timestamp, payment: Payment) -> Self {
        Self {
            id: PeriodId::new(),
            start_date: Some(start),
            end_date: Some(end),
            payment,
        }
    }

    /// True if this period's payment has been confirmed.
    pub fn is_paid(&self) -> bool {
        self.payment.is_paid()
    }

    /// True while a paid period covers the given moment
    /// (`start <= now < end`).
    pub fn covers(&self, now: Timestamp) -> bool {
        match (self.is_paid(), self.start_date, self.end_date) {
            (true, Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }

    /// Sets the coverage dates.
    pub fn set_dates(&mut self, start: Timestamp, end: Timestamp) {
        self.start_date = Some(start);
        self.end_date = Some(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PaymentMethod;

    fn paid_period(start: Timestamp, end: Timestamp) -> Period {
        let mut payment = Payment::new(50, PaymentMethod::Invoice, "regular", start, 30);
        payment.confirm(start).unwrap();
        Period::with_dates(start, end, payment)
    }

    #[test]
    fn new_period_has_no_dates_and_no_coverage() {
        let payment = Payment::new(50, PaymentMethod::Invoice, "regular", Timestamp::now(), 30);
        let period = Period::new(payment);
        assert!(period.start_date.is_none());
        assert!(!period.covers(Timestamp::now()));
    }

    #[test]
    fn covers_is_half_open() {
        let start = Timestamp::from_ymd(2024, 1, 1).unwrap();
        let end = Timestamp::from_ymd(2025, 1, 1).unwrap();
        let period = paid_period(start, end);
        assert!(period.covers(start));
        assert!(period.covers(end.minus_days(1)));
        assert!(!period.covers(end));
        assert!(!period.covers(start.minus_days(1)));
    }

    #[test]
    fn unpaid_period_with_dates_does_not_cover() {
        let start = Timestamp::from_ymd(2024, 1, 1).unwrap();
        let end = Timestamp::from_ymd(2025, 1, 1).unwrap();
        let payment = Payment::new(50, PaymentMethod::Invoice, "regular", start, 30);
        let period = Period::with_dates(start, end, payment);
        assert!(!period.covers(start.add_days(10)));
    }
}
