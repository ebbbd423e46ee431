//! Default English phrasing for price announcements (screen readers, live
//! regions). Pages with their own localisation use the structured
//! [`PriceAnnouncement`] directly.

use configurator_core::{BillingCycle, Currency, PriceAnnouncement};

/// Renders an announcement as one or two English sentences.
///
/// ```text
/// Total is now €208.80 per month, billed annually. You save €139.20 per month.
/// ```
pub fn announcement_text(announcement: &PriceAnnouncement, currency: &Currency) -> String {
    let mut text = match announcement.previous_final_price {
        Some(previous) => format!(
            "Total changed from {} to {} per month",
            currency.format(previous),
            currency.format(announcement.final_price)
        ),
        None => format!(
            "Total is now {} per month",
            currency.format(announcement.final_price)
        ),
    };

    if let Some(billing) = billing_phrase(announcement.billing_cycle) {
        text.push_str(", ");
        text.push_str(billing);
    }
    text.push('.');

    if announcement.total_savings.is_positive() {
        text.push_str(&format!(
            " You save {} per month.",
            currency.format(announcement.total_savings)
        ));
    }

    text
}

fn billing_phrase(cycle: BillingCycle) -> Option<&'static str> {
    match cycle {
        BillingCycle::Monthly => None,
        BillingCycle::Semiannual => Some("billed every six months"),
        BillingCycle::Annual => Some("billed annually"),
        BillingCycle::Biennial => Some("billed every two years"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator_core::Money;

    fn announcement(previous: Option<i64>, savings: i64, cycle: BillingCycle) -> PriceAnnouncement {
        PriceAnnouncement {
            final_price: Money::from_cents(20880),
            total_savings: Money::from_cents(savings),
            billing_cycle: cycle,
            currency: "EUR".to_string(),
            previous_final_price: previous.map(Money::from_cents),
        }
    }

    #[test]
    fn test_first_announcement() {
        let text = announcement_text(
            &announcement(None, 13920, BillingCycle::Annual),
            &Currency::default(),
        );
        assert_eq!(
            text,
            "Total is now €208.80 per month, billed annually. You save €139.20 per month."
        );
    }

    #[test]
    fn test_changed_monthly_without_savings() {
        let text = announcement_text(
            &announcement(Some(34800), 0, BillingCycle::Monthly),
            &Currency::default(),
        );
        assert_eq!(text, "Total changed from €348.00 to €208.80 per month.");
    }
}
