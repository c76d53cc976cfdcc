// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use paysheet::domain::models::payment::PaymentEvent;
    use paysheet::domain::models::sheet_row::{Cell, Destination, ValueInputOption};
    use paysheet::domain::services::normalizer::{FieldNormalizer, NormalizerSettings, StatusMode};
    use serde_json::json;

    fn destination(option: ValueInputOption) -> Destination {
        Destination {
            label: "primary".into(),
            spreadsheet_id: "sheet-123".into(),
            sheet_name: "Sheet1".into(),
            value_input_option: option,
            bootstrap_header: true,
        }
    }

    fn payment() -> PaymentEvent {
        PaymentEvent::from_entity(&json!({
            "id": "pay_Link1",
            "email": "asha@example.com",
            "amount": 10050,
            "status": "authorized",
            "notes": { "name": "Asha", "custom1": 42 }
        }))
        .unwrap()
    }

    #[test]
    fn test_clickable_links_need_user_entered() {
        let normalizer = FieldNormalizer::new(NormalizerSettings {
            clickable_links: true,
            ..NormalizerSettings::default()
        });
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let raw = normalizer.normalize_at(
            "payment.captured",
            &payment(),
            &destination(ValueInputOption::Raw),
            now,
        );
        assert_eq!(raw.get("payment_id"), Some(&Cell::text("pay_Link1")));

        let linked = normalizer.normalize_at(
            "payment.captured",
            &payment(),
            &destination(ValueInputOption::UserEntered),
            now,
        );
        assert_eq!(
            linked.get("payment_id"),
            Some(&Cell::Formula(
                "=HYPERLINK(\"https://dashboard.razorpay.com/app/payments/pay_Link1\",\"pay_Link1\")"
                    .into()
            ))
        );
    }

    #[test]
    fn test_raw_status_mode() {
        let normalizer = FieldNormalizer::new(NormalizerSettings {
            status_mode: StatusMode::Raw,
            ..NormalizerSettings::default()
        });
        let row = normalizer.normalize(
            "payment.captured",
            &payment(),
            &destination(ValueInputOption::Raw),
        );
        assert_eq!(row.get("status"), Some(&Cell::text("authorized")));
        assert_eq!(row.get("amount"), Some(&Cell::Number(100.5)));
        assert_eq!(row.get("custom1"), Some(&Cell::text("42")));
    }

    #[test]
    fn test_missing_created_at_uses_now_in_ist() {
        let normalizer = FieldNormalizer::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0).unwrap();

        let row = normalizer.normalize_at(
            "payment.authorized",
            &payment(),
            &destination(ValueInputOption::Raw),
            now,
        );
        assert_eq!(row.get("timestamp"), Some(&Cell::text("01/04/2024, 01:30:00")));
        assert_eq!(row.get("status"), Some(&Cell::text("authorized")));
    }
}
