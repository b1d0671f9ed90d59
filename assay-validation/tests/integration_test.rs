// Integration tests for assay-validation

use assay_i18n::{I18n, Locale, MessageBundle, MessageSource};
use assay_validation::guard::{self, GuardOptions};
use assay_validation::*;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

fn i18n() -> Arc<dyn MessageSource> {
    Arc::new(
        I18n::new()
            .with_bundle(
                &Locale::en(),
                MessageBundle::new()
                    .with("Date_OutOfRange", "{field} must fall inside the booking window.")
                    .with("Notes_Required", "{field} are required for refunds.")
                    .with("Guests_TooMany", "At most {field} may be listed... too many guests.")
                    .with("Email_Invalid", "Guest email is invalid")
                    .with("Name_Required", "{field} is required."),
            )
            .with_bundle(
                &Locale::tr(),
                MessageBundle::new().with("Name_Required", "{field} zorunludur."),
            ),
    )
}

fn message(key: &str) -> MessageResource {
    MessageResource::new(i18n(), key).unwrap()
}

struct Booking {
    name: String,
    window_start: chrono::DateTime<Utc>,
    window_end: chrono::DateTime<Utc>,
    date: Option<chrono::DateTime<Utc>>,
    status: String,
    notes: Option<String>,
    guests: Vec<String>,
    schema: Schema,
}

impl_subject!(Booking {
    public name => "Name",
    private window_start => "WindowStart",
    private window_end => "WindowEnd",
    public date => "Date",
    public status => "Status",
    public notes => "Notes",
    public guests => "Guests",
});

impl Validate for Booking {
    fn schema(&self) -> &Schema {
        &self.schema
    }
}

fn booking_schema() -> Schema {
    Schema::builder()
        .field("Name", |f| f.rule(Required::new(message("Name_Required"))))
        .field("Date", |f| {
            f.rule(Between::new("WindowStart", "WindowEnd", message("Date_OutOfRange")).unwrap())
        })
        .field("Notes", |f| {
            f.rule(RequiredIf::new("status", "refund", message("Notes_Required")).unwrap())
        })
        .field("Guests", |f| {
            f.rule(MaxCount::new(3, message("Guests_TooMany")).unwrap())
                .rule(
                    CollectionItemsMatch::new(item_rule(|m| Ok(Email::new(m))), message("Email_Invalid"))
                        .unwrap()
                        .aggregate_all_errors(true),
                )
        })
}

fn booking() -> Booking {
    Booking {
        name: "Ada".into(),
        window_start: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        window_end: Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap(),
        date: Some(Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()),
        status: "confirmed".into(),
        notes: None,
        guests: vec!["a@example.com".into()],
        schema: booking_schema(),
    }
}

#[test]
fn test_valid_booking() {
    assert!(booking().validate().is_ok());
    assert!(guard::is_valid(&booking(), GuardOptions::new()));
}

#[test]
fn test_date_outside_private_window() {
    let mut b = booking();
    b.date = Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());

    let errors = b.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Date must fall inside the booking window.");
    assert_eq!(errors[0].members, vec!["Date".to_string()]);
}

#[test]
fn test_window_boundaries_are_inclusive() {
    let mut b = booking();
    b.date = Some(b.window_end);
    assert!(b.validate().is_ok());

    b.date = Some(b.window_start);
    assert!(b.validate().is_ok());
}

#[test]
fn test_refund_requires_notes() {
    let mut b = booking();
    b.status = "refund".into();

    let errors = b.validate().unwrap_err();
    assert_eq!(errors[0].message, "Notes are required for refunds.");

    b.notes = Some("Customer moved abroad".into());
    assert!(b.validate().is_ok());
}

#[test]
fn test_guest_rules() {
    let mut b = booking();
    b.guests = vec![
        "a@example.com".into(),
        "nope".into(),
        "b@example.com".into(),
        "still nope".into(),
    ];

    let errors = ValidationErrors::from(b.validate().unwrap_err());
    let guests = errors.get_member_errors("Guests");
    assert_eq!(guests.len(), 2);
    assert_eq!(guests[0].constraint, "max_count");
    assert_eq!(
        guests[1].message,
        "Guest email is invalid (item #2); Guest email is invalid (item #4)"
    );
}

#[test]
fn test_required_gates_only_its_member() {
    let mut b = booking();
    b.name = "  ".into();
    b.guests = vec!["nope".into()];

    let errors = b.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].message, "Name is required.");
}

#[test]
fn test_only_required_rules() {
    let mut b = booking();
    b.guests = vec!["nope".into()];
    assert!(guard::is_valid(&b, GuardOptions::new().only_required()));
    assert!(!guard::is_valid(&b, GuardOptions::new()));
}

#[test]
fn test_ensure_valid_with_locale() {
    let mut b = booking();
    b.name = String::new();

    let tr = Locale::tr_tr();
    let error = guard::ensure_valid(&b, GuardOptions::new().with_locale(&tr)).unwrap_err();

    let entries = error.errors();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Name zorunludur.");
    assert_eq!(error.data()[ValidationFailed::COUNT_KEY], serde_json::json!(1));
}

#[test]
fn test_misconfigured_rule_is_diagnostic() {
    let schema = Schema::builder().field("Date", |f| {
        f.rule(LessThan::new("Deadline", message("Date_OutOfRange")).unwrap())
    });
    let b = Booking {
        schema,
        ..booking()
    };

    let errors = ValidationErrors::from(b.validate().unwrap_err());
    let diagnostics: Vec<_> = errors.diagnostics().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unknown property: Deadline");
}

#[test]
fn test_validation_errors_json() {
    let mut b = booking();
    b.name = String::new();

    let errors = ValidationErrors::from(b.validate().unwrap_err());
    let json = errors.to_json();
    assert_eq!(json["errors"][0]["members"][0], "Name");
    assert_eq!(json["errors"][0]["kind"], "invalid");
}
