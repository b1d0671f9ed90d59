// Log capture is process-global, so the checks share one test.

use assay_i18n::MessageBundle;
use assay_log::{Level, capture, set_level, take_captured};
use assay_validation::guard::{self, GuardOptions, GuardOutcome};
use assay_validation::{Between, MessageResource, Record, Schema, Validator};
use std::sync::Arc;

#[test]
fn test_fallbacks_diagnostics_and_callbacks_are_logged() {
    capture(true);
    set_level(Level::Debug);

    let source = Arc::new(MessageBundle::new().with("Generic", "{field} is invalid."));
    let message = MessageResource::new(source, "Missing")
        .unwrap()
        .with_fallback_key("Generic");
    assert_eq!(message.resolve(None), "{field} is invalid.");

    let schema = Schema::builder().field("Value", |f| {
        f.rule(Between::new("Low", "High", message.clone()).unwrap())
    });
    let record = Record::new("Order").with("Value", 5).with("High", 10);
    let errors = Validator::new().try_validate(&record, &schema);
    assert!(errors[0].is_diagnostic());

    let callback: &dyn Fn(GuardOutcome) = &|_| panic!("listener failed");
    let record = record.with("Low", 1).with_schema(schema);
    assert!(guard::is_valid(&record, GuardOptions::new().with_callback(callback)));

    let records = take_captured();
    capture(false);

    assert!(records.iter().any(|r| r.target == "assay::message"
        && r.message == "'Missing' missing in bundle, using fallback key 'Generic'"));
    assert!(records.iter().any(|r| r.target == "assay::rule"
        && r.level == Level::Debug
        && r.message.contains("Unknown property: Low")));
    assert!(records.iter().any(|r| r.target == "assay::guard" && r.level == Level::Warn));
}
