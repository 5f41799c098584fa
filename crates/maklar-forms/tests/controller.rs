//! Form controller behavior through the public API.

use maklar_forms::{
    entities, Dirtiness, FieldStatus, FormController, Submission, SubmitOutcome, Touch,
    ValidationMode, SUBMIT_FAILED_CODE,
};
use maklar_messages::ErrorFormatter;
use maklar_schema::contact::ContactKind;
use maklar_schema::RefinementPolicy;
use serde_json::json;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn contact_form(mode: ValidationMode) -> FormController {
    entities::contact_create(ErrorFormatter::default())
        .unwrap()
        .with_mode(mode)
}

fn fill_individual(form: &mut FormController) {
    form.change("typ", json!("privatperson"));
    form.change("fornamn", json!("Anna"));
    form.change("efternamn", json!("Andersson"));
    form.change("postnummer", json!("11122"));
}

// =============================================================================
// State machine
// =============================================================================

#[test]
fn test_initial_state() {
    let form = contact_form(ValidationMode::OnChange);
    assert_eq!(form.dirtiness(), Dirtiness::Pristine);
    assert_eq!(form.touch(), Touch::Untouched);
    assert_eq!(form.submission(), Submission::Idle);

    let state = form.state();
    assert!(state.is_valid);
    assert!(state.errors.is_empty());
    assert_eq!(form.field_state("fornamn").status, FieldStatus::Unvalidated);
}

#[test]
fn test_change_validates_in_on_change_mode() {
    let mut form = contact_form(ValidationMode::OnChange);
    form.change("typ", json!("privatperson"));
    form.change("postnummer", json!("09999"));

    assert_eq!(form.dirtiness(), Dirtiness::Dirty);
    assert_eq!(form.touch(), Touch::Touched);

    let props = form.field_props("postnummer");
    assert_eq!(props.error.as_deref(), Some("Ogiltigt postnummer"));
    assert!(props.aria_invalid);
    assert_eq!(props.aria_describedby.as_deref(), Some("postnummer-error"));

    form.change("postnummer", json!("111 22"));
    let props = form.field_props("postnummer");
    assert!(props.error.is_none());
    assert!(!props.aria_invalid);
    assert!(props.aria_describedby.is_none());
}

#[test]
fn test_blur_mode_defers_checks_until_blur() {
    let mut form = contact_form(ValidationMode::OnBlur);
    form.change("typ", json!("privatperson"));
    form.change("email", json!("anna@"));
    assert_eq!(form.field_state("email").status, FieldStatus::Unvalidated);
    assert!(form.field_state("email").is_dirty);

    form.blur("email");
    let field = form.field_state("email");
    assert!(field.is_touched);
    assert!(matches!(field.status, FieldStatus::Invalid(_)));
}

#[test]
fn test_submit_mode_ignores_change_and_blur() {
    let mut form = contact_form(ValidationMode::OnSubmit);
    form.change("email", json!("anna@"));
    form.blur("email");
    assert_eq!(form.field_state("email").status, FieldStatus::Unvalidated);
}

#[test]
fn test_blur_without_change_marks_touched_only() {
    let mut form = contact_form(ValidationMode::OnChange);
    form.blur("fornamn");
    assert_eq!(form.touch(), Touch::Touched);
    assert_eq!(form.dirtiness(), Dirtiness::Pristine);
    assert!(!form.field_state("fornamn").is_dirty);
}

// =============================================================================
// Conditional fields
// =============================================================================

#[test]
fn test_discriminant_change_clears_irrelevant_fields() {
    let mut form = contact_form(ValidationMode::OnChange);
    form.change("typ", json!("foretag"));
    form.change("foretag", json!("Mäklarhuset AB"));
    form.change("organisationsnummer", json!("556036-0793"));
    form.change("fornamn", json!("Anna"));

    form.change("typ", json!("privatperson"));
    assert!(form.value("foretag").is_none());
    assert!(form.value("organisationsnummer").is_none());
    assert_eq!(form.value("fornamn"), Some(&json!("Anna")));
    assert_eq!(
        form.field_state("organisationsnummer").status,
        FieldStatus::Unvalidated
    );
}

#[test]
fn test_relevance_follows_contact_kind() {
    let mut form = contact_form(ValidationMode::OnChange);
    assert!(form.should_show("email"));
    assert!(!form.should_show("personnummer"));

    for kind in ContactKind::ALL {
        form.change("typ", json!(kind.as_str()));
        for field in ["fornamn", "efternamn", "personnummer", "foretag", "organisationsnummer"] {
            assert_eq!(form.should_show(field), kind.is_relevant(field), "{kind} {field}");
            assert_eq!(form.is_required(field), kind.is_required(field), "{kind} {field}");
        }
    }
}

// =============================================================================
// Submit
// =============================================================================

#[tokio::test]
async fn test_invalid_submit_skips_handler() {
    let mut form = contact_form(ValidationMode::OnSubmit);
    form.change("typ", json!("privatperson"));
    form.change("email", json!("anna@"));

    let called = AtomicBool::new(false);
    let flag = &called;
    let outcome = form
        .submit(move |_, _| async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected invalid outcome");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["efternamn", "email", "fornamn"]);
    assert!(!called.load(Ordering::SeqCst));

    let state = form.state();
    assert!(!state.is_valid);
    assert!(!state.is_submitting);
    assert_eq!(state.errors.len(), 3);
    assert_eq!(
        form.field_props("fornamn").error.as_deref(),
        Some("Förnamn är obligatoriskt")
    );
    assert_eq!(form.field_state("typ").status, FieldStatus::Valid);
}

#[tokio::test]
async fn test_successful_submit_receives_normalized_draft() {
    let mut form = contact_form(ValidationMode::OnChange);
    fill_individual(&mut form);

    let seen = Arc::new(capture::Slot::default());
    let slot = Arc::clone(&seen);
    let outcome = form
        .submit(move |draft, state| async move {
            slot.put(draft["postnummer"].clone(), state.is_submitting);
            Ok(())
        })
        .await;

    assert!(outcome.is_submitted());
    assert_eq!(seen.take(), Some((json!("111 22"), true)));
    assert!(!form.state().is_submitting);
    assert!(form.state().errors.is_empty());
}

#[tokio::test]
async fn test_failed_handler_yields_top_level_error() {
    let mut form = contact_form(ValidationMode::OnChange);
    fill_individual(&mut form);

    let outcome = form
        .submit(|_, _| async { Err(anyhow::anyhow!("database unavailable")) })
        .await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    let state = form.state();
    assert!(!state.is_submitting);
    assert_eq!(state.errors.len(), 1);
    assert!(state.errors[0].is_top_level());
    assert_eq!(state.errors[0].code, SUBMIT_FAILED_CODE);
    assert_eq!(state.errors[0].message, "Något gick fel vid sparning");
}

#[tokio::test]
async fn test_resubmit_after_fix_clears_field_errors_in_submit_mode() {
    let mut form = contact_form(ValidationMode::OnSubmit);
    form.change("typ", json!("privatperson"));
    form.change("fornamn", json!("Anna"));

    let first = form.submit(|_, _| async { Ok(()) }).await;
    assert!(matches!(first, SubmitOutcome::Invalid(_)));
    assert!(form.field_props("efternamn").aria_invalid);

    form.change("efternamn", json!("Andersson"));
    let second = form.submit(|_, _| async { Ok(()) }).await;
    assert!(second.is_submitted());
    assert!(form.state().is_valid);

    let props = form.field_props("efternamn");
    assert!(props.error.is_none());
    assert!(!props.aria_invalid);
    assert_eq!(form.field_state("efternamn").status, FieldStatus::Valid);
    assert_eq!(form.field_state("fornamn").status, FieldStatus::Valid);
}

#[tokio::test]
async fn test_panicking_handler_leaves_form_idle() {
    let mut form = contact_form(ValidationMode::OnChange);
    fill_individual(&mut form);

    let crash = true;
    let outcome = AssertUnwindSafe(form.submit(move |_, _| async move {
        if crash {
            panic!("handler crashed");
        }
        Ok(())
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err());
    assert_eq!(form.submission(), Submission::Idle);
    assert!(!form.state().is_submitting);
}

#[test]
fn test_reset_restores_defaults() {
    let defaults = json!({"typ": "foretag"}).as_object().cloned().unwrap();
    let mut form = contact_form(ValidationMode::OnChange).with_defaults(defaults);
    form.change("foretag", json!(""));
    assert_eq!(form.dirtiness(), Dirtiness::Dirty);

    form.reset(None);
    assert_eq!(form.value("typ"), Some(&json!("foretag")));
    assert!(form.value("foretag").is_none());
    assert_eq!(form.dirtiness(), Dirtiness::Pristine);
    assert_eq!(form.touch(), Touch::Untouched);
    assert_eq!(form.field_state("foretag"), Default::default());
}

#[test]
fn test_property_form_reports_rule_on_submit_validation() {
    let mut form = entities::property_create(ErrorFormatter::default(), &RefinementPolicy::default());
    for (name, value) in [
        ("typ", json!("villa")),
        ("adress", json!("Storgatan 1")),
        ("postnummer", json!("11122")),
        ("ort", json!("Uppsala")),
        ("kommun", json!("Uppsala")),
        ("lan", json!("Uppsala län")),
        ("maklare_id", json!("0190f7c2-1d2b-7c4e-9f00-1234567890ab")),
        ("boarea", json!(80)),
        ("biarea", json!(100)),
    ] {
        form.change(name, value);
    }

    let errors = form.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field.as_str(), "biarea");
    assert_eq!(errors[0].message, "Boarea kan inte vara mindre än biarea");
    assert_eq!(
        form.field_props("biarea").error.as_deref(),
        Some("Boarea kan inte vara mindre än biarea")
    );
}

mod capture {
    use std::sync::Mutex;

    /// Captures what a submit handler saw.
    #[derive(Default)]
    pub struct Slot(Mutex<Option<(serde_json::Value, bool)>>);

    impl Slot {
        pub fn put(&self, value: serde_json::Value, submitting: bool) {
            *self.0.lock().unwrap() = Some((value, submitting));
        }

        pub fn take(&self) -> Option<(serde_json::Value, bool)> {
            self.0.lock().unwrap().take()
        }
    }
}
