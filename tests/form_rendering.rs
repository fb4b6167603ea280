mod common;

use account_forms::forms::{
    FieldText, Form, LoginForm, ProfileForm, RegisterForm, check_fields, manifest, render_errors,
};
use account_forms::i18n::Translator;

#[test]
fn test_register_manifest_in_english() {
    let locale = common::locale("en-US");
    let meta = manifest(&RegisterForm::default(), &locale);

    let names: Vec<_> = meta.iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["user_name", "email", "password", "password_re"]);

    assert_eq!(meta[0].label.as_deref(), Some("Username"));
    assert_eq!(
        meta[0].help.as_deref(),
        Some("Minimum length is 5, only contains a-z 0-9 - _")
    );
    assert_eq!(meta[3].label.as_deref(), Some("Retype password"));
    assert!(meta.iter().all(|m| m.required));
}

#[test]
fn test_profile_help_and_select_data() {
    let locale = common::locale("en-US");
    let form = ProfileForm::default();

    assert_eq!(
        form.helps(&locale)["info"],
        FieldText::Text("Max-length is 255".to_string())
    );

    let adds = form.lang_adds_select_data(&locale);
    assert_eq!(adds[0].label, "All languages");
    assert_eq!(adds[0].value, "-1");
    assert_eq!(adds[1].label, "en-US");
    assert_eq!(adds[2].label, "zh-CN");
}

#[test]
fn test_unknown_language_falls_back() {
    let locale = common::locale("fr-FR");
    assert_eq!(locale.lang(), "en-US");
}

#[test]
fn test_rendered_errors_are_localized() {
    let form = LoginForm::default();
    let errors = check_fields(&form);

    let en = render_errors(&errors, &common::locale("en-US"));
    assert_eq!(en["user_name"], vec!["Can not be empty"]);
    assert_eq!(en["password"], vec!["Can not be empty"]);
    assert!(!en.contains_key("remember"));

    let zh = render_errors(&errors, &common::locale("zh-CN"));
    assert_ne!(zh["user_name"], en["user_name"]);
}

#[test]
fn test_size_errors_interpolate_limit() {
    let form = RegisterForm {
        user_name: "abc".to_string(),
        email: "alice@example.com".to_string(),
        password: "abcd".to_string(),
        password_re: "abcd".to_string(),
    };
    let errors = check_fields(&form);

    let en = render_errors(&errors, &common::locale("en-US"));
    assert_eq!(en["user_name"], vec!["Minimum size is 5"]);
}
