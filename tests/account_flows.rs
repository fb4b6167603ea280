mod common;

use account_forms::domain::password::verify_password;
use account_forms::domain::repositories::UserRepository;
use account_forms::forms::{
    ForgotForm, LoginForm, PasswordForm, ProfileForm, ResetPwdForm, UserAdminForm, messages_for,
};
use account_forms::utils::avatar::encode_md5;
use account_forms::AppError;

fn field_messages(err: &AppError, field: &str) -> Vec<String> {
    messages_for(err.form_errors().expect("form errors"), field)
}

// ─── REGISTER ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_then_duplicate() {
    let (repo, service) = common::create_test_service();

    let user = common::register_user(&service, "alice", "alice@example.com", "abcd").await;
    assert!(!user.is_active);
    assert_eq!(user.gr_email, encode_md5("alice@example.com"));

    let err = service
        .register(&mut common::register_form("alice", "alice@example.com", "abcd"))
        .await
        .unwrap_err();

    assert_eq!(
        field_messages(&err, "user_name"),
        vec!["auth.username_already_taken"]
    );
    assert_eq!(
        field_messages(&err, "email"),
        vec!["auth.email_already_taken"]
    );
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_register_email_taken_only() {
    let (_repo, service) = common::create_test_service();
    common::register_user(&service, "alice", "alice@example.com", "abcd").await;

    let err = service
        .register(&mut common::register_form("alice2", "alice@example.com", "abcd"))
        .await
        .unwrap_err();

    assert!(field_messages(&err, "user_name").is_empty());
    assert_eq!(
        field_messages(&err, "email"),
        vec!["auth.email_already_taken"]
    );
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let (repo, service) = common::create_test_service();
    let mut form = common::register_form("alice", "alice@example.com", "abcd");
    form.password_re = "abce".to_string();

    let err = service.register(&mut form).await.unwrap_err();

    assert_eq!(
        field_messages(&err, "password_re"),
        vec!["auth.repassword_not_match"]
    );
    assert!(repo.is_empty().await);
}

// ─── LOGIN ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_by_name_and_email() {
    let (_repo, service) = common::create_test_service();
    let alice = common::register_user(&service, "alice", "alice@example.com", "secret").await;

    for login in ["alice", "alice@example.com"] {
        let mut form = LoginForm {
            user_name: login.to_string(),
            password: "secret".to_string(),
            remember: true,
        };
        assert_eq!(service.login(&mut form).await.unwrap().id, alice.id);
    }

    let mut form = LoginForm {
        user_name: "alice".to_string(),
        password: "wrong".to_string(),
        remember: false,
    };
    assert!(matches!(
        service.login(&mut form).await.unwrap_err(),
        AppError::Unauthorized { .. }
    ));
}

// ─── FORGOT / RESET ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let (repo, service) = common::create_test_service();
    common::register_user(&service, "alice", "alice@example.com", "abcd").await;

    let mut forgot = ForgotForm {
        email: "nobody@example.com".to_string(),
        user: None,
    };
    let err = service.forgot(&mut forgot).await.unwrap_err();
    assert_eq!(
        field_messages(&err, "email"),
        vec!["auth.forgotform_wrong_email"]
    );

    let mut forgot = ForgotForm {
        email: "alice@example.com".to_string(),
        user: None,
    };
    let mut user = service.forgot(&mut forgot).await.unwrap();

    let mut reset = ResetPwdForm {
        password: "newpass".to_string(),
        password_re: "newpass".to_string(),
    };
    service.reset_password(&mut user, &mut reset).await.unwrap();

    let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.is_active);
    assert!(verify_password("newpass", &stored.password));
}

// ─── PASSWORD CHANGE ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_change_password() {
    let (repo, service) = common::create_test_service();
    let mut user = common::register_user(&service, "alice", "alice@example.com", "abcd").await;

    let mut form = PasswordForm {
        password_old: "wxyz".to_string(),
        password: "efgh".to_string(),
        password_re: "efgh".to_string(),
        user: None,
    };
    let err = service.change_password(&mut user, &mut form).await.unwrap_err();
    assert_eq!(
        field_messages(&err, "password_old"),
        vec!["auth.old_password_wrong"]
    );

    let mut form = PasswordForm {
        password_old: "abcd".to_string(),
        password: "efgh".to_string(),
        password_re: "efgh".to_string(),
        user: None,
    };
    service.change_password(&mut user, &mut form).await.unwrap();

    let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(verify_password("efgh", &stored.password));
}

// ─── PROFILE ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_profile_email_change_deactivates() {
    let (repo, service) = common::create_test_service();
    let mut user = common::register_user(&service, "alice", "alice@example.com", "abcd").await;
    let mut reset = ResetPwdForm {
        password: "abcd".to_string(),
        password_re: "abcd".to_string(),
    };
    service.reset_password(&mut user, &mut reset).await.unwrap();
    assert!(user.is_active);

    let mut form = ProfileForm::default();
    form.set_from_user(&user);
    form.email = "alice@new.example.com".to_string();
    form.gr_email = "avatar@example.com".to_string();
    form.info = "Hello".to_string();

    service.update_profile(&mut user, &mut form).await.unwrap();

    let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.email, "alice@new.example.com");
    assert_eq!(stored.gr_email, encode_md5("avatar@example.com"));
    assert_eq!(stored.info, "Hello");
}

#[tokio::test]
async fn test_profile_rejects_long_info() {
    let (repo, service) = common::create_test_service();
    let mut user = common::register_user(&service, "alice", "alice@example.com", "abcd").await;

    let mut form = ProfileForm::default();
    form.set_from_user(&user);
    form.info = "x".repeat(256);

    let err = service.update_profile(&mut user, &mut form).await.unwrap_err();

    assert_eq!(field_messages(&err, "info"), vec!["valid.max_size"]);
    let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.info.is_empty());
}

// ─── ADMIN ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_admin_edit_keeps_own_values_but_rejects_others() {
    let (repo, service) = common::create_test_service();
    let alice = common::register_user(&service, "alice", "alice@example.com", "abcd").await;
    let bobby = common::register_user(&service, "bobby", "bobby@example.com", "abcd").await;

    let mut form = UserAdminForm::default();
    form.set_from_user(&alice);
    form.is_admin = true;
    let saved = service.save_user_admin(&mut form).await.unwrap();
    assert!(saved.is_admin);

    let mut form = UserAdminForm::default();
    form.set_from_user(&alice);
    form.user_name = bobby.user_name.clone();
    let err = service.save_user_admin(&mut form).await.unwrap_err();
    assert_eq!(
        field_messages(&err, "user_name"),
        vec!["auth.username_already_taken"]
    );

    let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.user_name, "alice");
    assert!(stored.is_admin);
}

#[tokio::test]
async fn test_admin_create() {
    let (repo, service) = common::create_test_service();

    let mut form = UserAdminForm {
        create: true,
        user_name: "carol".to_string(),
        email: "carol@example.com".to_string(),
        nick_name: "Carol".to_string(),
        gr_email: "carol@example.com".to_string(),
        is_active: true,
        ..Default::default()
    };
    let user = service.save_user_admin(&mut form).await.unwrap();

    assert!(user.is_active);
    assert!(user.password.is_empty());
    assert_eq!(repo.len().await, 1);
}
