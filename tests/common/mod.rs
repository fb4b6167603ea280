#![allow(dead_code)]

use account_forms::application::services::AccountService;
use account_forms::domain::entities::User;
use account_forms::forms::RegisterForm;
use account_forms::i18n::{Catalog, Locale};
use account_forms::infrastructure::persistence::MemoryUserRepository;
use std::sync::Arc;

pub type TestService = AccountService<MemoryUserRepository>;

pub fn create_test_service() -> (Arc<MemoryUserRepository>, TestService) {
    let repo = Arc::new(MemoryUserRepository::new());
    let service = AccountService::new(Arc::clone(&repo));
    (repo, service)
}

pub fn bundled_catalog() -> Arc<Catalog> {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/locales");
    let langs = vec!["en-US".to_string(), "zh-CN".to_string()];
    Arc::new(Catalog::from_dir(dir, &langs).unwrap())
}

pub fn locale(lang: &str) -> Locale {
    bundled_catalog().locale(lang)
}

pub fn register_form(user_name: &str, email: &str, password: &str) -> RegisterForm {
    RegisterForm {
        user_name: user_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        password_re: password.to_string(),
    }
}

pub async fn register_user(service: &TestService, user_name: &str, email: &str, password: &str) -> User {
    service
        .register(&mut register_form(user_name, email, password))
        .await
        .unwrap()
}
