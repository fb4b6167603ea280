//! Account use cases: each runs a form through validation, then persists the outcome.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::domain::entities::{NewUser, User, UserField};
use crate::domain::password::{hash_password, verify_password};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::forms::{
    ForgotForm, LoginForm, PasswordForm, ProfileForm, RegisterForm, ResetPwdForm, UserAdminForm,
    validate,
};
use crate::utils::avatar::encode_md5;

/// Service for the account flows behind the user-facing forms.
///
/// Form validation (field rules and cross-field checks) always runs before
/// anything is written.
pub struct AccountService<R: UserRepository> {
    users: Arc<R>,
}

impl<R: UserRepository> AccountService<R> {
    /// Creates a new account service.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }

    /// Registers a new, not yet activated account.
    ///
    /// The nick name starts out as the user name and the gravatar key as the
    /// MD5 of the email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if the form is rejected.
    /// Returns [`AppError::Conflict`] if the name or email was claimed concurrently.
    pub async fn register(&self, form: &mut RegisterForm) -> Result<User, AppError> {
        validate(form, self.users.as_ref()).await?;

        let new_user = NewUser {
            user_name: form.user_name.clone(),
            nick_name: form.user_name.clone(),
            email: form.email.clone(),
            password: hash_password(&form.password)?,
            gr_email: encode_md5(&form.email),
            lang_adds: -1,
            ..Default::default()
        };

        let user = self.users.create(new_user).await?;
        info!("Registered user {} ({})", user.user_name, user.id);
        Ok(user)
    }

    /// Signs in with a user name or email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if a field is empty.
    /// Returns [`AppError::Unauthorized`] if the account is unknown, the
    /// password does not verify, or the account is forbidden.
    pub async fn login(&self, form: &mut LoginForm) -> Result<User, AppError> {
        validate(form, self.users.as_ref()).await?;

        let Some(user) = self.users.find_by_login(&form.user_name).await? else {
            debug!("Login for unknown account '{}'", form.user_name);
            return Err(AppError::unauthorized(
                "Invalid credentials",
                json!({ "reason": "Unknown user name or email" }),
            ));
        };

        if !verify_password(&form.password, &user.password) {
            debug!("Wrong password for user {}", user.id);
            return Err(AppError::unauthorized(
                "Invalid credentials",
                json!({ "reason": "Wrong password" }),
            ));
        }

        if !user.can_login() {
            return Err(AppError::unauthorized(
                "Account is forbidden",
                json!({ "user_id": user.id }),
            ));
        }

        info!("User {} signed in", user.id);
        Ok(user)
    }

    /// Resolves the account behind a forgotten-password request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if the email is malformed or unknown.
    pub async fn forgot(&self, form: &mut ForgotForm) -> Result<User, AppError> {
        validate(form, self.users.as_ref()).await?;

        form.user.take().ok_or_else(|| {
            AppError::internal(
                "Forgot form passed without a matched user",
                json!({ "email": form.email }),
            )
        })
    }

    /// Stores a new password from a reset link and reactivates the account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if the passwords are rejected.
    pub async fn reset_password(
        &self,
        user: &mut User,
        form: &mut ResetPwdForm,
    ) -> Result<(), AppError> {
        validate(form, self.users.as_ref()).await?;

        user.password = hash_password(&form.password)?;
        user.is_active = true;
        self.users
            .update(user, &[UserField::Password, UserField::IsActive])
            .await?;

        info!("Password reset for user {}", user.id);
        Ok(())
    }

    /// Changes a signed-in user's password after checking the old one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if the confirmation differs or the
    /// old password is wrong.
    pub async fn change_password(
        &self,
        user: &mut User,
        form: &mut PasswordForm,
    ) -> Result<(), AppError> {
        form.user = Some(user.clone());
        validate(form, self.users.as_ref()).await?;

        user.password = hash_password(&form.password)?;
        self.users.update(user, &[UserField::Password]).await?;

        info!("Password changed for user {}", user.id);
        Ok(())
    }

    /// Saves profile settings. A changed email deactivates the account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if the form is rejected.
    pub async fn update_profile(
        &self,
        user: &mut User,
        form: &mut ProfileForm,
    ) -> Result<(), AppError> {
        validate(form, self.users.as_ref()).await?;

        let was_active = user.is_active;
        form.save_user_profile(user, self.users.as_ref()).await?;

        if was_active && !user.is_active {
            info!("User {} changed email, awaiting confirmation", user.id);
        }
        Ok(())
    }

    /// Creates or edits an account from the admin editor.
    ///
    /// Edits persist only the fields that actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidForm`] if the form is rejected.
    /// Returns [`AppError::NotFound`] if the edited account does not exist.
    pub async fn save_user_admin(&self, form: &mut UserAdminForm) -> Result<User, AppError> {
        validate(form, self.users.as_ref()).await?;

        if form.create {
            let user = self.users.create(form.to_new_user()).await?;
            info!("Admin created user {} ({})", user.user_name, user.id);
            return Ok(user);
        }

        let mut user = self.find_by_id(form.id).await?;
        let changes = form.changes(&user);
        form.set_to_user(&mut user);

        if changes.is_empty() {
            debug!("Admin edit of user {} changed nothing", user.id);
        } else {
            self.users.update(&user, &changes).await?;
            info!("Admin updated user {}: {:?}", user.id, changes);
        }

        Ok(user)
    }

    /// Looks up an account by numeric id, email or user name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing matches.
    pub async fn find_user(&self, key: &str) -> Result<User, AppError> {
        if let Ok(id) = key.parse::<i64>() {
            return self.find_by_id(id).await;
        }

        self.users.find_by_login(key).await?.ok_or_else(|| {
            AppError::not_found("User not found", json!({ "login": key }))
        })
    }

    /// Lists accounts ordered by id.
    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        self.users.list(limit, offset).await
    }

    async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }
}
