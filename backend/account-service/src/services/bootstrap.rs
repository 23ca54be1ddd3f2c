/// Initial administrator seeding
use super::AdminService;
use crate::config::BootstrapSettings;
use crate::error::{AccountError, Result};
use crate::models::ADMIN_ROLE;
use crate::validators::{mask_email, validate_email, validate_username};
use tracing::info;

/// Create the bootstrap admin unless seeding is disabled or the account exists
///
/// Returns whether a user was created.
pub async fn seed_admin(admin: &AdminService, settings: &BootstrapSettings) -> Result<bool> {
    let Some(password) = settings.password.as_deref() else {
        info!("ADMIN_BOOTSTRAP_PASSWORD not set; skipping admin seeding");
        return Ok(false);
    };

    // Bootstrap values come from the environment and skip request validation
    if !validate_username(&settings.username) {
        return Err(AccountError::invalid_field(
            "username",
            "ADMIN_BOOTSTRAP_USERNAME is not a valid username",
        ));
    }
    if !validate_email(&settings.email) {
        return Err(AccountError::invalid_field(
            "email",
            "ADMIN_BOOTSTRAP_EMAIL is not a valid email address",
        ));
    }

    match admin
        .create_user(&settings.username, &settings.email, password, Some(ADMIN_ROLE))
        .await
    {
        Ok(user) => {
            info!(
                user_id = user.id,
                email = %mask_email(&user.email),
                "Bootstrap admin created"
            );
            Ok(true)
        }
        Err(AccountError::DuplicateUsername | AccountError::DuplicateEmail) => {
            info!(username = %settings.username, "Bootstrap admin already present");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
