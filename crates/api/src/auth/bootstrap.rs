//! Startup creation of the configured admin account.

use ott_core::error::CoreError;
use ott_core::password::hash_password;
use ott_db::Datastore;

use crate::config::AdminBootstrap;

/// Create the admin unless one with the same email exists. Running this on
/// every start is safe; an existing admin keeps its password.
pub async fn ensure_admin(
    datastore: &Datastore,
    bootstrap: &AdminBootstrap,
) -> Result<bool, CoreError> {
    if datastore
        .admins
        .find_credentials(&bootstrap.email)
        .await?
        .is_some()
    {
        tracing::info!(email = %bootstrap.email, "Admin already exists");
        return Ok(false);
    }
    let hash = hash_password(&bootstrap.password)?;
    let created = datastore.admins.ensure(&bootstrap.email, &hash).await?;
    if created {
        tracing::info!(email = %bootstrap.email, "Admin created");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use ott_core::password::verify_password;

    use super::*;

    #[tokio::test]
    async fn second_run_keeps_the_first_password() {
        let datastore = Datastore::memory();
        let first = AdminBootstrap {
            email: "admin@example.com".into(),
            password: "first-secret".into(),
        };
        assert!(ensure_admin(&datastore, &first).await.unwrap());

        let second = AdminBootstrap {
            password: "second-secret".into(),
            ..first.clone()
        };
        assert!(!ensure_admin(&datastore, &second).await.unwrap());

        let creds = datastore
            .admins
            .find_credentials("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("first-secret", &creds.password_hash).unwrap());
    }
}
