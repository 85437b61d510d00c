use crate::{
    config::BootstrapConfig,
    domain::User,
    error::Result,
    service::user_service::UserService,
};

/// Creates the configured administrator when the portal has none yet.
pub async fn ensure_default_admin(users: &UserService, config: &BootstrapConfig) -> Result<Option<User>> {
    if !config.seed_default_admin {
        return Ok(None);
    }

    if users.count_admins().await? > 0 {
        tracing::debug!("Administrator already present, skipping bootstrap");
        return Ok(None);
    }

    let admin = users
        .create_admin(&config.admin_email, &config.admin_password, &config.admin_name)
        .await?;

    tracing::warn!(
        "Created default administrator {}. Change its password after first login.",
        admin.email
    );

    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::AuthService,
        integrations::IntegrationManager,
        service::ServiceContext,
    };
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn context() -> anyhow::Result<ServiceContext> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let auth = Arc::new(AuthService::new(pool.clone(), 24));
        Ok(ServiceContext::new(pool, Arc::new(IntegrationManager::new()), auth))
    }

    #[tokio::test]
    async fn test_creates_admin_once() -> anyhow::Result<()> {
        let ctx = context().await?;
        let config = BootstrapConfig {
            seed_default_admin: true,
            ..BootstrapConfig::default()
        };

        let created = ensure_default_admin(&ctx.user_service, &config).await?;
        assert!(created.is_some());

        let again = ensure_default_admin(&ctx.user_service, &config).await?;
        assert!(again.is_none());
        assert_eq!(ctx.user_service.count_admins().await?, 1);

        let admin = ctx
            .user_service
            .authenticate(&config.admin_email, &config.admin_password)
            .await?;
        assert!(admin.is_admin());

        Ok(())
    }

    #[tokio::test]
    async fn test_disabled_bootstrap_does_nothing() -> anyhow::Result<()> {
        let ctx = context().await?;

        let created = ensure_default_admin(&ctx.user_service, &BootstrapConfig::default()).await?;
        assert!(created.is_none());
        assert_eq!(ctx.user_service.count_admins().await?, 0);

        Ok(())
    }
}
