//! Service wiring: one repository per collection, the lifecycle manager and
//! the token issuer, chosen once at startup.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use storefront_auth::{Hs256JwtValidator, JwtClaims, JwtError, RegisterUser, Role, User};
use storefront_catalog::{Category, Product, Store};
use storefront_core::{StoreId, UserId};
use storefront_infra::repository::{connect, ensure_schema};
use storefront_infra::{
    AppConfig, Filter, InMemoryRepository, LifecycleManager, PostgresRepository, Repository,
    RepositoryError,
};
use storefront_promotions::Coupon;
use storefront_sales::Order;

pub struct AppServices {
    pub config: AppConfig,
    pub users: Arc<dyn Repository<User>>,
    pub stores: Arc<dyn Repository<Store>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub products: Arc<dyn Repository<Product>>,
    pub coupons: Arc<dyn Repository<Coupon>>,
    pub orders: Arc<dyn Repository<Order>>,
    pub lifecycle: LifecycleManager,
    pub jwt: Arc<Hs256JwtValidator>,
}

impl AppServices {
    /// Process-local storage; nothing survives a restart.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
        )
    }

    pub fn postgres(config: AppConfig, pool: PgPool) -> Self {
        Self::with_repositories(
            config,
            Arc::new(PostgresRepository::new(pool.clone())),
            Arc::new(PostgresRepository::new(pool.clone())),
            Arc::new(PostgresRepository::new(pool.clone())),
            Arc::new(PostgresRepository::new(pool.clone())),
            Arc::new(PostgresRepository::new(pool.clone())),
            Arc::new(PostgresRepository::new(pool)),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_repositories(
        config: AppConfig,
        users: Arc<dyn Repository<User>>,
        stores: Arc<dyn Repository<Store>>,
        categories: Arc<dyn Repository<Category>>,
        products: Arc<dyn Repository<Product>>,
        coupons: Arc<dyn Repository<Coupon>>,
        orders: Arc<dyn Repository<Order>>,
    ) -> Self {
        let lifecycle = LifecycleManager::new(
            users.clone(),
            stores.clone(),
            products.clone(),
            coupons.clone(),
        );
        let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
        Self {
            config,
            users,
            stores,
            categories,
            products,
            coupons,
            orders,
            lifecycle,
            jwt,
        }
    }

    /// Sign a session token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String, JwtError> {
        let claims = JwtClaims::for_session(
            user.id,
            user.username.clone(),
            user.role,
            Utc::now(),
            self.config.jwt_ttl,
        );
        self.jwt.issue(&claims)
    }

    /// The active store owned by `owner`, approved or not.
    pub async fn store_of(&self, owner: UserId) -> Result<Option<Store>, RepositoryError> {
        self.stores
            .find_one(&Filter::active().eq_id("owner_id", owner))
            .await
    }

    pub async fn live_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        self.stores.find_one(&Filter::live().eq_id("id", id)).await
    }

    /// Create the configured administrator unless an account with that
    /// username or email already exists.
    pub async fn seed_admin(&self) -> anyhow::Result<()> {
        let Some(seed) = self.config.admin.clone() else {
            return Ok(());
        };

        let existing = self
            .users
            .find_one(
                &Filter::active()
                    .any_of("username", seed.username.to_lowercase())
                    .any_of("email", seed.email.to_lowercase()),
            )
            .await?;
        if existing.is_some() {
            info!(username = %seed.username, "admin account already present");
            return Ok(());
        }

        let mut admin = User::register(
            RegisterUser {
                username: seed.username,
                fname: "Store".to_string(),
                lname: "Administrator".to_string(),
                password: seed.password,
                email: seed.email,
                image_url: None,
            },
            Utc::now(),
        )?;
        admin.role = Role::Admin;

        let admin = self.users.insert_one(admin).await?;
        info!(user_id = %admin.id, username = %admin.username, "admin account created");
        Ok(())
    }
}

/// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let services = match config.database_url.clone() {
        Some(url) => {
            let pool = connect(&url).await?;
            ensure_schema(&pool).await?;
            info!("using postgres storage");
            AppServices::postgres(config, pool)
        }
        None => {
            info!("DATABASE_URL not set; using in-memory storage");
            AppServices::in_memory(config)
        }
    };
    services.seed_admin().await?;
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_auth::JwtValidator;
    use storefront_infra::AdminSeed;

    fn config_with_admin() -> AppConfig {
        AppConfig {
            admin: Some(AdminSeed {
                username: "rootadmin".into(),
                email: "root@example.cl".into(),
                password: "admin-pass-1".into(),
            }),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn admin_seed_is_idempotent() {
        let services = AppServices::in_memory(config_with_admin());
        services.seed_admin().await.unwrap();
        services.seed_admin().await.unwrap();

        let admins = services
            .users
            .find(&Filter::active().eq("role", "ADMIN_ROLE"))
            .await
            .unwrap();
        assert_eq!(admins.len(), 1);
        assert!(admins[0].check_password("admin-pass-1"));
    }

    #[tokio::test]
    async fn issued_tokens_validate() {
        let services = AppServices::in_memory(config_with_admin());
        services.seed_admin().await.unwrap();
        let admin = services
            .users
            .find_one(&Filter::live())
            .await
            .unwrap()
            .unwrap();

        let token = services.issue_token(&admin).unwrap();
        let claims = services.jwt.validate(&token, Utc::now()).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, Role::Admin);
    }
}
