//! The repositories the API works against, bundled into one handle.

use std::sync::Arc;

use ott_core::error::CoreError;
use ott_core::repository::{AccountRepository, AdminRepository, Repository};

use crate::memory::MemoryStore;
use crate::models::banner::Banner;
use crate::models::category::Category;
use crate::models::enquiry::Enquiry;
use crate::models::movie::Movie;
use crate::models::package::Package;
use crate::models::service::Service;
use crate::models::service_booking::ServiceBooking;
use crate::models::user::User;
use crate::repositories::{
    AdminRepo, BannerRepo, CategoryRepo, EnquiryRepo, MovieRepo, PackageRepo,
    ServiceBookingRepo, ServiceRepo, UserRepo,
};
use crate::DbPool;

#[derive(Clone)]
enum Backend {
    Postgres(DbPool),
    Memory,
}

/// One repository per entity plus account lookups. Cheap to clone.
#[derive(Clone)]
pub struct Datastore {
    pub movies: Arc<dyn Repository<Movie>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub banners: Arc<dyn Repository<Banner>>,
    pub users: Arc<dyn Repository<User>>,
    pub services: Arc<dyn Repository<Service>>,
    pub packages: Arc<dyn Repository<Package>>,
    pub service_bookings: Arc<dyn Repository<ServiceBooking>>,
    pub enquiries: Arc<dyn Repository<Enquiry>>,
    pub user_accounts: Arc<dyn AccountRepository>,
    pub admins: Arc<dyn AdminRepository>,
    backend: Backend,
}

impl Datastore {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: DbPool) -> Self {
        let users = Arc::new(UserRepo::new(pool.clone()));
        Self {
            movies: Arc::new(MovieRepo::new(pool.clone())),
            categories: Arc::new(CategoryRepo::new(pool.clone())),
            banners: Arc::new(BannerRepo::new(pool.clone())),
            users: users.clone(),
            services: Arc::new(ServiceRepo::new(pool.clone())),
            packages: Arc::new(PackageRepo::new(pool.clone())),
            service_bookings: Arc::new(ServiceBookingRepo::new(pool.clone())),
            enquiries: Arc::new(EnquiryRepo::new(pool.clone())),
            user_accounts: users,
            admins: Arc::new(AdminRepo::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// Repositories backed by a fresh in-process store.
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        let users = Arc::new(store.repo::<User>());
        Self {
            movies: Arc::new(store.repo::<Movie>()),
            categories: Arc::new(store.repo::<Category>()),
            banners: Arc::new(store.repo::<Banner>()),
            users: users.clone(),
            services: Arc::new(store.repo::<Service>()),
            packages: Arc::new(store.repo::<Package>()),
            service_bookings: Arc::new(store.repo::<ServiceBooking>()),
            enquiries: Arc::new(store.repo::<Enquiry>()),
            user_accounts: users,
            admins: Arc::new(store.admins()),
            backend: Backend::Memory,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self.backend, Backend::Memory)
    }

    pub async fn health_check(&self) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Postgres(pool) => crate::health_check(pool).await.map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                CoreError::Internal("Database unreachable".into())
            }),
            Backend::Memory => Ok(()),
        }
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        if let Backend::Postgres(pool) = &self.backend {
            pool.close().await;
        }
    }
}
