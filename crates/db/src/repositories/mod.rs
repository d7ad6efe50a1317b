//! Postgres repository layer.
//!
//! Each repository holds a pool handle and implements
//! [`Repository`](ott_core::repository::Repository) for its entity.

mod common;

pub mod admin_repo;
pub mod banner_repo;
pub mod category_repo;
pub mod enquiry_repo;
pub mod movie_repo;
pub mod package_repo;
pub mod service_booking_repo;
pub mod service_repo;
pub mod user_repo;

pub use admin_repo::AdminRepo;
pub use banner_repo::BannerRepo;
pub use category_repo::CategoryRepo;
pub use enquiry_repo::EnquiryRepo;
pub use movie_repo::MovieRepo;
pub use package_repo::PackageRepo;
pub use service_booking_repo::ServiceBookingRepo;
pub use service_repo::ServiceRepo;
pub use user_repo::UserRepo;
