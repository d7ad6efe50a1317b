//! Binds each entity to its repository in the [`Datastore`].

use ott_core::pipeline::Pipeline;
use ott_core::repository::{Entity, Repository};
use ott_db::models::banner::Banner;
use ott_db::models::category::Category;
use ott_db::models::enquiry::Enquiry;
use ott_db::models::movie::Movie;
use ott_db::models::package::Package;
use ott_db::models::service::Service;
use ott_db::models::service_booking::ServiceBooking;
use ott_db::models::user::User;
use ott_db::Datastore;

use crate::state::AppState;

/// An entity served over HTTP.
pub trait Resource: Entity {
    fn repository(datastore: &Datastore) -> &dyn Repository<Self>;

    /// Mutation pipeline writing uploads under the configured directory.
    fn pipeline(state: &AppState) -> Pipeline<'_, Self> {
        Pipeline::new(
            Self::repository(&state.datastore),
            state.config.upload.dir.clone(),
        )
    }
}

macro_rules! resource {
    ($entity:ty, $field:ident) => {
        impl Resource for $entity {
            fn repository(datastore: &Datastore) -> &dyn Repository<Self> {
                datastore.$field.as_ref()
            }
        }
    };
}

resource!(Movie, movies);
resource!(Category, categories);
resource!(Banner, banners);
resource!(User, users);
resource!(Service, services);
resource!(Package, packages);
resource!(ServiceBooking, service_bookings);
resource!(Enquiry, enquiries);
