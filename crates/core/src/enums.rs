//! Text-backed enums for enumerated entity columns.
//!
//! Each enum is stored as `TEXT` (guarded by a `CHECK` constraint in the
//! migrations) and serialized as its upper-case name. The `VALUES` slice is
//! what the schema validator uses for its `one_of` checks, so the two cannot
//! drift apart.

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every accepted textual value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            /// The stored / serialized representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} '{other}'. Must be one of: {:?}",
                        stringify!($name),
                        Self::VALUES
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Account state of an end user.
    UserStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Blocked => "BLOCKED",
    }
}

define_text_enum! {
    /// Publication state of a movie.
    MovieStatus {
        Published => "PUBLISHED",
        Pending => "PENDING",
    }
}

define_text_enum! {
    /// Where a movie's video comes from.
    VideoSource {
        /// A file uploaded alongside the movie.
        Upload => "UPLOAD",
        /// An external URL.
        Link => "LINK",
    }
}

define_text_enum! {
    /// How a service booking is paid for.
    PaymentType {
        Online => "ONLINE",
        Cash => "CASH",
    }
}

define_text_enum! {
    /// Lifecycle of a service booking. Any transition is allowed.
    BookingStatus {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}
