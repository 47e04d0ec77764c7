//! Identifier newtypes shared by every parking-rules module.
//!
//! The host game addresses buildings, vehicles, parked vehicles and citizens
//! through separate index spaces, so each gets its own type to keep them from
//! being mixed up at the collaborator boundary.

use std::fmt;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            Encode, Decode,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

id_type!(
    /// A building, which may carry a parking rule and own a parking lot.
    BuildingId,
    "building"
);
id_type!(
    /// A moving vehicle (the requester of a parking search).
    VehicleId,
    "vehicle"
);
id_type!(
    /// A vehicle currently parked on a lot.
    ParkedVehicleId,
    "parked"
);
id_type!(
    /// A citizen: vehicle owner, driver or search requester.
    CitizenId,
    "citizen"
);
