//! Collaborator contracts between the engine and the host game.
//!
//! The engine never touches game state directly. Everything it needs to know
//! about buildings, vehicles and citizens, and every side effect it performs
//! on parked vehicles, goes through these traits. All calls are expected to
//! be non-blocking and are made from the simulation tick thread, except the
//! lookups the candidate filter performs, which may run on path-finding
//! worker threads.

use std::sync::Arc;

use bevy::math::Vec3;

use crate::ids::{BuildingId, CitizenId, ParkedVehicleId, VehicleId};

/// What the host knows about one parked vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParkedVehicleInfo {
    pub owner: CitizenId,
    pub home_building: Option<BuildingId>,
    pub position: Vec3,
}

/// The roles a citizen plays relative to a parking decision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CitizenRoles {
    pub is_visitor: bool,
    pub home_position: Option<Vec3>,
    pub work_position: Option<Vec3>,
}

/// Spatial and world queries answered by the host game, plus the eviction
/// action.
pub trait ParkingGameAccess: Send + Sync {
    /// Owner, home and position of a parked vehicle, or `None` if the id no
    /// longer refers to a live parked vehicle.
    fn resolve_parked_vehicle(&self, vehicle: ParkedVehicleId) -> Option<ParkedVehicleInfo>;

    /// Ordered ids of every vehicle currently parked on the building's lot.
    fn collect_parked_vehicles_on_lot(&self, building: BuildingId) -> Vec<ParkedVehicleId>;

    fn resolve_citizen_roles(&self, citizen: CitizenId) -> Option<CitizenRoles>;

    /// The citizen driving a moving vehicle.
    fn resolve_vehicle_driver(&self, vehicle: VehicleId) -> Option<CitizenId>;

    /// Only private passenger cars are subject to parking rules.
    fn is_passenger_vehicle(&self, vehicle: VehicleId) -> bool;

    fn building_position(&self, building: BuildingId) -> Option<Vec3>;

    /// The lot building whose parking spaces contain `position`, if any.
    fn lot_at_position(&self, position: Vec3) -> Option<BuildingId>;

    /// Remove a parked vehicle from the world. Fire and forget.
    fn release_parked_vehicle(&self, vehicle: ParkedVehicleId);
}

/// Lets the host share one adapter between the tick system and worker
/// threads.
impl<T: ParkingGameAccess + ?Sized> ParkingGameAccess for Arc<T> {
    fn resolve_parked_vehicle(&self, vehicle: ParkedVehicleId) -> Option<ParkedVehicleInfo> {
        (**self).resolve_parked_vehicle(vehicle)
    }

    fn collect_parked_vehicles_on_lot(&self, building: BuildingId) -> Vec<ParkedVehicleId> {
        (**self).collect_parked_vehicles_on_lot(building)
    }

    fn resolve_citizen_roles(&self, citizen: CitizenId) -> Option<CitizenRoles> {
        (**self).resolve_citizen_roles(citizen)
    }

    fn resolve_vehicle_driver(&self, vehicle: VehicleId) -> Option<CitizenId> {
        (**self).resolve_vehicle_driver(vehicle)
    }

    fn is_passenger_vehicle(&self, vehicle: VehicleId) -> bool {
        (**self).is_passenger_vehicle(vehicle)
    }

    fn building_position(&self, building: BuildingId) -> Option<Vec3> {
        (**self).building_position(building)
    }

    fn lot_at_position(&self, position: Vec3) -> Option<BuildingId> {
        (**self).lot_at_position(position)
    }

    fn release_parked_vehicle(&self, vehicle: ParkedVehicleId) {
        (**self).release_parked_vehicle(vehicle)
    }
}

/// Optional traffic-management integration able to move a parked vehicle to
/// another legal spot.
///
/// Bound once when the runtime is created. When the integration is absent the
/// runtime binds `NoRelocation` and denied vehicles are evicted instead.
pub trait RelocationIntegration: Send + Sync {
    fn name(&self) -> &str;

    fn try_relocate_parked_vehicle(
        &self,
        vehicle: ParkedVehicleId,
        owner: CitizenId,
        home_building: Option<BuildingId>,
        reference_position: Vec3,
        max_distance: f32,
    ) -> bool;
}

/// Null adapter used when no relocation integration is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelocation;

impl RelocationIntegration for NoRelocation {
    fn name(&self) -> &str {
        "none"
    }

    fn try_relocate_parked_vehicle(
        &self,
        _vehicle: ParkedVehicleId,
        _owner: CitizenId,
        _home_building: Option<BuildingId>,
        _reference_position: Vec3,
        _max_distance: f32,
    ) -> bool {
        false
    }
}
