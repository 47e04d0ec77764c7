//! # FakeCity: in-memory host for exercising the parking-rules engine
//!
//! Implements the collaborator traits over plain maps so tests and benches
//! can set up buildings, citizens and parked vehicles with builder calls and
//! then inspect which vehicles were relocated or released.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use bevy::math::Vec3;

use crate::game_access::{CitizenRoles, ParkedVehicleInfo, ParkingGameAccess, RelocationIntegration};
use crate::ids::{BuildingId, CitizenId, ParkedVehicleId, VehicleId};

/// Lot footprint used by `lot_at_position`: a vehicle within this many
/// meters of a building's position is on that building's lot.
pub const LOT_FOOTPRINT_METERS: f32 = 20.0;

#[derive(Default)]
pub struct FakeCity {
    buildings: HashMap<BuildingId, Vec3>,
    citizens: HashMap<CitizenId, CitizenRoles>,
    drivers: HashMap<VehicleId, CitizenId>,
    service_vehicles: HashSet<VehicleId>,
    parked: Mutex<HashMap<ParkedVehicleId, ParkedVehicleInfo>>,
    lots: Mutex<HashMap<BuildingId, Vec<ParkedVehicleId>>>,
    unresolvable: HashSet<ParkedVehicleId>,
    released: Mutex<Vec<ParkedVehicleId>>,
}

impl FakeCity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_building(mut self, id: u32, position: Vec3) -> Self {
        self.buildings.insert(BuildingId(id), position);
        self
    }

    /// A resident with optional home and work positions.
    pub fn with_citizen(mut self, id: u32, home: Option<Vec3>, work: Option<Vec3>) -> Self {
        self.citizens.insert(
            CitizenId(id),
            CitizenRoles {
                is_visitor: false,
                home_position: home,
                work_position: work,
            },
        );
        self
    }

    pub fn with_visitor(mut self, id: u32) -> Self {
        self.citizens.insert(
            CitizenId(id),
            CitizenRoles {
                is_visitor: true,
                home_position: None,
                work_position: None,
            },
        );
        self
    }

    pub fn with_driver(mut self, vehicle: u32, citizen: u32) -> Self {
        self.drivers.insert(VehicleId(vehicle), CitizenId(citizen));
        self
    }

    pub fn with_service_vehicle(mut self, vehicle: u32) -> Self {
        self.service_vehicles.insert(VehicleId(vehicle));
        self
    }

    /// Park a vehicle owned by `owner` on `lot`, at the lot's position.
    pub fn with_parked(self, vehicle: u32, owner: u32, lot: u32) -> Self {
        let position = self
            .buildings
            .get(&BuildingId(lot))
            .copied()
            .unwrap_or(Vec3::ZERO);
        self.with_parked_at(vehicle, owner, lot, position)
    }

    /// Park a vehicle on `lot` at an explicit position, e.g. a space away
    /// from the building's anchor point.
    pub fn with_parked_at(self, vehicle: u32, owner: u32, lot: u32, position: Vec3) -> Self {
        self.park_at(vehicle, owner, lot, position);
        self
    }

    /// Park a vehicle after the city was built, as the host would mid-session.
    pub fn park_later(&self, vehicle: u32, owner: u32, lot: u32) {
        let position = self
            .buildings
            .get(&BuildingId(lot))
            .copied()
            .unwrap_or(Vec3::ZERO);
        self.park_at(vehicle, owner, lot, position);
    }

    fn park_at(&self, vehicle: u32, owner: u32, lot: u32, position: Vec3) {
        self.parked.lock().unwrap().insert(
            ParkedVehicleId(vehicle),
            ParkedVehicleInfo {
                owner: CitizenId(owner),
                home_building: None,
                position,
            },
        );
        self.lots
            .lock()
            .unwrap()
            .entry(BuildingId(lot))
            .or_default()
            .push(ParkedVehicleId(vehicle));
    }

    /// Keep the vehicle listed on its lot but make it fail resolution.
    pub fn with_unresolvable(mut self, vehicle: u32) -> Self {
        self.unresolvable.insert(ParkedVehicleId(vehicle));
        self
    }

    /// Park `count` vehicles with consecutive ids starting at `first`, all
    /// owned by `owner`.
    pub fn with_parked_many(mut self, first: u32, count: u32, owner: u32, lot: u32) -> Self {
        for id in first..first + count {
            self = self.with_parked(id, owner, lot);
        }
        self
    }

    pub fn released(&self) -> Vec<ParkedVehicleId> {
        self.released.lock().unwrap().clone()
    }

    fn is_released(&self, vehicle: ParkedVehicleId) -> bool {
        self.released.lock().unwrap().contains(&vehicle)
    }
}

impl ParkingGameAccess for FakeCity {
    fn resolve_parked_vehicle(&self, vehicle: ParkedVehicleId) -> Option<ParkedVehicleInfo> {
        if self.unresolvable.contains(&vehicle) || self.is_released(vehicle) {
            return None;
        }
        self.parked.lock().unwrap().get(&vehicle).copied()
    }

    fn collect_parked_vehicles_on_lot(&self, building: BuildingId) -> Vec<ParkedVehicleId> {
        let released = self.released.lock().unwrap();
        let lots = self.lots.lock().unwrap();
        let on_lot = lots.get(&building).map(Vec::as_slice).unwrap_or_default();
        on_lot
            .iter()
            .copied()
            .filter(|id| !released.contains(id))
            .collect()
    }

    fn resolve_citizen_roles(&self, citizen: CitizenId) -> Option<CitizenRoles> {
        self.citizens.get(&citizen).copied()
    }

    fn resolve_vehicle_driver(&self, vehicle: VehicleId) -> Option<CitizenId> {
        self.drivers.get(&vehicle).copied()
    }

    fn is_passenger_vehicle(&self, vehicle: VehicleId) -> bool {
        !self.service_vehicles.contains(&vehicle)
    }

    fn building_position(&self, building: BuildingId) -> Option<Vec3> {
        self.buildings.get(&building).copied()
    }

    fn lot_at_position(&self, position: Vec3) -> Option<BuildingId> {
        self.buildings
            .iter()
            .filter(|(_, lot)| lot.distance(position) <= LOT_FOOTPRINT_METERS)
            .map(|(id, _)| *id)
            .min()
    }

    fn release_parked_vehicle(&self, vehicle: ParkedVehicleId) {
        self.released.lock().unwrap().push(vehicle);
    }
}

/// Relocation integration that either always succeeds or always fails, and
/// remembers every vehicle it was asked to move.
#[derive(Default)]
pub struct FakeRelocation {
    succeed: bool,
    calls: Mutex<Vec<ParkedVehicleId>>,
}

impl FakeRelocation {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ParkedVehicleId> {
        self.calls.lock().unwrap().clone()
    }
}

impl RelocationIntegration for FakeRelocation {
    fn name(&self) -> &str {
        "fake"
    }

    fn try_relocate_parked_vehicle(
        &self,
        vehicle: ParkedVehicleId,
        _owner: CitizenId,
        _home_building: Option<BuildingId>,
        _reference_position: Vec3,
        _max_distance: f32,
    ) -> bool {
        self.calls.lock().unwrap().push(vehicle);
        self.succeed
    }
}
