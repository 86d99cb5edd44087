//! Vehicle kinematics and lifecycle.

use geo::{Coord, coord};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::controller::Decision;
use super::super::geometric_utils::heading_vector;
use super::super::params::Params;
use super::super::track::TrackModel;
use super::footprint::Footprint;
use super::radar::{self, RadarReading};

/// Throttle of a vehicle. Evaluation vehicles always drive forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveState {
    /// Move against the heading.
    Reverse,
    /// Stand still.
    Stopped,
    /// Move along the heading.
    #[default]
    Forward,
}

impl DriveState {
    /// Multiplier applied to the per-tick step: -1, 0 or 1.
    pub fn factor(self) -> f32 {
        match self {
            DriveState::Reverse => -1.0,
            DriveState::Stopped => 0.0,
            DriveState::Forward => 1.0,
        }
    }
}

/// Position, heading and speed of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Centre x in pixels.
    pub x: f32,
    /// Centre y in pixels, growing downwards.
    pub y: f32,
    /// Heading in degrees, counter-clockwise on screen.
    pub heading: f32,
    /// Distance covered per tick when driving forward.
    pub speed: f32,
}

impl Pose {
    /// Centre as a coordinate.
    pub fn center(&self) -> Coord<f32> {
        coord! { x: self.x, y: self.y }
    }
}

/// A simulated car: kinematic state, range sensors and collision footprint.
///
/// A vehicle is either alive or dead. Death is permanent; a dead vehicle
/// ignores every further update.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pose: Pose,
    /// Step vector, rebuilt from the heading on every turn.
    velocity: Coord<f32>,
    rotation_velocity: f32,
    max_ray_length: u32,
    readings: Vec<RadarReading>,
    footprint: Footprint,
    drive_state: DriveState,
    decision: Decision,
    alive: bool,
}

impl Vehicle {
    /// Creates a live vehicle.
    ///
    /// # Arguments
    ///
    /// * `pose` - Initial pose; `pose.speed` is the per-tick step
    /// * `sensor_angles` - Sensor offsets in degrees, in the order readings are reported
    /// * `footprint` - Collision silhouette
    /// * `rotation_velocity` - Heading change per steering tick, in degrees
    /// * `max_ray_length` - Sensor range cap
    pub fn new(
        pose: Pose,
        sensor_angles: &[f32],
        footprint: Footprint,
        rotation_velocity: f32,
        max_ray_length: u32,
    ) -> Self {
        Self {
            velocity: heading_vector(pose.heading) * pose.speed,
            pose,
            rotation_velocity,
            max_ray_length,
            readings: sensor_angles
                .iter()
                .map(|&angle| RadarReading::unmeasured(angle))
                .collect(),
            footprint,
            drive_state: DriveState::Forward,
            decision: Decision::Straight,
            alive: true,
        }
    }

    /// Creates a vehicle at the configured start pose.
    pub fn spawn(params: &Params, footprint: Footprint) -> Self {
        let pose = Pose {
            x: params.start_x,
            y: params.start_y,
            heading: params.start_heading,
            speed: params.step_distance,
        };
        Self::new(
            pose,
            &params.sensor_fan(),
            footprint,
            params.rotation_velocity,
            params.max_ray_length,
        )
    }

    /// Current pose.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Current step vector.
    pub fn velocity(&self) -> Coord<f32> {
        self.velocity
    }

    /// Returns `false` once the vehicle has touched the boundary.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Latest readings, in configured sensor order.
    pub fn readings(&self) -> &[RadarReading] {
        &self.readings
    }

    /// Latest distances, in configured sensor order, as fed to a controller.
    pub fn sensor_vector(&self) -> Array1<f32> {
        self.readings.iter().map(|r| r.distance).collect()
    }

    /// Collision silhouette.
    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Steering decision used by the next rotation.
    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// Sets the steering decision used by the next rotation.
    pub fn set_decision(&mut self, decision: Decision) {
        self.decision = decision;
    }

    /// Throttle used by the next drive.
    pub fn drive_state(&self) -> DriveState {
        self.drive_state
    }

    /// Sets the throttle used by the next drive.
    pub fn set_drive_state(&mut self, drive_state: DriveState) {
        self.drive_state = drive_state;
    }

    /// Advances the centre by one step scaled by the drive state.
    pub fn drive(&mut self) {
        if !self.alive {
            return;
        }
        let step = self.velocity * self.drive_state.factor();
        self.pose.x += step.x;
        self.pose.y += step.y;
    }

    /// Turns heading and velocity together according to the current decision.
    pub fn rotate(&mut self) {
        if !self.alive {
            return;
        }
        let turn = f32::from(self.decision.direction()) * self.rotation_velocity;
        if turn != 0.0 {
            self.pose.heading -= turn;
            self.velocity = heading_vector(self.pose.heading) * self.pose.speed;
        }
    }

    /// Refreshes every sensor reading against `track`.
    pub fn sense(&mut self, track: &TrackModel) -> &[RadarReading] {
        if self.alive {
            let center = self.pose.center();
            for reading in &mut self.readings {
                reading.distance = radar::cast(
                    center,
                    self.pose.heading + reading.angle,
                    self.max_ray_length,
                    track,
                );
            }
        }
        &self.readings
    }

    /// Tests the footprint against the track and kills the vehicle on contact.
    ///
    /// Returns `true` when the vehicle is dead after the test.
    pub fn check_collision(&mut self, track: &TrackModel) -> bool {
        if !self.alive {
            return true;
        }
        if self
            .footprint
            .overlaps_boundary(self.pose.center(), self.pose.heading, track)
        {
            self.alive = false;
            debug!(
                x = self.pose.x,
                y = self.pose.y,
                heading = self.pose.heading,
                "Vehicle hit the track boundary",
            );
        }
        !self.alive
    }

    /// Runs one tick: drive, rotate, sense, collision test.
    pub fn update(&mut self, track: &TrackModel) {
        if !self.alive {
            return;
        }
        self.drive();
        self.rotate();
        self.sense(track);
        self.check_collision(track);
    }
}
