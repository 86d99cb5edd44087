//! Keyboard-style manual driving without a window.
//!
//! Each input line lists the keys held during one tick, e.g. `"wd"`.

use std::io::BufRead;

use tracing::debug;

use super::controller::Decision;
use super::track::TrackModel;
use super::vehicle::{DriveState, RadarReading, Vehicle};

/// Keys held during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keys {
    /// Forward.
    pub w: bool,
    /// Steer left.
    pub a: bool,
    /// Reverse.
    pub s: bool,
    /// Steer right.
    pub d: bool,
}

impl Keys {
    /// Parses the keys in `line`, ignoring case and unknown characters.
    pub fn parse(line: &str) -> Self {
        let mut keys = Keys::default();
        for c in line.chars() {
            match c.to_ascii_lowercase() {
                'w' => keys.w = true,
                'a' => keys.a = true,
                's' => keys.s = true,
                'd' => keys.d = true,
                _ => {}
            }
        }
        keys
    }

    /// Throttle for these keys; forward wins over reverse.
    pub fn drive_state(self) -> DriveState {
        if self.w {
            DriveState::Forward
        } else if self.s {
            DriveState::Reverse
        } else {
            DriveState::Stopped
        }
    }

    /// Steering for these keys; right wins over left.
    pub fn decision(self) -> Decision {
        if self.d {
            Decision::Right
        } else if self.a {
            Decision::Left
        } else {
            Decision::Straight
        }
    }
}

/// A single manually driven vehicle.
pub struct ManualSession<'a> {
    track: &'a TrackModel,
    vehicle: Vehicle,
    ticks: u64,
}

impl<'a> ManualSession<'a> {
    /// Starts a session with `vehicle` on `track`.
    pub fn new(track: &'a TrackModel, vehicle: Vehicle) -> Self {
        Self {
            track,
            vehicle,
            ticks: 0,
        }
    }

    /// The driven vehicle.
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Applies `keys` for one tick and returns the fresh readings.
    pub fn tick(&mut self, keys: Keys) -> &[RadarReading] {
        self.vehicle.set_drive_state(keys.drive_state());
        self.vehicle.set_decision(keys.decision());
        self.vehicle.update(self.track);
        self.ticks += 1;

        let pose = self.vehicle.pose();
        debug!(
            tick = self.ticks,
            x = pose.x,
            y = pose.y,
            heading = pose.heading,
            readings = ?self.vehicle.sensor_vector().to_vec(),
            "Manual tick",
        );
        self.vehicle.readings()
    }

    /// Drives one tick per line of `input` until the input ends or the vehicle crashes.
    pub fn run(&mut self, input: impl BufRead) -> std::io::Result<u64> {
        for line in input.lines() {
            if !self.vehicle.is_alive() {
                break;
            }
            self.tick(Keys::parse(&line?));
        }
        Ok(self.ticks)
    }
}
