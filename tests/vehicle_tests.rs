#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use autodrive::simulation::controller::Decision;
use autodrive::simulation::geometric_utils::heading_vector;
use autodrive::simulation::params::{DEBUG_FAN, EVALUATION_FAN, Params};
use autodrive::simulation::track::TrackModel;
use autodrive::simulation::vehicle::{
    DriveState, Footprint, Pose, SpriteLoadError, Vehicle, radar,
};
use geo::coord;
use image::{Rgba, RgbaImage};
use ndarray::{Array2, array};

fn open_track(width: usize, height: usize) -> TrackModel {
    TrackModel::from_occupancy(Array2::from_elem((height, width), false))
}

/// Track whose columns `x >= wall_x` are boundary.
fn wall_track(width: usize, height: usize, wall_x: usize) -> TrackModel {
    TrackModel::from_occupancy(Array2::from_shape_fn((height, width), |(_, x)| {
        x >= wall_x
    }))
}

fn car(x: f32, y: f32, heading: f32, fan: &[f32]) -> Vehicle {
    let pose = Pose {
        x,
        y,
        heading,
        speed: 3.0,
    };
    Vehicle::new(pose, fan, Footprint::rect(40.0, 20.0), 2.0, 200)
}

#[test]
fn test_readings_start_unmeasured_in_fan_order() {
    let vehicle = car(100.0, 100.0, 0.0, &EVALUATION_FAN);

    assert_eq!(vehicle.readings().len(), EVALUATION_FAN.len());
    for (reading, &angle) in vehicle.readings().iter().zip(EVALUATION_FAN.iter()) {
        assert_eq!(reading.angle, angle);
        assert_eq!(reading.distance, 0.0);
    }
    assert_eq!(vehicle.sensor_vector(), array![0.0, 0.0, 0.0, 0.0, 0.0]);
    assert!(vehicle.is_alive());
}

#[test]
fn test_spawn_uses_configured_start_and_fan() {
    let params = Params::default();
    let vehicle = Vehicle::spawn(&params, Footprint::rect(40.0, 20.0));

    assert_eq!(vehicle.pose().x, 300.0);
    assert_eq!(vehicle.pose().y, 565.0);
    assert_eq!(vehicle.pose().heading, 0.0);
    assert_eq!(vehicle.readings().len(), 5);
    assert_eq!(vehicle.drive_state(), DriveState::Forward);
    assert_eq!(vehicle.decision(), Decision::Straight);
}

#[test]
fn test_open_track_saturates_every_sensor() {
    let track = open_track(1000, 1000);
    let mut vehicle = car(500.0, 500.0, 0.0, &EVALUATION_FAN);

    for _ in 0..20 {
        vehicle.update(&track);
        assert!(vehicle.is_alive());
        assert!(vehicle.readings().iter().all(|r| r.distance == 200.0));
    }
}

#[test]
fn test_ray_stops_at_wall() {
    let track = wall_track(200, 100, 80);

    let distance = radar::cast(coord! { x: 50.5, y: 50.5 }, 0.0, 200, &track);
    assert_eq!(distance, 30.0);

    // Pointing away from the wall the ray leaves the map on the left.
    let distance = radar::cast(coord! { x: 50.5, y: 50.5 }, 180.0, 200, &track);
    assert_eq!(distance, 51.0);

    // Starting inside the wall yields zero.
    let distance = radar::cast(coord! { x: 90.0, y: 50.0 }, 0.0, 200, &track);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_ray_distances_stay_within_range() {
    let mut grid = Array2::from_elem((300, 300), false);
    for y in 120..140 {
        for x in 170..190 {
            grid[[y, x]] = true;
        }
    }
    let track = TrackModel::from_occupancy(grid);
    let origin = coord! { x: 150.0, y: 150.0 };

    let mut hits = 0;
    for step in 0..360 {
        let distance = radar::cast(origin, step as f32, 200, &track);
        assert!((0.0..=200.0).contains(&distance));
        if distance < 200.0 {
            hits += 1;
        }
    }
    // The block and the map edges are within reach for some directions only.
    assert!(hits > 0);
    assert!(hits < 360);
}

#[test]
fn test_overlapping_boundary_collides_on_first_update() {
    let mut grid = Array2::from_elem((200, 200), false);
    grid[[100, 100]] = true;
    let track = TrackModel::from_occupancy(grid);
    let mut vehicle = car(100.0, 100.0, 0.0, &EVALUATION_FAN);

    vehicle.update(&track);
    assert!(!vehicle.is_alive());
    assert!(vehicle.check_collision(&track));
}

#[test]
fn test_dead_vehicle_is_frozen() {
    let mut grid = Array2::from_elem((200, 200), false);
    grid[[100, 100]] = true;
    let track = TrackModel::from_occupancy(grid);
    let mut vehicle = car(100.0, 100.0, 0.0, &EVALUATION_FAN);

    vehicle.update(&track);
    assert!(!vehicle.is_alive());
    let pose = *vehicle.pose();
    let readings = vehicle.readings().to_vec();

    vehicle.set_decision(Decision::Left);
    for _ in 0..10 {
        vehicle.update(&track);
        vehicle.drive();
        vehicle.rotate();
        vehicle.sense(&open_track(200, 200));
        assert!(!vehicle.is_alive());
        assert_eq!(*vehicle.pose(), pose);
        assert_eq!(vehicle.readings(), readings.as_slice());
    }
}

#[test]
fn test_driving_into_wall_kills() {
    let track = wall_track(300, 100, 100);
    let mut vehicle = car(50.0, 50.0, 0.0, &EVALUATION_FAN);

    let mut ticks = 0;
    while vehicle.is_alive() {
        vehicle.update(&track);
        ticks += 1;
        assert!(ticks < 100, "vehicle never reached the wall");
    }
    // Front edge reaches x = 100 on the eleventh step (centre at 83).
    assert_eq!(ticks, 11);
    assert_eq!(vehicle.pose().x, 83.0);
}

#[test]
fn test_leaving_the_map_is_a_collision() {
    let track = open_track(100, 100);
    let mut vehicle = car(50.0, 50.0, 90.0, &EVALUATION_FAN);

    for _ in 0..100 {
        vehicle.update(&track);
    }
    assert!(!vehicle.is_alive());
    assert!(vehicle.pose().y < 50.0);
}

#[test]
fn test_straight_keeps_heading_and_line() {
    let track = open_track(1000, 1000);
    let heading = 30.0;
    let mut vehicle = car(500.0, 500.0, heading, &EVALUATION_FAN);
    let direction = heading_vector(heading);

    for tick in 1..=40 {
        vehicle.set_decision(Decision::Straight);
        vehicle.update(&track);
        let pose = vehicle.pose();
        assert_eq!(pose.heading, heading);

        let expected_x = 500.0 + direction.x * 3.0 * tick as f32;
        let expected_y = 500.0 + direction.y * 3.0 * tick as f32;
        assert!((pose.x - expected_x).abs() < 1e-2);
        assert!((pose.y - expected_y).abs() < 1e-2);
    }
}

#[test]
fn test_steering_keeps_velocity_aligned_with_heading() {
    let track = open_track(2000, 2000);
    let mut vehicle = car(1000.0, 1000.0, 0.0, &EVALUATION_FAN);

    vehicle.set_decision(Decision::Right);
    for _ in 0..10 {
        vehicle.update(&track);
    }
    assert!((vehicle.pose().heading - -20.0).abs() < 1e-4);

    vehicle.set_decision(Decision::Left);
    for _ in 0..25 {
        vehicle.update(&track);
    }
    assert!((vehicle.pose().heading - 30.0).abs() < 1e-4);

    let expected = heading_vector(vehicle.pose().heading) * 3.0;
    let velocity = vehicle.velocity();
    assert!((velocity.x - expected.x).abs() < 1e-4);
    assert!((velocity.y - expected.y).abs() < 1e-4);
}

#[test]
fn test_long_turns_do_not_drift_from_heading() {
    let mut vehicle = car(500.0, 500.0, 0.0, &EVALUATION_FAN);
    vehicle.set_drive_state(DriveState::Stopped);
    vehicle.set_decision(Decision::Right);

    for _ in 0..5000 {
        vehicle.rotate();
    }
    assert_eq!(vehicle.pose().heading, -10_000.0);

    let expected = heading_vector(vehicle.pose().heading) * 3.0;
    let velocity = vehicle.velocity();
    assert!((velocity.x - expected.x).abs() < 1e-6);
    assert!((velocity.y - expected.y).abs() < 1e-6);
    let speed = velocity.x.hypot(velocity.y);
    assert!((speed - 3.0).abs() < 1e-5);
}

#[test]
fn test_right_turn_is_clockwise_on_screen() {
    let track = open_track(1000, 1000);
    let mut vehicle = car(500.0, 500.0, 0.0, &EVALUATION_FAN);

    vehicle.set_decision(Decision::Right);
    for _ in 0..20 {
        vehicle.update(&track);
    }
    // Heading right along +x and turning right on screen means moving down (+y).
    assert!(vehicle.pose().y > 500.0);
}

#[test]
fn test_drive_states() {
    let track = open_track(1000, 1000);
    let mut vehicle = car(500.0, 500.0, 0.0, &DEBUG_FAN);

    vehicle.set_drive_state(DriveState::Reverse);
    vehicle.update(&track);
    assert_eq!(vehicle.pose().x, 497.0);

    vehicle.set_drive_state(DriveState::Stopped);
    vehicle.set_decision(Decision::Right);
    vehicle.update(&track);
    assert_eq!(vehicle.pose().x, 497.0);
    assert_eq!(vehicle.pose().y, 500.0);
    assert_eq!(vehicle.pose().heading, -2.0);
    assert_eq!(vehicle.readings().len(), 13);
}

#[test]
fn test_symmetric_track_gives_equal_sensor_pairs() {
    // Boundary rows mirror around y = 150 (row r <-> row 299 - r).
    let track = TrackModel::from_occupancy(Array2::from_shape_fn((300, 1000), |(y, _)| {
        y < 40 || y >= 260
    }));
    let mut vehicle = car(200.0, 150.0, 0.0, &EVALUATION_FAN);

    for _ in 0..50 {
        vehicle.set_decision(Decision::Straight);
        vehicle.update(&track);
        assert!(vehicle.is_alive());

        let d = vehicle.sensor_vector();
        assert_eq!(d[0], d[4]);
        assert_eq!(d[1], d[3]);
        // The steep pair reaches the walls, the shallow pair does not.
        assert_eq!(d[0], 128.0);
        assert_eq!(d[1], 200.0);
    }
}

#[test]
fn test_rect_footprint_bounds_follow_rotation() {
    let footprint = Footprint::rect(40.0, 20.0);

    let level = footprint.world_bounds(coord! { x: 100.0, y: 100.0 }, 0.0);
    assert!((level.min().x - 80.0).abs() < 1e-4);
    assert!((level.max().x - 120.0).abs() < 1e-4);
    assert!((level.min().y - 90.0).abs() < 1e-4);
    assert!((level.max().y - 110.0).abs() < 1e-4);

    let upright = footprint.world_bounds(coord! { x: 100.0, y: 100.0 }, 90.0);
    assert!((upright.width() - 20.0).abs() < 1e-3);
    assert!((upright.height() - 40.0).abs() < 1e-3);
}

#[test]
fn test_rotated_footprint_hits_along_its_length() {
    // A single boundary pixel 15 px above the centre.
    let mut grid = Array2::from_elem((200, 200), false);
    grid[[85, 100]] = true;
    let track = TrackModel::from_occupancy(grid);
    let footprint = Footprint::rect(40.0, 20.0);
    let center = coord! { x: 100.0, y: 100.0 };

    // Lying along x the pixel is outside the 10 px half-width.
    assert!(!footprint.overlaps_boundary(center, 0.0, &track));
    // Pointing up (heading 90) it is inside the 20 px half-length.
    assert!(footprint.overlaps_boundary(center, 90.0, &track));
}

#[test]
fn test_mask_footprint_only_tests_solid_pixels() {
    // 4x2 sprite facing +x, only the front column is solid.
    let mut mask = Array2::from_elem((2, 4), false);
    mask[[0, 3]] = true;
    mask[[1, 3]] = true;
    let footprint = Footprint::Mask(mask);

    assert_eq!(footprint.extent(), (4.0, 2.0));
    assert!(footprint.covers(coord! { x: 1.5, y: 0.5 }));
    assert!(footprint.covers(coord! { x: 1.5, y: -0.5 }));
    assert!(!footprint.covers(coord! { x: -1.5, y: 0.5 }));
    assert!(!footprint.covers(coord! { x: 2.5, y: 0.0 }));

    let mut grid = Array2::from_elem((20, 20), false);
    grid[[10, 8]] = true; // behind the centre, under a transparent pixel
    let track = TrackModel::from_occupancy(grid);
    assert!(!footprint.overlaps_boundary(coord! { x: 10.0, y: 10.0 }, 0.0, &track));

    let mut grid = Array2::from_elem((20, 20), false);
    grid[[10, 11]] = true; // under the solid front column
    let track = TrackModel::from_occupancy(grid);
    assert!(footprint.overlaps_boundary(coord! { x: 10.0, y: 10.0 }, 0.0, &track));
}

fn save_sprite(name: &str, sprite: &RgbaImage) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("autodrive_{name}_{}.png", std::process::id()));
    sprite.save(&path).unwrap();
    path
}

#[test]
fn test_sprite_alpha_becomes_mask() {
    let mut sprite = RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 0]));
    sprite.put_pixel(2, 0, Rgba([255, 0, 0, 127]));
    sprite.put_pixel(3, 0, Rgba([255, 0, 0, 128]));
    sprite.put_pixel(3, 1, Rgba([0, 0, 0, 255]));
    let path = save_sprite("sprite", &sprite);

    let footprint = Footprint::from_sprite(&path);
    std::fs::remove_file(&path).unwrap();

    match footprint.unwrap() {
        Footprint::Mask(mask) => {
            assert_eq!(mask, array![[false, false, false, true], [false, false, false, true]]);
        }
        other => panic!("expected mask footprint, got {other:?}"),
    }
}

#[test]
fn test_transparent_sprite_is_rejected() {
    let sprite = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 127]));
    let path = save_sprite("clear_sprite", &sprite);

    let result = Footprint::from_sprite(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(SpriteLoadError::Transparent { .. })));
}

#[test]
fn test_missing_sprite_fails_to_decode() {
    let result = Footprint::from_sprite("does/not/exist.png");
    assert!(matches!(result, Err(SpriteLoadError::Decode { .. })));
}
