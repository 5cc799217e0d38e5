use nalgebra_glm as glm;

use orrery_core::{
    compute_frame, flatten, generate_sphere, Camera, Projection, SceneConfig, SceneError,
    SceneObject,
};

const EPS: f32 = 1e-5;

fn planets_camera() -> Camera {
    Camera::new(
        glm::vec3(0.0, 0.0, 5.0),
        glm::vec3(0.0, 0.0, 0.0),
        glm::vec3(0.0, 1.0, 0.0),
    )
}

fn planets_projection() -> Projection {
    Projection::Perspective {
        fov_y_degrees: 60.0,
        aspect: 1.0,
        near: 0.1,
        far: 100.0,
    }
}

fn planets_objects() -> Vec<SceneObject> {
    let (state, _) = SceneConfig::planets().build().unwrap();
    state.objects
}

#[test]
fn three_planet_scene_projection() {
    let objects = planets_objects();
    let positions: Vec<_> = objects.iter().map(|o| o.position).collect();
    assert_eq!(
        positions,
        vec![
            glm::vec3(-3.0, 1.0, -5.0),
            glm::vec3(0.0, -1.0, -10.0),
            glm::vec3(3.0, 0.0, -20.0),
        ]
    );

    for t in [0.0, 1.0, 37.5] {
        let frame = compute_frame(&planets_camera(), &planets_projection(), &objects, t).unwrap();
        let expected = 1.0 / 30_f32.to_radians().tan();
        assert!((frame.projection[(1, 1)] - expected).abs() < EPS);
        assert!((flatten(&frame.projection)[5] - expected).abs() < EPS);
        assert_eq!(frame.models.len(), 3);
    }
}

#[test]
fn frame_is_bit_reproducible() {
    let objects = planets_objects();
    let first = compute_frame(&planets_camera(), &planets_projection(), &objects, 4.2).unwrap();
    let second = compute_frame(&planets_camera(), &planets_projection(), &objects, 4.2).unwrap();
    for (a, b) in first.models.iter().zip(&second.models) {
        assert_eq!(flatten(a), flatten(b));
    }
    assert_eq!(flatten(&first.view), flatten(&second.view));
    assert_eq!(flatten(&first.projection), flatten(&second.projection));
}

#[test]
fn view_maps_eye_to_camera_origin() {
    let camera = planets_camera();
    let frame = compute_frame(&camera, &planets_projection(), &[], 0.0).unwrap();
    let eye = frame.view * glm::vec4(0.0, 0.0, 5.0, 1.0);
    assert!((eye - glm::vec4(0.0, 0.0, 0.0, 1.0)).norm() < EPS);
}

#[test]
fn planets_keep_spinning_and_bobbing() {
    let objects = planets_objects();
    for object in &objects {
        assert!(object.angle(2.0) > object.angle(1.0));
    }

    let (mut state, _) = SceneConfig::planets().build().unwrap();
    let mut heights = Vec::new();
    for _ in 0..120 {
        let command = state.tick(1.0 / 60.0).unwrap();
        heights.push(command.draws[0].model[(1, 3)]);
    }
    // mars bobs around y = 1 within the 0.2 amplitude
    assert!(heights.iter().all(|y| (y - 1.0).abs() <= 0.2 + EPS));
    assert!(heights.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn mesh_and_frame_feed_the_same_draw_list() {
    let mesh = generate_sphere(1.0, 20, 20).unwrap();
    assert_eq!(mesh.vertices.len(), 441);
    assert_eq!(mesh.line_indices.len(), 4 * 20 * 20);

    let (state, _) = SceneConfig::planets().build().unwrap();
    let command = state.render_command().unwrap();
    assert_eq!(command.draws.len(), state.draws_per_frame());
    assert_eq!(command.clear_color, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn degenerate_up_is_reported() {
    let camera = Camera::new(
        glm::vec3(0.0, 0.0, 5.0),
        glm::vec3(0.0, 0.0, 0.0),
        glm::vec3(0.0, 0.0, 1.0),
    );
    let result = compute_frame(&camera, &planets_projection(), &planets_objects(), 0.0);
    assert!(matches!(result, Err(SceneError::DegenerateCamera(_))));
}
