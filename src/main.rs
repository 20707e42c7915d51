//! Interactive demo: a rotating wall hides a field of spheres and boxes.
//!
//! Usage: `softcull-viewer [occluder.obj]`. The window shows the depth
//! buffer and the title reports how many entities were culled.
//!
//! Keys: B box test strategy, C conservative occluders, P save depth.png.

mod window;

use softcull::prelude::*;
use window::{FrameLimiter, Window, WindowEvent, WINDOW_HEIGHT, WINDOW_WIDTH};

const BUFFER_WIDTH: u32 = 256;
const BUFFER_HEIGHT: u32 = 128;

fn build_occluders() -> Result<Vec<Entity>, String> {
    let mesh = match std::env::args().nth(1) {
        Some(path) => OccluderMesh::from_obj(&path).map_err(|e| e.to_string())?,
        None => OccluderMesh::quad(3.0, 2.0),
    };
    let wall = Entity::new("wall", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
        .with_occluder(mesh);
    let pillar = Entity::new("pillar", Transform::from_position(Vec3::new(-5.0, 1.5, -2.0)))
        .with_occluder(OccluderMesh::cuboid(Vec3::new(0.5, 1.5, 0.5)));
    Ok(vec![wall, pillar])
}

fn build_occludees() -> Vec<Entity> {
    let mut entities = Vec::new();
    for row in 0..4 {
        for col in -4..=4 {
            let position = Vec3::new(col as f32 * 1.5, 0.5, -3.0 - row as f32 * 2.0);
            let name = format!("prop_{row}_{col}");
            let entity = Entity::new(name, Transform::from_position(position));
            let entity = if (row + col) % 2 == 0 {
                entity.with_bound(BoundingVolume::sphere(0.5))
            } else {
                entity.with_bound(BoundingVolume::cuboid(Vec3::new(0.4, 0.4, 0.4)))
            };
            entities.push(entity);
        }
    }
    entities
}

fn main() -> Result<(), String> {
    env_logger::init();

    let mut window = Window::new(
        "softcull",
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        (BUFFER_WIDTH, BUFFER_HEIGHT),
    )?;
    let mut limiter = FrameLimiter::new(&window);

    let mut config = OcclusionConfig::new(BUFFER_WIDTH, BUFFER_HEIGHT);
    let mut renderer = SoftwareRenderer::new(config).map_err(|e| e.to_string())?;

    let mut camera = Camera::perspective(
        60f32.to_radians(),
        BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32,
        0.1,
        100.0,
    );
    camera.look_at(Vec3::new(0.0, 1.5, 8.0), Vec3::new(0.0, 1.0, 0.0), Vec3::UP);

    let mut occluders = build_occluders()?;
    let occludees = build_occludees();
    let total = occludees.len();

    loop {
        match window.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) => window.resize(w, h),
            WindowEvent::ToggleBoxTest => {
                config.box_test = match config.box_test {
                    BoxTest::Rasterized => BoxTest::ClippedRectangle,
                    BoxTest::ClippedRectangle => BoxTest::Rasterized,
                };
                renderer.set_config(config).map_err(|e| e.to_string())?;
            }
            WindowEvent::ToggleConservative => {
                config.conservative_occluders = !config.conservative_occluders;
                renderer.set_config(config).map_err(|e| e.to_string())?;
            }
            WindowEvent::SaveDepth => {
                renderer
                    .depth_buffer()
                    .save_png("depth.png")
                    .map_err(|e| e.to_string())?;
                log::info!("saved depth.png");
            }
            WindowEvent::None => {}
        }

        let delta = limiter.wait_and_get_delta(&window) as f32 / 1000.0;
        occluders[0].transform_mut().rotate_y(delta * 0.5);

        let mut visible = occludees.clone();
        let stats = {
            let pass = renderer.render(&camera, &occluders);
            pass.perform_occlusion_culling(&mut visible)
        };

        window.set_title(&format!(
            "softcull - culled {}/{} ({} boxes{})",
            stats.culled,
            total,
            config.box_test,
            if config.conservative_occluders {
                ", conservative"
            } else {
                ""
            }
        ))?;
        window.present(&renderer.depth_buffer().to_image())?;
    }

    Ok(())
}
