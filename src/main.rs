use clap::Parser;
use log::{error, info};

use lumapath::camera::Camera;
use lumapath::cli::Args;
use lumapath::logger::init_logger;
use lumapath::output::{save_image_as_png, save_image_as_ppm};
use lumapath::renderer::{self, RenderConfig};
use lumapath::scene_file;

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.into());

    // Log application startup with version information
    info!("LumaPath - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    let scene = match scene_file::load_scene(&args.scene) {
        Ok(scene) => scene,
        Err(e) => {
            error!("Failed to load scene '{}': {}", args.scene, e);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded scene '{}' with {} top-level objects",
        args.scene,
        scene.world.len()
    );
    if scene.world.is_empty() {
        info!("Scene is empty; every pixel will show the background color");
    }

    let camera = match Camera::new(&scene.camera) {
        Ok(camera) => camera,
        Err(e) => {
            error!("Invalid camera configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut config = RenderConfig::new(args.width, args.samples_per_pixel);
    config.max_depth = args.max_depth;
    config.block_size = args.block_size;
    if let Some(workers) = args.workers {
        config.workers = workers.max(1);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let image = renderer::render(&scene.world, &camera, scene.background, &config);

    // Save image based on file extension
    if args.output.ends_with(".png") {
        save_image_as_png(&image, &args.output);
    } else if args.output.ends_with(".ppm") {
        save_image_as_ppm(&image, &args.output);
    } else {
        error!(
            "Unsupported file extension '{}'. Only .png and .ppm formats are supported.",
            std::path::Path::new(&args.output)
                .extension()
                .unwrap_or_default()
                .to_string_lossy()
        );
        std::process::exit(1);
    }
}
