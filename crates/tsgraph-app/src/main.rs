//! tsgraph demo entry point

use tsgraph_app::init_logging;

#[cfg(target_arch = "wasm32")]
fn main() {
    init_logging();
    leptos::mount::mount_to_body(tsgraph_app::App);
}

/// Headless run: paint the demo into a recording surface
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tsgraph_core::RecordingContext;
    use tsgraph_scene::{Scene, SceneConfig};

    init_logging();

    let mut scene = Scene::new(SceneConfig::default().with_device_pixel_ratio(1.0));
    let index = scene.new_figure();
    match tsgraph_app::Waveform::default().plots() {
        Ok(plots) => {
            if let Some(figure) = scene.figure_mut(index) {
                figure.set_plots(plots);
            }
        }
        Err(err) => {
            tracing::error!(%err, "demo data");
            return;
        }
    }
    scene.request_resize(800.0, 600.0);
    scene.animation_frame();

    let (mut content, mut overlay) = (RecordingContext::new(), RecordingContext::new());
    scene.paint(Some(&mut content), Some(&mut overlay));
    tracing::info!(
        content = content.commands().len(),
        overlay = overlay.commands().len(),
        labels = ?content.texts(),
        "painted demo scene"
    );
}
