//! Leptos components hosting a [`WebScene`]

use crate::demo::Waveform;
use leptos::html::Div;
use leptos::prelude::*;
use tsgraph_charts::LinePlot;
use tsgraph_scene::{Repaint, SceneConfig, WebScene};

/// Replace the plots of the first figure
fn show_plots(web: &WebScene, plots: Vec<LinePlot>) {
    web.with_scene(|scene| {
        if let Some(figure) = scene.figure_mut(0) {
            figure.set_plots(plots);
            scene.request_repaint(Repaint::Full);
        }
    });
}

/// Single-figure plot fed from a signal of line plots
#[component]
pub fn PlotCanvas(
    #[prop(into)] plots: Signal<Vec<LinePlot>>,
    #[prop(optional)] config: Option<SceneConfig>,
) -> impl IntoView {
    let config = config.unwrap_or_default();
    let container = NodeRef::<Div>::new();
    let scene = StoredValue::new_local(None::<WebScene>);

    container.on_load(move |div| match WebScene::mount(&div, config.clone()) {
        Ok(web) => {
            web.with_scene(|scene| scene.new_figure());
            show_plots(&web, plots.get_untracked());
            scene.set_value(Some(web));
        }
        Err(err) => tracing::error!(%err, "failed to mount plot"),
    });

    Effect::new(move |_| {
        let plots = plots.get();
        scene.with_value(|web| {
            if let Some(web) = web {
                show_plots(web, plots);
            }
        });
    });

    view! { <div class="plot-canvas" node_ref=container></div> }
}

/// Demo page: damped sine with adjustable damping
#[component]
pub fn App() -> impl IntoView {
    let (damping, set_damping) = signal(0.3);

    let plots = Signal::derive(move || {
        Waveform::default()
            .with_damping(damping.get())
            .plots()
            .unwrap_or_default()
    });

    view! {
        <div class="demo">
            <header class="demo-header">
                <span class="demo-title">"tsgraph"</span>
                <label>
                    "Damping "
                    <input
                        type="range"
                        min="0"
                        max="1"
                        step="0.05"
                        prop:value=move || damping.get().to_string()
                        on:input=move |ev| {
                            if let Ok(value) = event_target_value(&ev).parse::<f64>() {
                                set_damping.set(value);
                            }
                        }
                    />
                </label>
                <span class="demo-hint">"drag: pan, right drag: zoom, double click: view all"</span>
            </header>
            <PlotCanvas plots=plots />
        </div>
    }
}
