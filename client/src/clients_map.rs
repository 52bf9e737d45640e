use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, PointerEvent, WheelEvent};

use nortus_shared::coords::LonLat;
use nortus_shared::filter::{
    ALL_CATEGORIES, ALL_PLACES, LocationFilter, category_options, place_options,
};
use nortus_shared::marker::MARKER_SIZE_PX;
use nortus_shared::{Location, MapLocationsResponse};

use crate::animation::ViewTransition;
use crate::card::Card;
use crate::markers::{Marker, MarkerLayer};
use crate::render_loop::FrameLoop;
use crate::tiles::{BASEMAP_URL_TEMPLATE, TileCoord, visible_tile_coords};
use crate::viewport::{Padding, Viewport};

const INITIAL_CENTER: LonLat = LonLat::new(-51.9253, -14.235);
const INITIAL_ZOOM: f64 = 4.0;
const FIT_PADDING_PX: f64 = 40.0;
const FIT_MAX_ZOOM: f64 = 11.0;
const FIT_DURATION_MS: f64 = 250.0;
const POPUP_OFFSET_Y: f64 = -15.0;
const POPUP_AUTOPAN_MARGIN: f64 = 20.0;
const POPUP_AUTOPAN_DURATION_MS: f64 = 250.0;
const CLICK_SLOP_PX: f64 = 5.0;
const MAP_HEIGHT_PX: f64 = 340.0;
const FALLBACK_WIDTH_PX: f64 = 800.0;

const SELECT_STYLE: &str = "background: #0f1830; color: #d6dcec; border: 1px solid #22304f; border-radius: 10px; padding: 6px 10px; font-size: 0.8rem; outline: none; cursor: pointer;";

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

fn retina_display() -> bool {
    web_sys::window().is_some_and(|w| w.device_pixel_ratio() > 1.0)
}

/// Owns the in-flight view animation and the frame loop that plays it.
#[derive(Clone)]
struct ViewAnimator {
    transition: Rc<RefCell<Option<ViewTransition>>>,
    frames: Rc<FrameLoop>,
}

impl ViewAnimator {
    fn new(viewport: RwSignal<Viewport>) -> Self {
        let transition: Rc<RefCell<Option<ViewTransition>>> = Rc::new(RefCell::new(None));
        let transition_step = transition.clone();
        let frames = FrameLoop::new(move |now| {
            let Some(tr) = transition_step.borrow().clone() else {
                return false;
            };
            let Some(current) = viewport.try_get_untracked() else {
                return false;
            };
            match tr.view_at(now, &current) {
                Some(next) => {
                    viewport.set(next);
                    true
                }
                None => {
                    viewport.set(tr.finish(&current));
                    transition_step.borrow_mut().take();
                    false
                }
            }
        });
        Self {
            transition,
            frames: Rc::new(frames),
        }
    }

    fn animate(&self, from: Viewport, to: Viewport, duration: f64) {
        *self.transition.borrow_mut() = Some(ViewTransition::new(from, to, now_ms(), duration));
        self.frames.start();
    }

    fn cancel(&self) {
        self.transition.borrow_mut().take();
        self.frames.stop();
    }
}

/// Interactive map of the client locations with category and place filters.
#[component]
pub fn ClientsMap(
    #[prop(into)] is_loading: Signal<bool>,
    #[prop(into)] infos: Signal<Option<MapLocationsResponse>>,
) -> impl IntoView {
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let popup_ref = NodeRef::<leptos::html::Div>::new();

    let viewport = RwSignal::new(Viewport::new(
        INITIAL_CENTER,
        INITIAL_ZOOM,
        FALLBACK_WIDTH_PX,
        MAP_HEIGHT_PX,
    ));
    let layer: RwSignal<MarkerLayer> = RwSignal::new(MarkerLayer::default());
    let popup: RwSignal<Option<Marker>> = RwSignal::new(None);
    let pointer_on_marker = RwSignal::new(false);
    let dragging = RwSignal::new(false);
    let category = RwSignal::new(ALL_CATEGORIES.to_owned());
    let place = RwSignal::new(ALL_PLACES.to_owned());
    let retina = retina_display();

    let locations: Memo<Vec<Location>> = Memo::new(move |_| {
        infos.with(|data| {
            data.as_ref()
                .map(|r| r.locations().to_vec())
                .unwrap_or_default()
        })
    });
    let category_opts = Memo::new(move |_| locations.with(|l| category_options(l)));
    let place_opts = Memo::new(move |_| locations.with(|l| place_options(l)));
    let filtered = Memo::new(move |_| {
        let filter = LocationFilter::new(category.get(), place.get());
        locations.with(|l| filter.apply(l))
    });

    let animator = ViewAnimator::new(viewport);

    // Keep the view size in step with the container.
    let measure = move || {
        let Some(el) = container_ref.get_untracked() else {
            return;
        };
        let (w, h) = (el.client_width() as f64, el.client_height() as f64);
        viewport.update(|vp| vp.resize(w, h));
    };

    Effect::new(move || {
        if container_ref.get().is_none() {
            return;
        }
        measure();

        let Some(window) = web_sys::window() else {
            return;
        };
        RESIZE_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "resize",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });
        let handler = Closure::<dyn Fn()>::new(move || measure());
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    // Rebuild markers and fit them whenever the filtered list changes or a
    // fresh payload arrives, even one equal to the last.
    let animator_fit = animator.clone();
    Effect::new(move || {
        infos.track();
        let list = filtered.get();
        let drawn = layer.try_update(|l| l.rebuild(&list)).unwrap_or(0);

        if let Some(open) = popup.get_untracked()
            && !layer.with_untracked(|l| l.contains_id(&open.location.id))
        {
            popup.set(None);
        }

        if drawn == 0 {
            return;
        }
        let extent = layer.with_untracked(MarkerLayer::extent);
        if !extent.is_finite() {
            return;
        }
        let current = viewport.get_untracked();
        let target = current.fitted(&extent, Padding::uniform(FIT_PADDING_PX), FIT_MAX_ZOOM);
        animator_fit.animate(current, target, FIT_DURATION_MS);
    });

    // Pan an opened popup into view.
    let animator_pan = animator.clone();
    Effect::new(move || {
        let (Some(el), Some(container)) = (popup_ref.get(), container_ref.get_untracked()) else {
            return;
        };
        if popup.with(Option::is_none) {
            return;
        }
        let rect = el.get_bounding_client_rect();
        let outer = container.get_bounding_client_rect();
        let current = viewport.get_untracked();
        let mut target = current;
        if target.pan_into_view(
            rect.left() - outer.left(),
            rect.top() - outer.top(),
            rect.right() - outer.left(),
            rect.bottom() - outer.top(),
            POPUP_AUTOPAN_MARGIN,
        ) {
            animator_pan.animate(current, target, POPUP_AUTOPAN_DURATION_MS);
        }
    });

    // --- Input handlers ---

    let local_point = move |client_x: f64, client_y: f64| -> (f64, f64) {
        container_ref
            .get_untracked()
            .map(|el| {
                let rect = el.get_bounding_client_rect();
                (client_x - rect.left(), client_y - rect.top())
            })
            .unwrap_or((client_x, client_y))
    };

    let drag_start: Rc<Cell<(f64, f64)>> = Rc::new(Cell::new((0.0, 0.0)));
    let last_pos: Rc<Cell<(f64, f64)>> = Rc::new(Cell::new((0.0, 0.0)));

    let on_wheel = {
        let animator = animator.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            animator.cancel();
            let (x, y) = local_point(e.client_x() as f64, e.client_y() as f64);
            let delta = e.delta_y();
            viewport.update(|vp| vp.zoom_at(delta, x, y));
        }
    };

    let on_pointer_down = {
        let animator = animator.clone();
        let drag_start = drag_start.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            animator.cancel();
            dragging.set(true);
            let pos = (e.client_x() as f64, e.client_y() as f64);
            drag_start.set(pos);
            last_pos.set(pos);

            if let Some(target) = e.current_target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
        }
    };

    let on_pointer_move = {
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            let pos = (e.client_x() as f64, e.client_y() as f64);
            if dragging.get_untracked() {
                let (lx, ly) = last_pos.get();
                last_pos.set(pos);
                viewport.update(|vp| vp.pan(pos.0 - lx, pos.1 - ly));
                return;
            }
            let (x, y) = local_point(pos.0, pos.1);
            let vp = viewport.get_untracked();
            let hit = layer.with_untracked(|l| l.hit_test(&vp, x, y).is_some());
            if hit != pointer_on_marker.get_untracked() {
                pointer_on_marker.set(hit);
            }
        }
    };

    let on_pointer_up = move |_: PointerEvent| {
        dragging.set(false);
    };

    let on_pointer_leave = move |_: PointerEvent| {
        if pointer_on_marker.get_untracked() {
            pointer_on_marker.set(false);
        }
    };

    let on_click = {
        let drag_start = drag_start.clone();
        move |e: MouseEvent| {
            let (sx, sy) = drag_start.get();
            let dx = (e.client_x() as f64 - sx).abs();
            let dy = (e.client_y() as f64 - sy).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let (x, y) = local_point(e.client_x() as f64, e.client_y() as f64);
            let vp = viewport.get_untracked();
            let hit = layer.with_untracked(|l| l.hit_test(&vp, x, y).cloned());
            popup.set(hit);
        }
    };

    let marker_size = format!("{MARKER_SIZE_PX}px");

    view! {
        <Card>
            <div style="display: flex; align-items: center; justify-content: space-between; gap: 12px; flex-wrap: wrap; margin-bottom: 14px;">
                <h2 style="margin: 0; font-size: 1.05rem; font-weight: 600; color: #e8ecf6;">"Mapa de Clientes"</h2>
                <div style="display: flex; gap: 8px;">
                    <select
                        aria-label="Filtrar por local"
                        style=SELECT_STYLE
                        prop:value=move || place.get()
                        on:change=move |ev| place.set(event_target_value(&ev))
                    >
                        <For
                            each=move || place_opts.get()
                            key=|opt| opt.clone()
                            children=move |opt| {
                                let label = opt.clone();
                                view! { <option value=opt>{label}</option> }
                            }
                        />
                    </select>
                    <select
                        aria-label="Filtrar por tipo"
                        style=SELECT_STYLE
                        prop:value=move || category.get()
                        on:change=move |ev| category.set(event_target_value(&ev))
                    >
                        <For
                            each=move || category_opts.get()
                            key=|opt| opt.clone()
                            children=move |opt| {
                                let label = opt.clone();
                                view! { <option value=opt>{label}</option> }
                            }
                        />
                    </select>
                </div>
            </div>
            <div
                node_ref=container_ref
                style="position: relative; width: 100%; height: 340px; border-radius: 24px; overflow: hidden; background: #0b1125; touch-action: none; user-select: none;"
                style:cursor=move || {
                    if dragging.get() {
                        "grabbing"
                    } else if pointer_on_marker.get() {
                        "pointer"
                    } else {
                        ""
                    }
                }
                on:wheel=on_wheel
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointercancel=move |_: PointerEvent| dragging.set(false)
                on:pointerleave=on_pointer_leave
                on:click=on_click
            >
                <For
                    each=move || viewport.with(visible_tile_coords)
                    key=TileCoord::key
                    children=move |coord: TileCoord| {
                        let rect = move || viewport.with(|vp| coord.screen_rect(vp));
                        view! {
                            <img
                                src=coord.url(BASEMAP_URL_TEMPLATE, retina)
                                alt=""
                                draggable="false"
                                style="position: absolute; left: 0; top: 0; pointer-events: none;"
                                style:transform=move || {
                                    let r = rect();
                                    format!("translate({}px, {}px)", r.left, r.top)
                                }
                                style:width=move || format!("{}px", rect().size)
                                style:height=move || format!("{}px", rect().size)
                            />
                        }
                    }
                />
                <For
                    each=move || {
                        layer.with(|l| {
                            let generation = l.generation();
                            l.markers()
                                .iter()
                                .cloned()
                                .enumerate()
                                .map(|(i, m)| (generation, i, m))
                                .collect::<Vec<_>>()
                        })
                    }
                    key=|(generation, i, _)| (*generation, *i)
                    children=move |(_, _, marker): (u64, usize, Marker)| {
                        let position = marker.position;
                        let size = marker_size.clone();
                        view! {
                            <img
                                src=marker.icon_src
                                alt=marker.location.name
                                draggable="false"
                                style="position: absolute; left: 0; top: 0; pointer-events: none; z-index: 2;"
                                style:width=size.clone()
                                style:height=size
                                style:transform=move || {
                                    let (x, y) = viewport.with(|vp| vp.world_to_screen(position));
                                    format!("translate({x}px, {y}px) translate(-50%, -50%)")
                                }
                            />
                        }
                    }
                />
                {move || {
                    popup.get().map(|marker| {
                        let position = marker.position;
                        let location = marker.location;
                        let title_style = format!(
                            "font-weight: 600; font-size: 0.9rem; color: {}; margin-bottom: 2px;",
                            location.accent_color(),
                        );
                        let category = (!location.category.is_empty()).then(|| location.category.clone());
                        let address = location.address.clone().filter(|a| !a.is_empty());
                        view! {
                            <div
                                node_ref=popup_ref
                                style="position: absolute; left: 0; top: 0; z-index: 5; min-width: 160px; max-width: 260px; background: #0f1830; color: #d6dcec; border: 1px solid #22304f; border-radius: 12px; padding: 10px 12px; box-shadow: 0 8px 24px rgba(0,0,0,0.5); cursor: auto;"
                                style:transform=move || {
                                    let (x, y) = viewport.with(|vp| vp.world_to_screen(position));
                                    format!("translate({x}px, {}px) translate(-50%, -100%)", y + POPUP_OFFSET_Y)
                                }
                                on:pointerdown=|e: PointerEvent| e.stop_propagation()
                                on:click=|e: MouseEvent| e.stop_propagation()
                            >
                                <div style=title_style>{location.name}</div>
                                {category.map(|c| view! {
                                    <div style="font-size: 0.78rem; opacity: 0.8;">{c}</div>
                                })}
                                {address.map(|a| view! {
                                    <div style="font-size: 0.74rem; opacity: 0.6; margin-top: 4px;">{a}</div>
                                })}
                            </div>
                        }
                    })
                }}
                <div style="position: absolute; top: 12px; left: 12px; z-index: 4; background: rgba(15,24,48,0.85); color: #d6dcec; border: 1px solid #22304f; border-radius: 999px; padding: 4px 10px; font-size: 0.75rem; pointer-events: none;">
                    {move || format!("{} pontos", filtered.with(Vec::len))}
                </div>
                {move || {
                    is_loading.get().then(|| view! {
                        <div style="position: absolute; inset: 0; z-index: 6; display: flex; align-items: center; justify-content: center; background: rgba(11,17,37,0.6); color: #aab3c8; font-size: 0.85rem;">
                            "Carregando mapa..."
                        </div>
                    })
                }}
            </div>
        </Card>
    }
}
