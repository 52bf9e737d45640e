use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use nortus_shared::{DashboardResponse, MapLocationsResponse, ServiceError};

use crate::clients_map::ClientsMap;
use crate::dashboard::DashboardSummary;
use crate::services;
use crate::toast::{ToastHost, Toasts};

/// Latest result of one endpoint plus its in-flight state.
///
/// Every request takes a fresh nonce; a response is applied only while its
/// nonce is still the newest, so a slow earlier request can never overwrite a
/// later one.
struct Fetched<T: Send + Sync + 'static> {
    data: RwSignal<Option<T>>,
    loading: RwSignal<bool>,
    nonce: RwSignal<u64>,
}

impl<T: Send + Sync + 'static> Clone for Fetched<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for Fetched<T> {}

impl<T: Send + Sync + 'static> Fetched<T> {
    fn new() -> Self {
        Self {
            data: RwSignal::new(None),
            loading: RwSignal::new(false),
            nonce: RwSignal::new(0),
        }
    }

    fn begin(&self) -> u64 {
        let nonce = self.nonce.get_untracked().wrapping_add(1);
        self.nonce.set(nonce);
        self.loading.set(true);
        nonce
    }

    fn finish(&self, nonce: u64, result: Result<T, ServiceError>) {
        if self.nonce.try_get_untracked() != Some(nonce) {
            return;
        }
        // Errors were already toasted; drop the old payload rather than show it as current.
        self.data.set(result.ok());
        self.loading.set(false);
    }
}

#[component]
pub fn App() -> impl IntoView {
    let toasts = Toasts::new();
    provide_context(toasts);

    let locations = Fetched::<MapLocationsResponse>::new();
    let dashboard = Fetched::<DashboardResponse>::new();

    let refresh = move || {
        let nonce = locations.begin();
        spawn_local(async move {
            let result = services::get_locations(toasts).await;
            locations.finish(nonce, result);
        });

        let nonce = dashboard.begin();
        spawn_local(async move {
            let result = services::get_dashboard(toasts).await;
            dashboard.finish(nonce, result);
        });
    };

    // Initial load on mount
    Effect::new(move || refresh());

    let busy = Memo::new(move |_| locations.loading.get() || dashboard.loading.get());

    view! {
        <main style="min-height: 100vh; box-sizing: border-box; padding: 24px; background: #070c1c; color: #e8ecf6; font-family: 'Inter', system-ui, sans-serif;">
            <div style="max-width: 1200px; margin: 0 auto; display: flex; flex-direction: column; gap: 20px;">
                <header style="display: flex; align-items: center; justify-content: space-between; gap: 12px;">
                    <h1 style="margin: 0; font-size: 1.4rem; font-weight: 700;">"Dashboard"</h1>
                    <button
                        style="background: #2DB3C8; color: #04121a; border: none; border-radius: 999px; padding: 8px 16px; font-size: 0.85rem; font-weight: 600; cursor: pointer;"
                        style:opacity=move || if busy.get() { "0.6" } else { "1" }
                        disabled=move || busy.get()
                        on:click=move |_| refresh()
                    >
                        {move || if busy.get() { "Atualizando..." } else { "Atualizar" }}
                    </button>
                </header>
                <DashboardSummary is_loading=dashboard.loading data=dashboard.data />
                <ClientsMap is_loading=locations.loading infos=locations.data />
            </div>
            <ToastHost />
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_response_is_ignored() {
        let owner = Owner::new();
        owner.set();

        let slot = Fetched::<u32>::new();
        let first = slot.begin();
        let second = slot.begin();
        assert_ne!(first, second);

        slot.finish(first, Ok(1));
        assert_eq!(slot.data.get_untracked(), None);
        assert!(slot.loading.get_untracked());

        slot.finish(second, Ok(2));
        assert_eq!(slot.data.get_untracked(), Some(2));
        assert!(!slot.loading.get_untracked());
    }

    #[test]
    fn failed_refresh_clears_previous_data() {
        let owner = Owner::new();
        owner.set();

        let slot = Fetched::<u32>::new();
        let nonce = slot.begin();
        slot.finish(nonce, Ok(7));

        let nonce = slot.begin();
        slot.finish(nonce, Err(ServiceError::Network("Erro ao buscar locais".into())));
        assert_eq!(slot.data.get_untracked(), None);
        assert!(!slot.loading.get_untracked());
    }
}
