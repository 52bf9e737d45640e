use leptos::prelude::*;

/// Rounded panel used for every dashboard section.
#[component]
pub fn Card(#[prop(optional)] title: Option<&'static str>, children: Children) -> impl IntoView {
    view! {
        <section style="background: #0d1429; border: 1px solid #1a2544; border-radius: 24px; padding: 18px 20px; box-shadow: 0 10px 30px rgba(0,0,0,0.35);">
            {title.map(|t| view! {
                <h2 style="margin: 0 0 14px; font-size: 1.05rem; font-weight: 600; color: #e8ecf6;">{t}</h2>
            })}
            {children()}
        </section>
    }
}
