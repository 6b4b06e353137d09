//! Header with tab navigation

use leptos::prelude::*;
use water_level_core::state::Tab;

/// Page header; `active` is highlighted. Only the dashboard shows the
/// live connection indicator.
#[component]
pub fn Header(active: Tab) -> impl IntoView {
    let links = Tab::ALL
        .into_iter()
        .map(|tab| {
            let class = if tab == active {
                "nav-link active"
            } else {
                "nav-link"
            };
            view! {
                <a href={tab.path()} class=class data-tab={tab.as_str()}>{tab.title()}</a>
            }
        })
        .collect_view();

    view! {
        <header class="header">
            <h1>"Water Level Monitoring"</h1>
            <nav>{links}</nav>
            {(active == Tab::Dashboard).then(|| {
                view! { <div class="status-indicator" id="connection-status">"Menghubungkan..."</div> }
            })}
        </header>
    }
}
