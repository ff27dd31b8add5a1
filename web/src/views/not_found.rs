use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    let navigate = use_navigate();

    view! {
        <div style="min-height: 100vh; background: linear-gradient(135deg, #f8fafc, #e2e8f0); display: flex; align-items: center; justify-content: center; padding: 1rem;">
            <div style="max-width: 600px; width: 100%; text-align: center;">
                <div style="font-size: 8rem; font-weight: 900; color: transparent; background: linear-gradient(135deg, #f97316, #b91c1c); background-clip: text; -webkit-background-clip: text; margin: 0 0 2rem 0; line-height: 1;">
                    "404"
                </div>

                <div style="background: white; border-radius: 20px; padding: 3rem 2rem; box-shadow: 0 20px 40px rgba(0,0,0,0.1);">
                    <h1 style="font-size: 2.5rem; font-weight: 700; color: #2d3748; margin: 0 0 1rem 0;">
                        "Page Not Found"
                    </h1>

                    <p style="font-size: 1.2rem; color: #4a5568; margin: 0 0 2rem 0; line-height: 1.6;">
                        "There is nothing mapped at this address."
                    </p>

                    <button
                        on:click=move |_| navigate("/", Default::default())
                        style="background: linear-gradient(135deg, #f97316, #b91c1c); color: white; padding: 1rem 1.5rem; border-radius: 12px; border: none; font-size: 1rem; font-weight: 600; cursor: pointer;">
                        "Back to the map"
                    </button>
                </div>
            </div>
        </div>
    }
}
