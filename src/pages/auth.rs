use crate::api::ApiError;
use crate::app::use_router;
use crate::components::ui::{
    Alert, AlertDescription, AlertVariant, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::models::Identity;
use crate::state::AppContext;
use crate::storage::StoredSession;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn login_error_message(e: &ApiError) -> String {
    match e {
        ApiError::Unauthorized => "Invalid email or password".to_string(),
        other => other.to_string(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let api = app.api_client.get_untracked();
        let app = app.clone();
        let router = router.clone();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api.login(email_val.trim(), &password_val).await {
                Ok(response) => {
                    app.sign_in(StoredSession {
                        token: response.token,
                        user: response.user,
                    });
                    router.resume_after_sign_in();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sign-in failed");
                    error.set(Some(login_error_message(&e)));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="mx-auto flex min-h-[70vh] w-full max-w-sm flex-col justify-center">
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Sign in"</CardTitle>
                    <CardDescription class="text-xs">"Use your email and password to continue."</CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="email" class="text-xs">"Email"</Label>
                            <Input
                                id="email"
                                r#type="email"
                                placeholder="you@example.com"
                                bind_value=email
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input
                                id="password"
                                r#type="password"
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        {move || {
                            error.get().map(|e| {
                                view! {
                                    <Alert variant=AlertVariant::Destructive>
                                        <AlertDescription class="text-xs">{e}</AlertDescription>
                                    </Alert>
                                }
                            })
                        }}

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <Show when=move || loading.get() fallback=|| ()>
                                <Spinner />
                            </Show>
                            {move || if loading.get() { "Signing in..." } else { "Continue" }}
                        </Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

/// Shown to administrators that are not linked to a client yet.
#[component]
pub fn AdminLandingPage(identity: Option<Identity>) -> impl IntoView {
    let router = use_router();
    let email = identity.map(|i| i.email).unwrap_or_default();

    view! {
        <div class="mx-auto flex min-h-[70vh] w-full max-w-md flex-col justify-center">
            <Card>
                <CardHeader>
                    <CardTitle>"Administrator account"</CardTitle>
                    <CardDescription>{format!("Signed in as {email}")}</CardDescription>
                </CardHeader>
                <CardContent>
                    <p class="text-sm text-muted-foreground">
                        "Your account is not linked to a client yet. Ask an owner to assign one, then sign in again."
                    </p>
                </CardContent>
                <CardContent>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| router.sign_out()>
                        "Sign out"
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}
