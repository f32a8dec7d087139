use leptos::*;
use leptos_router::{use_navigate, Redirect, Route, Router, Routes};
use wasm_bindgen::prelude::*;
use gloo_file::{File, FileList};
use gloo_timers::future::TimeoutFuture;
use web_sys::{Event, FormData};

use crate::gateway::{ApiConfig, Gateway};
use crate::session::SessionController;
use crate::theme::ThemeSync;
use crate::FileMetadata;

#[component]
pub fn App() -> impl IntoView {
    let theme = ThemeSync::install();
    provide_context(theme);

    let controller = SessionController::new(Gateway::new(ApiConfig::from_build_env()));
    provide_context(controller);

    view! {
        <div class="app">
            <StyleProvider />
            <Router>
                <Routes>
                    <Route path="/" view=|| view! { <Redirect path="/login" /> } />
                    <Route path="/login" view=AuthPage />
                    <Route path="/home" view=HomePage />
                </Routes>
            </Router>
        </div>
    }
}

#[derive(Clone, Copy, PartialEq)]
enum AuthTab {
    Login,
    Register,
}

#[component]
fn AuthPage() -> impl IntoView {
    let (active_tab, set_active_tab) = create_signal(AuthTab::Login);

    view! {
        <div class="auth-grid">
            <div class="auth-header panel">
                <h1>"stashr"</h1>
                <p>"file sharing"</p>
            </div>

            <div class="auth-form-section panel">
                <div class="auth-tabs">
                    <button
                        type="button"
                        class="tab-btn"
                        class:active=move || active_tab.get() == AuthTab::Login
                        on:click=move |_| set_active_tab.set(AuthTab::Login)
                    >
                        "log in"
                    </button>
                    <button
                        type="button"
                        class="tab-btn"
                        class:active=move || active_tab.get() == AuthTab::Register
                        on:click=move |_| set_active_tab.set(AuthTab::Register)
                    >
                        "sign up"
                    </button>
                </div>

                <Show
                    when=move || active_tab.get() == AuthTab::Login
                    fallback=|| view! { <RegisterForm /> }
                >
                    <LoginForm />
                </Show>
            </div>
        </div>
    }
}

#[component]
fn LoginForm() -> impl IntoView {
    let controller = expect_context::<SessionController>();
    let navigate = use_navigate();

    let (username, set_username) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let controller = controller.clone();
        let navigate = navigate.clone();
        let username_val = username.get();
        let password_val = password.get();

        spawn_local(async move {
            match controller.login(&username_val, &password_val).await {
                Ok(_) => {
                    set_error.set(None);
                    navigate("/home", Default::default());
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <form on:submit=on_submit>
            <div class="form-field">
                <label class="field-label">"username"</label>
                <input
                    type="text"
                    class="text-input"
                    prop:value=move || username.get()
                    on:input=move |e| set_username.set(event_target_value(&e))
                    placeholder="enter your username"
                />
            </div>

            <div class="form-field">
                <label class="field-label">"password"</label>
                <input
                    type="password"
                    class="text-input"
                    prop:value=move || password.get()
                    on:input=move |e| set_password.set(event_target_value(&e))
                    placeholder="enter your password"
                />
            </div>

            <Show when=move || error.get().is_some()>
                <div class="form-error">
                    {move || error.get().unwrap_or_default()}
                </div>
            </Show>

            <button type="submit" class="submit-btn">"log in"</button>
        </form>
    }
}

#[component]
fn RegisterForm() -> impl IntoView {
    let controller = expect_context::<SessionController>();

    let (username, set_username) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (confirm_password, set_confirm_password) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let (registered, set_registered) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let controller = controller.clone();
        let username_val = username.get();
        let email_val = email.get();
        let password_val = password.get();
        let confirm_val = confirm_password.get();

        spawn_local(async move {
            match controller
                .register(&username_val, &email_val, &password_val, &confirm_val)
                .await
            {
                Ok(()) => {
                    set_error.set(None);
                    set_registered.set(true);
                }
                Err(message) => {
                    set_registered.set(false);
                    set_error.set(Some(message));
                }
            }
        });
    };

    view! {
        <form on:submit=on_submit>
            <div class="form-field">
                <label class="field-label">"username"</label>
                <input
                    type="text"
                    class="text-input"
                    prop:value=move || username.get()
                    on:input=move |e| set_username.set(event_target_value(&e))
                    placeholder="pick a username"
                />
            </div>

            <div class="form-field">
                <label class="field-label">"email"</label>
                <input
                    type="email"
                    class="text-input"
                    prop:value=move || email.get()
                    on:input=move |e| set_email.set(event_target_value(&e))
                    placeholder="enter your email"
                />
            </div>

            <div class="form-field">
                <label class="field-label">"password"</label>
                <input
                    type="password"
                    class="text-input"
                    prop:value=move || password.get()
                    on:input=move |e| set_password.set(event_target_value(&e))
                    placeholder="create a password"
                />
            </div>

            <div class="form-field">
                <label class="field-label">"confirm password"</label>
                <input
                    type="password"
                    class="text-input"
                    prop:value=move || confirm_password.get()
                    on:input=move |e| set_confirm_password.set(event_target_value(&e))
                    placeholder="repeat password"
                />
            </div>

            <Show when=move || error.get().is_some()>
                <div class="form-error">
                    {move || error.get().unwrap_or_default()}
                </div>
            </Show>

            <Show when=move || registered.get()>
                <div class="form-success">
                    "Account created. You can log in now."
                </div>
            </Show>

            <button type="submit" class="submit-btn">"create account"</button>
        </form>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let controller = expect_context::<SessionController>();
    let navigate = use_navigate();

    let (files, set_files) = create_signal(Vec::<FileMetadata>::new());
    let (is_loading, set_is_loading) = create_signal(false);

    {
        let controller = controller.clone();
        create_effect(move |_| {
            let controller = controller.clone();
            spawn_local(async move {
                load_files(&controller, set_files, set_is_loading).await;
            });
        });
    }

    let on_logout = {
        let controller = controller.clone();
        move |_| {
            controller.logout();
            navigate("/login", Default::default());
        }
    };

    let reload = {
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            spawn_local(async move {
                load_files(&controller, set_files, set_is_loading).await;
            });
        }
    };

    view! {
        <div class="main-grid">
            <div class="header-section panel">
                <div class="header-row">
                    <div>
                        <h1>"stashr"</h1>
                        <p>"your files, anywhere"</p>
                    </div>
                    <div class="header-actions">
                        <ThemeToggle />
                        <button type="button" class="logout-btn" on:click=on_logout>
                            "logout"
                        </button>
                    </div>
                </div>
            </div>

            <div class="upload-section panel">
                <UploadButton on_upload_complete=reload />
            </div>

            <div class="files-section panel">
                <FileListSection files=files is_loading=is_loading />
            </div>
        </div>
    }
}

#[component]
fn ThemeToggle() -> impl IntoView {
    let theme = expect_context::<ThemeSync>();
    let mode = theme.mode();

    view! {
        <label class="theme-toggle">
            <input
                type="checkbox"
                prop:checked=move || mode.get().is_dark()
                on:change=move |_| theme.toggle()
            />
            <span>{move || if mode.get().is_dark() { "dark" } else { "light" }}</span>
        </label>
    }
}

#[component]
fn UploadButton<F>(on_upload_complete: F) -> impl IntoView
where
    F: Fn() + Clone + 'static,
{
    let controller = expect_context::<SessionController>();
    let (notice, set_notice) = create_signal(None::<(bool, String)>);
    let file_input_ref = create_node_ref::<html::Input>();

    // Selecting a file fires the upload immediately; there is no separate
    // submit step.
    let on_file_change = {
        let controller = controller.clone();
        move |_ev: Event| {
            let Some(input) = file_input_ref.get_untracked() else {
                return;
            };
            let Some(file_list) = input.files() else {
                return;
            };
            let Some(file) = FileList::from(file_list).first().cloned() else {
                return;
            };
            input.set_value("");

            let controller = controller.clone();
            let on_upload_complete = on_upload_complete.clone();
            spawn_local(async move {
                let (ok, message) = match upload_file(&controller, &file).await {
                    Ok(()) => (true, "Upload successful!".to_string()),
                    Err(e) => {
                        log::error!("upload failed: {e}");
                        (false, "Error uploading file.".to_string())
                    }
                };
                if ok {
                    on_upload_complete();
                }
                set_notice.set(Some((ok, message)));
                TimeoutFuture::new(3_000).await;
                set_notice.set(None);
            });
        }
    };

    let on_choose_click = move |_| {
        if let Some(input) = file_input_ref.get_untracked() {
            input.click();
        }
    };

    view! {
        <div>
            <Show when=move || notice.get().is_some()>
                <div class=move || {
                    let ok = notice.get().map(|(ok, _)| ok).unwrap_or(false);
                    if ok {
                        "upload-notice notice-ok"
                    } else {
                        "upload-notice notice-err"
                    }
                }>
                    {move || notice.get().map(|(_, message)| message).unwrap_or_default()}
                </div>
            </Show>

            <input
                type="file"
                ref=file_input_ref
                on:change=on_file_change
                style="display: none;"
            />
            <button type="button" class="upload-btn" on:click=on_choose_click>
                "upload a file"
            </button>
        </div>
    }
}

#[component]
fn FileListSection(
    files: ReadSignal<Vec<FileMetadata>>,
    is_loading: ReadSignal<bool>,
) -> impl IntoView {
    view! {
        <div>
            <Show
                when=move || is_loading.get()
                fallback=move || {
                    view! {
                        <Show
                            when=move || !files.get().is_empty()
                            fallback=|| {
                                view! {
                                    <div class="empty-state">
                                        <div>"no files yet"</div>
                                        <div class="empty-hint">"upload something to get started"</div>
                                    </div>
                                }
                            }
                        >
                            <div class="files-grid">
                                <For
                                    each=move || files.get()
                                    key=|file| file.name.clone()
                                    let:file
                                >
                                    <div class="file-item">
                                        <div class="file-name">{file.name.clone()}</div>
                                        <span class="file-type-badge">{file.file_type.clone()}</span>
                                        <div class="file-meta">
                                            "size: " {format_file_size(file.file_size)}
                                        </div>
                                        <div class="file-meta">
                                            "added: " {file.created_at.clone()}
                                        </div>
                                    </div>
                                </For>
                            </div>
                        </Show>
                    }
                }
            >
                <div class="empty-state">"loading files..."</div>
            </Show>
        </div>
    }
}

async fn load_files(
    controller: &SessionController,
    set_files: WriteSignal<Vec<FileMetadata>>,
    set_is_loading: WriteSignal<bool>,
) {
    set_is_loading.set(true);
    match controller
        .gateway()
        .get_json::<Vec<FileMetadata>>("/files/")
        .await
    {
        Ok(list) => set_files.set(list),
        Err(e) => {
            log::error!("failed to load files: {e}");
            set_files.set(Vec::new());
        }
    }
    set_is_loading.set(false);
}

async fn upload_file(controller: &SessionController, file: &File) -> Result<(), String> {
    let form = FormData::new().map_err(|_| "Failed to create FormData".to_string())?;
    form.append_with_blob("file", file.as_ref())
        .map_err(|_| "Failed to append file to FormData".to_string())?;

    controller
        .gateway()
        .post_multipart(&format!("/files/{}", file.name()), form)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[wasm_bindgen]
pub fn run() {
    console_error_panic_hook::set_once();
    mount_to_body(|| view! { <App /> });
}

// CSS-in-Rust: one stylesheet constant, themed off the body-level
// dark-mode / light-mode classes the synchronizer maintains.
const MAIN_STYLES: &str = r#"
body {
    font-family: "DM Mono", monospace;
    margin: 0;
    padding: 20px;
    transition: background-color 0.2s ease-out, color 0.2s ease-out;
}

body.dark-mode {
    background-color: #1e1e2e;
    color: #cdd6f4;
}

body.light-mode {
    background-color: #eff1f5;
    color: #4c4f69;
}

.app {
    max-width: 1000px;
    margin: 0 auto;
}

.panel {
    border: 2px solid #6c7086;
    padding: 20px;
    margin: 20px 0;
}

.main-grid, .auth-grid {
    display: grid;
    gap: 20px;
}

.auth-grid {
    max-width: 480px;
    margin: 0 auto;
}

.auth-header, .header-section {
    text-align: center;
}

.header-row {
    display: flex;
    justify-content: space-between;
    align-items: center;
}

.header-actions {
    display: flex;
    align-items: center;
    gap: 12px;
}

.auth-tabs {
    display: flex;
    gap: 8px;
    margin-bottom: 20px;
}

.tab-btn, .submit-btn, .upload-btn, .logout-btn {
    font-family: inherit;
    font-size: 15px;
    background: none;
    color: inherit;
    border: 2px solid #6c7086;
    padding: 10px 16px;
    cursor: pointer;
}

.tab-btn.active {
    border-color: #89b4fa;
}

.submit-btn {
    width: 100%;
    margin-top: 10px;
}

.form-field {
    margin-bottom: 16px;
}

.field-label {
    display: block;
    font-size: 13px;
    margin-bottom: 6px;
}

.text-input {
    width: 100%;
    box-sizing: border-box;
    font-family: inherit;
    font-size: 15px;
    background: none;
    color: inherit;
    border: 2px solid #6c7086;
    padding: 10px 12px;
}

.form-error {
    border: 2px solid #f38ba8;
    color: #f38ba8;
    padding: 10px 12px;
    margin-bottom: 12px;
    font-size: 14px;
}

.form-success {
    border: 2px solid #a6e3a1;
    color: #a6e3a1;
    padding: 10px 12px;
    margin-bottom: 12px;
    font-size: 14px;
}

.upload-notice {
    padding: 10px 12px;
    margin-bottom: 12px;
    font-size: 14px;
    border: 2px solid;
}

.notice-ok {
    border-color: #a6e3a1;
    color: #a6e3a1;
}

.notice-err {
    border-color: #f38ba8;
    color: #f38ba8;
}

.theme-toggle {
    display: inline-flex;
    align-items: center;
    gap: 6px;
    font-size: 14px;
    cursor: pointer;
}

.files-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
    gap: 16px;
}

.file-item {
    border: 2px solid #6c7086;
    padding: 16px;
}

.file-name {
    font-weight: 500;
    word-break: break-word;
    margin-bottom: 8px;
}

.file-type-badge {
    font-size: 12px;
    padding: 2px 6px;
    border: 1px solid;
    text-transform: uppercase;
}

.file-meta {
    font-size: 13px;
    margin-top: 8px;
    opacity: 0.8;
}

.empty-state {
    text-align: center;
    padding: 30px 10px;
}

.empty-hint {
    font-size: 13px;
    opacity: 0.7;
    margin-top: 4px;
}
"#;

#[component]
fn StyleProvider() -> impl IntoView {
    view! {
        <style>{MAIN_STYLES}</style>
    }
}
