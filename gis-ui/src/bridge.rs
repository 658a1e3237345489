use chrono::NaiveDateTime;
use gis_core::{GisApi, HttpTransport, Notification, Notifier};
use leptos::*;
use std::time::Duration;
use wasm_bindgen::JsCast;

pub type Api = GisApi<HttpTransport, SignalNotifier>;

const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
}

/// Turns engine notifications into toasts that expire on their own.
#[derive(Clone, Copy)]
pub struct SignalNotifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl SignalNotifier {
    pub fn new(toasts: RwSignal<Vec<Toast>>) -> Self {
        Self {
            toasts,
            next_id: store_value(0),
        }
    }
}

impl Notifier for SignalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            gis_core::Level::Error => logging::error!("{}", notification.message),
            _ => logging::log!("{}", notification.message),
        }

        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|toasts| toasts.push(Toast { id, notification }));

        let toasts = self.toasts;
        set_timeout(
            move || toasts.update(|list| list.retain(|toast| toast.id != id)),
            TOAST_LIFETIME,
        );
    }
}

/// A relative base is resolved against the page origin.
pub fn api_base(base: &str) -> String {
    if !base.starts_with('/') {
        return base.to_string();
    }
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default();
    format!("{origin}{base}")
}

pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Monotonic-enough clock for the search debouncer.
pub fn clock() -> Duration {
    Duration::from_millis(js_sys::Date::now() as u64)
}

/// Hands a generated file to the browser as a download.
pub fn download(file_name: &str, mime: &str, content: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| "document not available".to_string())?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "anchor element unavailable".to_string())?;
    let encoded = String::from(js_sys::encode_uri_component(content));
    anchor.set_href(&format!("data:{mime};charset=utf-8,{encoded}"));
    anchor.set_download(file_name);
    anchor.click();
    Ok(())
}
