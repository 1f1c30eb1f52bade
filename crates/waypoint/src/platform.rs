//! The environment a router runs in: a server answering one request, or a
//! browser-like client with an address bar and scroll position.

use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Server,
    Client,
}

pub trait Platform: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Path and query of the current URL
    fn current_path(&self) -> String;

    fn scroll_to(&self, x: f64, y: f64);

    fn scroll_position(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    /// Add a history entry without loading it
    fn push_state(&self, url: &str);

    fn replace_state(&self, url: &str);

    /// Full navigation away from the application (or an HTTP redirect)
    fn redirect(&self, url: &str, status: u16);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub url: String,
    pub status: u16,
}

/// Platform for rendering one server request.
#[derive(Debug)]
pub struct ServerPlatform {
    path: String,
    redirect: Mutex<Option<Redirect>>,
}

impl ServerPlatform {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect: Mutex::new(None),
        }
    }

    /// The redirect requested while handling the request, if any
    pub fn redirected(&self) -> Option<Redirect> {
        self.redirect.lock().clone()
    }
}

impl Platform for ServerPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Server
    }

    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn scroll_to(&self, _x: f64, _y: f64) {}

    fn push_state(&self, _url: &str) {}

    fn replace_state(&self, _url: &str) {}

    fn redirect(&self, url: &str, status: u16) {
        debug!(url, status, "server redirect");
        *self.redirect.lock() = Some(Redirect {
            url: url.to_string(),
            status,
        });
    }
}

#[derive(Debug, Default)]
struct AddressBar {
    entries: Vec<String>,
    index: usize,
    scroll: (f64, f64),
    hard_navigations: Vec<String>,
}

/// In-memory client platform: a history stack, a scroll position and a log
/// of full page loads.
#[derive(Debug)]
pub struct HistoryPlatform {
    origin: String,
    inner: Mutex<AddressBar>,
}

impl HistoryPlatform {
    /// Start at `url` on `origin` (e.g. `http://localhost:3000`)
    pub fn new(origin: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            inner: Mutex::new(AddressBar {
                entries: vec![url.into()],
                ..AddressBar::default()
            }),
        }
    }

    pub fn current_url(&self) -> String {
        let bar = self.inner.lock();
        bar.entries.get(bar.index).cloned().unwrap_or_default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().entries.clone()
    }

    /// URLs loaded with a full navigation
    pub fn hard_navigations(&self) -> Vec<String> {
        self.inner.lock().hard_navigations.clone()
    }

    /// Step back one entry, returning the URL now current
    pub fn back(&self) -> Option<String> {
        let mut bar = self.inner.lock();
        if bar.index == 0 {
            return None;
        }
        bar.index -= 1;
        bar.entries.get(bar.index).cloned()
    }

    pub fn forward(&self) -> Option<String> {
        let mut bar = self.inner.lock();
        if bar.index + 1 >= bar.entries.len() {
            return None;
        }
        bar.index += 1;
        bar.entries.get(bar.index).cloned()
    }
}

impl Platform for HistoryPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Client
    }

    fn current_path(&self) -> String {
        let url = self.current_url();
        match url.strip_prefix(&self.origin) {
            Some("") => "/".to_string(),
            Some(path) => path.to_string(),
            None => url,
        }
    }

    fn scroll_to(&self, x: f64, y: f64) {
        self.inner.lock().scroll = (x, y);
    }

    fn scroll_position(&self) -> (f64, f64) {
        self.inner.lock().scroll
    }

    fn push_state(&self, url: &str) {
        let mut bar = self.inner.lock();
        let next = bar.index + 1;
        bar.entries.truncate(next);
        bar.entries.push(url.to_string());
        bar.index = next;
    }

    fn replace_state(&self, url: &str) {
        let mut bar = self.inner.lock();
        let index = bar.index;
        if let Some(entry) = bar.entries.get_mut(index) {
            *entry = url.to_string();
        }
    }

    fn redirect(&self, url: &str, _status: u16) {
        debug!(url, "full page navigation");
        self.inner.lock().hard_navigations.push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_push_back_forward() {
        let platform = HistoryPlatform::new("http://localhost", "http://localhost/");
        platform.push_state("http://localhost/a");
        platform.push_state("http://localhost/b?x=1");
        assert_eq!(platform.current_path(), "/b?x=1");

        assert_eq!(platform.back().as_deref(), Some("http://localhost/a"));
        assert_eq!(platform.current_path(), "/a");

        platform.push_state("http://localhost/c");
        assert_eq!(platform.forward(), None);
        assert_eq!(platform.entries().len(), 3);
    }

    #[test]
    fn test_replace_and_scroll() {
        let platform = HistoryPlatform::new("http://localhost", "http://localhost");
        assert_eq!(platform.current_path(), "/");
        platform.replace_state("http://localhost/x");
        assert_eq!(platform.entries(), vec!["http://localhost/x".to_string()]);

        platform.scroll_to(0.0, 120.0);
        assert_eq!(platform.scroll_position(), (0.0, 120.0));
    }

    #[test]
    fn test_server_records_redirect() {
        let platform = ServerPlatform::new("/old");
        assert_eq!(platform.redirected(), None);
        platform.redirect("/new", 301);
        assert_eq!(
            platform.redirected(),
            Some(Redirect {
                url: "/new".into(),
                status: 301
            })
        );
    }
}
