//! Code resolution for the deferred worker.
//!
//! [`CatalogResolver`] answers from the in-process catalog only.
//! [`WebResolver`] is the slower, more complete resolver: catalog first, then
//! the module's page on the university site, then the digital archive. Pages
//! are fetched through [`PageFetcher`] so the HTTP client stays outside this
//! crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use oumodules_core::scanner::CODE_PATTERN;
use oumodules_core::{CodeEntry, CodeLookup};

use crate::error::Result;

/// Module codes only, without the qualification forms.
const MODULE_CODE_PATTERN: &str = r"[a-zA-Z]{1,6}[0-9]{1,3}(?:-[a-zA-Z]{1,5})?";

/// Module titles as they appear on course pages.
const MODULE_NAME_PATTERN: &str = r"[A-Z][a-zA-Z0-9,.:;\(\) \-]{1,100}?";

/// Digital archive page for a module.
pub const OUDA_URL_TEMPLATE: &str = "http://www.open.ac.uk/library/digital-archive/module/xcri:{}";

// "<code> | <name> | Open University" and "<name> - Open University Course - <code>".
static HTML_TITLE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let code = format!("(?:{CODE_PATTERN})");
    let name = MODULE_NAME_PATTERN;
    [
        format!(r"{code}\s*[^\s]\s*(?P<name>{name})\s*([^\s]\s*Open University.*)?"),
        format!(r"(?P<name>{name})\s*([^\s]\s*Open University.*)?\s*[^\s]\s{code}"),
    ]
    .iter()
    .map(|title| {
        Regex::new(&format!(r"<title>\s*(?:{title})\s*</title>"))
            .expect("title pattern is a valid regex")
    })
    .collect()
});

static OUDA_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"<title>{MODULE_CODE_PATTERN} (.*?) - Open University Digital Archive</title>"
    ))
    .expect("archive title pattern is a valid regex")
});

/// Extract a module title from a course page's `<title>`.
pub fn find_title_in_html(html: &str) -> Option<&str> {
    HTML_TITLE_RES
        .iter()
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}

/// Extract a module title from a digital archive page.
pub fn find_title_in_archive(html: &str) -> Option<&str> {
    OUDA_TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Module level: the first digit of the code.
pub fn module_level(code: &str) -> Option<u32> {
    code.chars().find_map(|c| c.to_digit(10))
}

/// Course page for a module code.
pub fn module_url(code: &str) -> String {
    let template = match module_level(code) {
        Some(0) => "http://www.open.ac.uk/courses/short-courses/",
        Some(8) => "http://www.open.ac.uk/postgraduate/modules/",
        _ => "http://www.open.ac.uk/courses/modules/",
    };
    format!("{template}{}", code.to_ascii_lowercase())
}

/// URLs a code's page may live at, most likely first.
pub fn candidate_urls(code: &str) -> Vec<String> {
    let lower = code.to_ascii_lowercase();
    match module_level(code) {
        Some(_) => vec![module_url(code)],
        None => vec![format!(
            "http://www.open.ac.uk/courses/qualifications/{lower}"
        )],
    }
}

/// Digital archive URL for a module code.
pub fn archive_url(code: &str) -> String {
    OUDA_URL_TEMPLATE.replace("{}", code)
}

/// Async code resolution used by the worker.
#[async_trait]
pub trait CodeResolver: Send + Sync {
    /// Resolve an uppercase code. `Ok(None)` means the code is unknown.
    async fn resolve(&self, code: &str) -> Result<Option<CodeEntry>>;
}

/// Resolves codes from a catalog only.
#[derive(Debug, Clone)]
pub struct CatalogResolver<L>(pub L);

#[async_trait]
impl<L: CodeLookup + Send + Sync> CodeResolver for CatalogResolver<L> {
    async fn resolve(&self, code: &str) -> Result<Option<CodeEntry>> {
        Ok(self.0.lookup(code))
    }
}

/// Response to a `HEAD` request, after following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHead {
    pub status: u16,
    /// URL the redirects ended at.
    pub final_url: String,
}

/// HTTP access used by [`WebResolver`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `HEAD` `url`, following redirects.
    async fn head(&self, url: &str) -> Result<PageHead>;

    /// `GET` `url`, following redirects, returning the body as text.
    async fn get(&self, url: &str) -> Result<String>;
}

/// Catalog, then course page, then digital archive.
///
/// Fetch failures count as misses for that source. Anything found on the web
/// is remembered for the life of the resolver.
pub struct WebResolver<L, F> {
    catalog: L,
    fetcher: F,
    learned: Mutex<HashMap<String, CodeEntry>>,
}

impl<L: CodeLookup, F: PageFetcher> WebResolver<L, F> {
    pub fn new(catalog: L, fetcher: F) -> Self {
        Self {
            catalog,
            fetcher,
            learned: Mutex::new(HashMap::new()),
        }
    }

    fn learned(&self) -> std::sync::MutexGuard<'_, HashMap<String, CodeEntry>> {
        self.learned.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn learn(&self, entry: &CodeEntry) {
        self.learned().insert(entry.code.clone(), entry.clone());
    }

    /// A page is live if it answers 200 and any redirect kept the code in the URL.
    async fn is_active_url(&self, url: &str, code: &str) -> bool {
        match self.fetcher.head(url).await {
            Ok(head) => {
                head.status == 200
                    && head
                        .final_url
                        .to_ascii_lowercase()
                        .contains(&code.to_ascii_lowercase())
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "page check failed");
                false
            }
        }
    }

    async fn active_url(&self, code: &str) -> Option<String> {
        for url in candidate_urls(code) {
            if self.is_active_url(&url, code).await {
                return Some(url);
            }
        }
        None
    }

    async fn try_catalog(&self, code: &str) -> Option<CodeEntry> {
        let mut entry = self.catalog.lookup(code)?;
        if entry.url.is_none() {
            if let Some(url) = self.active_url(code).await {
                tracing::info!(code, %url, "catalog entry has no url, but page is live");
                entry.url = Some(url);
                self.learn(&entry);
            }
        }
        Some(entry)
    }

    async fn try_course_page(&self, code: &str) -> Option<CodeEntry> {
        let url = self.active_url(code).await?;
        let html = match self.fetcher.get(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(%url, error = %e, "course page fetch failed");
                return None;
            }
        };
        let title = find_title_in_html(&html)?;
        tracing::info!(code, %url, "found via course page");
        Some(CodeEntry::new(code, title, Some(url)))
    }

    async fn try_archive(&self, code: &str) -> Option<CodeEntry> {
        let url = archive_url(code);
        let html = match self.fetcher.get(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(%url, error = %e, "archive fetch failed");
                return None;
            }
        };
        let title = find_title_in_archive(&html)?;
        tracing::info!(code, "found via archive");
        Some(CodeEntry::new(code, title, None))
    }
}

#[async_trait]
impl<L, F> CodeResolver for WebResolver<L, F>
where
    L: CodeLookup + Send + Sync,
    F: PageFetcher,
{
    async fn resolve(&self, code: &str) -> Result<Option<CodeEntry>> {
        let code = code.to_ascii_uppercase();
        let learned = self.learned().get(&code).cloned();
        if let Some(entry) = learned {
            return Ok(Some(entry));
        }
        if let Some(entry) = self.try_catalog(&code).await {
            return Ok(Some(entry));
        }

        let found = match self.try_course_page(&code).await {
            Some(entry) => Some(entry),
            None => self.try_archive(&code).await,
        };
        match &found {
            Some(entry) => self.learn(entry),
            None => tracing::info!(code = %code, "not found on the web"),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteractionError;
    use oumodules_core::CodeCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned site: `url -> (final url, body)`. Unknown URLs answer 404.
    #[derive(Default)]
    struct CannedSite {
        pages: HashMap<String, (String, String)>,
        gets: AtomicUsize,
    }

    impl CannedSite {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages
                .insert(url.to_string(), (url.to_string(), body.to_string()));
            self
        }

        fn redirect(mut self, url: &str, to: &str) -> Self {
            self.pages
                .insert(url.to_string(), (to.to_string(), String::new()));
            self
        }
    }

    #[async_trait]
    impl PageFetcher for CannedSite {
        async fn head(&self, url: &str) -> Result<PageHead> {
            Ok(match self.pages.get(url) {
                Some((final_url, _)) => PageHead {
                    status: 200,
                    final_url: final_url.clone(),
                },
                None => PageHead {
                    status: 404,
                    final_url: url.to_string(),
                },
            })
        }

        async fn get(&self, url: &str) -> Result<String> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .pages
                .get(url)
                .map(|(_, body)| body.clone())
                .unwrap_or_default())
        }
    }

    struct Offline;

    #[async_trait]
    impl PageFetcher for Offline {
        async fn head(&self, _url: &str) -> Result<PageHead> {
            Err(InteractionError::Resolve("timeout".to_string()))
        }

        async fn get(&self, _url: &str) -> Result<String> {
            Err(InteractionError::Resolve("timeout".to_string()))
        }
    }

    fn catalog() -> CodeCatalog {
        CodeCatalog::from_entries([
            (
                "M208",
                "Pure mathematics",
                Some("http://www.open.ac.uk/courses/modules/m208".to_string()),
            ),
            ("A012", "Arts and humanities", None),
        ])
    }

    #[test]
    fn test_title_with_code_first() {
        let html = "<title>\n\t MST125 | Essential Mathematics 2 | Open University\n</title>";
        assert_eq!(find_title_in_html(html), Some("Essential Mathematics 2"));
    }

    #[test]
    fn test_title_with_dash_separator() {
        let html = "<title>\nD241 - Exploring mental health and counselling \
                    - Open University Course\n</title>";
        assert_eq!(
            find_title_in_html(html),
            Some("Exploring mental health and counselling")
        );
    }

    #[test]
    fn test_title_with_code_last() {
        let html = "<title>Environmental science | Open University | S206</title>";
        assert_eq!(find_title_in_html(html), Some("Environmental science"));
    }

    #[test]
    fn test_title_missing() {
        assert_eq!(find_title_in_html("<title>Courses</title>"), None);
        assert_eq!(find_title_in_html("<html></html>"), None);
    }

    #[test]
    fn test_archive_title() {
        let html = "<title>M203 Pure mathematics - Open University Digital Archive</title>";
        assert_eq!(find_title_in_archive(html), Some("Pure mathematics"));
        assert_eq!(find_title_in_archive("<title>Search</title>"), None);
    }

    #[test]
    fn test_urls_by_level() {
        assert_eq!(
            module_url("B012"),
            "http://www.open.ac.uk/courses/short-courses/b012"
        );
        assert_eq!(
            module_url("M820"),
            "http://www.open.ac.uk/postgraduate/modules/m820"
        );
        assert_eq!(module_url("T313"), "http://www.open.ac.uk/courses/modules/t313");
        assert_eq!(
            candidate_urls("QD"),
            vec!["http://www.open.ac.uk/courses/qualifications/qd".to_string()]
        );
        assert_eq!(
            archive_url("M203"),
            "http://www.open.ac.uk/library/digital-archive/module/xcri:M203"
        );
    }

    #[tokio::test]
    async fn test_catalog_hit_needs_no_fetch() {
        let site = CannedSite::default();
        let resolver = WebResolver::new(catalog(), site);

        let entry = resolver.resolve("m208").await.unwrap().unwrap();
        assert_eq!(entry.full_name, "Pure mathematics");
        assert_eq!(resolver.fetcher.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_catalog_entry_gains_live_url() {
        let site = CannedSite::default().page("http://www.open.ac.uk/courses/short-courses/a012", "");
        let resolver = WebResolver::new(catalog(), site);

        let entry = resolver.resolve("A012").await.unwrap().unwrap();
        assert_eq!(
            entry.url.as_deref(),
            Some("http://www.open.ac.uk/courses/short-courses/a012")
        );
    }

    #[tokio::test]
    async fn test_found_via_course_page() {
        let site = CannedSite::default().page(
            "http://www.open.ac.uk/courses/modules/t329",
            "<html><title>T329 | Cryptography and network security | Open University</title></html>",
        );
        let resolver = WebResolver::new(catalog(), site);

        let entry = resolver.resolve("T329").await.unwrap().unwrap();
        assert_eq!(
            entry,
            CodeEntry::new(
                "T329",
                "Cryptography and network security",
                Some("http://www.open.ac.uk/courses/modules/t329".to_string())
            )
        );
    }

    #[tokio::test]
    async fn test_redirect_away_is_not_live() {
        let site = CannedSite::default()
            .redirect(
                "http://www.open.ac.uk/courses/modules/m203",
                "http://www.open.ac.uk/courses/",
            )
            .page(
                "http://www.open.ac.uk/library/digital-archive/module/xcri:M203",
                "<title>M203 Pure mathematics - Open University Digital Archive</title>",
            );
        let resolver = WebResolver::new(catalog(), site);

        let entry = resolver.resolve("M203").await.unwrap().unwrap();
        assert_eq!(entry, CodeEntry::new("M203", "Pure mathematics", None));
    }

    #[tokio::test]
    async fn test_learned_results_are_reused() {
        let site = CannedSite::default().page(
            "http://www.open.ac.uk/library/digital-archive/module/xcri:M203",
            "<title>M203 Pure mathematics - Open University Digital Archive</title>",
        );
        let resolver = WebResolver::new(catalog(), site);

        resolver.resolve("M203").await.unwrap();
        let gets = resolver.fetcher.gets.load(Ordering::SeqCst);
        resolver.resolve("m203").await.unwrap();
        assert_eq!(resolver.fetcher.gets.load(Ordering::SeqCst), gets);
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let resolver = WebResolver::new(catalog(), CannedSite::default());
        assert_eq!(resolver.resolve("M999").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_misses() {
        let resolver = WebResolver::new(catalog(), Offline);

        assert_eq!(resolver.resolve("M999").await.unwrap(), None);
        let entry = resolver.resolve("A012").await.unwrap().unwrap();
        assert_eq!(entry.url, None);
    }
}
