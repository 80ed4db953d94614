use serde::Serialize;
use slog::Logger;
use strum::IntoEnumIterator;
use url::Url;

use crate::{
    config::Config,
    document::Document,
    links,
    locale::Locale,
    store::PreferenceStore,
    translations::{Field, LabelledLink, TranslationTable},
};

/// Where the active locale of a page load came from.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocaleSource {
    Query,
    Stored,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub locale: Locale,
    pub source: LocaleSource,
}

/// Picks the locale for a page load: a valid query parameter wins and is
/// written back to the store, then the stored preference, then the
/// configured default.
pub fn resolve(
    location: &Url,
    store: &mut impl PreferenceStore,
    config: &Config,
    logger: &Logger,
) -> Resolution {
    let from_query = location
        .query_pairs()
        .find(|(key, _)| key == config.query_param.as_str())
        .and_then(|(_, value)| Locale::from_code(&value));

    if let Some(locale) = from_query {
        if let Err(err) = store.set(&config.storage_key, locale.code()) {
            slog::warn!(logger, "store.write_failed"; "key" => &config.storage_key, "err" => ?err);
        }
        return Resolution {
            locale,
            source: LocaleSource::Query,
        };
    }

    let stored = match store.get(&config.storage_key) {
        Ok(value) => value,
        Err(err) => {
            slog::warn!(logger, "store.read_failed"; "key" => &config.storage_key, "err" => ?err);
            None
        }
    };

    match stored.as_deref().and_then(Locale::from_code) {
        Some(locale) => Resolution {
            locale,
            source: LocaleSource::Stored,
        },
        None => Resolution {
            locale: config.default_locale,
            source: LocaleSource::Default,
        },
    }
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub updated: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteReport {
    pub rewritten: usize,
    pub fallback: usize,
    pub untouched: usize,
}

/// Locale state for one page load.
///
/// Built once per page with [`LocalePresenter::new`], which performs the
/// resolution step; every later change goes through [`toggle`] or [`set`]
/// and is applied in place, with [`location`] tracking the URL the host
/// should show in the address bar.
///
/// [`toggle`]: LocalePresenter::toggle
/// [`set`]: LocalePresenter::set
/// [`location`]: LocalePresenter::location
pub struct LocalePresenter<'a, S: PreferenceStore> {
    config: &'a Config,
    store: S,
    location: Url,
    locale: Locale,
    source: LocaleSource,
    logger: Logger,
}

impl<'a, S: PreferenceStore> LocalePresenter<'a, S> {
    pub fn new(config: &'a Config, location: Url, mut store: S, logger: &Logger) -> Self {
        let logger = logger.new(slog::o!("subsystem" => "locale.presenter"));
        let Resolution { locale, source } = resolve(&location, &mut store, config, &logger);

        slog::info!(logger, "locale.resolved"; "locale" => locale.code(), "source" => %source);

        Self {
            config,
            store,
            location,
            locale,
            source,
            logger,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn source(&self) -> LocaleSource {
        self.source
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// First paint: strings for the resolved locale, then the links.
    pub fn load(&self, document: &mut impl Document) -> (ApplyReport, RewriteReport) {
        let applied = self.apply(document, self.locale);
        let rewritten = self.rewrite_links(document);
        (applied, rewritten)
    }

    /// Writes every field `locale` has a string for into its element.
    /// Elements without a string, and strings without an element, are
    /// left alone.
    pub fn apply(&self, document: &mut impl Document, locale: Locale) -> ApplyReport {
        let table = TranslationTable::for_locale(locale);
        let mut report = ApplyReport::default();

        for field in Field::iter() {
            let Some(id) = field.element_id() else {
                continue;
            };

            let written = if field.is_composite() {
                self.composite_markup(table, field)
                    .map(|markup| document.set_html(id, &markup))
            } else {
                table.get(field).map(|text| document.set_text(id, text))
            };

            match written {
                Some(true) => report.updated.push(id),
                _ => report.skipped.push(id),
            }
        }

        slog::debug!(self.logger, "locale.applied";
            "locale" => locale.code(),
            "updated" => report.updated.len(),
            "skipped" => report.skipped.len());
        report
    }

    fn composite_markup(&self, table: &TranslationTable, field: Field) -> Option<String> {
        match field {
            Field::EmailLabel => {
                let label = table.get(Field::EmailLabel)?;
                let mailto = self.config.mailto();
                let link = LabelledLink::new(label, &mailto, &self.config.contact_email, false);
                Some(link.to_html())
            }
            Field::ResearchLabel => {
                let label = table.get(Field::ResearchLabel)?;
                let text = table.get(Field::ScholarLink)?;
                Some(LabelledLink::new(label, &self.config.scholar_url, text, true).to_html())
            }
            _ => None,
        }
    }

    /// Tags every same-site link with the current locale. A link that
    /// fails to resolve gets the degraded rewrite on its own.
    pub fn rewrite_links(&self, document: &mut impl Document) -> RewriteReport {
        let param = self.config.query_param.as_str();
        let mut report = RewriteReport::default();

        for index in 0..document.link_count() {
            let Some(href) = document.link_href(index) else {
                continue;
            };
            let href = links::trim_href(href).to_owned();

            let kind = links::classify(&href);
            if !kind.is_rewritable() {
                slog::trace!(self.logger, "link.untouched"; "href" => &href, "kind" => %kind);
                report.untouched += 1;
                continue;
            }

            let rewritten = match links::rewrite_href(&href, &self.location, param, self.locale) {
                Ok(rewritten) => {
                    report.rewritten += 1;
                    rewritten
                }
                Err(err) => {
                    slog::warn!(self.logger, "link.rewrite_fallback"; "href" => &href, "err" => %err);
                    report.fallback += 1;
                    links::fallback_href(&href, param, self.locale)
                }
            };
            document.set_link_href(index, rewritten);
        }

        report
    }

    /// Switches to the other locale in place. The new address-bar URL is
    /// available from [`location`](LocalePresenter::location) afterwards.
    pub fn toggle(&mut self, document: &mut impl Document) -> (ApplyReport, RewriteReport) {
        let next = self.locale.toggled();
        self.switch_to(document, next)
    }

    /// Switches to `code` if it names a supported locale. Anything else is
    /// ignored and `None` is returned.
    pub fn set(
        &mut self,
        document: &mut impl Document,
        code: &str,
    ) -> Option<(ApplyReport, RewriteReport)> {
        match Locale::from_code(code) {
            Some(locale) => Some(self.switch_to(document, locale)),
            None => {
                slog::debug!(self.logger, "locale.set_ignored"; "value" => code);
                None
            }
        }
    }

    fn switch_to(
        &mut self,
        document: &mut impl Document,
        locale: Locale,
    ) -> (ApplyReport, RewriteReport) {
        self.locale = locale;

        if let Err(err) = self.store.set(&self.config.storage_key, locale.code()) {
            slog::warn!(self.logger, "store.write_failed"; "key" => &self.config.storage_key, "err" => ?err);
        }
        set_query_param(&mut self.location, &self.config.query_param, locale);

        slog::info!(self.logger, "locale.changed"; "locale" => locale.code(), "url" => %self.location);

        let applied = self.apply(document, locale);
        let rewritten = self.rewrite_links(document);
        (applied, rewritten)
    }
}

/// Replaces the first `param` pair in place, dropping duplicates, or
/// appends one.
fn set_query_param(url: &mut Url, param: &str, locale: Locale) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut placed = false;
    for (key, value) in url.query_pairs() {
        if key == param {
            if !placed {
                pairs.push((param.to_owned(), locale.code().to_owned()));
                placed = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    if !placed {
        pairs.push((param.to_owned(), locale.code().to_owned()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::{Content, StaticPage},
        store::{MemoryStore, StoreError},
    };

    fn logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::other("storage disabled").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("storage disabled").into())
        }
    }

    #[test]
    fn query_wins_and_is_persisted() {
        let config = Config::default();
        for locale in [Locale::English, Locale::Hindi] {
            let mut store = MemoryStore::new().with_entry("preferredLang", locale.toggled().code());
            let location = url(&format!("https://lovegrover.com/?lang={locale}"));

            let resolution = resolve(&location, &mut store, &config, &logger());

            assert_eq!(resolution.locale, locale);
            assert_eq!(resolution.source, LocaleSource::Query);
            assert_eq!(store.get("preferredLang").unwrap().as_deref(), Some(locale.code()));
        }
    }

    #[test]
    fn stored_preference_without_query() {
        let config = Config::default();
        let mut store = MemoryStore::new().with_entry("preferredLang", "hi");

        let resolution = resolve(&url("https://lovegrover.com/contact"), &mut store, &config, &logger());

        assert_eq!(resolution.locale, Locale::Hindi);
        assert_eq!(resolution.source, LocaleSource::Stored);
    }

    #[test]
    fn invalid_query_falls_through_to_store() {
        let config = Config::default();
        let mut store = MemoryStore::new().with_entry("preferredLang", "hi");

        let resolution = resolve(&url("https://lovegrover.com/?lang=fr"), &mut store, &config, &logger());

        assert_eq!(resolution.locale, Locale::Hindi);
        assert_eq!(store.get("preferredLang").unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn defaults_to_english() {
        let config = Config::default();
        let location = url("https://lovegrover.com/");

        let mut empty = MemoryStore::new();
        assert_eq!(
            resolve(&location, &mut empty, &config, &logger()),
            Resolution {
                locale: Locale::English,
                source: LocaleSource::Default
            }
        );

        let mut corrupt = MemoryStore::new().with_entry("preferredLang", "klingon");
        assert_eq!(resolve(&location, &mut corrupt, &config, &logger()).locale, Locale::English);
    }

    #[test]
    fn broken_store_never_fails_resolution() {
        let config = Config::default();

        let resolution = resolve(&url("https://lovegrover.com/"), &mut BrokenStore, &config, &logger());
        assert_eq!(resolution.locale, Locale::English);

        let resolution = resolve(&url("https://lovegrover.com/?lang=hi"), &mut BrokenStore, &config, &logger());
        assert_eq!(resolution.locale, Locale::Hindi);
    }

    #[test]
    fn apply_leaves_untranslated_and_missing_targets_alone() {
        let config = Config::default();
        let presenter = LocalePresenter::new(&config, url("https://lovegrover.com/"), MemoryStore::new(), &logger());
        let mut page = StaticPage::new()
            .with_text("mainHeading", "placeholder")
            .with_text("footer", "© 2024");

        let report = presenter.apply(&mut page, Locale::Hindi);

        assert_eq!(page.text("mainHeading"), Some("लव ग्रोवर"));
        assert_eq!(page.text("footer"), Some("© 2024"));
        assert_eq!(report.updated, vec!["mainHeading"]);
        assert!(report.skipped.contains(&"blogIntro"));
    }

    #[test]
    fn apply_writes_composite_labels_as_markup() {
        let config = Config::default();
        let presenter = LocalePresenter::new(&config, url("https://lovegrover.com/contact"), MemoryStore::new(), &logger());
        let mut page = StaticPage::new()
            .with_text("emailLabel", "")
            .with_text("researchLabel", "");

        presenter.apply(&mut page, Locale::English);

        assert_eq!(
            page.content("emailLabel"),
            Some(&Content::Html(
                r#"Email: <a href="mailto:contact@lovegrover.com">contact@lovegrover.com</a>"#.to_owned()
            ))
        );
        assert_eq!(
            page.content("researchLabel"),
            Some(&Content::Html(
                r#"Research: <a href="https://scholar.google.com/citations?user=CdQaSogAAAAJ&amp;hl=en" target="_blank">Google Scholar Profile</a>"#.to_owned()
            ))
        );
    }

    #[test]
    fn rewrite_skips_external_mailto_and_fragments() {
        let config = Config::default();
        let presenter = LocalePresenter::new(&config, url("https://lovegrover.com/?lang=hi"), MemoryStore::new(), &logger());
        let mut page = StaticPage::new()
            .with_link("https://scholar.google.com/citations?user=CdQaSogAAAAJ")
            .with_link("mailto:contact@lovegrover.com")
            .with_link("#writer")
            .with_link("blog.html?page=2");

        let report = presenter.rewrite_links(&mut page);

        assert_eq!(
            page.hrefs(),
            vec![
                "https://scholar.google.com/citations?user=CdQaSogAAAAJ",
                "mailto:contact@lovegrover.com",
                "#writer",
                "blog.html?page=2&lang=hi",
            ]
        );
        assert_eq!(
            report,
            RewriteReport {
                rewritten: 1,
                fallback: 0,
                untouched: 3
            }
        );
    }

    #[test]
    fn padded_hrefs_are_classified_after_trimming() {
        let config = Config::default();
        let presenter = LocalePresenter::new(&config, url("https://lovegrover.com/?lang=hi"), MemoryStore::new(), &logger());
        let mut page = StaticPage::new()
            .with_link(" https://scholar.google.com/x")
            .with_link(" mailto:contact@lovegrover.com")
            .with_link(" #top")
            .with_link("\n/contact ");

        let report = presenter.rewrite_links(&mut page);

        assert_eq!(
            page.hrefs(),
            vec![
                " https://scholar.google.com/x",
                " mailto:contact@lovegrover.com",
                " #top",
                "/contact?lang=hi",
            ]
        );
        assert_eq!(report.untouched, 3);
        assert_eq!(report.rewritten, 1);
    }

    #[test]
    fn unresolvable_link_falls_back_alone() {
        let config = Config::default();
        let presenter = LocalePresenter::new(
            &config,
            url("about:blank"),
            MemoryStore::new().with_entry("preferredLang", "hi"),
            &logger(),
        );
        let mut page = StaticPage::new()
            .with_link("/contact?page=2")
            .with_link("https://lovegrover.com/");

        let report = presenter.rewrite_links(&mut page);

        assert_eq!(page.hrefs(), vec!["/contact?lang=hi", "https://lovegrover.com/"]);
        assert_eq!(report.fallback, 1);
        assert_eq!(report.untouched, 1);
    }

    #[test]
    fn toggle_twice_restores_everything() {
        let config = Config::default();
        let mut presenter = LocalePresenter::new(
            &config,
            url("https://lovegrover.com/contact?ref=nav"),
            MemoryStore::new(),
            &logger(),
        );
        let mut page = StaticPage::new()
            .with_text("mainHeading", "")
            .with_link("/index.html");
        presenter.load(&mut page);
        let before = page.clone();

        let (applied, links) = presenter.toggle(&mut page);
        assert_eq!(presenter.locale(), Locale::Hindi);
        assert_eq!(
            presenter.location().as_str(),
            "https://lovegrover.com/contact?ref=nav&lang=hi"
        );
        assert_eq!(applied.updated, vec!["mainHeading"]);
        assert_eq!(links.rewritten, 1);
        assert_eq!(page.hrefs(), vec!["/index.html?lang=hi"]);

        presenter.toggle(&mut page);
        assert_eq!(presenter.locale(), Locale::English);
        assert_eq!(page, before);
        assert_eq!(presenter.store().get("preferredLang").unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn set_rejects_unsupported_codes() {
        let config = Config::default();
        let mut presenter = LocalePresenter::new(
            &config,
            url("https://lovegrover.com/"),
            MemoryStore::new(),
            &logger(),
        );
        let mut page = StaticPage::new().with_text("mainHeading", "untouched");

        for code in ["fr", "HI", "", "en-US"] {
            assert!(presenter.set(&mut page, code).is_none());
        }
        assert_eq!(presenter.locale(), Locale::English);
        assert_eq!(page.text("mainHeading"), Some("untouched"));
        assert_eq!(presenter.store().get("preferredLang").unwrap(), None);
        assert_eq!(presenter.location().as_str(), "https://lovegrover.com/");

        assert!(presenter.set(&mut page, "hi").is_some());
        assert_eq!(presenter.locale(), Locale::Hindi);
        assert_eq!(page.text("mainHeading"), Some("लव ग्रोवर"));
        assert_eq!(presenter.location().as_str(), "https://lovegrover.com/?lang=hi");
    }

    #[test]
    fn set_query_param_replaces_first_and_drops_duplicates() {
        let mut location = url("https://lovegrover.com/blog?lang=en&page=2&lang=hi");
        set_query_param(&mut location, "lang", Locale::Hindi);
        assert_eq!(location.as_str(), "https://lovegrover.com/blog?lang=hi&page=2");
    }
}
