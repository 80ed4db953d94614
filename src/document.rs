use std::collections::BTreeMap;

use scraper::{Html, Selector};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::translations::Field;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("invalid selector `{0}`")]
    Selector(String),
}

/// The slice of a page the presenter reads and writes.
///
/// Links are addressed by their position in document order, which is what
/// a `querySelectorAll("a[href]")` style lookup hands out.
pub trait Document {
    /// Returns `false` when no element carries `id`.
    fn set_text(&mut self, id: &str, text: &str) -> bool;

    /// Returns `false` when no element carries `id`.
    fn set_html(&mut self, id: &str, html: &str) -> bool;

    fn link_count(&self) -> usize;

    fn link_href(&self, index: usize) -> Option<&str>;

    fn set_link_href(&mut self, index: usize, href: String);
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Html(String),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// In-memory page: elements by id plus every anchor carrying an `href`.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticPage {
    pub elements: BTreeMap<String, Content>,
    pub links: Vec<Anchor>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        self.elements
            .insert(id.to_owned(), Content::Text(text.to_owned()));
        self
    }

    pub fn with_link(mut self, href: &str) -> Self {
        self.links.push(Anchor::new(href.to_owned(), String::new()));
        self
    }

    pub fn content(&self, id: &str) -> Option<&Content> {
        self.elements.get(id)
    }

    /// Visible text of a plain-text element.
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.elements.get(id)? {
            Content::Text(text) => Some(text),
            Content::Html(_) => None,
        }
    }

    pub fn hrefs(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.href.as_str()).collect()
    }

    /// Builds a page from HTML markup, keeping the elements whose ids the
    /// translation fields target and every `a[href]`.
    pub fn from_html(markup: &str) -> Result<Self, DocumentError> {
        let document = Html::parse_document(markup);
        let mut page = Self::new();

        for id in Field::iter().filter_map(|field| field.element_id()) {
            let selector_text = format!("#{id}");
            let selector = Selector::parse(&selector_text)
                .map_err(|_| DocumentError::Selector(selector_text.clone()))?;

            let Some(element) = document.select(&selector).next() else {
                continue;
            };

            let has_child_elements = element.children().any(|node| node.value().is_element());
            let content = if has_child_elements {
                Content::Html(element.inner_html())
            } else {
                Content::Text(element.text().collect())
            };
            page.elements.insert(id.to_owned(), content);
        }

        let anchor_selector =
            Selector::parse("a[href]").map_err(|_| DocumentError::Selector("a[href]".into()))?;
        for anchor in document.select(&anchor_selector) {
            if let Some(href) = anchor.value().attr("href") {
                let text = anchor.text().collect::<String>().trim().to_owned();
                page.links.push(Anchor::new(href.to_owned(), text));
            }
        }

        Ok(page)
    }
}

impl Document for StaticPage {
    fn set_text(&mut self, id: &str, text: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(content) => {
                *content = Content::Text(text.to_owned());
                true
            }
            None => false,
        }
    }

    fn set_html(&mut self, id: &str, html: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(content) => {
                *content = Content::Html(html.to_owned());
                true
            }
            None => false,
        }
    }

    fn link_count(&self) -> usize {
        self.links.len()
    }

    fn link_href(&self, index: usize) -> Option<&str> {
        self.links.get(index).map(|link| link.href.as_str())
    }

    fn set_link_href(&mut self, index: usize, href: String) {
        if let Some(link) = self.links.get_mut(index) {
            link.href = href;
        }
    }
}
