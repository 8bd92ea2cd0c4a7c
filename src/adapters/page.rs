//! A loaded page backed by static markup, parsed with `scraper`.

use crate::domain::model::{DomElement, DomSnapshot, DomTable};
use crate::domain::ports::LoadedPage;
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

const CONSENT_SELECTOR: &str = r#"[id*="accept"], [class*="accept"]"#;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::ProcessingError {
        message: format!("Invalid selector '{}': {}", css, e),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Flattens `html` into every element (document order) and every table.
pub fn parse_snapshot(html: &str) -> Result<DomSnapshot> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td, th")?;

    let mut elements = Vec::new();
    let mut positions = HashMap::new();
    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let parent = node
            .parent()
            .and_then(|parent| positions.get(&parent.id()).copied());
        positions.insert(node.id(), elements.len());
        elements.push(DomElement {
            text: text_of(element).trim().to_string(),
            class: element.value().attr("class").unwrap_or("").to_string(),
            id: element.value().id().unwrap_or("").to_string(),
            parent,
        });
    }

    let tables = document
        .select(&table_selector)
        .map(|table| DomTable {
            text: text_of(table),
            rows: table
                .select(&row_selector)
                .map(|row| {
                    row.select(&cell_selector)
                        .map(|cell| text_of(cell).trim().to_string())
                        .collect()
                })
                .collect(),
        })
        .collect();

    Ok(DomSnapshot { elements, tables })
}

/// Markup fetched without a browser. There is nothing to click, so a consent
/// banner is only reported, never dismissed.
#[derive(Debug, Clone)]
pub struct StaticPage {
    html: String,
}

impl StaticPage {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    fn has_consent_control(&self) -> Result<bool> {
        let document = Html::parse_document(&self.html);
        let consent = selector(CONSENT_SELECTOR)?;
        let found = document.select(&consent).next().is_some();
        Ok(found)
    }
}

#[async_trait]
impl LoadedPage for StaticPage {
    async fn dismiss_cookie_banner(&self) -> Result<bool> {
        if self.has_consent_control()? {
            tracing::debug!("Consent control present in static markup; nothing to dismiss");
        }
        Ok(false)
    }

    async fn snapshot(&self) -> Result<DomSnapshot> {
        parse_snapshot(&self.html)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.html.clone())
    }
}
