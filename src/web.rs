use axum::extract::{ Path, Query, State };
use axum::http::StatusCode;
use axum::response::{ Html, IntoResponse, Response };
use axum::routing::get;
use axum::{ Json, Router };
use handlebars::Handlebars;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;

use crate::certification::CertificationRecord;
use crate::outcome::ListOutcome;
use crate::toolkit::{ FeedPage, SearchOutcome, Toolkit };

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");

const KEYWORD_MISSING: &str = "Please enter a keyword to search for certifications.";
const NO_CERTIFICATIONS: &str = "No certifications found matching your criteria.";

#[derive(Error, Debug)]
pub enum WebError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub struct AppState {
    toolkit: Toolkit,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(toolkit: Toolkit) -> Result<Self, WebError> {
        let mut templates = Handlebars::new();
        templates.register_template_string("index", INDEX_TEMPLATE)?;
        Ok(Self { toolkit, templates })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/certifications", get(api_certifications))
        .route("/api/feeds", get(api_feeds))
        .route("/api/feeds/:name", get(api_feed))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub keyword: Option<String>,
    pub feed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct CertificationSection {
    warning: Option<&'static str>,
    info: Option<&'static str>,
    error: Option<String>,
    records: Vec<CertificationRecord>,
}

impl From<SearchOutcome> for CertificationSection {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::KeywordMissing => CertificationSection { warning: Some(KEYWORD_MISSING), ..Default::default() },
            SearchOutcome::Outcome(ListOutcome::Empty) => CertificationSection { info: Some(NO_CERTIFICATIONS), ..Default::default() },
            SearchOutcome::Outcome(ListOutcome::FetchFailed(reason)) =>
                CertificationSection {
                    error: Some(format!("Failed to retrieve certification data: {}", reason)),
                    ..Default::default()
                },
            SearchOutcome::Outcome(ListOutcome::MalformedResponse(reason)) =>
                CertificationSection {
                    error: Some(format!("Certification data was not in the expected format: {}", reason)),
                    ..Default::default()
                },
            SearchOutcome::Outcome(ListOutcome::Records(records)) => CertificationSection { records, ..Default::default() },
        }
    }
}

#[derive(Debug, Serialize)]
struct FeedOption {
    name: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct EntryView {
    title: String,
    href: String,
    description: String,
    published: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct FeedSection {
    options: Vec<FeedOption>,
    selected: Option<String>,
    title: Option<String>,
    error: Option<String>,
    entries: Vec<EntryView>,
}

impl FeedSection {
    fn apply(&mut self, page: FeedPage) {
        match page.outcome {
            ListOutcome::Records(entries) => {
                self.title = Some(page.title);
                self.entries = entries
                    .iter()
                    .map(|entry| EntryView {
                        title: entry.title.clone(),
                        href: entry.href().to_string(),
                        description: plain_text(&entry.description),
                        published: entry.published_at.as_ref().map(|p| p.to_string()),
                    })
                    .collect();
            }
            ListOutcome::Empty => {
                self.title = Some(page.title);
            }
            ListOutcome::FetchFailed(reason) => {
                self.error = Some(format!("Error fetching RSS feed: {}", reason));
            }
            ListOutcome::MalformedResponse(reason) => {
                self.error = Some(format!("Error fetching or parsing RSS feed: {}", reason));
            }
        }
    }
}

/// Visible text of an HTML fragment, whitespace collapsed. Feed bodies are mostly HTML;
/// the page shows their text and the template still escapes it.
fn plain_text(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Serialize)]
struct IndexView {
    keyword: String,
    certifications: Option<CertificationSection>,
    feeds: FeedSection,
}

async fn index(State(state): State<Arc<AppState>>, Query(query): Query<PageQuery>) -> Result<Html<String>, WebError> {
    let certifications = match &query.keyword {
        Some(keyword) => Some(CertificationSection::from(state.toolkit.search_certifications(keyword).await)),
        None => None,
    };

    let catalog = state.toolkit.catalog();
    let selected = query.feed
        .clone()
        .or_else(|| catalog.first().map(|name| name.to_string()));

    let mut feeds = FeedSection {
        options: catalog
            .iter()
            .map(|name| FeedOption {
                name: name.to_string(),
                selected: selected.as_deref() == Some(*name),
            })
            .collect(),
        selected: selected.clone(),
        ..Default::default()
    };

    if let Some(name) = &selected {
        match state.toolkit.feed_page(name).await {
            Some(page) => feeds.apply(page),
            None => {
                feeds.error = Some(format!("Unknown feed: {}", name));
            }
        }
    }

    let view = IndexView {
        keyword: query.keyword.unwrap_or_default(),
        certifications,
        feeds,
    };
    Ok(Html(state.templates.render("index", &view)?))
}

async fn health() -> &'static str {
    "ok"
}

async fn api_certifications(State(state): State<Arc<AppState>>, Query(query): Query<KeywordQuery>) -> Response {
    match state.toolkit.search_certifications(query.keyword.as_deref().unwrap_or_default()).await {
        SearchOutcome::KeywordMissing =>
            (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": KEYWORD_MISSING }))).into_response(),
        SearchOutcome::Outcome(outcome) => Json(outcome).into_response(),
    }
}

async fn api_feeds(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(
        state.toolkit
            .catalog()
            .into_iter()
            .map(str::to_string)
            .collect()
    )
}

async fn api_feed(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.toolkit.feed_page(&name).await {
        Some(page) => Json(page).into_response(),
        None =>
            (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": format!("unknown feed: {}", name) }))).into_response(),
    }
}
