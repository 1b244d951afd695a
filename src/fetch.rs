//! The rendered-page boundary. The core never talks to the network directly;
//! everything goes through [`Fetcher`], so extraction can run against live
//! pages, a mirror, or saved snapshots interchangeably.

use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::normalize::group_name_from_link;

/// Logical page sections, each a fixed path suffix under the group link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Main,
    About,
    Topics,
    Featured,
    Contacts,
}

impl Section {
    pub fn path(self) -> &'static str {
        match self {
            Section::Main => "",
            Section::About => "about",
            Section::Topics => "hashtags",
            Section::Featured => "announcements",
            Section::Contacts => "about_contact_and_basic_info",
        }
    }
}

/// Produce fully rendered markup for a logical section of a page, scrolling
/// up to `scroll_budget` times so lazily loaded content is present.
pub trait Fetcher {
    fn fetch(&self, link: &str, section: Section, scroll_budget: u32) -> Result<String>;
}

/// Plain HTTP fetcher. Cannot scroll or execute scripts, so it is only useful
/// against pre-rendered or mirrored pages; the scroll budget is ignored. An
/// inter-request pacing delay is applied before every request.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    pacing: Duration,
}

impl HttpFetcher {
    pub fn new(pacing: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) group_scraper/0.1")
            .build()
            .context("building http client")?;
        Ok(HttpFetcher { client, pacing })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, link: &str, section: Section, _scroll_budget: u32) -> Result<String> {
        sleep(self.pacing);
        let address = format!("{}{}", link, section.path());
        let body = self
            .client
            .get(&address)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("fetching {address}"))?
            .text()
            .with_context(|| format!("reading body of {address}"))?;
        Ok(body)
    }
}

/// Serves previously saved page snapshots from a directory. Files are named
/// `<stem>.html` for the main section and `<stem>_<section-path>.html`
/// otherwise, where the stem is the group name (or, for profile pages, the
/// remaining path with slashes flattened).
pub struct SnapshotFetcher {
    dir: PathBuf,
}

impl SnapshotFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotFetcher { dir: dir.into() }
    }

    fn file_name(link: &str, section: Section) -> String {
        let stem = match group_name_from_link(link) {
            Some(name) => name,
            None => link
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_matches('/')
                .replace('/', "_"),
        };
        if section.path().is_empty() {
            format!("{stem}.html")
        } else {
            format!("{stem}_{}.html", section.path())
        }
    }
}

impl Fetcher for SnapshotFetcher {
    fn fetch(&self, link: &str, section: Section, _scroll_budget: u32) -> Result<String> {
        let path = self.dir.join(Self::file_name(link, section));
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading snapshot {}", path.display()))
    }
}

// ── Tests ──
