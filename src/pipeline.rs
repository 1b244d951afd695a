//! Orchestration: input-list handling, basic scrape, filter gate, advanced
//! scrape, and per-group JSON persistence. Per-group failures are logged and
//! the run continues; only filter-compilation problems abort up front.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::extract::{about, admins, posts, topics};
use crate::fetch::{Fetcher, Section};
use crate::filter::GroupFilter;
use crate::normalize::{canonical_group_link, group_name_from_link, PROFILE_LINK_PREFIX};
use crate::records::{AdminRecord, AdvancedInfo, GroupRecord};

// The featured feed lazy-loads aggressively; everything else renders in one
// or two viewports.
const FEATURED_SCROLLS: u32 = 50;
const DEFAULT_SCROLLS: u32 = 1;

pub struct RunOptions {
    pub dest_dir: PathBuf,
    pub input_path: String,
    pub override_existing: bool,
    pub advanced: bool,
}

struct WorkItem {
    link: String,
    local_path: PathBuf,
}

pub fn run(fetcher: &dyn Fetcher, filter: &GroupFilter, opts: &RunOptions) -> Result<()> {
    if !opts.dest_dir.exists() {
        info!("the directory {} doesn't exist, creating it", opts.dest_dir.display());
        fs::create_dir_all(&opts.dest_dir)
            .with_context(|| format!("creating {}", opts.dest_dir.display()))?;
    }

    let links = read_input_links(&opts.input_path);
    if links.is_empty() {
        info!("no input found");
        return Ok(());
    }
    let items = plan_items(&links, &opts.dest_dir);
    debug!("found {} good links", items.len());
    let items = apply_override(items, opts.override_existing);

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({eta})")?
            .progress_chars("=> "),
    );
    for item in &items {
        if let Err(e) = scrape_group(fetcher, item, filter, opts.advanced) {
            warn!("skipping {}: {e:#}", item.link);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

/// Whitespace-separated links from a file; a path that does not exist is
/// treated as a single literal link.
fn read_input_links(input_path: &str) -> Vec<String> {
    match fs::read_to_string(input_path) {
        Ok(content) => content.split_whitespace().map(str::to_string).collect(),
        Err(_) => {
            warn!("path was not found locally, treating it like a webpage path");
            vec![input_path.to_string()]
        }
    }
}

/// Canonicalize links and pair each with its output file; invalid links are
/// dropped here.
fn plan_items(links: &[String], dest_dir: &Path) -> Vec<WorkItem> {
    links
        .iter()
        .filter_map(|raw| {
            let link = canonical_group_link(raw)?;
            let name = group_name_from_link(&link)?;
            Some(WorkItem {
                local_path: dest_dir.join(format!("{name}.json")),
                link,
            })
        })
        .collect()
}

fn apply_override(items: Vec<WorkItem>, override_existing: bool) -> Vec<WorkItem> {
    let n_existing = items.iter().filter(|i| i.local_path.exists()).count();
    if n_existing == 0 {
        return items;
    }
    if override_existing {
        info!("overriding {n_existing} files");
        items
    } else {
        info!("ignoring {n_existing} items");
        items
            .into_iter()
            .filter(|i| !i.local_path.exists())
            .collect()
    }
}

fn scrape_group(
    fetcher: &dyn Fetcher,
    item: &WorkItem,
    filter: &GroupFilter,
    advanced: bool,
) -> Result<()> {
    let mut record = basic_record(fetcher, &item.link)?;
    save_record(&item.local_path, &record)?;

    if advanced && filter.matches(&record) {
        let roster = record.admins.clone().unwrap_or_default();
        let adv = advanced_info(fetcher, &item.link, roster)?;
        record.merge_advanced(adv)?;
        save_record(&item.local_path, &record)?;
    }
    Ok(())
}

/// One about-page fetch, extracted and tagged with its name and link.
pub fn basic_record(fetcher: &dyn Fetcher, link: &str) -> Result<GroupRecord> {
    let html = fetcher.fetch(link, Section::About, DEFAULT_SCROLLS)?;
    let mut record = about::extract(&html);
    record.name = group_name_from_link(link);
    record.link = Some(link.to_string());
    Ok(record)
}

/// The advanced pass: topics, featured posts, and per-admin enrichment.
/// An admin whose profile fetch fails stays bare rather than sinking the
/// whole group.
pub fn advanced_info(
    fetcher: &dyn Fetcher,
    link: &str,
    mut roster: Vec<AdminRecord>,
) -> Result<AdvancedInfo> {
    let topics_html = fetcher.fetch(link, Section::Topics, DEFAULT_SCROLLS)?;
    let topics = topics::extract_topics(&topics_html);

    let featured_html = fetcher.fetch(link, Section::Featured, FEATURED_SCROLLS)?;
    let featured = posts::extract_posts(&featured_html, Local::now().date_naive());

    for admin in &mut roster {
        let profile_link = format!("{}{}/", PROFILE_LINK_PREFIX, admin.id);
        match fetcher.fetch(&profile_link, Section::About, DEFAULT_SCROLLS) {
            Ok(html) => admins::enrich(admin, &html),
            Err(e) => warn!("admin {} left unenriched: {e:#}", admin.id),
        }
    }

    Ok(AdvancedInfo { topics, featured, admins: roster })
}

fn save_record(path: &Path, record: &GroupRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("serializing record")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SnapshotFetcher;
    use crate::filter;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "group_scraper_test_{tag}_{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_input_file_is_literal_link() {
        let links = read_input_links("https://www.facebook.com/groups/testgroup/");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn input_file_split_on_whitespace() {
        let dir = temp_dir("input");
        let path = dir.join("links.txt");
        fs::write(
            &path,
            "https://www.facebook.com/groups/a/\nhttps://www.facebook.com/groups/b/ extra",
        )
        .unwrap();
        let links = read_input_links(path.to_str().unwrap());
        assert_eq!(links.len(), 3);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn planning_drops_invalid_links() {
        let dest = PathBuf::from("/tmp");
        let links = vec![
            "https://www.facebook.com/groups/good/posts/123/".to_string(),
            "https://www.facebook.com/groups/category/whatever/1/".to_string(),
            "www.google.com".to_string(),
        ];
        let items = plan_items(&links, &dest);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://www.facebook.com/groups/good/");
        assert_eq!(items[0].local_path, dest.join("good.json"));
    }

    #[test]
    fn override_behaviour() {
        let dir = temp_dir("override");
        let existing = dir.join("seen.json");
        fs::write(&existing, "{}").unwrap();
        let items = vec![
            WorkItem { link: "x".into(), local_path: existing.clone() },
            WorkItem { link: "y".into(), local_path: dir.join("fresh.json") },
        ];
        let kept = apply_override(items, false);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].link, "y");

        let items = vec![WorkItem { link: "x".into(), local_path: existing }];
        assert_eq!(apply_override(items, true).len(), 1);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn end_to_end_against_snapshots() {
        let fetcher = SnapshotFetcher::new("tests/fixtures");
        let filter = filter::compile(&[]).unwrap();
        let dest = temp_dir("e2e");

        let item = WorkItem {
            link: "https://www.facebook.com/groups/testgroup/".into(),
            local_path: dest.join("testgroup.json"),
        };
        scrape_group(&fetcher, &item, &filter, true).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&item.local_path).unwrap()).unwrap();
        assert_eq!(saved["group_name"], "testgroup");
        assert_eq!(saved["is_private"], false);
        assert_eq!(saved["n_members"], 3674);
        assert_eq!(saved["creation_date"], "12/03/2023");
        assert_eq!(saved["topics"][0]["tag"], "#sale");
        assert!(saved["feat"].as_array().is_some());
        // Admin enriched from the profile snapshot
        let admins = saved["admins"].as_array().unwrap();
        assert_eq!(admins.len(), 2);
        assert!(admins.iter().any(|a| a["average_score"] == 4.7));
        fs::remove_dir_all(dest).unwrap();
    }

    #[test]
    fn private_group_skips_advanced() {
        let fetcher = SnapshotFetcher::new("tests/fixtures");
        let filter = filter::compile(&[]).unwrap();
        let dest = temp_dir("private");

        let item = WorkItem {
            link: "https://www.facebook.com/groups/hiddengroup/".into(),
            local_path: dest.join("hiddengroup.json"),
        };
        scrape_group(&fetcher, &item, &filter, true).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&item.local_path).unwrap()).unwrap();
        assert_eq!(saved["is_private"], true);
        assert!(saved.get("topics").is_none());
        assert!(saved.get("n_members").is_none());
        fs::remove_dir_all(dest).unwrap();
    }
}
