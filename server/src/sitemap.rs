//! XML sitemap and robots.txt rendering for a site's live pages.

use chrono::NaiveDate;
use quick_xml::escape::escape;
use seolens_db::{Page, Site};
use std::fmt::Write;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGE_FREQUENCY: &str = "weekly";
const ROOT_PRIORITY: &str = "1.0";
const PAGE_PRIORITY: &str = "0.8";

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Page location
    pub loc: String,
    /// Date of the last crawl
    pub lastmod: NaiveDate,
    /// Expected change frequency
    pub changefreq: &'static str,
    /// Relative priority within the site
    pub priority: &'static str,
}

/// Build entries for `pages`, keeping their order.
pub fn entries_for(site: &Site, pages: &[Page]) -> Vec<SitemapEntry> {
    let root = site.url.trim_end_matches('/');

    pages
        .iter()
        .map(|page| SitemapEntry {
            loc: page.url.clone(),
            lastmod: page.last_crawled.date_naive(),
            changefreq: CHANGE_FREQUENCY,
            priority: if page.url.trim_end_matches('/') == root {
                ROOT_PRIORITY
            } else {
                PAGE_PRIORITY
            },
        })
        .collect()
}

/// Render a sitemaps.org 0.9 `urlset`.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NS}\">");

    for entry in entries {
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            escape(entry.loc.as_str()),
            entry.lastmod.format("%Y-%m-%d"),
            entry.changefreq,
            entry.priority,
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Render a permissive robots.txt that advertises `sitemap_url`.
pub fn render_robots(sitemap_url: &str) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {sitemap_url}\n")
}
