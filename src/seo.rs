//! SEO helpers: slug/meta/alt generation for the catalog and the
//! sitemap/robots emitters.

use chrono::{DateTime, Utc};

const STORE_NAME: &str = "Vendora Marketplace";
const META_TITLE_MAX: usize = 60;
const META_DESCRIPTION_MAX: usize = 155;

/// URL-safe slug: lowercase alphanumerics separated by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true; // suppress a leading dash
    for c in input.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn meta_title(title: &str) -> String {
    truncate_chars(&format!("{title} | {STORE_NAME}"), META_TITLE_MAX)
}

pub fn meta_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, META_DESCRIPTION_MAX)
}

pub fn image_alt(title: &str) -> String {
    format!("{title} product photo")
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

/// One `<url>` entry in the sitemap.
pub struct SitemapEntry {
    pub path: String,
    pub last_modified: DateTime<Utc>,
}

pub fn sitemap_xml(base_url: &str, entries: &[SitemapEntry]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        let path = entry.path.trim_start_matches('/');
        xml.push_str(&format!(
            "  <url>\n    <loc>{base}/{path}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            entry.last_modified.format("%Y-%m-%d")
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

pub fn robots_txt(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!(
        "User-agent: *\n\
         Allow: /\n\
         Disallow: /api/\n\
         \n\
         Sitemap: {base}/api/seo/sitemap.xml\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hand-Thrown  Ceramic Mug!"), "hand-thrown-ceramic-mug");
        assert_eq!(slugify("  Café & Crème  "), "café-crème");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn meta_title_is_branded_and_bounded() {
        let t = meta_title("Mug");
        assert_eq!(t, "Mug | Vendora Marketplace");
        let long = meta_title(&"x".repeat(200));
        assert_eq!(long.chars().count(), 60);
    }

    #[test]
    fn meta_description_collapses_whitespace() {
        assert_eq!(meta_description("a  b\n\tc"), "a b c");
        assert_eq!(meta_description(&"word ".repeat(100)).chars().count(), 155);
    }

    #[test]
    fn sitemap_lists_every_entry() {
        let when = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        let xml = sitemap_xml(
            "https://shop.example.com/",
            &[
                SitemapEntry {
                    path: "products/mug".into(),
                    last_modified: when,
                },
                SitemapEntry {
                    path: "/categories/ceramics".into(),
                    last_modified: when,
                },
            ],
        );
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://shop.example.com/products/mug</loc>"));
        assert!(xml.contains("<loc>https://shop.example.com/categories/ceramics</loc>"));
        assert!(xml.contains("<lastmod>2026-03-14</lastmod>"));
    }

    #[test]
    fn robots_points_at_sitemap() {
        let txt = robots_txt("https://shop.example.com");
        assert!(txt.contains("Sitemap: https://shop.example.com/api/seo/sitemap.xml"));
    }
}
