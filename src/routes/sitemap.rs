// /sitemap.xml for search engines. Rebuilt per request so lastmod always
// carries the current date.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::company;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sitemap.xml", get(sitemap))
}

/// GET /sitemap.xml — static pages plus the known company pages
async fn sitemap(State(state): State<AppState>) -> Response {
    let lastmod = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let body = build_sitemap(&state.config.server.public_url, &lastmod);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        body,
    )
        .into_response()
}

fn build_sitemap(base: &str, lastmod: &str) -> String {
    let base = base.trim_end_matches('/');
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    push_url(&mut xml, base, lastmod, "daily", "1.0");
    push_url(&mut xml, &format!("{}/admin", base), lastmod, "weekly", "0.3");
    push_url(&mut xml, &format!("{}/gizlilik", base), lastmod, "monthly", "0.3");
    for slug in company::SITEMAP_COMPANY_SLUGS {
        push_url(
            &mut xml,
            &format!("{}/firma/{}", base, slug),
            lastmod,
            "daily",
            "0.8",
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", loc));
    xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
    xml.push_str(&format!("    <priority>{}</priority>\n", priority));
    xml.push_str("  </url>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sitemap_lists_static_and_company_pages() {
        let xml = build_sitemap("https://dertlio.com", "2024-03-01");
        assert_eq!(xml.matches("<url>").count(), 53);
        assert!(xml.contains("<loc>https://dertlio.com</loc>"));
        assert!(xml.contains("<loc>https://dertlio.com/admin</loc>"));
        assert!(xml.contains("<loc>https://dertlio.com/gizlilik</loc>"));
        assert!(xml.contains("<loc>https://dertlio.com/firma/lc-waikiki</loc>"));
        assert!(xml.contains("<loc>https://dertlio.com/firma/tchibo</loc>"));
    }

    #[test]
    fn sitemap_tolerates_trailing_slash_in_base() {
        let xml = build_sitemap("https://dertlio.com/", "2024-03-01");
        assert!(xml.contains("<loc>https://dertlio.com/firma/turkcell</loc>"));
        assert!(!xml.contains("com//firma"));
    }

    #[test]
    fn home_page_outranks_the_rest() {
        let xml = build_sitemap("https://dertlio.com", "2024-03-01");
        let home_at = xml.find("<loc>https://dertlio.com</loc>").unwrap();
        let tail = &xml[home_at..];
        let url_end = tail.find("</url>").unwrap();
        assert!(tail[..url_end].contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<priority>0.8</priority>").count(), 50);
    }
}
