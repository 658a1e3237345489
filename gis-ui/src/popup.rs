use gis_core::map::Summary;
use html_escape::encode_text;

/// Popup markup for a map feature. Every value is escaped; only the labels
/// are trusted.
pub fn popup_html(summary: &Summary) -> String {
    let mut html = format!(
        "<div class=\"map-popup\"><h6 class=\"mb-1\">{}</h6>",
        encode_text(&summary.title)
    );
    if !summary.badges.is_empty() {
        html.push_str("<div class=\"mb-1\">");
        for badge in &summary.badges {
            html.push_str(&format!(
                "<span class=\"{} me-1\">{}</span>",
                badge.tone.badge_class(),
                encode_text(&badge.text)
            ));
        }
        html.push_str("</div>");
    }
    for field in &summary.fields {
        html.push_str(&format!(
            "<div><strong>{}:</strong> {}</div>",
            encode_text(field.label),
            encode_text(&field.value)
        ));
    }
    html.push_str("</div>");
    html
}
