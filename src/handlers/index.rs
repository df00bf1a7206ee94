//! Landing page

use axum::response::Html;

use crate::registry::Disease;

/// List the available diseases with links to their feature lists
pub async fn page() -> Html<String> {
    let items: String = Disease::ALL
        .iter()
        .map(|d| {
            format!(
                "      <li><a href=\"/features/{}\">{}</a></li>\n",
                d.as_str().replace(' ', "%20"),
                d.as_str()
            )
        })
        .collect();

    Html(format!(
        "<!DOCTYPE html>\n<html>\n  <head><title>Diagnosis Prediction</title></head>\n  <body>\n    <h1>Diagnosis Prediction</h1>\n    <ul>\n{}    </ul>\n  </body>\n</html>\n",
        items
    ))
}
