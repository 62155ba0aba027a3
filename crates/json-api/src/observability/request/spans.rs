//! Route templates for spans and metric labels.

use uuid::Uuid;

/// Replace identifying path segments with placeholders, keeping label cardinality bounded
/// and customer emails out of logs.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else if segment.contains('@') || segment.to_ascii_lowercase().contains("%40") {
                "{email}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
