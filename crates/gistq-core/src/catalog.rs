use crate::gist::Document;

pub(crate) fn queue_description(prefix: &str, name: &str) -> String {
    format!("{prefix} {name}")
}

pub(crate) fn queue_filename(name: &str, extension: &str) -> String {
    format!("{name}_queue.{extension}")
}

pub(crate) fn queue_name_from_description(prefix: &str, description: &str) -> Option<String> {
    description
        .strip_prefix(prefix)
        .map(|rest| rest.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Locate the queue file inside a document addressed by raw id, where the
/// queue name is not known up front.
pub(crate) fn find_queue_file(document: &Document, extension: &str) -> Option<String> {
    let suffix = format!("_queue.{extension}");
    document
        .files
        .keys()
        .find(|filename| filename.ends_with(&suffix))
        .cloned()
}
