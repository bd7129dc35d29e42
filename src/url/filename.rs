use url::Url;

/// Name used when a path component sanitizes down to nothing
const FALLBACK_COMPONENT: &str = "untitled";

/// Name used for locations whose path ends in `/`
const INDEX_FILE_NAME: &str = "index";

/// Makes arbitrary text safe to use as a single directory or file name
///
/// Path separators and control characters become `_`, surrounding whitespace
/// is trimmed, and names that would be empty or refer to `.`/`..` are replaced
/// with `untitled`.
pub fn sanitize_path_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        FALLBACK_COMPONENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derives the local file name for a document location
///
/// The final path segment is percent-decoded and sanitized. Locations with an
/// empty final segment are saved as `index`. Returns `None` for locations that
/// have no path at all.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::file_name_for;
/// use url::Url;
///
/// let location = Url::parse("https://example.com/docs/Annual%20Report.pdf?v=2").unwrap();
/// assert_eq!(file_name_for(&location).as_deref(), Some("Annual Report.pdf"));
/// ```
pub fn file_name_for(location: &Url) -> Option<String> {
    let segment = location.path_segments()?.last()?;

    if segment.is_empty() {
        return Some(INDEX_FILE_NAME.to_string());
    }

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    Some(sanitize_path_component(&decoded))
}

/// Returns the file stem of a reference token (`docs/sub.html` -> `sub`)
pub fn reference_stem(reference: &str) -> Option<String> {
    let end = reference.find(|c: char| c == '?' || c == '#').unwrap_or(reference.len());
    let segment = reference[..end].trim_end_matches('/').rsplit('/').next()?;

    let stem = match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    };

    let decoded = urlencoding::decode(stem)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stem.to_string());

    if decoded.trim().is_empty() {
        None
    } else {
        Some(sanitize_path_component(&decoded))
    }
}
