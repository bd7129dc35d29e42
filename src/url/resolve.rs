use crate::UrlError;
use url::Url;

/// Derives the base location used to resolve a seed's relative references
///
/// The seed's final path segment (its file name) is stripped, along with any
/// query or fragment. A seed whose path already ends in `/` is its own base.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::base_location;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/reports/2020/index.html?x=1").unwrap();
/// assert_eq!(base_location(&seed).unwrap().as_str(), "https://example.com/reports/2020/");
/// ```
pub fn base_location(seed: &Url) -> Result<Url, UrlError> {
    if seed.cannot_be_a_base() {
        return Err(UrlError::MissingBase(seed.to_string()));
    }

    seed.join("./")
        .map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))
}

/// Resolves a reference token to an absolute http(s) location
///
/// References carrying their own scheme are taken as-is; everything else is
/// resolved against `base`.
pub fn resolve_reference(reference: &str, base: &Url) -> Result<Url, UrlError> {
    let reference = reference.trim();

    let resolved = base
        .join(reference)
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}
