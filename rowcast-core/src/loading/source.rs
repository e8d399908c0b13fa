//! Classification of item image sources.

use std::path::PathBuf;

use url::Url;

/// Where an item's artwork comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Read and decode synchronously from disk.
    Local(PathBuf),
    /// Fetch asynchronously.
    Remote(Url),
    /// Nothing we can load; resolves straight to a placeholder.
    Unsupported(String),
}

impl ImageSource {
    /// Classify a raw source string.
    ///
    /// `http`/`https` URLs are remote, and scheme-relative `//host/path`
    /// sources are promoted to `http:`. `file:` URLs, resource paths
    /// (`qrc:/`, `:/`) and plain paths are local. Anything else is
    /// unsupported.
    pub fn resolve(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Unsupported(String::new());
        }

        if raw.starts_with("//") {
            return match Url::parse(&format!("http:{raw}")) {
                Ok(url) => Self::Remote(url),
                Err(_) => Self::Unsupported(raw.to_string()),
            };
        }

        if let Some(resource) = raw.strip_prefix(":/") {
            return Self::Local(PathBuf::from(resource));
        }

        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Self::Remote(url),
                "file" => url
                    .to_file_path()
                    .map(Self::Local)
                    .unwrap_or_else(|_| Self::Unsupported(raw.to_string())),
                "qrc" => Self::Local(PathBuf::from(
                    url.path().trim_start_matches('/'),
                )),
                // Windows drive letters parse as one-letter schemes.
                scheme if scheme.len() == 1 => Self::Local(PathBuf::from(raw)),
                _ => Self::Unsupported(raw.to_string()),
            },
            Err(_) => Self::Local(PathBuf::from(raw)),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_urls_are_remote() {
        assert!(ImageSource::resolve("https://cdn.example/p.jpg").is_remote());
        assert!(ImageSource::resolve("http://cdn.example/p.jpg").is_remote());
    }

    #[test]
    fn scheme_relative_sources_become_http() {
        match ImageSource::resolve("//cdn.example/p.jpg") {
            ImageSource::Remote(url) => {
                assert_eq!(url.as_str(), "http://cdn.example/p.jpg")
            }
            other => panic!("expected remote, got {other:?}"),
        }
    }

    #[test]
    fn paths_and_resources_are_local() {
        assert_eq!(
            ImageSource::resolve("images/img1.jpg"),
            ImageSource::Local(PathBuf::from("images/img1.jpg"))
        );
        assert_eq!(
            ImageSource::resolve("qrc:/images/img2.jpg"),
            ImageSource::Local(PathBuf::from("images/img2.jpg"))
        );
        assert_eq!(
            ImageSource::resolve(":/images/img3.jpg"),
            ImageSource::Local(PathBuf::from("images/img3.jpg"))
        );
        assert_eq!(
            ImageSource::resolve("/srv/posters/a.png"),
            ImageSource::Local(PathBuf::from("/srv/posters/a.png"))
        );
    }

    #[test]
    fn other_schemes_and_blank_are_unsupported() {
        assert_eq!(
            ImageSource::resolve("ftp://host/p.jpg"),
            ImageSource::Unsupported("ftp://host/p.jpg".into())
        );
        assert_eq!(
            ImageSource::resolve("   "),
            ImageSource::Unsupported(String::new())
        );
    }
}
