//! Feed directory and localized text resolution.

use std::fmt;

use tracing::debug;

use super::types::{DiscoveryData, Feed, LanguageFeeds, LocalizedText};

/// A lookup in a GBFS document found nothing.
///
/// These indicate a malformed or incompatible document upstream, not a
/// transient failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The feed directory has no entry with this name.
    #[error("no '{0}' feed found")]
    FeedNotFound(String),

    /// A translated text has no entry for this language.
    #[error("no text found for language '{0}'")]
    LanguageNotFound(String),

    /// A translated text is an empty list.
    #[error("localized text has no translations")]
    NoTranslations,

    /// The discovery document has no feed directory at all.
    #[error("discovery document lists no feeds")]
    EmptyDirectory,
}

/// The sub-feeds the server reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedName {
    SystemInformation,
    StationInformation,
    StationStatus,
}

impl FeedName {
    /// The name used in the discovery document.
    pub const fn as_str(self) -> &'static str {
        match self {
            FeedName::SystemInformation => "system_information",
            FeedName::StationInformation => "station_information",
            FeedName::StationStatus => "station_status",
        }
    }
}

impl fmt::Display for FeedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find the URL of the feed called `feed_name`.
pub fn resolve_feed_url<'a>(feeds: &'a [Feed], feed_name: &str) -> Result<&'a str, ResolveError> {
    feeds
        .iter()
        .find(|feed| feed.name == feed_name)
        .map(|feed| feed.url.as_str())
        .ok_or_else(|| ResolveError::FeedNotFound(feed_name.to_string()))
}

/// Find the URL of one of the well-known feeds.
pub fn resolve_known_feed(feeds: &[Feed], feed: FeedName) -> Result<&str, ResolveError> {
    resolve_feed_url(feeds, feed.as_str())
}

/// Extract display text.
///
/// Plain text is returned as is whatever `language` asks for. For translated
/// text, `None` picks the first translation in document order and
/// `Some(language)` requires an exact match.
pub fn resolve_localized_text<'a>(
    value: &'a LocalizedText,
    language: Option<&str>,
) -> Result<&'a str, ResolveError> {
    let translations = match value {
        LocalizedText::Plain(text) => return Ok(text.as_str()),
        LocalizedText::Translated(translations) => translations,
    };

    match language {
        None => {
            debug!("no language requested, using first translation");
            translations
                .first()
                .map(|t| t.text.as_str())
                .ok_or(ResolveError::NoTranslations)
        }
        Some(language) => translations
            .iter()
            .find(|t| t.language == language)
            .map(|t| t.text.as_str())
            .ok_or_else(|| ResolveError::LanguageNotFound(language.to_string())),
    }
}

/// Extract display text, preferring `language` but falling back to the
/// first translation when the publisher does not provide it.
pub fn display_text<'a>(
    value: &'a LocalizedText,
    language: Option<&str>,
) -> Result<&'a str, ResolveError> {
    match resolve_localized_text(value, language) {
        Err(ResolveError::LanguageNotFound(_)) => resolve_localized_text(value, None),
        other => other,
    }
}

/// Pick the feed directory out of a discovery document.
///
/// Nested directories are chosen by `preferred_language` when the document
/// has it, otherwise by the first language key.
pub fn select_directory(
    data: DiscoveryData,
    preferred_language: Option<&str>,
) -> Result<Vec<Feed>, ResolveError> {
    let LanguageFeeds(mut languages) = match data {
        DiscoveryData::Flat { feeds } => return Ok(feeds),
        DiscoveryData::ByLanguage(languages) => languages,
    };

    let position = preferred_language
        .and_then(|wanted| languages.iter().position(|(language, _)| language == wanted))
        .unwrap_or(0);

    if position >= languages.len() {
        return Err(ResolveError::EmptyDirectory);
    }

    let (language, feeds) = languages.swap_remove(position);
    debug!(%language, feeds = feeds.len(), "selected feed directory");
    Ok(feeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbfs::types::Translation;

    fn feed(name: &str, url: &str) -> Feed {
        Feed {
            name: name.into(),
            url: url.into(),
        }
    }

    fn fr_en() -> LocalizedText {
        LocalizedText::Translated(vec![
            Translation {
                language: "fr".into(),
                text: "A".into(),
            },
            Translation {
                language: "en".into(),
                text: "B".into(),
            },
        ])
    }

    #[test]
    fn finds_named_feed() {
        let feeds = vec![
            feed("system_information", "https://x/si"),
            feed("station_information", "https://x/sti"),
            feed("station_status", "https://x/ss"),
        ];
        assert_eq!(
            resolve_feed_url(&feeds, "station_information"),
            Ok("https://x/sti")
        );
        assert_eq!(
            resolve_known_feed(&feeds, FeedName::StationStatus),
            Ok("https://x/ss")
        );
    }

    #[test]
    fn first_matching_feed_wins() {
        let feeds = vec![feed("station_status", "https://x/1"), feed("station_status", "https://x/2")];
        assert_eq!(resolve_feed_url(&feeds, "station_status"), Ok("https://x/1"));
    }

    #[test]
    fn missing_feed_is_not_found() {
        let feeds = vec![feed("system_information", "https://x/si")];
        assert_eq!(
            resolve_feed_url(&feeds, "station_status"),
            Err(ResolveError::FeedNotFound("station_status".into()))
        );
        assert_eq!(
            resolve_feed_url(&[], "station_status"),
            Err(ResolveError::FeedNotFound("station_status".into()))
        );
    }

    #[test]
    fn plain_text_ignores_language() {
        let text = LocalizedText::Plain("Vélo Star".into());
        assert_eq!(resolve_localized_text(&text, None), Ok("Vélo Star"));
        assert_eq!(resolve_localized_text(&text, Some("en")), Ok("Vélo Star"));
        assert_eq!(resolve_localized_text(&text, Some("de")), Ok("Vélo Star"));
    }

    #[test]
    fn translated_text_by_language() {
        let text = fr_en();
        assert_eq!(resolve_localized_text(&text, Some("en")), Ok("B"));
        assert_eq!(resolve_localized_text(&text, Some("fr")), Ok("A"));
        assert_eq!(resolve_localized_text(&text, None), Ok("A"));
        assert_eq!(
            resolve_localized_text(&text, Some("de")),
            Err(ResolveError::LanguageNotFound("de".into()))
        );
    }

    #[test]
    fn empty_translations() {
        let text = LocalizedText::Translated(vec![]);
        assert_eq!(
            resolve_localized_text(&text, None),
            Err(ResolveError::NoTranslations)
        );
        assert_eq!(
            resolve_localized_text(&text, Some("fr")),
            Err(ResolveError::LanguageNotFound("fr".into()))
        );
        assert_eq!(display_text(&text, Some("fr")), Err(ResolveError::NoTranslations));
    }

    #[test]
    fn display_text_falls_back_to_first() {
        let text = fr_en();
        assert_eq!(display_text(&text, Some("en")), Ok("B"));
        assert_eq!(display_text(&text, Some("de")), Ok("A"));
    }

    #[test]
    fn flat_directory_selected_as_is() {
        let feeds = vec![feed("station_status", "https://x/ss")];
        let data = DiscoveryData::Flat {
            feeds: feeds.clone(),
        };
        assert_eq!(select_directory(data, Some("fr")), Ok(feeds));
    }

    #[test]
    fn nested_directory_prefers_language() {
        let data = || {
            DiscoveryData::ByLanguage(LanguageFeeds(vec![
                ("en".into(), vec![feed("station_status", "https://x/en")]),
                ("fr".into(), vec![feed("station_status", "https://x/fr")]),
            ]))
        };

        let fr = select_directory(data(), Some("fr")).unwrap();
        assert_eq!(fr[0].url, "https://x/fr");

        let first = select_directory(data(), None).unwrap();
        assert_eq!(first[0].url, "https://x/en");

        let missing = select_directory(data(), Some("de")).unwrap();
        assert_eq!(missing[0].url, "https://x/en");
    }

    #[test]
    fn nested_directory_without_languages() {
        let data = DiscoveryData::ByLanguage(LanguageFeeds::default());
        assert_eq!(select_directory(data, None), Err(ResolveError::EmptyDirectory));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ResolveError::FeedNotFound("station_status".into()).to_string(),
            "no 'station_status' feed found"
        );
        assert_eq!(
            ResolveError::LanguageNotFound("de".into()).to_string(),
            "no text found for language 'de'"
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn feed_list() -> impl Strategy<Value = Vec<Feed>> {
        proptest::collection::vec(
            ("[a-z_]{1,20}", "https://[a-z]{1,10}\\.org/[a-z]{1,10}")
                .prop_map(|(name, url)| Feed { name, url }),
            0..10,
        )
    }

    proptest! {
        /// A present name resolves to the url of its first occurrence
        #[test]
        fn present_name_resolves(feeds in feed_list(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!feeds.is_empty());
            let wanted = &feeds[pick.index(feeds.len())].name;
            let expected = feeds.iter().find(|f| &f.name == wanted).unwrap();
            prop_assert_eq!(resolve_feed_url(&feeds, wanted), Ok(expected.url.as_str()));
        }

        /// An absent name is always not found
        #[test]
        fn absent_name_not_found(feeds in feed_list(), name in "[A-Z]{1,10}") {
            // generated feed names are lowercase, so an uppercase name is never present
            prop_assert_eq!(
                resolve_feed_url(&feeds, &name),
                Err(ResolveError::FeedNotFound(name.clone()))
            );
        }

        /// Plain text is returned unchanged for any language
        #[test]
        fn plain_text_unchanged(text in ".*", language in proptest::option::of("[a-z]{2}")) {
            let value = LocalizedText::Plain(text.clone());
            prop_assert_eq!(resolve_localized_text(&value, language.as_deref()), Ok(text.as_str()));
        }
    }
}
