//! Provider profiles - per-service locators and URL predicates
//!
//! Each supported webmail service renders its inbox differently. A profile
//! bundles the locators the extractor needs for one service. Field locators
//! are candidate lists: the service-specific locator first, then generic
//! fallbacks shared by all services. The first candidate that yields
//! non-empty text wins.

use crate::selector::{Selector, SelectorError};
use std::error::Error;
use std::fmt;

const GENERIC_SUBJECT: &[&str] = &[
    r#"[data-test-id="message-subject"]"#,
    "[title]",
    ".subject",
    ".email-subject",
];

const GENERIC_SENDER: &[&str] = &[
    r#"[data-test-id="message-sender"]"#,
    "[email]",
    ".sender",
    ".from",
];

const GENERIC_CONTENT: &[&str] = &[
    ".snippet",
    ".preview",
    ".email-preview",
    r#"[data-test-id="message-snippet"]"#,
];

const TIMESTAMP: &[&str] = &[
    r#"[data-test-id="message-time"]"#,
    ".time",
    ".timestamp",
    r#"[title*=":"]"#,
];

const UNREAD: &[&str] = &[".unread", r#"[data-test-id="unread"]"#, ".email-unread"];

/// A built-in profile failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileError {
    /// Provider whose profile is broken
    pub provider: Provider,
    /// Underlying selector failure
    pub source: SelectorError,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {} profile: {}", self.provider.name(), self.source)
    }
}

impl Error for ProfileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Supported webmail services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// mail.google.com
    Gmail,
    /// outlook.live.com / outlook.office.com
    Outlook,
    /// mail.yahoo.com
    Yahoo,
}

impl Provider {
    /// All providers in detection order
    pub fn all() -> [Provider; 3] {
        [Provider::Gmail, Provider::Outlook, Provider::Yahoo]
    }

    /// Detect the provider serving `url`
    ///
    /// # Examples
    ///
    /// ```
    /// use mailsift_domain::Provider;
    ///
    /// assert_eq!(Provider::detect("https://mail.google.com/mail/u/0/#inbox"), Some(Provider::Gmail));
    /// assert_eq!(Provider::detect("https://example.com"), None);
    /// ```
    pub fn detect(url: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|provider| provider.url_patterns().iter().any(|p| url.contains(p)))
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gmail => "Gmail",
            Provider::Outlook => "Outlook",
            Provider::Yahoo => "Yahoo Mail",
        }
    }

    /// Host fragments identifying this provider
    pub fn url_patterns(&self) -> &'static [&'static str] {
        match self {
            Provider::Gmail => &["mail.google.com"],
            Provider::Outlook => &["outlook.live.com", "outlook.office.com"],
            Provider::Yahoo => &["mail.yahoo.com"],
        }
    }

    /// Whether `url` is an inbox listing (not a compose view)
    pub fn is_inbox_page(&self, url: &str) -> bool {
        if url.contains("/compose/") {
            return false;
        }
        match self {
            Provider::Gmail => url.contains("/mail/u/"),
            Provider::Outlook => url.contains("/mail/"),
            Provider::Yahoo => url.contains("/inbox") || url.contains("/n/inbox"),
        }
    }

    fn raw_locators(&self) -> RawLocators {
        match self {
            Provider::Gmail => RawLocators {
                inbox: r#"[role="main"]"#,
                container: "tr.zA",
                subject: "span.bog, h2.hP",
                sender: "span.yX.xY",
                content: ".y2",
                unread: Some(".zE"),
            },
            Provider::Outlook => RawLocators {
                inbox: r#"[role="main"]"#,
                container: r#"[role="row"]"#,
                subject: "[title]",
                sender: "[title]",
                content: r#"[role="main"]"#,
                unread: None,
            },
            Provider::Yahoo => RawLocators {
                inbox: ".mail-app",
                container: r#"[data-test-id="message-list-item"]"#,
                subject: r#"[data-test-id="message-subject"]"#,
                sender: r#"[data-test-id="message-sender"]"#,
                content: ".message-body",
                unread: None,
            },
        }
    }

    /// Build and validate this provider's profile
    pub fn profile(&self) -> Result<ProviderProfile, ProfileError> {
        let raw = self.raw_locators();
        let provider = *self;
        let wrap = |source| ProfileError { provider, source };

        let candidates = |primary: &str, fallbacks: &[&str]| -> Result<Vec<Selector>, ProfileError> {
            std::iter::once(primary)
                .chain(fallbacks.iter().copied())
                .map(|s| Selector::parse(s).map_err(wrap))
                .collect()
        };

        let mut unread = UNREAD
            .iter()
            .map(|s| Selector::parse(s).map_err(wrap))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(extra) = raw.unread {
            unread.push(Selector::parse(extra).map_err(wrap)?);
        }

        Ok(ProviderProfile {
            provider,
            locators: Locators {
                inbox: Selector::parse(raw.inbox).map_err(wrap)?,
                container: Selector::parse(raw.container).map_err(wrap)?,
                subject: candidates(raw.subject, GENERIC_SUBJECT)?,
                sender: candidates(raw.sender, GENERIC_SENDER)?,
                content: candidates(raw.content, GENERIC_CONTENT)?,
                timestamp: TIMESTAMP
                    .iter()
                    .map(|s| Selector::parse(s).map_err(wrap))
                    .collect::<Result<Vec<_>, _>>()?,
                unread,
            },
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct RawLocators {
    inbox: &'static str,
    container: &'static str,
    subject: &'static str,
    sender: &'static str,
    content: &'static str,
    unread: Option<&'static str>,
}

/// Parsed locators for one provider
#[derive(Debug, Clone)]
pub struct Locators {
    /// Inbox root
    pub inbox: Selector,
    /// One match per inbox entry
    pub container: Selector,
    /// Subject candidates, in priority order
    pub subject: Vec<Selector>,
    /// Sender candidates, in priority order
    pub sender: Vec<Selector>,
    /// Preview candidates, in priority order
    pub content: Vec<Selector>,
    /// Timestamp candidates, in priority order
    pub timestamp: Vec<Selector>,
    /// Any match marks the entry unread
    pub unread: Vec<Selector>,
}

/// A validated provider profile
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Which service this describes
    pub provider: Provider,
    /// Parsed locators
    pub locators: Locators,
}

impl ProviderProfile {
    /// Detect the provider for `url` and build its profile
    pub fn for_url(url: &str) -> Option<Result<Self, ProfileError>> {
        Provider::detect(url).map(|provider| provider.profile())
    }
}
