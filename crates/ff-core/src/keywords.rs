//! Keyword phrase parsing
//!
//! Turns the user's newline-separated phrase list into the literal patterns fed
//! to the keyword index. The matcher is case-exact, so common casings of each
//! phrase are generated up front.

use std::collections::HashSet;

/// Phrases shorter than this (in characters) would filter far too broadly.
pub const MINIMUM_KEYWORD_LENGTH: usize = 3;

/// Strings present in the payload of practically every video.
///
/// A phrase that is a substring of any of these would hide everything.
/// Entries use the exact casing found in payloads.
pub const STRINGS_IN_EVERY_BUFFER: &[&str] = &[
    // Video playback data.
    "https://i.ytimg.com/vi/",
    "sddefault.jpg",
    "hqdefault.webp",
    "googlevideo.com/initplayback?source=youtube",
    "ANDROID",
    // Video decoders.
    "OMX.ffmpeg.vp9.decoder",
    "OMX.Intel.sw_vd.vp9",
    "OMX.sprd.av1.decoder",
    "OMX.MTK.VIDEO.DECODER.SW.VP9",
    "c2.android.av1.decoder",
    "c2.mtk.sw.vp9.decoder",
    // User analytics.
    "https://ad.doubleclick.net/ddm/activity/",
    "DEVICE_ADVERTISER_ID_FOR_CONVERSION_TRACKING",
    // Components that share the buffer with path-filtered items.
    "metadata.eml",
    "thumbnail.eml",
    "avatar.eml",
    "overflow_button.eml",
];

/// Why a phrase was left out of the keyword index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhraseError {
    #[error("Invalid keyword length (must be at least {minimum}): {phrase}")]
    TooShort { phrase: String, minimum: usize },
    #[error("Invalid keyword. Will hide all videos: {phrase}")]
    HidesAllContent { phrase: String },
}

/// Result of parsing a phrase list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    /// Accepted keyword variants, deduplicated, in phrase order
    pub keywords: Vec<String>,
    /// Phrases that were skipped
    pub rejected: Vec<PhraseError>,
}

/// Parse a raw phrase list.
///
/// One bad phrase never stops the others from being processed.
pub fn parse_keyword_phrases(raw: &str) -> KeywordSet {
    let mut set = KeywordSet::default();
    let mut seen = HashSet::new();

    for line in raw.split('\n') {
        let phrase = line.trim_end();
        if phrase.trim().is_empty() {
            continue;
        }

        if phrase.chars().count() < MINIMUM_KEYWORD_LENGTH {
            // The setting itself is left alone so the user can fix it.
            set.rejected.push(PhraseError::TooShort {
                phrase: phrase.to_string(),
                minimum: MINIMUM_KEYWORD_LENGTH,
            });
            continue;
        }

        let variants = case_variants(phrase);
        if would_hide_all_videos(&variants) {
            set.rejected.push(PhraseError::HidesAllContent {
                phrase: phrase.to_string(),
            });
            continue;
        }

        for variant in variants {
            if seen.insert(variant.clone()) {
                set.keywords.push(variant);
            }
        }
    }

    set
}

/// The five casings indexed for every phrase.
///
/// As entered, lower case, first word title-cased, every word title-cased, upper case.
pub fn case_variants(phrase: &str) -> [String; 5] {
    [
        phrase.to_string(),
        phrase.to_lowercase(),
        title_case_first_word(phrase),
        capitalize_all_first_letters(phrase),
        phrase.to_uppercase(),
    ]
}

/// Is any variant a substring of a string found in every buffer?
fn would_hide_all_videos(variants: &[String]) -> bool {
    STRINGS_IN_EVERY_BUFFER
        .iter()
        .any(|common| variants.iter().any(|v| common.contains(v.as_str())))
}

/// Uppercase the first character of the phrase.
fn title_case_first_word(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase the first character of every space-separated word.
fn capitalize_all_first_letters(sentence: &str) -> String {
    let mut out = String::with_capacity(sentence.len());
    let mut capitalize_next = true;
    for c in sentence.chars() {
        if c == ' ' {
            capitalize_next = true;
            out.push(c);
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
