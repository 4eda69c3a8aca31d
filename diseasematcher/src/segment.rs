//! Trigger-phrase segment extraction from drug descriptions.
//!
//! Drug pages describe side effects and indications in loosely structured
//! prose: "Get emergency medical help if you have hives, difficult breathing;
//! swelling of your face. Common side effects include ...". The extractor
//! finds each trigger phrase, takes the text up to the next trigger or period,
//! and splits that segment into items on `,` and `;`.
//!
//! ## Presets
//!
//! - [`SegmentExtractor::side_effects`]: emergency / call-your-doctor / common
//!   side effect phrasing
//! - [`SegmentExtractor::usages`]: "is used to treat", "is used for"

/// Pieces this short carry no information ("and", "etc").
const MIN_ITEM_LEN: usize = 3;

const SIDE_EFFECT_TRIGGERS: &[&str] = &[
    "get emergency medical help if you have",
    "call your doctor at once if you have",
    "seek medical attention",
    "stop using",
    "common side effects",
    "this is not a complete list of side effects",
];

const SIDE_EFFECT_STOPLIST: &[&str] = &["may report", "call your doctor"];

const USAGE_TRIGGERS: &[&str] = &["is used to treat", "is used for"];

const USAGE_STOPLIST: &[&str] = &["purposes not listed"];

/// Items extracted after one trigger phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSegment {
    pub phrase: String,
    pub items: Vec<String>,
}

/// Extraction result, ordered like the extractor's trigger list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments(Vec<PhraseSegment>);

impl Segments {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhraseSegment> {
        self.0.iter()
    }

    /// Items found after `phrase`, if the phrase occurred in the text.
    pub fn items_for(&self, phrase: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|segment| segment.phrase == phrase)
            .map(|segment| segment.items.as_slice())
    }

    /// Every item across all phrases, in trigger order.
    pub fn all_items(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|segment| segment.items.iter().map(String::as_str))
    }
}

/// Segmenter configured with trigger phrases and a boilerplate stoplist.
#[derive(Debug, Clone)]
pub struct SegmentExtractor {
    triggers: Vec<String>,
    stoplist: Vec<String>,
}

impl SegmentExtractor {
    pub fn new<T, S>(triggers: T, stoplist: S) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        SegmentExtractor {
            triggers: triggers
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            stoplist: stoplist
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Side-effect phrasing used on drug "side effects" sections.
    pub fn side_effects() -> Self {
        Self::new(SIDE_EFFECT_TRIGGERS, SIDE_EFFECT_STOPLIST)
    }

    /// Indication phrasing used on "what is this drug" sections.
    pub fn usages() -> Self {
        Self::new(USAGE_TRIGGERS, USAGE_STOPLIST)
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Extract the items following every trigger phrase present in `text`.
    ///
    /// Only the first occurrence of each trigger is used. A segment ends at the
    /// earliest later occurrence of another trigger or the next `.`, whichever
    /// comes first, else at the end of the text. Items are lowercased.
    pub fn extract(&self, text: &str) -> Segments {
        let lower = text.to_lowercase();
        let mut segments = Vec::new();

        for (index, trigger) in self.triggers.iter().enumerate() {
            let Some(start) = lower.find(trigger.as_str()) else {
                continue;
            };
            let seg_start = start + trigger.len();

            let next_trigger = self
                .triggers
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .filter_map(|(_, other)| lower[seg_start..].find(other.as_str()))
                .min();
            let next_period = lower[seg_start..].find('.');

            let seg_end = match (next_trigger, next_period) {
                (Some(t), Some(p)) => seg_start + t.min(p),
                (Some(t), None) => seg_start + t,
                (None, Some(p)) => seg_start + p,
                (None, None) => lower.len(),
            };

            let segment = lower[seg_start..seg_end].trim();
            segments.push(PhraseSegment {
                phrase: trigger.clone(),
                items: self.split_items(segment),
            });
        }

        Segments(segments)
    }

    fn split_items(&self, segment: &str) -> Vec<String> {
        segment
            .split(&[',', ';'][..])
            .map(str::trim)
            .filter(|item| item.chars().count() > MIN_ITEM_LEN)
            .filter(|item| !self.stoplist.iter().any(|stop| item.contains(stop.as_str())))
            .map(str::to_string)
            .collect()
    }
}

/// Drug class from "X is a <class> that ..." phrasing.
///
/// ```
/// use diseasematcher::segment::extract_category;
///
/// let text = "Lisinopril is an ACE inhibitor. Lisinopril is a medicine that lowers blood pressure.";
/// assert_eq!(extract_category(text).as_deref(), Some("medicine"));
/// ```
pub fn extract_category(text: &str) -> Option<String> {
    const TRIGGER: &str = "is a ";
    const END: &str = " that";

    let lower = text.to_lowercase();
    let start = lower.find(TRIGGER)? + TRIGGER.len();
    let end = start + lower[start..].find(END)?;
    let category = lower[start..end].trim();

    (category.chars().count() > MIN_ITEM_LEN).then(|| category.to_string())
}

/// Phrases whose sentence remainder names what a drug is or treats.
pub const INDICATION_TRIGGERS: [&str; 4] =
    ["is used to treat", "is used for", "is a", "may also be used for"];

/// Rest of the sentence after each indication phrase, lowercased.
///
/// Each phrase contributes at most once, from its first whole-word
/// occurrence, up to the next `.` or the end of the text.
///
/// ```
/// use diseasematcher::segment::extract_indications;
///
/// let text = "Metformin is used to treat type 2 diabetes. It may also be used for PCOS.";
/// assert_eq!(extract_indications(text), ["type 2 diabetes", "pcos"]);
/// ```
pub fn extract_indications(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    INDICATION_TRIGGERS
        .iter()
        .filter_map(|phrase| {
            let start = find_phrase(&lower, phrase)? + phrase.len();
            let end = lower[start..].find('.').map_or(lower.len(), |offset| start + offset);
            let indication = lower[start..end].trim();
            (!indication.is_empty()).then(|| indication.to_string())
        })
        .collect()
}

/// First occurrence of `phrase` with no letter or digit directly around it.
fn find_phrase(text: &str, phrase: &str) -> Option<usize> {
    text.match_indices(phrase).map(|(index, _)| index).find(|&index| {
        let before = text[..index].chars().next_back();
        let after = text[index + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
