use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::state::VoiceGender;

/// A synthesis voice offered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub uri: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, uri: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            lang: lang.into(),
        }
    }

    /// Stable identifier: the URI, or the name when the URI is empty.
    pub fn id(&self) -> &str {
        if self.uri.is_empty() { &self.name } else { &self.uri }
    }

    fn matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.name) || pattern.is_match(&self.uri)
    }

    fn is_branded(&self) -> bool {
        self.name.contains("Google") || self.name.contains("Microsoft")
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid voice pattern"))
        .collect()
}

// `male` needs word boundaries or it would match "Female".
static MALE_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\bmale\b", "david", "mark", "guy", "andrew", "brian"]));

static FEMALE_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&["female", "zira", "jessa", "samantha", "victoria", "hazel"]));

fn patterns_for(gender: VoiceGender) -> &'static [Regex] {
    match gender {
        VoiceGender::Male => &MALE_PATTERNS,
        VoiceGender::Female => &FEMALE_PATTERNS,
    }
}

pub fn find_by_id<'a>(voices: &'a [Voice], id: &str) -> Option<&'a Voice> {
    voices.iter().find(|v| v.uri == id || v.name == id)
}

/// Picks a voice for `gender`: a branded pattern match, then any pattern
/// match, then a voice whose language starts with `lang_prefix`, then the
/// first voice.
pub fn select_preferred_voice<'a>(
    voices: &'a [Voice],
    gender: VoiceGender,
    lang_prefix: &str,
) -> Option<&'a Voice> {
    let patterns = patterns_for(gender);

    patterns
        .iter()
        .find_map(|p| voices.iter().find(|v| v.matches(p) && v.is_branded()))
        .or_else(|| {
            patterns
                .iter()
                .find_map(|p| voices.iter().find(|v| v.matches(p)))
        })
        .or_else(|| voices.iter().find(|v| v.lang.starts_with(lang_prefix)))
        .or_else(|| voices.first())
}

/// Voice ids to use per gender, keeping stored ids that still resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceChoice {
    pub female: Option<String>,
    pub male: Option<String>,
}

impl VoiceChoice {
    pub fn resolve(
        voices: &[Voice],
        stored_female: Option<&str>,
        stored_male: Option<&str>,
        lang_prefix: &str,
    ) -> Self {
        let pick = |stored: Option<&str>, gender| {
            stored
                .filter(|id| find_by_id(voices, id).is_some())
                .map(str::to_string)
                .or_else(|| {
                    select_preferred_voice(voices, gender, lang_prefix).map(|v| v.id().to_string())
                })
        };
        Self {
            female: pick(stored_female, VoiceGender::Female),
            male: pick(stored_male, VoiceGender::Male),
        }
    }

    pub fn get(&self, gender: VoiceGender) -> Option<&str> {
        match gender {
            VoiceGender::Female => self.female.as_deref(),
            VoiceGender::Male => self.male.as_deref(),
        }
    }
}

/// One utterance to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
    /// Set only when the chosen voice id could not be resolved.
    pub pitch: Option<f32>,
}

impl Utterance {
    /// Builds an utterance with the chosen voice, falling back to a pattern
    /// match and a gendered pitch when `voice_id` does not resolve.
    pub fn build(
        text: impl Into<String>,
        lang: &str,
        voices: &[Voice],
        gender: VoiceGender,
        voice_id: Option<&str>,
    ) -> Self {
        let text = text.into();
        if let Some(voice) = voice_id.and_then(|id| find_by_id(voices, id)) {
            return Self {
                text,
                lang: lang.to_string(),
                voice: Some(voice.clone()),
                pitch: None,
            };
        }
        let prefix = lang.split('-').next().unwrap_or(lang);
        Self {
            text,
            lang: lang.to_string(),
            voice: select_preferred_voice(voices, gender, prefix).cloned(),
            pitch: Some(gender.fallback_pitch()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Alex", "com.apple.alex", "en-US"),
            Voice::new("Microsoft Zira - English", "zira-uri", "en-US"),
            Voice::new("Google UK English Female", "gfemale", "en-GB"),
            Voice::new("Google UK English Male", "gmale", "en-GB"),
            Voice::new("Microsoft David - English", "david-uri", "en-US"),
        ]
    }

    #[test]
    fn test_branded_match_wins() {
        let list = voices();
        let male = select_preferred_voice(&list, VoiceGender::Male, "en").unwrap();
        assert_eq!(male.name, "Google UK English Male");
        let female = select_preferred_voice(&list, VoiceGender::Female, "en").unwrap();
        assert_eq!(female.name, "Google UK English Female");
    }

    #[test]
    fn test_male_pattern_never_picks_female() {
        let list = vec![
            Voice::new("Google UK English Female", "gfemale", "en-GB"),
            Voice::new("Google UK English Male", "gmale", "en-GB"),
        ];
        let male = select_preferred_voice(&list, VoiceGender::Male, "en").unwrap();
        assert_eq!(male.name, "Google UK English Male");

        let list = vec![
            Voice::new("Samantha Female", "s", "fr-FR"),
            Voice::new("Daniel", "d", "en-GB"),
        ];
        let male = select_preferred_voice(&list, VoiceGender::Male, "en").unwrap();
        assert_eq!(male.name, "Daniel");
    }

    #[test]
    fn test_unbranded_match_then_language_then_first() {
        let list = vec![
            Voice::new("Thomas", "t", "fr-FR"),
            Voice::new("Hazel", "h", "en-GB"),
        ];
        assert_eq!(
            select_preferred_voice(&list, VoiceGender::Female, "en").unwrap().name,
            "Hazel"
        );

        let list = vec![Voice::new("Thomas", "t", "fr-FR"), Voice::new("Kyoko", "k", "ja-JP")];
        assert_eq!(
            select_preferred_voice(&list, VoiceGender::Male, "en").unwrap().name,
            "Thomas"
        );
        assert!(select_preferred_voice(&[], VoiceGender::Male, "en").is_none());
    }

    #[test]
    fn test_choice_keeps_stored_ids_that_resolve() {
        let list = voices();
        let choice = VoiceChoice::resolve(&list, Some("zira-uri"), Some("gone"), "en");
        assert_eq!(choice.get(VoiceGender::Female), Some("zira-uri"));
        assert_eq!(choice.get(VoiceGender::Male), Some("gmale"));
    }

    #[test]
    fn test_utterance_uses_resolved_voice_without_pitch() {
        let list = voices();
        let u = Utterance::build("Hello", "en-US", &list, VoiceGender::Male, Some("david-uri"));
        assert_eq!(u.voice.unwrap().name, "Microsoft David - English");
        assert_eq!(u.pitch, None);
    }

    #[test]
    fn test_utterance_falls_back_with_pitch() {
        let list = voices();
        let u = Utterance::build("Hello", "en-US", &list, VoiceGender::Female, Some("missing"));
        assert_eq!(u.voice.unwrap().name, "Google UK English Female");
        assert_eq!(u.pitch, Some(1.2));
    }

    #[test]
    fn test_voice_id_prefers_uri() {
        assert_eq!(Voice::new("Alex", "", "en-US").id(), "Alex");
        assert_eq!(Voice::new("Alex", "uri", "en-US").id(), "uri");
    }
}
