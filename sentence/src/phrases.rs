//! Curated phrase table.
//!
//! Whole-sentence renderings for common sign sequences. Keys are the sign
//! labels joined with `,`. Table order is match priority.

use crate::lexicon::normalize_sign;
use crate::Language;

/// A known sign sequence with idiomatic renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrase {
    pub key: &'static str,
    pub english: &'static str,
    pub swahili: &'static str,
}

impl Phrase {
    const fn new(key: &'static str, english: &'static str, swahili: &'static str) -> Self {
        Self {
            key,
            english,
            swahili,
        }
    }

    pub fn text(&self, language: Language) -> &'static str {
        match language {
            Language::English => self.english,
            Language::Swahili => self.swahili,
        }
    }

    /// Sign labels making up the key.
    pub fn parts(&self) -> impl Iterator<Item = &'static str> {
        self.key.split(',')
    }
}

pub const PHRASES: &[Phrase] = &[
    // Greetings
    Phrase::new("HELLO", "Hello", "Habari"),
    Phrase::new("GOOD,MORNING", "Good morning", "Habari za asubuhi"),
    Phrase::new("GOOD,EVENING", "Good evening", "Habari za jioni"),
    Phrase::new("THANK YOU", "Thank you", "Asante"),
    Phrase::new("SORRY", "I'm sorry", "Pole"),
    // Common phrases
    Phrase::new("I,GO,SCHOOL", "I am going to school", "Naenda shule"),
    Phrase::new(
        "I,LEARN,SIGN",
        "I am learning sign language",
        "Ninajifunza lugha ya ishara",
    ),
    Phrase::new("HELP,ME", "Help me please", "Nisaidie tafadhali"),
    Phrase::new("HELP", "Help", "Msaada"),
    Phrase::new("MORE", "More", "Zaidi"),
    Phrase::new("FINISHED", "Finished", "Imekwisha"),
    // Questions
    Phrase::new("WHAT,YOUR,NAME", "What is your name?", "Jina lako ni nani?"),
    Phrase::new("HOW,YOU", "How are you?", "Habari yako?"),
    Phrase::new("WHERE,GO", "Where are you going?", "Unaenda wapi?"),
    // Basic sentences
    Phrase::new("I,HAPPY", "I am happy", "Mimi nafurahi"),
    Phrase::new("I,SAD", "I am sad", "Mimi nina huzuni"),
    Phrase::new("I,HUNGRY", "I am hungry", "Nina njaa"),
    Phrase::new("I,THIRSTY", "I am thirsty", "Nina kiu"),
    Phrase::new("I,TIRED", "I am tired", "Nimechoka"),
    // Numbers
    Phrase::new("ONE", "One", "Moja"),
    Phrase::new("ONE / POINT", "One", "Moja"),
    Phrase::new("TWO", "Two", "Mbili"),
    Phrase::new("TWO / PEACE", "Two", "Mbili"),
    Phrase::new("THREE", "Three", "Tatu"),
    Phrase::new("FOUR", "Four", "Nne"),
    Phrase::new("FIVE", "Five", "Tano"),
    Phrase::new("FIVE / STOP", "Five / Stop", "Tano / Simama"),
    // Letters
    Phrase::new("A", "A", "A"),
    Phrase::new("I / SMALL", "I / Small", "I / Ndogo"),
    // Actions
    Phrase::new("GOOD / YES", "Good / Yes", "Nzuri / Ndiyo"),
    Phrase::new("NO", "No", "Hapana"),
    Phrase::new("STOP", "Stop", "Simama"),
    Phrase::new("WAIT", "Wait", "Subiri"),
    Phrase::new("COME", "Come", "Njoo"),
    Phrase::new("GO", "Go", "Nenda"),
];

/// Looks up a sign sequence in the phrase table.
///
/// An exact key match wins. Otherwise the first entry (in table order) with
/// the same number of parts where every observed sign and pattern part
/// contain one another, in either direction, after normalization.
pub fn find_phrase<S: AsRef<str>>(signs: &[S]) -> Option<&'static Phrase> {
    if signs.is_empty() {
        return None;
    }

    let key = signs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    if let Some(phrase) = PHRASES.iter().find(|p| p.key == key) {
        return Some(phrase);
    }

    let observed: Vec<String> = signs.iter().map(|s| normalize_sign(s.as_ref())).collect();
    PHRASES.iter().find(|phrase| {
        let parts: Vec<String> = phrase.parts().map(normalize_sign).collect();
        parts.len() == observed.len()
            && parts
                .iter()
                .zip(&observed)
                .all(|(p, o)| o.contains(p.as_str()) || p.contains(o.as_str()))
    })
}
