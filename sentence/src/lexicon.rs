//! Word-by-word fallback rendering.

use crate::Language;

struct Word {
    sign: &'static str,
    english: &'static str,
    swahili: &'static str,
}

const fn word(sign: &'static str, english: &'static str, swahili: &'static str) -> Word {
    Word {
        sign,
        english,
        swahili,
    }
}

const WORDS: &[Word] = &[
    word("I", "I", "Mimi"),
    word("YOU", "You", "Wewe"),
    word("GO", "go", "enda"),
    word("SCHOOL", "school", "shule"),
    word("LEARN", "learn", "jifunza"),
    word("SIGN", "sign", "ishara"),
    word("HELP", "help", "saidia"),
    word("ME", "me", "mimi"),
    word("HELLO", "Hello", "Habari"),
    word("GOOD", "good", "nzuri"),
    word("GOOD / YES", "good", "nzuri"),
    word("YES", "yes", "ndiyo"),
    word("NO", "no", "hapana"),
    word("THANK", "thank", "asante"),
    word("THANK YOU", "thank you", "asante"),
    word("SORRY", "sorry", "pole"),
    word("MORE", "more", "zaidi"),
    word("FINISHED", "finished", "kwisha"),
    word("HAPPY", "happy", "furahi"),
    word("SAD", "sad", "huzuni"),
    word("A", "A", "A"),
    word("ONE / POINT", "one", "moja"),
    word("TWO / PEACE", "two", "mbili"),
    word("THREE", "three", "tatu"),
    word("FOUR", "four", "nne"),
    word("FIVE / STOP", "five", "tano"),
    word("I / SMALL", "I", "mimi"),
];

/// Verbs that already follow "I" without a copula.
const VERBS_AFTER_I: [&str; 5] = ["go", "learn", "help", "want", "need"];

/// Canonical form used for lookups: trimmed and upper-cased.
pub fn normalize_sign(sign: &str) -> String {
    sign.trim().to_uppercase()
}

/// Translates one sign, if the lexicon knows it.
pub fn translate_word(sign: &str, language: Language) -> Option<&'static str> {
    let normalized = normalize_sign(sign);
    WORDS.iter().find(|w| w.sign == normalized).map(|w| match language {
        Language::English => w.english,
        Language::Swahili => w.swahili,
    })
}

/// Renders signs word by word.
///
/// Unknown signs fall back to their first `" / "` alternative, lowercased
/// with the first letter capitalized. English output gets "am" after a
/// leading "I" unless the next word is a verb.
pub fn compose_words<S: AsRef<str>>(signs: &[S], language: Language) -> String {
    let mut words: Vec<String> = signs
        .iter()
        .map(|s| {
            let s = s.as_ref();
            translate_word(s, language)
                .map(String::from)
                .unwrap_or_else(|| display_label(s))
        })
        .collect();

    if language == Language::English
        && words.len() >= 2
        && words[0].eq_ignore_ascii_case("i")
        && !VERBS_AFTER_I.contains(&words[1].to_lowercase().as_str())
    {
        words.insert(1, "am".to_string());
    }

    words.join(" ")
}

fn display_label(sign: &str) -> String {
    let head = sign.split(" / ").next().unwrap_or(sign).to_lowercase();
    let mut chars = head.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
