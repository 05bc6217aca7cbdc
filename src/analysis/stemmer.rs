//! Porter stemming for query terms.
//!
//! Reduces English words to their stems with the classic five-step suffix
//! stripping algorithm:
//! 1. Plurals and -ed/-ing suffixes
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and -ll
//!
//! # Examples
//!
//! ```
//! use agora::analysis::stemmer::{PorterStemmer, Stemmer};
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("dresses"), "dress");
//! assert_eq!(stemmer.stem("sustainable"), "sustain");
//! assert_eq!(stemmer.stem("running"), "run");
//! ```

/// Trait for word stemmers.
pub trait Stemmer: Send + Sync {
    /// Reduce a word to its stem.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Porter stemming algorithm implementation.
///
/// Operates on lowercase ASCII words; words of length <= 2 or containing
/// non-ASCII characters are returned lowercased but otherwise unchanged.
#[derive(Debug, Clone, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Check if the byte at `pos` is a vowel.
    ///
    /// `y` counts as a vowel when it follows a consonant.
    fn is_vowel(word: &[u8], pos: usize) -> bool {
        match word[pos] {
            b'a' | b'e' | b'i' | b'o' | b'u' => true,
            b'y' if pos > 0 => !Self::is_vowel(word, pos - 1),
            _ => false,
        }
    }

    /// The measure of a word: the number of vowel-consonant sequences.
    fn measure(word: &str) -> usize {
        let bytes = word.as_bytes();
        let n = bytes.len();
        let mut m = 0;
        let mut i = 0;

        while i < n && !Self::is_vowel(bytes, i) {
            i += 1;
        }

        while i < n {
            while i < n && Self::is_vowel(bytes, i) {
                i += 1;
            }
            if i >= n {
                break;
            }
            m += 1;
            while i < n && !Self::is_vowel(bytes, i) {
                i += 1;
            }
        }

        m
    }

    fn contains_vowel(word: &str) -> bool {
        let bytes = word.as_bytes();
        (0..bytes.len()).any(|i| Self::is_vowel(bytes, i))
    }

    fn ends_with_double_consonant(word: &str) -> bool {
        let bytes = word.as_bytes();
        let len = bytes.len();
        len >= 2 && bytes[len - 1] == bytes[len - 2] && !Self::is_vowel(bytes, len - 1)
    }

    /// Check for a consonant-vowel-consonant ending where the final
    /// consonant is not w, x, or y.
    fn ends_cvc(word: &str) -> bool {
        let bytes = word.as_bytes();
        let len = bytes.len();
        if len < 3 {
            return false;
        }

        !Self::is_vowel(bytes, len - 3)
            && Self::is_vowel(bytes, len - 2)
            && !Self::is_vowel(bytes, len - 1)
            && !matches!(bytes[len - 1], b'w' | b'x' | b'y')
    }

    /// Replace `old_suffix` with `new_suffix` when the remaining stem has at
    /// least `min_measure`.
    fn replace_suffix(word: &str, old_suffix: &str, new_suffix: &str, min_measure: usize) -> String {
        if let Some(stem) = word.strip_suffix(old_suffix)
            && Self::measure(stem) >= min_measure
        {
            return format!("{stem}{new_suffix}");
        }
        word.to_string()
    }

    /// Step 1a: plural endings.
    fn step1a(word: &str) -> String {
        if let Some(stem) = word.strip_suffix("sses") {
            format!("{stem}ss")
        } else if let Some(stem) = word.strip_suffix("ies") {
            format!("{stem}i")
        } else if word.ends_with("ss") {
            word.to_string()
        } else if word.len() > 1
            && let Some(stem) = word.strip_suffix('s')
        {
            stem.to_string()
        } else {
            word.to_string()
        }
    }

    /// Step 1b: -eed, -ed, -ing endings.
    fn step1b(word: &str) -> String {
        let stripped = if word.ends_with("eed") {
            Self::replace_suffix(word, "eed", "ee", 1)
        } else if let Some(stem) = word.strip_suffix("ed") {
            if Self::contains_vowel(stem) {
                stem.to_string()
            } else {
                word.to_string()
            }
        } else if let Some(stem) = word.strip_suffix("ing") {
            if Self::contains_vowel(stem) {
                stem.to_string()
            } else {
                word.to_string()
            }
        } else {
            word.to_string()
        };

        if stripped == word {
            return stripped;
        }

        // Fix up the stem left behind by -ed/-ing removal.
        if stripped.ends_with("at") || stripped.ends_with("bl") || stripped.ends_with("iz") {
            format!("{stripped}e")
        } else if Self::ends_with_double_consonant(&stripped)
            && !stripped.ends_with('l')
            && !stripped.ends_with('s')
            && !stripped.ends_with('z')
        {
            stripped[..stripped.len() - 1].to_string()
        } else if Self::measure(&stripped) == 1 && Self::ends_cvc(&stripped) {
            format!("{stripped}e")
        } else {
            stripped
        }
    }

    /// Step 2: double-suffix reductions.
    fn step2(word: &str) -> String {
        const SUFFIXES: &[(&str, &str)] = &[
            ("ational", "ate"),
            ("tional", "tion"),
            ("enci", "ence"),
            ("anci", "ance"),
            ("izer", "ize"),
            ("abli", "able"),
            ("alli", "al"),
            ("entli", "ent"),
            ("eli", "e"),
            ("ousli", "ous"),
            ("ization", "ize"),
            ("ation", "ate"),
            ("ator", "ate"),
            ("alism", "al"),
            ("iveness", "ive"),
            ("fulness", "ful"),
            ("ousness", "ous"),
            ("aliti", "al"),
            ("iviti", "ive"),
            ("biliti", "ble"),
        ];

        for (old_suffix, new_suffix) in SUFFIXES {
            if word.ends_with(old_suffix) {
                return Self::replace_suffix(word, old_suffix, new_suffix, 1);
            }
        }

        word.to_string()
    }

    /// Step 3: -ic-, -full, -ness reductions.
    fn step3(word: &str) -> String {
        const SUFFIXES: &[(&str, &str)] = &[
            ("icate", "ic"),
            ("ative", ""),
            ("alize", "al"),
            ("iciti", "ic"),
            ("ical", "ic"),
            ("ful", ""),
            ("ness", ""),
        ];

        for (old_suffix, new_suffix) in SUFFIXES {
            if word.ends_with(old_suffix) {
                return Self::replace_suffix(word, old_suffix, new_suffix, 1);
            }
        }

        word.to_string()
    }

    /// Step 4: remove remaining derivational suffixes.
    fn step4(word: &str) -> String {
        const SUFFIXES: &[&str] = &[
            "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion",
            "ou", "ism", "ate", "iti", "ous", "ive", "ize",
        ];

        for suffix in SUFFIXES {
            if let Some(stem) = word.strip_suffix(suffix)
                && Self::measure(stem) > 1
            {
                // -ion is only removed after s or t.
                if *suffix != "ion" || stem.ends_with('s') || stem.ends_with('t') {
                    return stem.to_string();
                }
            }
        }

        word.to_string()
    }

    /// Step 5: final -e and -ll cleanup.
    fn step5(word: &str) -> String {
        let word = if let Some(stem) = word.strip_suffix('e') {
            let m = Self::measure(stem);
            if m > 1 || (m == 1 && !Self::ends_cvc(stem)) {
                stem.to_string()
            } else {
                word.to_string()
            }
        } else {
            word.to_string()
        };

        if word.ends_with("ll") && Self::measure(&word) > 1 {
            word[..word.len() - 1].to_string()
        } else {
            word
        }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if word.len() <= 2 || !word.is_ascii() {
            return word;
        }

        let word = Self::step1a(&word);
        let word = Self::step1b(&word);
        let word = Self::step2(&word);
        let word = Self::step3(&word);
        let word = Self::step4(&word);
        Self::step5(&word)
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}
