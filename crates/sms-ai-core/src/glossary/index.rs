use std::collections::{HashMap, HashSet};

use sms_ai_types::glossary::{GlossaryEntry, LangCode, TokenMatches};

use super::fuzzy::ratio;
use super::text::{WORD_RE, normalise, tokenise};

/// Default cap on entries returned for one piece of text.
pub const DEFAULT_MAX_TERMS: usize = 30;

/// Minimum fuzzy score (0-100) for a non-exact token to count as a match.
pub const DEFAULT_MIN_SCORE: f64 = 80.0;

/// Lookup tables for one side (Setswana or English) of the glossary.
#[derive(Debug, Default)]
struct SideIndex {
    /// Normalised form -> indices into `GlossaryIndex::entries`.
    by_form: HashMap<String, Vec<usize>>,
    /// Distinct forms in first-seen order, for fuzzy scans.
    forms: Vec<String>,
}

impl SideIndex {
    fn insert(&mut self, form: &str, entry: usize) {
        let key = normalise(form);
        if key.is_empty() {
            return;
        }
        match self.by_form.get_mut(&key) {
            Some(hits) => hits.push(entry),
            None => {
                self.forms.push(key.clone());
                self.by_form.insert(key, vec![entry]);
            }
        }
    }
}

/// In-memory glossary index, built once at startup and shared read-only.
#[derive(Debug, Default)]
pub struct GlossaryIndex {
    entries: Vec<GlossaryEntry>,
    tsn: SideIndex,
    en: SideIndex,
}

impl GlossaryIndex {
    /// An index with no entries. Every lookup returns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(entries: Vec<GlossaryEntry>) -> Self {
        let mut tsn = SideIndex::default();
        let mut en = SideIndex::default();

        for (i, entry) in entries.iter().enumerate() {
            for form in entry.all_setswana_forms() {
                tsn.insert(form, i);
            }
            for form in entry.all_english_forms() {
                en.insert(form, i);
            }
        }

        Self { entries, tsn, en }
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct normalised forms indexed for `lang`.
    pub fn form_count(&self, lang: LangCode) -> usize {
        self.side(lang).forms.len()
    }

    /// Whether `form` (after normalisation) is an indexed form for `lang`.
    pub fn contains_form(&self, lang: LangCode, form: &str) -> bool {
        self.side(lang).by_form.contains_key(&normalise(form))
    }

    fn side(&self, lang: LangCode) -> &SideIndex {
        match lang {
            LangCode::Tsn => &self.tsn,
            LangCode::En => &self.en,
        }
    }

    /// Entries relevant to Setswana text.
    pub fn find_terms_for_tsn(&self, text: &str, max_terms: usize) -> Vec<&GlossaryEntry> {
        self.match_tokens(&tokenise(text), LangCode::Tsn, max_terms, DEFAULT_MIN_SCORE)
    }

    /// Entries relevant to English text.
    pub fn find_terms_for_en(&self, text: &str, max_terms: usize) -> Vec<&GlossaryEntry> {
        self.match_tokens(&tokenise(text), LangCode::En, max_terms, DEFAULT_MIN_SCORE)
    }

    /// Entries relevant to `text` written in `lang`.
    pub fn find_terms(&self, text: &str, lang: LangCode, max_terms: usize) -> Vec<&GlossaryEntry> {
        match lang {
            LangCode::Tsn => self.find_terms_for_tsn(text, max_terms),
            LangCode::En => self.find_terms_for_en(text, max_terms),
        }
    }

    /// Match normalised tokens against one side of the index.
    ///
    /// All exact hits come first, in token order. Each token without an exact
    /// hit is then scored against every form; every form tied at the best
    /// score (if it reaches `min_score`) contributes its entries. The result
    /// is deduplicated by `(english_label, setswana_preferred)` and cut to
    /// `max_terms`.
    pub fn match_tokens(
        &self,
        tokens: &[String],
        lang: LangCode,
        max_terms: usize,
        min_score: f64,
    ) -> Vec<&GlossaryEntry> {
        let side = self.side(lang);
        let mut hits: Vec<usize> = Vec::new();

        for token in tokens {
            if let Some(found) = side.by_form.get(token) {
                hits.extend(found);
            }
        }

        for token in tokens.iter().filter(|t| !side.by_form.contains_key(*t)) {
            let mut best_score = 0.0;
            let mut best_forms: Vec<&str> = Vec::new();

            for form in &side.forms {
                let score = ratio(token, form);
                if score < min_score {
                    continue;
                }
                if score > best_score {
                    best_score = score;
                    best_forms.clear();
                    best_forms.push(form);
                } else if score == best_score {
                    best_forms.push(form);
                }
            }

            for form in best_forms {
                if let Some(found) = side.by_form.get(form) {
                    hits.extend(found);
                }
            }
        }

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for i in hits {
            if matched.len() >= max_terms {
                break;
            }
            let entry = &self.entries[i];
            if seen.insert(entry.key()) {
                matched.push(entry);
            }
        }
        matched
    }

    /// Per-token matches for a piece of text, keeping each token's original
    /// spelling. Tokens without any match are omitted.
    pub fn preview_matches(&self, text: &str, lang: LangCode) -> Vec<TokenMatches> {
        WORD_RE
            .find_iter(text)
            .filter_map(|m| {
                let normalised = normalise(m.as_str());
                let entries: Vec<GlossaryEntry> = self
                    .match_tokens(
                        std::slice::from_ref(&normalised),
                        lang,
                        usize::MAX,
                        DEFAULT_MIN_SCORE,
                    )
                    .into_iter()
                    .cloned()
                    .collect();
                if entries.is_empty() {
                    return None;
                }
                Some(TokenMatches {
                    token: m.as_str().to_string(),
                    normalised_token: normalised,
                    entries,
                })
            })
            .collect()
    }
}
