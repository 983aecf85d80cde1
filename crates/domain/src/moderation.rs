use serde::{Deserialize, Serialize};

pub const MAX_COMMENT_LENGTH: usize = 2000;
pub const MIN_COMMENT_LENGTH: usize = 2;

/// Escalation order: a single `Severe` hit dominates everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Clean,
    Mild,
    Moderate,
    Severe,
}

/// One banned-term entry. Only `Mild` entries carry a replacement: mild
/// content is rewritten silently, moderate/severe content is flagged for a
/// human instead of being altered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordFilter {
    pub pattern: String,
    pub severity: Severity,
    pub replacement: Option<String>,
}

impl WordFilter {
    pub fn mild(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            severity: Severity::Mild,
            replacement: Some(replacement.to_string()),
        }
    }

    pub fn flagged(pattern: &str, severity: Severity) -> Self {
        Self {
            pattern: pattern.to_string(),
            severity,
            replacement: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub severity: Severity,
    pub filtered_content: String,
    pub detected_words: Vec<String>,
    pub needs_manual_review: bool,
}

/// Seam for the term matcher. The default is a case-insensitive substring
/// scan; swapping in a tokenizer or regex engine must not change the
/// severity-escalation contract in [`ContentModerator::moderate`].
pub trait PatternMatcher: Send + Sync {
    fn matches(&self, text: &str, pattern: &str) -> bool;
    fn replace_all(&self, text: &str, pattern: &str, replacement: &str) -> String;
}

pub struct SubstringMatcher;

impl PatternMatcher for SubstringMatcher {
    fn matches(&self, text: &str, pattern: &str) -> bool {
        !pattern.is_empty() && text.to_lowercase().contains(&pattern.to_lowercase())
    }

    fn replace_all(&self, text: &str, pattern: &str, replacement: &str) -> String {
        if pattern.is_empty() {
            return text.to_string();
        }
        let pat: Vec<char> = pattern.to_lowercase().chars().collect();
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            if matches_at(&chars, i, &pat) {
                out.push_str(replacement);
                i += pat.len();
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }
        out
    }
}

fn matches_at(chars: &[char], start: usize, pattern_lower: &[char]) -> bool {
    if chars.len() - start < pattern_lower.len() {
        return false;
    }
    pattern_lower
        .iter()
        .enumerate()
        .all(|(k, pc)| chars[start + k].to_lowercase().eq(pc.to_lowercase()))
}

pub struct ContentModerator {
    filters: Vec<WordFilter>,
    matcher: Box<dyn PatternMatcher>,
}

impl ContentModerator {
    pub fn new(filters: Vec<WordFilter>) -> Self {
        Self {
            filters,
            matcher: Box::new(SubstringMatcher),
        }
    }

    pub fn with_matcher(filters: Vec<WordFilter>, matcher: Box<dyn PatternMatcher>) -> Self {
        Self { filters, matcher }
    }

    /// Built-in Arabic/English list. Deployments extend it via
    /// configuration.
    pub fn with_defaults() -> Self {
        Self::new(default_filters())
    }

    pub fn extend(&mut self, extra: Vec<WordFilter>) {
        self.filters.extend(extra);
    }

    /// Scans for banned terms, escalates severity, and substitutes mild
    /// matches. Detection always runs against the original text: substitution
    /// happens in a separate output buffer, so an earlier mild rewrite can
    /// never hide a later moderate or severe phrase from the scan.
    pub fn moderate(&self, text: &str) -> ModerationVerdict {
        let mut severity = Severity::Clean;
        let mut detected = Vec::new();
        let mut filtered = text.to_string();

        for filter in &self.filters {
            if !self.matcher.matches(text, &filter.pattern) {
                continue;
            }
            detected.push(filter.pattern.clone());
            severity = severity.max(filter.severity);
            if filter.severity == Severity::Mild {
                if let Some(replacement) = &filter.replacement {
                    filtered = self
                        .matcher
                        .replace_all(&filtered, &filter.pattern, replacement);
                }
            }
        }

        ModerationVerdict {
            severity,
            filtered_content: filtered,
            detected_words: detected,
            needs_manual_review: severity >= Severity::Moderate,
        }
    }

    /// Quality heuristic in [0, 100], used for ranking and abuse dashboards.
    pub fn score_comment_quality(&self, text: &str) -> u8 {
        let mut score: i64 = 100;

        score -= match self.moderate(text).severity {
            Severity::Clean => 0,
            Severity::Mild => 10,
            Severity::Moderate => 30,
            Severity::Severe => 100,
        };

        let report = validate_comment_content(text);
        score -= 20 * report.errors.len() as i64;
        score -= 5 * report.warnings.len() as i64;

        let len = text.chars().count();
        if len > 20 && len < 500 {
            score += 10;
        }
        if text
            .trim_end()
            .ends_with(['.', '!', '?', '؟', '۔'])
        {
            score += 5;
        }
        if text.chars().any(|c| !c.is_ascii()) {
            score += 10;
        }

        score.clamp(0, 100) as u8
    }
}

pub fn default_filters() -> Vec<WordFilter> {
    vec![
        WordFilter::mild("أحمق", "***"),
        WordFilter::mild("غبي", "***"),
        WordFilter::mild("تافه", "***"),
        WordFilter::mild("stupid", "***"),
        WordFilter::mild("idiot", "***"),
        WordFilter::flagged("حقير", Severity::Moderate),
        WordFilter::flagged("وغد", Severity::Moderate),
        WordFilter::flagged("قذارة", Severity::Moderate),
        WordFilter::flagged("scum", Severity::Moderate),
        WordFilter::flagged("moron", Severity::Moderate),
        WordFilter::flagged("اقتل نفسك", Severity::Severe),
        WordFilter::flagged("kill yourself", Severity::Severe),
        WordFilter::flagged("kys", Severity::Severe),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn validate_comment_content(text: &str) -> ValidationReport {
    validate_comment_content_with(text, MAX_COMMENT_LENGTH, MIN_COMMENT_LENGTH)
}

/// Hard checks reject; warnings are advisory and never block submission.
pub fn validate_comment_content_with(
    text: &str,
    max_length: usize,
    min_length: usize,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len < min_length {
        errors.push(format!("المحتوى قصير جدا (الحد الأدنى {} حرف)", min_length));
    }
    if len > max_length {
        errors.push(format!("المحتوى طويل جدا (الحد الأقصى {} حرف)", max_length));
    }
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        errors.push("المحتوى لا يمكن أن يكون أرقاما فقط".to_string());
    }

    if max_repeated_char_run(trimmed) > 10 {
        warnings.push("المحتوى يحتوي على أحرف مكررة بشكل مفرط".to_string());
    }
    if max_whitespace_run(text) >= 5 {
        warnings.push("المحتوى يحتوي على مسافات متتالية كثيرة".to_string());
    }

    // Soft locale nudge for an Arabic-first audience, never a hard rule.
    if len > 50 && !contains_arabic(trimmed) && is_english_or_punctuation(trimmed) {
        warnings.push("يفضل الكتابة باللغة العربية".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn max_repeated_char_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut last: Option<char> = None;
    for c in text.chars() {
        if Some(c) == last {
            current += 1;
        } else {
            current = 1;
            last = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}

fn max_whitespace_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c.is_whitespace() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}')
    })
}

fn is_english_or_punctuation(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii())
}

/// Spam if the text nearly duplicates the author's recent history, carries a
/// URL-shortener link, or is one short fragment stamped over and over.
pub fn detect_spam(text: &str, history: &[String]) -> bool {
    for prior in history {
        if similarity(text, prior) > 0.8 {
            return true;
        }
    }

    let lower = text.to_lowercase();
    const SHORTENERS: [&str; 8] = [
        "bit.ly", "tinyurl.com", "goo.gl", "t.co/", "ow.ly", "is.gd", "buff.ly", "cutt.ly",
    ];
    if SHORTENERS.iter().any(|d| lower.contains(d)) {
        return true;
    }

    has_contiguous_repetition(text, 3, 4)
}

/// Normalized edit-distance similarity: `(max_len - levenshtein) / max_len`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein(a, b)) as f64 / max_len as f64
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            current[j + 1] = (prev[j + 1] + 1).min(current[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

fn has_contiguous_repetition(text: &str, min_unit: usize, min_repeats: usize) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    if n < min_unit * min_repeats {
        return false;
    }
    for start in 0..n {
        let remaining = n - start;
        for unit in min_unit..=remaining / min_repeats {
            let pattern = &chars[start..start + unit];
            let repeats = (1..min_repeats).all(|k| {
                let offset = start + k * unit;
                &chars[offset..offset + unit] == pattern
            });
            if repeats {
                return true;
            }
        }
    }
    false
}
