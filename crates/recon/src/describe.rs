//! Account-number extraction and description cleanup for the account column.

use crate::config::EngineConfig;

const MIN_ACCOUNT_DIGITS: usize = 3;
const MAX_ACCOUNT_DIGITS: usize = 10;

/// Characters that separate an account number from its label.
pub fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '–' | '—' | '/')
}

fn is_joiner(c: char) -> bool {
    is_separator(c) && c != ' '
}

/// Byte span `[start, end)` of a run of ASCII digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitRun {
    pub start: usize,
    pub end: usize,
}

impl DigitRun {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// All maximal digit runs of 3–10 digits, left to right.
pub fn digit_runs(text: &str) -> Vec<DigitRun> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let run = DigitRun { start, end: i };
            if (MIN_ACCOUNT_DIGITS..=MAX_ACCOUNT_DIGITS).contains(&run.len()) {
                runs.push(run);
            }
        } else {
            i += 1;
        }
    }
    runs
}

/// Account number plus the unformatted label text chosen around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedAccount<'a> {
    pub number: &'a str,
    pub label: &'a str,
}

/// The last digit run wins. The label is taken after the number; failing that,
/// between the previous run and the number; failing that, before the number.
pub fn extract_account(text: &str) -> Option<ExtractedAccount<'_>> {
    let runs = digit_runs(text);
    let last = *runs.last()?;

    let after = trim_separators(&text[last.end..]);
    let label = if !after.is_empty() {
        after
    } else if runs.len() >= 2 {
        let prev = runs[runs.len() - 2];
        trim_separators(&text[prev.end..last.start])
    } else {
        trim_separators(&text[..last.start])
    };

    Some(ExtractedAccount {
        number: &text[last.start..last.end],
        label,
    })
}

pub fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| is_separator(c) || c.is_whitespace())
}

pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and separator runs, then title-case every word.
/// Abbreviations from the config are forced to uppercase.
///
/// Separator runs become `" - "`, except a lone `-`, `/`, en or em dash
/// between two word characters (`Gain/Loss`, `Pre-paid`), which is kept.
pub fn format_description(raw: &str, config: &EngineConfig) -> String {
    let collapsed = collapse_separators(&normalize_whitespace(raw));
    trim_separators(&collapsed)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| title_word(w, config))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A run of separators becomes `" - "`; a pure-space run stays one space.
/// A single joiner between two word characters (`Gain/Loss`, `Pre-paid`)
/// is part of the word and is kept.
fn collapse_separators(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if !is_separator(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && is_separator(chars[i]) {
            i += 1;
        }
        let run = &chars[start..i];
        let joiners = run.iter().filter(|c| is_joiner(**c)).count();
        let inner = start > 0 && i < chars.len();
        if joiners == 0 {
            out.push(' ');
        } else if joiners == 1 && run.len() == 1 && inner {
            out.push(run[0]);
        } else {
            out.push_str(" - ");
        }
    }
    out
}

fn title_word(word: &str, config: &EngineConfig) -> String {
    let mut out = String::with_capacity(word.len());
    let mut seg_start = 0;
    for (i, c) in word.char_indices() {
        if is_joiner(c) {
            out.push_str(&title_segment(&word[seg_start..i], config));
            out.push(c);
            seg_start = i + c.len_utf8();
        }
    }
    out.push_str(&title_segment(&word[seg_start..], config));
    out
}

fn title_segment(seg: &str, config: &EngineConfig) -> String {
    let core = seg.trim_matches(|c: char| !c.is_alphanumeric());
    if !core.is_empty() && config.is_abbreviation(core) {
        return seg.to_uppercase();
    }
    let mut out = String::with_capacity(seg.len());
    let mut capitalized = false;
    for c in seg.chars() {
        if !capitalized && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
            capitalized = true;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
