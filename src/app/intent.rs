//! Keyword routing for incoming chat messages.
//!
//! Every matcher runs on the [`norm`]alized message, so phrases here are
//! lowercase with single spaces.

use crate::catalog::{normalize_title, TitleIndex};
use crate::domain::model::{Level, Preferences, TitleKind};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const PREBUILT_PHRASES: [&str; 7] = [
    "prebuilt",
    "pre build",
    "pre-built",
    "pre built",
    "prebuild",
    "ready made",
    "ready-made",
];

const REQ_KEYWORDS: [&str; 6] = [
    "system requirements",
    "software requirements",
    "game requirements",
    "minimum requirements",
    "recommended requirements",
    "requirements",
];

const SPEC_WORDS: [&str; 3] = ["specs", "specifications", "specification"];

const OWN_MACHINE_PHRASES: [&str; 5] = ["my pc", "my laptop", "my build", "my setup", "my rig"];

const LEVEL_MIN: [&str; 2] = ["minimum", "min "];
const LEVEL_REC: [&str; 2] = ["recommended", "rec "];
const LEVEL_HIGH: [&str; 7] = [
    "high end",
    "high-end",
    "ultra",
    "max",
    "future proof",
    "future-proof",
    "overkill",
];

const PC_RELATED_KEYWORDS: [&str; 36] = [
    // general
    "pc",
    "computer",
    "desktop",
    "build",
    "rig",
    "setup",
    // parts
    "cpu",
    "gpu",
    "graphics card",
    "motherboard",
    "ram",
    "memory",
    "ssd",
    "hdd",
    "nvme",
    "storage",
    "psu",
    "power supply",
    "case",
    "cooler",
    "intel",
    "amd",
    "nvidia",
    "rtx",
    "gtx",
    "radeon",
    "arc",
    // devices
    "laptop",
    "notebook",
    "prebuilt",
    "pre-built",
    "pre build",
    "prebuild",
    // request wording
    "requirements",
    "specs",
    "specifications",
];

const RGB_WORDS: [&str; 3] = ["rgb", "lighting", "led"];
const QUIET_WORDS: [&str; 4] = ["quiet", "silent", "low noise", "low-noise"];

const MAX_TITLE_NGRAM: usize = 6;
const MAX_UNKNOWN_TITLE_CHARS: usize = 60;

static BUDGET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\$\s*(\d{3,5})",
        r"(\d{3,5})\s*\$",
        r"(?:budget|for)\s*(\d{3,5})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("budget pattern"))
    .collect()
});

static UNKNOWN_TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:requirements|specs|specifications)\s+(?:for|of)\s+(.+)$",
        r"(?:can i run)\s+(.+)$",
        r"(?:run)\s+(.+)$",
        r"(?:for)\s+(.+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("title pattern"))
    .collect()
});

static TRAILING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?.!]+$").expect("punctuation pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    #[serde(rename = "custom_pc")]
    CustomPc,
    #[serde(rename = "laptop")]
    Laptop,
    #[serde(rename = "prebuilt_pc")]
    Prebuilt,
    #[serde(rename = "system_requirements")]
    SystemRequirements,
    #[serde(rename = "hardware_specs")]
    HardwareSpecs,
    #[serde(rename = "out_of_scope")]
    OutOfScope,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::CustomPc => "custom_pc",
            Intent::Laptop => "laptop",
            Intent::Prebuilt => "prebuilt_pc",
            Intent::SystemRequirements => "system_requirements",
            Intent::HardwareSpecs => "hardware_specs",
            Intent::OutOfScope => "out_of_scope",
        }
    }
}

/// Lowercased, trimmed text with whitespace runs collapsed.
pub fn norm(text: &str) -> String {
    normalize_title(text)
}

/// [`norm`] with everything but ASCII letters and digits removed.
pub fn compact(text: &str) -> String {
    norm(text)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

pub fn is_pc_related(message: &str) -> bool {
    contains_any(&norm(message), &PC_RELATED_KEYWORDS)
}

/// Routes a message. Requirement wording wins over device words, and device
/// words win over the PC-related gate.
pub fn detect_intent(message: &str) -> Intent {
    let t = norm(message);

    if contains_any(&t, &REQ_KEYWORDS) {
        return Intent::SystemRequirements;
    }
    if contains_any(&t, &SPEC_WORDS) {
        if contains_any(&t, &OWN_MACHINE_PHRASES) {
            return Intent::HardwareSpecs;
        }
        return Intent::SystemRequirements;
    }
    if t.contains("laptop") || t.contains("notebook") {
        return Intent::Laptop;
    }
    if contains_any(&t, &PREBUILT_PHRASES) {
        return Intent::Prebuilt;
    }
    if !contains_any(&t, &PC_RELATED_KEYWORDS) {
        return Intent::OutOfScope;
    }
    Intent::CustomPc
}

pub fn detect_level(message: &str) -> Level {
    let t = norm(message);
    if contains_any(&t, &LEVEL_HIGH) {
        Level::HighEnd
    } else if contains_any(&t, &LEVEL_MIN) {
        Level::Minimum
    } else if contains_any(&t, &LEVEL_REC) {
        Level::Recommended
    } else {
        Level::Both
    }
}

/// First 3-5 digit amount written as `$N`, `N$`, `budget N` or `for N`.
pub fn extract_budget(message: &str) -> Option<u32> {
    let t = norm(message);
    BUDGET_PATTERNS
        .iter()
        .find_map(|re| re.captures(&t))
        .and_then(|caps| caps[1].parse().ok())
}

pub fn wants_rgb(message: &str) -> bool {
    contains_any(&norm(message), &RGB_WORDS)
}

pub fn wants_quiet(message: &str) -> bool {
    contains_any(&norm(message), &QUIET_WORDS)
}

pub fn preferences(message: &str, level: Level) -> Preferences {
    Preferences {
        level,
        prefer_quiet: wants_quiet(message),
        prefer_rgb: wants_rgb(message),
    }
}

/// Known titles mentioned in a message, as `(apps, games)`.
///
/// Longer n-grams are tried first so "call of duty" is found before "duty".
pub fn extract_known_titles(message: &str, index: &TitleIndex) -> (Vec<String>, Vec<String>) {
    let t = norm(message);
    let words: Vec<&str> = t.split(' ').filter(|w| !w.is_empty()).collect();
    let mut apps: Vec<String> = Vec::new();
    let mut games: Vec<String> = Vec::new();

    for n in (1..=MAX_TITLE_NGRAM).rev() {
        for window in words.windows(n) {
            let phrase = window.join(" ");
            if phrase.len() < 2 {
                continue;
            }
            if index.has_app(&phrase) && !apps.contains(&phrase) {
                apps.push(phrase.clone());
            }
            if index.has_game(&phrase) && !games.contains(&phrase) {
                games.push(phrase);
            }
        }
    }

    (apps, games)
}

/// Best guess at a title the catalogs do not know, e.g. "can i run <title>?".
pub fn extract_unknown_title(message: &str) -> Option<String> {
    let t = norm(message);
    let caps = UNKNOWN_TITLE_PATTERNS.iter().find_map(|re| re.captures(&t))?;

    let raw = caps[1].trim();
    let title = TRAILING_PUNCTUATION.replace(raw, "");
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(title.chars().take(MAX_UNKNOWN_TITLE_CHARS).collect())
}

/// The title a requirements question is about, with its kind.
///
/// Known games win over known apps. An unknown title is treated as an app
/// only when the message says "software" or "application".
pub fn pick_target_name(message: &str, index: &TitleIndex) -> (TitleKind, String) {
    let (apps, games) = extract_known_titles(message, index);
    if let Some(game) = games.into_iter().next() {
        return (TitleKind::Game, game);
    }
    if let Some(app) = apps.into_iter().next() {
        return (TitleKind::App, app);
    }

    if let Some(unknown) = extract_unknown_title(message) {
        let t = norm(message);
        let kind = if t.contains("software") || t.contains("application") {
            TitleKind::App
        } else {
            TitleKind::Game
        };
        return (kind, unknown);
    }

    let trimmed = message.trim();
    if trimmed.is_empty() {
        (TitleKind::Game, "unknown".to_string())
    } else {
        (
            TitleKind::Game,
            trimmed.chars().take(MAX_UNKNOWN_TITLE_CHARS).collect(),
        )
    }
}
