//! Player name filtering and score validation.
//!
//! The same rules run in the game before a submission is sent and on the
//! server, which has the final say.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use thiserror::Error;

use crate::protocol::SubmitScoreRequest;
use crate::types::Mode;

pub const MAX_NAME_LEN: usize = 16;
pub const MAX_SCORE: i64 = 2_147_483_647;
pub const MIN_MULTIPLIER: i64 = 1;
pub const MAX_MULTIPLIER: i64 = 9999;

/// Stored in place of an empty name.
pub const ANONYMOUS: &str = "Anonymous";
/// Typed as the name, throws the finished game away.
pub const DISCARD_KEYWORD: &str = "discard";

/// Leetspeak-tolerant patterns, matched against the lower-cased name. Each
/// one is anchored at a word start so ordinary words that merely contain a
/// banned fragment ("classic", "Scunthorpe") pass.
const BANNED_PATTERNS: &[&str] = &[
    r"\bn[i1][g6]{1,2}[e3]r",
    r"\bf[a@][g6]{1,2}[o0]t",
    r"\b[a@][s$][s$]",
    r"\bf[uü][c¢k]k",
    r"\bsh[i1]t",
    r"\bb[i1]t[c¢]h",
    r"\bc[uü]nt",
    r"\bp[uü][s$][s$]y",
    r"\bd[i1][c¢]k",
    r"\bc[o0][c¢]k",
    r"\bwh[o0]re",
    r"\bsl[uü]t",
    r"\bd[a@]mn",
    r"\bb[a@][s$]t[a@]rd",
    r"\br[e3]t[a@]rd",
];

fn name_charset() -> &'static Regex {
    static CHARSET: OnceLock<Regex> = OnceLock::new();
    CHARSET.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("name charset pattern should compile"))
}

fn banned() -> &'static RegexSet {
    static BANNED: OnceLock<RegexSet> = OnceLock::new();
    BANNED.get_or_init(|| RegexSet::new(BANNED_PATTERNS).expect("banned name patterns should compile"))
}

/// Why a name was refused. The messages are shown to the player as-is.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must be between 1 and 16 characters long.")]
    Length,
    #[error("Name cannot contain spaces.")]
    Whitespace,
    #[error("Name can only contain letters (a-z, A-Z), numbers (0-9), hyphens (-), and underscores (_).")]
    Charset,
    #[error("Name contains inappropriate content.")]
    Inappropriate,
}

/// Check a name after trimming.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(NameError::Length);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(NameError::Whitespace);
    }
    if !name_charset().is_match(name) {
        return Err(NameError::Charset);
    }
    if banned().is_match(&name.to_lowercase()) {
        return Err(NameError::Inappropriate);
    }
    Ok(())
}

/// What the game does with a typed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameChoice {
    Submit(String),
    Discard,
}

/// Client-side handling of the name prompt.
///
/// `discard` (any case) drops the game, an empty name submits as
/// [`ANONYMOUS`], anything else must pass [`validate_name`].
pub fn prepare_name(input: &str) -> Result<NameChoice, NameError> {
    let name = input.trim();
    if name.eq_ignore_ascii_case(DISCARD_KEYWORD) {
        return Ok(NameChoice::Discard);
    }
    if name.is_empty() {
        return Ok(NameChoice::Submit(ANONYMOUS.to_string()));
    }
    validate_name(name)?;
    Ok(NameChoice::Submit(name.to_string()))
}

/// Every problem found in a submission, in field order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .0.join(" "))]
pub struct ValidationErrors(pub Vec<String>);

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidScore {
    pub name: String,
    pub score: u32,
    pub multiplier: u32,
    pub mode: Mode,
}

/// Server-side gate for `POST /submit-score`.
pub fn validate_submission(req: &SubmitScoreRequest) -> Result<ValidScore, ValidationErrors> {
    let mut errors = Vec::new();

    let trimmed = req.name.trim();
    let name = if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        if let Err(e) = validate_name(trimmed) {
            errors.push(e.to_string());
        }
        trimmed.to_string()
    };

    let score = match u32::try_from(req.score) {
        Ok(s) if req.score <= MAX_SCORE => Some(s),
        _ => {
            errors.push(format!("Score must be between 0 and {MAX_SCORE}."));
            None
        }
    };

    let multiplier = if (MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&req.multiplier) {
        u32::try_from(req.multiplier).ok()
    } else {
        errors.push(format!(
            "Multiplier must be between {MIN_MULTIPLIER} and {MAX_MULTIPLIER}."
        ));
        None
    };

    // Exact wire names only.
    let mode = Mode::ALL.into_iter().find(|m| m.as_str() == req.mode);
    if mode.is_none() {
        errors.push("Mode must be one of SIMPLE, TIMED, EXPLOSIONS, SLIDERS.".to_string());
    }

    match (score, multiplier, mode) {
        (Some(score), Some(multiplier), Some(mode)) if errors.is_empty() => Ok(ValidScore {
            name,
            score,
            multiplier,
            mode,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}
