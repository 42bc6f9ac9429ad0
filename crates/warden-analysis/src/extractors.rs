//! Risk signal extractors.
//!
//! Each extractor scans prompt text for one category of risk. Extractors are
//! stateless and side-effect-free, tolerate empty input, and match curated
//! phrase lists per language rather than translating the input. The registry
//! order is the fixed category priority — it determines aggregation order.

use once_cell::sync::Lazy;
use regex::Regex;
use warden_core::{Risk, RiskCategory, Severity, WardenError};

/// A single category detector.
pub trait Extractor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn category(&self) -> RiskCategory;

    /// Scan the prompt and return detected risks. `language` is a hint from
    /// [`warden_core::detect_language`] — matching itself is list-driven, so
    /// an extractor may match in any language it has phrases for.
    fn detect(&self, prompt: &str, language: &str) -> Result<Vec<Risk>, WardenError>;
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    // Patterns are static and known-good; a bad entry is a programming error
    // caught by the table tests below.
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Instruction-override and role-hijack phrasing, plus model chat-template
/// delimiters that have no business appearing in user text.
pub(crate) static INJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(?:ignore|disregard|forget)\s+(?:all\s+)?(?:previous|prior|above|earlier)\s+instructions?\b",
        r"(?i)\bdisregard\s+the\s+above\b",
        r"(?i)\bnew\s+instructions?\s*:",
        r"(?i)\bsystem\s+prompt\s*:",
        r"(?i)\boverride\s+(?:your|the|all)\s+instructions?\b",
        r"(?i)\byou\s+are\s+now\s+(?:a\s+)?(?:hacker|criminal|dan)\b",
        r"(?i)\b(?:act|roleplay)\s+as\s+(?:a\s+)?(?:hacker|criminal)\b",
        r"(?i)\bpretend\s+to\s+be\s+(?:a\s+)?(?:hacker|criminal)\b",
        r"(?i)<\|im_start\|>|<\|system\|>|<<sys>>|\[system\]|###\s*system\s*:",
        // Spanish / French / German / Portuguese / Russian equivalents.
        r"(?i)ignora\s+(?:todas\s+las\s+|las\s+)?instrucciones\s+anteriores",
        r"(?i)ignorez?\s+(?:toutes\s+)?les\s+instructions\s+pr[ée]c[ée]dentes",
        r"(?i)ignoriere\s+(?:alle\s+)?(?:vorherigen|bisherigen)\s+anweisungen",
        r"(?i)ignore\s+(?:todas\s+)?as\s+instru[çc][õo]es\s+anteriores",
        r"(?i)игнорируй(?:те)?\s+(?:все\s+)?предыдущие\s+инструкции",
    ])
});

pub(crate) static MALWARE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(?:ransomware|keylogger|rootkit|botnet|spyware)\b",
        r"(?i)\b(?:write|create|generate|build|make|code)\b.{0,40}\b(?:malware|virus|worm|exploit|trojan)\b",
        r"(?i)\b(?:escribe|crea|[ée]cris|cr[ée]e|schreibe|erstelle|escreva|crie|напиши|создай)\b.{0,40}\b(?:malware|virus|troyano|trojaner|v[ií]rus|вирус)",
    ])
});

pub(crate) static CREDENTIAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bpasswords?\b",
        r"(?i)\bapi\s+keys?\b",
        r"(?i)\baccess\s+tokens?\b",
        r"(?i)\blogin\s+credentials\b",
        r"(?i)\bsecret\s+keys?\b",
        r"(?i)\bpasswort\b",
        r"(?i)\bcontraseñas?\b",
        r"(?i)\bmots?\s+de\s+passe\b",
        r"(?i)\bsenhas?\b",
        r"(?i)\bпарол[ьяием]+\b",
    ])
});

pub(crate) static PII_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bsocial\s+security\s+number\b",
        r"(?i)\bssn\b",
        r"(?i)\bcredit\s+card\s+numbers?\b",
        r"(?i)\bemail\s+address(?:es)?\b",
        r"(?i)\bphone\s+numbers?\b",
        r"(?i)\bdate\s+of\s+birth\b",
        r"(?i)\bhome\s+address\b",
        r"(?i)n[úu]mero\s+de\s+seguridad\s+social",
        r"(?i)num[ée]ro\s+de\s+s[ée]curit[ée]\s+sociale",
        r"(?i)\bkreditkartennummer\b",
        r"(?i)номер\s+кредитной\s+карты",
    ])
});

pub(crate) static DESTRUCTIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)rm\s+-rf\s*/",
        r"(?i)\bdel\s+/[sq]\b",
        r"(?i)\bformat\s+c:",
        r"(?i)\bshutdown\s+-[hr]\b",
        r"(?i)\bkill\s+-9\b",
        r"(?i)\bdrop\s+table\b",
        r"(?i)\bdelete\s+from\b.{0,60}\bwhere\b.{0,20}1\s*=\s*1",
        r"(?i)\bmkfs\.",
        r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;",
    ])
});

pub(crate) static ILLEGAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bhow\s+to\s+(?:hack|break)\s+into\b",
        r"(?i)\bbypass\s+(?:security|authentication|2fa|a\s+paywall)\b",
        r"(?i)\bphishing\b",
        r"(?i)\bransomware\b",
        r"(?i)\b(?:make|build)\s+(?:a\s+)?(?:bomb|explosive)\b",
        r"(?i)\blaunder(?:ing)?\s+money\b",
        r"(?i)\bsteal\s+(?:credit\s+cards?|identit(?:y|ies)|credentials)\b",
        r"(?i)\bc[oó]mo\s+hackear\b",
        r"(?i)\bcomment\s+pirater\b",
        r"(?i)\bwie\s+hackt\s+man\b",
        r"(?i)\bкак\s+взломать\b",
    ])
});

pub(crate) static PROFANITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(?:idiots?|morons?|stupid|dumbass|jerk|losers?)\b",
        r"(?i)\b(?:idiota|imb[ée]cil|cr[ée]tin|dummkopf|идиот|дурак|burro)\b",
    ])
});

/// Destructive verbs for the shell-heuristic below.
static DESTRUCTIVE_VERBS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:delete|remove|wipe|erase|format|rm)\b").unwrap()
});

const SHELL_METACHARS: &[&str] = &[";", "&&", "|", "`", "$("];

/// A detector driven by a static pattern table. One risk per call, spanning
/// the first match — overlapping matches in the same category would only
/// inflate the list, not the score.
struct PhraseExtractor {
    name: &'static str,
    category: RiskCategory,
    severity: Severity,
    description: &'static str,
    patterns: &'static Lazy<Vec<Regex>>,
}

impl Extractor for PhraseExtractor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> RiskCategory {
        self.category
    }

    fn detect(&self, prompt: &str, _language: &str) -> Result<Vec<Risk>, WardenError> {
        if prompt.trim().is_empty() {
            return Ok(Vec::new());
        }
        for pattern in self.patterns.iter() {
            if let Some(m) = pattern.find(prompt) {
                return Ok(vec![Risk::new(
                    self.category,
                    self.severity,
                    self.description,
                )
                .with_span(m.as_str())]);
            }
        }
        Ok(Vec::new())
    }
}

/// Destructive-command detector: known dangerous command patterns (high),
/// plus a lighter heuristic for shell metacharacters combined with
/// destructive verbs (medium).
struct DestructiveExtractor;

impl Extractor for DestructiveExtractor {
    fn name(&self) -> &'static str {
        "destructive"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::DestructiveCommand
    }

    fn detect(&self, prompt: &str, _language: &str) -> Result<Vec<Risk>, WardenError> {
        if prompt.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut risks = Vec::new();

        for pattern in DESTRUCTIVE_PATTERNS.iter() {
            if let Some(m) = pattern.find(prompt) {
                risks.push(
                    Risk::new(
                        RiskCategory::DestructiveCommand,
                        Severity::High,
                        "contains potentially destructive system commands",
                    )
                    .with_span(m.as_str()),
                );
                break;
            }
        }

        let has_metachar = SHELL_METACHARS.iter().any(|m| prompt.contains(m));
        if has_metachar {
            if let Some(m) = DESTRUCTIVE_VERBS.find(prompt) {
                risks.push(
                    Risk::new(
                        RiskCategory::DestructiveCommand,
                        Severity::Medium,
                        "shell metacharacters combined with destructive verbs",
                    )
                    .with_span(m.as_str()),
                );
            }
        }

        Ok(risks)
    }
}

/// Build the extractor registry in fixed category-priority order.
///
/// Categories can be added here without touching the aggregator.
pub fn registry() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(PhraseExtractor {
            name: "injection",
            category: RiskCategory::PromptInjection,
            severity: Severity::High,
            description: "attempts to manipulate model behavior through instruction override",
            patterns: &INJECTION_PATTERNS,
        }),
        Box::new(PhraseExtractor {
            name: "malware",
            category: RiskCategory::MalwareGeneration,
            severity: Severity::High,
            description: "requests generation of malicious code or attack tooling",
            patterns: &MALWARE_PATTERNS,
        }),
        Box::new(PhraseExtractor {
            name: "credential",
            category: RiskCategory::CredentialRequest,
            severity: Severity::High,
            description: "requests credentials or other secrets",
            patterns: &CREDENTIAL_PATTERNS,
        }),
        Box::new(PhraseExtractor {
            name: "pii",
            category: RiskCategory::PiiRequest,
            severity: Severity::Medium,
            description: "requests potentially sensitive personal information",
            patterns: &PII_PATTERNS,
        }),
        Box::new(DestructiveExtractor),
        Box::new(PhraseExtractor {
            name: "illegal",
            category: RiskCategory::IllegalActivity,
            severity: Severity::High,
            description: "requests assistance with illegal activity",
            patterns: &ILLEGAL_PATTERNS,
        }),
        Box::new(PhraseExtractor {
            name: "profanity",
            category: RiskCategory::Profanity,
            severity: Severity::Low,
            description: "contains insulting or abusive language",
            patterns: &PROFANITY_PATTERNS,
        }),
    ]
}
