//! Stop-word language detection.
//!
//! The extractors match curated phrase lists in every language they cover,
//! so detection is a hint (reported in reasoning), not a gate.

/// Detect the most likely language of a prompt using stop-word heuristics.
/// Returns a lowercase tag like "spanish", or "unknown" when no language
/// scores above the confidence threshold.
pub fn detect_language(text: &str) -> &'static str {
    let lower = text.to_lowercase();

    let languages: &[(&str, &[&str])] = &[
        (
            "english",
            &[
                " the ", " and ", " for ", " with ", " that ", " this ", " you ", " are ",
                " what ", " how ", "hello", "please", " my ", " me ",
            ],
        ),
        (
            "spanish",
            &[
                " que ", " por ", " para ", " como ", " con ", " una ", " los ", " las ", " del ",
                " pero ", "hola", "gracias", "necesito", "quiero", "puedes",
            ],
        ),
        (
            "portuguese",
            &[
                " com ", " para ", " uma ", " dos ", " das ", " não ", " mais ", " tem ",
                " isso ", "olá", "obrigado", "preciso", "você",
            ],
        ),
        (
            "french",
            &[
                " les ", " des ", " une ", " est ", " pas ", " pour ", " dans ", " avec ",
                " sur ", "bonjour", "merci", " je ", " nous ",
            ],
        ),
        (
            "german",
            &[
                " und ", " der ", " die ", " das ", " ist ", " nicht ", " ein ", " eine ",
                " ich ", " auf ", " mit ", " für ", " den ", "hallo",
            ],
        ),
        (
            "russian",
            &[
                " и ", " в ", " не ", " на ", " что ", " это ", " как ", " но ", " от ",
                " по ", "привет", "спасибо", " мне ", " для ",
            ],
        ),
    ];

    let mut best = "unknown";
    let mut best_score = 0usize;

    for (lang, words) in languages {
        let score = words.iter().filter(|w| lower.contains(**w)).count();
        if score > best_score {
            best_score = score;
            best = lang;
        }
    }

    // Short prompts (≤3 words): 1 match suffices (e.g. "hola", "bonjour").
    // Longer prompts: require 2+ to avoid false positives.
    let word_count = lower.split_whitespace().count();
    let threshold = if word_count <= 3 { 1 } else { 2 };
    if best_score >= threshold {
        best
    } else {
        "unknown"
    }
}
