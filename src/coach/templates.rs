//! Canned coaching text. Each table is tried top to bottom and the first matching
//! key wins; the default is returned when nothing matches.

/// Exemplar answers keyed by a case-sensitive substring of the question topic.
const MODEL_ANSWERS: &[(&str, &str)] = &[
    (
        "Haber",
        "N2(g) + 3H2(g) ⇌ 2NH3(g) is exothermic in the forward direction (ΔH < 0). \
According to Le Chatelier’s principle, increasing the temperature adds heat, so the system \
shifts to oppose the change by favouring the endothermic reverse reaction. The equilibrium \
therefore shifts to the left, more ammonia decomposes into nitrogen and hydrogen, and the \
equilibrium yield of ammonia decreases. In conclusion, a higher temperature lowers the yield \
of ammonia, even though it increases the rate at which equilibrium is reached.",
    ),
    (
        "Catalysis",
        "A catalyst provides an alternative reaction pathway with a lower activation energy (Ea), \
so a greater proportion of collisions are successful and the rate increases. Because it lowers \
Ea for the forward and reverse reactions equally, it does not change the position of \
equilibrium or the yield. In the Haber process an iron catalyst allows a moderate temperature \
(about 400–450 °C) to give an acceptable rate, and in the Contact process V2O5 does the same \
for SO3 production. This saves energy costs and reduces emissions. Overall, catalysts are \
highly effective: they make industrial processes faster and more economical without being \
consumed, although they cannot increase the equilibrium yield.",
    ),
    (
        "Titration",
        "HCl + NaOH → NaCl + H2O (1:1 ratio). \
n(NaOH) = C × V = 0.100 mol/L × 0.0300 L = 0.00300 mol. \
n(HCl) = n(NaOH) = 0.00300 mol. \
[HCl] = n / V = 0.00300 mol ÷ 0.0250 L = 0.120 mol/L (0.120 M, 3 s.f.).",
    ),
    (
        "pH",
        "pH = −log10[H+], so it measures hydrogen ion concentration. Solutions with pH below 7 \
are acidic and have a higher [H+]; solutions with pH above 7 are basic and have a higher [OH−]. \
Each change of 1 pH unit is a ten-fold change in [H+], so a solution of pH 3 has ten times \
the hydrogen ion concentration of a solution of pH 4.",
    ),
    (
        "Variables",
        "The dependent variable is the rate of reaction, because it is what is measured and it \
changes in response to the temperature (the independent variable).",
    ),
    (
        "Isotopes",
        "Isotopes are atoms of the same element (same number of protons) that have different \
numbers of neutrons, and therefore different mass numbers.",
    ),
];

const DEFAULT_MODEL_ANSWER: &str = "A strong answer identifies the key chemistry idea, \
describes what happens using correct terminology, explains why it happens with a clear \
cause-and-effect link, and finishes with a concluding sentence that directly answers the question.";

/// Next steps keyed by a case-insensitive substring of the question's target note.
const NEXT_STEPS: &[(&str, [&str; 3])] = &[
    (
        "band 6",
        [
            "Write every cause-and-effect link explicitly: 'because… therefore…'.",
            "Back each claim with an equation, condition or data point from the question.",
            "End with a one-sentence judgement that answers the exact verb in the question.",
        ],
    ),
    (
        "band 4",
        [
            "Set out working line by line: equation, formula, substitution, answer.",
            "Check units and significant figures before you finish.",
            "Re-read the question and make sure your final line answers it directly.",
        ],
    ),
    (
        "band 3",
        [
            "Learn the key definition word for word and write it in full.",
            "Answer in one complete sentence that uses the words from the question.",
            "Practise two more short-answer questions on this topic today.",
        ],
    ),
];

const DEFAULT_NEXT_STEPS: [&str; 3] = [
    "Underline the command verb and make sure your answer does exactly that.",
    "Use correct scientific terms instead of everyday words.",
    "Finish with a sentence that links back to the question.",
];

const CHECKLIST: [&str; 5] = [
    "Did I answer the exact question asked (check the verb: explain, assess, calculate)?",
    "Did I use correct chemical terminology and, where useful, a balanced equation?",
    "Did I show working, units and significant figures where needed?",
    "Did I link each point back to the question?",
    "Did I finish with a clear concluding statement?",
];

pub fn model_answer(topic: &str) -> &'static str {
    MODEL_ANSWERS
        .iter()
        .find(|(key, _)| topic.contains(key))
        .map(|(_, answer)| *answer)
        .unwrap_or(DEFAULT_MODEL_ANSWER)
}

pub fn next_steps(target_note: &str) -> [&'static str; 3] {
    let note = target_note.to_lowercase();
    NEXT_STEPS
        .iter()
        .find(|(key, _)| note.contains(key))
        .map(|(_, steps)| *steps)
        .unwrap_or(DEFAULT_NEXT_STEPS)
}

pub fn checklist() -> [&'static str; 5] {
    CHECKLIST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_answer_matches_on_topic() {
        assert!(model_answer("Equilibrium / Haber").contains("Le Chatelier"));
        assert!(model_answer("Acid–Base Titration").contains("0.120 mol/L"));
        assert_eq!(model_answer("Electrochemistry"), DEFAULT_MODEL_ANSWER);
    }

    #[test]
    fn model_answer_keys_are_case_sensitive() {
        assert_eq!(model_answer("ph basics"), DEFAULT_MODEL_ANSWER);
    }

    #[test]
    fn next_steps_first_match_wins() {
        // mentions both Band 6 and Band 4; the Band 6 entry is declared first
        let steps = next_steps("Band 4 now, Band 6 later");
        assert_eq!(steps, NEXT_STEPS[0].1);
    }

    #[test]
    fn next_steps_ignore_case_and_fall_back_to_default() {
        assert_eq!(next_steps("GOAL: LIFT TO BAND 3"), NEXT_STEPS[2].1);
        assert_eq!(next_steps("Enjoy chemistry"), DEFAULT_NEXT_STEPS);
    }
}
