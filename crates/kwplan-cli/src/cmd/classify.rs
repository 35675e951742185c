use crate::output::print_json;
use kwplan_core::taxonomy::{classify_journey_stage, map_strategic_objective, TypologyClassifier};
use kwplan_core::types::Locale;

pub fn run(intent: &str, serp: &str, locale: &str, json: bool) -> anyhow::Result<()> {
    let locale: Locale = locale.parse()?;
    let stage = classify_journey_stage(intent);
    let typology = TypologyClassifier::default().classify(intent, serp);
    let objective = map_strategic_objective(intent);

    if json {
        print_json(&serde_json::json!({
            "intent": intent,
            "serp_features": serp,
            "journey_stage": stage.label(locale),
            "typology": typology.label(locale),
            "objective": objective.label(locale),
        }))?;
    } else {
        println!("Journey stage: {}", stage.label(locale));
        println!("Typology:      {}", typology.label(locale));
        println!("Objective:     {}", objective.label(locale));
    }
    Ok(())
}
