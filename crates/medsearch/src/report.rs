use medsearch_vector::ResponseRecord;
use std::fmt::Write;

/// Plain-text rendering of a lookup for the terminal
pub fn render(record: &ResponseRecord) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Medicine Information ===");
    let _ = writeln!(out, "ID: {}", record.id);
    let _ = writeln!(out, "Name: {}", record.name);

    for (title, items) in [
        ("Substitutes", &record.substitutes),
        ("Side Effects", &record.side_effects),
        ("Uses", &record.uses),
    ] {
        let _ = writeln!(out, "\n{}:", title);
        for item in items {
            let _ = writeln!(out, "- {}", item);
        }
    }

    let _ = writeln!(out, "\nChemical Class: {}", record.chemical_class);
    let _ = writeln!(out, "Habit Forming: {}", record.habit_forming);
    let _ = writeln!(out, "Therapeutic Class: {}", record.therapeutic_class);
    let _ = writeln!(out, "Action Class: {}", record.action_class);
    let _ = write!(out, "\nMatch Score: {}", record.match_score);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let record = ResponseRecord {
            id: "X1".to_string(),
            name: "Paracetamol".to_string(),
            substitutes: vec!["Crocin".to_string(), "Dolo".to_string()],
            side_effects: vec!["Nausea".to_string()],
            uses: vec!["Fever".to_string()],
            chemical_class: "N/A".to_string(),
            habit_forming: "No".to_string(),
            therapeutic_class: "PAIN ANALGESICS".to_string(),
            action_class: "N/A".to_string(),
            match_score: "0.97".to_string(),
        };

        let text = render(&record);
        assert!(text.starts_with("=== Medicine Information ===\nID: X1\nName: Paracetamol\n"));
        assert!(text.contains("\nSubstitutes:\n- Crocin\n- Dolo\n"));
        assert!(text.contains("\nSide Effects:\n- Nausea\n"));
        assert!(text.contains("Therapeutic Class: PAIN ANALGESICS"));
        assert!(text.ends_with("Match Score: 0.97"));
    }
}
