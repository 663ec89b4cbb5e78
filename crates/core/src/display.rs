use crate::history::TreatmentHistoryEntry;

/// Describes every stage of an entry, e.g.
/// `Carboplatin+Pemetrexed with switch to Docetaxel continued with Pemetrexed maintenance`.
pub fn full_treatment_display(entry: &TreatmentHistoryEntry) -> String {
    let mut display = entry.treatment_display();

    let switches: Vec<String> = entry
        .switch_to_treatments()
        .iter()
        .map(|stage| stage.treatment.display())
        .collect();
    if !switches.is_empty() {
        display.push_str(" with switch to ");
        display.push_str(&switches.join(" then "));
    }

    if let Some(maintenance) = entry.maintenance_treatment() {
        display.push_str(&format!(
            " continued with {} maintenance",
            maintenance.treatment.display()
        ));
    }

    display
}
