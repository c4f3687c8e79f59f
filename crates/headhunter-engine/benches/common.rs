// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_note(sections: usize) -> String {
    let base = "# Visit\nSeen in clinic today.\n**History**\n*Allergies*\nNone known.\n**Medications:** aspirin 81mg\n## Plan\nPatient SUMMARY: stable condition\nFOLLOW UP\nReturn in two weeks.\n";
    base.repeat(sections)
}

#[allow(dead_code)]
pub fn expected_headings() -> Vec<String> {
    ["History", "Summary", "Follow up", "Plan"]
        .into_iter()
        .map(String::from)
        .collect()
}
