//! Basic example demonstrating a responder comparison.
//!
//! This example shows how to:
//! 1. Build a small sample set
//! 2. Compute relative frequencies
//! 3. Run the cohort comparison
//! 4. Examine results

use cellfreq::prelude::*;

fn main() -> Result<()> {
    println!("=== Cell Frequency Example ===\n");

    let samples = create_example_data()?;
    println!("Samples: {}\n", samples.len());

    println!("=== Relative Frequencies ===\n");
    let table = norm_frequencies(samples.iter())?;
    table.write(std::io::stdout(), b'\t', FrequencyLayout::Wide)?;
    println!();

    println!("=== Running Comparison ===\n");
    let output = Pipeline::new()
        .name("melanoma-tr1-example")
        .condition("melanoma")
        .sample_type("PBMC")
        .treatment("tr1")
        .run(&samples)?;

    println!("{}", output.report);

    for r in output.report.significant() {
        println!(
            "{}: responder median {:.3} vs non-responder median {:.3} (p = {:.4})",
            r.population, r.responders.median, r.non_responders.median, r.p_value
        );
    }

    Ok(())
}

fn create_example_data() -> Result<SampleSet> {
    // (id, response, [b_cell, cd8_t_cell, cd4_t_cell, nk_cell, monocyte])
    let rows: [(&str, Response, [u64; 5]); 8] = [
        ("s1", Response::Responder, [300, 100, 200, 100, 300]),
        ("s2", Response::Responder, [350, 100, 150, 100, 300]),
        ("s3", Response::Responder, [400, 100, 100, 100, 300]),
        ("s4", Response::Responder, [450, 100, 50, 100, 300]),
        ("s5", Response::NonResponder, [100, 200, 300, 100, 300]),
        ("s6", Response::NonResponder, [150, 200, 250, 100, 300]),
        ("s7", Response::NonResponder, [120, 200, 280, 100, 300]),
        ("s8", Response::NonResponder, [180, 200, 220, 100, 300]),
    ];

    let samples = rows
        .iter()
        .map(|(id, response, counts)| Sample {
            sample_id: id.to_string(),
            project_id: "prj1".to_string(),
            subject_id: format!("sbj_{}", id),
            condition: "melanoma".to_string(),
            treatment: Some("tr1".to_string()),
            response: Some(*response),
            sample_type: "PBMC".to_string(),
            days_since_start: 0,
            counts: *counts,
        })
        .collect();

    SampleSet::new(samples)
}
