//! CSV export of per-subject results.

use crate::error::Result;
use crate::pipeline::SubjectResult;
use csv::Writer;
use std::io::Write;

const HEADER: [&str; 6] = [
    "subject",
    "group",
    "symbolic",
    "permutation",
    "alphabet_size",
    "seed",
];

/// NaN is written as an empty cell.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Write one row per subject result.
pub fn write_subject_results<W: Write>(sink: W, results: &[SubjectResult]) -> Result<()> {
    let mut writer = Writer::from_writer(sink);
    writer.write_record(HEADER)?;

    for result in results {
        writer.write_record([
            result.subject_id.clone(),
            result.group.clone(),
            format_value(result.symbolic_entropy),
            format_value(result.permutation_entropy),
            result
                .alphabet_size
                .map(|c| c.value().to_string())
                .unwrap_or_default(),
            result.seed.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Estimate;

    #[test]
    fn nan_becomes_empty_cell() {
        let results = vec![
            SubjectResult {
                subject_id: "S001".to_string(),
                group: "old".to_string(),
                symbolic_entropy: 2.5,
                permutation_entropy: 0.75,
                alphabet_size: Some(Estimate::Computed(4)),
                seed: 42,
                failure: None,
            },
            SubjectResult {
                subject_id: "S002".to_string(),
                group: "young".to_string(),
                symbolic_entropy: f64::NAN,
                permutation_entropy: f64::NAN,
                alphabet_size: None,
                seed: 43,
                failure: Some("normalization: signal has zero variance".to_string()),
            },
        ];

        let mut out = Vec::new();
        write_subject_results(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "subject,group,symbolic,permutation,alphabet_size,seed\n\
             S001,old,2.5,0.75,4,42\n\
             S002,young,,,,43\n"
        );
    }
}
