use comfy_table::{presets::UTF8_FULL, Table};
use f1stats_core::analysis::{FastestLapConsistency, QualifyingPoleConversion};
use f1stats_core::report::{
    format_conversion_average, format_correlation, format_deviation_table, format_most_deviating,
    format_optional,
};
use f1stats_core::{AnalysisReport, Question};

pub fn print_report(report: &AnalysisReport) {
    section(report, Question::FastestLapConsistency, |lines| {
        if let Some(consistency) = &report.fastest_lap_consistency {
            lines.extend(fastest_lap_lines(consistency));
        }
    });

    section(report, Question::QualifyingPoleConversion, |lines| {
        if let Some(conversion) = &report.qualifying_pole_conversion {
            lines.extend(pole_conversion_lines(conversion));
        }
    });

    section(report, Question::FrontRowConversion, |lines| {
        if let Some(rows) = &report.front_row_conversion {
            for row in rows {
                lines.push(format!(
                    "{}: {} podiums from {} front-row starts ({:.2})",
                    row.label, row.podium_finishes, row.front_row_starts, row.ratio
                ));
            }
        }
    });

    section(report, Question::CircuitDurationDeviation, |lines| {
        if let Some(deviation) = &report.circuit_duration_deviation {
            match &deviation.most_deviating {
                Some(race) => {
                    lines.push("Race with the most deviation from its circuit average:".to_string());
                    lines.extend(format_most_deviating(race));
                }
                None => lines.push("No race has a defined duration deviation.".to_string()),
            }
            lines.push(String::new());
            lines.push(format!(
                "Top {} races by duration deviation:",
                deviation.top.len()
            ));
            lines.extend(format_deviation_table(deviation));
        }
    });

    section(report, Question::GlobalLapTimeDeviation, |lines| {
        if let Some(deviation) = &report.global_lap_time_deviation {
            lines.push(format!(
                "Global average lap time: {} seconds",
                format_optional(deviation.global_avg_lap_time, 3)
            ));
            lines.push(format!("{} races compared", deviation.races.len()));
        }
    });

    section(report, Question::PositionPrediction, |lines| {
        if let Some(prediction) = &report.position_prediction {
            lines.push(format!(
                "Correlation between historical average position and race position: {}",
                format_correlation(prediction.correlation)
            ));
            lines.push(format!("{} results with prior history", prediction.observations));
        }
    });
}

fn section(report: &AnalysisReport, question: Question, body: impl FnOnce(&mut Vec<String>)) {
    println!("{}", question.title());
    let mut lines = Vec::new();
    match report.failures.iter().find(|failure| failure.question == question) {
        Some(failure) => lines.push(format!("failed: {}", failure.message)),
        None => body(&mut lines),
    }
    for line in lines {
        println!("{line}");
    }
    println!();
}

fn fastest_lap_lines(consistency: &FastestLapConsistency) -> Vec<String> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Season Position",
        "Fastest Laps",
        "Std Dev of Lap Std Dev (ms)",
    ]);
    for bucket in &consistency.position_dispersion {
        table.add_row(vec![
            bucket.position.to_string(),
            bucket.observations.to_string(),
            format_optional(bucket.lap_std_dispersion, 1),
        ]);
    }

    vec![
        format!(
            "Correlation between lap time consistency and season position: {}",
            format_correlation(consistency.correlation)
        ),
        table.to_string(),
    ]
}

fn pole_conversion_lines(conversion: &QualifyingPoleConversion) -> Vec<String> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Driver", "Poles", "Podiums", "Conversion Rate"]);
    for driver in &conversion.drivers {
        let name = driver
            .surname
            .clone()
            .unwrap_or_else(|| format!("driver {}", driver.driver_id));
        table.add_row(vec![
            name,
            driver.poles.to_string(),
            driver.podiums.to_string(),
            format!("{:.3}", driver.conversion_rate),
        ]);
    }

    vec![
        table.to_string(),
        format!(
            "Average pole-to-podium conversion rate: {}",
            format_conversion_average(conversion.average_conversion_rate)
        ),
    ]
}
