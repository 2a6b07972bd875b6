use crate::domain::model::{DetourSuggestion, LegMatch, SkippedLeg};
use crate::utils::error::{OptimizerError, Result};
use serde::Serialize;

pub const DEFAULT_DISPLAY_LIMIT: usize = 3;
pub const EMPTY_DETOURS: &str = "—";

const HEADER: [&str; 6] = [
    "tail_number",
    "from",
    "to",
    "distance_km",
    "detour_count",
    "detours",
];

/// `"KLGA, KJFK, KHPN +2 more"`; a limit of 0 shows every code.
pub fn format_detours(detours: &[DetourSuggestion], display_limit: usize) -> String {
    if detours.is_empty() {
        return EMPTY_DETOURS.to_string();
    }

    let shown = if display_limit == 0 {
        detours.len()
    } else {
        display_limit.min(detours.len())
    };

    let codes: Vec<&str> = detours[..shown].iter().map(|d| d.code.as_str()).collect();
    let hidden = detours.len() - shown;

    if hidden > 0 {
        format!("{} +{} more", codes.join(", "), hidden)
    } else {
        codes.join(", ")
    }
}

pub fn render_csv(matches: &[LegMatch], display_limit: usize) -> Result<String> {
    render_delimited(matches, display_limit, b',')
}

pub fn render_tsv(matches: &[LegMatch], display_limit: usize) -> Result<String> {
    render_delimited(matches, display_limit, b'\t')
}

fn render_delimited(matches: &[LegMatch], display_limit: usize, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for leg in matches {
        writer.write_record([
            leg.tail_number.clone(),
            leg.origin.clone(),
            leg.destination.clone(),
            format!("{:.1}", leg.direct_distance_km),
            leg.detours.len().to_string(),
            format_detours(&leg.detours, display_limit),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OptimizerError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| OptimizerError::ProcessingError {
        message: format!("report is not valid UTF-8: {}", e),
    })
}

#[derive(Serialize)]
struct JsonReport<'a> {
    matches: &'a [LegMatch],
    skipped: &'a [SkippedLeg],
}

/// JSON 保留完整排序清單，不截斷
pub fn render_json(matches: &[LegMatch], skipped: &[SkippedLeg]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport { matches, skipped })?)
}

/// Console table in the layout of the route matches page.
pub fn render_table(matches: &[LegMatch], display_limit: usize) -> String {
    let rows: Vec<[String; 5]> = matches
        .iter()
        .map(|leg| {
            [
                leg.tail_number.clone(),
                leg.origin.clone(),
                leg.destination.clone(),
                format!("{:.1}", leg.direct_distance_km),
                format_detours(&leg.detours, display_limit),
            ]
        })
        .collect();

    let headers = ["Tail #", "From", "To", "Distance (km)", "Suggestions"];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(&headers));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(code: &str, distance_km: f64) -> DetourSuggestion {
        DetourSuggestion {
            code: code.to_string(),
            name: format!("{} Airport", code),
            distance_km,
        }
    }

    fn leg(tail: &str, detours: Vec<DetourSuggestion>) -> LegMatch {
        LegMatch {
            aircraft_id: "1".to_string(),
            tail_number: tail.to_string(),
            origin: "KTEB".to_string(),
            destination: "KBOS".to_string(),
            direct_distance_km: 296.04,
            detours,
        }
    }

    #[test]
    fn test_format_detours_truncates_with_more_indicator() {
        let detours = vec![
            suggestion("KHVN", 10.0),
            suggestion("KBDL", 40.0),
            suggestion("KHPN", 90.0),
            suggestion("KPVD", 120.0),
            suggestion("KISP", 150.0),
        ];
        assert_eq!(format_detours(&detours, 3), "KHVN, KBDL, KHPN +2 more");
        assert_eq!(format_detours(&detours, 5), "KHVN, KBDL, KHPN, KPVD, KISP");
        assert_eq!(format_detours(&detours, 0), "KHVN, KBDL, KHPN, KPVD, KISP");
        assert_eq!(format_detours(&detours[..2], 3), "KHVN, KBDL");
        assert_eq!(format_detours(&[], 3), EMPTY_DETOURS);
    }

    #[test]
    fn test_render_csv() {
        let matches = vec![
            leg("N12345", vec![suggestion("KHVN", 10.0), suggestion("KBDL", 40.0)]),
            leg("N54321", vec![]),
        ];

        let csv = render_csv(&matches, 3).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "tail_number,from,to,distance_km,detour_count,detours");
        assert_eq!(lines[1], "N12345,KTEB,KBOS,296.0,2,\"KHVN, KBDL\"");
        assert_eq!(lines[2], "N54321,KTEB,KBOS,296.0,0,—");
    }

    #[test]
    fn test_render_tsv() {
        let matches = vec![leg("N12345", vec![suggestion("KHVN", 10.0)])];

        let tsv = render_tsv(&matches, 3).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();

        assert_eq!(lines[0], "tail_number\tfrom\tto\tdistance_km\tdetour_count\tdetours");
        assert_eq!(lines[1], "N12345\tKTEB\tKBOS\t296.0\t1\tKHVN");
    }

    #[test]
    fn test_render_csv_empty_has_header_only() {
        let csv = render_csv(&[], 3).unwrap();
        assert_eq!(csv.trim_end(), "tail_number,from,to,distance_km,detour_count,detours");
    }

    #[test]
    fn test_render_json_keeps_full_list() {
        let detours: Vec<DetourSuggestion> = (0..5).map(|i| suggestion(&format!("K{}", i), i as f64)).collect();
        let matches = vec![leg("N12345", detours)];
        let skipped = vec![SkippedLeg {
            aircraft_id: "9".to_string(),
            tail_number: "N999".to_string(),
            reason: "Airport code 'ZZZZ' is not in the airport catalog".to_string(),
        }];

        let json: serde_json::Value = serde_json::from_str(&render_json(&matches, &skipped).unwrap()).unwrap();

        assert_eq!(json["matches"][0]["detours"].as_array().unwrap().len(), 5);
        assert_eq!(json["skipped"][0]["tail_number"], "N999");
    }

    #[test]
    fn test_render_table() {
        let matches = vec![leg("N12345", vec![suggestion("KHVN", 10.0)])];
        let table = render_table(&matches, 3);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Tail #"));
        assert!(lines[0].ends_with("Suggestions"));
        assert!(lines[2].contains("296.0"));
        assert!(lines[2].ends_with("KHVN"));
    }
}
